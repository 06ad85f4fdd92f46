//! An in-memory `SessionStore` — the reference implementation used by tests
//! and the bundled CLI. Swappable for a database-backed implementation
//! without touching the orchestrator (§4.7).

use super::{entity_not_found, PlayerLoadout, SessionStore};
use crate::error::{EngineError, Result};
use crate::model::monster::MonsterBlueprint;
use crate::model::session::CombatSession;
use crate::model::status::StatusDefinition;
use crate::model::types::{CombatStatus, Id, TurnActor};
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryStore {
    sessions: HashMap<Id, CombatSession>,
    monster_blueprints: HashMap<Id, MonsterBlueprint>,
    player_loadouts: HashMap<Id, PlayerLoadout>,
    status_definitions: HashMap<String, StatusDefinition>,
    next_session_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_monster_blueprint(&mut self, blueprint: MonsterBlueprint) {
        self.monster_blueprints.insert(blueprint.id.clone(), blueprint);
    }

    pub fn register_player_loadout(&mut self, player_id: impl Into<Id>, loadout: PlayerLoadout) {
        self.player_loadouts.insert(player_id.into(), loadout);
    }

    pub fn register_status_definition(&mut self, definition: StatusDefinition) {
        self.status_definitions.insert(definition.code.clone(), definition);
    }
}

impl SessionStore for MemoryStore {
    fn load_session(&self, session_id: &Id) -> Result<CombatSession> {
        self.sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| entity_not_found("session", session_id))
    }

    fn active_session_for_player(&self, player_id: &Id) -> Option<CombatSession> {
        self.sessions
            .values()
            .find(|s| &s.player_id == player_id && s.is_active())
            .cloned()
    }

    fn create_session(
        &mut self,
        player_id: &Id,
        monster_blueprint_id: &Id,
        monster_level: i32,
        player_max_hp: i32,
        monster_max_hp: i32,
        started_at: &str,
    ) -> Result<CombatSession> {
        self.next_session_id += 1;
        let id = format!("session-{}", self.next_session_id);

        let session = CombatSession {
            id: id.clone(),
            player_id: player_id.clone(),
            monster_blueprint_id: monster_blueprint_id.clone(),
            monster_level,
            status: CombatStatus::PlayerTurn,
            turn_count: 1,
            current_turn_entity: TurnActor::Player,
            player_current_hp: player_max_hp,
            player_max_hp,
            player_echo_current: 0,
            player_echo_max: 100,
            player_statuses: HashMap::new(),
            player_gauges: HashMap::new(),
            player_cooldowns: HashMap::new(),
            player_consumable_uses_remaining: 1,
            monster_current_hp: monster_max_hp,
            monster_max_hp,
            monster_statuses: HashMap::new(),
            monster_gauges: HashMap::new(),
            monster_cooldowns: HashMap::new(),
            started_at: started_at.to_string(),
            ended_at: None,
            version: 0,
        };
        self.sessions.insert(id, session.clone());
        Ok(session)
    }

    fn persist_session(&mut self, session: &CombatSession) -> Result<()> {
        let mut session = session.clone();
        match self.sessions.get(&session.id) {
            Some(existing) if existing.version != session.version => {
                return Err(EngineError::ConcurrentModification {
                    session_id: session.id.clone(),
                });
            }
            Some(_) => {}
            None => return Err(entity_not_found("session", &session.id)),
        }
        session.version += 1;
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    fn all_status_definitions(&self) -> HashMap<String, StatusDefinition> {
        self.status_definitions.clone()
    }

    fn monster_blueprint(&self, blueprint_id: &Id) -> Result<MonsterBlueprint> {
        self.monster_blueprints
            .get(blueprint_id)
            .cloned()
            .ok_or_else(|| entity_not_found("monster blueprint", blueprint_id))
    }

    fn player_loadout(&self, player_id: &Id, _player_level: i32) -> Result<PlayerLoadout> {
        self.player_loadouts
            .get(player_id)
            .cloned()
            .ok_or_else(|| entity_not_found("player", player_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::stats::{StatsBlock, StatsScaling};

    fn blueprint() -> MonsterBlueprint {
        MonsterBlueprint {
            id: "slime".to_string(),
            name: "Slime".to_string(),
            description: String::new(),
            base_level: 1,
            ai_behavior: crate::model::types::AiBehavior::Basic,
            loot_table_id: None,
            xp_reward: 10,
            gold_reward_min: 1,
            gold_reward_max: 5,
            is_boss: false,
            base_stats: StatsBlock {
                max_hp: 50,
                ..StatsBlock::zero()
            },
            scaling: StatsScaling::zero(),
            abilities: vec![],
        }
    }

    #[test]
    fn create_and_load_session_round_trips() {
        let mut store = MemoryStore::new();
        let session = store
            .create_session(&"p1".to_string(), &"slime".to_string(), 1, 100, 50, "2026-01-01T00:00:00Z")
            .unwrap();
        let loaded = store.load_session(&session.id).unwrap();
        assert_eq!(loaded.id, session.id);
        assert_eq!(loaded.player_max_hp, 100);
        assert_eq!(loaded.started_at, "2026-01-01T00:00:00Z");
    }

    #[test]
    fn persist_rejects_stale_version() {
        let mut store = MemoryStore::new();
        let mut session = store
            .create_session(&"p1".to_string(), &"slime".to_string(), 1, 100, 50, "2026-01-01T00:00:00Z")
            .unwrap();
        store.persist_session(&session).unwrap();

        session.version = 0;
        let err = store.persist_session(&session).unwrap_err();
        assert!(matches!(err, EngineError::ConcurrentModification { .. }));
    }

    #[test]
    fn monster_blueprint_lookup() {
        let mut store = MemoryStore::new();
        store.register_monster_blueprint(blueprint());
        assert!(store.monster_blueprint(&"slime".to_string()).is_ok());
        assert!(store.monster_blueprint(&"missing".to_string()).is_err());
    }
}
