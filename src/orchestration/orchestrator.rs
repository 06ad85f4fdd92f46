//! The store-aware entry point (§4.6, §4.7): turns a `SessionStore` plus a
//! player/action request into a rehydrated `Battle`, runs it one action
//! deep, and syncs the result back.
//!
//! Grounded on `original_source/application/use_cases/combat/{start_combat,
//! execute_action,flee_combat}.py` — their three separate use-case classes
//! collapse here into one `Orchestrator` over the generalized `SessionStore`
//! seam, since all three only ever differ in which `Battle` method they
//! call and how they report the result.

use crate::dto::{CombatActionResult, CombatRewardDto, CombatState};
use crate::error::{EngineError, Result};
use crate::model::entity::{CombatEntity, MonsterEntity, PlayerEntity};
use crate::model::monster::MonsterBlueprint;
use crate::model::session::CombatSession;
use crate::model::types::{CombatResultKind, CombatStatus, Id};
use crate::orchestration::battle::Battle;
use crate::rng::BattleRng;
use crate::store::{PlayerLoadout, SessionStore};

/// One player-initiated combat action (§4.6). `CastSpell` carries the id the
/// caller resolved from `CombatState.player.spellCooldowns`' sibling spell
/// list; the orchestrator re-resolves it against the rehydrated entity so a
/// stale id is rejected rather than silently cast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    BasicAttack,
    CastSpell { spell_id: Id },
    UseConsumable,
    Flee,
}

/// What `Orchestrator::execute_action` hands back: the wire-facing DTO plus
/// a reward payload the host applies to its own player-progression system
/// (this crate models no XP/gold ledger of its own — see `PlayerLoadout`'s
/// doc comment).
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    pub dto: CombatActionResult,
    pub reward: Option<CombatRewardDto>,
}

pub struct Orchestrator<S: SessionStore> {
    store: S,
}

impl<S: SessionStore> Orchestrator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Start a new combat session for `player_id` against `monster_blueprint_id`
    /// (§4.6 `startCombat`). `player_level` is forwarded to
    /// `SessionStore::player_loadout` as the level to compute stats for;
    /// `monster_level` defaults to the blueprint's own base level. `now` is
    /// the caller-supplied wall-clock timestamp stamped onto the session's
    /// `started_at` — the engine has no clock of its own (§5, §9).
    pub fn start_combat(
        &mut self,
        player_id: &Id,
        monster_blueprint_id: &Id,
        player_level: i32,
        monster_level: Option<i32>,
        now: &str,
    ) -> Result<CombatState> {
        if self.store.active_session_for_player(player_id).is_some() {
            return Err(EngineError::AlreadyInCombat {
                player_id: player_id.clone(),
            });
        }

        let loadout = self.store.player_loadout(player_id, player_level)?;
        let blueprint = self.store.monster_blueprint(monster_blueprint_id)?;
        let monster_level = monster_level.unwrap_or(blueprint.base_level);
        let monster_stats = blueprint.stats_at_level(monster_level);

        let mut session = self.store.create_session(
            player_id,
            monster_blueprint_id,
            monster_level,
            loadout.stats.max_hp,
            monster_stats.max_hp,
            now,
        )?;

        let status_definitions = self.store.all_status_definitions();
        let mut battle = assemble_battle(&session, &loadout, &blueprint, status_definitions);
        battle.start();

        sync_session(&mut session, &battle);
        self.store.persist_session(&session)?;

        Ok(CombatState::from_battle(&battle))
    }

    /// Run one player action against an in-progress session, then the
    /// monster's reply if the player's turn ends without deciding combat
    /// (§4.6 `execute_action`). `now` stamps `ended_at` if this action
    /// resolves the combat (victory, defeat, or a successful flee).
    pub fn execute_action(
        &mut self,
        session_id: &Id,
        player_id: &Id,
        request: ActionRequest,
        now: &str,
    ) -> Result<ActionResult> {
        let mut session = self.store.load_session(session_id)?;
        if &session.player_id != player_id {
            return Err(EngineError::EntityNotFound {
                kind: "session",
                id: session_id.clone(),
            });
        }
        if session.status != CombatStatus::PlayerTurn {
            return Err(EngineError::NotYourTurn);
        }

        let (mut battle, loadout) = self.rehydrate(&session)?;

        let (success, message) = match &request {
            ActionRequest::BasicAttack => battle.player_basic_attack()?,
            ActionRequest::CastSpell { spell_id } => {
                let spell = battle
                    .player
                    .spell_by_id(spell_id)
                    .cloned()
                    .ok_or_else(|| EngineError::EntityNotFound {
                        kind: "spell",
                        id: spell_id.clone(),
                    })?;
                battle.player_cast_spell(&spell)?
            }
            ActionRequest::UseConsumable => {
                if loadout.consumable_effects.is_empty() {
                    (false, "No consumable equipped".to_string())
                } else {
                    battle.player_use_consumable(&loadout.consumable_effects)?
                }
            }
            ActionRequest::Flee => battle.attempt_flee(now)?,
        };

        let mut terminal: Option<CombatResultKind> = None;

        if matches!(request, ActionRequest::Flee) {
            if success {
                terminal = Some(CombatResultKind::Fled);
            }
            // A failed flee already ended the player's turn inside
            // `attempt_flee`; only the monster's follow-up action, if any,
            // is still outstanding.
            if terminal.is_none() && battle.status == CombatStatus::MonsterTurn {
                terminal = battle.monster_take_turn(now)?;
            }
        } else if success {
            terminal = battle.check_victory(now);
            if terminal.is_none() {
                terminal = battle.player_end_turn(now)?;
            }
            if terminal.is_none() && battle.status == CombatStatus::MonsterTurn {
                terminal = battle.monster_take_turn(now)?;
            }
        }

        let reward = if terminal == Some(CombatResultKind::Victory) {
            Some(CombatRewardDto::from(battle.calculate_rewards()))
        } else {
            None
        };

        sync_session(&mut session, &battle);
        self.store.persist_session(&session)?;

        Ok(ActionResult {
            dto: CombatActionResult {
                success,
                message,
                combat_state: Some(CombatState::from_battle(&battle)),
                combat_ended: terminal.is_some(),
                result: terminal,
            },
            reward,
        })
    }

    /// Convenience wrapper over `execute_action` mirroring the original's
    /// standalone flee use case.
    pub fn flee(&mut self, session_id: &Id, player_id: &Id, now: &str) -> Result<ActionResult> {
        self.execute_action(session_id, player_id, ActionRequest::Flee, now)
    }

    fn rehydrate(&self, session: &CombatSession) -> Result<(Battle, PlayerLoadout)> {
        let loadout = self.store.player_loadout(&session.player_id, 1)?;
        let blueprint = self.store.monster_blueprint(&session.monster_blueprint_id)?;
        let status_definitions = self.store.all_status_definitions();
        let battle = assemble_battle(session, &loadout, &blueprint, status_definitions);
        Ok((battle, loadout))
    }
}

/// Reconstruct the runtime `Battle` from a persisted session plus the
/// static content the store looked up for it (§4.6 `_build_battle`).
fn assemble_battle(
    session: &CombatSession,
    loadout: &PlayerLoadout,
    blueprint: &MonsterBlueprint,
    status_definitions: std::collections::HashMap<String, crate::model::status::StatusDefinition>,
) -> Battle {
    let mut player = PlayerEntity::new(
        session.player_id.clone(),
        loadout.name.clone(),
        loadout.stats,
        loadout.echo_max,
    );
    player.available_spells = loadout.spells.clone();
    player.current_hp = session.player_current_hp;
    player.max_hp = session.player_max_hp;
    player.echo_current = session.player_echo_current;
    player.statuses = session.player_statuses.clone();
    player.gauges = session.player_gauges.clone();
    player.cooldowns = session.player_cooldowns.clone();
    player.consumable_uses_remaining = session.player_consumable_uses_remaining;

    let monster_stats = blueprint.stats_at_level(session.monster_level);
    let mut monster = MonsterEntity {
        base: CombatEntity::new(blueprint.id.clone(), blueprint.name.clone(), monster_stats),
        ai_behavior: blueprint.ai_behavior,
        abilities: blueprint.abilities.clone(),
        xp_reward: blueprint.xp_reward,
        gold_reward_min: blueprint.gold_reward_min,
        gold_reward_max: blueprint.gold_reward_max,
        is_boss: blueprint.is_boss,
    };
    monster.current_hp = session.monster_current_hp;
    monster.max_hp = session.monster_max_hp;
    monster.statuses = session.monster_statuses.clone();
    monster.gauges = session.monster_gauges.clone();
    monster.cooldowns = session.monster_cooldowns.clone();

    let mut battle = Battle::new(session.id.clone(), player, monster, BattleRng::fresh(), status_definitions);
    battle.status = session.status;
    battle.turn_count = session.turn_count;
    battle.current_turn = session.current_turn_entity;
    battle.ended_at = session.ended_at.clone();
    battle
}

/// Copy a `Battle`'s mutable state back onto its persisted `CombatSession`
/// (§4.6 `sync_to_session`). Static content (stats, spells, abilities)
/// never round-trips — it's recomputed from the store on every rehydrate.
fn sync_session(session: &mut CombatSession, battle: &Battle) {
    session.status = battle.status;
    session.turn_count = battle.turn_count;
    session.current_turn_entity = battle.current_turn;
    session.ended_at = battle.ended_at.clone();

    session.player_current_hp = battle.player.current_hp;
    session.player_max_hp = battle.player.max_hp;
    session.player_echo_current = battle.player.echo_current;
    session.player_statuses = battle.player.statuses.clone();
    session.player_gauges = battle.player.gauges.clone();
    session.player_cooldowns = battle.player.cooldowns.clone();
    session.player_consumable_uses_remaining = battle.player.consumable_uses_remaining;

    session.monster_current_hp = battle.monster.current_hp;
    session.monster_max_hp = battle.monster.max_hp;
    session.monster_statuses = battle.monster.statuses.clone();
    session.monster_gauges = battle.monster.gauges.clone();
    session.monster_cooldowns = battle.monster.cooldowns.clone();
}
