//! The persistence boundary (§4.7): a `SessionStore` trait the orchestrator
//! depends on, plus an in-memory reference implementation.
//!
//! Grounded on `original_source/application/interfaces/repositories.py`'s
//! `ICombatRepository`/`IMonsterRepository`/`IItemRepository`/`IPlayerRepository`
//! — collapsed into one trait sized to what combat actually reads and writes,
//! since this crate has no user/achievement/inventory surface of its own.
//! Every call is synchronous and per-call transactional, matching §5's
//! requirement that a store commit or reject a whole action atomically.

mod memory;

pub use memory::MemoryStore;

use crate::error::{EngineError, Result};
use crate::model::monster::MonsterBlueprint;
use crate::model::session::CombatSession;
use crate::model::spell::Spell;
use crate::model::stats::StatsBlock;
use crate::model::status::StatusDefinition;
use crate::model::types::Id;
use std::collections::HashMap;

/// A snapshot of everything the orchestrator needs to know about a player to
/// build a `PlayerEntity` (§4.6 `_calculate_player_stats`): a display name, a
/// computed stat block (base-by-level plus equipped-item bonuses, already
/// folded together by the store), and the spells granted by their equipped
/// weapons.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerLoadout {
    pub name: String,
    pub stats: StatsBlock,
    pub echo_max: i32,
    pub consumable_uses: i32,
    pub spells: Vec<Spell>,
    pub consumable_effects: Vec<crate::model::effect::EffectPayload>,
}

/// The persistence seam between the orchestrator and whatever actually
/// stores sessions, blueprints, and player data (a database, in production;
/// `MemoryStore` below, in tests and the bundled CLI).
pub trait SessionStore {
    fn load_session(&self, session_id: &Id) -> Result<CombatSession>;

    fn active_session_for_player(&self, player_id: &Id) -> Option<CombatSession>;

    /// `started_at` is supplied by the caller rather than read from the
    /// system clock (§5, §9 — the engine has no ambient I/O of its own);
    /// the orchestrator forwards whatever `now` it was given.
    fn create_session(
        &mut self,
        player_id: &Id,
        monster_blueprint_id: &Id,
        monster_level: i32,
        player_max_hp: i32,
        monster_max_hp: i32,
        started_at: &str,
    ) -> Result<CombatSession>;

    /// Write `session` back, rejecting the write with
    /// `EngineError::ConcurrentModification` if `session.version` doesn't
    /// match what's currently persisted (§5 optimistic concurrency).
    fn persist_session(&mut self, session: &CombatSession) -> Result<()>;

    fn all_status_definitions(&self) -> HashMap<String, StatusDefinition>;

    fn monster_blueprint(&self, blueprint_id: &Id) -> Result<MonsterBlueprint>;

    fn player_loadout(&self, player_id: &Id, player_level: i32) -> Result<PlayerLoadout>;
}

pub(crate) fn entity_not_found(kind: &'static str, id: &Id) -> EngineError {
    EngineError::EntityNotFound { kind, id: id.clone() }
}
