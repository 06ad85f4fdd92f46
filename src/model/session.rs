//! Persistent combat session and log rows (§3, §6).

use super::types::{CombatStatus, DamageType, Id, TurnActor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The persistent record of an in-progress or finished combat. Owned by the
/// session store (§4.7) until terminated; runtime entities are reconstructed
/// from it on every action and synced back before the action returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatSession {
    pub id: Id,
    pub player_id: Id,
    pub monster_blueprint_id: Id,
    pub monster_level: i32,
    pub status: CombatStatus,
    pub turn_count: i32,
    pub current_turn_entity: TurnActor,

    pub player_current_hp: i32,
    pub player_max_hp: i32,
    pub player_echo_current: i32,
    pub player_echo_max: i32,
    pub player_statuses: HashMap<String, super::status::StatusInstance>,
    pub player_gauges: HashMap<String, i32>,
    pub player_cooldowns: HashMap<String, i32>,
    pub player_consumable_uses_remaining: i32,

    pub monster_current_hp: i32,
    pub monster_max_hp: i32,
    pub monster_statuses: HashMap<String, super::status::StatusInstance>,
    pub monster_gauges: HashMap<String, i32>,
    pub monster_cooldowns: HashMap<String, i32>,

    pub started_at: String,
    pub ended_at: Option<String>,

    /// Optimistic-concurrency guard (§5). Bumped by every successful write;
    /// a store implementation rejects a write-back whose expected version
    /// doesn't match the persisted one with `EngineError::ConcurrentModification`.
    #[serde(default)]
    pub version: u64,
}

impl CombatSession {
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// One structured entry in a session's combat log (§6 `combat_logs` rows).
///
/// The `logs: last-10-strings` field on `CombatState` is the human-readable
/// projection of this same stream (`message`), trimmed to the most recent
/// ten entries; this richer, structured form is what actually gets
/// persisted and is what combat-history/analytics surfaces would read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatLog {
    pub session_id: Id,
    pub turn: i32,
    pub actor: TurnActor,
    pub action_type: String,
    #[serde(default)]
    pub spell_id: Option<Id>,
    #[serde(default)]
    pub damage_dealt: i32,
    #[serde(default)]
    pub damage_type: Option<DamageType>,
    #[serde(default)]
    pub was_critical: bool,
    #[serde(default)]
    pub echo_gained: i32,
    pub message: String,
}

impl CombatLog {
    pub fn plain(session_id: impl Into<Id>, turn: i32, actor: TurnActor, message: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            turn,
            actor,
            action_type: "log".to_string(),
            spell_id: None,
            damage_dealt: 0,
            damage_type: None,
            was_critical: false,
            echo_gained: 0,
            message: message.into(),
        }
    }
}
