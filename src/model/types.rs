//! Small, closed enumerations shared across the combat engine.

use serde::{Deserialize, Serialize};

/// Identifier type for content blueprints, entities, and sessions.
///
/// The core crate treats ids as opaque strings — it never constructs or
/// parses them itself; hosts may back them with UUIDs (the bundled `cli`
/// binary does, via the optional `uuid` dependency) or any other scheme.
pub type Id = String;

/// The type of damage a `damage`-family opcode deals, and the mitigation
/// branch `take_damage` applies for it (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DamageType {
    Physical,
    Magic,
    True,
    Mixed,
    /// Reserved by the content model; no opcode in this registry emits it.
    Stasis,
}

impl DamageType {
    pub fn parse(s: &str) -> Option<DamageType> {
        match s.to_uppercase().as_str() {
            "PHYSICAL" => Some(DamageType::Physical),
            "MAGIC" => Some(DamageType::Magic),
            "TRUE" => Some(DamageType::True),
            "MIXED" => Some(DamageType::Mixed),
            "STASIS" => Some(DamageType::Stasis),
            _ => None,
        }
    }
}

/// Spell classification. Only `Ultimate` spells cost Echo; only `Skill`
/// spells grant the extra +10 Echo on cast (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpellType {
    Basic,
    Skill,
    Ultimate,
}

/// Monster ability-selection policy (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiBehavior {
    Basic,
    Aggressive,
    Defensive,
    Healer,
    Balanced,
    Boss,
}

/// Combat session lifecycle state (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CombatStatus {
    Pending,
    PlayerTurn,
    MonsterTurn,
    Victory,
    Defeat,
    Abandoned,
}

impl CombatStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CombatStatus::Victory | CombatStatus::Defeat | CombatStatus::Abandoned
        )
    }
}

/// Which side currently holds the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnActor {
    Player,
    Monster,
}

/// When a status's `tick_effect` fires.
///
/// `Immediate` is a declared content value with no driving code path — see
/// SPEC_FULL.md §9's Open Questions decision on this trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TickTrigger {
    OnTurnStart,
    OnTurnEnd,
    OnHit,
    OnDamaged,
    Immediate,
}

/// The outcome of a terminated combat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombatResultKind {
    Victory,
    Defeat,
    Fled,
}
