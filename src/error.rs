//! Crate-wide error taxonomy (§7, §10.1).
//!
//! Mirrors the shape of the teacher's `error_handling.rs`: a flat enum with a
//! hand-written `Display` rather than a derive macro. `UNKNOWN_OPCODE` and
//! `FORMULA_EVAL_ERROR` from §7 are intentionally absent — both are non-fatal
//! and only ever produce a combat-log line (see `effects::registry::run_effects`
//! and `formula::eval`). Likewise, cooldown/echo/consumable-use preconditions
//! (§7's "soft failure" policy) never reach this enum — `Battle::player_cast_spell`
//! and `Battle::player_use_consumable` report those as an `Ok((false, message))`
//! the caller folds into `CombatActionResult`, not as an `Err`.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    EntityNotFound { kind: &'static str, id: String },
    AlreadyInCombat { player_id: String },
    NotYourTurn,
    ConcurrentModification { session_id: String },
    Internal { reason: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::EntityNotFound { kind, id } => {
                write!(f, "{kind} '{id}' not found")
            }
            EngineError::AlreadyInCombat { player_id } => {
                write!(f, "player '{player_id}' already has an active combat session")
            }
            EngineError::NotYourTurn => write!(f, "it is not your turn"),
            EngineError::ConcurrentModification { session_id } => {
                write!(f, "session '{session_id}' was modified concurrently")
            }
            EngineError::Internal { reason } => write!(f, "internal combat engine error: {reason}"),
        }
    }
}

impl std::error::Error for EngineError {}

pub type Result<T> = std::result::Result<T, EngineError>;
