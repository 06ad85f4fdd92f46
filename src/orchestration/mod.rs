//! The combat orchestrator: `Battle` runtime state, status-tick processing,
//! and the public state machine operations (§4.4, §4.6).

pub mod battle;
pub mod orchestrator;
pub mod status_engine;

pub use battle::Battle;
pub use orchestrator::{ActionRequest, ActionResult, Orchestrator};
