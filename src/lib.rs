//! Server-side turn-based combat engine: a data-driven effect VM, status
//! engine, monster AI, and battle orchestrator sitting behind a persistence
//! seam (`store::SessionStore`).
//!
//! This crate has no HTTP, database, or inventory surface of its own — those
//! are named external collaborators a host application wires in through
//! `store::SessionStore` and the blueprint types in `model`. See `DESIGN.md`
//! for how each module is grounded and `SPEC_FULL.md` for the full behavioral
//! contract.

pub mod ai;
pub mod dto;
pub mod effects;
pub mod error;
pub mod formula;
pub mod model;
pub mod observability;
pub mod orchestration;
pub mod rng;
pub mod store;

pub use error::{EngineError, Result};
pub use orchestration::{ActionRequest, ActionResult, Orchestrator};
