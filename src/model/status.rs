//! Status conditions: definitions (static content) and instances (runtime).

use super::effect::EffectPayload;
use super::types::TickTrigger;
use serde::{Deserialize, Serialize};

/// A runtime, mutable status currently affecting an entity (§3).
///
/// Owned by the containing entity; the status engine is the only authority
/// that mutates `remaining_turns`/`stacks` after the initial `apply_status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusInstance {
    pub remaining_turns: i32,
    pub stacks: i32,
}

impl StatusInstance {
    pub fn new(remaining_turns: i32, stacks: i32) -> Self {
        Self {
            remaining_turns: remaining_turns.max(1),
            stacks: stacks.max(1),
        }
    }

    /// Decrement duration by one turn. Returns `true` if the status expired.
    pub fn tick(&mut self) -> bool {
        self.remaining_turns -= 1;
        self.remaining_turns <= 0
    }

    pub fn add_stacks(&mut self, amount: i32, max_stacks: Option<i32>) {
        self.stacks += amount;
        if let Some(max) = max_stacks {
            self.stacks = self.stacks.min(max);
        }
        self.stacks = self.stacks.max(1);
    }

    pub fn remove_stacks(&mut self, amount: i32) {
        self.stacks = (self.stacks - amount).max(0);
    }
}

/// Immutable, store-loaded definition of a status code (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDefinition {
    pub code: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon_key: String,
    pub is_debuff: bool,
    #[serde(default)]
    pub is_stackable: bool,
    #[serde(default = "default_max_stacks")]
    pub max_stacks: i32,
    #[serde(default = "default_tick_trigger")]
    pub tick_trigger: TickTrigger,
    #[serde(default)]
    pub tick_effect: Option<EffectPayload>,
}

fn default_max_stacks() -> i32 {
    1
}

fn default_tick_trigger() -> TickTrigger {
    TickTrigger::OnTurnEnd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_reports_expiry_at_zero() {
        let mut s = StatusInstance::new(1, 1);
        assert!(s.tick());
        assert_eq!(s.remaining_turns, 0);
    }

    #[test]
    fn add_stacks_respects_cap() {
        let mut s = StatusInstance::new(3, 1);
        s.add_stacks(5, Some(3));
        assert_eq!(s.stacks, 3);
    }
}
