//! The effect payload: the unit of work an opcode handler executes (§4.2).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One entry in a spell's, ability's, or status tick's effect list.
///
/// `params` is a free-form bag — each opcode handler interprets its own keys;
/// see `effects::registry` for the table of handlers and their param shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectPayload {
    pub opcode: String,
    #[serde(default)]
    pub params: HashMap<String, Value>,
    #[serde(default)]
    pub order: i32,
}

impl EffectPayload {
    pub fn new(opcode: impl Into<String>) -> Self {
        Self {
            opcode: opcode.into(),
            params: HashMap::new(),
            order: 0,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    pub fn param_f64(&self, key: &str) -> Option<f64> {
        self.params.get(key).and_then(Value::as_f64)
    }

    pub fn param_i64(&self, key: &str) -> Option<i64> {
        self.params.get(key).and_then(Value::as_i64)
    }

    pub fn param_bool(&self, key: &str) -> Option<bool> {
        self.params.get(key).and_then(Value::as_bool)
    }

    /// Sort a slice of effects by `(order, original_index)` ascending, per
    /// §4.2 step 1. `sort_by_key` is stable, so the original index tiebreak
    /// falls out naturally and doesn't need to be stored explicitly.
    pub fn sorted_indices(effects: &[EffectPayload]) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..effects.len()).collect();
        idx.sort_by_key(|&i| effects[i].order);
        idx
    }
}
