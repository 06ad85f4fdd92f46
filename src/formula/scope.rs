//! Closed variable-scope construction from a (source, target) pair (§4.1).

use crate::model::entity::CombatEntity;
use std::collections::HashMap;

/// A flat map of variable name to numeric value, built fresh for each
/// formula evaluation. Immutable once constructed — effect handlers never
/// mutate a `Scope` in place, they build a new one from current entity state.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    vars: HashMap<String, f64>,
}

impl Scope {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.vars.get(name).copied()
    }

    fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.vars.insert(name.into(), value);
    }

    /// Build the scope for `source` acting against `target`, per §4.1.
    /// `source_echo` is `Some((current, max))` only when the source is a
    /// player entity — `ECHO`/`ECHO_MAX`/`S_ECHO` are absent otherwise,
    /// mirroring the original's `hasattr(source, "echo_current")` gate.
    pub fn build(source: &CombatEntity, target: &CombatEntity, source_echo: Option<(i32, i32)>) -> Self {
        let mut scope = Scope::default();

        let s_hp_percent = hp_percent(source);
        let t_hp_percent = hp_percent(target);
        let t_missing_hp = (target.max_hp - target.current_hp).max(0);
        let t_missing_hp_percent = if target.max_hp > 0 {
            t_missing_hp as f64 / target.max_hp as f64
        } else {
            0.0
        };

        for (prefix, entity, hp_pct) in
            [("", source, s_hp_percent), ("S_", source, s_hp_percent), ("T_", target, t_hp_percent)]
        {
            scope.insert(format!("{prefix}AD"), entity.stats.ad as f64);
            scope.insert(format!("{prefix}AP"), entity.stats.ap as f64);
            scope.insert(format!("{prefix}ARMOR"), entity.stats.armor as f64);
            scope.insert(format!("{prefix}MR"), entity.stats.mr as f64);
            scope.insert(format!("{prefix}SPEED"), entity.stats.speed as f64);
            scope.insert(format!("{prefix}MAX_HP"), entity.max_hp as f64);
            scope.insert(format!("{prefix}HP"), entity.current_hp as f64);
            scope.insert(format!("{prefix}CRIT_CHANCE"), entity.stats.crit_chance);
            scope.insert(format!("{prefix}CRIT_DAMAGE"), entity.stats.crit_damage);
            if prefix != "" {
                scope.insert(format!("{prefix}HP_PERCENT"), hp_pct);
            }
        }
        scope.insert("T_MISSING_HP", t_missing_hp as f64);
        scope.insert("T_MISSING_HP_PERCENT", t_missing_hp_percent);

        if let Some((current, max)) = source_echo {
            scope.insert("ECHO", current as f64);
            scope.insert("ECHO_MAX", max as f64);
            scope.insert("S_ECHO", current as f64);
        }

        for (code, status) in &source.statuses {
            scope.insert(format!("S_STACKS_{code}"), status.stacks as f64);
        }
        for (code, status) in &target.statuses {
            scope.insert(format!("T_STACKS_{code}"), status.stacks as f64);
        }

        scope.insert("S_SHIELD", source.shield() as f64);
        scope.insert("T_SHIELD", target.shield() as f64);

        scope
    }
}

fn hp_percent(entity: &CombatEntity) -> f64 {
    if entity.max_hp <= 0 {
        0.0
    } else {
        entity.current_hp as f64 / entity.max_hp as f64
    }
}
