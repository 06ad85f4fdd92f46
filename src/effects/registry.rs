//! Opcode registry and effect-list dispatch (§4.2).

use super::{conditional, damage, gauge, heal, stat_mod, status_ops};
use crate::error::{EngineError, Result};
use crate::model::effect::EffectPayload;
use crate::model::types::TurnActor;
use crate::orchestration::battle::Battle;
use std::collections::HashMap;
use std::sync::OnceLock;

/// `(battle, src, tgt, params) -> Result<(), String>`. A handler returns
/// `Err` only for a genuine internal anomaly (the Rust analogue of the
/// original's "handler exception" — see §4.2 step 4); recoverable
/// conditions (missing status, zero-division in a sub-expression, etc.)
/// are handled internally and never reach this boundary as an error.
pub type Handler = fn(&mut Battle, TurnActor, TurnActor, &EffectPayload) -> std::result::Result<(), String>;

fn registry() -> &'static HashMap<&'static str, Handler> {
    static REGISTRY: OnceLock<HashMap<&'static str, Handler>> = OnceLock::new();
    REGISTRY.get_or_init(build_registry)
}

/// Registration is performed once, at first use, and is idempotent: the
/// teacher's opcode registration pattern (translated here from the original
/// content engine's `@register(opcode)` decorator) warns rather than panics
/// if an opcode is somehow registered twice.
fn build_registry() -> HashMap<&'static str, Handler> {
    let mut map: HashMap<&'static str, Handler> = HashMap::new();
    let entries: &[(&'static str, Handler)] = &[
        ("damage", damage::damage),
        ("damage_percent_max_hp", damage::damage_percent_max_hp),
        ("damage_percent_missing_hp", damage::damage_percent_missing_hp),
        ("heal", heal::heal),
        ("heal_percent_max_hp", heal::heal_percent_max_hp),
        ("heal_percent_missing_hp", heal::heal_percent_missing_hp),
        ("lifesteal", heal::lifesteal),
        ("apply_status", status_ops::apply_status),
        ("remove_status", status_ops::remove_status),
        ("extend_status", status_ops::extend_status),
        ("transfer_status", status_ops::transfer_status),
        ("shield", gauge::shield),
        ("remove_shield", gauge::remove_shield),
        ("build_gauge", gauge::build_gauge),
        ("consume_gauge", gauge::consume_gauge),
        ("set_gauge", gauge::set_gauge),
        (
            "bonus_damage_if_target_has_status",
            conditional::bonus_damage_if_target_has_status,
        ),
        ("bonus_damage_per_stack", conditional::bonus_damage_per_stack),
        ("execute_if_low_hp", conditional::execute_if_low_hp),
        ("if_condition", conditional::if_condition),
        ("modify_stat", stat_mod::modify_stat),
        ("steal_stat", stat_mod::steal_stat),
    ];

    for (opcode, handler) in entries {
        if map.insert(opcode, *handler).is_some() {
            log::warn!("opcode '{opcode}' registered more than once, keeping latest");
        }
    }
    map
}

/// Run an effect list against `(src, tgt)`, per §4.2's dispatch algorithm:
/// stable-sort by `order`, skip-and-log unknown opcodes, run the rest in
/// order. A handler-level error aborts the whole action (`EngineError::Internal`).
pub fn run_effects(
    battle: &mut Battle,
    src: TurnActor,
    tgt: TurnActor,
    effects: &[EffectPayload],
) -> Result<()> {
    for &idx in &EffectPayload::sorted_indices(effects) {
        let effect = &effects[idx];
        let Some(handler) = registry().get(effect.opcode.as_str()).copied() else {
            log::warn!("unknown opcode '{}'", effect.opcode);
            battle.log(src, "effect", format!("[WARN] unknown opcode '{}'", effect.opcode));
            continue;
        };
        if let Err(reason) = handler(battle, src, tgt, effect) {
            log::warn!("effect handler for '{}' failed: {reason}", effect.opcode);
            return Err(EngineError::Internal {
                reason: format!("opcode '{}' failed: {reason}", effect.opcode),
            });
        }
    }
    Ok(())
}
