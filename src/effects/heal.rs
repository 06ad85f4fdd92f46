//! `heal`, `heal_percent_max_hp`, `heal_percent_missing_hp`, `lifesteal` opcodes.
//!
//! Grounded on `original_source/core/effects/heal.py` for default param values
//! and log phrasing.

use crate::formula::eval_formula;
use crate::model::effect::EffectPayload;
use crate::model::types::TurnActor;
use crate::orchestration::battle::Battle;

pub fn heal(battle: &mut Battle, src: TurnActor, tgt: TurnActor, payload: &EffectPayload) -> Result<(), String> {
    let formula = payload.param_str("formula").unwrap_or("0");
    let label = payload.param_str("label").unwrap_or("heal");

    let scope = battle.scope(src, tgt);
    let amount = eval_formula(formula, &scope) as i32;
    apply_heal(battle, tgt, amount, label);
    Ok(())
}

pub fn heal_percent_max_hp(
    battle: &mut Battle,
    _src: TurnActor,
    tgt: TurnActor,
    payload: &EffectPayload,
) -> Result<(), String> {
    let percent = payload.param_f64("percent").unwrap_or(0.1);
    let label = payload.param_str("label").unwrap_or("% max HP heal");
    let amount = (battle.entity(tgt).max_hp as f64 * percent) as i32;
    apply_heal(battle, tgt, amount, label);
    Ok(())
}

pub fn heal_percent_missing_hp(
    battle: &mut Battle,
    _src: TurnActor,
    tgt: TurnActor,
    payload: &EffectPayload,
) -> Result<(), String> {
    let percent = payload.param_f64("percent").unwrap_or(0.2);
    let label = payload.param_str("label").unwrap_or("recovery");
    let target = battle.entity(tgt);
    let missing = (target.max_hp - target.current_hp).max(0);
    let amount = (missing as f64 * percent) as i32;
    apply_heal(battle, tgt, amount, label);
    Ok(())
}

/// Heal `source` using `percent` of `battle.last_damage.final_damage`. A
/// no-op if no damage has landed yet this action — matches the original's
/// `if not last_damage: return` guard rather than erroring.
pub fn lifesteal(battle: &mut Battle, src: TurnActor, _tgt: TurnActor, payload: &EffectPayload) -> Result<(), String> {
    let percent = payload.param_f64("percent").unwrap_or(0.2);
    let label = payload.param_str("label").unwrap_or("lifesteal");

    let Some(last) = battle.last_damage else {
        return Ok(());
    };
    let amount = (last.final_damage as f64 * percent) as i32;
    apply_heal(battle, src, amount, label);
    Ok(())
}

fn apply_heal(battle: &mut Battle, tgt: TurnActor, amount: i32, label: &str) {
    let healed = battle.entity_mut(tgt).heal(amount);
    let target = battle.entity(tgt);
    battle.log(
        tgt,
        "heal",
        format!(
            "{} heals {healed} ({label}). HP: {}/{}",
            target.name, target.current_hp, target.max_hp
        ),
    );
}
