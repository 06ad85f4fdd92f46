//! `damage`, `damage_percent_max_hp`, `damage_percent_missing_hp` opcodes.
//!
//! Grounded on `original_source/core/effects/damage.py` for the exact
//! variance/crit formula and default param values.

use crate::formula::eval_formula;
use crate::model::effect::EffectPayload;
use crate::model::types::{DamageType, TurnActor};
use crate::orchestration::battle::Battle;

pub fn damage(
    battle: &mut Battle,
    src: TurnActor,
    tgt: TurnActor,
    payload: &EffectPayload,
) -> Result<(), String> {
    let formula = payload.param_str("formula").ok_or("damage requires 'formula'")?;
    let damage_type = payload
        .param_str("damage_type")
        .and_then(DamageType::parse)
        .ok_or("damage requires a valid 'damage_type'")?;
    let variance = payload.param_f64("variance").unwrap_or(0.0).clamp(0.0, 0.2);
    let can_crit = payload.param_bool("can_crit").unwrap_or(false);

    let scope = battle.scope(src, tgt);
    let base = eval_formula(formula, &scope);

    let variance_roll = battle.rng.roll_unit();
    let variance_factor = 1.0 + (variance_roll * 2.0 - 1.0) * variance;
    let mut amount = base * variance_factor;

    let source_crit_chance = battle.entity(src).stats.crit_chance;
    let source_crit_damage = battle.entity(src).stats.crit_damage;
    let mut was_critical = false;
    if can_crit {
        let crit_roll = battle.rng.roll_unit();
        if crit_roll < source_crit_chance {
            was_critical = true;
            amount *= source_crit_damage;
        }
    }

    let mut result = battle.entity_mut(tgt).take_damage(amount as i32, damage_type);
    result.was_critical = was_critical;
    battle.last_damage = Some(result);

    let label = payload.param_str("label").unwrap_or("damage");
    let crit_tag = if was_critical { " (crit!)" } else { "" };
    battle.log_damage(
        src,
        label,
        None,
        result,
        format!(
            "{} dealt {} {:?} damage to {}{}",
            battle.entity(src).name.clone(),
            result.final_damage,
            damage_type,
            battle.entity(tgt).name.clone(),
            crit_tag
        ),
    );
    Ok(())
}

pub fn damage_percent_max_hp(
    battle: &mut Battle,
    src: TurnActor,
    tgt: TurnActor,
    payload: &EffectPayload,
) -> Result<(), String> {
    let percent = payload.param_f64("percent").ok_or("requires 'percent'")?;
    let damage_type = payload
        .param_str("damage_type")
        .and_then(DamageType::parse)
        .ok_or("requires a valid 'damage_type'")?;
    let amount = (battle.entity(tgt).max_hp as f64 * percent) as i32;
    apply_flat_damage(battle, src, tgt, amount, damage_type)
}

pub fn damage_percent_missing_hp(
    battle: &mut Battle,
    src: TurnActor,
    tgt: TurnActor,
    payload: &EffectPayload,
) -> Result<(), String> {
    let percent = payload.param_f64("percent").ok_or("requires 'percent'")?;
    let damage_type = payload
        .param_str("damage_type")
        .and_then(DamageType::parse)
        .ok_or("requires a valid 'damage_type'")?;
    let target = battle.entity(tgt);
    let missing = (target.max_hp - target.current_hp).max(0);
    let amount = (missing as f64 * percent) as i32;
    apply_flat_damage(battle, src, tgt, amount, damage_type)
}

fn apply_flat_damage(
    battle: &mut Battle,
    src: TurnActor,
    tgt: TurnActor,
    amount: i32,
    damage_type: DamageType,
) -> Result<(), String> {
    let result = battle.entity_mut(tgt).take_damage(amount, damage_type);
    battle.last_damage = Some(result);
    battle.log_damage(
        src,
        "damage_percent",
        None,
        result,
        format!("{} took {} {:?} damage", battle.entity(tgt).name.clone(), result.final_damage, damage_type),
    );
    Ok(())
}
