//! `modify_stat`, `steal_stat` opcodes.
//!
//! Grounded on `original_source/core/effects/modify_stat.py`. Neither opcode
//! touches `StatsBlock` directly — both encode the delta into a synthetic
//! status code (`STAT_{stat}_{sign}{amount}`) that a stat-aware status-engine
//! lookup is expected to fold back into the entity's effective stats at read
//! time, exactly as the original defers the actual modification to status
//! effects rather than mutating stats in place.

use crate::formula::eval_formula;
use crate::model::effect::EffectPayload;
use crate::model::types::TurnActor;
use crate::orchestration::battle::Battle;

pub fn modify_stat(battle: &mut Battle, src: TurnActor, tgt: TurnActor, payload: &EffectPayload) -> Result<(), String> {
    let stat = payload.param_str("stat").unwrap_or("AD");
    let formula = payload.param_str("formula").unwrap_or("0");
    let duration = payload.param_i64("duration_turns").unwrap_or(2) as i32;
    let is_debuff = payload.param_bool("is_debuff").unwrap_or(false);

    let scope = battle.scope(src, tgt);
    let amount = eval_formula(formula, &scope) as i32;
    if amount == 0 {
        return Ok(());
    }

    let sign = if amount < 0 { "-" } else { "+" };
    let status_code = format!("STAT_{stat}_{sign}{}", amount.abs());
    battle.entity_mut(tgt).add_status(&status_code, duration, 1, None);

    let label = if is_debuff { "debuff" } else { "buff" };
    let name = battle.entity(tgt).name.clone();
    battle.log(
        src,
        "stat_mod",
        format!("{name} gains {label}: {stat} {sign}{} for {duration} turns", amount.abs()),
    );
    Ok(())
}

pub fn steal_stat(battle: &mut Battle, src: TurnActor, tgt: TurnActor, payload: &EffectPayload) -> Result<(), String> {
    let stat = payload.param_str("stat").unwrap_or("AD");
    let amount = payload.param_i64("amount").unwrap_or(10) as i32;
    let duration = payload.param_i64("duration_turns").unwrap_or(2) as i32;

    battle
        .entity_mut(tgt)
        .add_status(&format!("STAT_{stat}_-{amount}"), duration, 1, None);
    battle
        .entity_mut(src)
        .add_status(&format!("STAT_{stat}_+{amount}"), duration, 1, None);

    let src_name = battle.entity(src).name.clone();
    let tgt_name = battle.entity(tgt).name.clone();
    battle.log(
        src,
        "stat_mod",
        format!("{src_name} steals {amount} {stat} from {tgt_name} for {duration} turns"),
    );
    Ok(())
}
