//! `bonus_damage_if_target_has_status`, `bonus_damage_per_stack`,
//! `execute_if_low_hp`, `if_condition` opcodes.
//!
//! Grounded on `original_source/core/effects/conditional.py`.

use super::registry::run_effects;
use crate::formula::eval_formula;
use crate::model::effect::EffectPayload;
use crate::model::types::{DamageType, TurnActor};
use crate::orchestration::battle::Battle;

pub fn bonus_damage_if_target_has_status(
    battle: &mut Battle,
    src: TurnActor,
    tgt: TurnActor,
    payload: &EffectPayload,
) -> Result<(), String> {
    let status_code = payload.param_str("status_code").unwrap_or("").to_string();
    let formula = payload.param_str("formula").unwrap_or("0");
    let damage_type = payload
        .param_str("damage_type")
        .and_then(DamageType::parse)
        .unwrap_or(DamageType::Physical);
    let consume_status = payload.param_bool("consume_status").unwrap_or(false);

    if !battle.entity(tgt).has_status(&status_code) {
        return Ok(());
    }

    let scope = battle.scope(src, tgt);
    let bonus = eval_formula(formula, &scope) as i32;
    if bonus <= 0 {
        return Ok(());
    }

    let result = battle.entity_mut(tgt).take_damage(bonus, damage_type);
    battle.last_damage = Some(result);
    let src_name = battle.entity(src).name.clone();
    battle.log_damage(
        src,
        "bonus_damage",
        None,
        result,
        format!(
            "{src_name} deals {} bonus damage ({status_code}). HP: {}/{}",
            result.final_damage,
            battle.entity(tgt).current_hp,
            battle.entity(tgt).max_hp
        ),
    );

    if consume_status {
        battle.entity_mut(tgt).remove_status(&status_code);
        battle.log(src, "status", format!("{status_code} consumed"));
    }
    Ok(())
}

pub fn bonus_damage_per_stack(
    battle: &mut Battle,
    src: TurnActor,
    tgt: TurnActor,
    payload: &EffectPayload,
) -> Result<(), String> {
    let status_code = payload.param_str("status_code").unwrap_or("").to_string();
    let damage_per_stack = payload.param_i64("damage_per_stack").unwrap_or(10) as i32;
    let damage_type = payload
        .param_str("damage_type")
        .and_then(DamageType::parse)
        .unwrap_or(DamageType::Magic);
    let consume_stacks = payload.param_bool("consume_stacks").unwrap_or(false);

    let stacks = battle.entity(tgt).status_stacks(&status_code);
    if stacks <= 0 {
        return Ok(());
    }

    let total = damage_per_stack * stacks;
    let result = battle.entity_mut(tgt).take_damage(total, damage_type);
    battle.last_damage = Some(result);
    let src_name = battle.entity(src).name.clone();
    battle.log_damage(
        src,
        "bonus_damage",
        None,
        result,
        format!(
            "{src_name} deals {} damage ({stacks} {status_code} stacks). HP: {}/{}",
            result.final_damage,
            battle.entity(tgt).current_hp,
            battle.entity(tgt).max_hp
        ),
    );

    if consume_stacks {
        battle.entity_mut(tgt).remove_status(&status_code);
    }
    Ok(())
}

pub fn execute_if_low_hp(
    battle: &mut Battle,
    src: TurnActor,
    tgt: TurnActor,
    payload: &EffectPayload,
) -> Result<(), String> {
    let threshold = payload.param_f64("threshold_percent").unwrap_or(0.15);
    let ignore_bosses = payload.param_bool("ignore_bosses").unwrap_or(true);

    if ignore_bosses && tgt == TurnActor::Monster && battle.monster.is_boss {
        return Ok(());
    }

    if battle.entity(tgt).hp_percent() <= threshold {
        battle.entity_mut(tgt).current_hp = 0;
        let src_name = battle.entity(src).name.clone();
        let tgt_name = battle.entity(tgt).name.clone();
        battle.log(src, "execute", format!("{src_name} executes {tgt_name}!"));
    }
    Ok(())
}

/// Evaluate `condition` as a predicate and recurse into `then_effects` or
/// `else_effects` (§4.2 — the only opcode that re-enters dispatch).
pub fn if_condition(
    battle: &mut Battle,
    src: TurnActor,
    tgt: TurnActor,
    payload: &EffectPayload,
) -> Result<(), String> {
    let condition = payload.param_str("condition").unwrap_or("1");
    let scope = battle.scope(src, tgt);
    let truthy = crate::formula::eval_formula(condition, &scope) != 0.0;

    let branch_key = if truthy { "then_effects" } else { "else_effects" };
    let Some(value) = payload.params.get(branch_key) else {
        return Ok(());
    };
    let effects: Vec<EffectPayload> = serde_json::from_value(value.clone())
        .map_err(|e| format!("invalid {branch_key}: {e}"))?;
    if effects.is_empty() {
        return Ok(());
    }
    run_effects(battle, src, tgt, &effects).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::{CombatEntity, MonsterEntity, PlayerEntity};
    use crate::model::stats::StatsBlock;
    use crate::model::types::AiBehavior;
    use crate::rng::BattleRng;
    use std::collections::HashMap;

    fn battle() -> Battle {
        let mut stats = StatsBlock::zero();
        stats.max_hp = 100;
        let player = PlayerEntity::new("p", "Hero", stats, 100);
        let monster = MonsterEntity {
            base: CombatEntity::new("m", "Slime", stats),
            ai_behavior: AiBehavior::Basic,
            abilities: vec![],
            xp_reward: 0,
            gold_reward_min: 0,
            gold_reward_max: 0,
            is_boss: false,
        };
        Battle::new("s", player, monster, BattleRng::seeded(1), HashMap::new())
    }

    #[test]
    fn bonus_damage_requires_status_present() {
        let mut b = battle();
        let payload = EffectPayload::new("bonus_damage_if_target_has_status")
            .with_param("status_code", "MARKED".into())
            .with_param("formula", "20".into());
        bonus_damage_if_target_has_status(&mut b, TurnActor::Player, TurnActor::Monster, &payload).unwrap();
        assert_eq!(b.monster.current_hp, 100);

        b.monster.add_status("MARKED", 2, 1, None);
        bonus_damage_if_target_has_status(&mut b, TurnActor::Player, TurnActor::Monster, &payload).unwrap();
        assert_eq!(b.monster.current_hp, 80);
    }

    #[test]
    fn execute_if_low_hp_ignores_bosses_by_default() {
        let mut b = battle();
        b.monster.is_boss = true;
        b.monster.current_hp = 1;
        let payload = EffectPayload::new("execute_if_low_hp").with_param("threshold_percent", 0.5.into());
        execute_if_low_hp(&mut b, TurnActor::Player, TurnActor::Monster, &payload).unwrap();
        assert_eq!(b.monster.current_hp, 1);
    }

    #[test]
    fn if_condition_runs_then_branch_when_truthy() {
        let mut b = battle();
        let then_effects = serde_json::json!([
            { "opcode": "damage", "params": { "formula": "10", "damage_type": "TRUE" }, "order": 0 }
        ]);
        let payload = EffectPayload::new("if_condition")
            .with_param("condition", "1".into())
            .with_param("then_effects", then_effects);
        if_condition(&mut b, TurnActor::Player, TurnActor::Monster, &payload).unwrap();
        assert_eq!(b.monster.current_hp, 90);
    }
}
