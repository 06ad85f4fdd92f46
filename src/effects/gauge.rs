//! `shield`, `remove_shield`, `build_gauge`, `consume_gauge`, `set_gauge` opcodes.
//!
//! Grounded on `original_source/core/effects/shield.py` and `build_gauge.py`.
//! `echo` is special-cased wherever the acting entity is the player — a
//! monster has no Echo gauge, so for a monster-targeted `echo` gauge op this
//! falls through to the generic `gauges` map exactly as the original's
//! `hasattr(entity, 'echo_current')` guard does.

use crate::formula::eval_formula;
use crate::model::effect::EffectPayload;
use crate::model::types::TurnActor;
use crate::orchestration::battle::Battle;

pub fn shield(battle: &mut Battle, src: TurnActor, tgt: TurnActor, payload: &EffectPayload) -> Result<(), String> {
    let formula = payload.param_str("formula").unwrap_or("0");
    let label = payload.param_str("label").unwrap_or("shield");

    let scope = battle.scope(src, tgt);
    let amount = eval_formula(formula, &scope) as i32;
    if amount <= 0 {
        return Ok(());
    }

    let target = battle.entity_mut(tgt);
    let current = *target.gauges.get("shield").unwrap_or(&0);
    target.gauges.insert("shield".to_string(), current + amount);

    let target = battle.entity(tgt);
    battle.log(
        src,
        "shield",
        format!("{} gains {amount} {label} (total: {})", target.name, target.shield()),
    );
    Ok(())
}

pub fn remove_shield(
    battle: &mut Battle,
    src: TurnActor,
    tgt: TurnActor,
    payload: &EffectPayload,
) -> Result<(), String> {
    let current = battle.entity(tgt).shield();
    let name = battle.entity(tgt).name.clone();

    match payload.param_i64("amount") {
        None => {
            battle.entity_mut(tgt).gauges.insert("shield".to_string(), 0);
            battle.log(src, "shield", format!("{name}'s shield removed ({current})"));
        }
        Some(amount) => {
            let removed = (amount as i32).min(current);
            battle.entity_mut(tgt).gauges.insert("shield".to_string(), current - removed);
            battle.log(src, "shield", format!("{name}'s shield reduced by {removed}"));
        }
    }
    Ok(())
}

pub fn build_gauge(
    battle: &mut Battle,
    src: TurnActor,
    tgt: TurnActor,
    payload: &EffectPayload,
) -> Result<(), String> {
    let gauge = payload.param_str("gauge").unwrap_or("echo").to_string();
    let target_self = payload.param_bool("target_self").unwrap_or(gauge == "echo");
    let side = if target_self { src } else { tgt };

    if let Some(status) = payload.param_str("only_if_target_has_status") {
        if !battle.entity(tgt).has_status(status) {
            return Ok(());
        }
    }

    let amount = if let Some(formula) = payload.param_str("formula") {
        let scope = battle.scope(src, tgt);
        eval_formula(formula, &scope) as i32
    } else {
        payload.param_i64("amount").unwrap_or(0) as i32
    };

    if gauge == "echo" && side == TurnActor::Player {
        if amount > 0 {
            let before = battle.player.echo_current;
            battle.player.add_echo(amount);
            let added = battle.player.echo_current - before;
            battle.log(src, "gauge", format!("{} gains {added} Echo (total: {})", battle.player.name, battle.player.echo_current));
        } else {
            battle.player.add_echo(amount);
            battle.log(
                src,
                "gauge",
                format!("{} loses {} Echo (total: {})", battle.player.name, -amount, battle.player.echo_current),
            );
        }
        return Ok(());
    }

    let entity = battle.entity_mut(side);
    let old_value = *entity.gauges.get(&gauge).unwrap_or(&0);
    let new_value = (old_value + amount).max(0);
    entity.gauges.insert(gauge.clone(), new_value);
    let name = entity.name.clone();
    if amount > 0 {
        battle.log(src, "gauge", format!("{name} gains {amount} {gauge} (total: {new_value})"));
    } else {
        battle.log(src, "gauge", format!("{name} loses {} {gauge} (total: {new_value})", -amount));
    }
    Ok(())
}

pub fn consume_gauge(
    battle: &mut Battle,
    src: TurnActor,
    _tgt: TurnActor,
    payload: &EffectPayload,
) -> Result<(), String> {
    let gauge = payload.param_str("gauge").unwrap_or("echo").to_string();
    let amount = payload.param_i64("amount").unwrap_or(0) as i32;
    let require_full = payload.param_bool("require_full").unwrap_or(true);

    if gauge == "echo" && src == TurnActor::Player {
        if require_full && battle.player.echo_current < amount {
            battle.log(
                src,
                "gauge",
                format!("Not enough Echo ({}/{amount})", battle.player.echo_current),
            );
            return Ok(());
        }
        let consumed = amount.min(battle.player.echo_current);
        battle.player.consume_echo(consumed);
        battle.log(src, "gauge", format!("{} consumed {consumed} Echo", battle.player.name));
        return Ok(());
    }

    let source = battle.entity_mut(src);
    let current = *source.gauges.get(&gauge).unwrap_or(&0);
    if require_full && current < amount {
        let name = source.name.clone();
        battle.log(src, "gauge", format!("Not enough {gauge} ({current}/{amount})"));
        let _ = name;
        return Ok(());
    }
    let consumed = amount.min(current);
    source.gauges.insert(gauge.clone(), current - consumed);
    let name = source.name.clone();
    battle.log(src, "gauge", format!("{name} consumed {consumed} {gauge}"));
    Ok(())
}

pub fn set_gauge(battle: &mut Battle, src: TurnActor, tgt: TurnActor, payload: &EffectPayload) -> Result<(), String> {
    let gauge = payload.param_str("gauge").unwrap_or("echo").to_string();
    let value = payload.param_i64("value").unwrap_or(0) as i32;
    let target_self = payload.param_bool("target_self").unwrap_or(true);
    let side = if target_self { src } else { tgt };

    if gauge == "echo" && side == TurnActor::Player {
        battle.player.echo_current = value.clamp(0, battle.player.echo_max);
        battle.log(src, "gauge", format!("{}'s Echo set to {}", battle.player.name, battle.player.echo_current));
        return Ok(());
    }

    let entity = battle.entity_mut(side);
    entity.gauges.insert(gauge.clone(), value);
    let name = entity.name.clone();
    battle.log(src, "gauge", format!("{name}'s {gauge} set to {value}"));
    Ok(())
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
    fn shield_scenario_s3_absorbs_before_mitigation() {
        let mut b = battle();
        let payload = EffectPayload::new("shield").with_param("formula", "30".into());
        shield(&mut b, TurnActor::Player, TurnActor::Monster, &payload).unwrap();
        assert_eq!(b.monster.shield(), 30);
        let result = b.monster.take_damage(50, crate::model::types::DamageType::Physical);
        assert_eq!(result.final_damage, 20);
    }

    #[test]
    fn build_gauge_echo_defaults_to_target_self() {
        let mut b = battle();
        let payload = EffectPayload::new("build_gauge").with_param("amount", 5.into());
        build_gauge(&mut b, TurnActor::Player, TurnActor::Monster, &payload).unwrap();
        assert_eq!(b.player.echo_current, 5);
    }

    #[test]
    fn consume_gauge_requires_full_by_default() {
        let mut b = battle();
        b.player.echo_current = 10;
        let payload = EffectPayload::new("consume_gauge").with_param("amount", 20.into());
        consume_gauge(&mut b, TurnActor::Player, TurnActor::Player, &payload).unwrap();
        assert_eq!(b.player.echo_current, 10);
    }
}
