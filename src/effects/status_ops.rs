//! `apply_status`, `remove_status`, `extend_status`, `transfer_status` opcodes.
//!
//! Grounded on `original_source/core/effects/apply_status.py`.

use crate::formula::eval_formula;
use crate::model::effect::EffectPayload;
use crate::model::types::TurnActor;
use crate::orchestration::battle::Battle;

pub fn apply_status(
    battle: &mut Battle,
    src: TurnActor,
    tgt: TurnActor,
    payload: &EffectPayload,
) -> Result<(), String> {
    let Some(status_code) = payload.param_str("status_code").filter(|s| !s.is_empty()) else {
        battle.log(src, "effect", "[WARN] apply_status missing status_code");
        return Ok(());
    };
    let status_code = status_code.to_string();
    let duration = payload.param_i64("duration_turns").unwrap_or(1) as i32;
    let stacks = payload.param_i64("stacks").unwrap_or(1) as i32;
    let chance_expr = payload.param_str("chance").unwrap_or("1").to_string();
    let max_stacks = payload.param_i64("max_stacks").map(|v| v as i32);

    let scope = battle.scope(src, tgt);
    let chance = eval_formula(&chance_expr, &scope).clamp(0.0, 1.0);

    if battle.rng.roll_unit() > chance {
        let name = battle.entity(tgt).name.clone();
        battle.log(src, "status", format!("{name} resisted {status_code}"));
        return Ok(());
    }

    battle.entity_mut(tgt).add_status(&status_code, duration, stacks, max_stacks);
    let name = battle.entity(tgt).name.clone();
    battle.log(
        src,
        "status",
        format!("{name} gains {status_code} ({duration} turns, {stacks} stacks)"),
    );
    Ok(())
}

/// Covers the single-code form and the `all_debuffs`/`all_buffs` bulk forms
/// (§4.2) — all three are one opcode in the content model, dispatched on
/// which param is set, exactly as the original's single handler does.
pub fn remove_status(
    battle: &mut Battle,
    src: TurnActor,
    tgt: TurnActor,
    payload: &EffectPayload,
) -> Result<(), String> {
    let all_debuffs = payload.param_bool("all_debuffs").unwrap_or(false);
    let all_buffs = payload.param_bool("all_buffs").unwrap_or(false);

    if all_debuffs || all_buffs {
        let codes: Vec<String> = battle.entity(tgt).statuses.keys().cloned().collect();
        let mut removed = Vec::new();
        for code in codes {
            let is_debuff = battle.status_definition(&code).map(|d| d.is_debuff).unwrap_or(false);
            if is_debuff == all_debuffs {
                battle.entity_mut(tgt).remove_status(&code);
                removed.push(code);
            }
        }
        if !removed.is_empty() {
            let name = battle.entity(tgt).name.clone();
            let label = if all_debuffs { "cleansed" } else { "lost buffs" };
            battle.log(src, "status", format!("{name} {label}: {}", removed.join(", ")));
        }
        return Ok(());
    }

    let Some(status_code) = payload.param_str("status_code") else {
        return Ok(());
    };
    let name = battle.entity(tgt).name.clone();
    if battle.entity_mut(tgt).remove_status(status_code).is_some() {
        battle.log(src, "status", format!("{name} lost {status_code}"));
    } else {
        battle.log(src, "status", format!("{name} doesn't have {status_code}"));
    }
    Ok(())
}

pub fn extend_status(
    battle: &mut Battle,
    src: TurnActor,
    tgt: TurnActor,
    payload: &EffectPayload,
) -> Result<(), String> {
    let Some(status_code) = payload.param_str("status_code").filter(|s| !s.is_empty()) else {
        return Ok(());
    };
    let status_code = status_code.to_string();
    let duration = payload.param_i64("duration_turns").unwrap_or(1) as i32;

    let name = battle.entity(tgt).name.clone();
    if let Some(instance) = battle.entity_mut(tgt).statuses.get_mut(&status_code) {
        instance.remaining_turns += duration;
        battle.log(
            src,
            "status",
            format!("{name}'s {status_code} extended by {duration} turns"),
        );
    }
    Ok(())
}

pub fn transfer_status(
    battle: &mut Battle,
    src: TurnActor,
    tgt: TurnActor,
    payload: &EffectPayload,
) -> Result<(), String> {
    let Some(status_code) = payload.param_str("status_code").filter(|s| !s.is_empty()) else {
        return Ok(());
    };
    let status_code = status_code.to_string();

    let Some(instance) = battle.entity(src).statuses.get(&status_code).cloned() else {
        return Ok(());
    };
    battle
        .entity_mut(tgt)
        .add_status(&status_code, instance.remaining_turns, instance.stacks, None);
    battle.entity_mut(src).remove_status(&status_code);

    let src_name = battle.entity(src).name.clone();
    let tgt_name = battle.entity(tgt).name.clone();
    battle.log(
        src,
        "status",
        format!("{status_code} transferred from {src_name} to {tgt_name}"),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::{CombatEntity, MonsterEntity, PlayerEntity};
    use crate::model::stats::StatsBlock;
    use crate::model::status::StatusDefinition;
    use crate::model::types::{AiBehavior, TickTrigger};
    use crate::rng::BattleRng;
    use std::collections::HashMap;

    fn battle() -> Battle {
        let stats = StatsBlock::zero();
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
        let mut defs = HashMap::new();
        defs.insert(
            "BURN".to_string(),
            StatusDefinition {
                code: "BURN".to_string(),
                display_name: "Burn".to_string(),
                description: String::new(),
                icon_key: String::new(),
                is_debuff: true,
                is_stackable: false,
                max_stacks: 1,
                tick_trigger: TickTrigger::OnTurnEnd,
                tick_effect: None,
            },
        );
        Battle::new("s", player, monster, BattleRng::seeded(1), defs)
    }

    #[test]
    fn apply_status_rolls_against_chance() {
        let mut b = battle();
        b.rng.force_next(0.99);
        let payload = EffectPayload::new("apply_status")
            .with_param("status_code", "BURN".into())
            .with_param("duration_turns", 3.into())
            .with_param("chance", "0.5".into());
        apply_status(&mut b, TurnActor::Player, TurnActor::Monster, &payload).unwrap();
        assert!(!b.monster.has_status("BURN"));
    }

    #[test]
    fn remove_status_all_debuffs_filters_by_definition() {
        let mut b = battle();
        b.monster.add_status("BURN", 3, 1, None);
        let payload = EffectPayload::new("remove_status").with_param("all_debuffs", true.into());
        remove_status(&mut b, TurnActor::Player, TurnActor::Monster, &payload).unwrap();
        assert!(!b.monster.has_status("BURN"));
    }

    #[test]
    fn transfer_status_moves_instance_between_entities() {
        let mut b = battle();
        b.player.add_status("BURN", 3, 2, None);
        let payload = EffectPayload::new("transfer_status").with_param("status_code", "BURN".into());
        transfer_status(&mut b, TurnActor::Player, TurnActor::Monster, &payload).unwrap();
        assert!(!b.player.has_status("BURN"));
        assert_eq!(b.monster.status_stacks("BURN"), 2);
    }
}
