//! Status tick processing and duration/cooldown bookkeeping (§4.4).
//!
//! Grounded on `original_source/core/engine/status_engine.py`. Turn-start and
//! turn-end ticks both funnel through `run_effects` so a status's tick effect
//! is just another effect list — no separate interpreter for "things that
//! happen automatically" versus "things a spell does on purpose".

use crate::effects::run_effects;
use crate::model::effect::EffectPayload;
use crate::model::types::{TickTrigger, TurnActor};
use crate::orchestration::battle::Battle;

pub fn process_turn_start(battle: &mut Battle, entity: TurnActor) -> Result<(), String> {
    process_ticks(battle, entity, TickTrigger::OnTurnStart)
}

/// Runs `ON_TURN_END` ticks, then decrements durations (removing anything
/// that expires) and ticks cooldowns down by one, in that order.
pub fn process_turn_end(battle: &mut Battle, entity: TurnActor) -> Result<(), String> {
    process_ticks(battle, entity, TickTrigger::OnTurnEnd)?;
    decrement_status_durations(battle, entity);
    battle.entity_mut(entity).tick_cooldowns();
    Ok(())
}

pub fn process_on_hit(battle: &mut Battle, attacker: TurnActor, target: TurnActor) -> Result<(), String> {
    process_ticks_against(battle, attacker, target, TickTrigger::OnHit)
}

pub fn process_on_damaged(battle: &mut Battle, target: TurnActor, attacker: TurnActor) -> Result<(), String> {
    process_ticks_against(battle, target, attacker, TickTrigger::OnDamaged)
}

/// Tick effects whose source and target are the same entity (turn-start/end).
fn process_ticks(battle: &mut Battle, entity: TurnActor, trigger: TickTrigger) -> Result<(), String> {
    process_ticks_against(battle, entity, entity, trigger)
}

fn process_ticks_against(
    battle: &mut Battle,
    source: TurnActor,
    target: TurnActor,
    trigger: TickTrigger,
) -> Result<(), String> {
    let codes: Vec<String> = battle.entity(source).statuses.keys().cloned().collect();
    for code in codes {
        let Some(def) = battle.status_definition(&code).cloned() else {
            continue;
        };
        if def.tick_trigger != trigger {
            continue;
        }
        let Some(tick_effect) = def.tick_effect.clone() else {
            continue;
        };
        let stacks = battle.entity(source).status_stacks(&code);
        let tick_count = if def.is_stackable { stacks.max(1) } else { 1 };
        let effects: Vec<EffectPayload> = vec![tick_effect];
        for _ in 0..tick_count {
            run_effects(battle, source, target, &effects).map_err(|e| e.to_string())?;
        }
    }
    Ok(())
}

fn decrement_status_durations(battle: &mut Battle, entity: TurnActor) {
    let codes: Vec<String> = battle.entity(entity).statuses.keys().cloned().collect();
    let mut expired = Vec::new();
    for code in codes {
        let instance = battle.entity_mut(entity).statuses.get_mut(&code).expect("just listed");
        if instance.tick() {
            expired.push(code);
        }
    }
    for code in expired {
        battle.entity_mut(entity).remove_status(&code);
        let name = battle.entity(entity).name.clone();
        battle.log(entity, "status", format!("{name}'s {code} expired"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::effect::EffectPayload;
    use crate::model::entity::{CombatEntity, MonsterEntity, PlayerEntity};
    use crate::model::stats::StatsBlock;
    use crate::model::status::StatusDefinition;
    use crate::model::types::AiBehavior;
    use crate::rng::BattleRng;
    use std::collections::HashMap;

    fn battle_with_burn() -> Battle {
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
                tick_trigger: crate::model::types::TickTrigger::OnTurnEnd,
                tick_effect: Some(
                    EffectPayload::new("damage")
                        .with_param("formula", "10".into())
                        .with_param("damage_type", "TRUE".into()),
                ),
            },
        );
        Battle::new("s", player, monster, BattleRng::seeded(1), defs)
    }

    #[test]
    fn turn_end_ticks_burn_then_decrements_and_expires() {
        let mut b = battle_with_burn();
        b.monster.add_status("BURN", 1, 1, None);
        process_turn_end(&mut b, TurnActor::Monster).unwrap();
        assert_eq!(b.monster.current_hp, 90);
        assert!(!b.monster.has_status("BURN"));
    }

    #[test]
    fn turn_end_ticks_survive_to_next_turn_when_duration_remains() {
        let mut b = battle_with_burn();
        b.monster.add_status("BURN", 2, 1, None);
        process_turn_end(&mut b, TurnActor::Monster).unwrap();
        assert_eq!(b.monster.current_hp, 90);
        assert!(b.monster.has_status("BURN"));
    }

    #[test]
    fn unknown_status_definition_is_skipped_without_error() {
        let mut b = battle_with_burn();
        b.monster.add_status("MYSTERY", 2, 1, None);
        process_turn_end(&mut b, TurnActor::Monster).unwrap();
        assert_eq!(b.monster.current_hp, 100);
    }
}
