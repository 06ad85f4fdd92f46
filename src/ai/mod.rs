//! Monster action selection (§4.5).
//!
//! Grounded on `original_source/core/ai/monster_ai.py`. Each behavior
//! function works over the pool of abilities already filtered by cooldown
//! availability and `condition_expr`; `select_monster_action` owns that
//! filtering and dispatches to the behavior-specific picker.

use crate::model::monster::MonsterAbility;
use crate::model::types::AiBehavior;
use crate::orchestration::battle::Battle;

/// Pick the monster's action for this turn, or `None` to fall back to a
/// basic attack (no usable ability survived filtering).
pub fn select_monster_action(battle: &mut Battle) -> Option<MonsterAbility> {
    let available: Vec<MonsterAbility> = battle
        .monster
        .abilities
        .iter()
        .filter(|a| !battle.monster.is_on_cooldown(&a.id))
        .cloned()
        .collect();

    if available.is_empty() {
        return None;
    }

    let valid: Vec<MonsterAbility> = available
        .into_iter()
        .filter(|ability| check_condition(battle, ability))
        .collect();

    if valid.is_empty() {
        return None;
    }

    match battle.monster.ai_behavior {
        AiBehavior::Basic => select_basic(battle, &valid),
        AiBehavior::Aggressive => select_aggressive(battle, &valid),
        AiBehavior::Defensive => select_defensive(battle, &valid),
        AiBehavior::Healer => select_healer(battle, &valid),
        AiBehavior::Balanced => select_balanced(battle, &valid),
        AiBehavior::Boss => select_boss(battle, &valid),
    }
    .cloned()
}

fn check_condition(battle: &Battle, ability: &MonsterAbility) -> bool {
    let Some(expr) = ability.condition_expr.as_deref().filter(|e| !e.trim().is_empty()) else {
        return true;
    };
    let scope = battle.scope(
        crate::model::types::TurnActor::Monster,
        crate::model::types::TurnActor::Player,
    );
    crate::formula::eval_predicate(expr, &scope)
}

/// Weighted-random draw by `priority`: roll a point in `[0, total_weight)`
/// and walk the cumulative sum until it's covered.
fn select_basic<'a>(battle: &mut Battle, abilities: &'a [MonsterAbility]) -> Option<&'a MonsterAbility> {
    if abilities.is_empty() {
        return None;
    }
    let total_weight: i32 = abilities.iter().map(|a| a.priority).sum();
    if total_weight <= 0 {
        return abilities.first();
    }
    let roll = battle.rng.roll_unit() * total_weight as f64;
    let mut cumulative = 0.0;
    for ability in abilities {
        cumulative += ability.priority as f64;
        if roll <= cumulative {
            return Some(ability);
        }
    }
    abilities.first()
}

fn strongest(abilities: &[MonsterAbility]) -> Option<&MonsterAbility> {
    abilities.iter().max_by_key(|a| a.priority)
}

fn select_aggressive<'a>(battle: &mut Battle, abilities: &'a [MonsterAbility]) -> Option<&'a MonsterAbility> {
    if abilities.is_empty() {
        return None;
    }
    if battle.player.hp_percent() < 0.3 {
        return strongest(abilities);
    }
    if battle.rng.roll_unit() < 0.7 {
        return strongest(abilities);
    }
    select_basic(battle, abilities)
}

fn select_defensive<'a>(battle: &mut Battle, abilities: &'a [MonsterAbility]) -> Option<&'a MonsterAbility> {
    if battle.monster.hp_percent() < 0.4 {
        if let Some(healer) = abilities.iter().find(|a| a.looks_like_heal_or_shield()) {
            return Some(healer);
        }
    }
    select_basic(battle, abilities)
}

fn select_healer<'a>(battle: &mut Battle, abilities: &'a [MonsterAbility]) -> Option<&'a MonsterAbility> {
    let healing: Vec<&MonsterAbility> = abilities.iter().filter(|a| a.looks_like_heal_or_shield()).collect();
    if !healing.is_empty() && battle.monster.hp_percent() < 0.8 {
        return healing.into_iter().next();
    }
    select_basic(battle, abilities)
}

fn select_balanced<'a>(battle: &mut Battle, abilities: &'a [MonsterAbility]) -> Option<&'a MonsterAbility> {
    if battle.monster.hp_percent() < 0.3 {
        return select_defensive(battle, abilities);
    }
    if battle.player.hp_percent() < 0.3 {
        return select_aggressive(battle, abilities);
    }
    select_basic(battle, abilities)
}

/// Three HP-percent phases: calm (>0.7, weighted), aggressive ((0.4, 0.7],
/// 60% strongest / 40% weighted), enraged (<=0.4, always strongest).
fn select_boss<'a>(battle: &mut Battle, abilities: &'a [MonsterAbility]) -> Option<&'a MonsterAbility> {
    let hp_percent = battle.monster.hp_percent();
    if hp_percent > 0.7 {
        select_basic(battle, abilities)
    } else if hp_percent > 0.4 {
        if battle.rng.roll_unit() < 0.6 {
            strongest(abilities)
        } else {
            select_basic(battle, abilities)
        }
    } else {
        strongest(abilities)
    }
}
