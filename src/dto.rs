//! API-facing DTOs (§6): the shapes an HTTP/RPC layer actually serializes.
//! Grounded on `original_source/application/dto/combat_dto.py`, translated
//! from dataclasses to `serde`-`camelCase` structs.

use crate::model::types::{CombatResultKind, CombatStatus, DamageType, TurnActor};
use crate::orchestration::battle::{Battle, CombatReward};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityState {
    pub name: String,
    pub current_hp: i32,
    pub max_hp: i32,
    #[serde(default)]
    pub statuses: HashMap<String, i32>,
    #[serde(default)]
    pub shield: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    #[serde(flatten)]
    pub entity: EntityState,
    pub echo_current: i32,
    pub echo_max: i32,
    #[serde(default)]
    pub spell_cooldowns: HashMap<String, i32>,
    #[serde(default)]
    pub consumable_uses: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatState {
    pub session_id: String,
    pub status: CombatStatus,
    pub turn_count: i32,
    pub current_turn: TurnActor,
    pub player: PlayerState,
    pub monster: EntityState,
    #[serde(default)]
    pub available_actions: Vec<String>,
    #[serde(default)]
    pub logs: Vec<String>,
}

impl CombatState {
    /// Snapshot a running `Battle` into the wire-facing shape (§4.6
    /// `_session_to_state`). `battle.logs` is already capped to its
    /// last-ten-message projection via `recent_log_messages`.
    pub fn from_battle(battle: &Battle) -> Self {
        let player_statuses = battle
            .player
            .statuses
            .iter()
            .map(|(code, instance)| (code.clone(), instance.stacks))
            .collect();
        let monster_statuses = battle
            .monster
            .statuses
            .iter()
            .map(|(code, instance)| (code.clone(), instance.stacks))
            .collect();

        Self {
            session_id: battle.session_id.clone(),
            status: battle.status,
            turn_count: battle.turn_count,
            current_turn: battle.current_turn,
            available_actions: available_actions(battle),
            player: PlayerState {
                entity: EntityState {
                    name: battle.player.name.clone(),
                    current_hp: battle.player.current_hp,
                    max_hp: battle.player.max_hp,
                    statuses: player_statuses,
                    shield: battle.player.shield(),
                },
                echo_current: battle.player.echo_current,
                echo_max: battle.player.echo_max,
                spell_cooldowns: battle.player.cooldowns.clone(),
                consumable_uses: battle.player.consumable_uses_remaining,
            },
            monster: EntityState {
                name: battle.monster.name.clone(),
                current_hp: battle.monster.current_hp,
                max_hp: battle.monster.max_hp,
                statuses: monster_statuses,
                shield: battle.monster.shield(),
            },
            logs: battle.recent_log_messages(),
        }
    }
}

/// The action ids the player could currently submit and expect accepted
/// (§6 `available_actions`): empty outside `PlayerTurn`, otherwise
/// `basic_attack`/`flee` plus any spell not on cooldown and affordable, plus
/// `use_consumable` while uses remain. A UI uses this to grey out buttons
/// without round-tripping a rejected action first.
fn available_actions(battle: &Battle) -> Vec<String> {
    if battle.status != CombatStatus::PlayerTurn {
        return Vec::new();
    }

    let mut actions = vec!["basic_attack".to_string(), "flee".to_string()];

    for spell in &battle.player.available_spells {
        let on_cooldown = battle.player.is_on_cooldown(&spell.id);
        let affordable = !spell.requires_echo() || battle.player.can_afford_echo(spell.echo_cost);
        if !on_cooldown && affordable {
            actions.push(format!("spell:{}", spell.id));
        }
    }

    if battle.player.consumable_uses_remaining > 0 {
        actions.push("use_consumable".to_string());
    }

    actions
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatActionResult {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub combat_state: Option<CombatState>,
    #[serde(default)]
    pub combat_ended: bool,
    #[serde(default)]
    pub result: Option<CombatResultKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatRewardDto {
    pub xp_gained: i32,
    pub gold_gained: i32,
    #[serde(default)]
    pub levels_gained: i32,
}

impl From<CombatReward> for CombatRewardDto {
    fn from(reward: CombatReward) -> Self {
        Self {
            xp_gained: reward.xp_gained,
            gold_gained: reward.gold_gained,
            levels_gained: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageLog {
    pub source_name: String,
    pub target_name: String,
    pub damage_amount: i32,
    pub damage_type: DamageType,
    #[serde(default)]
    pub was_critical: bool,
    #[serde(default)]
    pub ability_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::{CombatEntity, MonsterEntity, PlayerEntity};
    use crate::model::stats::StatsBlock;
    use crate::model::types::AiBehavior;
    use crate::rng::BattleRng;
    use std::collections::HashMap as Map;

    #[test]
    fn from_battle_reports_shield_and_status_stacks() {
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
        let mut battle = Battle::new("s", player, monster, BattleRng::seeded(1), Map::new());
        battle.player.gauges.insert("shield".to_string(), 15);
        battle.monster.add_status("BURN", 2, 3, None);

        let state = CombatState::from_battle(&battle);
        assert_eq!(state.player.entity.shield, 15);
        assert_eq!(state.monster.statuses.get("BURN"), Some(&3));
    }
}
