//! Runtime combat entities: the mutable half of the player/monster model.

use super::spell::Spell;
use super::status::StatusInstance;
use super::stats::StatsBlock;
use super::types::{DamageType, Id};
use super::monster::MonsterAbility;
use super::types::AiBehavior;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

/// Result of a single `take_damage` call (§4.3).
///
/// `was_critical` always starts `false` — per SPEC_FULL.md §9's resolution of
/// the corresponding Open Question, `take_damage` itself never knows whether
/// the incoming amount came from a crit; the `damage` opcode handler stamps
/// this field once the crit roll is known, before the result is logged or
/// stored as `battle.last_damage`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageResult {
    pub raw: i32,
    pub mitigated: i32,
    pub final_damage: i32,
    pub damage_type: DamageType,
    pub was_critical: bool,
    pub overkill: i32,
}

/// The mutable runtime state shared by players and monsters: HP, statuses,
/// gauges, and ability cooldowns. Owned by its containing `PlayerEntity` or
/// `MonsterEntity` — never shared by reference across the battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatEntity {
    pub id: Id,
    pub name: String,
    pub stats: StatsBlock,
    pub current_hp: i32,
    pub max_hp: i32,
    #[serde(default)]
    pub statuses: HashMap<String, StatusInstance>,
    #[serde(default)]
    pub gauges: HashMap<String, i32>,
    #[serde(default)]
    pub cooldowns: HashMap<String, i32>,
}

impl CombatEntity {
    pub fn new(id: impl Into<Id>, name: impl Into<String>, stats: StatsBlock) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            current_hp: stats.max_hp,
            max_hp: stats.max_hp,
            stats,
            statuses: HashMap::new(),
            gauges: HashMap::new(),
            cooldowns: HashMap::new(),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.current_hp <= 0
    }

    pub fn hp_percent(&self) -> f64 {
        if self.max_hp <= 0 {
            0.0
        } else {
            self.current_hp as f64 / self.max_hp as f64
        }
    }

    pub fn shield(&self) -> i32 {
        *self.gauges.get("shield").unwrap_or(&0)
    }

    /// Apply incoming damage: shield absorbs first, then per-type mitigation,
    /// then clamp to current HP (§4.3). `was_critical` is always `false` in
    /// the returned result; see the doc comment on `DamageResult`.
    pub fn take_damage(&mut self, amount: i32, damage_type: DamageType) -> DamageResult {
        let raw = amount.max(0);
        let mut remaining = raw;

        let shield = self.gauges.entry("shield".to_string()).or_insert(0);
        let absorbed = (*shield).min(remaining);
        *shield -= absorbed;
        remaining -= absorbed;

        let mitigated = match damage_type {
            DamageType::True | DamageType::Stasis => remaining,
            DamageType::Physical => mitigate(remaining, self.stats.armor),
            DamageType::Magic => mitigate(remaining, self.stats.mr),
            DamageType::Mixed => {
                let physical_half = remaining / 2;
                let magic_half = remaining - physical_half;
                mitigate(physical_half, self.stats.armor) + mitigate(magic_half, self.stats.mr)
            }
        };

        let actual = mitigated.min(self.current_hp);
        self.current_hp -= actual;

        DamageResult {
            raw,
            mitigated,
            final_damage: actual,
            damage_type,
            was_critical: false,
            overkill: mitigated - actual,
        }
    }

    pub fn heal(&mut self, amount: i32) -> i32 {
        let amount = amount.max(0).min(self.max_hp - self.current_hp);
        self.current_hp += amount;
        amount
    }

    pub fn has_status(&self, code: &str) -> bool {
        self.statuses.contains_key(code)
    }

    pub fn status_stacks(&self, code: &str) -> i32 {
        self.statuses.get(code).map(|s| s.stacks).unwrap_or(0)
    }

    /// Create-or-refresh a status: keep the larger remaining duration,
    /// add stacks capped at `max_stacks` (§4.2 `apply_status`).
    pub fn add_status(&mut self, code: &str, duration: i32, stacks: i32, max_stacks: Option<i32>) {
        if let Some(existing) = self.statuses.get_mut(code) {
            existing.remaining_turns = existing.remaining_turns.max(duration);
            existing.add_stacks(stacks, max_stacks);
        } else {
            let mut instance = StatusInstance::new(duration, stacks);
            if let Some(max) = max_stacks {
                instance.stacks = instance.stacks.min(max);
            }
            self.statuses.insert(code.to_string(), instance);
        }
    }

    pub fn remove_status(&mut self, code: &str) -> Option<StatusInstance> {
        self.statuses.remove(code)
    }

    pub fn is_on_cooldown(&self, ability_id: &str) -> bool {
        self.cooldowns.get(ability_id).copied().unwrap_or(0) >= 1
    }

    pub fn set_cooldown(&mut self, ability_id: &str, turns: i32) {
        if turns > 0 {
            self.cooldowns.insert(ability_id.to_string(), turns);
        }
    }

    /// Decrement all cooldowns by one, dropping any that reach zero.
    pub fn tick_cooldowns(&mut self) {
        self.cooldowns.retain(|_, turns| {
            *turns -= 1;
            *turns > 0
        });
    }
}

fn mitigate(amount: i32, resist: i32) -> i32 {
    if resist <= 0 {
        return amount;
    }
    let reduction = resist as f64 / (100.0 + resist as f64);
    (amount as f64 * (1.0 - reduction)) as i32
}

/// Player-side combat entity: adds the Echo gauge, known spells, and
/// consumable uses to the shared `CombatEntity` state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntity {
    #[serde(flatten)]
    pub base: CombatEntity,
    pub echo_current: i32,
    pub echo_max: i32,
    #[serde(default)]
    pub available_spells: Vec<Spell>,
    #[serde(default)]
    pub consumable_uses_remaining: i32,
}

impl Deref for PlayerEntity {
    type Target = CombatEntity;
    fn deref(&self) -> &CombatEntity {
        &self.base
    }
}

impl DerefMut for PlayerEntity {
    fn deref_mut(&mut self) -> &mut CombatEntity {
        &mut self.base
    }
}

impl PlayerEntity {
    pub fn new(id: impl Into<Id>, name: impl Into<String>, stats: StatsBlock, echo_max: i32) -> Self {
        Self {
            base: CombatEntity::new(id, name, stats),
            echo_current: 0,
            echo_max,
            available_spells: Vec::new(),
            consumable_uses_remaining: 0,
        }
    }

    pub fn add_echo(&mut self, amount: i32) {
        self.echo_current = (self.echo_current + amount).clamp(0, self.echo_max);
    }

    pub fn consume_echo(&mut self, amount: i32) {
        self.echo_current = (self.echo_current - amount).clamp(0, self.echo_max);
    }

    pub fn can_afford_echo(&self, cost: i32) -> bool {
        self.echo_current >= cost
    }

    pub fn spell_by_id(&self, spell_id: &str) -> Option<&Spell> {
        self.available_spells.iter().find(|s| s.id == spell_id)
    }
}

/// Monster-side combat entity: adds AI behavior, its ability list, and
/// reward fields to the shared `CombatEntity` state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonsterEntity {
    #[serde(flatten)]
    pub base: CombatEntity,
    pub ai_behavior: AiBehavior,
    #[serde(default)]
    pub abilities: Vec<MonsterAbility>,
    pub xp_reward: i32,
    pub gold_reward_min: i32,
    pub gold_reward_max: i32,
    #[serde(default)]
    pub is_boss: bool,
}

impl Deref for MonsterEntity {
    type Target = CombatEntity;
    fn deref(&self) -> &CombatEntity {
        &self.base
    }
}

impl DerefMut for MonsterEntity {
    fn deref_mut(&mut self) -> &mut CombatEntity {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(hp: i32, armor: i32, mr: i32) -> CombatEntity {
        let mut stats = StatsBlock::zero();
        stats.max_hp = hp;
        stats.armor = armor;
        stats.mr = mr;
        CombatEntity::new("e1", "Target", stats)
    }

    #[test]
    fn physical_mitigation_matches_scenario_s2() {
        let mut e = entity(100, 100, 0);
        let result = e.take_damage(100, DamageType::Physical);
        assert_eq!(result.final_damage, 50);
    }

    #[test]
    fn shield_absorbs_before_mitigation_scenario_s3() {
        let mut e = entity(100, 0, 0);
        e.gauges.insert("shield".to_string(), 30);
        let result = e.take_damage(50, DamageType::Physical);
        assert_eq!(e.shield(), 0);
        assert_eq!(result.final_damage, 20);
    }

    #[test]
    fn true_damage_is_unmitigated() {
        let mut e = entity(100, 999, 999);
        let result = e.take_damage(40, DamageType::True);
        assert_eq!(result.final_damage, 40);
    }

    #[test]
    fn damage_clamps_to_current_hp_and_reports_overkill() {
        let mut e = entity(10, 0, 0);
        let result = e.take_damage(25, DamageType::True);
        assert_eq!(result.final_damage, 10);
        assert_eq!(result.overkill, 15);
        assert_eq!(e.current_hp, 0);
    }

    #[test]
    fn heal_clamps_at_max_hp() {
        let mut e = entity(100, 0, 0);
        e.current_hp = 90;
        let healed = e.heal(50);
        assert_eq!(healed, 10);
        assert_eq!(e.current_hp, 100);
    }

    #[test]
    fn apply_status_keeps_larger_remaining_on_refresh() {
        let mut e = entity(100, 0, 0);
        e.add_status("BURN", 2, 1, None);
        e.add_status("BURN", 5, 1, None);
        assert_eq!(e.statuses["BURN"].remaining_turns, 5);
    }

    #[test]
    fn tick_cooldowns_drops_expired_entries() {
        let mut e = entity(100, 0, 0);
        e.set_cooldown("fireball", 1);
        e.tick_cooldowns();
        assert!(!e.is_on_cooldown("fireball"));
    }
}
