//! Monster content: abilities, blueprints, and loot tables.

use super::effect::EffectPayload;
use super::stats::{StatsBlock, StatsScaling};
use super::types::{AiBehavior, Id};
use serde::{Deserialize, Serialize};

/// An ability a monster may use in combat, selected by `ai::select_action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonsterAbility {
    pub id: Id,
    pub monster_blueprint_id: Id,
    pub name: String,
    #[serde(default)]
    pub cooldown: i32,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub condition_expr: Option<String>,
    #[serde(default)]
    pub effects: Vec<EffectPayload>,
}

fn default_priority() -> i32 {
    1
}

impl MonsterAbility {
    /// True if the name or any effect opcode suggests a healing/shield
    /// intent — used by the `defensive`/`healer` AI behaviors (§4.5) to pick
    /// a self-preserving ability without inspecting formulas.
    pub fn looks_like_heal_or_shield(&self) -> bool {
        const HEAL_OPCODES: &[&str] = &[
            "heal",
            "heal_percent_max_hp",
            "heal_percent_missing_hp",
            "lifesteal",
            "shield",
        ];
        self.name.to_lowercase().contains("heal")
            || self
                .effects
                .iter()
                .any(|e| HEAL_OPCODES.contains(&e.opcode.as_str()))
    }
}

/// Static definition of a monster type. Monsters are instantiated from a
/// blueprint at combat start, scaled to `monster_level` (§4.6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonsterBlueprint {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_level: i32,
    #[serde(default = "default_behavior")]
    pub ai_behavior: AiBehavior,
    #[serde(default)]
    pub loot_table_id: Option<Id>,
    #[serde(default)]
    pub xp_reward: i32,
    #[serde(default)]
    pub gold_reward_min: i32,
    #[serde(default)]
    pub gold_reward_max: i32,
    #[serde(default)]
    pub is_boss: bool,
    #[serde(default = "StatsBlock::zero")]
    pub base_stats: StatsBlock,
    #[serde(default = "StatsScaling::zero")]
    pub scaling: StatsScaling,
    #[serde(default)]
    pub abilities: Vec<MonsterAbility>,
}

fn default_behavior() -> AiBehavior {
    AiBehavior::Basic
}

impl MonsterBlueprint {
    pub fn stats_at_level(&self, level: i32) -> StatsBlock {
        self.base_stats.scale(level - self.base_level, &self.scaling)
    }
}

/// A named collection of weighted loot entries. Resolution into concrete
/// item drops is an opaque interface this crate calls but does not
/// implement (§4.6, §6) — inventory/equipment CRUD is out of scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootTable {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub entries: Vec<LootTableEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootTableEntry {
    pub id: Id,
    pub loot_table_id: Id,
    pub item_blueprint_id: Id,
    #[serde(default = "default_weight")]
    pub weight: i32,
    #[serde(default = "default_quantity")]
    pub min_quantity: i32,
    #[serde(default = "default_quantity")]
    pub max_quantity: i32,
    #[serde(default = "default_min_level")]
    pub min_player_level: i32,
}

fn default_weight() -> i32 {
    100
}
fn default_quantity() -> i32 {
    1
}
fn default_min_level() -> i32 {
    1
}
