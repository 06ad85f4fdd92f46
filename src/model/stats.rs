//! Immutable stat blocks and level-scaling composition (§3).

use serde::{Deserialize, Serialize};

/// An immutable block of combat statistics: base stats, equipment bonuses,
/// or a fully-composed current total. Pointwise-additive except for
/// `crit_damage`, which is not meant to stack additively across sources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsBlock {
    pub max_hp: i32,
    pub ad: i32,
    pub ap: i32,
    pub armor: i32,
    pub mr: i32,
    pub speed: i32,
    pub crit_chance: f64,
    pub crit_damage: f64,
}

impl StatsBlock {
    pub const fn zero() -> Self {
        Self {
            max_hp: 0,
            ad: 0,
            ap: 0,
            armor: 0,
            mr: 0,
            speed: 0,
            crit_chance: 0.0,
            crit_damage: 0.0,
        }
    }

    /// Base stats for a level-`level` player, per SPEC_FULL.md §4.6.
    pub fn player_base(level: i32) -> Self {
        Self {
            max_hp: 100 + level * 10,
            ad: 10 + level * 2,
            ap: 10 + level * 2,
            armor: 5 + level,
            mr: 5 + level,
            speed: 10,
            crit_chance: 0.05,
            crit_damage: 1.5,
        }
    }

    /// Apply per-level scaling to produce derived stats at `level_diff`
    /// levels above this block's baseline. Speed and crit stats don't scale.
    pub fn scale(&self, level_diff: i32, scaling: &StatsScaling) -> Self {
        Self {
            max_hp: self.max_hp + (scaling.hp_per_level * level_diff as f64) as i32,
            ad: self.ad + (scaling.ad_per_level * level_diff as f64) as i32,
            ap: self.ap + (scaling.ap_per_level * level_diff as f64) as i32,
            armor: self.armor + (scaling.armor_per_level * level_diff as f64) as i32,
            mr: self.mr + (scaling.mr_per_level * level_diff as f64) as i32,
            speed: self.speed,
            crit_chance: self.crit_chance,
            crit_damage: self.crit_damage,
        }
    }
}

impl Default for StatsBlock {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::ops::Add for StatsBlock {
    type Output = StatsBlock;

    fn add(self, other: StatsBlock) -> StatsBlock {
        StatsBlock {
            max_hp: self.max_hp + other.max_hp,
            ad: self.ad + other.ad,
            ap: self.ap + other.ap,
            armor: self.armor + other.armor,
            mr: self.mr + other.mr,
            speed: self.speed + other.speed,
            crit_chance: self.crit_chance + other.crit_chance,
            crit_damage: self.crit_damage,
        }
    }
}

/// Per-level scaling factors applied to a base `StatsBlock`, used for both
/// player level-ups and monster level scaling (§3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatsScaling {
    pub hp_per_level: f64,
    pub ad_per_level: f64,
    pub ap_per_level: f64,
    pub armor_per_level: f64,
    pub mr_per_level: f64,
}

impl StatsScaling {
    pub const fn zero() -> Self {
        Self {
            hp_per_level: 0.0,
            ad_per_level: 0.0,
            ap_per_level: 0.0,
            armor_per_level: 0.0,
            mr_per_level: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_pointwise_except_crit_damage() {
        let a = StatsBlock {
            crit_damage: 1.5,
            ..StatsBlock::zero()
        };
        let b = StatsBlock {
            ad: 10,
            crit_damage: 2.0,
            ..StatsBlock::zero()
        };
        let sum = a + b;
        assert_eq!(sum.ad, 10);
        assert_eq!(sum.crit_damage, 1.5);
    }

    #[test]
    fn scale_applies_only_requested_fields() {
        let base = StatsBlock {
            max_hp: 100,
            speed: 10,
            ..StatsBlock::zero()
        };
        let scaling = StatsScaling {
            hp_per_level: 5.0,
            ..StatsScaling::zero()
        };
        let scaled = base.scale(3, &scaling);
        assert_eq!(scaled.max_hp, 115);
        assert_eq!(scaled.speed, 10);
    }
}
