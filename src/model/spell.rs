//! Spells: player-facing abilities attached to an equipped weapon.

use super::effect::EffectPayload;
use super::types::{Id, SpellType};
use serde::{Deserialize, Serialize};

/// An ability attached to a weapon. Each weapon provides up to three spells
/// (two skills plus one ultimate per weapon), per `spell_order` 1..3 for the
/// primary weapon and 4..6 for the secondary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spell {
    pub id: Id,
    pub weapon_blueprint_id: Id,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub spell_type: SpellType,
    #[serde(default = "default_spell_order")]
    pub spell_order: i32,
    #[serde(default)]
    pub cooldown_turns: i32,
    #[serde(default)]
    pub echo_cost: i32,
    #[serde(default)]
    pub effects: Vec<EffectPayload>,
}

fn default_spell_order() -> i32 {
    1
}

impl Spell {
    pub fn is_ultimate(&self) -> bool {
        self.spell_type == SpellType::Ultimate
    }

    pub fn is_basic(&self) -> bool {
        self.spell_type == SpellType::Basic
    }

    pub fn has_cooldown(&self) -> bool {
        self.cooldown_turns > 0
    }

    pub fn requires_echo(&self) -> bool {
        self.echo_cost > 0
    }
}
