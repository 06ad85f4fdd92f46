//! The in-memory `Battle`: a battle-scoped table of the two entities plus
//! the small mutable slots effect handlers and AI share (§9 design notes —
//! "design as exclusive per-action ownership with indices into a
//! battle-scoped entity table rather than stored references").

use crate::ai;
use crate::effects::run_effects;
use crate::formula::Scope;
use crate::model::effect::EffectPayload;
use crate::model::entity::{CombatEntity, DamageResult, MonsterEntity, PlayerEntity};
use crate::model::session::CombatLog;
use crate::model::spell::Spell;
use crate::model::status::StatusDefinition;
use crate::model::types::{CombatResultKind, CombatStatus, Id, TurnActor};
use crate::rng::BattleRng;
use std::collections::HashMap;

/// Reward payload for a victorious combat (§4.6 `calculateRewards`).
#[derive(Debug, Clone, PartialEq)]
pub struct CombatReward {
    pub xp_gained: i32,
    pub gold_gained: i32,
}

/// One live combat, reconstructed from a `CombatSession` at the start of an
/// action and synced back at the end (§4.6). No `Battle` outlives a single
/// orchestrator call.
pub struct Battle {
    pub session_id: Id,
    pub player: PlayerEntity,
    pub monster: MonsterEntity,
    pub status: CombatStatus,
    pub turn_count: i32,
    pub current_turn: TurnActor,
    pub rng: BattleRng,
    /// The most recent `DamageResult`, consumed by opcodes like `lifesteal`
    /// that need "the damage that was just dealt" without re-deriving it.
    pub last_damage: Option<DamageResult>,
    pub logs: Vec<CombatLog>,
    /// Read-only content cache for this battle, keyed by status code
    /// (§4.7 `allStatusDefinitions`). Looked up by the status engine on
    /// every turn-boundary tick and by `remove_status`'s `all_debuffs`/
    /// `all_buffs` variants.
    pub status_definitions: HashMap<String, StatusDefinition>,
    /// Stamped by `check_victory`/`attempt_flee` the moment combat reaches a
    /// terminal status (§4.6, §8 property 5). The engine never reads the
    /// system clock itself — the caller-supplied `now` is the only source
    /// of this value, the same way a `Battle`'s RNG seed is supplied rather
    /// than drawn from ambient entropy.
    pub ended_at: Option<String>,
}

impl Battle {
    pub fn new(
        session_id: impl Into<Id>,
        player: PlayerEntity,
        monster: MonsterEntity,
        rng: BattleRng,
        status_definitions: HashMap<String, StatusDefinition>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            player,
            monster,
            status: CombatStatus::PlayerTurn,
            turn_count: 1,
            current_turn: TurnActor::Player,
            rng,
            last_damage: None,
            logs: Vec::new(),
            status_definitions,
            ended_at: None,
        }
    }

    pub fn status_definition(&self, code: &str) -> Option<&StatusDefinition> {
        self.status_definitions.get(code)
    }

    pub fn entity(&self, side: TurnActor) -> &CombatEntity {
        match side {
            TurnActor::Player => &self.player.base,
            TurnActor::Monster => &self.monster.base,
        }
    }

    pub fn entity_mut(&mut self, side: TurnActor) -> &mut CombatEntity {
        match side {
            TurnActor::Player => &mut self.player.base,
            TurnActor::Monster => &mut self.monster.base,
        }
    }

    pub fn opposite(side: TurnActor) -> TurnActor {
        match side {
            TurnActor::Player => TurnActor::Monster,
            TurnActor::Monster => TurnActor::Player,
        }
    }

    fn echo_of(&self, side: TurnActor) -> Option<(i32, i32)> {
        match side {
            TurnActor::Player => Some((self.player.echo_current, self.player.echo_max)),
            TurnActor::Monster => None,
        }
    }

    /// Build the formula scope for `src` acting against `tgt` (§4.1).
    pub fn scope(&self, src: TurnActor, tgt: TurnActor) -> Scope {
        Scope::build(self.entity(src), self.entity(tgt), self.echo_of(src))
    }

    pub fn log(&mut self, actor: TurnActor, action_type: impl Into<String>, message: impl Into<String>) {
        self.logs.push(CombatLog {
            session_id: self.session_id.clone(),
            turn: self.turn_count,
            actor,
            action_type: action_type.into(),
            spell_id: None,
            damage_dealt: 0,
            damage_type: None,
            was_critical: false,
            echo_gained: 0,
            message: message.into(),
        });
    }

    pub fn log_damage(
        &mut self,
        actor: TurnActor,
        action_type: impl Into<String>,
        spell_id: Option<Id>,
        result: DamageResult,
        message: impl Into<String>,
    ) {
        self.logs.push(CombatLog {
            session_id: self.session_id.clone(),
            turn: self.turn_count,
            actor,
            action_type: action_type.into(),
            spell_id,
            damage_dealt: result.final_damage,
            damage_type: Some(result.damage_type),
            was_critical: result.was_critical,
            echo_gained: 0,
            message: message.into(),
        });
    }

    /// Last ten human-readable log lines, for the `CombatState.logs` DTO
    /// field (§6).
    pub fn recent_log_messages(&self) -> Vec<String> {
        self.logs
            .iter()
            .rev()
            .take(10)
            .rev()
            .map(|l| l.message.clone())
            .collect()
    }

    /// Initial combat-start log lines (§4.6 `startCombat`).
    pub fn start(&mut self) {
        self.log(
            TurnActor::Player,
            "log",
            format!("Combat started! {} vs {}", self.player.name, self.monster.name),
        );
        self.log(
            TurnActor::Player,
            "log",
            format!("Player HP: {}/{}", self.player.current_hp, self.player.max_hp),
        );
        self.log(
            TurnActor::Player,
            "log",
            format!("Monster HP: {}/{}", self.monster.current_hp, self.monster.max_hp),
        );
    }

    pub fn is_active(&self) -> bool {
        !self.status.is_terminal() && !self.player.is_dead() && !self.monster.is_dead()
    }

    /// Transition to `Victory`/`Defeat` if either side has fallen (§4.6).
    /// Idempotent — calling it again once terminal is a no-op that returns
    /// the same result. `now` stamps `ended_at`; a second call (or one made
    /// after `attempt_flee` already stamped it) leaves the first timestamp
    /// in place.
    pub fn check_victory(&mut self, now: &str) -> Option<CombatResultKind> {
        if self.monster.is_dead() {
            self.status = CombatStatus::Victory;
            self.ended_at.get_or_insert_with(|| now.to_string());
            self.log(TurnActor::Player, "log", format!("{} has been defeated!", self.monster.name));
            return Some(CombatResultKind::Victory);
        }
        if self.player.is_dead() {
            self.status = CombatStatus::Defeat;
            self.ended_at.get_or_insert_with(|| now.to_string());
            self.log(TurnActor::Player, "log", format!("{} has been defeated!", self.player.name));
            return Some(CombatResultKind::Defeat);
        }
        None
    }

    /// `AD * 1.0` physical attack with a 10% variance band and crit enabled
    /// (§4.6 `player_basic_attack`).
    pub fn player_basic_attack(&mut self) -> Result<(bool, String), crate::error::EngineError> {
        if self.status != CombatStatus::PlayerTurn {
            return Ok((false, "Not your turn".to_string()));
        }
        self.log(TurnActor::Player, "log", format!("{} attacks!", self.player.name));

        let effect = EffectPayload::new("damage")
            .with_param("formula", "AD * 1.0".into())
            .with_param("damage_type", "PHYSICAL".into())
            .with_param("can_crit", true.into())
            .with_param("variance", 0.1.into())
            .with_param("label", "attack".into());
        run_effects(self, TurnActor::Player, TurnActor::Monster, std::slice::from_ref(&effect))?;

        self.player.add_echo(5);
        Ok((true, "OK".to_string()))
    }

    /// Cast `spell` (already resolved by the caller from
    /// `player.available_spells`) against the monster (§4.6 `player_cast_spell`).
    pub fn player_cast_spell(&mut self, spell: &Spell) -> Result<(bool, String), crate::error::EngineError> {
        if self.status != CombatStatus::PlayerTurn {
            return Ok((false, "Not your turn".to_string()));
        }
        if self.player.is_on_cooldown(&spell.id) {
            return Ok((false, format!("{} is on cooldown", spell.name)));
        }
        if spell.requires_echo() && !self.player.can_afford_echo(spell.echo_cost) {
            return Ok((false, "Not enough Echo".to_string()));
        }

        if spell.echo_cost > 0 {
            self.player.consume_echo(spell.echo_cost);
            self.log(TurnActor::Player, "log", format!("{} uses {} Echo", self.player.name, spell.echo_cost));
        }

        self.log(TurnActor::Player, "log", format!("{} casts {}!", self.player.name, spell.name));
        run_effects(self, TurnActor::Player, TurnActor::Monster, &spell.effects)?;

        if spell.has_cooldown() {
            self.player.set_cooldown(&spell.id, spell.cooldown_turns);
        }

        if !spell.is_ultimate() {
            let echo_gain = 5 + if spell.spell_type == crate::model::types::SpellType::Skill { 10 } else { 0 };
            self.player.add_echo(echo_gain);
        }

        Ok((true, "OK".to_string()))
    }

    /// Consume the player's single consumable charge and run its effects
    /// against itself (§4.6 `player_use_consumable`).
    pub fn player_use_consumable(&mut self, effects: &[EffectPayload]) -> Result<(bool, String), crate::error::EngineError> {
        if self.status != CombatStatus::PlayerTurn {
            return Ok((false, "Not your turn".to_string()));
        }
        if self.player.consumable_uses_remaining <= 0 {
            return Ok((false, "No consumable uses remaining".to_string()));
        }
        self.player.consumable_uses_remaining -= 1;

        self.log(TurnActor::Player, "log", format!("{} uses a consumable!", self.player.name));
        run_effects(self, TurnActor::Player, TurnActor::Player, effects)?;
        Ok((true, "OK".to_string()))
    }

    /// End the player's turn: tick statuses/cooldowns, check victory, then
    /// hand control to the monster (§4.6 `player_end_turn`).
    pub fn player_end_turn(&mut self, now: &str) -> Result<Option<CombatResultKind>, crate::error::EngineError> {
        crate::orchestration::status_engine::process_turn_end(self, TurnActor::Player)
            .map_err(|reason| crate::error::EngineError::Internal { reason })?;

        if let Some(result) = self.check_victory(now) {
            return Ok(Some(result));
        }

        self.turn_count += 1;
        self.status = CombatStatus::MonsterTurn;
        self.current_turn = TurnActor::Monster;
        self.log(TurnActor::Monster, "log", format!("--- Monster's Turn (Turn {}) ---", self.turn_count));

        crate::orchestration::status_engine::process_turn_start(self, TurnActor::Monster)
            .map_err(|reason| crate::error::EngineError::Internal { reason })?;
        Ok(None)
    }

    /// Run the monster's AI-selected action (or a basic attack fallback),
    /// then end its turn (§4.6 `monster_take_turn`).
    pub fn monster_take_turn(&mut self, now: &str) -> Result<Option<CombatResultKind>, crate::error::EngineError> {
        if self.status != CombatStatus::MonsterTurn {
            return Ok(None);
        }

        match ai::select_monster_action(self) {
            Some(ability) => {
                self.log(TurnActor::Monster, "log", format!("{} uses {}!", self.monster.name, ability.name));
                run_effects(self, TurnActor::Monster, TurnActor::Player, &ability.effects)?;
                if ability.cooldown > 0 {
                    self.monster.set_cooldown(&ability.id, ability.cooldown);
                }
            }
            None => {
                self.log(TurnActor::Monster, "log", format!("{} attacks!", self.monster.name));
                let effect = EffectPayload::new("damage")
                    .with_param("formula", "AD * 1.0".into())
                    .with_param("damage_type", "PHYSICAL".into())
                    .with_param("label", "attack".into());
                run_effects(self, TurnActor::Monster, TurnActor::Player, std::slice::from_ref(&effect))?;
            }
        }

        self.monster_end_turn(now)
    }

    /// End the monster's turn: tick statuses/cooldowns, check victory, then
    /// hand control back to the player (§4.6 `monster_end_turn`).
    pub fn monster_end_turn(&mut self, now: &str) -> Result<Option<CombatResultKind>, crate::error::EngineError> {
        crate::orchestration::status_engine::process_turn_end(self, TurnActor::Monster)
            .map_err(|reason| crate::error::EngineError::Internal { reason })?;

        if let Some(result) = self.check_victory(now) {
            return Ok(Some(result));
        }

        self.turn_count += 1;
        self.status = CombatStatus::PlayerTurn;
        self.current_turn = TurnActor::Player;
        self.log(TurnActor::Player, "log", format!("--- Player's Turn (Turn {}) ---", self.turn_count));

        crate::orchestration::status_engine::process_turn_start(self, TurnActor::Player)
            .map_err(|reason| crate::error::EngineError::Internal { reason })?;
        Ok(None)
    }

    /// Attempt to flee: `clamp(0.5 + 0.01 * (player.speed - monster.speed), 0.1, 0.9)`
    /// (§4.6, the canonical resolution of the flee-formula Open Question). A
    /// failed attempt still ends the player's turn. `now` stamps `ended_at`
    /// on a successful escape, the same way `check_victory` stamps it on a
    /// victory/defeat transition.
    pub fn attempt_flee(&mut self, now: &str) -> Result<(bool, String), crate::error::EngineError> {
        let speed_diff = (self.player.stats.speed - self.monster.stats.speed) as f64;
        let flee_chance = (0.5 + speed_diff * 0.01).clamp(0.1, 0.9);

        if self.rng.roll_unit() < flee_chance {
            self.status = CombatStatus::Abandoned;
            self.ended_at.get_or_insert_with(|| now.to_string());
            self.log(TurnActor::Player, "log", format!("{} fled from combat!", self.player.name));
            Ok((true, "Escaped!".to_string()))
        } else {
            self.log(TurnActor::Player, "log", format!("{} failed to flee!", self.player.name));
            self.player_end_turn(now)?;
            Ok((false, "Failed to escape!".to_string()))
        }
    }

    /// Flat XP plus a uniformly rolled gold amount in the monster's reward
    /// range; `CombatStatus::Victory` is required, else the reward is zeroed
    /// (§4.6 `calculateRewards`).
    pub fn calculate_rewards(&mut self) -> CombatReward {
        if self.status != CombatStatus::Victory {
            return CombatReward { xp_gained: 0, gold_gained: 0 };
        }
        let gold = self.rng.roll_range(self.monster.gold_reward_min, self.monster.gold_reward_max);
        CombatReward {
            xp_gained: self.monster.xp_reward,
            gold_gained: gold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::stats::StatsBlock;
    use crate::model::types::{AiBehavior, SpellType};

    fn battle() -> Battle {
        let mut stats = StatsBlock::zero();
        stats.max_hp = 100;
        stats.ad = 20;
        stats.speed = 10;
        let player = PlayerEntity::new("p", "Hero", stats, 100);
        let monster = MonsterEntity {
            base: CombatEntity::new("m", "Slime", stats),
            ai_behavior: AiBehavior::Basic,
            abilities: vec![],
            xp_reward: 50,
            gold_reward_min: 10,
            gold_reward_max: 10,
            is_boss: false,
        };
        Battle::new("s", player, monster, BattleRng::seeded(3), HashMap::new())
    }

    #[test]
    fn basic_attack_requires_player_turn() {
        let mut b = battle();
        b.status = CombatStatus::MonsterTurn;
        let (success, message) = b.player_basic_attack().unwrap();
        assert!(!success);
        assert_eq!(message, "Not your turn");
    }

    #[test]
    fn basic_attack_deals_damage_and_grants_echo() {
        let mut b = battle();
        b.player_basic_attack().unwrap();
        assert!(b.monster.current_hp < 100);
        assert_eq!(b.player.echo_current, 5);
    }

    #[test]
    fn cast_spell_requires_echo_and_respects_cooldown() {
        let mut b = battle();
        let spell = Spell {
            id: "fireball".to_string(),
            weapon_blueprint_id: "w".to_string(),
            name: "Fireball".to_string(),
            description: String::new(),
            spell_type: SpellType::Ultimate,
            spell_order: 3,
            cooldown_turns: 2,
            echo_cost: 50,
            effects: vec![EffectPayload::new("damage")
                .with_param("formula", "40".into())
                .with_param("damage_type", "TRUE".into())],
        };
        let (success, message) = b.player_cast_spell(&spell).unwrap();
        assert!(!success);
        assert_eq!(message, "Not enough Echo");

        b.player.echo_current = 100;
        let (success, _) = b.player_cast_spell(&spell).unwrap();
        assert!(success);
        assert_eq!(b.monster.current_hp, 60);
        assert_eq!(b.player.echo_current, 50);
        assert!(b.player.is_on_cooldown("fireball"));
    }

    #[test]
    fn turn_cycle_advances_actor_and_counter() {
        let mut b = battle();
        b.player_end_turn("2026-01-01T00:00:00Z").unwrap();
        assert_eq!(b.status, CombatStatus::MonsterTurn);
        assert_eq!(b.current_turn, TurnActor::Monster);
        assert_eq!(b.turn_count, 2);
    }

    #[test]
    fn check_victory_ends_combat_on_monster_death() {
        let mut b = battle();
        b.monster.current_hp = 0;
        assert_eq!(b.check_victory("2026-01-01T00:00:00Z"), Some(CombatResultKind::Victory));
        assert_eq!(b.status, CombatStatus::Victory);
        assert_eq!(b.ended_at.as_deref(), Some("2026-01-01T00:00:00Z"));
    }

    #[test]
    fn calculate_rewards_requires_victory_status() {
        let mut b = battle();
        assert_eq!(b.calculate_rewards(), CombatReward { xp_gained: 0, gold_gained: 0 });
        b.status = CombatStatus::Victory;
        assert_eq!(b.calculate_rewards(), CombatReward { xp_gained: 50, gold_gained: 10 });
    }

    #[test]
    fn flee_chance_is_symmetric_at_equal_speed() {
        let mut b = battle();
        b.rng.force_next(0.49);
        let (success, _) = b.attempt_flee("2026-01-01T00:00:00Z").unwrap();
        assert!(success);
        assert_eq!(b.status, CombatStatus::Abandoned);
        assert_eq!(b.ended_at.as_deref(), Some("2026-01-01T00:00:00Z"));
    }
}
