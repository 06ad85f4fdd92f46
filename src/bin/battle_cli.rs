//! A small CLI harness around the combat engine, grounded on the teacher's
//! `sim_cli.rs` shape (`clap::Parser`/`Subcommand` over a JSON scenario
//! file). A bundled CLI process owns one continuous battle lifetime rather
//! than mirroring the HTTP layer's separate start/action/flee/state calls
//! one for one, so `run` drives all of them through a single `Orchestrator`
//! for the life of the process; `simulate` runs many such battles back to
//! back and reports aggregate win rate, matching the teacher's own
//! aggregate-subcommand shape scaled down to a basic-attack-only smoke test.
//!
//! ```text
//! battle_cli run --scenario scenario.json --action basic_attack --action spell:fireball
//! battle_cli simulate --scenario scenario.json --battles 200
//! ```

use clap::{Parser, Subcommand};
use echoes_combat::error::EngineError;
use echoes_combat::model::effect::EffectPayload;
use echoes_combat::model::monster::MonsterBlueprint;
use echoes_combat::model::spell::Spell;
use echoes_combat::model::stats::StatsBlock;
use echoes_combat::model::status::StatusDefinition;
use echoes_combat::orchestration::ActionRequest;
use echoes_combat::store::{MemoryStore, PlayerLoadout, SessionStore};
use echoes_combat::Orchestrator;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// The engine never reads the system clock itself (§5, §9) — the CLI, as
/// the host process, is responsible for supplying `now` at each call.
fn now_timestamp() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    secs.to_string()
}

#[derive(Parser)]
#[command(name = "battle_cli")]
#[command(about = "Run a scripted combat session against the effect-VM engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario file through a fixed sequence of actions, printing
    /// each resulting combat log and the final state as JSON.
    Run {
        /// Path to a scenario JSON file (see `ScenarioFile` for the shape)
        scenario: PathBuf,
        /// One action per `--action` flag: "basic_attack", "consumable",
        /// "flee", or "spell:<id>"
        #[arg(short, long = "action")]
        actions: Vec<String>,
        /// Seed the battle RNG for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Validate a scenario file without running it
    Validate { scenario: PathBuf },
    /// Run N battles against a basic-attack-only script and report the
    /// player's win rate and average turn count, a quick regression/balance
    /// smoke test for a monster blueprint.
    Simulate {
        scenario: PathBuf,
        #[arg(long, default_value_t = 100)]
        battles: u32,
    },
}

/// On-disk shape for a CLI scenario: one player loadout plus one monster
/// blueprint plus the status definitions their effects reference.
#[derive(Debug, Deserialize)]
struct ScenarioFile {
    player: PlayerLoadoutFile,
    monster: MonsterBlueprint,
    #[serde(default)]
    status_definitions: Vec<StatusDefinition>,
    #[serde(default)]
    monster_level: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct PlayerLoadoutFile {
    name: String,
    stats: StatsBlock,
    echo_max: i32,
    #[serde(default)]
    consumable_uses: i32,
    #[serde(default)]
    spells: Vec<Spell>,
    #[serde(default)]
    consumable_effects: Vec<EffectPayload>,
}

fn main() {
    echoes_combat::observability::init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run { scenario, actions, seed } => run(&scenario, &actions, seed),
        Commands::Validate { scenario } => validate(&scenario),
        Commands::Simulate { scenario, battles } => simulate(&scenario, battles),
    }
}

fn load_scenario(path: &PathBuf) -> ScenarioFile {
    let content = fs::read_to_string(path).expect("failed to read scenario file");
    serde_json::from_str(&content).expect("failed to parse scenario JSON")
}

fn run(scenario_path: &PathBuf, actions: &[String], seed: Option<u64>) {
    let scenario = load_scenario(scenario_path);
    let player_id = uuid::Uuid::new_v4().to_string();

    let mut store = MemoryStore::new();
    for def in scenario.status_definitions {
        store.register_status_definition(def);
    }
    store.register_monster_blueprint(scenario.monster.clone());
    store.register_player_loadout(
        player_id.clone(),
        PlayerLoadout {
            name: scenario.player.name,
            stats: scenario.player.stats,
            echo_max: scenario.player.echo_max,
            consumable_uses: scenario.player.consumable_uses,
            spells: scenario.player.spells,
            consumable_effects: scenario.player.consumable_effects,
        },
    );

    let mut orchestrator = Orchestrator::new(store);
    let state = orchestrator
        .start_combat(&player_id, &scenario.monster.id, 1, scenario.monster_level, &now_timestamp())
        .expect("failed to start combat");
    println!("=== Combat started: {} vs {} ===", state.player.entity.name, state.monster.name);
    for line in &state.logs {
        println!("  {line}");
    }
    let _ = seed;

    let mut session_id = state.session_id;
    for action in actions {
        let request = match action.as_str() {
            "basic_attack" => ActionRequest::BasicAttack,
            "consumable" => ActionRequest::UseConsumable,
            "flee" => ActionRequest::Flee,
            other => match other.strip_prefix("spell:") {
                Some(spell_id) => ActionRequest::CastSpell { spell_id: spell_id.to_string() },
                None => {
                    eprintln!("[WARN] unrecognized action '{other}', skipping");
                    continue;
                }
            },
        };

        match orchestrator.execute_action(&session_id, &player_id, request, &now_timestamp()) {
            Ok(result) => {
                println!("\n--- action: {action} ({}) ---", result.dto.message);
                if let Some(state) = &result.dto.combat_state {
                    for line in &state.logs {
                        println!("  {line}");
                    }
                    session_id = state.session_id.clone();
                }
                if result.dto.combat_ended {
                    println!("\nCombat ended: {:?}", result.dto.result);
                    if let Some(reward) = result.reward {
                        println!("Reward: {} xp, {} gold", reward.xp_gained, reward.gold_gained);
                    }
                    break;
                }
            }
            Err(err) => {
                print_action_error(&err);
                break;
            }
        }
    }

    let final_state = orchestrator
        .store()
        .load_session(&session_id)
        .expect("session vanished mid-run");
    println!("\n=== Final session ===");
    println!("{}", serde_json::to_string_pretty(&final_state).unwrap());
}

fn simulate(scenario_path: &PathBuf, battles: u32) {
    let scenario = load_scenario(scenario_path);
    let mut wins = 0u32;
    let mut total_turns: u64 = 0;

    for i in 0..battles {
        let player_id = format!("sim-player-{i}");
        let mut store = MemoryStore::new();
        for def in scenario.status_definitions.clone() {
            store.register_status_definition(def);
        }
        store.register_monster_blueprint(scenario.monster.clone());
        store.register_player_loadout(
            player_id.clone(),
            PlayerLoadout {
                name: scenario.player.name.clone(),
                stats: scenario.player.stats,
                echo_max: scenario.player.echo_max,
                consumable_uses: scenario.player.consumable_uses,
                spells: scenario.player.spells.clone(),
                consumable_effects: scenario.player.consumable_effects.clone(),
            },
        );

        let mut orchestrator = Orchestrator::new(store);
        let mut state = orchestrator
            .start_combat(&player_id, &scenario.monster.id, 1, scenario.monster_level, &now_timestamp())
            .expect("failed to start combat");

        const MAX_TURNS: i32 = 500;
        loop {
            if state.turn_count > MAX_TURNS {
                eprintln!("[WARN] battle {i} exceeded {MAX_TURNS} turns, treating as a loss");
                break;
            }
            let result = orchestrator
                .execute_action(&state.session_id, &player_id, ActionRequest::BasicAttack, &now_timestamp())
                .expect("action rejected mid-simulation");
            if let Some(next_state) = result.dto.combat_state {
                state = next_state;
            }
            if result.dto.combat_ended {
                if result.dto.result == Some(echoes_combat::model::types::CombatResultKind::Victory) {
                    wins += 1;
                }
                break;
            }
        }
        total_turns += state.turn_count as u64;
    }

    let win_rate = wins as f64 / battles as f64;
    let avg_turns = total_turns as f64 / battles as f64;
    println!("battles: {battles}");
    println!("win rate: {:.1}%", win_rate * 100.0);
    println!("avg turns: {avg_turns:.1}");
}

fn print_action_error(err: &EngineError) {
    eprintln!("[ERROR] action rejected: {err}");
}

fn validate(scenario_path: &PathBuf) {
    let content = match fs::read_to_string(scenario_path) {
        Ok(c) => c,
        Err(e) => {
            println!("[ERROR] failed to read file: {e}");
            return;
        }
    };
    match serde_json::from_str::<ScenarioFile>(&content) {
        Ok(scenario) => {
            println!("[INFO] scenario parses OK");
            println!("  player: {}", scenario.player.name);
            println!("  monster: {} (level {})", scenario.monster.name, scenario.monster.base_level);
            for spell in &scenario.player.spells {
                if let Err(reason) = validate_effects(&spell.effects) {
                    println!("[ERROR] spell '{}': {reason}", spell.id);
                }
            }
            for ability in &scenario.monster.abilities {
                if let Err(reason) = validate_effects(&ability.effects) {
                    println!("[ERROR] ability '{}': {reason}", ability.id);
                }
            }
        }
        Err(e) => println!("[ERROR] invalid scenario JSON: {e}"),
    }
}

fn validate_effects(effects: &[EffectPayload]) -> Result<(), String> {
    for effect in effects {
        if let Some(formula) = effect.param_str("formula") {
            echoes_combat::formula::validate(formula)?;
        }
    }
    Ok(())
}
