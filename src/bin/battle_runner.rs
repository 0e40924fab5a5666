//! Headless Battle Runner
//!
//! Plays rounds automatically (new mask, auto-bind, fight) and prints the
//! results as JSON or text.

use clap::Parser;
use mask_forge::combat::PlayerStats;
use mask_forge::rules::load_content;
use mask_forge::simulation::{GameSession, RoundSummary};
use serde::Serialize;
use std::path::PathBuf;

/// Headless Battle Runner - automatic rounds for balance checks
#[derive(Parser, Debug)]
#[command(name = "battle_runner")]
#[command(about = "Play automatic mask-and-battle rounds and report the results")]
struct Args {
    /// Content file to load
    #[arg(long, default_value = "data/content.toml")]
    content: PathBuf,

    /// Enemy to fight every round (defaults to the content's enemies in order)
    #[arg(long)]
    enemy: Option<String>,

    /// Number of rounds to play
    #[arg(long, default_value_t = 3)]
    rounds: u32,

    /// Keep playing after a defeat
    #[arg(long)]
    keep_going: bool,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Log every battle event
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunResult {
    seed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    enemy: Option<String>,
    rounds: Vec<RoundSummary>,
    final_stats: PlayerStats,
}

fn main() {
    let args = Args::parse();

    let filter = if args.verbose {
        "mask_forge=debug"
    } else {
        "mask_forge=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut content = match load_content(&args.content) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Failed to load {}: {}", args.content.display(), e);
            std::process::exit(1);
        }
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    content.battle.seed = seed;

    let mut session = match GameSession::new(content) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Failed to start session: {}", e);
            std::process::exit(1);
        }
    };

    let mut rounds = Vec::new();
    for round in 1..=args.rounds {
        let enemy = match args.enemy.clone().or_else(|| session.next_enemy()) {
            Some(enemy) => enemy,
            None => {
                eprintln!("No enemy to fight");
                std::process::exit(1);
            }
        };
        match play_one(&mut session, round, &enemy) {
            Ok(summary) => {
                let lost = summary.report.outcome != Some(mask_forge::battle::BattleOutcome::Victory);
                rounds.push(summary);
                if lost && !args.keep_going {
                    break;
                }
            }
            Err(e) => {
                eprintln!("Round {} failed: {}", round, e);
                std::process::exit(1);
            }
        }
    }

    let result = RunResult {
        seed,
        enemy: args.enemy,
        rounds,
        final_stats: session.record().actual,
    };

    if args.format == "json" {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize result: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print_text(&result);
    }
}

fn play_one(
    session: &mut GameSession,
    round: u32,
    enemy: &str,
) -> mask_forge::core::Result<RoundSummary> {
    session.start_mask(&format!("Mask {}", round))?;
    session.auto_bind()?;
    session.end_make_phase();
    session.play_round(enemy)
}

fn print_text(result: &RunResult) {
    println!("=== BATTLE RUNNER ===");
    match &result.enemy {
        Some(enemy) => println!("Seed: {}  Enemy: {}", result.seed, enemy),
        None => println!("Seed: {}", result.seed),
    }
    println!();
    for summary in &result.rounds {
        let outcome = summary
            .report
            .outcome
            .map(|o| format!("{:?}", o))
            .unwrap_or_else(|| "Stopped".to_string());
        println!(
            "Round {} vs {}: {} in {} actions ({:.1}s)",
            summary.settlement.round,
            summary.enemy,
            outcome,
            summary.report.counters.actions,
            summary.report.elapsed_secs
        );
        println!("  Growth: {}", summary.settlement.growth);
        if !summary.settlement.rewards.is_empty() {
            println!("  Rewards: {}", summary.settlement.rewards.join(", "));
        }
    }
    let stats = &result.final_stats;
    println!();
    println!(
        "Final: HP {:.0}  ATK {:.1}  DEF {:.1}  CRIT {:.0}%  SPD {}",
        stats.max_hp,
        stats.attack,
        stats.defense,
        stats.crit_chance * 100.0,
        stats.speed_rate
    );
}
