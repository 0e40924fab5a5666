//! Mask Forge - Entry Point
//!
//! Interactive loop over a game session: make a mask, bind materials, fight,
//! and watch the player grow between rounds.

use mask_forge::core::error::Result;
use mask_forge::rules::load_content;
use mask_forge::simulation::GameSession;

use std::io::{self, Write};
use std::path::PathBuf;

const DEFAULT_CONTENT: &str = "data/content.toml";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("mask_forge=info")
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT));
    let content = load_content(&path)?;
    let mut session = GameSession::new(content)?;

    println!("\n=== MASK FORGE ===");
    println!();
    println!("Commands:");
    println!("  mask <name>      - Start crafting a new mask");
    println!("  inv / i          - List the material inventory");
    println!("  bind <n>         - Bind inventory item n into the current mask");
    println!("  auto             - Bind everything affordable, expiring first");
    println!("  end              - End the make phase (shelf life ticks down)");
    println!("  fight [enemy]    - Fight the next enemy (or a named one) and settle");
    println!("  describe <id>    - Show a material's logic");
    println!("  library / l      - List finished masks");
    println!("  status / s       - Show player stats");
    println!("  quit / q         - Exit");
    println!();

    loop {
        print!("[round {}] > ", session.round());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let (command, arg) = match input.split_once(' ') {
            Some((command, arg)) => (command, arg.trim()),
            None => (input, ""),
        };

        match command {
            "quit" | "q" => break,
            "status" | "s" => display_status(&session),
            "inv" | "i" => display_inventory(&session),
            "library" | "l" => display_library(&session),
            "mask" => {
                let name = if arg.is_empty() { "Nameless" } else { arg };
                match session.start_mask(name) {
                    Ok(()) => println!("Started mask '{}'.", name),
                    Err(e) => println!("{}", e),
                }
            }
            "bind" => {
                let item = arg
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| session.inventory().items().get(n))
                    .map(|m| (m.id(), m.name().to_string()));
                match item {
                    Some((id, name)) => match session.bind_from_inventory(id) {
                        Ok(()) => println!("Bound {}.", name),
                        Err(e) => println!("{}", e),
                    },
                    None => println!("Usage: bind <inventory index>"),
                }
            }
            "auto" => match session.auto_bind() {
                Ok(bound) => println!("Bound {} material(s).", bound.len()),
                Err(e) => println!("{}", e),
            },
            "end" => {
                let expired = session.end_make_phase();
                for material in &expired {
                    println!("{} crumbled away.", material.name());
                }
                println!("Make phase over.");
            }
            "fight" => {
                let enemy = if arg.is_empty() {
                    session.next_enemy()
                } else {
                    Some(arg.to_string())
                };
                let Some(enemy) = enemy else {
                    println!("No enemies in this content.");
                    continue;
                };
                match session.play_round(&enemy) {
                    Ok(summary) => {
                        let outcome = summary
                            .report
                            .outcome
                            .map(|o| format!("{:?}", o))
                            .unwrap_or_else(|| "Stopped".to_string());
                        println!(
                            "{} vs {}: {} after {} actions ({:.1}s)",
                            session.record().name,
                            summary.enemy,
                            outcome,
                            summary.report.counters.actions,
                            summary.report.elapsed_secs
                        );
                        println!("Growth: {}", summary.settlement.growth);
                        for reward in &summary.settlement.rewards {
                            println!("Reward: {}", reward);
                        }
                    }
                    Err(e) => println!("{}", e),
                }
            }
            "describe" => match session.registry().get(arg) {
                Some(def) => print!("{}", def.describe()),
                None => println!("Unknown material '{}'", arg),
            },
            _ => println!("Unknown command. Try: mask, inv, bind, auto, end, fight, describe, status, quit"),
        }
    }

    println!("\nFarewell. {} mask(s) in the library.", session.library().len());
    Ok(())
}

fn display_status(session: &GameSession) {
    let record = session.record();
    let stats = &record.actual;
    println!();
    println!("--- {} | Round {} ---", record.name, session.round());
    println!(
        "  HP {:.0}  ATK {:.1}  DEF {:.1}  CRIT {:.0}% x{:.2}  SPD {}  LUCK {}",
        stats.max_hp,
        stats.attack,
        stats.defense,
        stats.crit_chance * 100.0,
        stats.crit_multiplier,
        stats.speed_rate,
        stats.luck
    );
    match session.current_mask() {
        Some(mask) => println!(
            "  Crafting '{}' ({} materials, mana {}/{})",
            mask.name,
            mask.materials().len(),
            mask.mana().current(),
            mask.mana().base()
        ),
        None => println!("  No mask in progress"),
    }
    println!();
}

fn display_inventory(session: &GameSession) {
    if session.inventory().is_empty() {
        println!("Inventory is empty.");
        return;
    }
    for (i, material) in session.inventory().items().iter().enumerate() {
        println!(
            "  [{}] {} - cost {}, {:?}, {} turn(s) left",
            i,
            material.name(),
            material.mana_cost(),
            material.quality(),
            material.remaining_shelf_life()
        );
    }
}

fn display_library(session: &GameSession) {
    if session.library().is_empty() {
        println!("The library is empty.");
        return;
    }
    for mask in session.library() {
        print!("{}", mask.describe());
    }
}
