//! combat-engine - run skirmishes from the command line

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use combat_engine::combat::ActionRequest;
use combat_engine::{CombatService, Config};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Turn-based combat engine
#[derive(Parser, Debug)]
#[command(name = "combat-engine", version, about = "Turn-based combat engine")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a skirmish where everyone attacks the next combatant in line
    Simulate {
        /// JSON file holding an array of character sheets
        #[arg(short, long)]
        roster: PathBuf,

        /// Stop after this many rounds
        #[arg(long, default_value_t = 3)]
        rounds: u32,

        /// Seed the dice for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List the castable spells
    Spells,
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let registry = tracing_subscriber::registry().with(filter);

    if config.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Command::Simulate { seed: Some(seed), .. } = &args.command {
        config.rng_seed = Some(*seed);
    }
    init_tracing(&config);

    match args.command {
        Command::Simulate { roster, rounds, .. } => simulate(&config, &roster, rounds).await,
        Command::Spells => {
            for spell in config.spell_book().names() {
                println!("{}", spell);
            }
            Ok(())
        }
    }
}

async fn simulate(config: &Config, roster: &Path, rounds: u32) -> Result<()> {
    let raw = std::fs::read_to_string(roster)
        .with_context(|| format!("Failed to read {}", roster.display()))?;
    let sheets: Vec<Value> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of character sheets", roster.display()))?;
    if sheets.len() < 2 {
        bail!("A skirmish needs at least two combatants");
    }

    let service = CombatService::shared(config);
    let combat_id = service.initialize_combat(&sheets).await?;
    info!("Simulating combat {} for {} rounds", combat_id, rounds);

    loop {
        let turn = service.current_turn().await?;
        if turn.current_round > rounds || service.is_combat_over().await {
            break;
        }

        let actor = turn.current_participant.id.clone();
        let target = turn.turn_order[(turn.current_turn_index + 1) % turn.turn_order.len()].clone();
        if target != actor {
            let request = ActionRequest {
                actor_id: actor,
                action_type: "Attack".to_string(),
                target_id: Some(target),
                ..Default::default()
            };
            let result = service.perform_action(&request).await?;
            info!("{}", serde_json::to_string(&result)?);
        }

        service.advance_turn().await?;
    }

    let status = service.status().await;
    println!("{}", serde_json::to_string_pretty(&status)?);
    service.end_combat().await?;
    Ok(())
}
