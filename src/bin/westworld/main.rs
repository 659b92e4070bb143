//! WestWorld - a miner and his wife driven by the behavior engine
//!
//! Bob digs gold, banks it and heads home when he is rich or tired. Coming
//! home, he tells Elsa, who cooks stew and schedules a delayed StewReady
//! telegram for herself, then calls Bob to the table.

mod miner;
mod wife;

use std::cell::Ref;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use behavior_engine::simulation::Simulation;
use behavior_engine::{EngineConfig, Result, World};

use miner::Miner;
use wife::Wife;

pub const MINER_NAME: &str = "Miner Bob";
pub const WIFE_NAME: &str = "Elsa";

/// Telegram types exchanged in WestWorld
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    HiHoneyImHome,
    StewReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Shack,
    Goldmine,
    Bank,
    Saloon,
}

/// Run the WestWorld miner simulation
#[derive(Parser, Debug)]
#[command(name = "westworld")]
#[command(about = "Miner Bob and Elsa, driven by finite state machines and telegrams")]
struct Args {
    /// Engine config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to run (defaults to max_ticks from the config)
    #[arg(long)]
    ticks: Option<u64>,

    /// Simulated seconds per tick, overriding the config
    #[arg(long)]
    step: Option<f64>,

    /// Random seed for Elsa's chores
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(step) = args.step {
        config.time_step = step;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    let mut world: World<Message> = World::from_config(config)?;
    miner::register_states(world.states_mut());
    wife::register_states(world.states_mut());

    let bob = miner::spawn(&mut world, MINER_NAME)?;
    let elsa = wife::spawn(&mut world, WIFE_NAME, args.seed)?;
    tracing::info!(states = world.states().len(), "WestWorld set up");

    let mut sim = Simulation::new(world)?;
    let ticks = args.ticks.unwrap_or(sim.world().config().max_ticks);

    for _ in 0..ticks {
        println!();
        let report = sim.step()?;
        for (id, err) in &report.faulted {
            println!("!! {} faulted: {}", id, err);
        }
    }

    let bob: Ref<'_, Miner> = bob.borrow();
    let elsa: Ref<'_, Wife> = elsa.borrow();
    println!();
    println!("=== After {} ticks ({}s) ===", sim.current_tick(), sim.world().now());
    println!(
        "{}: {} gold in the bank, {} stews eaten, at {:?}",
        MINER_NAME, bob.money_in_bank, bob.stews_eaten, bob.location
    );
    println!(
        "{}: {} chores done, {} stews served, at {:?}",
        WIFE_NAME, elsa.chores_done, elsa.stews_served, elsa.location
    );
    println!("Telegrams still pending: {}", sim.world().dispatcher().pending_len());

    Ok(())
}
