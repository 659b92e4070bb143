//! Simulation context and tick driver

pub mod tick;
pub mod world;

pub use tick::{run_simulation_tick, RunSummary, Simulation, TickReport};
pub use world::{UpdatePass, World};
