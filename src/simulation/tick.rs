//! Tick system - one discrete simulation step
//!
//! A tick is: advance the clock, update every entity (global state then
//! current state), then drain the telegrams that have come due. The order is
//! fixed; a drain never runs before the update pass of the same tick.

use crate::core::config::EngineConfig;
use crate::core::error::{EngineError, Result};
use crate::core::types::{EntityId, SimTime, Tick};
use crate::messaging::telegram::MessageKind;
use crate::simulation::world::World;

/// What happened during a single tick
#[derive(Debug, Default)]
pub struct TickReport {
    pub tick: Tick,
    pub time: SimTime,
    pub updated: usize,
    pub skipped: usize,
    pub delivered: usize,
    pub unhandled: usize,
    pub dropped: usize,
    /// Faults tolerated under `FaultPolicy::SkipEntity`
    pub faulted: Vec<(EntityId, EngineError)>,
}

impl TickReport {
    pub fn is_clean(&self) -> bool {
        self.faulted.is_empty()
    }
}

/// Run one tick at simulated time `now`
pub fn run_simulation_tick<M: MessageKind>(
    world: &mut World<M>,
    tick: Tick,
    now: SimTime,
) -> Result<TickReport> {
    world.advance_to(now)?;

    let pass = world.update_all()?;
    let drain = world.drain_due(now)?;

    let mut faulted = pass.faulted;
    faulted.extend(drain.faulted);

    tracing::trace!(
        tick,
        time = now,
        updated = pass.updated,
        delivered = drain.delivered,
        dropped = drain.dropped,
        "Tick complete"
    );

    Ok(TickReport {
        tick,
        time: now,
        updated: pass.updated,
        skipped: pass.skipped,
        delivered: drain.delivered,
        unhandled: drain.unhandled,
        dropped: drain.dropped,
        faulted,
    })
}

/// A world plus the tick counter that drives it
pub struct Simulation<M> {
    world: World<M>,
    tick: Tick,
}

impl<M: MessageKind> Simulation<M> {
    /// Take over a fully set up world
    ///
    /// Runs the setup checks the world's config asks for.
    pub fn new(world: World<M>) -> Result<Self> {
        world.validate_setup()?;
        tracing::info!(
            entities = world.registry().len(),
            start = world.now(),
            "Simulation ready"
        );
        Ok(Self { world, tick: 0 })
    }

    pub fn world(&self) -> &World<M> {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World<M> {
        &mut self.world
    }

    pub fn into_world(self) -> World<M> {
        self.world
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    fn config(&self) -> &EngineConfig {
        self.world.config()
    }

    /// Simulated time of the given tick
    ///
    /// Computed from the tick number rather than accumulated, so long runs
    /// do not drift.
    pub fn time_of(&self, tick: Tick) -> SimTime {
        self.config().start_time + tick as f64 * self.config().time_step
    }

    /// Run the next tick
    pub fn step(&mut self) -> Result<TickReport> {
        let now = self.time_of(self.tick);
        let report = run_simulation_tick(&mut self.world, self.tick, now)?;
        self.tick += 1;
        Ok(report)
    }

    /// Run `ticks` ticks, stopping at the first error
    pub fn run(&mut self, ticks: u64) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for _ in 0..ticks {
            let report = self.step()?;
            summary.absorb(&report);
        }
        Ok(summary)
    }
}

/// Totals over several ticks
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub updates: usize,
    pub delivered: usize,
    pub dropped: usize,
    pub faults: usize,
}

impl RunSummary {
    fn absorb(&mut self, report: &TickReport) {
        self.ticks += 1;
        self.updates += report.updated;
        self.delivered += report.delivered;
        self.dropped += report.dropped;
        self.faults += report.faulted.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Msg {}

    #[test]
    fn test_time_of_uses_config() {
        let config = EngineConfig {
            time_step: 0.5,
            start_time: 10.0,
            ..EngineConfig::default()
        };
        let sim = Simulation::new(World::<Msg>::from_config(config).unwrap()).unwrap();
        assert_eq!(sim.time_of(0), 10.0);
        assert_eq!(sim.time_of(4), 12.0);
    }

    #[test]
    fn test_empty_world_runs() {
        let mut sim = Simulation::new(World::<Msg>::new()).unwrap();
        let summary = sim.run(3).unwrap();
        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.updates, 0);
        assert_eq!(sim.current_tick(), 3);
        assert_eq!(sim.world().now(), 2.0);
    }

    #[test]
    fn test_tick_rejects_time_going_backwards() {
        let mut world = World::<Msg>::new();
        run_simulation_tick(&mut world, 0, 5.0).unwrap();
        assert!(matches!(
            run_simulation_tick(&mut world, 1, 4.0),
            Err(EngineError::ClockRegression { .. })
        ));
    }
}
