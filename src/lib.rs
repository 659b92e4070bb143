//! Behavior Engine - finite state machines and timed telegrams for
//! tick-driven agent simulations
//!
//! A [`World`](simulation::World) owns the entity registry, the message
//! dispatcher, the shared state catalog and the clock. Entities carry a
//! [`StateMachine`](fsm::StateMachine); each tick every entity updates, then
//! the telegrams that have come due are delivered.

pub mod core;
pub mod entity;
pub mod fsm;
pub mod messaging;
pub mod simulation;

pub use crate::core::{EngineConfig, EngineError, EntityId, EntityName, FaultPolicy, Result, SimTime};
pub use crate::entity::{Agent, Entity, EntityCore, EntityHandle, EntityRegistry};
pub use crate::fsm::{State, StateCatalog, StateMachine, StateOwner, StateRef};
pub use crate::messaging::{Delivery, DrainReport, MessageKind, Payload, Telegram};
pub use crate::simulation::{run_simulation_tick, Simulation, TickReport, World};
