pub mod config;
pub mod error;
pub mod types;

pub use config::{EngineConfig, FaultPolicy};
pub use error::{EngineError, Result};
pub use types::{EntityId, EntityName, IdAllocator, SimTime, Tick};
