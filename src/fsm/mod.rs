//! Finite-state-machine runtime

pub mod catalog;
pub mod machine;
pub mod state;

pub use catalog::StateCatalog;
pub use machine::StateMachine;
pub use state::{same_state, State, StateOwner, StateRef};
