pub mod base;
pub mod registry;

pub use base::{Agent, Entity, EntityCore, EntityHandle};
pub use registry::EntityRegistry;
