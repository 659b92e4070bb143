//! Base entity: identity plus the hooks the tick driver and dispatcher call

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::core::error::Result;
use crate::core::types::{EntityId, EntityName};
use crate::fsm::machine::StateMachine;
use crate::fsm::state::StateOwner;
use crate::messaging::telegram::{MessageKind, Telegram};
use crate::simulation::world::World;

/// Anything the world can tick and deliver telegrams to
pub trait Entity<M: MessageKind>: Any {
    fn id(&self) -> EntityId;

    fn name(&self) -> &EntityName;

    /// Called once per tick by `World::update_all`
    fn update(&mut self, world: &mut World<M>) -> Result<()>;

    /// Returns whether any state handled the telegram
    fn handle_message(&mut self, telegram: &Telegram<M>, world: &mut World<M>) -> Result<bool>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Shared, dynamically borrowed entity as stored in the registry
pub type EntityHandle<M> = Rc<RefCell<dyn Entity<M>>>;

/// Identity fields every entity carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityCore {
    id: EntityId,
    name: EntityName,
}

impl EntityCore {
    pub fn new(id: EntityId, name: impl Into<EntityName>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &EntityName {
        &self.name
    }
}

/// An entity whose behavior is entirely its state machine
///
/// Implementing this is enough to get an [`Entity`] impl: updates run the
/// machine and telegrams are routed through it.
pub trait Agent: StateOwner {
    fn core(&self) -> &EntityCore;
}

impl<T: Agent> Entity<T::Message> for T {
    fn id(&self) -> EntityId {
        self.core().id()
    }

    fn name(&self) -> &EntityName {
        self.core().name()
    }

    fn update(&mut self, world: &mut World<T::Message>) -> Result<()> {
        StateMachine::update(self, world)
    }

    fn handle_message(
        &mut self,
        telegram: &Telegram<T::Message>,
        world: &mut World<T::Message>,
    ) -> Result<bool> {
        StateMachine::handle_message(self, telegram, world)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
