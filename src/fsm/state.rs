//! The state contract
//!
//! A state is a stateless behavior unit. One instance of each state type is
//! shared by every owner (see [`StateCatalog`](crate::fsm::catalog::StateCatalog)),
//! so anything that changes per owner has to live on the owner.

use std::rc::Rc;

use crate::core::error::Result;
use crate::fsm::machine::StateMachine;
use crate::messaging::telegram::{MessageKind, Telegram};
use crate::simulation::world::World;

/// An entity that carries a state machine
pub trait StateOwner: Sized + 'static {
    /// Message type this owner's states receive
    type Message: MessageKind;

    fn state_machine(&self) -> &StateMachine<Self>;

    fn state_machine_mut(&mut self) -> &mut StateMachine<Self>;

    /// Exit the current state and enter `state`
    ///
    /// Returns `false` without calling any hook when `state` is already current.
    fn change_state(
        &mut self,
        state: StateRef<Self>,
        world: &mut World<Self::Message>,
    ) -> Result<bool> {
        StateMachine::change_state(self, state, world)
    }

    fn revert_to_previous_state(&mut self, world: &mut World<Self::Message>) -> Result<bool> {
        StateMachine::revert_to_previous_state(self, world)
    }

    fn is_in_state(&self, state: &StateRef<Self>) -> bool {
        self.state_machine().is_in_state(state)
    }
}

/// Behavior hooks invoked by a [`StateMachine`]
///
/// Every hook has a no-op default so a state only spells out what it uses.
pub trait State<O: StateOwner>: 'static {
    /// Name used in logs
    fn name(&self) -> &'static str;

    fn enter(&self, _owner: &mut O, _world: &mut World<O::Message>) -> Result<()> {
        Ok(())
    }

    fn execute(&self, _owner: &mut O, _world: &mut World<O::Message>) -> Result<()> {
        Ok(())
    }

    fn exit(&self, _owner: &mut O, _world: &mut World<O::Message>) -> Result<()> {
        Ok(())
    }

    /// Return `Ok(true)` if the telegram was handled
    fn on_message(
        &self,
        _telegram: &Telegram<O::Message>,
        _owner: &mut O,
        _world: &mut World<O::Message>,
    ) -> Result<bool> {
        Ok(false)
    }
}

/// Shared handle to a state instance; compared by identity
pub type StateRef<O> = Rc<dyn State<O>>;

/// Identity comparison between two state handles
pub fn same_state<O: StateOwner>(a: &StateRef<O>, b: &StateRef<O>) -> bool {
    Rc::ptr_eq(a, b)
}
