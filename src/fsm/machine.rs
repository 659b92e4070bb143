//! State machine: current, previous and global state slots
//!
//! The machine lives inside its owner, so transitions are associated functions
//! that take the owner explicitly instead of holding a back-reference.

use std::fmt;
use std::rc::Rc;

use crate::core::error::Result;
use crate::fsm::state::{StateOwner, StateRef};
use crate::messaging::telegram::Telegram;
use crate::simulation::world::World;

pub struct StateMachine<O: StateOwner> {
    current: StateRef<O>,
    previous: StateRef<O>,
    global: Option<StateRef<O>>,
}

impl<O: StateOwner> StateMachine<O> {
    /// A machine sitting in `initial`, with `initial` as its previous state
    ///
    /// `enter` is not called here; use [`StateMachine::enter_initial`] once the
    /// owner is built if the initial state needs it.
    pub fn new(initial: StateRef<O>) -> Self {
        Self {
            previous: initial.clone(),
            current: initial,
            global: None,
        }
    }

    pub fn with_previous(mut self, previous: StateRef<O>) -> Self {
        self.previous = previous;
        self
    }

    pub fn with_global(mut self, global: StateRef<O>) -> Self {
        self.global = Some(global);
        self
    }

    pub fn current(&self) -> &StateRef<O> {
        &self.current
    }

    pub fn previous(&self) -> &StateRef<O> {
        &self.previous
    }

    pub fn global(&self) -> Option<&StateRef<O>> {
        self.global.as_ref()
    }

    pub fn set_global_state(&mut self, global: StateRef<O>) {
        self.global = Some(global);
    }

    pub fn clear_global_state(&mut self) -> Option<StateRef<O>> {
        self.global.take()
    }

    pub fn is_in_state(&self, state: &StateRef<O>) -> bool {
        Rc::ptr_eq(&self.current, state)
    }

    pub fn state_name(&self) -> &'static str {
        self.current.name()
    }

    /// Run the current state's `enter` hook without a transition
    pub fn enter_initial(owner: &mut O, world: &mut World<O::Message>) -> Result<()> {
        let current = owner.state_machine().current.clone();
        current.enter(owner, world)
    }

    /// Global state first, then the current state
    ///
    /// If the global state changes the current state, the new current state is
    /// the one executed.
    pub fn update(owner: &mut O, world: &mut World<O::Message>) -> Result<()> {
        if let Some(global) = owner.state_machine().global.clone() {
            global.execute(owner, world)?;
        }
        let current = owner.state_machine().current.clone();
        current.execute(owner, world)
    }

    pub fn change_state(
        owner: &mut O,
        new_state: StateRef<O>,
        world: &mut World<O::Message>,
    ) -> Result<bool> {
        let old_state = owner.state_machine().current.clone();
        if Rc::ptr_eq(&old_state, &new_state) {
            return Ok(false);
        }

        tracing::debug!(
            from = old_state.name(),
            to = new_state.name(),
            "State change"
        );

        old_state.exit(owner, world)?;

        let fsm = owner.state_machine_mut();
        fsm.previous = old_state;
        fsm.current = new_state.clone();

        new_state.enter(owner, world)?;
        Ok(true)
    }

    /// Go back to the previous state
    ///
    /// The previous slot is consumed: afterwards it points at the restored
    /// state, so a second revert without an intervening change does nothing.
    pub fn revert_to_previous_state(owner: &mut O, world: &mut World<O::Message>) -> Result<bool> {
        let previous = owner.state_machine().previous.clone();
        if owner.state_machine().is_in_state(&previous) {
            return Ok(false);
        }

        let changed = Self::change_state(owner, previous, world)?;
        if changed {
            let fsm = owner.state_machine_mut();
            fsm.previous = fsm.current.clone();
        }
        Ok(changed)
    }

    /// Offer a telegram to the current state, then to the global state
    pub fn handle_message(
        owner: &mut O,
        telegram: &Telegram<O::Message>,
        world: &mut World<O::Message>,
    ) -> Result<bool> {
        let current = owner.state_machine().current.clone();
        if current.on_message(telegram, owner, world)? {
            return Ok(true);
        }

        match owner.state_machine().global.clone() {
            Some(global) => global.on_message(telegram, owner, world),
            None => Ok(false),
        }
    }
}

impl<O: StateOwner> fmt::Debug for StateMachine<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current.name())
            .field("previous", &self.previous.name())
            .field("global", &self.global.as_ref().map(|g| g.name()))
            .finish()
    }
}
