//! Flyweight state catalog
//!
//! Holds exactly one instance per (state type, owner type). Setup code
//! registers the states once and behavior code fetches shared handles from the
//! world, so identity checks on `StateRef` hold across every owner.

use std::any::{type_name, Any, TypeId};
use std::rc::Rc;

use ahash::AHashMap;

use crate::core::error::{EngineError, Result};
use crate::fsm::state::{State, StateOwner, StateRef};

#[derive(Default)]
pub struct StateCatalog {
    states: AHashMap<(TypeId, TypeId), Box<dyn Any>>,
}

impl StateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn key<O: StateOwner, S: State<O>>() -> (TypeId, TypeId) {
        (TypeId::of::<S>(), TypeId::of::<O>())
    }

    /// Register the shared instance of `S`
    ///
    /// If `S` is already registered for `O` the existing instance is kept and
    /// returned, so the catalog never holds two instances of one state.
    pub fn register<O: StateOwner, S: State<O>>(&mut self, state: S) -> StateRef<O> {
        if let Ok(existing) = self.get::<O, S>() {
            return existing;
        }

        let shared: StateRef<O> = Rc::new(state);
        self.states
            .insert(Self::key::<O, S>(), Box::new(shared.clone()));
        tracing::trace!(state = shared.name(), "Registered state");
        shared
    }

    pub fn get<O: StateOwner, S: State<O>>(&self) -> Result<StateRef<O>> {
        self.states
            .get(&Self::key::<O, S>())
            .and_then(|entry| entry.downcast_ref::<StateRef<O>>())
            .cloned()
            .ok_or(EngineError::StateNotRegistered(type_name::<S>()))
    }

    /// Fetch `S`, registering its default instance on first use
    pub fn get_or_register<O: StateOwner, S: State<O> + Default>(&mut self) -> StateRef<O> {
        self.register::<O, S>(S::default())
    }

    pub fn contains<O: StateOwner, S: State<O>>(&self) -> bool {
        self.states.contains_key(&Self::key::<O, S>())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsm::machine::StateMachine;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Msg {}

    struct Owner {
        fsm: StateMachine<Owner>,
    }

    impl StateOwner for Owner {
        type Message = Msg;

        fn state_machine(&self) -> &StateMachine<Self> {
            &self.fsm
        }

        fn state_machine_mut(&mut self) -> &mut StateMachine<Self> {
            &mut self.fsm
        }
    }

    #[derive(Default)]
    struct Resting;

    impl State<Owner> for Resting {
        fn name(&self) -> &'static str {
            "Resting"
        }
    }

    #[derive(Default)]
    struct Roaming;

    impl State<Owner> for Roaming {
        fn name(&self) -> &'static str {
            "Roaming"
        }
    }

    #[test]
    fn test_register_returns_shared_instance() {
        let mut catalog = StateCatalog::new();
        let first = catalog.register::<Owner, _>(Resting);
        let again = catalog.register::<Owner, _>(Resting);
        let fetched = catalog.get::<Owner, Resting>().unwrap();

        assert!(Rc::ptr_eq(&first, &again));
        assert!(Rc::ptr_eq(&first, &fetched));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_missing_state_is_an_error() {
        let catalog = StateCatalog::new();
        let err = catalog.get::<Owner, Roaming>().err().unwrap();
        assert!(matches!(err, EngineError::StateNotRegistered(name) if name.ends_with("Roaming")));
    }

    #[test]
    fn test_get_or_register() {
        let mut catalog = StateCatalog::new();
        assert!(!catalog.contains::<Owner, Roaming>());
        let roaming = catalog.get_or_register::<Owner, Roaming>();
        assert!(catalog.contains::<Owner, Roaming>());
        assert!(Rc::ptr_eq(&roaming, &catalog.get::<Owner, Roaming>().unwrap()));
    }
}
