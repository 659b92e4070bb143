//! World - the explicit simulation context
//!
//! Owns the entity registry, the message dispatcher, the state catalog and the
//! clock. Every hook receives `&mut World`, so several independent worlds can
//! exist side by side.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::config::{EngineConfig, FaultPolicy};
use crate::core::error::{EngineError, Result};
use crate::core::types::{EntityId, SimTime};
use crate::entity::base::{Entity, EntityHandle};
use crate::entity::registry::EntityRegistry;
use crate::fsm::catalog::StateCatalog;
use crate::fsm::state::{State, StateOwner, StateRef};
use crate::messaging::dispatcher::MessageDispatcher;
use crate::messaging::telegram::MessageKind;

/// Outcome of one update pass over the registry
#[derive(Debug, Default)]
pub struct UpdatePass {
    pub updated: usize,
    /// Entities removed earlier in the same pass
    pub skipped: usize,
    /// Entities whose update failed, when faults are skipped
    pub faulted: Vec<(EntityId, EngineError)>,
}

pub struct World<M> {
    registry: EntityRegistry<M>,
    dispatcher: MessageDispatcher<M>,
    states: StateCatalog,
    clock: SimTime,
    config: EngineConfig,
}

impl<M: MessageKind> World<M> {
    pub fn new() -> Self {
        Self::with_config_unchecked(EngineConfig::default())
    }

    pub fn from_config(config: EngineConfig) -> Result<Self> {
        config.validate().map_err(EngineError::Config)?;
        Ok(Self::with_config_unchecked(config))
    }

    fn with_config_unchecked(config: EngineConfig) -> Self {
        Self {
            registry: EntityRegistry::new(),
            dispatcher: MessageDispatcher::new(),
            states: StateCatalog::new(),
            clock: config.start_time,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_fault_policy(&mut self, policy: FaultPolicy) {
        self.config.fault_policy = policy;
    }

    // === CLOCK ===

    pub fn now(&self) -> SimTime {
        self.clock
    }

    /// Move the clock forward; it never moves back
    pub fn advance_to(&mut self, now: SimTime) -> Result<()> {
        if !now.is_finite() || now < self.clock {
            return Err(EngineError::ClockRegression {
                now: self.clock,
                requested: now,
            });
        }
        self.clock = now;
        Ok(())
    }

    // === REGISTRY ===

    pub fn registry(&self) -> &EntityRegistry<M> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EntityRegistry<M> {
        &mut self.registry
    }

    pub fn allocate_id(&mut self) -> Result<EntityId> {
        self.registry.allocate_id()
    }

    /// Register an entity and keep a typed handle to it
    pub fn add_entity<E: Entity<M>>(&mut self, entity: E) -> Result<Rc<RefCell<E>>> {
        let typed = Rc::new(RefCell::new(entity));
        let handle: EntityHandle<M> = typed.clone();
        self.registry.add(handle)?;
        Ok(typed)
    }

    pub fn remove_entity(&mut self, id: EntityId) -> Result<EntityHandle<M>> {
        self.registry.remove(id)
    }

    /// Setup checks that depend on configuration
    pub fn validate_setup(&self) -> Result<()> {
        if self.config.require_unique_names {
            self.registry.validate_unique_names()?;
        }
        Ok(())
    }

    // === DISPATCH ===

    pub fn dispatcher(&self) -> &MessageDispatcher<M> {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut MessageDispatcher<M> {
        &mut self.dispatcher
    }

    // === STATES ===

    pub fn states(&self) -> &StateCatalog {
        &self.states
    }

    pub fn states_mut(&mut self) -> &mut StateCatalog {
        &mut self.states
    }

    /// Shared instance of state `S` for owner `O`
    pub fn state<O, S>(&self) -> Result<StateRef<O>>
    where
        O: StateOwner<Message = M>,
        S: State<O>,
    {
        self.states.get::<O, S>()
    }

    // === UPDATES ===

    /// Update one entity
    ///
    /// Returns `Ok(false)` if the id is not registered.
    pub fn update_entity(&mut self, id: EntityId) -> Result<bool> {
        let handle = match self.registry.get(id) {
            Some(handle) => handle.clone(),
            None => return Ok(false),
        };
        let mut entity = handle
            .try_borrow_mut()
            .map_err(|_| EngineError::ReceiverBusy(id))?;
        entity.update(self)?;
        Ok(true)
    }

    /// Update every registered entity once, in ascending id order
    ///
    /// Iterates a snapshot taken before the pass: an entity removed during the
    /// pass is not updated afterwards, and one added during the pass waits for
    /// the next. Failures follow the configured fault policy.
    pub fn update_all(&mut self) -> Result<UpdatePass> {
        let policy = self.config.fault_policy;
        let mut pass = UpdatePass::default();

        for (id, handle) in self.registry.snapshot() {
            if !self.registry.contains(id) {
                pass.skipped += 1;
                continue;
            }

            let result = match handle.try_borrow_mut() {
                Ok(mut entity) => entity.update(self),
                Err(_) => Err(EngineError::ReceiverBusy(id)),
            };

            match result {
                Ok(()) => pass.updated += 1,
                Err(err) => match policy {
                    FaultPolicy::AbortTick => return Err(err),
                    FaultPolicy::SkipEntity => {
                        tracing::warn!(%id, error = %err, "Entity update failed; skipping");
                        pass.faulted.push((id, err));
                    }
                },
            }
        }

        Ok(pass)
    }
}

impl<M: MessageKind> Default for World<M> {
    fn default() -> Self {
        Self::new()
    }
}
