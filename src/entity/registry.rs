//! Entity registry - the id and name directory of live entities

use std::collections::BTreeMap;

use ahash::{AHashMap, AHashSet};

use crate::core::error::{EngineError, Result};
use crate::core::types::{EntityId, EntityName, IdAllocator};
use crate::entity::base::{Entity, EntityHandle};
use crate::messaging::telegram::MessageKind;

/// Maps ids and names to live entities
///
/// Iteration is in ascending id order. Ids removed from the registry are
/// retired and cannot be registered again.
pub struct EntityRegistry<M> {
    entities: BTreeMap<EntityId, EntityHandle<M>>,
    names: AHashMap<EntityName, Vec<EntityId>>,
    retired: AHashSet<EntityId>,
    ids: IdAllocator,
}

impl<M: MessageKind> EntityRegistry<M> {
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            names: AHashMap::new(),
            retired: AHashSet::new(),
            ids: IdAllocator::new(),
        }
    }

    /// Next unused id
    pub fn allocate_id(&mut self) -> Result<EntityId> {
        self.ids.allocate().ok_or(EngineError::IdsExhausted)
    }

    pub fn add(&mut self, handle: EntityHandle<M>) -> Result<EntityId> {
        let (id, name) = {
            let entity = handle.try_borrow().map_err(|_| EngineError::HandleBorrowed)?;
            (entity.id(), entity.name().clone())
        };

        if self.entities.contains_key(&id) {
            return Err(EngineError::DuplicateEntity(id));
        }
        if self.retired.contains(&id) {
            return Err(EngineError::RetiredEntity(id));
        }

        self.ids.observe(id);
        self.names.entry(name.clone()).or_default().push(id);
        self.entities.insert(id, handle);
        tracing::debug!(%id, %name, "Registered entity");
        Ok(id)
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityHandle<M>> {
        self.entities.get(&id)
    }

    /// First registered live entity carrying `name`
    pub fn get_by_name(&self, name: &EntityName) -> Option<&EntityHandle<M>> {
        self.id_of(name).and_then(|id| self.entities.get(&id))
    }

    pub fn id_of(&self, name: &EntityName) -> Option<EntityId> {
        self.names.get(name).and_then(|ids| ids.first().copied())
    }

    pub fn remove(&mut self, id: EntityId) -> Result<EntityHandle<M>> {
        let handle = self
            .entities
            .remove(&id)
            .ok_or(EngineError::UnknownEntity(id))?;

        self.names.retain(|_, ids| {
            ids.retain(|other| *other != id);
            !ids.is_empty()
        });
        self.retired.insert(id);
        tracing::debug!(%id, "Removed entity");
        Ok(handle)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Handles of every live entity, detached from the registry
    ///
    /// Used for update passes, so entities can add or remove registry entries
    /// while the pass is running.
    pub fn snapshot(&self) -> Vec<(EntityId, EntityHandle<M>)> {
        self.entities
            .iter()
            .map(|(id, handle)| (*id, handle.clone()))
            .collect()
    }

    /// Fail on the first name shared by more than one live entity
    pub fn validate_unique_names(&self) -> Result<()> {
        let mut seen = AHashSet::new();
        for handle in self.entities.values() {
            let entity = handle.try_borrow().map_err(|_| EngineError::HandleBorrowed)?;
            if !seen.insert(entity.name().clone()) {
                return Err(EngineError::DuplicateName(entity.name().clone()));
            }
        }
        Ok(())
    }

    /// Borrow an entity as its concrete type
    ///
    /// Returns `None` if the id is unknown, the type does not match, or the
    /// entity is mutably borrowed right now.
    pub fn inspect<E, R>(&self, id: EntityId, f: impl FnOnce(&E) -> R) -> Option<R>
    where
        E: Entity<M>,
    {
        let handle = self.entities.get(&id)?;
        let entity = handle.try_borrow().ok()?;
        entity.as_any().downcast_ref::<E>().map(f)
    }
}

impl<M: MessageKind> Default for EntityRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Result;
    use crate::messaging::telegram::Telegram;
    use crate::simulation::world::World;
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Msg {}

    struct Plain {
        id: EntityId,
        name: EntityName,
    }

    impl Entity<Msg> for Plain {
        fn id(&self) -> EntityId {
            self.id
        }

        fn name(&self) -> &EntityName {
            &self.name
        }

        fn update(&mut self, _world: &mut World<Msg>) -> Result<()> {
            Ok(())
        }

        fn handle_message(&mut self, _telegram: &Telegram<Msg>, _world: &mut World<Msg>) -> Result<bool> {
            Ok(false)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn plain(id: u32, name: &str) -> EntityHandle<Msg> {
        Rc::new(RefCell::new(Plain {
            id: EntityId(id),
            name: EntityName::from(name),
        }))
    }

    #[test]
    fn test_add_and_lookup() {
        let mut registry = EntityRegistry::new();
        registry.add(plain(1, "bob")).unwrap();

        assert!(registry.contains(EntityId(1)));
        assert!(registry.get(EntityId(1)).is_some());
        assert!(registry.get_by_name(&"bob".into()).is_some());
        assert!(registry.get_by_name(&"elsa".into()).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let mut registry = EntityRegistry::new();
        registry.add(plain(1, "bob")).unwrap();
        let err = registry.add(plain(1, "other")).unwrap_err();

        assert!(matches!(err, EngineError::DuplicateEntity(EntityId(1))));
        assert_eq!(registry.id_of(&"bob".into()), Some(EntityId(1)));
        assert!(registry.get_by_name(&"other".into()).is_none());
    }

    #[test]
    fn test_remove_unknown_fails() {
        let mut registry: EntityRegistry<Msg> = EntityRegistry::new();
        assert!(matches!(
            registry.remove(EntityId(9)),
            Err(EngineError::UnknownEntity(EntityId(9)))
        ));
    }

    #[test]
    fn test_removed_id_is_retired() {
        let mut registry = EntityRegistry::new();
        registry.add(plain(1, "bob")).unwrap();
        registry.remove(EntityId(1)).unwrap();

        assert!(registry.is_empty());
        assert!(registry.get_by_name(&"bob".into()).is_none());
        assert!(matches!(
            registry.add(plain(1, "bob")),
            Err(EngineError::RetiredEntity(EntityId(1)))
        ));
    }

    #[test]
    fn test_allocator_skips_manually_added_ids() {
        let mut registry = EntityRegistry::new();
        registry.add(plain(5, "five")).unwrap();
        assert_eq!(registry.allocate_id().unwrap(), EntityId(6));
    }

    #[test]
    fn test_largest_id_registers_then_allocation_fails() {
        let mut registry = EntityRegistry::new();
        registry.add(plain(u32::MAX, "last")).unwrap();

        assert!(registry.contains(EntityId(u32::MAX)));
        assert!(matches!(
            registry.allocate_id(),
            Err(EngineError::IdsExhausted)
        ));
    }

    #[test]
    fn test_name_lookup_returns_first_registered() {
        let mut registry = EntityRegistry::new();
        registry.add(plain(7, "twin")).unwrap();
        registry.add(plain(3, "twin")).unwrap();

        assert_eq!(registry.id_of(&"twin".into()), Some(EntityId(7)));
        assert!(matches!(
            registry.validate_unique_names(),
            Err(EngineError::DuplicateName(name)) if name.as_str() == "twin"
        ));

        registry.remove(EntityId(7)).unwrap();
        assert_eq!(registry.id_of(&"twin".into()), Some(EntityId(3)));
        assert!(registry.validate_unique_names().is_ok());
    }

    #[test]
    fn test_snapshot_is_ordered_by_id() {
        let mut registry = EntityRegistry::new();
        registry.add(plain(3, "c")).unwrap();
        registry.add(plain(1, "a")).unwrap();
        registry.add(plain(2, "b")).unwrap();

        let ids: Vec<_> = registry.snapshot().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![EntityId(1), EntityId(2), EntityId(3)]);
        assert_eq!(registry.ids().count(), 3);
    }

    #[test]
    fn test_inspect_downcasts() {
        let mut registry = EntityRegistry::new();
        registry.add(plain(1, "bob")).unwrap();

        let name = registry.inspect(EntityId(1), |p: &Plain| p.name.clone());
        assert_eq!(name, Some(EntityName::from("bob")));
    }
}
