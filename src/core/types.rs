//! Core type definitions used throughout the codebase

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Unique identifier for entities
///
/// Ids are handed out by an [`IdAllocator`] and never reused, so a removed
/// entity's id can never be confused with a live one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From,
)]
#[display(fmt = "#{}", _0)]
pub struct EntityId(pub u32);

impl EntityId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

/// Symbolic entity name used for lookups by behavior code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub struct EntityName(String);

impl EntityName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EntityName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Simulated time in seconds
pub type SimTime = f64;

/// Simulation tick counter
pub type Tick = u64;

/// Monotonic source of entity ids
///
/// Counts in `u64` so observing `u32::MAX` cannot overflow; once the id space
/// is used up, `allocate` returns `None` instead of wrapping.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start allocating from `first`
    pub fn starting_at(first: u32) -> Self {
        Self {
            next: u64::from(first),
        }
    }

    /// Next unused id, or `None` when every id has been handed out
    pub fn allocate(&mut self) -> Option<EntityId> {
        let id = self.peek()?;
        self.next += 1;
        Some(id)
    }

    /// Make sure `id` is never handed out later
    pub fn observe(&mut self, id: EntityId) {
        self.next = self.next.max(u64::from(id.0) + 1);
    }

    /// The id the next call to `allocate` will return
    pub fn peek(&self) -> Option<EntityId> {
        u32::try_from(self.next).ok().map(EntityId)
    }
}
