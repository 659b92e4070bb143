//! Pending telegram queue
//!
//! Keyed on (dispatch time, insertion sequence) so telegrams sharing a
//! timestamp are kept apart and come out in the order they went in.

use std::collections::BTreeMap;

use crate::core::types::SimTime;
use crate::messaging::telegram::{MessageKind, OrderKey, Telegram};

#[derive(Debug, Clone)]
pub struct PendingQueue<M> {
    entries: BTreeMap<OrderKey, Telegram<M>>,
}

impl<M: MessageKind> PendingQueue<M> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, telegram: Telegram<M>) {
        self.entries.insert(telegram.order_key(), telegram);
    }

    /// Earliest pending telegram, due or not
    pub fn peek(&self) -> Option<&Telegram<M>> {
        self.entries.values().next()
    }

    /// Remove and return the earliest telegram if it is due at `now`
    pub fn pop_due(&mut self, now: SimTime) -> Option<Telegram<M>> {
        let (_, first) = self.entries.first_key_value()?;
        if !first.is_due(now) {
            return None;
        }
        self.entries.pop_first().map(|(_, telegram)| telegram)
    }

    pub fn next_dispatch_time(&self) -> Option<SimTime> {
        self.peek().map(|t| t.dispatch_time())
    }

    /// Number of telegrams due at `now`
    pub fn due_count(&self, now: SimTime) -> usize {
        self.entries.values().take_while(|t| t.is_due(now)).count()
    }

    /// Pending telegrams in delivery order
    pub fn iter(&self) -> impl Iterator<Item = &Telegram<M>> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<M: MessageKind> Default for PendingQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}
