//! Telegrams: timed messages between entities

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use ordered_float::OrderedFloat;

use crate::core::types::{EntityId, SimTime};

/// Anything usable as a telegram's message type
///
/// Behavior code normally defines a fieldless enum for this.
pub trait MessageKind: Copy + Eq + fmt::Debug + 'static {}

impl<T: Copy + Eq + fmt::Debug + 'static> MessageKind for T {}

/// Opaque data attached to a telegram
pub type Payload = Rc<dyn Any>;

/// Queue ordering key: dispatch time first, then insertion sequence
pub type OrderKey = (OrderedFloat<SimTime>, u64);

/// A message from one entity to another, deliverable at `dispatch_time`
///
/// Built by the dispatcher and never mutated afterwards.
#[derive(Clone)]
pub struct Telegram<M> {
    sender: EntityId,
    receiver: EntityId,
    kind: M,
    dispatch_time: SimTime,
    sequence: u64,
    payload: Option<Payload>,
}

impl<M: MessageKind> Telegram<M> {
    pub(crate) fn new(
        sender: EntityId,
        receiver: EntityId,
        kind: M,
        dispatch_time: SimTime,
        sequence: u64,
    ) -> Self {
        Self {
            sender,
            receiver,
            kind,
            dispatch_time,
            sequence,
            payload: None,
        }
    }

    pub(crate) fn with_payload(mut self, payload: Option<Payload>) -> Self {
        self.payload = payload;
        self
    }

    pub fn sender(&self) -> EntityId {
        self.sender
    }

    pub fn receiver(&self) -> EntityId {
        self.receiver
    }

    pub fn kind(&self) -> M {
        self.kind
    }

    pub fn dispatch_time(&self) -> SimTime {
        self.dispatch_time
    }

    /// Dispatcher-assigned insertion order, used to break timestamp ties
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Borrow the payload as a concrete type, if it is one
    pub fn payload_as<T: 'static>(&self) -> Option<&T> {
        self.payload.as_ref().and_then(|p| p.downcast_ref::<T>())
    }

    pub fn order_key(&self) -> OrderKey {
        (OrderedFloat(self.dispatch_time), self.sequence)
    }

    /// Has this telegram's dispatch time arrived?
    pub fn is_due(&self, now: SimTime) -> bool {
        self.dispatch_time <= now
    }
}

impl<M: fmt::Debug> fmt::Debug for Telegram<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Telegram")
            .field("sender", &self.sender)
            .field("receiver", &self.receiver)
            .field("kind", &self.kind)
            .field("dispatch_time", &self.dispatch_time)
            .field("sequence", &self.sequence)
            .field("has_payload", &self.payload.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Msg {
        Ping,
    }

    #[test]
    fn test_payload_downcast() {
        let telegram = Telegram::new(EntityId(1), EntityId(2), Msg::Ping, 0.0, 0)
            .with_payload(Some(Rc::new(42u32) as Payload));

        assert_eq!(telegram.payload_as::<u32>(), Some(&42));
        assert_eq!(telegram.payload_as::<String>(), None);
    }

    #[test]
    fn test_order_key_breaks_ties_by_sequence() {
        let first = Telegram::new(EntityId(1), EntityId(2), Msg::Ping, 5.0, 3);
        let second = Telegram::new(EntityId(1), EntityId(2), Msg::Ping, 5.0, 4);
        let earlier = Telegram::new(EntityId(1), EntityId(2), Msg::Ping, 4.0, 9);

        assert!(first.order_key() < second.order_key());
        assert!(earlier.order_key() < first.order_key());
    }

    #[test]
    fn test_is_due_is_inclusive() {
        let telegram = Telegram::new(EntityId(1), EntityId(2), Msg::Ping, 5.0, 0);
        assert!(!telegram.is_due(4.9));
        assert!(telegram.is_due(5.0));
        assert!(telegram.is_due(6.0));
    }
}
