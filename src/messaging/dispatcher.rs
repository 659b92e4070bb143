//! Message dispatcher
//!
//! Telegrams with no delay are delivered on the caller's stack before `send`
//! returns. Anything delayed goes into the pending queue and is delivered by
//! `drain_due` once its dispatch time arrives, normally once per tick after
//! every entity has updated.

use crate::core::config::FaultPolicy;
use crate::core::error::{EngineError, Result};
use crate::core::types::{EntityId, EntityName, SimTime};
use crate::messaging::queue::PendingQueue;
use crate::messaging::telegram::{MessageKind, Payload, Telegram};
use crate::simulation::world::World;

/// What happened to a telegram accepted by `send`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delivery {
    /// Delivered synchronously; `handled` is the receiver's answer
    Immediate { handled: bool },
    /// Waiting in the pending queue
    Queued { dispatch_time: SimTime },
}

impl Delivery {
    pub fn is_immediate(&self) -> bool {
        matches!(self, Delivery::Immediate { .. })
    }
}

/// Outcome of one drain pass
#[derive(Debug, Default)]
pub struct DrainReport {
    /// Telegrams handed to a live receiver
    pub delivered: usize,
    /// Delivered telegrams no state handled
    pub unhandled: usize,
    /// Telegrams whose receiver was gone
    pub dropped: usize,
    /// Receivers whose handler failed, when faults are skipped
    pub faulted: Vec<(EntityId, EngineError)>,
}

/// Telegram construction and the pending queue
///
/// Holds no per-entity state; routing goes through the world's registry.
#[derive(Debug)]
pub struct MessageDispatcher<M> {
    pending: PendingQueue<M>,
    next_sequence: u64,
}

impl<M: MessageKind> MessageDispatcher<M> {
    pub fn new() -> Self {
        Self {
            pending: PendingQueue::new(),
            next_sequence: 0,
        }
    }

    /// Build a telegram stamped with the next insertion sequence
    pub fn build(
        &mut self,
        sender: EntityId,
        receiver: EntityId,
        kind: M,
        dispatch_time: SimTime,
        payload: Option<Payload>,
    ) -> Telegram<M> {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        Telegram::new(sender, receiver, kind, dispatch_time, sequence).with_payload(payload)
    }

    pub fn enqueue(&mut self, telegram: Telegram<M>) {
        self.pending.insert(telegram);
    }

    pub fn pop_due(&mut self, now: SimTime) -> Option<Telegram<M>> {
        self.pending.pop_due(now)
    }

    pub fn pending(&self) -> &PendingQueue<M> {
        &self.pending
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Discard every pending telegram, returning how many there were
    pub fn clear_pending(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }
}

impl<M: MessageKind> Default for MessageDispatcher<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: MessageKind> World<M> {
    /// Send a telegram from `sender` to `receiver` after `delay` seconds
    ///
    /// Both ids must be registered; otherwise nothing is built or queued.
    /// With a zero delay the receiver's `handle_message` runs before this
    /// returns.
    pub fn send(
        &mut self,
        sender: EntityId,
        receiver: EntityId,
        kind: M,
        delay: SimTime,
        payload: Option<Payload>,
    ) -> Result<Delivery> {
        if !delay.is_finite() || delay < 0.0 {
            return Err(EngineError::InvalidDelay(delay));
        }
        let dispatch_time = self.now() + delay;
        // A delay lost to rounding at a large clock would be redelivered
        // within the same drain.
        if delay > 0.0 && dispatch_time <= self.now() {
            return Err(EngineError::InvalidDelay(delay));
        }
        if !self.registry().contains(sender) {
            return Err(EngineError::UnknownSender(sender));
        }
        if !self.registry().contains(receiver) {
            return Err(EngineError::UnknownReceiver(receiver));
        }

        let telegram = self
            .dispatcher_mut()
            .build(sender, receiver, kind, dispatch_time, payload);

        if delay == 0.0 {
            tracing::debug!(%sender, %receiver, ?kind, "Immediate telegram");
            let handled = self
                .deliver(&telegram)?
                .ok_or(EngineError::UnknownReceiver(receiver))?;
            return Ok(Delivery::Immediate { handled });
        }

        tracing::debug!(%sender, %receiver, ?kind, dispatch_time, "Queued telegram");
        self.dispatcher_mut().enqueue(telegram);
        Ok(Delivery::Queued { dispatch_time })
    }

    /// `send`, resolving both parties by name
    pub fn send_by_name(
        &mut self,
        sender: &EntityName,
        receiver: &EntityName,
        kind: M,
        delay: SimTime,
        payload: Option<Payload>,
    ) -> Result<Delivery> {
        let sender_id = self
            .registry()
            .id_of(sender)
            .ok_or_else(|| EngineError::UnknownName(sender.clone()))?;
        let receiver_id = self
            .registry()
            .id_of(receiver)
            .ok_or_else(|| EngineError::UnknownName(receiver.clone()))?;
        self.send(sender_id, receiver_id, kind, delay, payload)
    }

    /// Deliver every pending telegram whose dispatch time is at or before `now`
    ///
    /// Advances the clock to `now` first. Telegrams are popped one at a time in
    /// (time, sequence) order, so a delivered telegram is gone before the next
    /// handler runs and nothing is delivered twice. Telegrams addressed to
    /// entities that no longer exist are dropped.
    pub fn drain_due(&mut self, now: SimTime) -> Result<DrainReport> {
        self.advance_to(now)?;
        let policy = self.config().fault_policy;
        let mut report = DrainReport::default();

        while let Some(telegram) = self.dispatcher_mut().pop_due(now) {
            match self.deliver(&telegram) {
                Ok(Some(handled)) => {
                    report.delivered += 1;
                    if !handled {
                        report.unhandled += 1;
                    }
                }
                Ok(None) => {
                    tracing::debug!(
                        receiver = %telegram.receiver(),
                        kind = ?telegram.kind(),
                        "Dropped telegram for removed entity"
                    );
                    report.dropped += 1;
                }
                Err(err) => match policy {
                    FaultPolicy::AbortTick => return Err(err),
                    FaultPolicy::SkipEntity => {
                        tracing::warn!(receiver = %telegram.receiver(), error = %err, "Telegram handler failed");
                        report.faulted.push((telegram.receiver(), err));
                    }
                },
            }
        }

        Ok(report)
    }

    /// Hand a telegram to its receiver
    ///
    /// `Ok(None)` means the receiver is no longer registered.
    fn deliver(&mut self, telegram: &Telegram<M>) -> Result<Option<bool>> {
        let receiver = telegram.receiver();
        let handle = match self.registry().get(receiver) {
            Some(handle) => handle.clone(),
            None => return Ok(None),
        };

        let mut entity = match handle.try_borrow_mut() {
            Ok(entity) => entity,
            Err(_) => {
                tracing::warn!(%receiver, "Receiver is busy; refusing reentrant delivery");
                return Err(EngineError::ReceiverBusy(receiver));
            }
        };
        let handled = entity.handle_message(telegram, self)?;
        Ok(Some(handled))
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
    fn test_build_assigns_increasing_sequence() {
        let mut dispatcher = MessageDispatcher::new();
        let a = dispatcher.build(EntityId(1), EntityId(2), Msg::Ping, 1.0, None);
        let b = dispatcher.build(EntityId(1), EntityId(2), Msg::Ping, 1.0, None);
        assert!(a.sequence() < b.sequence());
    }

    #[test]
    fn test_clear_pending() {
        let mut dispatcher = MessageDispatcher::new();
        let telegram = dispatcher.build(EntityId(1), EntityId(2), Msg::Ping, 3.0, None);
        dispatcher.enqueue(telegram);
        assert!(dispatcher.has_pending());
        assert_eq!(dispatcher.clear_pending(), 1);
        assert_eq!(dispatcher.pending_len(), 0);
    }

    #[test]
    fn test_send_rejects_bad_delay() {
        let mut world: World<Msg> = World::new();
        let err = world
            .send(EntityId(1), EntityId(2), Msg::Ping, -1.0, None)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidDelay(_)));
        let err = world
            .send(EntityId(1), EntityId(2), Msg::Ping, f64::NAN, None)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidDelay(_)));
    }

    #[test]
    fn test_send_rejects_delay_lost_to_rounding() {
        let mut world: World<Msg> = World::new();
        world.advance_to(1e16).unwrap();
        let err = world
            .send(EntityId(1), EntityId(2), Msg::Ping, 1.0, None)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidDelay(_)));
        assert_eq!(world.dispatcher().pending_len(), 0);
    }

    #[test]
    fn test_send_to_unknown_sender() {
        let mut world: World<Msg> = World::new();
        let err = world
            .send(EntityId(1), EntityId(2), Msg::Ping, 0.0, None)
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownSender(EntityId(1))));
        assert_eq!(world.dispatcher().pending_len(), 0);
    }

    #[test]
    fn test_drain_on_empty_queue_is_noop() {
        let mut world: World<Msg> = World::new();
        let report = world.drain_due(10.0).unwrap();
        assert_eq!(report.delivered, 0);
        assert_eq!(report.dropped, 0);
        assert_eq!(world.now(), 10.0);
    }
}
