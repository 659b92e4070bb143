//! Telegrams and their dispatch

pub mod dispatcher;
pub mod queue;
pub mod telegram;

pub use dispatcher::{Delivery, DrainReport, MessageDispatcher};
pub use queue::PendingQueue;
pub use telegram::{MessageKind, Payload, Telegram};
