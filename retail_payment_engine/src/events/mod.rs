//! Fire-and-forget side-effect dispatch.
//!
//! Document generation and customer notifications happen off the critical path: a financial transition publishes
//! an event and returns, and subscribed handlers run on their own tasks. A handler failure is that handler's
//! problem; it never rolls back or blocks the transition that produced the event.

mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::{OrderPlacedEvent, PaymentVerifiedEvent, RefundSettledEvent};
pub use hooks::{EventHandlers, EventHooks, EventProducers};
