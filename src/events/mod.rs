//! Event bindings between user handlers and the platform's event streams.

pub mod bridge;
pub mod payload;

pub use bridge::{AttachOutcome, Disposer, EventBridge, Subscription};
pub use payload::{EventHandler, EventPayload};
