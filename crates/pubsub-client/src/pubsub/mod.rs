//! Redis Pub/Sub module.
//!
//! Classifies subscription push replies and drives a dedicated subscriber
//! connection; publishing goes through the pooled [`Publisher`].

pub(crate) mod classifier;
mod client;
mod error;
mod event;
mod publisher;
mod stream;

pub use classifier::classify;
pub use client::SubClient;
pub use error::{ProtocolError, SubscriptionError, SubscriptionResult};
pub use event::{Ack, EventKind, Message, PatternMessage, Scope, SubscriptionEvent};
pub use publisher::Publisher;
pub use stream::{EventStream, DEFAULT_STREAM_BUFFER};
