//! # pubsub-client
//!
//! Redis pub/sub subscription client with a blocking receive loop.
//!
//! ## Features
//!
//! - **Reply Classification**: Raw push replies become typed [`SubscriptionEvent`]s
//! - **Subscription Client**: Subscribe, unsubscribe, and receive over one dedicated connection
//! - **Event Stream**: Optional async wrapper that runs the receive loop on the blocking pool
//! - **Publisher**: Pooled publishing and `PUBSUB` introspection via deadpool
//!
//! ## Example
//!
//! ```ignore
//! use pubsub_client::{connect, SubClient};
//! use pubsub_common::RedisConfig;
//!
//! let config = RedisConfig::from_env()?;
//! let mut client = SubClient::new(connect(&config)?);
//!
//! let ack = client.subscribe(&["news"])?;
//! assert_eq!(ack.subscription_count(), Some(1));
//!
//! loop {
//!     let event = client.receive_message()?;
//!     println!("{:?}: {:?}", event.channel(), event.payload_str());
//! }
//! ```

pub mod pool;
pub mod pubsub;
pub mod transport;

// Re-export pool types
pub use pool::{PoolError, PoolResult, RedisPool, RedisPoolConfig};

// Re-export pubsub types
pub use pubsub::{
    classify, Ack, EventKind, EventStream, Message, PatternMessage, ProtocolError, Publisher,
    Scope, SubClient, SubscriptionError, SubscriptionEvent, SubscriptionResult,
    DEFAULT_STREAM_BUFFER,
};

// Re-export transport types
pub use transport::{connect, Transport};
