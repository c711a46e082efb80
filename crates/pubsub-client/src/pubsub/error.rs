//! Subscription error types.

use crate::pubsub::{EventKind, Scope};

/// A reply that does not have the shape of a subscription event
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("unexpected reply format: expected an array, got {0}")]
    NotAnArray(String),

    #[error("unexpected reply format: unknown event type {0:?}")]
    UnknownToken(String),

    #[error("unexpected reply format: {token} reply has {found} elements, expected {expected}")]
    WrongArity {
        token: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("unexpected reply format: invalid {field} in {token} reply")]
    InvalidName {
        token: &'static str,
        field: &'static str,
    },

    #[error("unexpected reply format: non-numeric subscription count in {token} reply")]
    InvalidCount { token: &'static str },

    #[error("unexpected reply format: invalid payload in {token} reply")]
    InvalidPayload { token: &'static str },

    #[error("out-of-order reply: expected {expected} ({scope:?}), got {found}")]
    OutOfOrder {
        expected: EventKind,
        scope: Scope,
        found: EventKind,
    },

    #[error("unexpected reply while waiting for pong: {0}")]
    UnexpectedReply(String),

    #[error("{0} finished without any acknowledgment")]
    NoAcknowledgment(&'static str),

    #[error("server error: {0}")]
    Server(String),
}

/// Error type for subscription client operations
#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error("Transport error: {0}")]
    Transport(#[from] redis::RedisError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("{0} requires at least one channel or pattern")]
    EmptyArguments(&'static str),

    #[error("Subscriber connection is unusable after a timeout, open a new one")]
    Unusable,
}

impl SubscriptionError {
    /// The connection read or write failed
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// A reply arrived but was not a valid subscription event; the connection is unusable
    #[must_use]
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }

    /// A read or write timed out.
    ///
    /// `redis::Connection` discards one later reply per timed-out read, so
    /// the client refuses further calls and the connection must be replaced.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// The client already saw a timeout and no longer touches the connection
    #[must_use]
    pub fn is_unusable(&self) -> bool {
        matches!(self, Self::Unusable)
    }

    /// The store or the network closed the connection
    #[must_use]
    pub fn is_connection_closed(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connection_dropped() || e.is_connection_refusal())
    }
}

/// Result type for subscription client operations
pub type SubscriptionResult<T> = Result<T, SubscriptionError>;
