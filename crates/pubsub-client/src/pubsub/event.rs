//! Typed subscription events.
//!
//! Every reply read from a subscribed connection becomes one [`SubscriptionEvent`].

use serde::de::DeserializeOwned;
use std::fmt;

/// Logical kind of a subscription event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Channel or pattern subscribe acknowledgment
    Subscribe,
    /// Channel or pattern unsubscribe acknowledgment
    Unsubscribe,
    /// Message published to a subscribed channel
    Message,
    /// Message published to a channel matching a subscribed pattern
    PMessage,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subscribe => write!(f, "subscribe"),
            Self::Unsubscribe => write!(f, "unsubscribe"),
            Self::Message => write!(f, "message"),
            Self::PMessage => write!(f, "pmessage"),
        }
    }
}

/// Whether an acknowledgment concerns an exact channel or a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Channel,
    Pattern,
}

impl Scope {
    /// Command name for subscribing in this scope
    #[must_use]
    pub fn subscribe_command(self) -> &'static str {
        match self {
            Self::Channel => "SUBSCRIBE",
            Self::Pattern => "PSUBSCRIBE",
        }
    }

    /// Command name for unsubscribing in this scope
    #[must_use]
    pub fn unsubscribe_command(self) -> &'static str {
        match self {
            Self::Channel => "UNSUBSCRIBE",
            Self::Pattern => "PUNSUBSCRIBE",
        }
    }
}

/// Subscribe/unsubscribe acknowledgment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub scope: Scope,
    /// Channel or pattern name; `None` when the store had nothing to unsubscribe from
    pub name: Option<String>,
    /// Channels plus patterns the connection holds after this acknowledgment
    pub count: usize,
}

/// Message delivered to an exact channel subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub channel: String,
    pub payload: Vec<u8>,
}

/// Message delivered through a pattern subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMessage {
    pub pattern: String,
    pub channel: String,
    pub payload: Vec<u8>,
}

/// One classified reply from a subscribed connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionEvent {
    Subscribe(Ack),
    Unsubscribe(Ack),
    Message(Message),
    PMessage(PatternMessage),
}

impl SubscriptionEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Subscribe(_) => EventKind::Subscribe,
            Self::Unsubscribe(_) => EventKind::Unsubscribe,
            Self::Message(_) => EventKind::Message,
            Self::PMessage(_) => EventKind::PMessage,
        }
    }

    /// Channel name: set for channel acknowledgments and both message kinds
    #[must_use]
    pub fn channel(&self) -> Option<&str> {
        match self {
            Self::Subscribe(ack) | Self::Unsubscribe(ack) => match ack.scope {
                Scope::Channel => ack.name.as_deref(),
                Scope::Pattern => None,
            },
            Self::Message(msg) => Some(&msg.channel),
            Self::PMessage(msg) => Some(&msg.channel),
        }
    }

    /// Pattern: set for pattern acknowledgments and pattern messages
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        match self {
            Self::Subscribe(ack) | Self::Unsubscribe(ack) => match ack.scope {
                Scope::Pattern => ack.name.as_deref(),
                Scope::Channel => None,
            },
            Self::Message(_) => None,
            Self::PMessage(msg) => Some(&msg.pattern),
        }
    }

    /// Subscription count reported by the store (acknowledgments only)
    #[must_use]
    pub fn subscription_count(&self) -> Option<usize> {
        self.as_ack().map(|ack| ack.count)
    }

    /// Message body (messages only)
    #[must_use]
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Self::Message(msg) => Some(&msg.payload),
            Self::PMessage(msg) => Some(&msg.payload),
            Self::Subscribe(_) | Self::Unsubscribe(_) => None,
        }
    }

    /// Message body as UTF-8 text; `None` for acknowledgments or non-UTF-8 bodies
    #[must_use]
    pub fn payload_str(&self) -> Option<&str> {
        self.payload().and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    /// Decode the message body as JSON; `None` for acknowledgments
    pub fn payload_json<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.payload().map(serde_json::from_slice)
    }

    #[must_use]
    pub fn as_ack(&self) -> Option<&Ack> {
        match self {
            Self::Subscribe(ack) | Self::Unsubscribe(ack) => Some(ack),
            Self::Message(_) | Self::PMessage(_) => None,
        }
    }

    #[must_use]
    pub fn is_message(&self) -> bool {
        matches!(self, Self::Message(_) | Self::PMessage(_))
    }
}
