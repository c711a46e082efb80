//! Push-reply classification.
//!
//! Redis uses one array shape for six different pub/sub replies:
//!
//! ```text
//! ["subscribe",    channel, count]      ["psubscribe",   pattern, count]
//! ["unsubscribe",  channel, count]      ["punsubscribe", pattern, count]
//! ["message",      channel, payload]    ["pmessage",     pattern, channel, payload]
//! ```
//!
//! [`classify`] turns one such reply into a [`SubscriptionEvent`] or a [`ProtocolError`].

use crate::pubsub::{Ack, Message, PatternMessage, ProtocolError, Scope, SubscriptionEvent};
use redis::Value;

/// Leading element of a pub/sub push reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReplyToken {
    Subscribe,
    Unsubscribe,
    PSubscribe,
    PUnsubscribe,
    Message,
    PMessage,
}

impl ReplyToken {
    fn parse(token: &[u8]) -> Option<Self> {
        match token {
            b"subscribe" => Some(Self::Subscribe),
            b"unsubscribe" => Some(Self::Unsubscribe),
            b"psubscribe" => Some(Self::PSubscribe),
            b"punsubscribe" => Some(Self::PUnsubscribe),
            b"message" => Some(Self::Message),
            b"pmessage" => Some(Self::PMessage),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
            Self::PSubscribe => "psubscribe",
            Self::PUnsubscribe => "punsubscribe",
            Self::Message => "message",
            Self::PMessage => "pmessage",
        }
    }
}

/// Classify one reply read from a subscribed connection.
///
/// Wrong arity, unknown tokens, non-numeric counts and non-text names are all
/// errors; no partially filled event is ever returned.
pub fn classify(reply: Value) -> Result<SubscriptionEvent, ProtocolError> {
    let items = match reply {
        Value::Array(items) => items,
        Value::ServerError(err) => {
            return Err(ProtocolError::Server(redis::RedisError::from(err).to_string()));
        }
        other => return Err(ProtocolError::NotAnArray(describe(&other).to_string())),
    };

    let token = match items.first() {
        Some(first) => match as_text(first) {
            Some(text) => ReplyToken::parse(text)
                .ok_or_else(|| ProtocolError::UnknownToken(String::from_utf8_lossy(text).into_owned()))?,
            None => return Err(ProtocolError::UnknownToken(describe(first).to_string())),
        },
        None => return Err(ProtocolError::UnknownToken(String::new())),
    };

    match token {
        ReplyToken::Subscribe => ack(token, Scope::Channel, items).map(SubscriptionEvent::Subscribe),
        ReplyToken::PSubscribe => ack(token, Scope::Pattern, items).map(SubscriptionEvent::Subscribe),
        ReplyToken::Unsubscribe => {
            ack(token, Scope::Channel, items).map(SubscriptionEvent::Unsubscribe)
        }
        ReplyToken::PUnsubscribe => {
            ack(token, Scope::Pattern, items).map(SubscriptionEvent::Unsubscribe)
        }
        ReplyToken::Message => {
            let [_, channel, payload] = fields::<3>(token, items)?;
            Ok(SubscriptionEvent::Message(Message {
                channel: name(token, "channel", channel)?,
                payload: payload_bytes(token, payload)?,
            }))
        }
        ReplyToken::PMessage => {
            let [_, pattern, channel, payload] = fields::<4>(token, items)?;
            Ok(SubscriptionEvent::PMessage(PatternMessage {
                pattern: name(token, "pattern", pattern)?,
                channel: name(token, "channel", channel)?,
                payload: payload_bytes(token, payload)?,
            }))
        }
    }
}

fn ack(token: ReplyToken, scope: Scope, items: Vec<Value>) -> Result<Ack, ProtocolError> {
    let [_, target, count] = fields::<3>(token, items)?;
    let field = match scope {
        Scope::Channel => "channel",
        Scope::Pattern => "pattern",
    };

    // The store acknowledges an unsubscribe-all on an idle connection with a nil name.
    let name = match (token, target) {
        (ReplyToken::Unsubscribe | ReplyToken::PUnsubscribe, Value::Nil) => None,
        (_, target) => Some(name(token, field, target)?),
    };

    Ok(Ack {
        scope,
        name,
        count: count_value(token, &count)?,
    })
}

fn fields<const N: usize>(token: ReplyToken, items: Vec<Value>) -> Result<[Value; N], ProtocolError> {
    items
        .try_into()
        .map_err(|items: Vec<Value>| ProtocolError::WrongArity {
            token: token.as_str(),
            expected: N,
            found: items.len(),
        })
}

fn name(token: ReplyToken, field: &'static str, value: Value) -> Result<String, ProtocolError> {
    let invalid = || ProtocolError::InvalidName {
        token: token.as_str(),
        field,
    };
    match value {
        Value::BulkString(bytes) => String::from_utf8(bytes).map_err(|_| invalid()),
        Value::SimpleString(text) => Ok(text),
        _ => Err(invalid()),
    }
}

fn count_value(token: ReplyToken, value: &Value) -> Result<usize, ProtocolError> {
    let parsed = match value {
        Value::Int(n) => usize::try_from(*n).ok(),
        Value::BulkString(_) | Value::SimpleString(_) => as_text(value)
            .and_then(|text| std::str::from_utf8(text).ok())
            .and_then(|text| text.parse::<usize>().ok()),
        _ => None,
    };
    parsed.ok_or(ProtocolError::InvalidCount {
        token: token.as_str(),
    })
}

fn payload_bytes(token: ReplyToken, value: Value) -> Result<Vec<u8>, ProtocolError> {
    match value {
        Value::BulkString(bytes) => Ok(bytes),
        Value::SimpleString(text) => Ok(text.into_bytes()),
        _ => Err(ProtocolError::InvalidPayload {
            token: token.as_str(),
        }),
    }
}

fn as_text(value: &Value) -> Option<&[u8]> {
    match value {
        Value::BulkString(bytes) => Some(bytes),
        Value::SimpleString(text) => Some(text.as_bytes()),
        _ => None,
    }
}

/// Short name of a reply type for error messages
pub(crate) fn describe(value: &Value) -> &'static str {
    match value {
        Value::Nil => "nil",
        Value::Int(_) => "integer",
        Value::BulkString(_) => "bulk string",
        Value::Array(_) => "array",
        Value::SimpleString(_) => "simple string",
        Value::Okay => "OK",
        Value::ServerError(_) => "server error",
        _ => "unsupported reply type",
    }
}
