//! Blocking subscription client.
//!
//! Wraps one connection dedicated to pub/sub and exposes subscribe,
//! unsubscribe and a pull-style [`SubClient::receive`]. Each call performs
//! blocking writes/reads on the wrapped connection; nothing is buffered,
//! retried or tracked locally. Subscription counts come from the store.

use crate::pubsub::classifier::{classify, describe};
use crate::pubsub::{
    EventKind, ProtocolError, Scope, SubscriptionError, SubscriptionEvent, SubscriptionResult,
};
use crate::transport::Transport;
use redis::{Cmd, RedisResult, Value};

/// Subscription client over a single dedicated connection.
///
/// Pass `&mut conn` to keep ownership of the connection, or move it in and
/// get it back with [`SubClient::into_inner`]. Every operation takes
/// `&mut self`; sharing a client between threads requires an outer lock.
///
/// After a read or write timeout the client refuses every further call with
/// [`SubscriptionError::Unusable`]: `redis::Connection` discards one later
/// reply per timed-out read, so published messages would be lost silently.
pub struct SubClient<C: Transport> {
    conn: C,
    timed_out: bool,
}

impl<C: Transport> SubClient<C> {
    #[must_use]
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            timed_out: false,
        }
    }

    /// False once a timeout has been seen; the connection must then be replaced
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.timed_out
    }

    /// Subscribe to channels; returns the acknowledgment for the last one
    pub fn subscribe(&mut self, channels: &[&str]) -> SubscriptionResult<SubscriptionEvent> {
        let acks = self.subscribe_all(channels)?;
        last_ack(acks, Scope::Channel.subscribe_command())
    }

    /// Subscribe to patterns; returns the acknowledgment for the last one
    pub fn psubscribe(&mut self, patterns: &[&str]) -> SubscriptionResult<SubscriptionEvent> {
        let acks = self.psubscribe_all(patterns)?;
        last_ack(acks, Scope::Pattern.subscribe_command())
    }

    /// Unsubscribe from channels, or from every channel when `channels` is empty
    pub fn unsubscribe(&mut self, channels: &[&str]) -> SubscriptionResult<SubscriptionEvent> {
        let acks = self.unsubscribe_all(channels)?;
        last_ack(acks, Scope::Channel.unsubscribe_command())
    }

    /// Unsubscribe from patterns, or from every pattern when `patterns` is empty
    pub fn punsubscribe(&mut self, patterns: &[&str]) -> SubscriptionResult<SubscriptionEvent> {
        let acks = self.punsubscribe_all(patterns)?;
        last_ack(acks, Scope::Pattern.unsubscribe_command())
    }

    /// Subscribe to channels and return every acknowledgment in order
    pub fn subscribe_all(&mut self, channels: &[&str]) -> SubscriptionResult<Vec<SubscriptionEvent>> {
        self.acknowledged(EventKind::Subscribe, Scope::Channel, channels)
    }

    /// Subscribe to patterns and return every acknowledgment in order
    pub fn psubscribe_all(&mut self, patterns: &[&str]) -> SubscriptionResult<Vec<SubscriptionEvent>> {
        self.acknowledged(EventKind::Subscribe, Scope::Pattern, patterns)
    }

    /// Unsubscribe from channels and return every acknowledgment in order
    pub fn unsubscribe_all(&mut self, channels: &[&str]) -> SubscriptionResult<Vec<SubscriptionEvent>> {
        self.acknowledged(EventKind::Unsubscribe, Scope::Channel, channels)
    }

    /// Unsubscribe from patterns and return every acknowledgment in order
    pub fn punsubscribe_all(&mut self, patterns: &[&str]) -> SubscriptionResult<Vec<SubscriptionEvent>> {
        self.acknowledged(EventKind::Unsubscribe, Scope::Pattern, patterns)
    }

    /// Block until the next reply arrives and classify it.
    ///
    /// This is the only way to observe published messages; call it in a loop.
    /// Without a read timeout on the connection it blocks indefinitely. A
    /// timeout ends the client: later calls fail with [`SubscriptionError::Unusable`].
    pub fn receive(&mut self) -> SubscriptionResult<SubscriptionEvent> {
        let reply = self.recv()?;
        let event = classify(reply)
            .inspect_err(|e| tracing::warn!(error = %e, "Unclassifiable pub/sub reply"))?;

        match &event {
            SubscriptionEvent::Message(msg) => {
                tracing::trace!(channel = %msg.channel, bytes = msg.payload.len(), "Received message");
            }
            SubscriptionEvent::PMessage(msg) => {
                tracing::trace!(
                    pattern = %msg.pattern,
                    channel = %msg.channel,
                    bytes = msg.payload.len(),
                    "Received pattern message"
                );
            }
            SubscriptionEvent::Subscribe(ack) | SubscriptionEvent::Unsubscribe(ack) => {
                tracing::debug!(
                    kind = %event.kind(),
                    name = ?ack.name,
                    count = ack.count,
                    "Received acknowledgment"
                );
            }
        }

        Ok(event)
    }

    /// Like [`SubClient::receive`], but skips acknowledgments and returns the next message
    pub fn receive_message(&mut self) -> SubscriptionResult<SubscriptionEvent> {
        loop {
            let event = self.receive()?;
            if event.is_message() {
                return Ok(event);
            }
        }
    }

    /// Round-trip a `PING`, optionally carrying `message`, and check the pong echoes it
    pub fn ping(&mut self, message: Option<&str>) -> SubscriptionResult<()> {
        let mut cmd = redis::cmd("PING");
        if let Some(message) = message {
            cmd.arg(message);
        }
        self.send(&cmd)?;

        let reply = self.recv()?;
        if is_matching_pong(&reply, message.unwrap_or_default()) {
            Ok(())
        } else {
            Err(ProtocolError::UnexpectedReply(describe_reply(&reply)).into())
        }
    }

    /// Give back the wrapped connection
    pub fn into_inner(self) -> C {
        self.conn
    }

    fn acknowledged(
        &mut self,
        expected: EventKind,
        scope: Scope,
        names: &[&str],
    ) -> SubscriptionResult<Vec<SubscriptionEvent>> {
        let command = match expected {
            EventKind::Subscribe => scope.subscribe_command(),
            _ => scope.unsubscribe_command(),
        };

        if names.is_empty() && expected == EventKind::Subscribe {
            return Err(SubscriptionError::EmptyArguments(command));
        }

        let mut cmd = redis::cmd(command);
        for name in names {
            cmd.arg(*name);
        }
        self.send(&cmd)?;
        tracing::debug!(command, names = ?names, "Sent subscription command");

        if names.is_empty() {
            return self.drain_until_pong(expected, scope);
        }

        let mut acks = Vec::with_capacity(names.len());
        for _ in names {
            let event = self.receive()?;
            check_ack(expected, scope, &event)?;
            acks.push(event);
        }
        Ok(acks)
    }

    /// Unsubscribing from everything yields one ack per dropped subscription,
    /// and the client does not know how many that is. A `PING` sent right
    /// behind the command marks the end of the acknowledgments.
    fn drain_until_pong(
        &mut self,
        expected: EventKind,
        scope: Scope,
    ) -> SubscriptionResult<Vec<SubscriptionEvent>> {
        self.send(&redis::cmd("PING"))?;

        let mut acks = Vec::new();
        loop {
            let reply = self.recv()?;
            if is_pong(&reply) {
                tracing::debug!(acks = acks.len(), "Unsubscribe-all complete");
                return Ok(acks);
            }

            let event = classify(reply).inspect_err(|e| {
                tracing::warn!(error = %e, "Unclassifiable reply during unsubscribe-all");
            })?;
            check_ack(expected, scope, &event)?;
            acks.push(event);
        }
    }

    fn send(&mut self, cmd: &Cmd) -> SubscriptionResult<()> {
        self.ensure_usable()?;
        let result = self.conn.send(cmd);
        self.track(result)
    }

    fn recv(&mut self) -> SubscriptionResult<Value> {
        self.ensure_usable()?;
        let result = self.conn.recv();
        self.track(result)
    }

    fn ensure_usable(&self) -> SubscriptionResult<()> {
        if self.timed_out {
            Err(SubscriptionError::Unusable)
        } else {
            Ok(())
        }
    }

    fn track<T>(&mut self, result: RedisResult<T>) -> SubscriptionResult<T> {
        result.map_err(|err| {
            if err.is_timeout() {
                tracing::warn!(error = %err, "Subscriber connection timed out, client is now unusable");
                self.timed_out = true;
            }
            SubscriptionError::Transport(err)
        })
    }
}

fn check_ack(expected: EventKind, scope: Scope, event: &SubscriptionEvent) -> Result<(), ProtocolError> {
    let in_scope = event.as_ack().is_some_and(|ack| ack.scope == scope);
    if event.kind() == expected && in_scope {
        Ok(())
    } else {
        tracing::warn!(
            expected = %expected,
            found = %event.kind(),
            "Out-of-order reply to subscription command"
        );
        Err(ProtocolError::OutOfOrder {
            expected,
            scope,
            found: event.kind(),
        })
    }
}

fn last_ack(mut acks: Vec<SubscriptionEvent>, command: &'static str) -> SubscriptionResult<SubscriptionEvent> {
    acks.pop()
        .ok_or(SubscriptionError::Protocol(ProtocolError::NoAcknowledgment(command)))
}

/// Pong for a `PING` carrying `message`: `["pong", message]` while subscribed,
/// otherwise `+PONG` (no message) or the echoed bulk string
fn is_matching_pong(reply: &Value, message: &str) -> bool {
    match reply {
        Value::Array(items) => match items.as_slice() {
            [Value::BulkString(token), Value::BulkString(echo)] => {
                token.eq_ignore_ascii_case(b"pong") && echo.as_slice() == message.as_bytes()
            }
            _ => false,
        },
        Value::SimpleString(text) => message.is_empty() && text.eq_ignore_ascii_case("pong"),
        Value::BulkString(echo) => !message.is_empty() && echo.as_slice() == message.as_bytes(),
        _ => false,
    }
}

/// `["pong", <msg>]` while subscribed, `+PONG` once the connection has left subscribed mode
fn is_pong(reply: &Value) -> bool {
    match reply {
        Value::Array(items) => matches!(
            items.first(),
            Some(Value::BulkString(token)) if token.eq_ignore_ascii_case(b"pong")
        ),
        Value::SimpleString(text) => text.eq_ignore_ascii_case("pong"),
        _ => false,
    }
}

fn describe_reply(reply: &Value) -> String {
    match classify(reply.clone()) {
        Ok(event) => event.kind().to_string(),
        Err(_) => describe(reply).to_string(),
    }
}
