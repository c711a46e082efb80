//! In-memory transport that replays scripted replies and records sent commands.

use super::Transport;
use redis::{Cmd, RedisError, RedisResult, Value};
use std::collections::VecDeque;
use std::io;

#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: VecDeque<RedisResult<Value>>,
    pub(crate) sent: Vec<Vec<u8>>,
    pub(crate) fail_sends: bool,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(mut self, value: Value) -> Self {
        self.replies.push_back(Ok(value));
        self
    }

    pub(crate) fn error(mut self, kind: io::ErrorKind) -> Self {
        self.replies
            .push_back(Err(RedisError::from(io::Error::new(kind, "scripted failure"))));
        self
    }

    pub(crate) fn remaining(&self) -> usize {
        self.replies.len()
    }
}

impl Transport for ScriptedTransport {
    fn send(&mut self, cmd: &Cmd) -> RedisResult<()> {
        if self.fail_sends {
            return Err(RedisError::from(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "scripted send failure",
            )));
        }
        self.sent.push(cmd.get_packed_command());
        Ok(())
    }

    fn recv(&mut self) -> RedisResult<Value> {
        self.replies.pop_front().unwrap_or_else(|| {
            Err(RedisError::from(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "script exhausted",
            )))
        })
    }
}

/// Packed form of a command, for comparing against `ScriptedTransport::sent`
pub(crate) fn packed(args: &[&str]) -> Vec<u8> {
    let mut cmd = redis::cmd(args[0]);
    for arg in &args[1..] {
        cmd.arg(*arg);
    }
    cmd.get_packed_command()
}

pub(crate) fn bulk(s: &str) -> Value {
    Value::BulkString(s.as_bytes().to_vec())
}

pub(crate) fn ack(token: &str, name: &str, count: i64) -> Value {
    Value::Array(vec![bulk(token), bulk(name), Value::Int(count)])
}

pub(crate) fn message(channel: &str, payload: &str) -> Value {
    Value::Array(vec![bulk("message"), bulk(channel), bulk(payload)])
}

pub(crate) fn pmessage(pattern: &str, channel: &str, payload: &str) -> Value {
    Value::Array(vec![
        bulk("pmessage"),
        bulk(pattern),
        bulk(channel),
        bulk(payload),
    ])
}

pub(crate) fn pong() -> Value {
    Value::Array(vec![bulk("pong"), bulk("")])
}
