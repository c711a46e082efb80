//! Transport seam between the subscription client and a Redis connection.
//!
//! The client only needs to write a command and read replies one at a time.
//! `redis::Connection` provides both; tests substitute a scripted transport.

mod connection;
#[cfg(test)]
pub(crate) mod scripted;

pub use connection::connect;

use redis::{Cmd, RedisResult, Value};

/// A connection that can send one command and read replies one at a time
pub trait Transport {
    /// Write a command without waiting for its reply
    fn send(&mut self, cmd: &Cmd) -> RedisResult<()>;

    /// Block until the next reply arrives
    fn recv(&mut self) -> RedisResult<Value>;
}

// `recv_response` is a request/response read: each one that times out makes
// the connection skip a later reply. `SubClient` stops reading after a timeout.
impl Transport for redis::Connection {
    fn send(&mut self, cmd: &Cmd) -> RedisResult<()> {
        self.send_packed_command(&cmd.get_packed_command())
    }

    fn recv(&mut self) -> RedisResult<Value> {
        self.recv_response()
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, cmd: &Cmd) -> RedisResult<()> {
        (**self).send(cmd)
    }

    fn recv(&mut self) -> RedisResult<Value> {
        (**self).recv()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, cmd: &Cmd) -> RedisResult<()> {
        (**self).send(cmd)
    }

    fn recv(&mut self) -> RedisResult<Value> {
        (**self).recv()
    }
}
