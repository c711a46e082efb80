//! Publishing connection pool.
//!
//! Subscriber connections are dedicated and never pooled; this pool only
//! backs the [`Publisher`](crate::pubsub::Publisher) and ad-hoc commands.

mod redis_pool;

pub use redis_pool::{PoolError, PoolResult, RedisPool, RedisPoolConfig};
