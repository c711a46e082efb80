//! Redis Pub/Sub publisher.
//!
//! Publishes over pooled async connections and wraps the `PUBSUB`
//! introspection commands.

use crate::pool::{PoolResult, RedisPool};
use redis::{AsyncCommands, ToRedisArgs};
use serde::Serialize;

/// Redis Pub/Sub publisher
#[derive(Debug, Clone)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish a payload to a channel, returning the number of receivers
    pub async fn publish<P>(&self, channel: &str, payload: P) -> PoolResult<u32>
    where
        P: ToRedisArgs + Send + Sync,
    {
        let mut conn = self.pool.get().await?;
        let receivers: u32 = conn.publish(channel, payload).await?;

        tracing::debug!(channel = %channel, receivers, "Published message");

        Ok(receivers)
    }

    /// Serialize `value` as JSON and publish it
    pub async fn publish_json<T: Serialize>(&self, channel: &str, value: &T) -> PoolResult<u32> {
        let payload = serde_json::to_string(value)?;
        self.publish(channel, payload).await
    }

    /// Publish the same payload to several channels over one connection
    pub async fn publish_many<P>(&self, channels: &[&str], payload: P) -> PoolResult<u32>
    where
        P: ToRedisArgs + Send + Sync,
    {
        if channels.is_empty() {
            return Ok(0);
        }

        let mut total_receivers = 0;
        let mut conn = self.pool.get().await?;

        for channel in channels {
            let receivers: u32 = conn.publish(*channel, &payload).await?;
            total_receivers += receivers;
        }

        tracing::debug!(
            channels = channels.len(),
            total_receivers,
            "Published message to multiple channels"
        );

        Ok(total_receivers)
    }

    /// Subscriber counts per channel (`PUBSUB NUMSUB`), in request order
    pub async fn num_subscribers(&self, channels: &[&str]) -> PoolResult<Vec<(String, u64)>> {
        let mut conn = self.pool.get().await?;
        let counts: Vec<(String, u64)> = redis::cmd("PUBSUB")
            .arg("NUMSUB")
            .arg(channels)
            .query_async(&mut conn)
            .await?;
        Ok(counts)
    }

    /// Number of active pattern subscriptions across all clients (`PUBSUB NUMPAT`)
    pub async fn num_patterns(&self) -> PoolResult<u64> {
        let mut conn = self.pool.get().await?;
        let count: u64 = redis::cmd("PUBSUB")
            .arg("NUMPAT")
            .query_async(&mut conn)
            .await?;
        Ok(count)
    }

    /// Channels with at least one subscriber, optionally filtered by a glob pattern
    pub async fn active_channels(&self, pattern: Option<&str>) -> PoolResult<Vec<String>> {
        let mut conn = self.pool.get().await?;
        let channels: Vec<String> = redis::cmd("PUBSUB")
            .arg("CHANNELS")
            .arg(pattern)
            .query_async(&mut conn)
            .await?;
        Ok(channels)
    }
}
