//! Configuration structs

mod redis_config;

pub use redis_config::{redact_url, ConfigError, RedisConfig};
