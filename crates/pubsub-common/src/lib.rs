//! # pubsub-common
//!
//! Shared configuration and telemetry for the pub/sub client crates.

pub mod config;
pub mod telemetry;

pub use config::{redact_url, ConfigError, RedisConfig};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
