//! Integration test utilities for the pub/sub client
//!
//! This crate provides helpers for running end-to-end tests against
//! a live Redis server.


pub use fixtures::*;
pub use helpers::*;
