//! Infrastructure layer module
//!
//! Adapters and ambient plumbing:
//! - Configuration loading (figment)
//! - Logging (tracing-subscriber, tracing-appender)
//! - In-memory host document
//! - Key/value stores (memory, JSON file)
//! - Notifiers
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod host;
pub mod logging;
pub mod notifier;
pub mod store;
