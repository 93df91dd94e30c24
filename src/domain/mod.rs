//! Domain layer for the Muster orchestration runtime
//!
//! This module contains the component model, configuration types and the
//! ports the core consumes.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{ComponentError, HostError, RegistryError, StoreError, StoreResult};
