//! Muster - component orchestration for a sidebar add-on
//!
//! Components are loaded independently and announce themselves through a
//! registry. Muster waits for the foundational pair to arrive, initializes
//! everything in a declared order with per-component failure isolation,
//! removes duplicate UI left behind by earlier loads, keeps the layout
//! healthy, and falls back to a minimal persisted panel when the
//! foundational components never show up.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, port traits and error types
//! - **Service Layer** (`services`): registry, orchestrator, watchdog,
//!   conflict resolver, fallback builder, health monitor, and the
//!   [`Muster`] runtime facade
//! - **Infrastructure Layer** (`infrastructure`): config, logging, and
//!   host/store/notifier adapters
//! - **CLI Layer** (`cli`): command-line simulation and config inspection
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use muster::{ComponentInstance, Config, MemoryHost, MemoryStore, Muster, TracingNotifier};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let muster = Muster::new(
//!         &Config::default(),
//!         Arc::new(MemoryHost::new()),
//!         Arc::new(MemoryStore::new()),
//!         Arc::new(TracingNotifier),
//!     );
//!     muster.start().await;
//!     muster.register("Core", ComponentInstance::passive(serde_json::json!({}))).await?;
//!     muster.wait_until_settled().await;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{ComponentError, HostError, RegistryError, StoreError};
pub use domain::models::{
    ComponentDescriptor, ComponentInstance, ComponentState, Config, ControlValue, Element,
    ElementKind, ExposureSnapshot,
};
pub use domain::ports::{Component, HostEnvironment, KeyValueStore, NotificationLevel, Notifier};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::host::MemoryHost;
pub use infrastructure::notifier::{MemoryNotifier, TracingNotifier};
pub use infrastructure::store::{JsonFileStore, MemoryStore};
pub use services::{Muster, Registration, WatchdogState};
