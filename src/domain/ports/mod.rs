//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces the orchestration core consumes:
//! - Component: lifecycle contract implemented by feature components
//! - HostEnvironment: DOM and global-scope primitives of the host page
//! - KeyValueStore: persistent JSON blob storage
//! - Notifier: user-facing notifications
//!
//! These traits keep the core independent of any concrete host.

pub mod component;
pub mod host;
pub mod notifier;
pub mod store;

pub use component::Component;
pub use host::HostEnvironment;
pub use notifier::{NotificationLevel, Notifier};
pub use store::KeyValueStore;
