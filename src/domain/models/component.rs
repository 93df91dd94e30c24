//! Component descriptor and lifecycle state.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ports::Component;

/// What a loader handed to the registry.
///
/// Checked once at registration time: either the instance can be
/// initialized, or it is plain data that the orchestrator will mark failed
/// if it is ever asked to start it.
#[derive(Clone)]
pub enum ComponentInstance {
    /// Has an initializer (and possibly a self-healing hook).
    Active(Arc<dyn Component>),
    /// Passive data with no lifecycle entry point.
    Passive(serde_json::Value),
}

impl ComponentInstance {
    /// Wrap a component implementation.
    pub fn active(component: impl Component + 'static) -> Self {
        Self::Active(Arc::new(component))
    }

    /// Wrap passive data.
    pub fn passive(value: serde_json::Value) -> Self {
        Self::Passive(value)
    }

    pub fn has_initializer(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    pub fn as_component(&self) -> Option<&Arc<dyn Component>> {
        match self {
            Self::Active(component) => Some(component),
            Self::Passive(_) => None,
        }
    }

    /// Whether two instances are the same object (or equal data).
    pub fn same_instance(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Active(a), Self::Active(b)) => Arc::ptr_eq(a, b),
            (Self::Passive(a), Self::Passive(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active(_) => f.write_str("Active(..)"),
            Self::Passive(value) => f.debug_tuple("Passive").field(value).finish(),
        }
    }
}

/// Lifecycle state of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentState {
    /// Not present in the registry.
    Unregistered,
    /// Present, not yet started.
    Registered,
    /// `init()` is in flight.
    Initializing,
    Initialized,
    Failed,
}

impl ComponentState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unregistered => "unregistered",
            Self::Registered => "registered",
            Self::Initializing => "initializing",
            Self::Initialized => "initialized",
            Self::Failed => "failed",
        }
    }

    /// Terminal states are never left within a session.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Initialized | Self::Failed)
    }
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named component and its lifecycle bookkeeping.
#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    pub name: String,
    pub instance: ComponentInstance,
    pub state: ComponentState,
    /// Failure reason when `state` is `Failed`.
    pub failure: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub initialized_at: Option<DateTime<Utc>>,
    /// Registration counter; bumps every time the name is overwritten.
    pub generation: u64,
}

impl ComponentDescriptor {
    pub fn new(name: impl Into<String>, instance: ComponentInstance, generation: u64) -> Self {
        Self {
            name: name.into(),
            instance,
            state: ComponentState::Registered,
            failure: None,
            registered_at: Utc::now(),
            initialized_at: None,
            generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Noop;

    #[async_trait::async_trait]
    impl Component for Noop {
        async fn init(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_new_descriptor_is_registered() {
        let descriptor = ComponentDescriptor::new("Core", ComponentInstance::active(Noop), 1);
        assert_eq!(descriptor.state, ComponentState::Registered);
        assert!(descriptor.failure.is_none());
        assert!(descriptor.initialized_at.is_none());
    }

    #[test]
    fn test_terminal_states() {
        assert!(ComponentState::Initialized.is_terminal());
        assert!(ComponentState::Failed.is_terminal());
        assert!(!ComponentState::Registered.is_terminal());
        assert!(!ComponentState::Initializing.is_terminal());
    }

    #[test]
    fn test_same_instance() {
        let a = ComponentInstance::active(Noop);
        let b = a.clone();
        let c = ComponentInstance::active(Noop);
        assert!(a.same_instance(&b));
        assert!(!a.same_instance(&c));
        assert!(ComponentInstance::passive(json!({"v": 1}))
            .same_instance(&ComponentInstance::passive(json!({"v": 1}))));
        assert!(!a.same_instance(&ComponentInstance::passive(json!(null))));
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let json = serde_json::to_string(&ComponentState::Initializing).unwrap();
        assert_eq!(json, "\"initializing\"");
    }
}
