//! Component registry.
//!
//! The [`Registry`] maps component names to their descriptors. It is the one
//! shared mutable structure of the runtime: loaders write to it at arbitrary
//! times, the watchdog reads it while polling, and the orchestrator drives
//! state transitions through the crate-private `begin_init`/`finish_init`
//! pair. Every registration is mirrored into the host's global exposure
//! point so components that look for their peers directly can find them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use chrono::Utc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use crate::domain::errors::{ComponentError, RegistryError};
use crate::domain::models::{ComponentDescriptor, ComponentInstance, ComponentState};
use crate::domain::ports::HostEnvironment;

/// What a call to [`Registry::register`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// First registration of this name.
    Inserted,
    /// A different instance replaced the previous descriptor.
    Replaced,
    /// The identical instance was registered again; nothing changed.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterOutcome {
    pub name: String,
    pub registration: Registration,
    pub generation: u64,
    /// Whether the component was queued for immediate individual init.
    pub late_init_queued: bool,
}

/// Central registry of components.
pub struct Registry {
    components: RwLock<HashMap<String, ComponentDescriptor>>,
    host: Arc<dyn HostEnvironment>,
    next_generation: AtomicU64,
    /// Set once the global init pass has completed or the watchdog timed out.
    late_init: OnceLock<mpsc::UnboundedSender<String>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("late_init_enabled", &self.late_init_enabled())
            .finish_non_exhaustive()
    }
}

impl Registry {
    pub fn new(host: Arc<dyn HostEnvironment>) -> Self {
        Self {
            components: RwLock::new(HashMap::new()),
            host,
            next_generation: AtomicU64::new(0),
            late_init: OnceLock::new(),
        }
    }

    /// Register (or overwrite) a component.
    ///
    /// Registering a name twice never creates a second entry. Registering the
    /// very same instance again is a no-op so an already started component is
    /// never restarted. After the global init pass has completed, a new
    /// instance is queued for immediate individual initialization.
    pub async fn register(
        &self,
        name: impl Into<String>,
        instance: ComponentInstance,
    ) -> Result<RegisterOutcome, RegistryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let (registration, generation) = {
            let mut components = self.components.write().await;
            match components.get(&name) {
                Some(existing) if existing.instance.same_instance(&instance) => {
                    (Registration::Unchanged, existing.generation)
                }
                existing => {
                    let registration = if existing.is_some() {
                        Registration::Replaced
                    } else {
                        Registration::Inserted
                    };
                    let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
                    components.insert(
                        name.clone(),
                        ComponentDescriptor::new(name.clone(), instance.clone(), generation),
                    );
                    (registration, generation)
                }
            }
        };

        if registration == Registration::Unchanged {
            debug!(component = %name, "Identical instance re-registered, ignoring");
            return Ok(RegisterOutcome {
                name,
                registration,
                generation,
                late_init_queued: false,
            });
        }

        self.host.expose(&name, instance);

        let late_init_queued = self
            .late_init
            .get()
            .is_some_and(|tx| tx.send(name.clone()).is_ok());

        info!(
            component = %name,
            registration = ?registration,
            generation,
            late_init_queued,
            "Component registered"
        );

        Ok(RegisterOutcome {
            name,
            registration,
            generation,
            late_init_queued,
        })
    }

    /// Snapshot of a component's descriptor.
    pub async fn get(&self, name: &str) -> Option<ComponentDescriptor> {
        self.components.read().await.get(name).cloned()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.components.read().await.contains_key(name)
    }

    /// Current state; `Unregistered` for unknown names.
    pub async fn state(&self, name: &str) -> ComponentState {
        self.components
            .read()
            .await
            .get(name)
            .map_or(ComponentState::Unregistered, |d| d.state)
    }

    /// Registered names, sorted.
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.components.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// All descriptors, sorted by name.
    pub async fn snapshot(&self) -> Vec<ComponentDescriptor> {
        let mut descriptors: Vec<ComponentDescriptor> =
            self.components.read().await.values().cloned().collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    pub async fn len(&self) -> usize {
        self.components.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.components.read().await.is_empty()
    }

    /// Whether new registrations are initialized individually.
    ///
    /// True once the global pass has completed or the watchdog timed out.
    pub fn late_init_enabled(&self) -> bool {
        self.late_init.get().is_some()
    }

    /// Mirror every registered component into the exposure point again.
    pub(crate) async fn republish(&self) {
        let components = self.components.read().await;
        for (name, descriptor) in components.iter() {
            self.host.expose(name, descriptor.instance.clone());
        }
    }

    /// Route subsequent registrations to `tx` for individual init.
    ///
    /// Returns `false` if late init was already enabled.
    pub(crate) fn enable_late_init(&self, tx: mpsc::UnboundedSender<String>) -> bool {
        self.late_init.set(tx).is_ok()
    }

    /// Move a `Registered` component to `Initializing`.
    ///
    /// Returns the instance and the generation the outcome must be recorded
    /// against, or the current state when the component cannot be started.
    pub(crate) async fn begin_init(
        &self,
        name: &str,
    ) -> Result<(ComponentInstance, u64), ComponentState> {
        let mut components = self.components.write().await;
        match components.get_mut(name) {
            None => Err(ComponentState::Unregistered),
            Some(descriptor) if descriptor.state == ComponentState::Registered => {
                descriptor.state = ComponentState::Initializing;
                Ok((descriptor.instance.clone(), descriptor.generation))
            }
            Some(descriptor) => Err(descriptor.state),
        }
    }

    /// Record the outcome of an init started with `begin_init`.
    ///
    /// Ignored (returns `false`) when the name was overwritten in the
    /// meantime; the newer instance keeps its own lifecycle.
    pub(crate) async fn finish_init(
        &self,
        name: &str,
        generation: u64,
        result: &Result<(), ComponentError>,
    ) -> bool {
        let mut components = self.components.write().await;
        let Some(descriptor) = components.get_mut(name) else {
            return false;
        };
        if descriptor.generation != generation {
            warn!(
                component = %name,
                started_generation = generation,
                current_generation = descriptor.generation,
                "Component was replaced during init; discarding outcome"
            );
            return false;
        }

        match result {
            Ok(()) => {
                descriptor.state = ComponentState::Initialized;
                descriptor.initialized_at = Some(Utc::now());
                descriptor.failure = None;
            }
            Err(err) => {
                descriptor.state = ComponentState::Failed;
                descriptor.failure = Some(err.to_string());
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::Component;
    use crate::infrastructure::host::MemoryHost;
    use serde_json::json;

    struct Noop;

    #[async_trait::async_trait]
    impl Component for Noop {
        async fn init(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn registry() -> (Arc<MemoryHost>, Registry) {
        let host = Arc::new(MemoryHost::new());
        let registry = Registry::new(host.clone());
        (host, registry)
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let (_host, registry) = registry();
        let outcome = registry
            .register("Core", ComponentInstance::active(Noop))
            .await
            .unwrap();

        assert_eq!(outcome.registration, Registration::Inserted);
        assert!(!outcome.late_init_queued);
        let descriptor = registry.get("Core").await.unwrap();
        assert_eq!(descriptor.state, ComponentState::Registered);
        assert!(registry.get("UI").await.is_none());
        assert_eq!(registry.state("UI").await, ComponentState::Unregistered);
    }

    #[tokio::test]
    async fn test_register_overwrites_without_duplicates() {
        let (_host, registry) = registry();
        registry
            .register("Notepad", ComponentInstance::passive(json!("a")))
            .await
            .unwrap();
        let outcome = registry
            .register("Notepad", ComponentInstance::passive(json!("b")))
            .await
            .unwrap();

        assert_eq!(outcome.registration, Registration::Replaced);
        assert_eq!(registry.len().await, 1);
        let descriptor = registry.get("Notepad").await.unwrap();
        assert!(matches!(descriptor.instance, ComponentInstance::Passive(ref v) if v == "b"));
    }

    #[tokio::test]
    async fn test_register_same_instance_is_unchanged() {
        let (_host, registry) = registry();
        let instance = ComponentInstance::active(Noop);
        let first = registry.register("Core", instance.clone()).await.unwrap();
        let second = registry.register("Core", instance).await.unwrap();

        assert_eq!(second.registration, Registration::Unchanged);
        assert_eq!(first.generation, second.generation);
    }

    #[tokio::test]
    async fn test_register_rejects_empty_name() {
        let (_host, registry) = registry();
        let result = registry
            .register("  ", ComponentInstance::passive(json!(null)))
            .await;
        assert_eq!(result.unwrap_err(), RegistryError::EmptyName);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_register_mirrors_into_exposure_point() {
        let (host, registry) = registry();
        registry
            .register("Clock", ComponentInstance::passive(json!(1)))
            .await
            .unwrap();
        assert!(host.exposure().contains("Clock"));
    }

    #[tokio::test]
    async fn test_begin_init_only_from_registered() {
        let (_host, registry) = registry();
        registry
            .register("Core", ComponentInstance::active(Noop))
            .await
            .unwrap();

        let (_, generation) = registry.begin_init("Core").await.unwrap();
        assert_eq!(
            registry.begin_init("Core").await.unwrap_err(),
            ComponentState::Initializing
        );
        assert!(registry.finish_init("Core", generation, &Ok(())).await);
        assert_eq!(
            registry.begin_init("Core").await.unwrap_err(),
            ComponentState::Initialized
        );
        assert_eq!(
            registry.begin_init("Missing").await.unwrap_err(),
            ComponentState::Unregistered
        );
    }

    #[tokio::test]
    async fn test_finish_init_ignores_stale_generation() {
        let (_host, registry) = registry();
        registry
            .register("UI", ComponentInstance::active(Noop))
            .await
            .unwrap();
        let (_, old_generation) = registry.begin_init("UI").await.unwrap();

        registry
            .register("UI", ComponentInstance::active(Noop))
            .await
            .unwrap();
        let applied = registry
            .finish_init("UI", old_generation, &Err(ComponentError::NoInitializer))
            .await;

        assert!(!applied);
        assert_eq!(registry.state("UI").await, ComponentState::Registered);
    }

    #[tokio::test]
    async fn test_late_registration_is_queued() {
        let (_host, registry) = registry();
        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(registry.enable_late_init(tx.clone()));
        assert!(!registry.enable_late_init(tx));
        assert!(registry.late_init_enabled());

        let outcome = registry
            .register("Timers", ComponentInstance::active(Noop))
            .await
            .unwrap();
        assert!(outcome.late_init_queued);
        assert_eq!(rx.recv().await.as_deref(), Some("Timers"));
    }
}
