//! Degraded sidebar built when the foundational components never arrive.
//!
//! Depends only on the host document and the key/value store: no registry,
//! no feature component. Offers one persisted toggle and one persisted
//! free-text field, each saved on every change.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::domain::errors::HostError;
use crate::domain::models::{ControlValue, Element, FallbackConfig};
use crate::domain::ports::{HostEnvironment, KeyValueStore, NotificationLevel, Notifier};

pub struct FallbackBuilder {
    host: Arc<dyn HostEnvironment>,
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    config: FallbackConfig,
    built: AtomicBool,
}

impl FallbackBuilder {
    pub fn new(
        host: Arc<dyn HostEnvironment>,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        config: FallbackConfig,
    ) -> Self {
        Self {
            host,
            store,
            notifier,
            config,
            built: AtomicBool::new(false),
        }
    }

    /// Whether the fallback has been built during this page load.
    pub fn is_built(&self) -> bool {
        self.built.load(Ordering::SeqCst)
    }

    pub fn panel_id(&self) -> &str {
        &self.config.panel_id
    }

    pub fn toggle_id(&self) -> String {
        format!("{}-toggle", self.config.panel_id)
    }

    pub fn notes_id(&self) -> String {
        format!("{}-notes", self.config.panel_id)
    }

    /// Build the panel unless it was already built during this page load.
    ///
    /// Returns whether this call built it.
    pub fn build_once(&self) -> Result<bool, HostError> {
        if self.built.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }
        if let Err(err) = self.build() {
            self.built.store(false, Ordering::SeqCst);
            return Err(err);
        }
        Ok(true)
    }

    /// Build the panel, replacing any previous fallback panel.
    pub fn build(&self) -> Result<String, HostError> {
        for stale in self.host.find_artifacts(&self.config.panel_id) {
            if self.host.remove_artifact(&stale) {
                warn!(id = %stale, "Removed previous fallback panel");
            }
        }

        let enabled = self
            .store
            .load(&self.config.toggle_key, Value::Bool(false))
            .as_bool()
            .unwrap_or(false);
        let notes = match self.store.load(&self.config.notes_key, Value::String(String::new())) {
            Value::String(text) => text,
            _ => String::new(),
        };

        let panel = Element::container(self.config.panel_id.clone(), "Sidebar (safe mode)")
            .with_child(Element::label(
                format!("{}-status", self.config.panel_id),
                "Some sidebar features failed to load. Basic tools are still available.",
            ))
            .with_child(
                Element::toggle(self.toggle_id(), "Sidebar enabled", enabled)
                    .on_change(self.persist(self.config.toggle_key.clone())),
            )
            .with_child(
                Element::text_area(self.notes_id(), "Quick notes", notes)
                    .on_change(self.persist(self.config.notes_key.clone())),
            );

        self.host.mount(panel)?;

        info!(panel_id = %self.config.panel_id, "Fallback panel built");
        self.notifier.show(
            "Sidebar",
            "Running in safe mode with basic tools.",
            NotificationLevel::Info,
            Some(Duration::from_secs(5)),
        );
        Ok(self.config.panel_id.clone())
    }

    /// Change listener saving the control value under `key`.
    fn persist(&self, key: String) -> impl Fn(&ControlValue) + Send + Sync + 'static {
        let store = Arc::clone(&self.store);
        move |value| {
            let json = match value {
                ControlValue::Checked(checked) => Value::Bool(*checked),
                ControlValue::Text(text) => Value::String(text.clone()),
            };
            if let Err(err) = store.save(&key, &json) {
                warn!(key = %key, error = %err, "Failed to persist fallback control");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ElementKind;
    use crate::infrastructure::host::MemoryHost;
    use crate::infrastructure::notifier::MemoryNotifier;
    use crate::infrastructure::store::MemoryStore;
    use serde_json::json;

    struct Fixture {
        host: Arc<MemoryHost>,
        store: Arc<MemoryStore>,
        notifier: Arc<MemoryNotifier>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                host: Arc::new(MemoryHost::new()),
                store: Arc::new(MemoryStore::new()),
                notifier: Arc::new(MemoryNotifier::new()),
            }
        }

        fn builder(&self) -> FallbackBuilder {
            FallbackBuilder::new(
                self.host.clone(),
                self.store.clone(),
                self.notifier.clone(),
                FallbackConfig::default(),
            )
        }
    }

    #[test]
    fn test_build_mounts_toggle_and_text() {
        let fixture = Fixture::new();
        let builder = fixture.builder();

        let id = builder.build().unwrap();

        let panel = fixture.host.element(&id).unwrap();
        assert_eq!(panel.count(&|k| matches!(k, ElementKind::Toggle { .. })), 1);
        assert_eq!(panel.count(&|k| matches!(k, ElementKind::TextArea { .. })), 1);
        assert_eq!(fixture.notifier.count(), 1);
    }

    #[test]
    fn test_build_once_only_builds_once() {
        let fixture = Fixture::new();
        let builder = fixture.builder();

        assert!(builder.build_once().unwrap());
        assert!(!builder.build_once().unwrap());
        assert!(builder.is_built());
        assert_eq!(fixture.host.find_artifacts(builder.panel_id()).len(), 1);
    }

    #[test]
    fn test_rebuild_replaces_previous_panel() {
        let fixture = Fixture::new();
        let builder = fixture.builder();

        builder.build().unwrap();
        builder.build().unwrap();

        assert_eq!(fixture.host.find_artifacts(builder.panel_id()).len(), 1);
    }

    #[test]
    fn test_changes_persist_immediately() {
        let fixture = Fixture::new();
        let builder = fixture.builder();
        builder.build().unwrap();

        fixture
            .host
            .dispatch_input(&builder.toggle_id(), ControlValue::Checked(true))
            .unwrap();
        fixture
            .host
            .dispatch_input(&builder.notes_id(), ControlValue::Text("buy milk".into()))
            .unwrap();

        assert_eq!(fixture.store.load("fallback.enabled", json!(false)), json!(true));
        assert_eq!(fixture.store.load("fallback.notes", json!("")), json!("buy milk"));
    }

    #[test]
    fn test_panel_restores_persisted_values() {
        let fixture = Fixture::new();
        fixture.store.save("fallback.enabled", &json!(true)).unwrap();
        fixture.store.save("fallback.notes", &json!("remember")).unwrap();

        let builder = fixture.builder();
        builder.build().unwrap();

        let toggle = fixture.host.element(&builder.toggle_id()).unwrap();
        assert!(matches!(toggle.kind, ElementKind::Toggle { checked: true, .. }));
        let notes = fixture.host.element(&builder.notes_id()).unwrap();
        assert!(matches!(notes.kind, ElementKind::TextArea { ref value, .. } if value == "remember"));
    }
}
