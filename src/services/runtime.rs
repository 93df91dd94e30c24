//! Runtime facade wiring the orchestration services together.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::errors::RegistryError;
use crate::domain::models::{ComponentDescriptor, ComponentInstance, Config};
use crate::domain::ports::{HostEnvironment, KeyValueStore, Notifier};
use crate::services::conflict_resolver::{ConflictReport, ConflictResolver};
use crate::services::fallback_builder::FallbackBuilder;
use crate::services::health_monitor::HealthMonitor;
use crate::services::orchestrator::{InitPlan, Orchestrator};
use crate::services::registry::{RegisterOutcome, Registry};
use crate::services::watchdog::{Watchdog, WatchdogDeps, WatchdogState};

/// One orchestration runtime per page load.
///
/// Startup order: conflict resolution, then the arrival watchdog, which in
/// turn hands over to the orchestrator and health monitor, or to the
/// fallback builder. Components may be registered at any time, including
/// before [`start`](Muster::start).
pub struct Muster {
    id: Uuid,
    registry: Arc<Registry>,
    orchestrator: Orchestrator,
    resolver: Arc<ConflictResolver>,
    fallback: Arc<FallbackBuilder>,
    watchdog: Arc<Watchdog>,
    shutdown_tx: broadcast::Sender<()>,
    started: AtomicBool,
}

impl Muster {
    pub fn new(
        config: &Config,
        host: Arc<dyn HostEnvironment>,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let id = Uuid::new_v4();
        let registry = Arc::new(Registry::new(Arc::clone(&host)));
        let orchestrator = Orchestrator::new(
            Arc::clone(&registry),
            InitPlan::from_config(&config.orchestration),
        );
        let resolver = Arc::new(ConflictResolver::new(
            Arc::clone(&host),
            config.artifacts.ui_prefix.clone(),
            id,
        ));
        let fallback = Arc::new(FallbackBuilder::new(
            Arc::clone(&host),
            store,
            Arc::clone(&notifier),
            config.fallback.clone(),
        ));
        let health = Arc::new(HealthMonitor::new(
            Arc::clone(&registry),
            Arc::clone(&resolver),
            &config.health,
        ));
        let (shutdown_tx, _) = broadcast::channel(1);
        let watchdog = Arc::new(Watchdog::new(
            WatchdogDeps {
                registry: Arc::clone(&registry),
                host,
                orchestrator: orchestrator.clone(),
                fallback: Arc::clone(&fallback),
                health,
                notifier,
                shutdown: shutdown_tx.clone(),
            },
            &config.watchdog,
        ));

        Self {
            id,
            registry,
            orchestrator,
            resolver,
            fallback,
            watchdog,
            shutdown_tx,
            started: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Resolve conflicts and start polling for the foundational pair.
    ///
    /// Returns `None` if the runtime was already started.
    pub async fn start(&self) -> Option<ConflictReport> {
        if self.started.swap(true, Ordering::SeqCst) {
            warn!(runtime = %self.id, "Runtime already started");
            return None;
        }

        let report = self.resolver.resolve();
        // The exposure point was just cleared; put our own registrations back.
        self.registry.republish().await;

        info!(
            runtime = %self.id,
            removed = report.removed.len(),
            captured_exposure = report.captured.is_some(),
            "Runtime started"
        );
        Arc::clone(&self.watchdog).spawn();
        Some(report)
    }

    /// Registration surface for component loaders.
    pub async fn register(
        &self,
        name: impl Into<String>,
        instance: ComponentInstance,
    ) -> Result<RegisterOutcome, RegistryError> {
        self.registry.register(name, instance).await
    }

    pub async fn get(&self, name: &str) -> Option<ComponentDescriptor> {
        self.registry.get(name).await
    }

    pub fn state(&self) -> WatchdogState {
        self.watchdog.state()
    }

    /// Wait until orchestration finished or the fallback was built.
    pub async fn wait_until_settled(&self) -> WatchdogState {
        let mut settled = self.watchdog.settled();
        // Err only if the sender was dropped, which `self` prevents.
        let _ = settled.wait_for(|done| *done).await;
        self.state()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn watchdog(&self) -> &Arc<Watchdog> {
        &self.watchdog
    }

    pub fn fallback(&self) -> &Arc<FallbackBuilder> {
        &self.fallback
    }

    /// Stop background health monitoring.
    pub fn shutdown(&self) {
        if self.shutdown_tx.send(()).is_err() {
            info!(runtime = %self.id, "Shutdown requested with no background tasks running");
        }
    }
}
