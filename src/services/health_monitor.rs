use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::domain::models::{ComponentInstance, ComponentState, HealthConfig};
use crate::services::conflict_resolver::ConflictResolver;
use crate::services::orchestrator::panic_message;
use crate::services::registry::Registry;

/// Result of one repair tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairOutcome {
    /// The repair component is not registered or exposes no hook.
    Absent,
    /// The repair component is registered but not initialized.
    NotInitialized(ComponentState),
    Repaired,
    Failed(String),
}

/// Background re-assertion of single-instance invariants
///
/// Runs two schedules after orchestration succeeded:
/// - a duplicate-artifact scan (default every 10 seconds) that keeps exactly
///   one sidebar artifact
/// - a self-healing tick (default every 3 seconds) that calls the repair
///   component's `repair_layout` hook when it exists and the component
///   is initialized
///
/// Tick handlers never propagate errors or panics, so a failing check does
/// not cancel the schedule.
pub struct HealthMonitor {
    registry: Arc<Registry>,
    resolver: Arc<ConflictResolver>,
    scan_interval: Duration,
    repair_interval: Duration,
    repair_component: String,
}

impl HealthMonitor {
    /// Create a health monitor with the given configuration
    pub fn new(
        registry: Arc<Registry>,
        resolver: Arc<ConflictResolver>,
        config: &HealthConfig,
    ) -> Self {
        Self {
            registry,
            resolver,
            scan_interval: Duration::from_millis(config.scan_interval_ms),
            repair_interval: Duration::from_millis(config.repair_interval_ms),
            repair_component: config.repair_component.clone(),
        }
    }

    /// One duplicate scan. Returns how many artifacts were removed.
    pub fn scan_tick(&self) -> usize {
        match catch_unwind(AssertUnwindSafe(|| self.resolver.dedupe())) {
            Ok(removed) => removed.len(),
            Err(payload) => {
                tracing::error!(
                    error = %panic_message(payload.as_ref()),
                    "Duplicate scan panicked"
                );
                0
            }
        }
    }

    /// One self-healing tick.
    pub async fn repair_tick(&self) -> RepairOutcome {
        let Some(descriptor) = self.registry.get(&self.repair_component).await else {
            return RepairOutcome::Absent;
        };
        if descriptor.state != ComponentState::Initialized {
            tracing::trace!(
                component = %self.repair_component,
                state = %descriptor.state,
                "Layout repair skipped"
            );
            return RepairOutcome::NotInitialized(descriptor.state);
        }
        let ComponentInstance::Active(component) = descriptor.instance else {
            return RepairOutcome::Absent;
        };

        match catch_unwind(AssertUnwindSafe(|| component.repair_layout())) {
            Ok(None) => RepairOutcome::Absent,
            Ok(Some(Ok(()))) => {
                tracing::trace!(component = %self.repair_component, "Layout repair ran");
                RepairOutcome::Repaired
            }
            Ok(Some(Err(err))) => {
                tracing::warn!(
                    component = %self.repair_component,
                    error = %err,
                    "Layout repair hook failed"
                );
                RepairOutcome::Failed(format!("{err:#}"))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!(
                    component = %self.repair_component,
                    error = %message,
                    "Layout repair hook panicked"
                );
                RepairOutcome::Failed(message)
            }
        }
    }

    /// Start the background task.
    ///
    /// Runs until a shutdown signal is received on `shutdown_rx`.
    pub fn start(self: Arc<Self>, mut shutdown_rx: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut scan = tokio::time::interval(self.scan_interval);
            let mut repair = tokio::time::interval(self.repair_interval);

            // Skip first ticks (fire immediately)
            scan.tick().await;
            repair.tick().await;

            tracing::info!(
                scan_interval = ?self.scan_interval,
                repair_interval = ?self.repair_interval,
                repair_component = %self.repair_component,
                "Started health monitoring"
            );

            loop {
                tokio::select! {
                    _ = scan.tick() => {
                        let removed = self.scan_tick();
                        if removed > 0 {
                            tracing::info!(removed, "Health scan converged duplicate artifacts");
                        }
                    }

                    _ = repair.tick() => {
                        self.repair_tick().await;
                    }

                    _ = shutdown_rx.recv() => {
                        tracing::info!("Received shutdown signal, stopping health monitoring");
                        break;
                    }
                }
            }

            tracing::info!("Health monitoring stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Element;
    use crate::domain::ports::{Component, HostEnvironment};
    use crate::infrastructure::host::MemoryHost;
    use crate::services::orchestrator::{InitPlan, Orchestrator};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct Repairable {
        repairs: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Component for Repairable {
        async fn init(&self) -> anyhow::Result<()> {
            Ok(())
        }

        fn repair_layout(&self) -> Option<anyhow::Result<()>> {
            self.repairs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Some(Err(anyhow::anyhow!("sidebar detached")))
            } else {
                Some(Ok(()))
            }
        }
    }

    struct NoHook;

    #[async_trait::async_trait]
    impl Component for NoHook {
        async fn init(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn setup(config: &HealthConfig) -> (Arc<MemoryHost>, Arc<Registry>, Arc<HealthMonitor>) {
        let host = Arc::new(MemoryHost::new());
        let registry = Arc::new(Registry::new(host.clone()));
        let resolver = Arc::new(ConflictResolver::new(
            host.clone(),
            "muster-sidebar",
            Uuid::new_v4(),
        ));
        let monitor = Arc::new(HealthMonitor::new(registry.clone(), resolver, config));
        (host, registry, monitor)
    }

    async fn register_initialized(registry: &Arc<Registry>, instance: ComponentInstance) {
        registry.register("UI", instance).await.unwrap();
        Orchestrator::new(registry.clone(), InitPlan::default())
            .initialize_one("UI")
            .await;
        assert_eq!(registry.state("UI").await, ComponentState::Initialized);
    }

    #[tokio::test]
    async fn test_health_monitor_creation() {
        let (_, _, monitor) = setup(&HealthConfig::default());

        assert_eq!(monitor.scan_interval, Duration::from_secs(10));
        assert_eq!(monitor.repair_interval, Duration::from_secs(3));
        assert_eq!(monitor.repair_component, "UI");
    }

    #[tokio::test]
    async fn test_scan_tick_keeps_one() {
        let (host, _, monitor) = setup(&HealthConfig::default());
        for i in 0..3 {
            host.mount(Element::container(format!("muster-sidebar-{i}"), "ui"))
                .unwrap();
        }

        assert_eq!(monitor.scan_tick(), 2);
        assert_eq!(host.find_artifacts("muster-sidebar").len(), 1);
    }

    #[tokio::test]
    async fn test_repair_tick_absent_component() {
        let (_, registry, monitor) = setup(&HealthConfig::default());
        assert_eq!(monitor.repair_tick().await, RepairOutcome::Absent);

        register_initialized(&registry, ComponentInstance::active(NoHook)).await;
        assert_eq!(monitor.repair_tick().await, RepairOutcome::Absent);
    }

    #[tokio::test]
    async fn test_repair_tick_invokes_hook() {
        let (_, registry, monitor) = setup(&HealthConfig::default());
        let repairs = Arc::new(AtomicUsize::new(0));
        register_initialized(
            &registry,
            ComponentInstance::active(Repairable {
                repairs: repairs.clone(),
                fail: false,
            }),
        )
        .await;

        assert_eq!(monitor.repair_tick().await, RepairOutcome::Repaired);
        assert_eq!(repairs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repair_tick_reports_failure() {
        let (_, registry, monitor) = setup(&HealthConfig::default());
        register_initialized(
            &registry,
            ComponentInstance::active(Repairable {
                repairs: Arc::new(AtomicUsize::new(0)),
                fail: true,
            }),
        )
        .await;

        assert_eq!(
            monitor.repair_tick().await,
            RepairOutcome::Failed("sidebar detached".into())
        );
    }

    #[tokio::test]
    async fn test_repair_tick_skips_uninitialized_component() {
        let (_, registry, monitor) = setup(&HealthConfig::default());
        let repairs = Arc::new(AtomicUsize::new(0));
        registry
            .register(
                "UI",
                ComponentInstance::active(Repairable {
                    repairs: repairs.clone(),
                    fail: false,
                }),
            )
            .await
            .unwrap();

        assert_eq!(
            monitor.repair_tick().await,
            RepairOutcome::NotInitialized(ComponentState::Registered)
        );
        assert_eq!(repairs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_repair_tick_skips_failed_component() {
        struct BrokenInit(Arc<AtomicUsize>);

        #[async_trait::async_trait]
        impl Component for BrokenInit {
            async fn init(&self) -> anyhow::Result<()> {
                anyhow::bail!("container missing")
            }

            fn repair_layout(&self) -> Option<anyhow::Result<()>> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Some(Ok(()))
            }
        }

        let (_, registry, monitor) = setup(&HealthConfig::default());
        let repairs = Arc::new(AtomicUsize::new(0));
        registry
            .register("UI", ComponentInstance::active(BrokenInit(repairs.clone())))
            .await
            .unwrap();
        Orchestrator::new(registry.clone(), InitPlan::default())
            .initialize_one("UI")
            .await;

        assert_eq!(
            monitor.repair_tick().await,
            RepairOutcome::NotInitialized(ComponentState::Failed)
        );
        assert_eq!(repairs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_survives_failing_hook() {
        let config = HealthConfig {
            scan_interval_ms: 1_000,
            repair_interval_ms: 100,
            repair_component: "UI".into(),
        };
        let (host, registry, monitor) = setup(&config);
        let repairs = Arc::new(AtomicUsize::new(0));
        register_initialized(
            &registry,
            ComponentInstance::active(Repairable {
                repairs: repairs.clone(),
                fail: true,
            }),
        )
        .await;

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = monitor.start(shutdown_rx);

        host.mount(Element::container("muster-sidebar-a", "ui")).unwrap();
        host.mount(Element::container("muster-sidebar-b", "ui")).unwrap();

        tokio::time::sleep(Duration::from_millis(1_050)).await;

        assert!(repairs.load(Ordering::SeqCst) >= 5);
        assert_eq!(host.find_artifacts("muster-sidebar").len(), 1);

        shutdown_tx.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(2), handle).await;
        assert!(result.is_ok(), "Health monitor should shutdown gracefully");
    }
}
