//! Initialization orchestrator.
//!
//! Starts registered components in the declared dependency order with
//! per-component failure isolation: an error, a panic or a timeout in one
//! component's `init()` is recorded on that component and the pass moves on.

use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::ComponentError;
use crate::domain::models::{ComponentInstance, ComponentState, OrchestrationConfig};
use crate::services::registry::Registry;

/// Declared initialization order.
#[derive(Debug, Clone)]
pub struct InitPlan {
    pub core: String,
    pub ui: String,
    pub order: Vec<String>,
    pub init_timeout: Duration,
}

impl InitPlan {
    pub fn from_config(config: &OrchestrationConfig) -> Self {
        Self {
            core: config.core_component.clone(),
            ui: config.ui_component.clone(),
            order: config.init_order.clone(),
            init_timeout: Duration::from_millis(config.init_timeout_ms),
        }
    }

    /// The foundational pair, core first.
    pub fn foundational(&self) -> [&str; 2] {
        [self.core.as_str(), self.ui.as_str()]
    }

    /// Names in the order the global pass visits them: the foundational pair
    /// first regardless of where the declared order lists it, then the rest
    /// of the declared order without duplicates.
    pub fn sequence(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.foundational()
            .into_iter()
            .chain(self.order.iter().map(String::as_str))
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

impl Default for InitPlan {
    fn default() -> Self {
        Self::from_config(&OrchestrationConfig::default())
    }
}

/// Why `initialize_one` did not start a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotRegistered,
    InFlight,
    AlreadyInitialized,
    AlreadyFailed,
}

impl From<ComponentState> for SkipReason {
    fn from(state: ComponentState) -> Self {
        match state {
            ComponentState::Unregistered => Self::NotRegistered,
            ComponentState::Initializing | ComponentState::Registered => Self::InFlight,
            ComponentState::Initialized => Self::AlreadyInitialized,
            ComponentState::Failed => Self::AlreadyFailed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Initialized,
    Failed(ComponentError),
    Skipped(SkipReason),
    /// The name was re-registered while `init()` ran; the outcome was dropped.
    Superseded,
}

/// Per-component outcomes of a global pass, in visit order.
#[derive(Debug, Clone, Default)]
pub struct InitReport {
    pub outcomes: Vec<(String, InitOutcome)>,
}

impl InitReport {
    fn record(&mut self, name: &str, outcome: InitOutcome) {
        self.outcomes.push((name.to_string(), outcome));
    }

    pub fn outcome(&self, name: &str) -> Option<&InitOutcome> {
        self.outcomes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, outcome)| outcome)
    }

    pub fn initialized(&self) -> Vec<&str> {
        self.filter(|o| matches!(o, InitOutcome::Initialized))
    }

    pub fn failed(&self) -> Vec<&str> {
        self.filter(|o| matches!(o, InitOutcome::Failed(_)))
    }

    fn filter(&self, predicate: impl Fn(&InitOutcome) -> bool) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| predicate(outcome))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Drives component state transitions.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    registry: Arc<Registry>,
    plan: Arc<InitPlan>,
}

impl Orchestrator {
    pub fn new(registry: Arc<Registry>, plan: InitPlan) -> Self {
        Self {
            registry,
            plan: Arc::new(plan),
        }
    }

    pub fn plan(&self) -> &InitPlan {
        &self.plan
    }

    /// Run the global init pass.
    ///
    /// Visits [`InitPlan::sequence`] strictly sequentially; names that are not
    /// registered are skipped. Afterwards, later registrations are initialized
    /// individually, and declared names that arrived while the pass was
    /// already past their slot are picked up by a catch-up sweep.
    #[instrument(skip(self))]
    pub async fn initialize_all(&self) -> InitReport {
        let mut report = InitReport::default();
        let sequence = self.plan.sequence();

        for name in &sequence {
            if !self.registry.contains(name).await {
                debug!(component = %name, "Not registered, skipping");
                continue;
            }
            let outcome = self.initialize_one(name).await;
            report.record(name, outcome);
        }

        for name in self.plan.foundational() {
            if let Some(InitOutcome::Failed(err)) = report.outcome(name) {
                warn!(
                    component = %name,
                    error = %err,
                    "Foundational component failed; dependents were started anyway"
                );
            }
        }

        if !self.enable_late_init() {
            debug!("Late init already enabled");
        }

        for name in &sequence {
            if self.registry.state(name).await == ComponentState::Registered {
                debug!(component = %name, "Registered during global pass, catching up");
                let outcome = self.initialize_one(name).await;
                report.record(name, outcome);
            }
        }

        info!(
            initialized = report.initialized().len(),
            failed = report.failed().len(),
            "Global initialization pass complete"
        );
        report
    }

    /// Start a single component if it is still `Registered`.
    ///
    /// Never re-runs `init()`: a component that is initializing, initialized
    /// or failed is skipped.
    #[instrument(skip(self))]
    pub async fn initialize_one(&self, name: &str) -> InitOutcome {
        let (instance, generation) = match self.registry.begin_init(name).await {
            Ok(started) => started,
            Err(state) => {
                debug!(component = %name, state = %state, "Init skipped");
                return InitOutcome::Skipped(SkipReason::from(state));
            }
        };

        let started = Instant::now();
        let result = self.run_isolated(&instance).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &result {
            Ok(()) => info!(component = %name, elapsed_ms, "Component initialized"),
            Err(err) => warn!(component = %name, error = %err, elapsed_ms, "Component failed to initialize"),
        }

        if !self.registry.finish_init(name, generation, &result).await {
            return InitOutcome::Superseded;
        }
        match result {
            Ok(()) => InitOutcome::Initialized,
            Err(err) => InitOutcome::Failed(err),
        }
    }

    /// The isolation boundary around a component's `init()`.
    async fn run_isolated(&self, instance: &ComponentInstance) -> Result<(), ComponentError> {
        let Some(component) = instance.as_component() else {
            return Err(ComponentError::NoInitializer);
        };
        let component = Arc::clone(component);
        let guarded = AssertUnwindSafe(async move { component.init().await }).catch_unwind();

        match tokio::time::timeout(self.plan.init_timeout, guarded).await {
            Err(_) => Err(ComponentError::TimedOut {
                timeout_ms: u64::try_from(self.plan.init_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
            Ok(Err(payload)) => Err(ComponentError::Panicked(panic_message(payload.as_ref()))),
            Ok(Ok(Err(err))) => Err(ComponentError::InitFailed(format!("{err:#}"))),
            Ok(Ok(Ok(()))) => Ok(()),
        }
    }

    /// Start the late-init drain task unless it is already running.
    ///
    /// Queued names are initialized one at a time, in arrival order.
    /// Called after the global pass, and by the watchdog on timeout so late
    /// arrivals are still started in fallback mode.
    pub(crate) fn enable_late_init(&self) -> bool {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        if !self.registry.enable_late_init(tx) {
            return false;
        }

        let orchestrator = self.clone();
        tokio::spawn(async move {
            while let Some(name) = rx.recv().await {
                let outcome = orchestrator.initialize_one(&name).await;
                debug!(component = %name, outcome = ?outcome, "Late registration handled");
            }
        });
        true
    }
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
