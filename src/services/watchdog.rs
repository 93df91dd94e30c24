//! Arrival watchdog.
//!
//! Polls for the foundational pair with a bounded number of attempts.
//! Either component counts as present when it is in the registry or bound
//! directly into the host's exposure point.
//!
//! ```text
//! Waiting --both present--> Ready     (merge, settle, initialize_all, health monitor)
//! Waiting --budget spent--> TimedOut  (notify, fallback panel, late init)
//! ```
//!
//! Both outcomes are terminal. Once terminal, further checks are no-ops.
//! Components registered after either outcome go through the late-init path.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::models::WatchdogConfig;
use crate::domain::ports::{HostEnvironment, NotificationLevel, Notifier};
use crate::services::fallback_builder::FallbackBuilder;
use crate::services::health_monitor::HealthMonitor;
use crate::services::orchestrator::Orchestrator;
use crate::services::registry::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchdogState {
    Waiting,
    Ready,
    TimedOut,
}

impl WatchdogState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Ready => "ready",
            Self::TimedOut => "timed_out",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Waiting)
    }
}

impl fmt::Display for WatchdogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collaborators the watchdog hands control to.
pub struct WatchdogDeps {
    pub registry: Arc<Registry>,
    pub host: Arc<dyn HostEnvironment>,
    pub orchestrator: Orchestrator,
    pub fallback: Arc<FallbackBuilder>,
    pub health: Arc<HealthMonitor>,
    pub notifier: Arc<dyn Notifier>,
    pub shutdown: broadcast::Sender<()>,
}

pub struct Watchdog {
    deps: WatchdogDeps,
    poll_interval: Duration,
    max_attempts: u32,
    settle_delay: Duration,
    attempts: AtomicU32,
    state: watch::Sender<WatchdogState>,
    settled: watch::Sender<bool>,
}

impl Watchdog {
    pub fn new(deps: WatchdogDeps, config: &WatchdogConfig) -> Self {
        let (state, _) = watch::channel(WatchdogState::Waiting);
        let (settled, _) = watch::channel(false);
        Self {
            deps,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_attempts: config.max_attempts,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            attempts: AtomicU32::new(0),
            state,
            settled,
        }
    }

    pub fn state(&self) -> WatchdogState {
        *self.state.borrow()
    }

    /// Number of presence checks performed so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> watch::Receiver<WatchdogState> {
        self.state.subscribe()
    }

    /// Flips to `true` once orchestration finished or the fallback was built.
    pub fn settled(&self) -> watch::Receiver<bool> {
        self.settled.subscribe()
    }

    /// Run one poll step, including the effects of any transition it causes.
    ///
    /// After a terminal state is reached this returns immediately.
    pub async fn check(&self) -> WatchdogState {
        let current = self.state();
        if current.is_terminal() {
            return current;
        }

        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let [core, ui] = self.deps.orchestrator.plan().foundational();
        let core_present = self.is_present(core).await;
        let ui_present = self.is_present(ui).await;

        if core_present && ui_present {
            if self.transition(WatchdogState::Ready) {
                info!(attempt, "Foundational components present");
                self.on_ready().await;
            }
        } else if attempt >= self.max_attempts {
            if self.transition(WatchdogState::TimedOut) {
                self.on_timeout(core_present, ui_present);
            }
        } else {
            debug!(attempt, core_present, ui_present, "Waiting for foundational components");
        }

        self.state()
    }

    /// Poll until a terminal state is reached.
    pub async fn run(&self) -> WatchdogState {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let state = self.check().await;
            if state.is_terminal() {
                return state;
            }
        }
    }

    pub fn spawn(self: Arc<Self>) -> JoinHandle<WatchdogState> {
        tokio::spawn(async move { self.run().await })
    }

    async fn is_present(&self, name: &str) -> bool {
        self.deps.registry.contains(name).await || self.deps.host.exposure().contains(name)
    }

    fn transition(&self, to: WatchdogState) -> bool {
        self.state.send_if_modified(|state| {
            if *state == WatchdogState::Waiting {
                *state = to;
                true
            } else {
                false
            }
        })
    }

    #[instrument(skip(self))]
    async fn on_ready(&self) {
        self.merge_exposed().await;
        tokio::time::sleep(self.settle_delay).await;
        // Entries bound directly during the settle window.
        self.merge_exposed().await;

        self.deps.orchestrator.initialize_all().await;

        Arc::clone(&self.deps.health).start(self.deps.shutdown.subscribe());
        self.settled.send_replace(true);
    }

    fn on_timeout(&self, core_present: bool, ui_present: bool) {
        warn!(
            attempts = self.attempts(),
            core_present,
            ui_present,
            "Foundational components did not arrive; switching to fallback"
        );
        self.deps.notifier.show(
            "Sidebar",
            "Sidebar components did not load in time.",
            NotificationLevel::Warning,
            Some(Duration::from_secs(8)),
        );

        match self.deps.fallback.build_once() {
            Ok(true) => {}
            Ok(false) => debug!("Fallback already built"),
            Err(err) => error!(error = %err, "Failed to build fallback panel"),
        }
        // Registrations from here on are still started individually.
        if self.deps.orchestrator.enable_late_init() {
            info!("Late initialization enabled in fallback mode");
        }
        self.settled.send_replace(true);
    }

    /// Register components found only in the exposure point.
    async fn merge_exposed(&self) {
        for (name, instance) in self.deps.host.exposure().entries {
            if self.deps.registry.contains(&name).await {
                continue;
            }
            match self.deps.registry.register(name.clone(), instance).await {
                Ok(_) => debug!(component = %name, "Merged component from exposure point"),
                Err(err) => warn!(component = %name, error = %err, "Could not merge exposed component"),
            }
        }
    }
}
