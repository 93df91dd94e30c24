//! Orchestration services.
//!
//! Leaves first: registry, orchestrator, conflict resolver, fallback
//! builder, health monitor, watchdog, and the [`Muster`] facade that wires
//! them in startup order.

pub mod conflict_resolver;
pub mod fallback_builder;
pub mod health_monitor;
pub mod orchestrator;
pub mod registry;
pub mod runtime;
pub mod watchdog;

pub use conflict_resolver::{ConflictReport, ConflictResolver};
pub use fallback_builder::FallbackBuilder;
pub use health_monitor::{HealthMonitor, RepairOutcome};
pub use orchestrator::{InitOutcome, InitPlan, InitReport, Orchestrator, SkipReason};
pub use registry::{RegisterOutcome, Registration, Registry};
pub use runtime::Muster;
pub use watchdog::{Watchdog, WatchdogDeps, WatchdogState};
