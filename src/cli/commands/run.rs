//! Implementation of the `muster run` command.
//!
//! Simulates one page load: stale sidebars from an earlier load, feature
//! components arriving on their own schedule, and the runtime settling into
//! either a started sidebar or the fallback panel.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::info;

use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::cli::simulation::{instance_for, Arrival, SidebarMount};
use crate::domain::models::{ComponentDescriptor, ComponentState, Config, Element};
use crate::domain::ports::{HostEnvironment, KeyValueStore};
use crate::infrastructure::host::MemoryHost;
use crate::infrastructure::notifier::{MemoryNotifier, Notification};
use crate::infrastructure::store::{JsonFileStore, MemoryStore};
use crate::services::{Muster, WatchdogState};

const QUIESCENCE_POLL: Duration = Duration::from_millis(10);

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Component arrival as NAME[:DELAY_MS]; defaults to every declared name at 0 ms
    #[arg(short, long, value_name = "NAME[:DELAY_MS]")]
    pub arrive: Vec<Arrival>,

    /// Components whose init fails
    #[arg(short, long, value_name = "NAME")]
    pub fail: Vec<String>,

    /// Components registered as plain data without an initializer
    #[arg(short, long, value_name = "NAME")]
    pub passive: Vec<String>,

    /// Sidebar artifacts left over from a previous load
    #[arg(long, default_value = "0")]
    pub stale: usize,

    /// Keep the runtime alive after settling so the health monitor can run
    #[arg(long, default_value = "0")]
    pub linger_ms: u64,

    /// Use an in-memory store instead of the configured JSON file
    #[arg(long)]
    pub ephemeral: bool,
}

#[derive(Debug, Serialize)]
pub struct ComponentRow {
    pub name: String,
    pub kind: &'static str,
    pub state: ComponentState,
    pub generation: u64,
    pub failure: Option<String>,
}

impl From<&ComponentDescriptor> for ComponentRow {
    fn from(descriptor: &ComponentDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            kind: if descriptor.instance.has_initializer() {
                "active"
            } else {
                "passive"
            },
            state: descriptor.state,
            generation: descriptor.generation,
            failure: descriptor.failure.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NotificationRow {
    pub title: String,
    pub message: String,
    pub level: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub runtime_id: String,
    pub state: WatchdogState,
    pub attempts: u32,
    pub stale_removed: usize,
    pub components: Vec<ComponentRow>,
    pub artifacts: Vec<String>,
    pub fallback_built: bool,
    pub notifications: Vec<NotificationRow>,
    #[serde(skip)]
    descriptors: Vec<ComponentDescriptor>,
    #[serde(skip)]
    shown: Vec<Notification>,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let formatter = TableFormatter::new();
        let state = match self.state {
            WatchdogState::Ready => style(self.state.as_str()).green().bold(),
            WatchdogState::TimedOut => style(self.state.as_str()).yellow().bold(),
            WatchdogState::Waiting => style(self.state.as_str()).dim(),
        };

        let mut lines = vec![
            format!("Runtime {} settled: {state} after {} check(s)", self.runtime_id, self.attempts),
            format!("Stale sidebar artifacts removed: {}", self.stale_removed),
        ];
        if self.fallback_built {
            lines.push(style("Fallback panel is active").yellow().to_string());
        }

        if self.descriptors.is_empty() {
            lines.push("\nNo components registered.".to_string());
        } else {
            lines.push(String::new());
            lines.push(formatter.format_components(&self.descriptors));
        }

        lines.push(format!("\nHost artifacts ({}):", self.artifacts.len()));
        for artifact in &self.artifacts {
            lines.push(format!("  - {artifact}"));
        }

        if !self.shown.is_empty() {
            lines.push(String::new());
            lines.push(formatter.format_notifications(&self.shown));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: RunArgs, config: &Config, json_mode: bool) -> Result<()> {
    let host = Arc::new(MemoryHost::new());
    let notifier = Arc::new(MemoryNotifier::new());
    let store: Arc<dyn KeyValueStore> = if args.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(JsonFileStore::open(&config.storage.path).with_context(|| {
            format!("Failed to open store at {}", config.storage.path)
        })?)
    };

    let ui_prefix = &config.artifacts.ui_prefix;
    for index in 0..args.stale {
        host.mount(Element::container(
            format!("{ui_prefix}-stale-{index}"),
            "Sidebar from a previous load",
        ))
        .context("Failed to mount stale sidebar artifact")?;
    }

    let muster = Arc::new(Muster::new(config, host.clone(), store, notifier.clone()));
    let report = muster.start().await;
    let stale_removed = report.map_or(0, |report| report.removed.len());

    let arrivals = if args.arrive.is_empty() {
        config
            .orchestration
            .init_order
            .iter()
            .map(|name| Arrival {
                name: name.clone(),
                delay_ms: 0,
            })
            .collect()
    } else {
        args.arrive.clone()
    };

    let mut loaders = JoinSet::new();
    for arrival in arrivals {
        let sidebar = (arrival.name == config.orchestration.ui_component).then(|| SidebarMount {
            host: host.clone() as Arc<dyn HostEnvironment>,
            ui_prefix: ui_prefix.clone(),
        });
        let instance = instance_for(
            &arrival.name,
            args.passive.contains(&arrival.name),
            args.fail.contains(&arrival.name),
            sidebar,
        );
        let muster = Arc::clone(&muster);
        loaders.spawn(async move {
            tokio::time::sleep(arrival.delay()).await;
            muster
                .register(arrival.name.clone(), instance)
                .await
                .with_context(|| format!("Failed to register {}", arrival.name))
        });
    }

    let state = muster.wait_until_settled().await;
    while let Some(joined) = loaders.join_next().await {
        joined.context("Component loader task panicked")??;
    }

    if state == WatchdogState::Ready {
        let limit = Duration::from_millis(config.orchestration.init_timeout_ms) + QUIESCENCE_POLL;
        wait_for_quiescence(&muster, limit).await;
    }
    if args.linger_ms > 0 {
        info!(linger_ms = args.linger_ms, "Lingering for health monitor");
        tokio::time::sleep(Duration::from_millis(args.linger_ms)).await;
    }
    muster.shutdown();

    let descriptors = muster.registry().snapshot().await;
    let shown = notifier.notifications();
    let output_data = RunOutput {
        runtime_id: muster.id().to_string(),
        state,
        attempts: muster.watchdog().attempts(),
        stale_removed,
        components: descriptors.iter().map(ComponentRow::from).collect(),
        artifacts: host.artifact_ids(),
        fallback_built: muster.fallback().is_built(),
        notifications: shown
            .iter()
            .map(|n| NotificationRow {
                title: n.title.clone(),
                message: n.message.clone(),
                level: n.level.as_str(),
            })
            .collect(),
        descriptors,
        shown,
    };
    output(&output_data, json_mode);
    Ok(())
}

/// Wait for late registrations to leave `Registered`/`Initializing`.
async fn wait_for_quiescence(muster: &Muster, limit: Duration) {
    let settled = tokio::time::timeout(limit, async {
        loop {
            let busy = muster
                .registry()
                .snapshot()
                .await
                .iter()
                .any(|descriptor| !descriptor.state.is_terminal());
            if !busy {
                break;
            }
            tokio::time::sleep(QUIESCENCE_POLL).await;
        }
    })
    .await;

    if settled.is_err() {
        info!("Some components were still starting when the run ended");
    }
}
