//! Simulated components for the `run` command.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::{ComponentInstance, Element};
use crate::domain::ports::{Component, HostEnvironment};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ArrivalParseError {
    #[error("Component name cannot be empty")]
    EmptyName,

    #[error("Invalid arrival delay {0:?}; expected milliseconds")]
    InvalidDelay(String),
}

/// `NAME[:DELAY_MS]`: when a component registers, relative to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrival {
    pub name: String,
    pub delay_ms: u64,
}

impl Arrival {
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl FromStr for Arrival {
    type Err = ArrivalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, delay_ms) = match s.rsplit_once(':') {
            Some((name, delay)) => {
                let delay_ms = delay
                    .trim()
                    .parse()
                    .map_err(|_| ArrivalParseError::InvalidDelay(delay.to_string()))?;
                (name, delay_ms)
            }
            None => (s, 0),
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(ArrivalParseError::EmptyName);
        }
        Ok(Self {
            name: name.to_string(),
            delay_ms,
        })
    }
}

/// Where a simulated UI component mounts its sidebar.
#[derive(Clone)]
pub struct SidebarMount {
    pub host: Arc<dyn HostEnvironment>,
    pub ui_prefix: String,
}

/// A stand-in feature component.
///
/// Fails on init when told to. When given a [`SidebarMount`] it behaves
/// like the UI component: mounts a sidebar artifact on init and offers the
/// layout repair hook.
pub struct SimulatedComponent {
    name: String,
    fail: bool,
    sidebar: Option<SidebarMount>,
}

impl SimulatedComponent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fail: false,
            sidebar: None,
        }
    }

    #[must_use]
    pub const fn failing(mut self, fail: bool) -> Self {
        self.fail = fail;
        self
    }

    #[must_use]
    pub fn with_sidebar(mut self, sidebar: SidebarMount) -> Self {
        self.sidebar = Some(sidebar);
        self
    }
}

#[async_trait]
impl Component for SimulatedComponent {
    async fn init(&self) -> anyhow::Result<()> {
        tokio::task::yield_now().await;
        if self.fail {
            anyhow::bail!("{} failed to start", self.name);
        }

        if let Some(sidebar) = &self.sidebar {
            let id = format!("{}-{}", sidebar.ui_prefix, Uuid::new_v4());
            sidebar.host.mount(
                Element::container(id.clone(), self.name.clone())
                    .with_child(Element::label(format!("{id}-title"), "Sidebar")),
            )?;
        }
        Ok(())
    }

    fn repair_layout(&self) -> Option<anyhow::Result<()>> {
        let sidebar = self.sidebar.as_ref()?;
        if sidebar.host.find_artifacts(&sidebar.ui_prefix).is_empty() {
            Some(Err(anyhow!("no sidebar artifact mounted")))
        } else {
            Some(Ok(()))
        }
    }
}

/// Build the instance a simulated loader registers under `name`.
pub fn instance_for(
    name: &str,
    passive: bool,
    fail: bool,
    sidebar: Option<SidebarMount>,
) -> ComponentInstance {
    if passive {
        return ComponentInstance::passive(json!({ "name": name }));
    }

    let mut component = SimulatedComponent::new(name).failing(fail);
    if let Some(sidebar) = sidebar {
        component = component.with_sidebar(sidebar);
    }
    ComponentInstance::active(component)
}
