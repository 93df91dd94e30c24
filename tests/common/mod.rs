//! Common test utilities for integration tests
//!
//! Provides shared fixtures, helpers, and stand-in components used across
//! multiple integration test files.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use muster::{
    Component, ComponentInstance, ComponentState, Config, MemoryHost, MemoryNotifier, MemoryStore,
    Muster,
};

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Counts how many times `init` ran.
pub struct Counting(pub Arc<AtomicUsize>);

impl Counting {
    pub fn instance() -> (ComponentInstance, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (ComponentInstance::active(Self(Arc::clone(&calls))), calls)
    }
}

#[async_trait]
impl Component for Counting {
    async fn init(&self) -> anyhow::Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Fails every init with an error.
pub struct Failing;

#[async_trait]
impl Component for Failing {
    async fn init(&self) -> anyhow::Result<()> {
        anyhow::bail!("widget could not find its container")
    }
}

/// Panics inside init.
pub struct Panicking;

#[async_trait]
impl Component for Panicking {
    async fn init(&self) -> anyhow::Result<()> {
        panic!("layout node missing")
    }
}

/// A runtime wired to in-memory adapters.
pub struct Harness {
    pub muster: Muster,
    pub host: Arc<MemoryHost>,
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<MemoryNotifier>,
    pub config: Config,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let host = Arc::new(MemoryHost::new());
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(MemoryNotifier::new());
        let muster = Muster::new(&config, host.clone(), store.clone(), notifier.clone());
        Self {
            muster,
            host,
            store,
            notifier,
            config,
        }
    }

    pub async fn state_of(&self, name: &str) -> ComponentState {
        self.muster.registry().state(name).await
    }

    /// Poll until `name` reaches `state`; false if it never does.
    pub async fn wait_for_state(&self, name: &str, state: ComponentState) -> bool {
        for _ in 0..200 {
            if self.state_of(name).await == state {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

/// Default config with a small declared order used by the scenarios.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.orchestration.init_order = ["Core", "UI", "Widget", "Other", "Links"]
        .into_iter()
        .map(String::from)
        .collect();
    config
}
