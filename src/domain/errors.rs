//! Domain errors for the Muster orchestration runtime.

use thiserror::Error;

/// Why a single component failed to initialize.
///
/// These never escape the orchestrator: they are recorded on the
/// component's descriptor and logged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComponentError {
    #[error("init failed: {0}")]
    InitFailed(String),

    #[error("init panicked: {0}")]
    Panicked(String),

    #[error("init did not complete within {timeout_ms}ms")]
    TimedOut { timeout_ms: u64 },

    #[error("no initializer")]
    NoInitializer,
}

/// Errors returned by the component registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("component name cannot be empty")]
    EmptyName,
}

/// Errors raised by host environment operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("element id already mounted: {0}")]
    DuplicateElement(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("element {id} does not accept {value} input")]
    InputMismatch { id: String, value: &'static str },
}

/// Errors raised by key/value store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;
