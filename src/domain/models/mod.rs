pub mod component;
pub mod config;
pub mod element;
pub mod exposure;

pub use component::{ComponentDescriptor, ComponentInstance, ComponentState};
pub use config::{
    ArtifactsConfig, Config, FallbackConfig, HealthConfig, LoggingConfig, OrchestrationConfig,
    StorageConfig, WatchdogConfig,
};
pub use element::{ChangeListener, ControlValue, Element, ElementKind};
pub use exposure::ExposureSnapshot;
