use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Foundational component names cannot be empty")]
    EmptyFoundationalName,

    #[error("Foundational components must be distinct, got {0} twice")]
    DuplicateFoundationalName(String),

    #[error("Invalid poll_interval_ms: {0}. Must be at least 1")]
    InvalidPollInterval(u64),

    #[error("Invalid max_attempts: {0}. Must be between 1 and 1000")]
    InvalidMaxAttempts(u32),

    #[error("Invalid init_timeout_ms: {0}. Must be at least 1")]
    InvalidInitTimeout(u64),

    #[error("Invalid health interval: {0}. Must be at least 1")]
    InvalidHealthInterval(u64),

    #[error("Artifact ui_prefix cannot be empty")]
    EmptyUiPrefix,

    #[error("Fallback panel id {panel_id:?} would be matched by ui_prefix {ui_prefix:?}")]
    FallbackMatchesUiPrefix { panel_id: String, ui_prefix: String },

    #[error("Fallback panel id and store keys cannot be empty")]
    EmptyFallbackField,

    #[error("Fallback toggle_key and notes_key must differ, got {0}")]
    DuplicateFallbackKey(String),

    #[error("Storage path cannot be empty")]
    EmptyStoragePath,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .muster/config.yaml (project config)
    /// 3. .muster/local.yaml (local overrides, optional)
    /// 4. Environment variables (MUSTER_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".muster/config.yaml"))
            .merge(Yaml::file(".muster/local.yaml"))
            .merge(Env::prefixed("MUSTER_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Environment variables still override file values.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("MUSTER_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let orchestration = &config.orchestration;
        if orchestration.core_component.trim().is_empty()
            || orchestration.ui_component.trim().is_empty()
        {
            return Err(ConfigError::EmptyFoundationalName);
        }
        if orchestration.core_component == orchestration.ui_component {
            return Err(ConfigError::DuplicateFoundationalName(
                orchestration.core_component.clone(),
            ));
        }
        if orchestration.init_timeout_ms == 0 {
            return Err(ConfigError::InvalidInitTimeout(0));
        }

        // Validate watchdog config
        if config.watchdog.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidPollInterval(0));
        }
        if config.watchdog.max_attempts == 0 || config.watchdog.max_attempts > 1000 {
            return Err(ConfigError::InvalidMaxAttempts(config.watchdog.max_attempts));
        }

        // Validate health config
        for interval in [config.health.scan_interval_ms, config.health.repair_interval_ms] {
            if interval == 0 {
                return Err(ConfigError::InvalidHealthInterval(interval));
            }
        }

        // Validate artifact naming
        let ui_prefix = &config.artifacts.ui_prefix;
        if ui_prefix.is_empty() {
            return Err(ConfigError::EmptyUiPrefix);
        }
        let fallback = &config.fallback;
        if fallback.panel_id.is_empty()
            || fallback.toggle_key.is_empty()
            || fallback.notes_key.is_empty()
        {
            return Err(ConfigError::EmptyFallbackField);
        }
        if fallback.panel_id.starts_with(ui_prefix.as_str()) {
            return Err(ConfigError::FallbackMatchesUiPrefix {
                panel_id: fallback.panel_id.clone(),
                ui_prefix: ui_prefix.clone(),
            });
        }
        if fallback.toggle_key == fallback.notes_key {
            return Err(ConfigError::DuplicateFallbackKey(fallback.toggle_key.clone()));
        }

        if config.storage.path.is_empty() {
            return Err(ConfigError::EmptyStoragePath);
        }

        // Validate logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if !["daily", "hourly", "never"].contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(config.logging.rotation.clone()));
        }

        Ok(())
    }
}
