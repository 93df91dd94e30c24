use serde::{Deserialize, Serialize};

/// Main configuration structure for Muster
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Component ordering and init policy
    #[serde(default)]
    pub orchestration: OrchestrationConfig,

    /// Arrival watchdog timing
    #[serde(default)]
    pub watchdog: WatchdogConfig,

    /// Health monitor timing and repair hook target
    #[serde(default)]
    pub health: HealthConfig,

    /// Host artifact naming conventions
    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    /// Degraded fallback panel
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// Key/value store location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Orchestration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OrchestrationConfig {
    /// Name of the core foundational component
    #[serde(default = "default_core_component")]
    pub core_component: String,

    /// Name of the UI foundational component
    #[serde(default = "default_ui_component")]
    pub ui_component: String,

    /// Declared initialization order for the global pass
    #[serde(default = "default_init_order")]
    pub init_order: Vec<String>,

    /// Upper bound for a single component's `init()`
    #[serde(default = "default_init_timeout_ms")]
    pub init_timeout_ms: u64,
}

fn default_core_component() -> String {
    "Core".to_string()
}

fn default_ui_component() -> String {
    "UI".to_string()
}

fn default_init_order() -> Vec<String> {
    [
        "Core", "UI", "Storage", "Notepad", "Todo", "Links", "Timers", "Trackers", "Travel",
        "Clock",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

const fn default_init_timeout_ms() -> u64 {
    5_000
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            core_component: default_core_component(),
            ui_component: default_ui_component(),
            init_order: default_init_order(),
            init_timeout_ms: default_init_timeout_ms(),
        }
    }
}

/// Arrival watchdog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WatchdogConfig {
    /// Delay between presence checks
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Number of checks before giving up and building the fallback
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause between detecting the foundational pair and initializing
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

const fn default_poll_interval_ms() -> u64 {
    200
}

const fn default_max_attempts() -> u32 {
    75
}

const fn default_settle_delay_ms() -> u64 {
    500
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_attempts: default_max_attempts(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

/// Health monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthConfig {
    /// Period of the duplicate-artifact scan
    #[serde(default = "default_scan_interval_ms")]
    pub scan_interval_ms: u64,

    /// Period of the self-healing hook invocation
    #[serde(default = "default_repair_interval_ms")]
    pub repair_interval_ms: u64,

    /// Component whose `repair_layout` hook is invoked
    #[serde(default = "default_repair_component")]
    pub repair_component: String,
}

const fn default_scan_interval_ms() -> u64 {
    10_000
}

const fn default_repair_interval_ms() -> u64 {
    3_000
}

fn default_repair_component() -> String {
    "UI".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            scan_interval_ms: default_scan_interval_ms(),
            repair_interval_ms: default_repair_interval_ms(),
            repair_component: default_repair_component(),
        }
    }
}

/// Host artifact naming
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ArtifactsConfig {
    /// Id prefix identifying authoritative sidebar UI artifacts
    #[serde(default = "default_ui_prefix")]
    pub ui_prefix: String,
}

fn default_ui_prefix() -> String {
    "muster-sidebar".to_string()
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            ui_prefix: default_ui_prefix(),
        }
    }
}

/// Fallback panel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FallbackConfig {
    /// Element id of the fallback panel root
    #[serde(default = "default_panel_id")]
    pub panel_id: String,

    /// Store key of the persisted toggle
    #[serde(default = "default_toggle_key")]
    pub toggle_key: String,

    /// Store key of the persisted free-text field
    #[serde(default = "default_notes_key")]
    pub notes_key: String,
}

fn default_panel_id() -> String {
    "muster-fallback-panel".to_string()
}

fn default_toggle_key() -> String {
    "fallback.enabled".to_string()
}

fn default_notes_key() -> String {
    "fallback.notes".to_string()
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            panel_id: default_panel_id(),
            toggle_key: default_toggle_key(),
            notes_key: default_notes_key(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StorageConfig {
    /// Path of the JSON key/value document
    #[serde(default = "default_storage_path")]
    pub path: String,
}

fn default_storage_path() -> String {
    ".muster/store.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling JSON log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_log_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_log_rotation(),
        }
    }
}
