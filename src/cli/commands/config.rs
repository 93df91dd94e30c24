//! Implementation of the `muster config show` command.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    #[serde(flatten)]
    pub config: Config,
    #[serde(skip)]
    yaml: String,
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        self.yaml.trim_end().to_string()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or_default()
    }
}

pub fn show(config: &Config, json_mode: bool) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to render configuration as YAML")?;
    let output_data = ConfigOutput {
        config: config.clone(),
        yaml,
    };
    output(&output_data, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_rendering_round_trips_defaults() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        assert!(yaml.contains("core_component: Core"));

        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.watchdog.max_attempts, 75);
        assert_eq!(parsed.fallback.panel_id, "muster-fallback-panel");
    }

    #[test]
    fn test_json_output_is_plain_config() {
        let config = Config::default();
        let output = ConfigOutput {
            yaml: String::new(),
            config,
        };
        assert_eq!(output.to_json()["artifacts"]["ui_prefix"], "muster-sidebar");
    }
}
