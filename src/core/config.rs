use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// Monthly obligation charged at origination, as a fraction of the purchase
/// value. Matches the warehouse partner's standard pricing rule.
const DEFAULT_OBLIGATION_RATE: f64 = 0.005;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WarehouseProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub warehouse: Option<WarehouseProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            warehouse: Some(WarehouseProviderConfig {
                base_url: crate::providers::warehouse::DEFAULT_WAREHOUSE_URL.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Pricing rule applied once when an agreement is originated; existing
    /// ledgers keep the obligation they were created with.
    #[serde(default = "default_obligation_rate")]
    pub obligation_rate: f64,
    pub data_path: Option<String>,
}

fn default_obligation_rate() -> f64 {
    DEFAULT_OBLIGATION_RATE
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "stakehouse", "stakehouse")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "stakehouse", "stakehouse")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  warehouse:
    base_url: "http://example.com/warehouse"
obligation_rate: 0.004
data_path: "/tmp/stakehouse-data"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(
            config.providers.warehouse.unwrap().base_url,
            "http://example.com/warehouse"
        );
        assert_eq!(config.obligation_rate, 0.004);
        assert_eq!(config.data_path.as_deref(), Some("/tmp/stakehouse-data"));
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");

        assert_eq!(config.obligation_rate, 0.005);
        assert!(config.data_path.is_none());
        assert_eq!(
            config.providers.warehouse.unwrap().base_url,
            crate::providers::warehouse::DEFAULT_WAREHOUSE_URL
        );
    }

    #[test]
    fn test_data_path_override_wins() {
        let config: AppConfig = serde_yaml::from_str("data_path: \"/var/lib/stakehouse\"").unwrap();
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/var/lib/stakehouse")
        );
    }
}
