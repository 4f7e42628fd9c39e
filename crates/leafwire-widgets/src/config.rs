//! Catalog configuration, loaded from RON.
//!
//! ```text
//! (
//!     model_module: "jupyter-leaflet",
//!     model_module_version: "^0.11.0",
//! )
//! ```
//!
//! Missing fields fall back to the defaults in [`constants`](crate::constants).

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::constants::{DEFAULT_COMM_TARGET, DEFAULT_MODULE, DEFAULT_MODULE_VERSION};

/// Error type for config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("RON serialize error: {0}")]
    Serialize(#[from] ron::Error),
}

/// Module coordinates published in every widget's base fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub model_module: String,
    pub model_module_version: String,
    pub view_module: String,
    pub view_module_version: String,
    /// Target name sent with every comm `open`.
    pub comm_target: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            model_module: DEFAULT_MODULE.to_string(),
            model_module_version: DEFAULT_MODULE_VERSION.to_string(),
            view_module: DEFAULT_MODULE.to_string(),
            view_module_version: DEFAULT_MODULE_VERSION.to_string(),
            comm_target: DEFAULT_COMM_TARGET.to_string(),
        }
    }
}

impl WidgetConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Read a RON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_ron_str(&text)?;
        debug!(path = %path.display(), module = %config.model_module, "loaded widget config");
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(WidgetConfig::from_ron_str("()").unwrap(), WidgetConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = WidgetConfig::from_ron_str(r#"(view_module_version: "~0.12")"#).unwrap();
        assert_eq!(config.view_module_version, "~0.12");
        assert_eq!(config.model_module_version, DEFAULT_MODULE_VERSION);
        assert_eq!(config.comm_target, DEFAULT_COMM_TARGET);
    }

    #[test]
    fn test_parse_error_reports_position() {
        let err = WidgetConfig::from_ron_str("(model_module: 42)").unwrap_err();
        assert!(matches!(err, ConfigError::Ron(_)));
    }

    #[test]
    fn test_pretty_output_reloads() {
        let config = WidgetConfig {
            comm_target: "leaflet.comm".into(),
            ..WidgetConfig::default()
        };
        let text = config.to_ron_string().unwrap();
        assert_eq!(WidgetConfig::from_ron_str(&text).unwrap(), config);
    }
}
