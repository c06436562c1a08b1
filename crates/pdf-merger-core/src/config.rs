use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::pdf::PageSizing;

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_filename_prefix() -> String {
    "MERGE".to_string()
}

/// Default scale factor for rendering (1.0 = the page's native dimensions)
const fn default_render_scale() -> f32 {
    1.0
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory the merged PDF is written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Prefix of the timestamped output file name
    #[serde(default = "default_filename_prefix")]
    pub filename_prefix: String,

    /// PDF rendering scale factor (1.0 renders at native page size)
    #[serde(default = "default_render_scale")]
    pub render_scale: f32,

    /// How output pages are sized relative to their source images
    #[serde(default)]
    pub page_sizing: PageSizing,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            filename_prefix: default_filename_prefix(),
            render_scale: default_render_scale(),
            page_sizing: PageSizing::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::error::Error> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            crate::error::Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            crate::error::Error::ConfigLoad(format!("Failed to parse config: {e}"))
        })
    }

    /// Load from default locations (~/.config/pdf-merger/config.toml, ./config.toml)
    pub fn load() -> Self {
        // Try user config
        if let Some(config_dir) = crate::util::config_dir() {
            let user_config = config_dir.join("pdf-merger").join("config.toml");
            if user_config.exists() {
                match Self::from_file(&user_config) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {}", user_config.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // Try local config
        let local_config = std::path::PathBuf::from("config.toml");
        if local_config.exists() {
            match Self::from_file(&local_config) {
                Ok(config) => {
                    tracing::debug!("Loaded config from ./config.toml");
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load ./config.toml: {}", e);
                }
            }
        }

        // Return defaults
        tracing::debug!("No config file found, using defaults");
        Self::default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.filename_prefix, "MERGE");
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert!((config.render_scale - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.page_sizing, PageSizing::MatchSource);
    }

    #[test]
    fn test_parse_partial_config() {
        let config: AppConfig = toml::from_str(
            r#"
            filename_prefix = "OUT"
            render_scale = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(config.filename_prefix, "OUT");
        assert!((config.render_scale - 2.0).abs() < f32::EPSILON);
        // Unset fields fall back to defaults
        assert_eq!(config.page_sizing, PageSizing::MatchSource);
    }

    #[test]
    fn test_parse_fixed_page_sizing() {
        let config: AppConfig = toml::from_str(
            r#"
            [page_sizing.fixed]
            width = 595.0
            height = 842.0
            "#,
        )
        .unwrap();
        assert_eq!(
            config.page_sizing,
            PageSizing::Fixed {
                width: 595.0,
                height: 842.0
            }
        );
    }
}
