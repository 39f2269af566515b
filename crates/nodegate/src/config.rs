//! Scale-up limit configuration.
//!
//! Limits are read from the `[scale_up]` table of a TOML file:
//!
//! ```toml
//! [scale_up]
//! max_nodes_per_minute = 10
//! burst_max_nodes_per_minute = 50
//! ```
//!
//! The limiter accepts any pair of values; validation happens here, at
//! load time.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Node admission limits for the scale-up path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiterConfig {
    /// Steady-state number of nodes that may be added per minute.
    pub max_nodes_per_minute: u32,
    /// Most nodes a single decision may add, no matter how long the
    /// limiter sat idle.
    pub burst_max_nodes_per_minute: u32,
}

impl RateLimiterConfig {
    pub fn new(max_nodes_per_minute: u32, burst_max_nodes_per_minute: u32) -> Self {
        Self {
            max_nodes_per_minute,
            burst_max_nodes_per_minute,
        }
    }

    /// Check that the limits describe a usable burst window.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.burst_max_nodes_per_minute < self.max_nodes_per_minute {
            return Err(ConfigError::BurstBelowRate {
                max: self.max_nodes_per_minute,
                burst: self.burst_max_nodes_per_minute,
            });
        }
        if self.max_nodes_per_minute == 0 || self.burst_max_nodes_per_minute == 0 {
            return Err(ConfigError::NeverAdmits);
        }
        Ok(())
    }
}

/// On-disk shape of a scale-up limits file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleUpFile {
    pub scale_up: RateLimiterConfig,
}

impl ScaleUpFile {
    /// Parse and validate limits from TOML text.
    pub fn from_toml_str(content: &str) -> ConfigResult<RateLimiterConfig> {
        let file: ScaleUpFile = toml::from_str(content)?;
        file.scale_up.validate()?;
        Ok(file.scale_up)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<RateLimiterConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("loading scale-up limits from {}", path.display()))?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_scale_up_table() {
        let toml_str = r#"
[scale_up]
max_nodes_per_minute = 10
burst_max_nodes_per_minute = 50
"#;
        let config = ScaleUpFile::from_toml_str(toml_str).unwrap();
        assert_eq!(config, RateLimiterConfig::new(10, 50));
    }

    #[test]
    fn equal_rate_and_burst_is_valid() {
        assert!(RateLimiterConfig::new(20, 20).validate().is_ok());
    }

    #[test]
    fn burst_below_rate_is_rejected() {
        let err = RateLimiterConfig::new(10, 5).validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::BurstBelowRate { max: 10, burst: 5 }
        ));
    }

    #[test]
    fn zero_limits_are_rejected() {
        assert!(matches!(
            RateLimiterConfig::new(0, 0).validate(),
            Err(ConfigError::NeverAdmits)
        ));
        assert!(matches!(
            RateLimiterConfig::new(0, 10).validate(),
            Err(ConfigError::NeverAdmits)
        ));
    }

    #[test]
    fn missing_field_is_a_parse_error() {
        let toml_str = r#"
[scale_up]
max_nodes_per_minute = 10
"#;
        let err = ScaleUpFile::from_toml_str(toml_str).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn negative_limit_is_a_parse_error() {
        let toml_str = r#"
[scale_up]
max_nodes_per_minute = -1
burst_max_nodes_per_minute = 5
"#;
        assert!(matches!(
            ScaleUpFile::from_toml_str(toml_str),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scale_up]").unwrap();
        writeln!(file, "max_nodes_per_minute = 4").unwrap();
        writeln!(file, "burst_max_nodes_per_minute = 12").unwrap();

        let config = ScaleUpFile::from_file(file.path()).unwrap();
        assert_eq!(config.max_nodes_per_minute, 4);
        assert_eq!(config.burst_max_nodes_per_minute, 12);
    }

    #[test]
    fn load_from_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scale_up]").unwrap();
        writeln!(file, "max_nodes_per_minute = 8").unwrap();
        writeln!(file, "burst_max_nodes_per_minute = 2").unwrap();

        let err = ScaleUpFile::from_file(file.path()).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains(&file.path().display().to_string()));
        assert!(msg.contains("below the steady rate"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ScaleUpFile::from_file(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn scaffold_round_trips() {
        let file = ScaleUpFile {
            scale_up: RateLimiterConfig::new(10, 100),
        };
        let toml_str = file.to_toml_string().unwrap();
        assert!(toml_str.contains("[scale_up]"));
        assert!(toml_str.contains("burst_max_nodes_per_minute = 100"));

        let parsed = ScaleUpFile::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed, file.scale_up);
    }
}
