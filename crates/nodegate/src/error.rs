//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while loading or validating scale-up limits.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid scale-up config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("burst limit of {burst} nodes is below the steady rate of {max} nodes/min")]
    BurstBelowRate { max: u32, burst: u32 },

    #[error("scale-up limits with a zero rate or burst never admit a node")]
    NeverAdmits,
}

pub type ConfigResult<T> = Result<T, ConfigError>;
