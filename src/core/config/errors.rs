//! Configuration error types and validation traits.

use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error indicating that a session pool size is invalid (must be greater than 0).
    #[error("session pool size must be greater than 0")]
    InvalidPoolSize,

    /// Error indicating that a configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// An environment variable could not be parsed.
    #[error("invalid value for {key}: '{value}'")]
    InvalidEnvValue { key: String, value: String },

    /// The calibration file could not be read or parsed.
    #[error("failed to read calibration file {path}: {message}")]
    Calibration {
        path: std::path::PathBuf,
        message: String,
    },
}

/// A trait for validating configuration parameters.
pub trait ConfigValidator {
    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Validates a session pool size.
    fn validate_pool_size(&self, pool_size: usize) -> Result<(), ConfigError> {
        if pool_size == 0 {
            return Err(ConfigError::InvalidPoolSize);
        }
        Ok(())
    }

    /// Validates a softmax temperature: it must be finite and strictly positive.
    fn validate_temperature(&self, temperature: f64) -> Result<(), ConfigError> {
        if !temperature.is_finite() || temperature <= 0.0 {
            return Err(ConfigError::InvalidConfig {
                message: format!("temperature must be finite and > 0, got {temperature}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe;

    impl ConfigValidator for Probe {
        fn validate(&self) -> Result<(), ConfigError> {
            Ok(())
        }
    }

    #[test]
    fn test_pool_size_validation() {
        assert!(matches!(
            Probe.validate_pool_size(0),
            Err(ConfigError::InvalidPoolSize)
        ));
        assert!(Probe.validate_pool_size(4).is_ok());
    }

    #[test]
    fn test_temperature_validation() {
        assert!(Probe.validate_temperature(1.5).is_ok());
        assert!(Probe.validate_temperature(0.0).is_err());
        assert!(Probe.validate_temperature(-1.0).is_err());
        assert!(Probe.validate_temperature(f64::NAN).is_err());
        assert!(Probe.validate_temperature(f64::INFINITY).is_err());
    }
}
