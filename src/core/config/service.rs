//! Service-level configuration.
//!
//! Values are layered, lowest precedence first: built-in defaults, an optional
//! JSON file, then `FETAL_PLANE_*` environment variables. Binaries apply their
//! command-line flags on top and call [`ConfigValidator::validate`] last.

use super::errors::{ConfigError, ConfigValidator};
use super::onnx::{ModelInferenceConfig, OrtSessionConfig};
use crate::core::constants::{
    DEFAULT_API_PREFIX, DEFAULT_BIND_ADDRESS, DEFAULT_CORS_ORIGINS, DEFAULT_MAX_UPLOAD_BYTES,
    DEFAULT_MODEL_PATH, DEFAULT_PROJECT_NAME,
};
use crate::core::errors::PlaneResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const ENV_MODEL_PATH: &str = "FETAL_PLANE_MODEL_PATH";
pub const ENV_BIND_ADDRESS: &str = "FETAL_PLANE_BIND";
pub const ENV_TEMPERATURE: &str = "FETAL_PLANE_TEMPERATURE";
pub const ENV_CALIBRATION: &str = "FETAL_PLANE_CALIBRATION";
pub const ENV_SESSION_POOL_SIZE: &str = "FETAL_PLANE_SESSION_POOL_SIZE";
pub const ENV_LOG_FORMAT: &str = "FETAL_PLANE_LOG_FORMAT";
pub const ENV_MAX_UPLOAD_BYTES: &str = "FETAL_PLANE_MAX_UPLOAD_BYTES";
pub const ENV_CORS_ORIGINS: &str = "FETAL_PLANE_CORS_ORIGINS";

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Output of the offline temperature calibration tool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureCalibration {
    pub temperature: f64,
}

impl TemperatureCalibration {
    /// Reads a calibration JSON file (`{"temperature": 1.5}`).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Calibration {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Calibration {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Configuration of the inference service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Display name reported by the metadata endpoint.
    pub project_name: String,
    /// Service version reported by the metadata endpoint.
    pub version: String,
    /// URL prefix of the versioned API, e.g. `/v1`.
    pub api_prefix: String,
    /// Socket address the HTTP surface listens on.
    pub bind_address: String,
    /// Path of the ONNX classifier. Read once at startup.
    pub model_path: PathBuf,
    /// Optional display name of the model.
    pub model_name: Option<String>,
    /// Optional input tensor name; discovered from the model when unset.
    pub input_name: Option<String>,
    /// Number of ONNX Runtime sessions kept for concurrent requests.
    pub session_pool_size: usize,
    /// ONNX Runtime session tuning.
    pub ort_session: Option<OrtSessionConfig>,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: usize,
    /// Offline-calibrated softmax temperature. Reported only; the live path
    /// does not apply it.
    pub temperature: Option<f64>,
    /// Calibration JSON used to fill `temperature` when it is unset.
    pub calibration_path: Option<PathBuf>,
    /// Log output format.
    pub log_format: LogFormat,
    /// Origins allowed by CORS. `"*"` allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            model_name: None,
            input_name: None,
            session_pool_size: 1,
            ort_session: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            temperature: None,
            calibration_path: None,
            log_format: LogFormat::Text,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ServiceConfig {
    /// Reads a JSON configuration file; missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> PlaneResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Builds the configuration from defaults, an optional JSON file and the
    /// process environment.
    ///
    /// Validation and [`resolve_calibration`](Self::resolve_calibration) are
    /// left to the caller, so that command-line overrides apply first and the
    /// calibration is read once logging is up.
    pub fn load(path: Option<&Path>) -> PlaneResult<Self> {
        let config = match path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides(|key| std::env::var(key).ok())?)
    }

    /// Applies `FETAL_PLANE_*` overrides read through `lookup`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_MODEL_PATH) {
            self.model_path = PathBuf::from(path);
        }
        if let Some(bind) = lookup(ENV_BIND_ADDRESS) {
            self.bind_address = bind;
        }
        if let Some(value) = lookup(ENV_TEMPERATURE) {
            self.temperature = Some(parse_env(ENV_TEMPERATURE, value)?);
        }
        if let Some(path) = lookup(ENV_CALIBRATION) {
            self.calibration_path = Some(PathBuf::from(path));
        }
        if let Some(value) = lookup(ENV_SESSION_POOL_SIZE) {
            self.session_pool_size = parse_env(ENV_SESSION_POOL_SIZE, value)?;
        }
        if let Some(value) = lookup(ENV_MAX_UPLOAD_BYTES) {
            self.max_upload_bytes = parse_env(ENV_MAX_UPLOAD_BYTES, value)?;
        }
        if let Some(value) = lookup(ENV_LOG_FORMAT) {
            self.log_format = parse_env(ENV_LOG_FORMAT, value)?;
        }
        if let Some(value) = lookup(ENV_CORS_ORIGINS) {
            self.cors_origins = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        Ok(self)
    }

    /// Fills `temperature` from `calibration_path` when no explicit value is set.
    pub fn resolve_calibration(&mut self) -> Result<(), ConfigError> {
        if self.temperature.is_some() {
            return Ok(());
        }
        if let Some(path) = &self.calibration_path {
            let calibration = TemperatureCalibration::from_file(path)?;
            tracing::info!(
                path = %path.display(),
                temperature = calibration.temperature,
                "loaded offline temperature calibration"
            );
            self.temperature = Some(calibration.temperature);
        }
        Ok(())
    }

    /// Settings for building the scoring backend.
    pub fn inference_config(&self) -> ModelInferenceConfig {
        ModelInferenceConfig {
            model_name: self.model_name.clone(),
            input_name: self.input_name.clone(),
            session_pool_size: self.session_pool_size,
            ort_session: self.ort_session.clone(),
        }
    }
}

impl ConfigValidator for ServiceConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_pool_size(self.session_pool_size)?;
        if let Some(temperature) = self.temperature {
            self.validate_temperature(temperature)?;
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidConfig {
                message: "max_upload_bytes must be greater than 0".to_string(),
            });
        }
        if !self.api_prefix.starts_with('/') || self.api_prefix.len() < 2 {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "api_prefix must start with '/' and name a path segment, got '{}'",
                    self.api_prefix
                ),
            });
        }
        if self.api_prefix.ends_with('/') {
            return Err(ConfigError::InvalidConfig {
                message: format!("api_prefix must not end with '/', got '{}'", self.api_prefix),
            });
        }
        if self.model_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfig {
                message: "model_path must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnvValue {
            key: key.to_string(),
            value,
        })
}
