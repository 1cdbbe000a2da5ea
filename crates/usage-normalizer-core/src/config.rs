//! TOML-based normalizer configuration.
//!
//! Stores defaults applied to every conversion:
//! - Billing cutoff day
//! - Output precision and zero-bucket handling
//! - Home profile hints
//! - Standing travel ranges
//!
//! Configuration is stored at `~/.config/usage-normalizer/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::interval::{validate_cutoff_day, TravelRange, DEFAULT_PRECISION, MAX_PRECISION};
use crate::profile::HomeProfile;

/// Billing cycle configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingConfig {
    /// Day of month the bill closes (1-31). Unset means calendar months.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff_day: Option<u32>,
}

/// Output record configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_precision")]
    pub precision: u32,
    #[serde(default = "default_true")]
    pub drop_zero_buckets: bool,
}

/// Normalizer configuration.
///
/// Serialized to/from TOML at `~/.config/usage-normalizer/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    #[serde(default)]
    pub billing: BillingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub home: HomeProfile,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub travel: Vec<TravelRange>,
}

fn default_precision() -> u32 {
    DEFAULT_PRECISION
}
fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            drop_zero_buckets: true,
        }
    }
}

/// Returns `~/.config/usage-normalizer[-dev]/` based on USAGE_NORMALIZER_ENV.
///
/// Set USAGE_NORMALIZER_ENV=dev to use the development directory. The
/// directory is not created here; [`NormalizerConfig::save_to`] creates it.
pub fn config_dir() -> PathBuf {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("USAGE_NORMALIZER_ENV").unwrap_or_else(|_| "production".to_string());

    if env == "dev" {
        base_dir.join("usage-normalizer-dev")
    } else {
        base_dir.join("usage-normalizer")
    }
}

impl NormalizerConfig {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        new_value: serde_json::Value,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::InvalidValue {
            key: key.to_string(),
            message: "unknown config key".to_string(),
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: "config key is empty".to_string(),
            });
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let obj = current.as_object_mut().ok_or_else(unknown)?;
            if parts.peek().is_none() {
                obj.insert(part.to_string(), new_value);
                return Ok(());
            }
            current = obj
                .entry(part.to_string())
                .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
        }

        Err(unknown())
    }

    /// JSON forms `value` may take at `key`, most specific first.
    ///
    /// A set field is parsed as its current type. Unset optional fields and
    /// empty lists are absent from the JSON form, so their type is unknown:
    /// the raw text is tried as JSON first, then as a plain string.
    fn value_candidates(
        existing: Option<&serde_json::Value>,
        key: &str,
        value: &str,
    ) -> Result<Vec<serde_json::Value>, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let candidate = match existing {
            Some(serde_json::Value::Bool(_)) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
            ),
            Some(serde_json::Value::Number(_)) => parse_number(value)
                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?,
            Some(serde_json::Value::Object(_)) | Some(serde_json::Value::Array(_)) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            Some(serde_json::Value::String(_)) => serde_json::Value::String(value.into()),
            Some(serde_json::Value::Null) | None => {
                let text = serde_json::Value::String(value.into());
                return Ok(match serde_json::from_str::<serde_json::Value>(value) {
                    Ok(parsed) if parsed != text => vec![parsed, text],
                    _ => vec![text],
                });
            }
        };
        Ok(vec![candidate])
    }

    /// Deserialize and validate an edited JSON form.
    fn from_edited_json(json: serde_json::Value, key: &str) -> Result<Self, ConfigError> {
        let updated: NormalizerConfig =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;

        // Keys the config does not know are dropped by deserialization.
        let known = serde_json::to_value(&updated)
            .ok()
            .and_then(|json| Self::get_json_value_by_path(&json, key).cloned());
        if known.is_none() {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: "unknown config key".to_string(),
            });
        }
        Ok(updated)
    }

    /// Default config file location.
    pub fn default_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Load from the default location, or return defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read, parsed
    /// or validated.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path())
    }

    /// Load from `path`, or return defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };
        let cfg: NormalizerConfig = toml::from_str(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::default_path())
    }

    /// Persist to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Check values the type system cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(day) = self.billing.cutoff_day {
            validate_cutoff_day(day).map_err(|e| ConfigError::InvalidValue {
                key: "billing.cutoff_day".to_string(),
                message: e.to_string(),
            })?;
        }
        if self.output.precision > MAX_PRECISION {
            return Err(ConfigError::InvalidValue {
                key: "output.precision".to_string(),
                message: format!("{} exceeds {MAX_PRECISION}", self.output.precision),
            });
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result fails validation. On error `self` is unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let json = serde_json::to_value(&*self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        let existing = Self::get_json_value_by_path(&json, key);

        let mut last_error = None;
        for candidate in Self::value_candidates(existing, key, value)? {
            let mut edited = json.clone();
            Self::set_json_value_by_path(&mut edited, key, candidate)?;
            match Self::from_edited_json(edited, key) {
                Ok(updated) => {
                    *self = updated;
                    return Ok(());
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("cannot parse '{value}'"),
        }))
    }
}

fn parse_number(value: &str) -> Option<serde_json::Value> {
    if let Ok(n) = value.parse::<i64>() {
        Some(serde_json::Value::Number(n.into()))
    } else {
        value
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number)
    }
}
