//! Settings loading and merging
//!
//! Settings come from two places: a JSON config file and command-line flags.
//! The file wins whenever it provides a non-empty value; flags only fill the
//! gaps it leaves. The merged map is validated once into a [`JobConfig`].

use crate::error::ConfigError;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_OUTPUT_PATH: &str = "reverse_geocoding_result.xls";
pub const DEFAULT_REQUEST_DELAY: f64 = 0.5;
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

const KEY_API_KEY: &str = "api_key";
const KEY_INPUT_PATH: &str = "input_path";
const KEY_OUTPUT_PATH: &str = "output_path";
const KEY_COLUMN: &str = "column";
const KEY_REQUEST_DELAY: &str = "request_delay";
const KEY_CHUNK_SIZE: &str = "chunk_size";

/// Load a JSON config file into a flat key/value map.
///
/// A missing file or a document that is not a JSON object yields an empty
/// map and a warning; it is never an error.
pub fn load_config_file(path: &Path) -> Map<String, Value> {
    if !path.exists() {
        log::warn!("Config file {} not found", path.display());
        return Map::new();
    }

    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) => {
            log::warn!("Failed to read config file {}: {}", path.display(), e);
            return Map::new();
        }
    };

    match serde_json::from_str::<Value>(&data) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            log::warn!("Config file {} is not a JSON object", path.display());
            Map::new()
        }
        Err(e) => {
            log::warn!("Error decoding JSON from {}: {}", path.display(), e);
            Map::new()
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_key: Option<String>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub column: Option<usize>,
    pub delay: Option<f64>,
    pub chunk_size: Option<usize>,
}

/// Merged, not yet validated settings
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: Map<String, Value>,
}

/// Validated settings for one geocoding run
#[derive(Debug, Clone, PartialEq)]
pub struct JobConfig {
    pub api_key: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub column: usize,
    pub request_delay: Duration,
    pub chunk_size: usize,
}

impl Settings {
    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Load settings from a config file (see [`load_config_file`])
    pub fn load(path: &Path) -> Self {
        Self::from_map(load_config_file(path))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Fill gaps left by the config file with command-line values.
    ///
    /// `request_delay` is special: the flag only applies when the file omits
    /// the key entirely, and a null/empty value falls back to the default.
    pub fn apply_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(api_key) = overrides.api_key.as_deref().filter(|k| !k.is_empty()) {
            if self.is_unset(KEY_API_KEY) {
                self.values.insert(KEY_API_KEY.to_string(), Value::from(api_key));
                log::info!("Using API key from command line");
            }
        }

        if let Some(input) = overrides.input.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            if self.is_unset(KEY_INPUT_PATH) {
                self.values.insert(
                    KEY_INPUT_PATH.to_string(),
                    Value::from(input.to_string_lossy().into_owned()),
                );
                log::info!("Using input path from command line");
            }
        }

        if let Some(output) = overrides.output.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            if self.is_unset(KEY_OUTPUT_PATH) {
                self.values.insert(
                    KEY_OUTPUT_PATH.to_string(),
                    Value::from(output.to_string_lossy().into_owned()),
                );
                log::info!("Using output path from command line");
            }
        }

        if let Some(column) = overrides.column {
            if self.is_unset(KEY_COLUMN) {
                self.values.insert(KEY_COLUMN.to_string(), Value::from(column));
                log::info!("Using column index from command line");
            }
        }

        if let Some(chunk_size) = overrides.chunk_size {
            if self.is_unset(KEY_CHUNK_SIZE) {
                self.values.insert(KEY_CHUNK_SIZE.to_string(), Value::from(chunk_size));
                log::info!("Using chunk size from command line");
            }
        }

        match overrides.delay {
            Some(delay) if !self.values.contains_key(KEY_REQUEST_DELAY) => {
                self.values.insert(KEY_REQUEST_DELAY.to_string(), Value::from(delay));
                log::info!("Using request delay from command line");
            }
            _ => {
                if self.is_unset(KEY_REQUEST_DELAY) {
                    self.values.insert(
                        KEY_REQUEST_DELAY.to_string(),
                        Value::from(DEFAULT_REQUEST_DELAY),
                    );
                }
            }
        }
    }

    /// Check required keys and convert everything to typed values.
    ///
    /// Checks run in order: `api_key`, `input_path`, `column`, then that the
    /// input file exists.
    pub fn validate(&self) -> Result<JobConfig, ConfigError> {
        let api_key = self.required_string(
            KEY_API_KEY,
            "set api_key in the config file or pass -k/--api_key",
        )?;
        let input_path = self.required_string(
            KEY_INPUT_PATH,
            "set input_path in the config file or pass -i/--input",
        )?;

        let column = match self.present(KEY_COLUMN) {
            Some(value) => integer_value(KEY_COLUMN, value)?,
            None => {
                return Err(ConfigError::MissingKey {
                    key: KEY_COLUMN,
                    hint: "set column in the config file or pass --column",
                })
            }
        };

        let input_path = PathBuf::from(input_path);
        if !input_path.exists() {
            return Err(ConfigError::InputNotFound(input_path));
        }

        let output_path = match self.present(KEY_OUTPUT_PATH) {
            Some(value) => PathBuf::from(string_value(KEY_OUTPUT_PATH, value)?),
            None => PathBuf::from(DEFAULT_OUTPUT_PATH),
        };

        let request_delay = match self.present(KEY_REQUEST_DELAY) {
            Some(value) => delay_value(value)?,
            None => Duration::from_secs_f64(DEFAULT_REQUEST_DELAY),
        };

        let chunk_size = match self.present(KEY_CHUNK_SIZE) {
            Some(value) => integer_value(KEY_CHUNK_SIZE, value)?,
            None => DEFAULT_CHUNK_SIZE,
        };
        if chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: KEY_CHUNK_SIZE,
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(JobConfig {
            api_key,
            input_path,
            output_path,
            column,
            request_delay,
            chunk_size,
        })
    }

    fn is_unset(&self, key: &str) -> bool {
        self.present(key).is_none()
    }

    /// Value for `key` unless it is absent, null or an empty string
    fn present(&self, key: &str) -> Option<&Value> {
        match self.values.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(value) => Some(value),
        }
    }

    fn required_string(&self, key: &'static str, hint: &'static str) -> Result<String, ConfigError> {
        match self.present(key) {
            Some(value) => string_value(key, value),
            None => Err(ConfigError::MissingKey { key, hint }),
        }
    }
}

fn string_value(key: &'static str, value: &Value) -> Result<String, ConfigError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ConfigError::InvalidValue {
            key,
            reason: format!("expected a string, got {}", value),
        })
}

fn integer_value(key: &'static str, value: &Value) -> Result<usize, ConfigError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    parsed
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| ConfigError::InvalidValue {
            key,
            reason: format!("expected a non-negative integer, got {}", value),
        })
}

fn delay_value(value: &Value) -> Result<Duration, ConfigError> {
    let seconds = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    seconds
        .filter(|s| *s >= 0.0)
        .and_then(|s| Duration::try_from_secs_f64(s).ok())
        .ok_or_else(|| ConfigError::InvalidValue {
            key: KEY_REQUEST_DELAY,
            reason: format!("expected a non-negative number of seconds, got {}", value),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn settings(value: Value) -> Settings {
        match value {
            Value::Object(map) => Settings::from_map(map),
            _ => panic!("test settings must be an object"),
        }
    }

    #[test]
    fn test_file_value_wins_over_flag() {
        let mut s = settings(json!({ "api_key": "X" }));
        s.apply_overrides(&CliOverrides {
            api_key: Some("Y".to_string()),
            ..Default::default()
        });
        assert_eq!(s.get("api_key"), Some(&json!("X")));
    }

    #[test]
    fn test_flag_fills_empty_file_value() {
        let mut s = settings(json!({ "api_key": "" }));
        s.apply_overrides(&CliOverrides {
            api_key: Some("Y".to_string()),
            ..Default::default()
        });
        assert_eq!(s.get("api_key"), Some(&json!("Y")));
    }

    #[test]
    fn test_flags_fill_missing_keys() {
        let mut s = Settings::default();
        s.apply_overrides(&CliOverrides {
            api_key: Some("key".to_string()),
            input: Some(PathBuf::from("in.csv")),
            output: Some(PathBuf::from("out/result.csv")),
            column: Some(2),
            delay: Some(1.5),
            chunk_size: Some(50),
        });
        assert_eq!(s.get("input_path"), Some(&json!("in.csv")));
        assert_eq!(s.get("output_path"), Some(&json!("out/result.csv")));
        assert_eq!(s.get("column"), Some(&json!(2)));
        assert_eq!(s.get("request_delay"), Some(&json!(1.5)));
        assert_eq!(s.get("chunk_size"), Some(&json!(50)));
    }

    #[test]
    fn test_delay_flag_ignored_when_file_has_key() {
        let mut s = settings(json!({ "request_delay": 2.0 }));
        s.apply_overrides(&CliOverrides {
            delay: Some(0.1),
            ..Default::default()
        });
        assert_eq!(s.get("request_delay"), Some(&json!(2.0)));
    }

    #[test]
    fn test_null_delay_falls_back_to_default_even_with_flag() {
        let mut s = settings(json!({ "request_delay": null }));
        s.apply_overrides(&CliOverrides {
            delay: Some(0.1),
            ..Default::default()
        });
        assert_eq!(s.get("request_delay"), Some(&json!(DEFAULT_REQUEST_DELAY)));
    }

    #[test]
    fn test_delay_defaults_when_nothing_given() {
        let mut s = Settings::default();
        s.apply_overrides(&CliOverrides::default());
        assert_eq!(s.get("request_delay"), Some(&json!(DEFAULT_REQUEST_DELAY)));
    }

    #[test]
    fn test_missing_config_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let map = load_config_file(&temp_dir.path().join("nope.json"));
        assert!(map.is_empty());
    }

    #[test]
    fn test_malformed_config_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load_config_file(&path).is_empty());

        fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(load_config_file(&path).is_empty());
    }

    #[test]
    fn test_load_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"api_key": "abc", "column": 1}"#).unwrap();

        let s = Settings::load(&path);
        assert_eq!(s.get("api_key"), Some(&json!("abc")));
        assert_eq!(s.get("column"), Some(&json!(1)));
    }

    #[test]
    fn test_validate_full_config() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("points.csv");
        fs::write(&input, "name,location\n").unwrap();

        let s = settings(json!({
            "api_key": "abc",
            "input_path": input.to_string_lossy(),
            "column": "1",
            "request_delay": 0.25,
        }));
        let job = s.validate().unwrap();

        assert_eq!(job.api_key, "abc");
        assert_eq!(job.input_path, input);
        assert_eq!(job.output_path, PathBuf::from(DEFAULT_OUTPUT_PATH));
        assert_eq!(job.column, 1);
        assert_eq!(job.request_delay, Duration::from_millis(250));
        assert_eq!(job.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_validate_missing_input_path() {
        let s = settings(json!({ "api_key": "abc", "column": 0 }));
        match s.validate() {
            Err(ConfigError::MissingKey { key, .. }) => assert_eq!(key, "input_path"),
            other => panic!("expected missing input_path, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_checks_api_key_first() {
        let s = settings(json!({ "api_key": "" }));
        match s.validate() {
            Err(ConfigError::MissingKey { key, .. }) => assert_eq!(key, "api_key"),
            other => panic!("expected missing api_key, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_missing_column() {
        let s = settings(json!({ "api_key": "abc", "input_path": "whatever.csv" }));
        match s.validate() {
            Err(ConfigError::MissingKey { key, .. }) => assert_eq!(key, "column"),
            other => panic!("expected missing column, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_nonexistent_input() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.csv");
        let s = settings(json!({
            "api_key": "abc",
            "input_path": missing.to_string_lossy(),
            "column": 0,
        }));
        assert!(matches!(s.validate(), Err(ConfigError::InputNotFound(p)) if p == missing));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("points.csv");
        fs::write(&input, "location\n").unwrap();
        let input = input.to_string_lossy().into_owned();

        let negative_column = settings(json!({ "api_key": "k", "input_path": input, "column": -1 }));
        assert!(matches!(
            negative_column.validate(),
            Err(ConfigError::InvalidValue { key: "column", .. })
        ));

        let negative_delay = settings(json!({
            "api_key": "k", "input_path": input, "column": 0, "request_delay": -0.5
        }));
        assert!(matches!(
            negative_delay.validate(),
            Err(ConfigError::InvalidValue { key: "request_delay", .. })
        ));

        let huge_delay = settings(json!({
            "api_key": "k", "input_path": input, "column": 0, "request_delay": 1e30
        }));
        assert!(matches!(
            huge_delay.validate(),
            Err(ConfigError::InvalidValue { key: "request_delay", .. })
        ));

        let huge_delay_text = settings(json!({
            "api_key": "k", "input_path": input, "column": 0, "request_delay": "inf"
        }));
        assert!(matches!(
            huge_delay_text.validate(),
            Err(ConfigError::InvalidValue { key: "request_delay", .. })
        ));

        let zero_chunk = settings(json!({
            "api_key": "k", "input_path": input, "column": 0, "chunk_size": 0
        }));
        assert!(matches!(
            zero_chunk.validate(),
            Err(ConfigError::InvalidValue { key: "chunk_size", .. })
        ));
    }
}
