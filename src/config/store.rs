// Configuration-value store: named keys resolved to typed values with defaults

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while loading configuration text
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: key `{key}` has no value")]
    MissingValue { line: usize, key: String },
}

/// Source of named configuration values
///
/// Only `raw` has to be provided. The typed lookups never fail: a missing
/// key yields the default, and so does a value that does not parse (with a
/// warning logged).
pub trait ConfigSource {
    /// Raw text of a key, if present
    fn raw(&self, key: &str) -> Option<&str>;

    fn bool_or(&self, key: &str, default: bool) -> bool {
        match self.raw(key) {
            None => default,
            Some(value) => parse_bool(value).unwrap_or_else(|| {
                warn!("Config {}: `{}` is not a boolean, using {}", key, value, default);
                default
            }),
        }
    }

    fn number_or(&self, key: &str, default: f32) -> f32 {
        match self.raw(key) {
            None => default,
            Some(value) => value.parse::<f32>().unwrap_or_else(|_| {
                warn!("Config {}: `{}` is not a number, using {}", key, value, default);
                default
            }),
        }
    }

    fn string_or(&self, key: &str, default: &str) -> String {
        self.raw(key).unwrap_or(default).to_string()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// In-memory configuration store
///
/// Text format is one `key value` pair per line. `#` starts a comment,
/// blank lines are skipped and a repeated key overrides the earlier one.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    values: HashMap<String, String>,
}

impl ConfigStore {
    /// Create an empty store (every lookup falls back to its default)
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration text
    ///
    /// # Returns
    /// * `Ok(ConfigStore)` with every key found
    /// * `Err(ConfigError::MissingValue)` if a line holds a key but no value
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut store = Self::new();

        for (index, line) in text.lines().enumerate() {
            let content = match line.find('#') {
                Some(pos) => &line[..pos],
                None => line,
            };

            let mut parts = content.split_whitespace();
            let Some(key) = parts.next() else {
                continue;
            };
            let Some(value) = parts.next() else {
                return Err(ConfigError::MissingValue {
                    line: index + 1,
                    key: key.to_string(),
                });
            };

            store.set(key, value);
        }

        debug!("Parsed {} config values", store.len());
        Ok(store)
    }

    /// Read and parse a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Set or override a value
    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigSource for ConfigStore {
    fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let text = "# digipot settings\n\
                    \n\
                    currentcontrol_module_enable true   # turn it on\n\
                    alpha_current 1.5\n";
        let store = ConfigStore::parse(text).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.raw("currentcontrol_module_enable"), Some("true"));
        assert_eq!(store.raw("alpha_current"), Some("1.5"));
    }

    #[test]
    fn test_parse_later_value_overrides() {
        let store = ConfigStore::parse("beta_current 0.5\nbeta_current 0.7\n").unwrap();
        assert_eq!(store.number_or("beta_current", 0.0), 0.7);
    }

    #[test]
    fn test_parse_missing_value() {
        let err = ConfigStore::parse("alpha_current 1.0\ndigipotchip\n").unwrap_err();
        match err {
            ConfigError::MissingValue { line, key } => {
                assert_eq!(line, 2);
                assert_eq!(key, "digipotchip");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_typed_lookups_use_defaults() {
        let store = ConfigStore::new();
        assert!(!store.bool_or("missing", false));
        assert_eq!(store.number_or("missing", 113.33), 113.33);
        assert_eq!(store.string_or("missing", "mcp4451"), "mcp4451");
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let mut store = ConfigStore::new();
        store.set("digipot_factor", "lots");
        store.set("currentcontrol_module_enable", "maybe");

        assert_eq!(store.number_or("digipot_factor", 113.33), 113.33);
        assert!(store.bool_or("currentcontrol_module_enable", true));
    }

    #[test]
    fn test_bool_spellings() {
        let mut store = ConfigStore::new();
        for (value, expected) in [("TRUE", true), ("on", true), ("1", true), ("No", false), ("0", false)] {
            store.set("flag", value);
            assert_eq!(store.bool_or("flag", !expected), expected, "value {value}");
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = ConfigStore::load("/nonexistent/digipot/config").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
