//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`TutorSettings::default()`]
//! 2. If the settings file exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use tutor_core::retry::RetryPolicy;

/// Configuration for the HTTP server itself.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
        }
    }
}

/// Full settings tree for the Tutor engine.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorSettings {
    /// HTTP server binding.
    #[serde(default)]
    pub server: ServerConfig,
    /// Base URL of the generation service.
    #[serde(default)]
    pub generator_url: Option<String>,
    /// Base URL of the browser-bridge service.
    #[serde(default)]
    pub browser_url: Option<String>,
    /// Retry policy shared by all generation calls.
    #[serde(default)]
    pub retry: RetryPolicy,
}

/// Errors from settings loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    /// File is not valid JSON or does not match the schema.
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Load settings from a path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<TutorSettings, ConfigError> {
    let defaults = serde_json::to_value(TutorSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: TutorSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_value) in source_map {
                if source_value.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_value) => deep_merge(target_value, source_value),
                    None => source_value,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `TUTOR_*` environment variable overrides.
fn apply_env_overrides(settings: &mut TutorSettings) {
    if let Ok(host) = std::env::var("TUTOR_HOST") {
        settings.server.host = host;
    }
    if let Ok(port) = std::env::var("TUTOR_PORT") {
        if let Ok(port) = port.parse() {
            settings.server.port = port;
        }
    }
    if let Ok(url) = std::env::var("TUTOR_GENERATOR_URL") {
        settings.generator_url = Some(url);
    }
    if let Ok(url) = std::env::var("TUTOR_BROWSER_URL") {
        settings.browser_url = Some(url);
    }
}
