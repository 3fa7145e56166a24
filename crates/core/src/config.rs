// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

//! Typed daemon configuration: loaded once at startup from a TOML file,
//! then overridden per-setting from `MEMORIZER_`-prefixed environment
//! variables (§6). Config loading/validation is otherwise out of scope;
//! this module only owns the shape and the override mechanics the rest
//! of the core reads.

use crate::model::PathConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "MEMORIZER_";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: PathBuf, #[source] source: toml::de::Error },
    #[error("invalid override for {key}: {message}")]
    InvalidOverride { key: String, message: String },
}

/// Full daemon configuration. Every field has a default so an empty/
/// missing config file still produces a usable configuration.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub state_dir: PathBuf,
    pub http_addr: String,
    pub http_port: u16,

    pub debounce_window_ms: u64,
    pub delete_grace_period_ms: u64,
    pub rebuild_interval_secs: u64,

    pub max_retries: u32,
    pub queue_capacity: usize,
    pub enqueue_timeout_ms: u64,
    pub workers: usize,

    pub graceful_shutdown_timeout_ms: u64,
    pub shutdown_timeout_ms: u64,
    pub request_deadline_secs: u64,
    pub rebuild_deadline_secs: u64,
    pub read_deadline_secs: u64,

    pub write_queue_size: usize,
    pub critical_queue_capacity: usize,
    pub bus_channel_capacity: usize,
    pub overflow_redeliver_interval_ms: u64,

    pub semantic_rate_limit_per_min: u32,
    pub embeddings_rate_limit_per_min: u32,
    pub embeddings_enabled: bool,

    pub graph_base_url: String,
    pub graph_request_timeout_secs: u64,

    pub default_path_config: PathConfig,

    /// Never populated from the config file, only from the environment.
    #[serde(skip)]
    pub semantic_api_key: Option<String>,
    #[serde(skip)]
    pub embeddings_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            http_addr: "127.0.0.1".to_string(),
            http_port: 7600,
            debounce_window_ms: 500,
            delete_grace_period_ms: 1_500,
            rebuild_interval_secs: 0,
            max_retries: 5,
            queue_capacity: 1_024,
            enqueue_timeout_ms: 5_000,
            workers: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1).min(4),
            graceful_shutdown_timeout_ms: 10_000,
            shutdown_timeout_ms: 15_000,
            request_deadline_secs: 30,
            rebuild_deadline_secs: 300,
            read_deadline_secs: 300,
            write_queue_size: 256,
            critical_queue_capacity: 10_000,
            bus_channel_capacity: 1_024,
            overflow_redeliver_interval_ms: 2_000,
            semantic_rate_limit_per_min: 60,
            embeddings_rate_limit_per_min: 60,
            embeddings_enabled: true,
            graph_base_url: "http://127.0.0.1:8081".to_string(),
            graph_request_timeout_secs: 30,
            default_path_config: PathConfig::default(),
            semantic_api_key: None,
            embeddings_api_key: None,
        }
    }
}

fn default_state_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("memorizer")
}

/// Expands a leading `~` or `~/...` against the home directory (§6: all
/// persisted-state paths support `~` expansion). Leaves the path alone
/// if it doesn't start with `~` or if the home directory is unknown.
fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

impl Config {
    pub fn registry_path(&self) -> PathBuf {
        self.state_dir.join("registry")
    }

    pub fn wal_path(&self) -> PathBuf {
        self.state_dir.join("registry.wal")
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.state_dir.join("registry.snapshot")
    }

    pub fn pid_path(&self) -> PathBuf {
        self.state_dir.join("memorizer.pid")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.state_dir.join("memorizer.lock")
    }

    pub fn critical_overflow_path(&self) -> PathBuf {
        self.state_dir.join("critical_events.jsonl")
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir.join("memorizer.log")
    }

    pub fn http_socket_addr(&self) -> String {
        format!("{}:{}", self.http_addr, self.http_port)
    }

    pub fn request_deadline(&self) -> Duration {
        Duration::from_secs(self.request_deadline_secs)
    }

    pub fn rebuild_deadline(&self) -> Duration {
        Duration::from_secs(self.rebuild_deadline_secs)
    }

    pub fn read_deadline(&self) -> Duration {
        Duration::from_secs(self.read_deadline_secs)
    }

    pub fn graph_request_timeout(&self) -> Duration {
        Duration::from_secs(self.graph_request_timeout_secs)
    }

    pub fn overflow_redeliver_interval(&self) -> Duration {
        Duration::from_millis(self.overflow_redeliver_interval_ms.max(1))
    }

    /// Loads config from `path` (if it exists), then applies `MEMORIZER_`
    /// environment overrides, then secrets (which are environment-only).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(path)
                    .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
                toml::from_str(&raw)
                    .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?
            }
            _ => Config::default(),
        };
        config.apply_env_overrides(std::env::vars())?;
        config.state_dir = expand_tilde(&config.state_dir);
        Ok(config)
    }

    /// Applies `MEMORIZER_FOO_BAR=value` style overrides onto an already
    /// loaded config by round-tripping through a JSON object — this keeps
    /// the override mechanics generic over every field without a giant
    /// hand-written match.
    pub fn apply_env_overrides(
        &mut self,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<(), ConfigError> {
        let mut value = serde_json::to_value(&*self)
            .map_err(|e| ConfigError::InvalidOverride { key: "<config>".into(), message: e.to_string() })?;
        for (key, raw) in vars {
            let Some(field) = key.strip_prefix(ENV_PREFIX) else { continue };
            if field == "SEMANTIC_API_KEY" {
                self.semantic_api_key = Some(raw);
                continue;
            }
            if field == "EMBEDDINGS_API_KEY" {
                self.embeddings_api_key = Some(raw);
                continue;
            }
            let field = field.to_lowercase();
            set_override(&mut value, &field, &raw)?;
        }
        *self = serde_json::from_value(value)
            .map_err(|e| ConfigError::InvalidOverride { key: "<config>".into(), message: e.to_string() })?;
        Ok(())
    }
}

fn set_override(value: &mut serde_json::Value, field: &str, raw: &str) -> Result<(), ConfigError> {
    let serde_json::Value::Object(map) = value else {
        return Ok(());
    };
    let Some(slot) = map.get_mut(field) else {
        return Ok(());
    };
    let parsed = match slot {
        serde_json::Value::String(_) => serde_json::Value::String(raw.to_string()),
        serde_json::Value::Bool(_) => serde_json::Value::Bool(
            raw.parse::<bool>()
                .map_err(|e| ConfigError::InvalidOverride { key: field.to_string(), message: e.to_string() })?,
        ),
        serde_json::Value::Number(_) => {
            if let Ok(i) = raw.parse::<i64>() {
                serde_json::Value::Number(i.into())
            } else {
                let f = raw
                    .parse::<f64>()
                    .map_err(|e| ConfigError::InvalidOverride { key: field.to_string(), message: e.to_string() })?;
                serde_json::Number::from_f64(f)
                    .map(serde_json::Value::Number)
                    .ok_or_else(|| ConfigError::InvalidOverride {
                        key: field.to_string(),
                        message: "not a finite number".to_string(),
                    })?
            }
        }
        other => other.clone(),
    };
    *slot = parsed;
    Ok(())
}

/// Unused by the config object itself but kept alongside it: components
/// that need a merged view of root-specific + default filter policy use
/// this helper rather than re-implementing the merge.
pub fn effective_path_config(defaults: &Config, root_config: Option<&PathConfig>) -> PathConfig {
    match root_config {
        Some(cfg) => cfg.merge_over(&defaults.default_path_config),
        None => defaults.default_path_config.clone().normalized(),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
