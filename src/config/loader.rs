//! Configuration file loading with precedence handling.

use crate::cache::CacheConfig;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "VPCACHE_CONFIG";

/// Environment variable overriding the prefetch margin.
pub const PREFETCH_MARGIN_ENV_VAR: &str = "VPCACHE_PREFETCH_MARGIN";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A setting has a value that cannot be used.
    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        /// Setting name (config key or environment variable).
        key: String,
        /// Offending value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/vpcache/config.toml`:
///
/// ```toml
/// log_file_path = "/tmp/vpcache.log"
/// log_filter = "viewport_cache=debug"
///
/// [cache]
/// prefetch_margin = 32
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Default tracing filter when `RUST_LOG` is unset.
    #[serde(default)]
    pub log_filter: Option<String>,

    /// Cache tuning section.
    #[serde(default)]
    pub cache: Option<CacheSection>,
}

/// `[cache]` section of the config file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CacheSection {
    /// Rows prefetched on each side of the viewport.
    #[serde(default)]
    pub prefetch_margin: Option<usize>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Cache tuning.
    pub cache: CacheConfig,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
    /// Default tracing filter.
    pub log_filter: String,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            log_file_path: default_log_path(),
            log_filter: "info".to_string(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/vpcache/vpcache.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("vpcache").join("vpcache.log")
    } else {
        PathBuf::from("vpcache.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/vpcache/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vpcache").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `VPCACHE_CONFIG` environment variable
/// 3. Default path `~/.config/vpcache/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    let cache = config.cache.unwrap_or_default();

    ResolvedConfig {
        cache: CacheConfig {
            prefetch_margin: cache
                .prefetch_margin
                .unwrap_or(defaults.cache.prefetch_margin),
        },
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        log_filter: config.log_filter.unwrap_or(defaults.log_filter),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `VPCACHE_PREFETCH_MARGIN`: Override prefetch margin
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if the variable is set but is not
/// a non-negative integer.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> Result<ResolvedConfig, ConfigError> {
    if let Ok(raw) = std::env::var(PREFETCH_MARGIN_ENV_VAR) {
        config.cache.prefetch_margin = parse_margin(PREFETCH_MARGIN_ENV_VAR, &raw)?;
    }

    Ok(config)
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    margin_override: Option<usize>,
    log_file_override: Option<PathBuf>,
) -> ResolvedConfig {
    if let Some(margin) = margin_override {
        config.cache.prefetch_margin = margin;
    }

    if let Some(path) = log_file_override {
        config.log_file_path = path;
    }

    config
}

fn parse_margin(key: &str, raw: &str) -> Result<usize, ConfigError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
