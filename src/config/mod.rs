//! Configuration module.
//!
//! Cache tuning lives in [`CacheConfig`](crate::cache::CacheConfig); this
//! module resolves it, together with logging settings, from defaults, a
//! TOML file, environment variables and CLI flags.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, CacheSection, ConfigError,
    ConfigFile, ResolvedConfig,
};
