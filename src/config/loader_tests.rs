//! Tests for configuration file loading.

use super::*;
use serial_test::serial;
use std::env;
use std::fs;

#[test]
fn default_config_path_contains_vpcache_config_toml() {
    if let Some(path) = default_config_path() {
        let path_str = path.to_string_lossy();
        assert!(
            path_str.contains("vpcache") && path_str.ends_with("config.toml"),
            "Path should contain 'vpcache' and end with 'config.toml', got: {}",
            path_str
        );
    }
}

#[test]
fn load_config_file_returns_ok_none_for_missing_file() {
    let result = load_config_file("/nonexistent/path/to/config.toml");
    assert_eq!(
        result,
        Ok(None),
        "Missing config file should return Ok(None), not an error"
    );
}

#[test]
fn load_config_file_parses_valid_toml() {
    let temp_dir = env::temp_dir();
    let config_path = temp_dir.join("vpcache_test_config.toml");

    let toml_content = r#"
log_file_path = "/tmp/vpcache-test.log"
log_filter = "viewport_cache=debug"

[cache]
prefetch_margin = 32
"#;

    fs::write(&config_path, toml_content).expect("Failed to write test config");

    let config = load_config_file(&config_path)
        .expect("Should successfully parse valid TOML")
        .expect("Should return Some(ConfigFile) for existing file");

    assert_eq!(
        config.log_file_path,
        Some(PathBuf::from("/tmp/vpcache-test.log"))
    );
    assert_eq!(config.log_filter, Some("viewport_cache=debug".to_string()));
    assert_eq!(
        config.cache,
        Some(CacheSection {
            prefetch_margin: Some(32)
        })
    );

    fs::remove_file(config_path).ok();
}

#[test]
fn load_config_file_returns_error_for_invalid_toml() {
    let temp_dir = env::temp_dir();
    let config_path = temp_dir.join("vpcache_test_invalid.toml");

    fs::write(&config_path, "this is not valid TOML ][}{")
        .expect("Failed to write invalid test config");

    let result = load_config_file(&config_path);

    match result {
        Err(ConfigError::ParseError { path, reason: _ }) => {
            assert_eq!(path, config_path);
        }
        _ => panic!("Expected ParseError, got {:?}", result),
    }

    fs::remove_file(config_path).ok();
}

#[test]
fn load_config_file_handles_partial_config() {
    let temp_dir = env::temp_dir();
    let config_path = temp_dir.join("vpcache_test_partial.toml");

    fs::write(&config_path, "[cache]\n# margin omitted\n")
        .expect("Failed to write partial test config");

    let config = load_config_file(&config_path)
        .expect("Should parse partial config")
        .expect("File exists");
    assert_eq!(config.cache, Some(CacheSection::default()));
    assert_eq!(config.log_file_path, None);

    fs::remove_file(config_path).ok();
}

#[test]
fn merge_config_uses_defaults_when_none() {
    assert_eq!(merge_config(None), ResolvedConfig::default());
}

#[test]
fn merge_config_overrides_with_config_file_values() {
    let config_file = ConfigFile {
        log_file_path: None,
        log_filter: Some("warn".to_string()),
        cache: Some(CacheSection {
            prefetch_margin: Some(8),
        }),
    };

    let resolved = merge_config(Some(config_file));

    assert_eq!(resolved.cache.prefetch_margin, 8);
    assert_eq!(resolved.log_filter, "warn");
    assert_eq!(resolved.log_file_path, default_log_path());
}

#[test]
fn merge_config_uses_default_margin_for_empty_cache_section() {
    let config_file = ConfigFile {
        cache: Some(CacheSection::default()),
        ..ConfigFile::default()
    };

    let resolved = merge_config(Some(config_file));

    assert_eq!(resolved.cache, CacheConfig::default());
}

/// RAII guard to ensure environment variable cleanup even under test parallelism.
struct EnvGuard(&'static str);

impl EnvGuard {
    fn new(name: &'static str) -> Self {
        env::remove_var(name);
        EnvGuard(name)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        env::remove_var(self.0);
    }
}

#[test]
#[serial(vpcache_margin)]
fn apply_env_overrides_respects_prefetch_margin() {
    let _guard = EnvGuard::new(PREFETCH_MARGIN_ENV_VAR);
    env::set_var(PREFETCH_MARGIN_ENV_VAR, "12");

    let result = apply_env_overrides(ResolvedConfig::default()).expect("valid margin");

    assert_eq!(result.cache.prefetch_margin, 12);
}

#[test]
#[serial(vpcache_margin)]
fn apply_env_overrides_rejects_non_numeric_margin() {
    let _guard = EnvGuard::new(PREFETCH_MARGIN_ENV_VAR);
    env::set_var(PREFETCH_MARGIN_ENV_VAR, "-3");

    let result = apply_env_overrides(ResolvedConfig::default());

    match result {
        Err(ConfigError::InvalidValue { key, value, .. }) => {
            assert_eq!(key, PREFETCH_MARGIN_ENV_VAR);
            assert_eq!(value, "-3");
        }
        other => panic!("Expected InvalidValue, got {:?}", other),
    }
}

#[test]
#[serial(vpcache_margin)]
fn apply_env_overrides_no_change_when_env_var_not_set() {
    let _guard = EnvGuard::new(PREFETCH_MARGIN_ENV_VAR);

    let base = ResolvedConfig::default();
    let result = apply_env_overrides(base.clone()).expect("nothing to parse");

    assert_eq!(
        result, base,
        "Config should be unchanged when VPCACHE_PREFETCH_MARGIN not set"
    );
}

#[test]
fn apply_cli_overrides_wins_over_everything() {
    let base = ResolvedConfig {
        cache: CacheConfig { prefetch_margin: 5 },
        ..ResolvedConfig::default()
    };

    let result = apply_cli_overrides(base, Some(99), Some(PathBuf::from("cli.log")));

    assert_eq!(result.cache.prefetch_margin, 99);
    assert_eq!(result.log_file_path, PathBuf::from("cli.log"));
}

#[test]
fn apply_cli_overrides_keeps_values_without_flags() {
    let base = ResolvedConfig::default();
    assert_eq!(apply_cli_overrides(base.clone(), None, None), base);
}

#[test]
#[serial(vpcache_config)]
fn load_config_with_precedence_prefers_explicit_path() {
    let _guard = EnvGuard::new(CONFIG_ENV_VAR);

    let temp_dir = env::temp_dir();
    let explicit_path = temp_dir.join("vpcache_explicit.toml");
    fs::write(&explicit_path, "[cache]\nprefetch_margin = 1\n")
        .expect("Failed to write explicit config");

    let env_path = temp_dir.join("vpcache_env.toml");
    fs::write(&env_path, "[cache]\nprefetch_margin = 2\n").expect("Failed to write env config");
    env::set_var(CONFIG_ENV_VAR, &env_path);

    let config = load_config_with_precedence(Some(explicit_path.clone()))
        .expect("valid config")
        .expect("explicit file exists");
    assert_eq!(
        config.cache.and_then(|c| c.prefetch_margin),
        Some(1),
        "Should use explicit path, not VPCACHE_CONFIG env var"
    );

    fs::remove_file(explicit_path).ok();
    fs::remove_file(env_path).ok();
}

#[test]
#[serial(vpcache_config)]
fn load_config_with_precedence_uses_env_var_when_no_explicit_path() {
    let _guard = EnvGuard::new(CONFIG_ENV_VAR);

    let env_path = env::temp_dir().join("vpcache_env_only.toml");
    fs::write(&env_path, "log_filter = \"trace\"\n").expect("Failed to write env config");
    env::set_var(CONFIG_ENV_VAR, &env_path);

    let config = load_config_with_precedence(None)
        .expect("valid config")
        .expect("env file exists");
    assert_eq!(config.log_filter, Some("trace".to_string()));

    fs::remove_file(env_path).ok();
}

#[test]
fn config_file_rejects_unknown_fields() {
    let toml_with_unknown = r#"
[cache]
prefetch_margin = 4
eviction = "lru"
"#;

    let result: Result<ConfigFile, _> = toml::from_str(toml_with_unknown);
    assert!(
        result.is_err(),
        "Should reject TOML with unknown fields due to deny_unknown_fields"
    );
}
