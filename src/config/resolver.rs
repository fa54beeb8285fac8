//! Precedence resolution for configuration.
//!
//! ## Config file location (highest to lowest)
//!
//! 1. `--config` CLI flag
//! 2. `THREADS_CONFIG` environment variable
//! 3. `<config_dir>/threads-mcp/config.kdl` (e.g. `~/.config/threads-mcp/config.kdl`)
//!
//! ## Data directory (highest to lowest)
//!
//! 1. `--data-dir` CLI flag
//! 2. `THREADS_DATA_DIR` environment variable
//! 3. `data-dir` in config.kdl
//! 4. `~/.threads`
//!
//! ## Log level (highest to lowest)
//!
//! 1. `RUST_LOG` environment variable
//! 2. `log-level` in config.kdl
//! 3. `warn`

use std::path::{Path, PathBuf};

use crate::config::ThreadsConfig;
use crate::storage::StorePaths;
use crate::{Error, Result};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "THREADS_DATA_DIR";

/// Environment variable overriding the config file path.
pub const CONFIG_PATH_ENV: &str = "THREADS_CONFIG";

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "RUST_LOG";

/// Log level used when nothing else sets one.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Directory name under the home directory used when nothing else sets one.
pub const DEFAULT_DATA_DIR_NAME: &str = ".threads";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from environment variable
    EnvVar(String),
    /// Value from the config file at this path
    ConfigFile(PathBuf),
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::ConfigFile(path) => write!(f, "config:{}", path.display()),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Data directory from `--data-dir`
    pub data_dir: Option<PathBuf>,
    /// Config file from `--config`
    pub config_path: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set data directory override.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Set config file override.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Config file consulted, if a location could be determined
    pub config_file: Option<Resolved<PathBuf>>,
    /// Directory holding the data file and its backup
    pub data_dir: Resolved<PathBuf>,
    /// Tracing filter directive
    pub log_level: Resolved<String>,
}

impl ResolvedConfig {
    /// File locations for a store rooted at the resolved data directory.
    pub fn store_paths(&self) -> StorePaths {
        StorePaths::in_dir(&self.data_dir.value)
    }

    pub fn log_level(&self) -> &str {
        &self.log_level.value
    }
}

/// Resolve configuration against the process environment.
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    resolve_config_with_env(overrides, |name| std::env::var(name).ok())
}

/// Resolve configuration with an explicit environment lookup.
///
/// Empty environment values are treated as unset.
pub fn resolve_config_with_env<F>(overrides: &ConfigOverrides, env: F) -> Result<ResolvedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| env(name).filter(|v| !v.is_empty());

    // Locate the config file
    let config_file = if let Some(ref path) = overrides.config_path {
        Some(Resolved::new(path.clone(), ValueSource::CliFlag))
    } else if let Some(path) = lookup(CONFIG_PATH_ENV) {
        Some(Resolved::new(
            expand_home(&path),
            ValueSource::EnvVar(CONFIG_PATH_ENV.to_string()),
        ))
    } else {
        default_config_path().map(|p| Resolved::new(p, ValueSource::Default))
    };

    let file_config = match config_file {
        Some(ref file) => ThreadsConfig::load_from_path(&file.value)?,
        None => ThreadsConfig::default(),
    };
    let file_source = || {
        config_file
            .as_ref()
            .map(|f| ValueSource::ConfigFile(f.value.clone()))
            .unwrap_or(ValueSource::Default)
    };

    // Resolve data_dir
    let data_dir = if let Some(ref dir) = overrides.data_dir {
        Resolved::new(dir.clone(), ValueSource::CliFlag)
    } else if let Some(dir) = lookup(DATA_DIR_ENV) {
        Resolved::new(
            expand_home(&dir),
            ValueSource::EnvVar(DATA_DIR_ENV.to_string()),
        )
    } else if let Some(ref dir) = file_config.data_dir {
        Resolved::new(expand_home(dir), file_source())
    } else {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("cannot determine home directory".to_string()))?;
        Resolved::new(home.join(DEFAULT_DATA_DIR_NAME), ValueSource::Default)
    };

    // Resolve log_level
    let log_level = if let Some(filter) = lookup(LOG_ENV) {
        Resolved::new(filter, ValueSource::EnvVar(LOG_ENV.to_string()))
    } else if let Some(ref level) = file_config.log_level {
        Resolved::new(level.to_lowercase(), file_source())
    } else {
        Resolved::new(DEFAULT_LOG_LEVEL.to_string(), ValueSource::Default)
    };

    Ok(ResolvedConfig {
        config_file,
        data_dir,
        log_level,
    })
}

/// Default config file location, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("threads-mcp").join("config.kdl"))
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/")
    };
    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => Path::new(path).to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    /// Overrides pointing at a config file inside `dir` (which may not exist).
    fn isolated(dir: &TempDir) -> ConfigOverrides {
        ConfigOverrides::new().with_config_path(dir.path().join("config.kdl"))
    }

    // ==================== ValueSource Tests ====================

    #[test]
    fn test_value_source_display() {
        assert_eq!(format!("{}", ValueSource::CliFlag), "cli");
        assert_eq!(
            format!("{}", ValueSource::EnvVar("FOO".to_string())),
            "env:FOO"
        );
        assert_eq!(
            format!("{}", ValueSource::ConfigFile(PathBuf::from("/etc/t.kdl"))),
            "config:/etc/t.kdl"
        );
        assert_eq!(format!("{}", ValueSource::Default), "default");
    }

    // ==================== Resolution Tests ====================

    #[test]
    fn test_resolve_defaults() {
        let dir = TempDir::new().unwrap();
        let config = resolve_config_with_env(&isolated(&dir), env_from(&[])).unwrap();

        assert_eq!(config.data_dir.source, ValueSource::Default);
        assert!(config.data_dir.value.ends_with(DEFAULT_DATA_DIR_NAME));
        assert_eq!(config.log_level(), "warn");
        assert_eq!(config.log_level.source, ValueSource::Default);
        assert_eq!(config.config_file.unwrap().source, ValueSource::CliFlag);
    }

    #[test]
    fn test_resolve_from_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.kdl");
        std::fs::write(&path, "data-dir \"/srv/threads\"\nlog-level \"INFO\"\n").unwrap();

        let config = resolve_config_with_env(&isolated(&dir), env_from(&[])).unwrap();

        assert_eq!(config.data_dir.value, PathBuf::from("/srv/threads"));
        assert_eq!(config.data_dir.source, ValueSource::ConfigFile(path.clone()));
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.log_level.source, ValueSource::ConfigFile(path));
    }

    #[test]
    fn test_env_overrides_config_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.kdl"),
            "data-dir \"/srv/threads\"\nlog-level \"info\"\n",
        )
        .unwrap();

        let env = env_from(&[(DATA_DIR_ENV, "/from/env"), (LOG_ENV, "threads=debug")]);
        let config = resolve_config_with_env(&isolated(&dir), env).unwrap();

        assert_eq!(config.data_dir.value, PathBuf::from("/from/env"));
        assert_eq!(
            config.data_dir.source,
            ValueSource::EnvVar(DATA_DIR_ENV.to_string())
        );
        assert_eq!(config.log_level(), "threads=debug");
    }

    #[test]
    fn test_cli_overrides_env() {
        let dir = TempDir::new().unwrap();
        let overrides = isolated(&dir).with_data_dir("/from/cli");
        let env = env_from(&[(DATA_DIR_ENV, "/from/env")]);

        let config = resolve_config_with_env(&overrides, env).unwrap();

        assert_eq!(config.data_dir.value, PathBuf::from("/from/cli"));
        assert_eq!(config.data_dir.source, ValueSource::CliFlag);
        assert_eq!(
            config.store_paths(),
            StorePaths::in_dir(Path::new("/from/cli"))
        );
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let dir = TempDir::new().unwrap();
        let env = env_from(&[(DATA_DIR_ENV, ""), (LOG_ENV, "")]);
        let config = resolve_config_with_env(&isolated(&dir), env).unwrap();

        assert_eq!(config.data_dir.source, ValueSource::Default);
        assert_eq!(config.log_level.source, ValueSource::Default);
    }

    #[test]
    fn test_config_path_from_env() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("elsewhere.kdl");
        std::fs::write(&path, "log-level \"trace\"").unwrap();

        let env = env_from(&[(CONFIG_PATH_ENV, path.to_str().unwrap())]);
        let config = resolve_config_with_env(&ConfigOverrides::new(), env).unwrap();

        let file = config.config_file.as_ref().unwrap();
        assert_eq!(file.value, path);
        assert_eq!(
            file.source,
            ValueSource::EnvVar(CONFIG_PATH_ENV.to_string())
        );
        assert_eq!(config.log_level(), "trace");
    }

    #[test]
    fn test_invalid_config_file_is_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.kdl"), "data-dir {").unwrap();

        let err = resolve_config_with_env(&isolated(&dir), env_from(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_expand_home() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_home("~"), home);
        assert_eq!(expand_home("~/data"), home.join("data"));
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_home("~user/x"), PathBuf::from("~user/x"));
    }

    #[test]
    #[serial]
    fn test_resolve_config_reads_process_env() {
        let dir = TempDir::new().unwrap();
        // SAFETY: serialized with other tests touching the process environment
        unsafe { std::env::set_var(DATA_DIR_ENV, dir.path()) };

        let config = resolve_config(&isolated(&dir)).unwrap();
        assert_eq!(config.data_dir.value, dir.path());

        unsafe { std::env::remove_var(DATA_DIR_ENV) };
    }
}
