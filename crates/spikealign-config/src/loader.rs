// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Two-tier loading: the TOML file supplies the base values, environment
//! variables override them at runtime.

use crate::{ConfigError, ConfigResult, SpikealignConfig};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "spikealign_configuration.toml";

/// Find the spikealign configuration file
///
/// Search order:
/// 1. `SPIKEALIGN_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Ancestor directories (up to 5 levels, for workspace roots)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("SPIKEALIGN_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by SPIKEALIGN_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd;
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent.to_path_buf();
                }
                None => break,
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");
    Err(ConfigError::FileNotFound(format!(
        "'{CONFIG_FILE_NAME}' not found in any of these locations:\n{search_list}\n\nSet SPIKEALIGN_CONFIG_PATH to specify a custom location."
    )))
}

/// Load configuration from a TOML file and apply environment overrides
///
/// # Arguments
///
/// * `config_path` - Optional path to the file. If `None`, searches for it.
///
/// # Errors
///
/// Returns an error if the file is missing or contains invalid TOML
pub fn load_config(config_path: Option<&Path>) -> ConfigResult<SpikealignConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: SpikealignConfig = toml::from_str(&content)?;
    apply_environment_overrides(&mut config);
    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `SPIKEALIGN_ALPHA` -> `analysis.alpha`
/// - `SPIKEALIGN_RESPONSE_S` -> `analysis.response_s`
/// - `SPIKEALIGN_BASE_SEED` -> `analysis.base_seed`
/// - `SPIKEALIGN_WORKER_THREADS` -> `batch.worker_threads`
/// - `SPIKEALIGN_LOG_LEVEL` -> `logging.log_level`
pub fn apply_environment_overrides(config: &mut SpikealignConfig) {
    if let Ok(value) = env::var("SPIKEALIGN_ALPHA") {
        if let Ok(alpha) = value.parse::<f64>() {
            config.analysis.alpha = alpha;
        }
    }
    if let Ok(value) = env::var("SPIKEALIGN_RESPONSE_S") {
        if let Ok(response_s) = value.parse::<f64>() {
            config.analysis.response_s = response_s;
        }
    }
    if let Ok(value) = env::var("SPIKEALIGN_BASE_SEED") {
        if let Ok(seed) = value.parse::<u64>() {
            config.analysis.base_seed = seed;
        }
    }
    if let Ok(value) = env::var("SPIKEALIGN_WORKER_THREADS") {
        if let Ok(threads) = value.parse::<usize>() {
            config.batch.worker_threads = threads;
        }
    }
    if let Ok(value) = env::var("SPIKEALIGN_LOG_LEVEL") {
        config.logging.log_level = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom_config.toml");
        File::create(&config_path).unwrap();

        env::set_var("SPIKEALIGN_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("SPIKEALIGN_CONFIG_PATH");

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_load_partial_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        env::remove_var("SPIKEALIGN_ALPHA");
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("spikealign_configuration.toml");

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[analysis]").unwrap();
        writeln!(file, "alpha = 0.01").unwrap();
        writeln!(file, "[psth]").unwrap();
        writeln!(file, "bin_s = 0.002").unwrap();

        let config = load_config(Some(&config_path)).unwrap();

        assert_eq!(config.analysis.alpha, 0.01);
        assert_eq!(config.psth.bin_s, 0.002);
        // untouched sections keep their defaults
        assert_eq!(config.analysis.baseline_min_trials, 8);
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = SpikealignConfig::default();

        env::set_var("SPIKEALIGN_ALPHA", "0.10");
        env::set_var("SPIKEALIGN_BASE_SEED", "1234");
        apply_environment_overrides(&mut config);
        env::remove_var("SPIKEALIGN_ALPHA");
        env::remove_var("SPIKEALIGN_BASE_SEED");

        assert_eq!(config.analysis.alpha, 0.10);
        assert_eq!(config.analysis.base_seed, 1234);
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("spikealign_configuration.toml");
        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[analysis").unwrap();

        assert!(matches!(
            load_config(Some(&config_path)),
            Err(ConfigError::ParseError(_))
        ));
    }
}
