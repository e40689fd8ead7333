use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    APP_NAME, CACHE_DIR_NAME, CONFIG_ENV_PREFIX, CONFIG_FILE_NAME, DEFAULT_SOURCE_EXTENSION,
    LOCAL_CONFIG_FILE,
};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding cache entries
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Extension (without the dot) of the source files to fingerprint
    #[serde(default = "default_source_extension")]
    pub source_extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            source_extension: default_source_extension(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join(CACHE_DIR_NAME)
}

fn default_source_extension() -> String {
    DEFAULT_SOURCE_EXTENSION.to_string()
}

/// Load configuration from multiple sources
///
/// Defaults, then the global config file, then `.cachedcomplete.toml` in
/// the current directory, then `CACHEDCOMPLETE_*` environment variables.
pub fn load_config() -> Result<Config> {
    let global_config = get_config_dir().ok().map(|dir| dir.join(CONFIG_FILE_NAME));
    let local_config = PathBuf::from(LOCAL_CONFIG_FILE);

    load_layered(global_config.as_deref(), Some(&local_config))
}

/// Load configuration from a single explicit file (plus environment)
pub fn load_config_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Configuration file not found: {}", path.display());
    }
    load_layered(Some(path), None)
}

fn load_layered(global: Option<&Path>, local: Option<&Path>) -> Result<Config> {
    // Build figment configuration
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    for path in [global, local].into_iter().flatten() {
        if path.exists() {
            figment = figment.merge(Toml::file(path));
        }
    }

    figment = figment.merge(Env::prefixed(CONFIG_ENV_PREFIX));

    figment
        .extract()
        .context("Failed to load configuration")
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", APP_NAME) {
        Ok(proj_dirs.config_dir().to_path_buf())
    } else {
        // Fallback to home directory
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        Ok(PathBuf::from(home).join(".config").join(APP_NAME))
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<PathBuf> {
    let path = match path {
        Some(p) => p,
        None => get_config_dir()?.join(CONFIG_FILE_NAME),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(path)
}

/// Create a default configuration file if it doesn't exist
///
/// Returns the config path and whether it was newly written.
pub fn init_config() -> Result<(PathBuf, bool)> {
    let config_file = get_config_dir()?.join(CONFIG_FILE_NAME);
    if config_file.exists() {
        return Ok((config_file, false));
    }

    let path = save_config(&Config::default(), Some(config_file))?;
    Ok((path, true))
}
