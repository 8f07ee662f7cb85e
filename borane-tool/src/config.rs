use std::path::{Path, PathBuf};

use borane_client::DEFAULT_BASE_URL;
use borane_core::{BusinessRules, SlotGrid, UserId};
use serde::Deserialize;
use tracing::warn;

use crate::error::BrnError;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub rules: BusinessRules,
    #[serde(default)]
    pub grid: SlotGrid,
    #[serde(default)]
    pub log: LogConfig,
    /// Problems found while loading, logged once logging is up
    #[serde(skip)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UserConfig {
    pub id: Option<UserId>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LogConfig {
    /// `tracing` filter directive, e.g. `"borane_client=debug"`
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

/// Values given on the command line; they win over env and config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub user_id: Option<UserId>,
}

/// Everything the commands need, resolved from flags, env and config.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub user_id: Option<UserId>,
    pub user_name: Option<String>,
    pub rules: BusinessRules,
    pub grid: SlotGrid,
    pub log_filter: Option<String>,
    pub log_file: PathBuf,
    /// Config values that were ignored, in the order they were found
    pub warnings: Vec<String>,
}

impl Settings {
    pub fn require_user(&self) -> Result<UserId, BrnError> {
        self.user_id.ok_or(BrnError::UserNotConfigured)
    }

    /// Replays the config fallbacks through `tracing`.
    ///
    /// Settings are resolved before the subscriber exists, so this has to be
    /// called after `init_logging`.
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            warn!("{warning}");
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("borane").join("config.toml"))
}

pub fn default_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("borane")
        .join("brn.log")
}

pub fn parse_config(content: &str) -> Result<Config, BrnError> {
    Ok(toml::from_str(content)?)
}

pub fn load_config_from(path: &Path) -> Config {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Config::default();
    };

    match parse_config(&content) {
        Ok(config) => config,
        Err(e) => Config {
            warnings: vec![format!(
                "Ignoring unreadable config {}: {e}",
                path.display()
            )],
            ..Config::default()
        },
    }
}

pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    load_config_from(&path)
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn resolve_settings(overrides: Overrides, config: Config) -> Settings {
    let mut warnings = config.warnings;

    let api_url = overrides
        .api_url
        .or_else(|| env_value("BORANE_API_URL"))
        .or(config.api_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let env_user = env_value("BORANE_USER_ID").and_then(|v| match v.trim().parse() {
        Ok(id) => Some(id),
        Err(_) => {
            warnings.push(format!("Ignoring non-numeric BORANE_USER_ID {v:?}"));
            None
        }
    });
    let user_id = overrides.user_id.or(env_user).or(config.user.id);

    let rules = if config.rules.is_consistent() {
        config.rules
    } else {
        warnings.push(format!(
            "Inconsistent booking rules in config, using defaults: {:?}",
            config.rules
        ));
        BusinessRules::default()
    };

    let grid = if config.grid.is_valid() {
        config.grid
    } else {
        warnings.push(format!(
            "Invalid timeline grid in config, using defaults: {:?}",
            config.grid
        ));
        SlotGrid::default()
    };

    Settings {
        api_url,
        user_id,
        user_name: config.user.name,
        rules,
        grid,
        log_filter: config.log.level,
        log_file: config.log.file.unwrap_or_else(default_log_path),
        warnings,
    }
}
