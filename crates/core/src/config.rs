use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LogstatError, Result};

pub const DEFAULT_MONGO_URI: &str = "mongodb://127.0.0.1:27017";
pub const DEFAULT_DATABASE: &str = "logs";
pub const DEFAULT_COLLECTION: &str = "nginx";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub mongo_uri: String,
    pub database: String,
    pub collection: String,
    pub connect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mongo_uri: DEFAULT_MONGO_URI.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();
        let config_path = config_file_path();
        if let Some(file_overrides) = load_file_overrides(&config_path)? {
            apply_overrides(&mut cfg, file_overrides, "config file")?;
        }
        let env_overrides = load_env_overrides();
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        Ok(cfg)
    }

    pub fn namespace(&self) -> String {
        format!("{}.{}", self.database, self.collection)
    }

    pub fn validate(&self) -> Result<()> {
        if self.mongo_uri.trim().is_empty() {
            return Err(LogstatError::Config("mongo_uri cannot be empty".to_string()));
        }
        if self.database.trim().is_empty() {
            return Err(LogstatError::Config("database cannot be empty".to_string()));
        }
        if self.collection.trim().is_empty() {
            return Err(LogstatError::Config(
                "collection cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOverrides {
    mongo_uri: Option<String>,
    database: Option<String>,
    collection: Option<String>,
    connect_timeout: Option<String>,
}

fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("LOGSTAT_CONFIG") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home).join(".config"));
    config_home.join("logstat/config.toml")
}

fn load_file_overrides(path: &Path) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| LogstatError::Config(format!("failed reading {}: {e}", path.display())))?;
    let parsed: ConfigOverrides = toml::from_str(&raw)
        .map_err(|e| LogstatError::Config(format!("failed parsing {}: {e}", path.display())))?;
    Ok(Some(parsed))
}

fn load_env_overrides() -> ConfigOverrides {
    ConfigOverrides {
        mongo_uri: env::var("LOGSTAT_MONGO_URI").ok(),
        database: env::var("LOGSTAT_DATABASE").ok(),
        collection: env::var("LOGSTAT_COLLECTION").ok(),
        connect_timeout: env::var("LOGSTAT_CONNECT_TIMEOUT").ok(),
    }
}

fn apply_overrides(cfg: &mut Config, overrides: ConfigOverrides, source: &str) -> Result<()> {
    if let Some(v) = overrides.mongo_uri {
        cfg.mongo_uri = v;
    }
    if let Some(v) = overrides.database {
        cfg.database = v;
    }
    if let Some(v) = overrides.collection {
        cfg.collection = v;
    }
    if let Some(v) = overrides.connect_timeout {
        cfg.connect_timeout = parse_duration_str(&v).map_err(|e| {
            LogstatError::Config(format!("bad connect_timeout in {source}: {e}"))
        })?;
    }
    Ok(())
}

pub fn parse_duration_str(input: &str) -> Result<Duration> {
    humantime::parse_duration(input)
        .map_err(|e| LogstatError::Parse(format!("invalid duration {input}: {e}")))
}
