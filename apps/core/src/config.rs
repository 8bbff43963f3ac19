use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Parse(error) => write!(f, "parse error: {error}"),
            Self::Invalid(error) => write!(f, "invalid config: {error}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Runtime configuration. `profile_id` and `include_history` come from the
/// settings surface the host owns; the paths tell the core where the places
/// snapshot and its own durable state live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub profile_id: String,
    pub include_history: bool,
    pub max_results: u16,
    pub places_db_path: PathBuf,
    pub frequency_path: PathBuf,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let base = stable_app_data_dir();
        Self {
            profile_id: String::new(),
            include_history: false,
            max_results: 20,
            places_db_path: base.join("places.sqlite"),
            frequency_path: base.join("frequency.json"),
            config_path: base.join("config.toml"),
        }
    }
}

pub fn stable_app_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("FOXFIND_DATA_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    if let Ok(appdata) = std::env::var("APPDATA") {
        if !appdata.is_empty() {
            return PathBuf::from(appdata).join("foxfind");
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("foxfind");
        }
    }
    std::env::temp_dir().join("foxfind")
}

pub fn validate(cfg: &Config) -> Result<(), String> {
    if cfg.max_results < 5 || cfg.max_results > 100 {
        return Err("max_results out of range".into());
    }

    if cfg.places_db_path.as_os_str().is_empty() {
        return Err("places_db_path is required".into());
    }

    if cfg.frequency_path.as_os_str().is_empty() {
        return Err("frequency_path is required".into());
    }

    Ok(())
}

/// Loads the config from `path` (or the default location). A missing file
/// yields the defaults; a present but malformed file is an error so a typo
/// never silently reverts the user's settings.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Config::default().config_path);

    if !config_path.exists() {
        let mut cfg = Config::default();
        cfg.config_path = config_path;
        return Ok(cfg);
    }

    let raw = std::fs::read_to_string(&config_path)?;
    let mut cfg: Config =
        toml::from_str(&raw).map_err(|error| ConfigError::Parse(error.to_string()))?;
    cfg.config_path = config_path;
    validate(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    let encoded =
        toml::to_string_pretty(cfg).map_err(|error| ConfigError::Parse(error.to_string()))?;
    if let Some(parent) = cfg.config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&cfg.config_path, encoded)?;
    Ok(())
}
