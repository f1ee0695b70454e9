// Configuration loading and parsing (config/acecast.toml).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Name of the single config file under `config/` and `defaults/`.
const CONFIG_FILE: &str = "acecast.toml";

/// Database file name used when no explicit path is configured.
const DEFAULT_DB_FILE: &str = "acecast.db";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },

    #[error("could not determine a data directory for the database")]
    NoDataDir,
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub sources: SourcesConfig,
    #[serde(default)]
    pub prediction: PredictionConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub data_paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub stats_base_url: String,
    pub weather_base_url: String,
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    concat!("acecast/", env!("CARGO_PKG_VERSION")).to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionConfig {
    /// Whether weather is fetched when the caller does not say otherwise.
    pub include_weather: bool,
    /// How many recent appearances make up a pitcher's recent form.
    pub recent_appearances: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            include_weather: true,
            recent_appearances: 3,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// Explicit database path. When omitted the platform data directory is
    /// used.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub venues: String,
}

impl Config {
    /// Where the prediction database lives: the configured path, or
    /// `acecast.db` in the platform's per-user data directory.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database.path {
            return Ok(PathBuf::from(path));
        }
        let dirs = directories::ProjectDirs::from("", "", "acecast").ok_or(ConfigError::NoDataDir)?;
        Ok(dirs.data_dir().join(DEFAULT_DB_FILE))
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/acecast.toml` relative to `base_dir`.
///
/// This does not copy defaults; prefer `load_config()` for normal startup.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config = parse_config(&text, &path)?;
    validate(&config)?;
    Ok(config)
}

/// Parse config text. `path` is only used in error messages.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Make sure `config/acecast.toml` exists, seeding it from
/// `defaults/acecast.toml` when it does not. Returns the path written, or
/// `None` when the config was already in place. Never overwrites.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.exists() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(CONFIG_FILE);
    let copy_error = |message: String| ConfigError::DefaultsCopyError { message };
    let content = std::fs::read(&source).map_err(|e| {
        copy_error(format!(
            "no config/{CONFIG_FILE} and cannot read {}: {e}; \
             run from the project root",
            source.display()
        ))
    })?;

    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir)
            .map_err(|e| copy_error(format!("failed to create {}: {e}", dir.display())))?;
    }

    // create_new: a config written concurrently by another process wins.
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(dest) => dest,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(None),
        Err(e) => return Err(copy_error(format!("failed to create {}: {e}", target.display()))),
    };
    std::io::Write::write_all(&mut dest, &content)
        .map_err(|e| copy_error(format!("failed to write {}: {e}", target.display())))?;
    Ok(Some(target))
}

/// Load config relative to the current working directory, seeding it from
/// `defaults/` first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_file(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let sources = &config.sources;
    if sources.stats_base_url.trim().is_empty() {
        return Err(invalid("sources.stats_base_url", "must not be empty"));
    }
    if sources.weather_base_url.trim().is_empty() {
        return Err(invalid("sources.weather_base_url", "must not be empty"));
    }
    if sources.request_timeout_secs == 0 {
        return Err(invalid("sources.request_timeout_secs", "must be greater than 0"));
    }
    if config.prediction.recent_appearances == 0 {
        return Err(invalid(
            "prediction.recent_appearances",
            "must be greater than 0",
        ));
    }
    if config.data_paths.venues.trim().is_empty() {
        return Err(invalid("data_paths.venues", "must not be empty"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
