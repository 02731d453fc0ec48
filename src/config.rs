use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the JSON config file.
pub const CONFIG_ENV: &str = "QUAKE_EXPLORER_CONFIG";
/// Environment variable overriding `data_path`.
pub const DATA_ENV: &str = "QUAKE_EXPLORER_DATA";
/// Config file looked up in the working directory when `CONFIG_ENV` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "quake-explorer.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Startup configuration. Every field has a default, so a partial file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Event table loaded at startup.
    pub data_path: PathBuf,
    /// Year shown first. Defaults to the latest year in the data.
    pub initial_year: Option<i32>,
    pub playback: PlaybackConfig,
    pub map: MapConfig,
    pub window: WindowConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub initial_interval_ms: u64,
    /// Floor for speed-up.
    pub min_interval_ms: u64,
    pub step_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Marker radius in points for the smallest magnitude.
    pub min_marker_radius: f32,
    /// Marker radius in points for the largest magnitude.
    pub max_marker_radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/2024-2025.csv"),
            initial_year: None,
            playback: PlaybackConfig::default(),
            map: MapConfig::default(),
            window: WindowConfig::default(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: 100,
            min_interval_ms: 50,
            step_ms: 50,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            min_marker_radius: 3.0,
            max_marker_radius: 30.0,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1400.0,
            height: 900.0,
        }
    }
}

impl ExplorerConfig {
    /// Resolve the config from the environment.
    ///
    /// Order: file named by `QUAKE_EXPLORER_CONFIG`, else `quake-explorer.json`
    /// if it exists, else defaults. `QUAKE_EXPLORER_DATA` then overrides the
    /// data path.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                log::info!("no config file, using defaults");
                Self::default()
            }
        };
        config = config.with_data_override(std::env::var_os(DATA_ENV));
        config.validate()?;
        Ok(config)
    }

    /// [`ExplorerConfig::load`], falling back to defaults on error. The
    /// `QUAKE_EXPLORER_DATA` override still applies to the fallback.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            log::error!("{e}; falling back to default configuration");
            Self::default().with_data_override(std::env::var_os(DATA_ENV))
        })
    }

    /// Replace `data_path` when an override is given.
    pub fn with_data_override(mut self, data: Option<OsString>) -> Self {
        if let Some(data) = data {
            self.data_path = PathBuf::from(data);
        }
        self
    }

    /// Read and validate a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.playback;
        if p.step_ms == 0 {
            return Err(ConfigError::Invalid("playback.step_ms must be positive".into()));
        }
        if p.min_interval_ms == 0 {
            return Err(ConfigError::Invalid("playback.min_interval_ms must be positive".into()));
        }
        if p.initial_interval_ms < p.min_interval_ms {
            return Err(ConfigError::Invalid(format!(
                "playback.initial_interval_ms ({}) is below min_interval_ms ({})",
                p.initial_interval_ms, p.min_interval_ms
            )));
        }
        let m = &self.map;
        if !(m.min_marker_radius > 0.0) || !(m.max_marker_radius >= m.min_marker_radius) {
            return Err(ConfigError::Invalid(format!(
                "map marker radii must satisfy 0 < min <= max, got {} / {}",
                m.min_marker_radius, m.max_marker_radius
            )));
        }
        Ok(())
    }
}
