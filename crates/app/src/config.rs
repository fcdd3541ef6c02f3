//! Persisted preferences and last-used geometry
//!
//! Stored as pretty-printed JSON:
//! `{ "rectangle": {x, y, width, height, monitor?}, "dialog": {...} }`

use capture::{CaptureOptions, Rect, CAPTURE_DELAY_SECONDS};
use overlay::SavedGeometry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "regionsnap";
const CONFIG_FILE: &str = "screenshot_config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No configuration directory on this system")]
    NoConfigDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Rectangle in a config record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RectConfig {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl From<Rect> for RectConfig {
    fn from(r: Rect) -> Self {
        Self { x: r.x, y: r.y, width: r.width, height: r.height }
    }
}

impl From<RectConfig> for Rect {
    fn from(r: RectConfig) -> Self {
        Rect::new(r.x, r.y, r.width, r.height)
    }
}

/// Last confirmed selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RectangleConfig {
    #[serde(flatten)]
    pub rect: RectConfig,
    /// Native bounds of the monitor it was confirmed on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor: Option<RectConfig>,
}

/// Options panel state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    pub capture_pointer: bool,
    pub save_clipboard: bool,
    pub save_folder: bool,
    pub folder_path: PathBuf,
    /// Take the screenshot after a fixed delay
    pub delay_screenshot: bool,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            capture_pointer: false,
            save_clipboard: true,
            save_folder: false,
            folder_path: default_folder(),
            delay_screenshot: false,
        }
    }
}

fn default_folder() -> PathBuf {
    dirs::desktop_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Absent until the first confirmed session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rectangle: Option<RectangleConfig>,
    #[serde(default)]
    pub dialog: DialogConfig,
}

impl Config {
    pub fn saved_geometry(&self) -> Option<SavedGeometry> {
        self.rectangle.map(|r| SavedGeometry {
            rect: r.rect.into(),
            monitor: r.monitor.map(Rect::from),
        })
    }

    pub fn set_geometry(&mut self, geometry: SavedGeometry) {
        self.rectangle = Some(RectangleConfig {
            rect: geometry.rect.into(),
            monitor: geometry.monitor.map(RectConfig::from),
        });
    }

    /// Capture options for the next confirm
    pub fn options(&self) -> CaptureOptions {
        CaptureOptions {
            capture_pointer: self.dialog.capture_pointer,
            save_to_clipboard: self.dialog.save_clipboard,
            save_to_file: self.dialog.save_folder,
            target_folder: self.dialog.folder_path.clone(),
            delay_seconds: if self.dialog.delay_screenshot { CAPTURE_DELAY_SECONDS } else { 0 },
        }
    }
}

/// JSON file holding a [`Config`]
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/regionsnap/screenshot_config.json`
    pub fn default_location() -> ConfigResult<Self> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::new(dir.join(APP_DIR).join(CONFIG_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, using defaults if it is missing or unreadable
    pub fn load(&self) -> Config {
        match self.try_load() {
            Ok(config) => config,
            Err(ConfigError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {:?}, using defaults", self.path);
                Config::default()
            }
            Err(err) => {
                log::warn!("Failed to load config from {:?}: {}, using defaults", self.path, err);
                Config::default()
            }
        }
    }

    pub fn try_load(&self) -> ConfigResult<Config> {
        let text = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, text)?;
        log::debug!("Saved config to {:?}", self.path);
        Ok(())
    }
}
