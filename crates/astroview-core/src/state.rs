//! Persisted viewer settings.
//!
//! This module defines the preferences written to the platform config
//! directory as JSON and restored on startup.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::logging::LogConfig;
use crate::scene::{CameraView, RotationDirection, DEFAULT_SPIN_DEG_PER_SEC};
use crate::{CoreError, Result};

/// User preferences for the viewer, persisted across sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewerSettings {
    /// Whether the model spins on startup.
    pub rotation_enabled: bool,
    /// Spin direction.
    pub rotation_direction: RotationDirection,
    /// Camera view restored on startup.
    pub view: CameraView,
    /// Spin rate in degrees per second.
    pub spin_deg_per_sec: f32,
    /// Initial window width in physical pixels.
    pub window_width: u32,
    /// Initial window height in physical pixels.
    pub window_height: u32,
    /// Present with vsync (Fifo) instead of immediate mode.
    pub vsync: bool,
    /// Logging options.
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            rotation_enabled: true,
            rotation_direction: RotationDirection::Clockwise,
            view: CameraView::Side,
            spin_deg_per_sec: DEFAULT_SPIN_DEG_PER_SEC,
            window_width: 1280,
            window_height: 720,
            vsync: true,
            log: LogConfig::default(),
        }
    }
}

impl ViewerSettings {
    /// Location of the settings file, `None` when the platform exposes no
    /// config directory.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("astroview").join("settings.json"))
    }

    /// Load settings from the default location, falling back to defaults
    /// (with a warning) when the file is missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            warn!("Could not determine config directory, using default settings");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load settings from {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Load settings from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Save settings to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().ok_or_else(|| {
            CoreError::InvalidConfig("no config directory available".to_string())
        })?;
        self.save_to(&path)
    }

    /// Save settings to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}
