//! Astroview Core - Frame Loop and Viewer Domain Model
//!
//! This crate contains the rendering-agnostic core of Astroview:
//! - Frame loop scheduler driving per-frame callbacks
//! - Scene rotation and camera-view state
//! - Persisted viewer settings
//! - Logging configuration

#![warn(missing_docs)]

use thiserror::Error;

pub mod frame_loop;
pub mod logging;
pub mod scene;
pub mod state;

// --- Re-exports grouped by category ---

// Frame loop
pub use frame_loop::{AnimationFnId, BaseFnId, FrameFlow, FrameLoop, FrameTick};

// Scene
pub use scene::{CameraView, RotationDirection, SceneState, DEFAULT_SPIN_DEG_PER_SEC};

// Settings & Logging
pub use logging::LogConfig;
pub use state::ViewerSettings;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// Filesystem access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A configuration value is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
