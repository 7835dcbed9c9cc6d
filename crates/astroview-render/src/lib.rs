//! Astroview Render - Scene Rendering Layer
//!
//! This crate provides the rendering side of Astroview, including:
//! - wgpu backend selection and device bring-up
//! - Camera rigs for the side, top and free views
//! - Astrobee model loading (OBJ) with a procedural fallback
//! - The forward scene renderer

use thiserror::Error;

pub mod backend;
pub mod camera;
pub mod model;
pub mod scene_renderer;

pub use backend::WgpuBackend;
pub use camera::{Camera, OrbitRig};
pub use model::{load_astrobee, MeshData, ModelPart};
pub use scene_renderer::{GpuPart, SceneRenderer};

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Device error: {0}")]
    Device(String),

    #[error("Surface error: {0}")]
    Surface(String),

    #[error("Model loading failed: {0}")]
    ModelLoad(String),
}

/// Result type for rendering operations
pub type Result<T> = std::result::Result<T, RenderError>;

/// Re-export commonly used wgpu types
pub use wgpu::{
    CommandEncoder, CompositeAlphaMode, Device, PresentMode, Queue, Surface,
    SurfaceConfiguration, Texture, TextureFormat, TextureUsages, TextureView,
};
