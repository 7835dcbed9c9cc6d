//! Main window and surface management.

use anyhow::Result;
use astroview_core::ViewerSettings;
use astroview_render::WgpuBackend;
use std::sync::Arc;
use tracing::info;
use winit::{dpi::PhysicalSize, event_loop::ActiveEventLoop, window::Window};

/// The viewer window together with its configured wgpu surface.
pub struct WindowContext {
    /// The winit window.
    pub window: Arc<Window>,
    /// The wgpu surface presented to the window.
    pub surface: wgpu::Surface<'static>,
    /// The surface configuration, updated on resize.
    pub surface_config: wgpu::SurfaceConfiguration,
}

impl WindowContext {
    /// Create the main window and configure its surface.
    pub fn new(
        elwt: &ActiveEventLoop,
        backend: &WgpuBackend,
        settings: &ViewerSettings,
    ) -> Result<Self> {
        let attributes = Window::default_attributes()
            .with_title("Astroview")
            .with_inner_size(PhysicalSize::new(
                settings.window_width.max(1),
                settings.window_height.max(1),
            ));
        let window = Arc::new(elwt.create_window(attributes)?);

        let size = window.inner_size();
        let surface = backend.create_surface(window.clone())?;
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: backend.surface_format(),
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if settings.vsync {
                wgpu::PresentMode::Fifo
            } else {
                wgpu::PresentMode::Immediate
            },
            alpha_mode: wgpu::CompositeAlphaMode::Opaque,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&backend.device, &surface_config);

        info!(
            "Created main window ({}x{})",
            surface_config.width, surface_config.height
        );

        Ok(Self {
            window,
            surface,
            surface_config,
        })
    }

    /// Reconfigure the surface for a new size. Returns `false` for
    /// zero-sized (minimized) windows, which keep the old configuration.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(device, &self.surface_config);
        true
    }
}
