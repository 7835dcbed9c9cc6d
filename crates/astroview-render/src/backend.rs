//! Rendering backend bring-up.

use std::sync::Arc;

use tracing::info;

use crate::{RenderError, Result};

/// wgpu device, queue and instance shared by the renderer and the surface.
pub struct WgpuBackend {
    /// The wgpu instance, kept for surface creation.
    pub instance: Arc<wgpu::Instance>,
    /// The logical device.
    pub device: Arc<wgpu::Device>,
    /// The command queue.
    pub queue: Arc<wgpu::Queue>,
    /// Information about the selected adapter.
    pub adapter_info: wgpu::AdapterInfo,
}

impl WgpuBackend {
    /// Create a new wgpu backend.
    ///
    /// Tries every backend except GL first, since GL initialization can
    /// panic eagerly on headless systems, and falls back to GL for older
    /// hardware when that fails.
    pub async fn new() -> Result<Self> {
        let safe_backends = wgpu::Backends::all() & !wgpu::Backends::GL;
        let primary_result =
            Self::new_with_options(safe_backends, wgpu::PowerPreference::HighPerformance).await;

        if primary_result.is_ok() {
            return primary_result;
        }

        info!("Primary backend initialization failed, attempting GL fallback...");
        Self::new_with_options(wgpu::Backends::GL, wgpu::PowerPreference::HighPerformance).await
    }

    /// Create a new wgpu backend restricted to the given backends.
    pub async fn new_with_options(
        backends: wgpu::Backends,
        power_preference: wgpu::PowerPreference,
    ) -> Result<Self> {
        info!("Initializing wgpu backend");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        // Manual selection to prioritize Discrete > Integrated > Virtual > Cpu
        let mut adapter = None;
        let mut best_score = -1;
        for a in instance.enumerate_adapters(backends) {
            let info = a.get_info();
            let score = match info.device_type {
                wgpu::DeviceType::DiscreteGpu => 3,
                wgpu::DeviceType::IntegratedGpu => 2,
                wgpu::DeviceType::VirtualGpu => 1,
                wgpu::DeviceType::Cpu => 0,
                wgpu::DeviceType::Other => 0,
            };
            if score > best_score {
                best_score = score;
                adapter = Some(a);
            }
        }

        if let Some(a) = &adapter {
            let info = a.get_info();
            info!(
                "Auto-selected best adapter: {} ({:?})",
                info.name, info.device_type
            );
        } else {
            adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference,
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })
                .await
                .ok();
        }

        let adapter =
            adapter.ok_or_else(|| RenderError::Device("No adapter found".to_string()))?;

        let adapter_info = adapter.get_info();
        info!(
            "Selected adapter: {} ({:?})",
            adapter_info.name, adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Astroview Device"),
                ..Default::default()
            })
            .await
            .map_err(|e: wgpu::RequestDeviceError| RenderError::Device(e.to_string()))?;

        info!("Device created successfully");

        Ok(Self {
            instance: Arc::new(instance),
            device: Arc::new(device),
            queue: Arc::new(queue),
            adapter_info,
        })
    }

    /// Create a surface for the given window using the backend's instance.
    pub fn create_surface(
        &self,
        window: Arc<winit::window::Window>,
    ) -> Result<wgpu::Surface<'static>> {
        self.instance
            .create_surface(window)
            .map_err(|e| RenderError::Surface(format!("Failed to create surface: {}", e)))
    }

    /// The swapchain format used for all render targets.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        wgpu::TextureFormat::Bgra8UnormSrgb
    }

    /// Get adapter info
    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_creation() {
        pollster::block_on(async {
            let backend = WgpuBackend::new().await;
            if backend.is_err() {
                // Skipping on headless systems without GPU support.
                eprintln!("SKIP: no usable GPU backend available");
                return;
            }

            if let Ok(backend) = backend {
                println!("Backend: {:?}", backend.adapter_info);
                assert_eq!(
                    backend.surface_format(),
                    wgpu::TextureFormat::Bgra8UnormSrgb
                );
            }
        });
    }

    #[test]
    fn test_initialization_does_not_panic() {
        pollster::block_on(async {
            // Creating a backend may fail without hardware, but must fail
            // gracefully.
            match WgpuBackend::new().await {
                Ok(b) => println!("Backend init success: {:?}", b.adapter_info),
                Err(e) => println!("Backend init failed gracefully: {}", e),
            }
        });
    }
}
