//! Application wiring: the viewer context, the frame loop that drives it,
//! and the winit event handling that re-arms redraws while the loop wants
//! frames.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use astroview_core::{
    AnimationFnId, CameraView, FrameFlow, FrameLoop, FrameTick, SceneState, ViewerSettings,
};
use astroview_render::{load_astrobee, Camera, GpuPart, SceneRenderer, WgpuBackend};
use egui_wgpu::Renderer;
use egui_winit::State;
use glam::Mat4;
use tracing::{error, info, warn};
use winit::{
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow},
};

use crate::ui::{ControlPanel, UiAction};
use crate::window::WindowContext;

/// Orbit sensitivity of the free view, degrees per dragged pixel.
const DRAG_DEG_PER_PIXEL: f32 = 0.3;
/// Scroll units per mouse-wheel line, fed into the rig's dolly speed.
const WHEEL_LINE_UNITS: f32 = 50.0;

/// Everything the frame loop's callbacks operate on: window, GPU state,
/// scene and UI. Kept separate from [`App`] so callbacks can borrow it
/// mutably while the loop itself stays with the app.
pub struct Viewer {
    window: WindowContext,
    backend: WgpuBackend,
    renderer: SceneRenderer,
    depth_view: wgpu::TextureView,
    gpu_parts: Vec<GpuPart>,
    camera: Camera,
    scene: SceneState,
    settings: ViewerSettings,
    egui_context: egui::Context,
    egui_state: State,
    egui_renderer: Renderer,
    panel: ControlPanel,
    start_time: Instant,
}

impl Viewer {
    /// Render one frame: scene pass, then the egui overlay, then present.
    fn render_frame(&mut self) -> Result<()> {
        let surface_texture = match self.window.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.window
                    .surface
                    .configure(&self.backend.device, &self.window.surface_config);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.backend
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Frame Encoder"),
                });

        // --- Scene Pass ---
        self.renderer.begin_frame();
        let aspect = self.window.surface_config.width as f32
            / self.window.surface_config.height.max(1) as f32;
        let view_proj = self.camera.view_proj(self.scene.view, aspect);
        let rotation = Mat4::from_rotation_y(self.scene.rotation_y);
        self.renderer.draw(
            &self.backend.queue,
            &mut encoder,
            &view,
            &self.depth_view,
            &self.gpu_parts,
            view_proj,
            rotation,
        );

        // --- UI Pass ---
        let raw_input = self.egui_state.take_egui_input(&self.window.window);
        let egui_context = self.egui_context.clone();
        let full_output = egui_context.run(raw_input, |ctx| {
            self.panel.show(ctx, &self.settings);
        });
        self.egui_state
            .handle_platform_output(&self.window.window, full_output.platform_output);

        let tris = self
            .egui_context
            .tessellate(full_output.shapes, self.egui_context.pixels_per_point());
        for (id, delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.backend.device, &self.backend.queue, *id, delta);
        }
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                self.window.surface_config.width,
                self.window.surface_config.height,
            ],
            pixels_per_point: self.egui_context.pixels_per_point(),
        };
        self.egui_renderer.update_buffers(
            &self.backend.device,
            &self.backend.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        depth_slice: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.backend.queue.submit(std::iter::once(encoder.finish()));
        self.window.window.pre_present_notify();
        surface_texture.present();

        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if self.window.resize(&self.backend.device, size.width, size.height) {
            self.depth_view = self.renderer.create_depth_texture(size.width, size.height);
        } else {
            warn!("Ignoring resize to a zero-sized surface");
        }
    }

    fn save_settings(&mut self) {
        let size = self.window.window.inner_size();
        if size.width > 0 && size.height > 0 {
            self.settings.window_width = size.width;
            self.settings.window_height = size.height;
        }
        match self.settings.save() {
            Ok(()) => info!("Settings saved"),
            Err(e) => error!("Failed to save settings: {}", e),
        }
    }
}

/// The animation function toggled by the rotation checkbox.
fn spin_animation() -> impl FnMut(&mut Viewer, FrameTick) -> FrameFlow {
    |viewer, tick| {
        viewer.scene.advance_rotation(
            tick.delta,
            viewer.settings.rotation_direction,
            viewer.settings.spin_deg_per_sec,
        );
        FrameFlow::Continue
    }
}

/// The main application: the viewer plus the frame loop driving it.
pub struct App {
    frame_loop: FrameLoop<Viewer>,
    viewer: Viewer,
    rotation_fn: Option<AnimationFnId>,
    dragging: bool,
    last_cursor: Option<PhysicalPosition<f64>>,
}

impl App {
    /// Creates a new `App`.
    pub async fn new(elwt: &ActiveEventLoop, settings: ViewerSettings) -> Result<Self> {
        let backend = WgpuBackend::new().await?;
        let window = WindowContext::new(elwt, &backend, &settings)?;

        let renderer = SceneRenderer::new(backend.device.clone(), backend.surface_format())?;
        let depth_view = renderer
            .create_depth_texture(window.surface_config.width, window.surface_config.height);

        let parts = load_astrobee(&assets_dir().join("models"));
        let gpu_parts = renderer.upload_parts(&parts);

        let egui_context = egui::Context::default();
        let egui_state = State::new(
            egui_context.clone(),
            egui::viewport::ViewportId::ROOT,
            &window.window,
            None,
            None,
            None,
        );
        let egui_renderer = Renderer::new(
            &backend.device,
            backend.surface_format(),
            egui_wgpu::RendererOptions::default(),
        );

        let viewer = Viewer {
            window,
            backend,
            renderer,
            depth_view,
            gpu_parts,
            camera: Camera::default(),
            scene: SceneState::new(settings.view),
            settings,
            egui_context,
            egui_state,
            egui_renderer,
            panel: ControlPanel::default(),
            start_time: Instant::now(),
        };

        let mut app = Self {
            frame_loop: FrameLoop::new(),
            viewer,
            rotation_fn: None,
            dragging: false,
            last_cursor: None,
        };

        // The render call runs every scheduled frame, whether or not any
        // animation is registered.
        app.frame_loop.add_base_fn(|viewer: &mut Viewer, _tick| {
            if let Err(e) = viewer.render_frame() {
                error!("Render error: {}", e);
            }
        });

        app.set_rotation_enabled(app.viewer.settings.rotation_enabled);
        app.viewer.window.window.request_redraw();

        Ok(app)
    }

    /// Wire the rotation checkbox into the frame loop: register or remove
    /// the spin function and start or stop the loop so an idle scene
    /// requests no frames.
    fn set_rotation_enabled(&mut self, enabled: bool) {
        self.viewer.settings.rotation_enabled = enabled;

        if enabled {
            if self.rotation_fn.is_none() {
                self.rotation_fn = Some(self.frame_loop.add_animation_fn(spin_animation()));
            }
            self.frame_loop.start();
            self.viewer.window.window.request_redraw();
        } else if let Some(id) = self.rotation_fn.take() {
            self.frame_loop.remove_animation_fn(id);
        }

        if self.frame_loop.animation_fn_count() == 0 {
            // Nothing animates; fall back to on-demand repaints.
            self.frame_loop.stop();
        }
    }

    fn apply_actions(&mut self) {
        for action in self.viewer.panel.take_actions() {
            match action {
                UiAction::SetRotationEnabled(enabled) => self.set_rotation_enabled(enabled),
                UiAction::SetRotationDirection(direction) => {
                    self.viewer.settings.rotation_direction = direction;
                }
                UiAction::SetView(view) => {
                    self.viewer.settings.view = view;
                    self.viewer.scene.view = view;
                    self.viewer.window.window.request_redraw();
                }
            }
        }
    }

    fn redraw(&mut self) {
        let now = self.viewer.start_time.elapsed();
        self.frame_loop.tick(&mut self.viewer, now);

        if !self.frame_loop.is_running() {
            // The loop is idle; repaint once so the panel stays live.
            if let Err(e) = self.viewer.render_frame() {
                error!("Render error: {}", e);
            }
        }

        // UI actions may start or stop the loop, so the re-arm decision
        // comes after they are applied.
        self.apply_actions();
        if self.frame_loop.wants_frame() {
            self.viewer.window.window.request_redraw();
        }
    }

    /// Handles a window event.
    pub fn handle_event(&mut self, event: Event<()>, elwt: &ActiveEventLoop) -> Result<()> {
        match &event {
            Event::WindowEvent { event, window_id }
                if *window_id == self.viewer.window.window.id() =>
            {
                let response = self
                    .viewer
                    .egui_state
                    .on_window_event(&self.viewer.window.window, event);
                if response.repaint {
                    self.viewer.window.window.request_redraw();
                }

                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(size) => {
                        self.viewer.resize(*size);
                        self.viewer.window.window.request_redraw();
                    }
                    WindowEvent::RedrawRequested => self.redraw(),
                    WindowEvent::MouseInput {
                        state,
                        button: MouseButton::Left,
                        ..
                    } => {
                        self.dragging =
                            *state == ElementState::Pressed && !response.consumed;
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let last = self.last_cursor.replace(*position);
                        if self.dragging && self.viewer.scene.view == CameraView::Free {
                            if let Some(last) = last {
                                let dx = (position.x - last.x) as f32;
                                let dy = (position.y - last.y) as f32;
                                self.viewer
                                    .camera
                                    .orbit
                                    .orbit(-dx * DRAG_DEG_PER_PIXEL, dy * DRAG_DEG_PER_PIXEL);
                                self.viewer.window.window.request_redraw();
                            }
                        }
                    }
                    WindowEvent::MouseWheel { delta, .. } if !response.consumed => {
                        if self.viewer.scene.view == CameraView::Free {
                            let amount = match delta {
                                MouseScrollDelta::LineDelta(_, y) => -y * WHEEL_LINE_UNITS,
                                MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32),
                            };
                            self.viewer.camera.orbit.dolly(amount);
                            self.viewer.window.window.request_redraw();
                        }
                    }
                    _ => (),
                }
            }
            Event::LoopExiting => {
                info!("Application exiting, saving settings...");
                self.viewer.save_settings();
            }
            Event::AboutToWait => {
                // Redraws self-chain through request_redraw; between them
                // the event loop sleeps.
                elwt.set_control_flow(ControlFlow::Wait);
            }
            _ => (),
        }

        Ok(())
    }
}

/// Resolve the assets directory next to the executable, falling back to
/// the working directory during development.
fn assets_dir() -> PathBuf {
    let exe_relative = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("..")
        .join("..")
        .join("assets");

    if exe_relative.exists() {
        exe_relative
    } else {
        PathBuf::from("assets")
    }
}
