//! Scene Renderer - forward pass for the model assembly.
//!
//! Draws each part with a flat base color lit by one point light plus an
//! ambient term. Per-part uniform buffers are pooled and reused frame to
//! frame; `begin_frame` rewinds the pool.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use tracing::info;
use wgpu::util::DeviceExt;

use crate::model::ModelPart;
use crate::Result;

/// Point light matching the source scene: white, intensity 0.8, far above
/// and beside the model.
const LIGHT_POSITION: [f32; 4] = [20.0, 20.0, 20.0, 1.0];
const LIGHT_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 0.8];
/// White ambient, intensity 0.4.
const AMBIENT: [f32; 4] = [1.0, 1.0, 1.0, 0.4];

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.016,
    g: 0.016,
    b: 0.02,
    a: 1.0,
};

/// Depth buffer format used by the scene pass.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Vertex format for scene rendering (matches scene.wgsl)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GpuVertex {
    position: [f32; 3],
    normal: [f32; 3],
}

/// Uniforms for scene rendering (matches scene.wgsl); every field is
/// 16-byte aligned.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable, PartialEq)]
struct SceneUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    // Inverse-transpose of the model matrix, so mirrored parts keep
    // correct normals.
    normal: [[f32; 4]; 4],
    base_color: [f32; 4],
    light_position: [f32; 4],
    light_color: [f32; 4],
    ambient: [f32; 4],
}

/// GPU resources for one model part.
pub struct GpuPart {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    transform: Mat4,
    color: [f32; 4],
}

struct CachedUniform {
    buffer: wgpu::Buffer,
    bind_group: Arc<wgpu::BindGroup>,
    last_uniforms: Option<SceneUniforms>,
}

/// Forward renderer for the model assembly.
pub struct SceneRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_bind_group_layout: wgpu::BindGroupLayout,
    device: Arc<wgpu::Device>,

    // Caching
    uniform_cache: Vec<CachedUniform>,
    current_cache_index: usize,
}

impl SceneRenderer {
    /// Create a new scene renderer targeting the given surface format.
    pub fn new(device: Arc<wgpu::Device>, target_format: wgpu::TextureFormat) -> Result<Self> {
        info!("Creating scene renderer");

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let shader_source = include_str!("../shaders/scene.wgsl");
        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3, // position
                        1 => Float32x3, // normal
                    ],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Mirrored parts flip the winding; shade both faces.
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        Ok(Self {
            pipeline,
            uniform_bind_group_layout,
            device,
            uniform_cache: Vec::new(),
            current_cache_index: 0,
        })
    }

    /// Create GPU buffers for every part of a model.
    pub fn upload_parts(&self, parts: &[ModelPart]) -> Vec<GpuPart> {
        parts
            .iter()
            .map(|part| {
                let vertices: Vec<GpuVertex> = part
                    .mesh
                    .positions
                    .iter()
                    .zip(&part.mesh.normals)
                    .map(|(position, normal)| GpuVertex {
                        position: *position,
                        normal: *normal,
                    })
                    .collect();

                let vertex_buffer =
                    self.device
                        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some("Part Vertex Buffer"),
                            contents: bytemuck::cast_slice(&vertices),
                            usage: wgpu::BufferUsages::VERTEX,
                        });
                let index_buffer =
                    self.device
                        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some("Part Index Buffer"),
                            contents: bytemuck::cast_slice(&part.mesh.indices),
                            usage: wgpu::BufferUsages::INDEX,
                        });

                GpuPart {
                    vertex_buffer,
                    index_buffer,
                    index_count: part.mesh.indices.len() as u32,
                    transform: part.transform,
                    color: part.color,
                }
            })
            .collect()
    }

    /// Create the depth texture view for a surface of the given size.
    pub fn create_depth_texture(&self, width: u32, height: u32) -> wgpu::TextureView {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Depth Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Rewind the uniform pool; call once per frame before `draw`.
    pub fn begin_frame(&mut self) {
        self.current_cache_index = 0;
    }

    fn get_uniform_bind_group(
        &mut self,
        queue: &wgpu::Queue,
        uniforms: SceneUniforms,
    ) -> Arc<wgpu::BindGroup> {
        // Expand cache if needed
        if self.current_cache_index >= self.uniform_cache.len() {
            let buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Scene Uniform Buffer"),
                    contents: bytemuck::cast_slice(&[uniforms]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Scene Uniform Bind Group"),
                layout: &self.uniform_bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
            self.uniform_cache.push(CachedUniform {
                buffer,
                bind_group: Arc::new(bind_group),
                last_uniforms: Some(uniforms),
            });
            self.current_cache_index += 1;
            return self.uniform_cache[self.current_cache_index - 1]
                .bind_group
                .clone();
        }

        let entry = &mut self.uniform_cache[self.current_cache_index];
        if entry.last_uniforms != Some(uniforms) {
            queue.write_buffer(&entry.buffer, 0, bytemuck::cast_slice(&[uniforms]));
            entry.last_uniforms = Some(uniforms);
        }
        self.current_cache_index += 1;
        entry.bind_group.clone()
    }

    /// Record the scene pass: clear the target, then draw every part with
    /// the model's spin applied on top of its local transform.
    pub fn draw(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        parts: &[GpuPart],
        view_proj: Mat4,
        model_rotation: Mat4,
    ) {
        let bind_groups: Vec<Arc<wgpu::BindGroup>> = parts
            .iter()
            .map(|part| {
                let model = model_rotation * part.transform;
                let uniforms = SceneUniforms {
                    view_proj: view_proj.to_cols_array_2d(),
                    model: model.to_cols_array_2d(),
                    normal: model.inverse().transpose().to_cols_array_2d(),
                    base_color: part.color,
                    light_position: LIGHT_POSITION,
                    light_color: LIGHT_COLOR,
                    ambient: AMBIENT,
                };
                self.get_uniform_bind_group(queue, uniforms)
            })
            .collect();

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        rpass.set_pipeline(&self.pipeline);
        for (part, bind_group) in parts.iter().zip(&bind_groups) {
            rpass.set_bind_group(0, bind_group.as_ref(), &[]);
            rpass.set_vertex_buffer(0, part.vertex_buffer.slice(..));
            rpass.set_index_buffer(part.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..part.index_count, 0, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniforms_are_std140_sized() {
        // Three mat4x4 plus four vec4.
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 3 * 64 + 4 * 16);
        assert_eq!(std::mem::size_of::<GpuVertex>(), 24);
    }
}
