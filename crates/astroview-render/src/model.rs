//! Astrobee model assembly.
//!
//! Loads the OBJ conversions of the Astrobee parts from an assets
//! directory and mirrors the propulsion-module parts to the other side of
//! the body. When the model files are missing, a procedural stand-in is
//! assembled instead so the viewer runs from a bare checkout.

use std::path::Path;

use glam::{Mat4, Vec3};
use tracing::{info, warn};

use crate::{RenderError, Result};

/// Body part files expected in the assets directory. The propulsion-module
/// trio is drawn twice, mirrored across the body's Z plane.
const BODY_FILE: &str = "body.obj";
const PMC_FILES: [&str; 3] = ["pmc.obj", "pmc_skin_.obj", "pmc_bumper.obj"];

const BODY_COLOR: [f32; 4] = [0.80, 0.80, 0.84, 1.0];
const PMC_COLOR: [f32; 4] = [0.25, 0.55, 0.58, 1.0];

/// CPU-side triangle mesh with positions and per-vertex normals.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Unit normals, one per vertex.
    pub normals: Vec<[f32; 3]>,
    /// Triangle list indices into the vertex arrays.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Load all meshes from an OBJ file. Missing normals are reconstructed
    /// from the triangle geometry.
    pub fn from_obj(path: &Path) -> Result<Vec<MeshData>> {
        let (models, _materials) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS)
            .map_err(|e| RenderError::ModelLoad(format!("{}: {}", path.display(), e)))?;

        let mut meshes = Vec::with_capacity(models.len());
        for model in models {
            let mesh = model.mesh;
            let positions: Vec<[f32; 3]> = mesh
                .positions
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]])
                .collect();
            let normals: Vec<[f32; 3]> = if mesh.normals.is_empty() {
                computed_normals(&positions, &mesh.indices)
            } else {
                mesh.normals
                    .chunks_exact(3)
                    .map(|c| [c[0], c[1], c[2]])
                    .collect()
            };
            meshes.push(MeshData {
                positions,
                normals,
                indices: mesh.indices,
            });
        }
        Ok(meshes)
    }

    /// Axis-aligned cuboid with per-face normals.
    pub fn cuboid(center: Vec3, half_extents: Vec3) -> MeshData {
        let c = center;
        let h = half_extents;

        // One quad per face so each face keeps a flat normal.
        let faces: [(Vec3, [Vec3; 4]); 6] = [
            (
                Vec3::X,
                [
                    Vec3::new(h.x, -h.y, -h.z),
                    Vec3::new(h.x, h.y, -h.z),
                    Vec3::new(h.x, h.y, h.z),
                    Vec3::new(h.x, -h.y, h.z),
                ],
            ),
            (
                Vec3::NEG_X,
                [
                    Vec3::new(-h.x, -h.y, h.z),
                    Vec3::new(-h.x, h.y, h.z),
                    Vec3::new(-h.x, h.y, -h.z),
                    Vec3::new(-h.x, -h.y, -h.z),
                ],
            ),
            (
                Vec3::Y,
                [
                    Vec3::new(-h.x, h.y, -h.z),
                    Vec3::new(-h.x, h.y, h.z),
                    Vec3::new(h.x, h.y, h.z),
                    Vec3::new(h.x, h.y, -h.z),
                ],
            ),
            (
                Vec3::NEG_Y,
                [
                    Vec3::new(-h.x, -h.y, h.z),
                    Vec3::new(-h.x, -h.y, -h.z),
                    Vec3::new(h.x, -h.y, -h.z),
                    Vec3::new(h.x, -h.y, h.z),
                ],
            ),
            (
                Vec3::Z,
                [
                    Vec3::new(-h.x, -h.y, h.z),
                    Vec3::new(h.x, -h.y, h.z),
                    Vec3::new(h.x, h.y, h.z),
                    Vec3::new(-h.x, h.y, h.z),
                ],
            ),
            (
                Vec3::NEG_Z,
                [
                    Vec3::new(h.x, -h.y, -h.z),
                    Vec3::new(-h.x, -h.y, -h.z),
                    Vec3::new(-h.x, h.y, -h.z),
                    Vec3::new(h.x, h.y, -h.z),
                ],
            ),
        ];

        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, corners) in faces {
            let base = positions.len() as u32;
            for corner in corners {
                positions.push((c + corner).to_array());
                normals.push(normal.to_array());
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        MeshData {
            positions,
            normals,
            indices,
        }
    }
}

/// Area-weighted vertex normals reconstructed from triangle geometry.
fn computed_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accumulated = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let a = Vec3::from_array(positions[tri[0] as usize]);
        let b = Vec3::from_array(positions[tri[1] as usize]);
        let c = Vec3::from_array(positions[tri[2] as usize]);
        let face = (b - a).cross(c - a);
        for &i in tri {
            accumulated[i as usize] += face;
        }
    }
    accumulated
        .into_iter()
        .map(|n| n.normalize_or_zero().to_array())
        .collect()
}

/// One drawable piece of the assembly: a mesh, its local transform and a
/// flat base color.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPart {
    /// Mesh geometry.
    pub mesh: MeshData,
    /// Local transform applied before the model's spin.
    pub transform: Mat4,
    /// Flat base color (RGBA).
    pub color: [f32; 4],
}

/// Load the Astrobee assembly from `assets_dir`, falling back to the
/// procedural stand-in when the model files are unavailable.
pub fn load_astrobee(assets_dir: &Path) -> Vec<ModelPart> {
    match load_astrobee_objs(assets_dir) {
        Ok(parts) => {
            info!(
                "Loaded Astrobee model ({} parts) from {}",
                parts.len(),
                assets_dir.display()
            );
            parts
        }
        Err(e) => {
            warn!("{}; using the procedural stand-in model", e);
            procedural_astrobee()
        }
    }
}

fn load_astrobee_objs(dir: &Path) -> Result<Vec<ModelPart>> {
    let mirror = Mat4::from_scale(Vec3::new(1.0, 1.0, -1.0));
    let mut parts = Vec::new();

    for mesh in MeshData::from_obj(&dir.join(BODY_FILE))? {
        parts.push(ModelPart {
            mesh,
            transform: Mat4::IDENTITY,
            color: BODY_COLOR,
        });
    }
    for file in PMC_FILES {
        for mesh in MeshData::from_obj(&dir.join(file))? {
            parts.push(ModelPart {
                mesh: mesh.clone(),
                transform: Mat4::IDENTITY,
                color: PMC_COLOR,
            });
            // The other side of the robot.
            parts.push(ModelPart {
                mesh,
                transform: mirror,
                color: PMC_COLOR,
            });
        }
    }
    Ok(parts)
}

/// Procedural stand-in: a boxy body with one propulsion module per side.
pub fn procedural_astrobee() -> Vec<ModelPart> {
    let mirror = Mat4::from_scale(Vec3::new(1.0, 1.0, -1.0));
    let pod = MeshData::cuboid(Vec3::new(0.0, 0.0, 0.21), Vec3::new(0.17, 0.15, 0.05));

    vec![
        ModelPart {
            mesh: MeshData::cuboid(Vec3::ZERO, Vec3::splat(0.16)),
            transform: Mat4::IDENTITY,
            color: BODY_COLOR,
        },
        ModelPart {
            mesh: pod.clone(),
            transform: Mat4::IDENTITY,
            color: PMC_COLOR,
        },
        ModelPart {
            mesh: pod,
            transform: mirror,
            color: PMC_COLOR,
        },
    ]
}
