//! Primitive Meshes
//!
//! Generates simple shapes as raw import data, so they go through the same
//! decode path as content-tool output.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::geometry::raw::RawSceneWriter;
use crate::geometry::{Geometry, Mesh};
use crate::vertex::{PackedVertex, STATIC_NORMAL_TEXTURE_STRIDE, pack_vertices};
use crate::AssetResult;

/// Shapes the editor can create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveMeshType {
    Plane,
    Cube,
    UvSphere,
    IcoSphere,
    Cylinder,
    Capsule,
}

impl PrimitiveMeshType {
    /// Name used for the LOD group and the mesh
    pub fn name(self) -> &'static str {
        match self {
            Self::Plane => "plane",
            Self::Cube => "cube",
            Self::UvSphere => "uv_sphere",
            Self::IcoSphere => "ico_sphere",
            Self::Cylinder => "cylinder",
            Self::Capsule => "capsule",
        }
    }
}

/// Parameters of a primitive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveInitInfo {
    pub mesh_type: PrimitiveMeshType,
    /// Segments along x, y and z
    pub segments: [u32; 3],
    /// Size along each axis
    pub size: Vec3,
    pub lod: u32,
}

impl PrimitiveInitInfo {
    pub fn new(mesh_type: PrimitiveMeshType) -> Self {
        Self {
            mesh_type,
            segments: [1, 1, 1],
            size: Vec3::ONE,
            lod: 0,
        }
    }
}

/// Triangle list before packing
#[derive(Debug, Default)]
struct PrimitiveMesh {
    vertices: Vec<PackedVertex>,
    indices: Vec<u32>,
}

impl PrimitiveMesh {
    fn append(&mut self, other: PrimitiveMesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.indices.extend(other.indices.into_iter().map(|i| i + offset));
    }

    fn into_mesh(self) -> AssetResult<Mesh> {
        let vertex_count = self.vertices.len();
        let index_size = if vertex_count < (1 << 16) { 2 } else { 4 };
        let indices: Vec<u8> = if index_size == 2 {
            self.indices
                .iter()
                .flat_map(|&i| (i as u16).to_le_bytes())
                .collect()
        } else {
            self.indices.iter().flat_map(|&i| i.to_le_bytes()).collect()
        };

        Mesh::new(
            STATIC_NORMAL_TEXTURE_STRIDE,
            vertex_count,
            index_size,
            self.indices.len(),
            pack_vertices(&self.vertices),
            indices,
        )
    }
}

/// Raw import data for a primitive, `None` for shapes that are not generated
pub fn create_primitive_data(info: &PrimitiveInitInfo) -> AssetResult<Option<Vec<u8>>> {
    let mesh = match info.mesh_type {
        PrimitiveMeshType::Plane => create_plane(info, 0, 2, false, Vec3::new(-0.5, 0.0, -0.5)),
        PrimitiveMeshType::Cube => create_cube(info),
        PrimitiveMeshType::UvSphere => create_uv_sphere(info),
        PrimitiveMeshType::IcoSphere | PrimitiveMeshType::Cylinder | PrimitiveMeshType::Capsule => {
            log::warn!("Primitive {} is not supported", info.mesh_type.name());
            return Ok(None);
        }
    };

    let name = info.mesh_type.name();
    let mut raw = RawSceneWriter::new(name, 1)?;
    raw.begin_group(name, 1)?;
    raw.write_mesh(name, info.lod as i32, -1.0, &mesh.into_mesh()?)?;
    Ok(Some(raw.finish()))
}

/// Build a geometry asset holding one primitive
pub fn create_primitive_geometry(info: &PrimitiveInitInfo) -> AssetResult<Option<Geometry>> {
    let Some(data) = create_primitive_data(info)? else {
        return Ok(None);
    };
    let mut geometry = Geometry::new();
    geometry.import_settings.calculate_normals = true;
    geometry.from_raw_data(&data)?;
    Ok(Some(geometry))
}

/// Unit-square grid spanned by two axes starting at `offset`, scaled by `info.size`
fn create_plane(
    info: &PrimitiveInitInfo,
    horizontal: usize,
    vertical: usize,
    flip_winding: bool,
    offset: Vec3,
) -> PrimitiveMesh {
    let horizontal_count = info.segments[horizontal].clamp(1, 10);
    let vertical_count = info.segments[vertical].clamp(1, 10);
    let horizontal_step = 1.0 / horizontal_count as f32;
    let vertical_step = 1.0 / vertical_count as f32;

    let mut h_axis = Vec3::ZERO;
    h_axis[horizontal] = 1.0;
    let mut v_axis = Vec3::ZERO;
    v_axis[vertical] = 1.0;
    let normal = if flip_winding {
        h_axis.cross(v_axis)
    } else {
        v_axis.cross(h_axis)
    };

    let mut mesh = PrimitiveMesh::default();
    for j in 0..=vertical_count {
        for i in 0..=horizontal_count {
            let mut position = offset;
            position[horizontal] += i as f32 * horizontal_step;
            position[vertical] += j as f32 * vertical_step;
            mesh.vertices.push(PackedVertex {
                position: position * info.size,
                normal,
                uv: Vec2::new(i as f32 * horizontal_step, 1.0 - j as f32 * vertical_step),
            });
        }
    }

    let row = horizontal_count + 1;
    for j in 0..vertical_count {
        for i in 0..horizontal_count {
            let a = i + j * row;
            let b = i + (j + 1) * row;
            let c = (i + 1) + j * row;
            let d = (i + 1) + (j + 1) * row;
            if flip_winding {
                mesh.indices.extend([a, c, b, c, d, b]);
            } else {
                mesh.indices.extend([a, b, c, c, b, d]);
            }
        }
    }

    mesh
}

fn create_cube(info: &PrimitiveInitInfo) -> PrimitiveMesh {
    let faces = [
        // front, facing +z
        (0, 1, true, Vec3::new(-0.5, -0.5, 0.5)),
        // back
        (0, 1, false, Vec3::new(-0.5, -0.5, -0.5)),
        // left, facing -x
        (2, 1, true, Vec3::new(-0.5, -0.5, -0.5)),
        // right
        (2, 1, false, Vec3::new(0.5, -0.5, -0.5)),
        // top, facing +y
        (0, 2, false, Vec3::new(-0.5, 0.5, -0.5)),
        // bottom
        (0, 2, true, Vec3::new(-0.5, -0.5, -0.5)),
    ];

    let mut cube = PrimitiveMesh::default();
    for (horizontal, vertical, flip, offset) in faces {
        cube.append(create_plane(info, horizontal, vertical, flip, offset));
    }
    cube
}

/// Latitude/longitude sphere; every ring repeats its first column to close the UV seam
fn create_uv_sphere(info: &PrimitiveInitInfo) -> PrimitiveMesh {
    let phi_count = info.segments[0].clamp(3, 64);
    let theta_count = info.segments[1].clamp(2, 64);
    let phi_step = std::f32::consts::TAU / phi_count as f32;
    let theta_step = std::f32::consts::PI / theta_count as f32;
    let inv_phi = 1.0 / phi_count as f32;
    let inv_theta = 1.0 / theta_count as f32;

    let mut mesh = PrimitiveMesh::default();
    for j in 0..=theta_count {
        let theta = j as f32 * theta_step;
        for i in 0..=phi_count {
            let phi = i as f32 * phi_step;
            let direction = Vec3::new(theta.sin() * phi.cos(), theta.cos(), -theta.sin() * phi.sin());
            // poles sit in the middle of their column
            let u = if j == 0 || j == theta_count {
                (i as f32 + 0.5) * inv_phi
            } else {
                i as f32 * inv_phi
            };
            mesh.vertices.push(PackedVertex {
                position: direction * info.size,
                normal: (direction / info.size).normalize_or_zero(),
                uv: Vec2::new(u, 1.0 - j as f32 * inv_theta),
            });
        }
    }

    let row = phi_count + 1;
    let at = |i: u32, j: u32| i + j * row;
    for i in 0..phi_count {
        mesh.indices.extend([at(i, 0), at(i, 1), at(i + 1, 1)]);
    }
    for j in 1..theta_count - 1 {
        for i in 0..phi_count {
            let (a, b) = (at(i, j), at(i, j + 1));
            let (c, d) = (at(i + 1, j + 1), at(i + 1, j));
            mesh.indices.extend([a, b, c, a, c, d]);
        }
    }
    let south = theta_count;
    for i in 0..phi_count {
        mesh.indices
            .extend([at(i, south), at(i + 1, south - 1), at(i, south - 1)]);
    }

    mesh
}
