//! Vertex Unpacker
//!
//! Decodes the packed static vertex produced by the content tools:
//!
//! ```text
//! offset  size  field
//!  0      12    position   3 x f32
//! 12       4    sign word  bits 24..31 hold the sign byte
//! 16       4    normal     2 x u16, x and y in [0, 65535]
//! 20      ..    tangent / skin data (skipped)
//! end-8    8    uv         2 x f32
//! ```
//!
//! Normal z is rebuilt from the unit-length constraint and bit 1 of the sign byte.

use bitflags::bitflags;
use glam::{Vec2, Vec3, Vec4};
use wave_core::math::Aabb;

use crate::binary::{BinaryReader, BinaryWriter};
use crate::geometry::MeshLod;
use crate::{AssetError, AssetResult};

bitflags! {
    /// Sign byte stored in the top 8 bits of the vertex sign word
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SignBits: u8 {
        /// Tangent handedness; carried through but not decoded
        const TANGENT_HANDEDNESS = 0b01;
        /// Set when the normal's z component is positive
        const NORMAL_Z_POSITIVE = 0b10;
    }
}

const POSITION_SIZE: usize = 3 * 4;
const SIGN_WORD_SIZE: usize = 4;
const NORMAL_SIZE: usize = 2 * 2;
const TANGENT_SIZE: usize = 2 * 2;
const UV_SIZE: usize = 2 * 4;

/// Smallest stride that holds position, sign word, normal and uv
pub const MIN_VERTEX_STRIDE: usize = POSITION_SIZE + SIGN_WORD_SIZE + NORMAL_SIZE + UV_SIZE;

/// Stride of the static normal + texture layout written by [`PackedVertex`]
pub const STATIC_NORMAL_TEXTURE_STRIDE: usize = MIN_VERTEX_STRIDE + TANGENT_SIZE;

/// Step between two quantized normal values
const NORMAL_INTERVAL: f32 = 2.0 / 65535.0;

/// Decode a quantized normal into a unit vector
pub fn unpack_normal(x: u16, y: u16, signs: SignBits) -> Vec3 {
    let nx = f32::from(x) * NORMAL_INTERVAL - 1.0;
    let ny = f32::from(y) * NORMAL_INTERVAL - 1.0;
    let sign = if signs.contains(SignBits::NORMAL_Z_POSITIVE) { 1.0 } else { -1.0 };
    let nz = (1.0 - (nx * nx + ny * ny)).clamp(0.0, 1.0).sqrt() * sign;
    Vec3::new(nx, ny, nz).normalize()
}

/// Quantize a unit normal into its x/y words and z sign
pub fn quantize_normal(normal: Vec3) -> (u16, u16, SignBits) {
    let quantize = |v: f32| ((v.clamp(-1.0, 1.0) + 1.0) / NORMAL_INTERVAL).round() as u16;
    let signs = if normal.z >= 0.0 {
        SignBits::NORMAL_Z_POSITIVE
    } else {
        SignBits::empty()
    };
    (quantize(normal.x), quantize(normal.y), signs)
}

/// Decoded attributes of one mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshVertexData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// Reserved; tangents are not decoded yet
    pub tangents: Vec<Vec4>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

/// Unpack `count` packed vertices of `stride` bytes each
pub fn unpack_vertices(data: &[u8], stride: usize, count: usize) -> AssetResult<MeshVertexData> {
    if stride < MIN_VERTEX_STRIDE {
        return Err(AssetError::MalformedStructure(format!(
            "vertex stride {stride} is smaller than {MIN_VERTEX_STRIDE} bytes"
        )));
    }
    let skipped = stride - MIN_VERTEX_STRIDE;

    let mut out = MeshVertexData {
        positions: Vec::with_capacity(count),
        normals: Vec::with_capacity(count),
        uvs: Vec::with_capacity(count),
        ..Default::default()
    };

    let mut reader = BinaryReader::new(data);
    for _ in 0..count {
        let position = Vec3::new(reader.read_f32()?, reader.read_f32()?, reader.read_f32()?);
        let signs = SignBits::from_bits_truncate((reader.read_u32()? >> 24) as u8);
        let (nx, ny) = (reader.read_u16()?, reader.read_u16()?);
        reader.skip(skipped)?;
        let uv = Vec2::new(reader.read_f32()?, reader.read_f32()?);

        out.positions.push(position);
        out.normals.push(unpack_normal(nx, ny, signs));
        out.uvs.push(uv);
    }

    Ok(out)
}

/// Decode an index buffer. Stride 2 reads `u16` values, anything else `u32`.
pub fn unpack_indices(data: &[u8], stride: usize, count: usize) -> AssetResult<Vec<u32>> {
    let mut reader = BinaryReader::new(data);
    if stride == 2 {
        (0..count)
            .map(|_| reader.read_u16().map(u32::from))
            .collect()
    } else {
        (0..count).map(|_| reader.read_u32()).collect()
    }
}

/// Decoded data of every mesh in one LOD plus what the viewport needs to
/// place its camera
#[derive(Debug, Clone, Default)]
pub struct LodVertexData {
    pub meshes: Vec<MeshVertexData>,
    pub bounds: Aabb,
    /// Running sum of all decoded normals
    pub normal_sum: Vec3,
    pub vertex_count: usize,
}

impl LodVertexData {
    /// Unpack every mesh of a LOD
    pub fn from_lod(lod: &MeshLod) -> AssetResult<Self> {
        let mut data = Self::default();
        for mesh in &lod.meshes {
            let mut unpacked =
                unpack_vertices(&mesh.vertices, mesh.vertex_size, mesh.vertex_count)?;
            unpacked.indices = unpack_indices(&mesh.indices, mesh.index_size, mesh.index_count)?;

            for (position, normal) in unpacked.positions.iter().zip(&unpacked.normals) {
                data.bounds.expand_to_include(*position);
                data.normal_sum += *normal;
            }
            data.vertex_count += unpacked.positions.len();
            data.meshes.push(unpacked);
        }
        Ok(data)
    }

    /// Mean of all decoded normals, zero for an empty LOD
    pub fn average_normal(&self) -> Vec3 {
        if self.vertex_count == 0 {
            Vec3::ZERO
        } else {
            self.normal_sum / self.vertex_count as f32
        }
    }
}

/// One vertex in the static normal + texture layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackedVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl PackedVertex {
    /// Append this vertex as [`STATIC_NORMAL_TEXTURE_STRIDE`] bytes
    pub fn write(&self, writer: &mut BinaryWriter) {
        let (nx, ny, signs) = quantize_normal(self.normal);
        writer.write_f32(self.position.x);
        writer.write_f32(self.position.y);
        writer.write_f32(self.position.z);
        // color[3] stays black, sign byte in the top 8 bits
        writer.write_u32(u32::from(signs.bits()) << 24);
        writer.write_u16(nx);
        writer.write_u16(ny);
        // tangent
        writer.write_u16(0);
        writer.write_u16(0);
        writer.write_f32(self.uv.x);
        writer.write_f32(self.uv.y);
    }
}

/// Pack a vertex list into one buffer
pub fn pack_vertices(vertices: &[PackedVertex]) -> Vec<u8> {
    let mut writer = BinaryWriter::new();
    for vertex in vertices {
        vertex.write(&mut writer);
    }
    writer.into_bytes()
}
