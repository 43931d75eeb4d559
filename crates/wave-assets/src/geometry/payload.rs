//! Geometry payload stored after the header and import settings.
//!
//! ```text
//! group name    string
//! LOD count     i32
//! per LOD:
//!   name        string
//!   threshold   f32
//!   mesh count  i32
//!   per mesh:   vertex size, vertex count, index size, index count (i32)
//!               vertices, indices
//! ```

use super::{LodGroup, Mesh, MeshLod};
use crate::binary::{BinaryReader, BinaryWriter};
use crate::content::{compute_hash, compute_hash_range};
use crate::{AssetError, AssetResult};

/// Encoded group plus its content hash
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedGroup {
    pub data: Vec<u8>,
    pub hash: Vec<u8>,
}

/// Serialize one group.
///
/// The hash covers only mesh data: each LOD's mesh range is digested and the
/// digests are hashed again, so renaming a LOD does not change it.
pub fn encode_lod_group(group: &LodGroup) -> AssetResult<EncodedGroup> {
    let mut writer = BinaryWriter::new();
    writer.write_string(&group.name)?;
    writer.write_len(group.lods.len())?;

    let mut lod_hashes = Vec::with_capacity(group.lods.len() * 32);
    for lod in &group.lods {
        lod_hashes.extend(encode_lod(lod, &mut writer)?);
    }

    Ok(EncodedGroup {
        hash: compute_hash(&lod_hashes),
        data: writer.into_bytes(),
    })
}

fn encode_lod(lod: &MeshLod, writer: &mut BinaryWriter) -> AssetResult<Vec<u8>> {
    writer.write_string(&lod.name)?;
    writer.write_f32(lod.lod_threshold);
    writer.write_len(lod.meshes.len())?;

    let mesh_data_begin = writer.position();
    for mesh in &lod.meshes {
        writer.write_len(mesh.vertex_size)?;
        writer.write_len(mesh.vertex_count)?;
        writer.write_len(mesh.index_size)?;
        writer.write_len(mesh.index_count)?;
        writer.write_bytes(&mesh.vertices);
        writer.write_bytes(&mesh.indices);
    }

    let mesh_data_size = writer.position() - mesh_data_begin;
    compute_hash_range(writer.as_bytes(), mesh_data_begin, mesh_data_size)
}

/// Deserialize one group written by [`encode_lod_group`]
pub fn decode_lod_group(data: &[u8]) -> AssetResult<LodGroup> {
    let mut reader = BinaryReader::new(data);
    let name = reader.read_string()?;
    let lod_count = reader.read_len("LOD count")?;
    if lod_count == 0 {
        return Err(AssetError::MalformedStructure(format!(
            "LOD group {name} has no LODs"
        )));
    }

    let mut lods = Vec::new();
    for _ in 0..lod_count {
        lods.push(decode_lod(&mut reader)?);
    }

    if !reader.is_at_end() {
        return Err(AssetError::MalformedStructure(format!(
            "{} unread bytes after geometry payload",
            reader.remaining()
        )));
    }

    Ok(LodGroup { name, lods })
}

fn decode_lod(reader: &mut BinaryReader<'_>) -> AssetResult<MeshLod> {
    let name = reader.read_string()?;
    let lod_threshold = reader.read_f32()?;
    let mesh_count = reader.read_len("mesh count")?;
    if mesh_count == 0 {
        return Err(AssetError::MalformedStructure(format!("LOD {name} has no meshes")));
    }

    let mut meshes = Vec::new();
    for _ in 0..mesh_count {
        let vertex_size = reader.read_len("vertex size")?;
        let vertex_count = reader.read_len("vertex count")?;
        let index_size = reader.read_len("index size")?;
        let index_count = reader.read_len("index count")?;

        let vertex_bytes = vertex_size.saturating_mul(vertex_count);
        let index_bytes = index_size.saturating_mul(index_count);
        let vertices = reader.read_bytes(vertex_bytes)?.to_vec();
        let indices = reader.read_bytes(index_bytes)?.to_vec();

        meshes.push(Mesh::new(
            vertex_size,
            vertex_count,
            index_size,
            index_count,
            vertices,
            indices,
        )?);
    }

    Ok(MeshLod {
        name,
        lod_threshold,
        meshes,
    })
}

/// Recompute the content hash of a decoded group
pub fn group_hash(group: &LodGroup) -> AssetResult<Vec<u8>> {
    encode_lod_group(group).map(|encoded| encoded.hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::tests::{test_group, test_mesh};

    #[test]
    fn test_payload_roundtrip() {
        let group = test_group("rock", &[("lod0", 0.0), ("lod1", 25.0)]);
        let encoded = encode_lod_group(&group).unwrap();
        assert_eq!(decode_lod_group(&encoded.data).unwrap(), group);
    }

    #[test]
    fn test_hash_is_deterministic() {
        let group = test_group("rock", &[("lod0", 0.0), ("lod1", 25.0)]);
        let a = encode_lod_group(&group).unwrap();
        let b = encode_lod_group(&group.clone()).unwrap();
        assert_eq!(a.hash, b.hash);
        assert_eq!(a.hash.len(), 32);
    }

    #[test]
    fn test_hash_ignores_names() {
        let group = test_group("rock", &[("lod0", 0.0)]);
        let mut renamed = group.clone();
        renamed.name = "stone".to_string();
        renamed.lods[0].name = "high".to_string();
        assert_eq!(group_hash(&group).unwrap(), group_hash(&renamed).unwrap());
    }

    #[test]
    fn test_hash_detects_vertex_change() {
        let group = test_group("rock", &[("lod0", 0.0)]);
        let mut changed = group.clone();
        changed.lods[0].meshes[0].vertices[0] ^= 0x01;
        assert_ne!(group_hash(&group).unwrap(), group_hash(&changed).unwrap());
    }

    #[test]
    fn test_hash_matches_manual_digest() {
        let mesh = test_mesh(3, 1.0);
        let group = LodGroup {
            name: "g".to_string(),
            lods: vec![MeshLod {
                name: "l".to_string(),
                lod_threshold: 0.0,
                meshes: vec![mesh.clone()],
            }],
        };

        let mut mesh_data = BinaryWriter::new();
        mesh_data.write_len(mesh.vertex_size).unwrap();
        mesh_data.write_len(mesh.vertex_count).unwrap();
        mesh_data.write_len(mesh.index_size).unwrap();
        mesh_data.write_len(mesh.index_count).unwrap();
        mesh_data.write_bytes(&mesh.vertices);
        mesh_data.write_bytes(&mesh.indices);
        let expected = compute_hash(&compute_hash(mesh_data.as_bytes()));

        assert_eq!(group_hash(&group).unwrap(), expected);
    }

    #[test]
    fn test_truncated_payload() {
        let group = test_group("rock", &[("lod0", 0.0)]);
        let encoded = encode_lod_group(&group).unwrap();
        let cut = &encoded.data[..encoded.data.len() - 1];
        assert!(matches!(
            decode_lod_group(cut),
            Err(AssetError::TruncatedData { .. })
        ));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let group = test_group("rock", &[("lod0", 0.0)]);
        let mut data = encode_lod_group(&group).unwrap().data;
        data.push(0);
        assert!(matches!(
            decode_lod_group(&data),
            Err(AssetError::MalformedStructure(_))
        ));
    }
}
