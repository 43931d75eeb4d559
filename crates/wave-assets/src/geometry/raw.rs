//! Raw import format produced by the content tools.
//!
//! ```text
//! scene name        string (skipped)
//! LOD group count   i32, > 0
//! per group:
//!   name            string, random `lod_xxxxxx` when empty
//!   mesh count      i32, > 0
//!   per mesh:
//!     name          string, random `mesh_xxxxxx` when empty
//!     lod id        i32, negative for none
//!     vertex size   i32
//!     vertex count  i32
//!     index size    i32
//!     index count   i32
//!     threshold     f32
//!     vertices      vertex size * vertex count bytes
//!     indices       index size * index count bytes
//! ```
//!
//! Mesh records that share a valid LOD id end up in the same [`MeshLod`].

use ahash::AHashMap;

use super::{LodGroup, Mesh, MeshLod};
use crate::binary::{BinaryReader, BinaryWriter};
use crate::content::random_name;
use crate::{AssetError, AssetResult};

/// Decode a raw import blob into LOD groups
pub fn decode_scene(data: &[u8]) -> AssetResult<Vec<LodGroup>> {
    let mut reader = BinaryReader::new(data);

    let _scene_name = reader.read_blob()?;
    let group_count = reader.read_len("LOD group count")?;
    if group_count == 0 {
        return Err(AssetError::MalformedStructure(
            "raw data declares no LOD groups".to_string(),
        ));
    }

    let mut groups = Vec::new();
    for _ in 0..group_count {
        let mut name = reader.read_string()?;
        if name.is_empty() {
            name = random_name("lod");
        }

        let mesh_count = reader.read_len("mesh count")?;
        if mesh_count == 0 {
            return Err(AssetError::MalformedStructure(format!(
                "LOD group {name} declares no meshes"
            )));
        }

        let mut lods = LodAggregator::default();
        for _ in 0..mesh_count {
            let record = read_mesh_record(&mut reader)?;
            lods.push(record);
        }

        log::debug!("Decoded LOD group {name} with {} LODs", lods.lods.len());
        groups.push(LodGroup {
            name,
            lods: lods.lods,
        });
    }

    if !reader.is_at_end() {
        log::warn!("{} trailing bytes after raw geometry data", reader.remaining());
    }

    Ok(groups)
}

struct MeshRecord {
    name: String,
    lod_id: i32,
    lod_threshold: f32,
    mesh: Mesh,
}

fn read_mesh_record(reader: &mut BinaryReader<'_>) -> AssetResult<MeshRecord> {
    let mut name = reader.read_string()?;
    if name.is_empty() {
        name = random_name("mesh");
    }

    let lod_id = reader.read_i32()?;
    let vertex_size = reader.read_len("vertex size")?;
    let vertex_count = reader.read_len("vertex count")?;
    let index_size = reader.read_len("index size")?;
    let index_count = reader.read_len("index count")?;
    let lod_threshold = reader.read_f32()?;

    let vertex_bytes = buffer_size(vertex_size, vertex_count)?;
    let index_bytes = buffer_size(index_size, index_count)?;
    let vertices = reader.read_bytes(vertex_bytes)?.to_vec();
    let indices = reader.read_bytes(index_bytes)?.to_vec();

    let mesh = Mesh::new(vertex_size, vertex_count, index_size, index_count, vertices, indices)?;
    Ok(MeshRecord {
        name,
        lod_id,
        lod_threshold,
        mesh,
    })
}

fn buffer_size(stride: usize, count: usize) -> AssetResult<usize> {
    stride.checked_mul(count).ok_or_else(|| {
        AssetError::MalformedStructure(format!("buffer of {count} x {stride} bytes overflows"))
    })
}

/// LOD ids below zero never merge records
fn is_valid_lod_id(lod_id: i32) -> bool {
    lod_id >= 0
}

/// Groups mesh records into LODs in first-seen order
#[derive(Default)]
struct LodAggregator {
    /// LOD id to index into `lods`
    seen: AHashMap<i32, usize>,
    lods: Vec<MeshLod>,
}

impl LodAggregator {
    fn push(&mut self, record: MeshRecord) {
        if is_valid_lod_id(record.lod_id) {
            if let Some(&index) = self.seen.get(&record.lod_id) {
                self.lods[index].meshes.push(record.mesh);
                return;
            }
            self.seen.insert(record.lod_id, self.lods.len());
        }

        self.lods.push(MeshLod {
            name: record.name,
            lod_threshold: record.lod_threshold,
            meshes: vec![record.mesh],
        });
    }
}

/// Builder for raw import blobs, the producer side of [`decode_scene`]
#[derive(Debug, Default)]
pub struct RawSceneWriter {
    writer: BinaryWriter,
}

impl RawSceneWriter {
    /// Start a blob with the scene name and the number of groups that follow
    pub fn new(scene_name: &str, group_count: i32) -> AssetResult<Self> {
        let mut writer = BinaryWriter::new();
        writer.write_string(scene_name)?;
        writer.write_i32(group_count);
        Ok(Self { writer })
    }

    /// Start a group; exactly `mesh_count` meshes must follow
    pub fn begin_group(&mut self, name: &str, mesh_count: i32) -> AssetResult<()> {
        self.writer.write_string(name)?;
        self.writer.write_i32(mesh_count);
        Ok(())
    }

    /// Append one mesh record
    pub fn write_mesh(
        &mut self,
        name: &str,
        lod_id: i32,
        lod_threshold: f32,
        mesh: &Mesh,
    ) -> AssetResult<()> {
        let w = &mut self.writer;
        w.write_string(name)?;
        w.write_i32(lod_id);
        w.write_len(mesh.vertex_size)?;
        w.write_len(mesh.vertex_count)?;
        w.write_len(mesh.index_size)?;
        w.write_len(mesh.index_count)?;
        w.write_f32(lod_threshold);
        w.write_bytes(&mesh.vertices);
        w.write_bytes(&mesh.indices);
        Ok(())
    }

    pub fn finish(self) -> Vec<u8> {
        self.writer.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::tests::test_mesh;

    #[test]
    fn test_shared_lod_id_merges() {
        let mut raw = RawSceneWriter::new("scene", 1).unwrap();
        raw.begin_group("rock", 2).unwrap();
        raw.write_mesh("rock_lod0", 0, 10.0, &test_mesh(3, 1.0)).unwrap();
        raw.write_mesh("rock_lod0_b", 0, 99.0, &test_mesh(4, 2.0)).unwrap();

        let groups = decode_scene(&raw.finish()).unwrap();
        assert_eq!(groups.len(), 1);
        let lods = &groups[0].lods;
        assert_eq!(lods.len(), 1);
        assert_eq!(lods[0].name, "rock_lod0");
        assert_eq!(lods[0].lod_threshold, 10.0);
        assert_eq!(lods[0].meshes.len(), 2);
        assert_eq!(lods[0].meshes[1].vertex_count, 4);
    }

    #[test]
    fn test_invalid_lod_id_always_splits() {
        let mut raw = RawSceneWriter::new("scene", 1).unwrap();
        raw.begin_group("rock", 3).unwrap();
        raw.write_mesh("a", -1, 0.0, &test_mesh(3, 1.0)).unwrap();
        raw.write_mesh("b", -1, 0.0, &test_mesh(3, 1.0)).unwrap();
        raw.write_mesh("c", 1, 5.0, &test_mesh(3, 1.0)).unwrap();

        let groups = decode_scene(&raw.finish()).unwrap();
        let names: Vec<_> = groups[0].lods.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_negative_lod_ids_never_merge() {
        let mut raw = RawSceneWriter::new("scene", 1).unwrap();
        raw.begin_group("rock", 3).unwrap();
        raw.write_mesh("a", -2, 0.0, &test_mesh(3, 1.0)).unwrap();
        raw.write_mesh("b", -2, 0.0, &test_mesh(3, 1.0)).unwrap();
        raw.write_mesh("c", i32::MIN, 0.0, &test_mesh(3, 1.0)).unwrap();

        let groups = decode_scene(&raw.finish()).unwrap();
        let names: Vec<_> = groups[0].lods.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(groups[0].lods.iter().all(|l| l.meshes.len() == 1));
    }

    #[test]
    fn test_interleaved_lod_ids_keep_first_seen_order() {
        let mut raw = RawSceneWriter::new("scene", 1).unwrap();
        raw.begin_group("tree", 4).unwrap();
        raw.write_mesh("trunk0", 0, 0.0, &test_mesh(3, 1.0)).unwrap();
        raw.write_mesh("trunk1", 1, 20.0, &test_mesh(3, 1.0)).unwrap();
        raw.write_mesh("leaves0", 0, 0.0, &test_mesh(5, 1.0)).unwrap();
        raw.write_mesh("leaves1", 1, 20.0, &test_mesh(4, 1.0)).unwrap();

        let groups = decode_scene(&raw.finish()).unwrap();
        let lods = &groups[0].lods;
        assert_eq!(lods.len(), 2);
        assert_eq!(lods[0].name, "trunk0");
        assert_eq!(lods[0].meshes[1].vertex_count, 5);
        assert_eq!(lods[1].name, "trunk1");
        assert_eq!(lods[1].meshes[1].vertex_count, 4);
    }

    #[test]
    fn test_random_names_for_unnamed() {
        let mut raw = RawSceneWriter::new("", 1).unwrap();
        raw.begin_group("", 1).unwrap();
        raw.write_mesh("", 0, 0.0, &test_mesh(3, 1.0)).unwrap();

        let groups = decode_scene(&raw.finish()).unwrap();
        assert!(groups[0].name.starts_with("lod_"));
        assert!(groups[0].lods[0].name.starts_with("mesh_"));
    }

    #[test]
    fn test_zero_groups_rejected() {
        let raw = RawSceneWriter::new("scene", 0).unwrap();
        assert!(matches!(
            decode_scene(&raw.finish()),
            Err(AssetError::MalformedStructure(_))
        ));
    }

    #[test]
    fn test_zero_meshes_rejected() {
        let mut raw = RawSceneWriter::new("scene", 1).unwrap();
        raw.begin_group("empty", 0).unwrap();
        assert!(matches!(
            decode_scene(&raw.finish()),
            Err(AssetError::MalformedStructure(_))
        ));
    }

    #[test]
    fn test_truncated_payload() {
        let mut raw = RawSceneWriter::new("scene", 1).unwrap();
        raw.begin_group("rock", 1).unwrap();
        raw.write_mesh("m", 0, 0.0, &test_mesh(3, 1.0)).unwrap();
        let mut bytes = raw.finish();
        bytes.truncate(bytes.len() - 5);

        assert!(matches!(
            decode_scene(&bytes),
            Err(AssetError::TruncatedData { .. })
        ));
    }

    #[test]
    fn test_missing_group() {
        // declares two groups, holds one
        let mut raw = RawSceneWriter::new("scene", 2).unwrap();
        raw.begin_group("rock", 1).unwrap();
        raw.write_mesh("m", 0, 0.0, &test_mesh(3, 1.0)).unwrap();
        assert!(matches!(
            decode_scene(&raw.finish()),
            Err(AssetError::TruncatedData { .. })
        ));
    }

    #[test]
    fn test_bad_index_size_rejected() {
        let mut w = BinaryWriter::new();
        w.write_string("scene").unwrap();
        w.write_i32(1);
        w.write_string("g").unwrap();
        w.write_i32(1);
        w.write_string("m").unwrap();
        w.write_i32(0);
        w.write_i32(32);
        w.write_i32(0);
        w.write_i32(3);
        w.write_i32(1);
        w.write_f32(0.0);
        w.write_bytes(&[0, 0, 0]);

        assert!(matches!(
            decode_scene(&w.into_bytes()),
            Err(AssetError::MalformedStructure(_))
        ));
    }
}
