//! Geometry Asset
//!
//! In-memory mesh hierarchy (LOD group → LOD → mesh), construction from raw
//! content-tool output, and the `.asset` file format.
//!
//! ```text
//! header            see `AssetHeader`
//! import settings   see `GeometryImportSettings::write`
//! payload length    i32
//! payload           see `payload`
//! ```

pub mod payload;
pub mod raw;

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::binary::{BinaryReader, BinaryWriter};
use crate::content::{sanitize_file_name, sanitize_name};
use crate::header::{ASSET_FILE_EXTENSION, Asset, AssetHeader};
use crate::thumbnail::{ThumbnailRenderer, generate_icon};
use crate::{AssetError, AssetResult, AssetType};

/// One packed vertex buffer and its index buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Bytes per vertex
    pub vertex_size: usize,
    pub vertex_count: usize,
    /// Bytes per index, 2 or 4
    pub index_size: usize,
    pub index_count: usize,
    pub vertices: Vec<u8>,
    pub indices: Vec<u8>,
}

impl Mesh {
    /// Create a mesh, checking that the buffers match the declared layout
    pub fn new(
        vertex_size: usize,
        vertex_count: usize,
        index_size: usize,
        index_count: usize,
        vertices: Vec<u8>,
        indices: Vec<u8>,
    ) -> AssetResult<Self> {
        if vertex_size == 0 {
            return Err(AssetError::MalformedStructure("vertex size is zero".to_string()));
        }
        if index_size != 2 && index_size != 4 {
            return Err(AssetError::MalformedStructure(format!(
                "index size must be 2 or 4, got {index_size}"
            )));
        }
        if Some(vertices.len()) != vertex_size.checked_mul(vertex_count) {
            return Err(AssetError::MalformedStructure(format!(
                "vertex buffer holds {} bytes, expected {vertex_count} x {vertex_size}",
                vertices.len()
            )));
        }
        if Some(indices.len()) != index_size.checked_mul(index_count) {
            return Err(AssetError::MalformedStructure(format!(
                "index buffer holds {} bytes, expected {index_count} x {index_size}",
                indices.len()
            )));
        }

        Ok(Self {
            vertex_size,
            vertex_count,
            index_size,
            index_count,
            vertices,
            indices,
        })
    }
}

/// Meshes drawn together at one level of detail
#[derive(Debug, Clone, PartialEq)]
pub struct MeshLod {
    pub name: String,
    /// Camera distance above which this LOD is used
    pub lod_threshold: f32,
    pub meshes: Vec<Mesh>,
}

/// All LODs of one object; index 0 is the most detailed
#[derive(Debug, Clone, PartialEq)]
pub struct LodGroup {
    pub name: String,
    pub lods: Vec<MeshLod>,
}

/// Settings forwarded to the content tools on import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryImportSettings {
    /// Angle in degrees below which adjacent face normals are smoothed
    pub smoothing_angle: f32,
    pub calculate_normals: bool,
    pub calculate_tangents: bool,
    pub reserve_handedness: bool,
    pub import_embedded_textures: bool,
    /// Carried for the content tools; animation import is not implemented
    pub import_animations: bool,
}

impl Default for GeometryImportSettings {
    fn default() -> Self {
        Self {
            smoothing_angle: 178.0,
            calculate_normals: false,
            calculate_tangents: false,
            reserve_handedness: false,
            import_embedded_textures: true,
            import_animations: false,
        }
    }
}

impl GeometryImportSettings {
    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.write_bool(self.calculate_normals);
        writer.write_bool(self.calculate_tangents);
        writer.write_f32(self.smoothing_angle);
        writer.write_bool(self.reserve_handedness);
        writer.write_bool(self.import_embedded_textures);
        writer.write_bool(self.import_animations);
    }

    pub fn read(reader: &mut BinaryReader<'_>) -> AssetResult<Self> {
        Ok(Self {
            calculate_normals: reader.read_bool()?,
            calculate_tangents: reader.read_bool()?,
            smoothing_angle: reader.read_f32()?,
            reserve_handedness: reader.read_bool()?,
            import_embedded_textures: reader.read_bool()?,
            import_animations: reader.read_bool()?,
        })
    }
}

/// Geometry asset: LOD groups plus import settings and file metadata
#[derive(Debug, Clone)]
pub struct Geometry {
    header: AssetHeader,
    lod_groups: Vec<LodGroup>,
    pub import_settings: GeometryImportSettings,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

impl Asset for Geometry {
    fn header(&self) -> &AssetHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut AssetHeader {
        &mut self.header
    }
}

impl Geometry {
    /// Create an empty geometry asset
    pub fn new() -> Self {
        Self {
            header: AssetHeader::new(AssetType::Mesh),
            lod_groups: Vec::new(),
            import_settings: GeometryImportSettings::default(),
        }
    }

    pub fn lod_groups(&self) -> &[LodGroup] {
        &self.lod_groups
    }

    pub fn lod_group(&self, index: usize) -> Option<&LodGroup> {
        self.lod_groups.get(index)
    }

    /// Remember the file this geometry was imported from
    pub fn set_source_path(&mut self, path: impl Into<String>) {
        self.header.source_path = path.into();
    }

    /// Replace the LOD groups with the content of a raw import blob.
    ///
    /// On error the current groups are kept.
    pub fn from_raw_data(&mut self, data: &[u8]) -> AssetResult<()> {
        let lod_groups = raw::decode_scene(data)?;
        log::info!("Imported {} LOD groups", lod_groups.len());
        self.lod_groups = lod_groups;
        self.header.import_date = Utc::now();
        Ok(())
    }

    /// Write one asset file per LOD group next to `file`.
    ///
    /// Returns the files written. A failure is logged and stops the save;
    /// files written before it are still returned. Groups whose LOD 0 names
    /// sanitize to the same file overwrite each other, last one wins.
    pub fn save(&mut self, file: &Path, renderer: &dyn ThumbnailRenderer) -> Vec<PathBuf> {
        let mut saved: Vec<PathBuf> = Vec::new();
        if self.lod_groups.is_empty() {
            log::warn!("No geometry to save to {}", file.display());
            return saved;
        }

        for index in 0..self.lod_groups.len() {
            match self.save_group(index, file, renderer) {
                Ok(path) => {
                    if saved.contains(&path) {
                        log::warn!(
                            "Geometry {} was already written by this save, overwriting",
                            path.display()
                        );
                    }
                    log::info!("Saved geometry to {}", path.display());
                    saved.push(path);
                }
                Err(e) => {
                    log::error!("Failed to save geometry to {}: {e}", file.display());
                    break;
                }
            }
        }

        saved
    }

    fn save_group(
        &mut self,
        index: usize,
        file: &Path,
        renderer: &dyn ThumbnailRenderer,
    ) -> AssetResult<PathBuf> {
        let group = &self.lod_groups[index];
        let lod0 = group.lods.first().ok_or_else(|| {
            AssetError::MalformedStructure(format!("LOD group {} has no LODs", group.name))
        })?;

        let path = asset_file_path(file, self.lod_groups.len(), &lod0.name);
        let encoded = payload::encode_lod_group(group)?;
        let icon = generate_icon(renderer, lod0)?;

        let mut header = self.header.clone();
        header.guid = Uuid::new_v4();
        header.hash = encoded.hash;
        header.icon = icon;

        let mut writer = BinaryWriter::new();
        header.write(&mut writer)?;
        self.import_settings.write(&mut writer);
        writer.write_len(encoded.data.len())?;
        writer.write_bytes(&encoded.data);

        std::fs::write(&path, writer.into_bytes())?;
        self.header = header;
        Ok(path)
    }

    /// Read an asset file written by [`Geometry::save`]
    pub fn load(path: &Path) -> AssetResult<Self> {
        let bytes = std::fs::read(path)?;
        let geometry = Self::from_asset_bytes(&bytes)?;
        log::debug!("Loaded geometry from {}", path.display());
        Ok(geometry)
    }

    /// Decode the content of an asset file
    pub fn from_asset_bytes(bytes: &[u8]) -> AssetResult<Self> {
        let mut reader = BinaryReader::new(bytes);
        let header = AssetHeader::read(&mut reader)?;
        if header.asset_type != AssetType::Mesh {
            return Err(AssetError::UnexpectedAssetType {
                expected: AssetType::Mesh,
                found: header.asset_type,
            });
        }

        let import_settings = GeometryImportSettings::read(&mut reader)?;
        let payload_len = reader.read_len("payload length")?;
        let group = payload::decode_lod_group(reader.read_bytes(payload_len)?)?;

        if payload::group_hash(&group)? != header.hash {
            log::warn!("Content hash mismatch in geometry {}", group.name);
        }

        Ok(Self {
            header,
            lod_groups: vec![group],
            import_settings,
        })
    }

    /// Load on tokio's blocking pool and hand the result to `callback`.
    ///
    /// Must be called from within a tokio runtime. Dropping the handle does
    /// not cancel the load.
    pub fn load_in_background<F>(path: PathBuf, callback: F) -> tokio::task::JoinHandle<()>
    where
        F: FnOnce(AssetResult<Geometry>) + Send + 'static,
    {
        tokio::task::spawn_blocking(move || callback(Geometry::load(&path)))
    }
}

/// `<dir>/<stem>.asset`, or `<dir>/<stem>_<lod0 name>.asset` when several
/// groups share the same target
fn asset_file_path(file: &Path, group_count: usize, lod0_name: &str) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = if group_count > 1 {
        format!("{stem}_{}.{ASSET_FILE_EXTENSION}", sanitize_name(lod0_name))
    } else {
        format!("{stem}.{ASSET_FILE_EXTENSION}")
    };
    let dir = file.parent().unwrap_or_else(|| Path::new(""));
    sanitize_file_name(&dir.join(name))
}
