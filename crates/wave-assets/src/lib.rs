//! # Wave Assets
//!
//! Geometry asset pipeline for the Wave editor.
//!
//! ## Features
//! - Little-endian binary cursor for the raw import and asset file formats
//! - Packed vertex and index buffer decoding
//! - Mesh → LOD → LOD group aggregation from content-tool output
//! - Versioned geometry asset files with content hashes and PNG thumbnails
//! - Primitive mesh generation (plane, cube, UV sphere)

pub mod binary;
pub mod content;
pub mod geometry;
pub mod header;
pub mod primitive;
pub mod thumbnail;
pub mod vertex;

pub use geometry::{Geometry, GeometryImportSettings, LodGroup, Mesh, MeshLod};
pub use header::{ASSET_FILE_EXTENSION, Asset, AssetHeader};
pub use primitive::{PrimitiveInitInfo, PrimitiveMeshType};
pub use thumbnail::ThumbnailRenderer;
pub use vertex::{LodVertexData, MeshVertexData};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Asset errors
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Truncated data: needed {needed} bytes, {remaining} remaining")]
    TruncatedData { needed: usize, remaining: usize },

    #[error("Malformed structure: {0}")]
    MalformedStructure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding failed: {0}")]
    Encoding(String),

    #[error("Unexpected asset type: expected {expected:?}, found {found:?}")]
    UnexpectedAssetType { expected: AssetType, found: AssetType },
}

/// Result type for asset operations
pub type AssetResult<T> = Result<T, AssetError>;

/// Asset type categories, tagged as they appear in asset file headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum AssetType {
    Unknown = 0,
    Animation = 1,
    Audio = 2,
    Material = 3,
    Mesh = 4,
    Skeleton = 5,
    Texture = 6,
}

impl AssetType {
    /// Tag written into the asset header
    pub fn tag(self) -> i32 {
        self as i32
    }

    /// Map a header tag back to a type; unknown tags become `Unknown`
    pub fn from_tag(tag: i32) -> Self {
        match tag {
            1 => Self::Animation,
            2 => Self::Audio,
            3 => Self::Material,
            4 => Self::Mesh,
            5 => Self::Skeleton,
            6 => Self::Texture,
            _ => Self::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_type_tags() {
        for ty in [
            AssetType::Animation,
            AssetType::Audio,
            AssetType::Material,
            AssetType::Mesh,
            AssetType::Skeleton,
            AssetType::Texture,
        ] {
            assert_eq!(AssetType::from_tag(ty.tag()), ty);
        }
        assert_eq!(AssetType::from_tag(99), AssetType::Unknown);
    }

    #[test]
    fn test_error_messages() {
        let err = AssetError::TruncatedData {
            needed: 4,
            remaining: 1,
        };
        assert_eq!(err.to_string(), "Truncated data: needed 4 bytes, 1 remaining");
    }
}
