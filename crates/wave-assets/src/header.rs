//! Asset file header shared by every asset type.
//!
//! ```text
//! asset type   i32
//! guid         blob (16 bytes)
//! import date  i64, unix milliseconds
//! hash         blob
//! source path  string
//! icon         blob, PNG
//! ```

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::binary::{BinaryReader, BinaryWriter};
use crate::{AssetError, AssetResult, AssetType};

/// File extension of every saved asset
pub const ASSET_FILE_EXTENSION: &str = "asset";

/// Metadata stored in front of every asset file
#[derive(Debug, Clone, PartialEq)]
pub struct AssetHeader {
    pub asset_type: AssetType,
    pub guid: Uuid,
    pub import_date: DateTime<Utc>,
    pub hash: Vec<u8>,
    pub source_path: String,
    pub icon: Vec<u8>,
}

impl AssetHeader {
    pub fn new(asset_type: AssetType) -> Self {
        Self {
            asset_type,
            guid: Uuid::new_v4(),
            import_date: Utc::now(),
            hash: Vec::new(),
            source_path: String::new(),
            icon: Vec::new(),
        }
    }

    pub fn write(&self, writer: &mut BinaryWriter) -> AssetResult<()> {
        writer.write_i32(self.asset_type.tag());
        writer.write_blob(self.guid.as_bytes())?;
        writer.write_i64(self.import_date.timestamp_millis());
        writer.write_blob(&self.hash)?;
        writer.write_string(&self.source_path)?;
        writer.write_blob(&self.icon)?;
        Ok(())
    }

    pub fn read(reader: &mut BinaryReader<'_>) -> AssetResult<Self> {
        let asset_type = AssetType::from_tag(reader.read_i32()?);
        let guid = Uuid::from_slice(reader.read_blob()?)
            .map_err(|e| AssetError::MalformedStructure(format!("invalid guid: {e}")))?;
        let millis = reader.read_i64()?;
        let import_date = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
            AssetError::MalformedStructure(format!("import date out of range: {millis}"))
        })?;
        let hash = reader.read_blob()?.to_vec();
        let source_path = reader.read_string()?;
        let icon = reader.read_blob()?.to_vec();

        Ok(Self {
            asset_type,
            guid,
            import_date,
            hash,
            source_path,
            icon,
        })
    }
}

/// Common surface of editor assets
pub trait Asset {
    fn header(&self) -> &AssetHeader;

    fn header_mut(&mut self) -> &mut AssetHeader;

    fn asset_type(&self) -> AssetType {
        self.header().asset_type
    }
}
