//! Asset thumbnails.
//!
//! The picture itself comes from a viewport renderer owned by the editor;
//! this module only asks for it and turns it into the PNG icon blob.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::geometry::MeshLod;
use crate::{AssetError, AssetResult};

/// Edge length of the image requested from the renderer
pub const THUMBNAIL_RENDER_SIZE: u32 = 90 * 4;

/// Edge length of the stored icon
pub const ICON_SIZE: u32 = 90;

/// Renders a preview of one LOD.
///
/// Implementations that own graphics resources are expected to marshal the
/// call onto their render thread.
pub trait ThumbnailRenderer {
    fn render(&self, lod: &MeshLod, width: u32, height: u32) -> AssetResult<RgbaImage>;
}

/// Render `lod`, downscale it and encode it as PNG
pub fn generate_icon(renderer: &dyn ThumbnailRenderer, lod: &MeshLod) -> AssetResult<Vec<u8>> {
    let image = renderer.render(lod, THUMBNAIL_RENDER_SIZE, THUMBNAIL_RENDER_SIZE)?;
    let icon = image::imageops::resize(&image, ICON_SIZE, ICON_SIZE, FilterType::Triangle);
    encode_png(icon)
}

/// Encode an RGBA image as PNG bytes
pub fn encode_png(image: RgbaImage) -> AssetResult<Vec<u8>> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| AssetError::Encoding(e.to_string()))?;
    Ok(bytes)
}
