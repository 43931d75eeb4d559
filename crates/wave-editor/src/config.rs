//! Editor configuration, stored as JSON.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use wave_assets::GeometryImportSettings;

use crate::build::BuildConfiguration;

/// RGBA color, 0-255 per channel
pub type Color = [u8; 4];

/// Preview viewport configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Field of view in degrees
    pub fov: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
    /// Clear color; transparent for thumbnails
    pub background: Color,
    /// Light from the camera direction
    pub key_light: Color,
    /// Light from above
    pub sky_light: Color,
    /// Light from below
    pub ground_light: Color,
    pub ambient_light: Color,
    pub diffuse: Color,
    /// Switch LODs by camera distance
    pub auto_lod: bool,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            fov: 60.0,
            near: 0.01,
            far: 10000.0,
            background: [0, 0, 0, 0],
            key_light: [0xae, 0xae, 0xae, 0xff],
            sky_light: [0x11, 0x3b, 0x30, 0xff],
            ground_light: [0x3f, 0x2f, 0x1e, 0xff],
            ambient_light: [0x3b, 0x3b, 0x3b, 0xff],
            diffuse: [0xff, 0xff, 0xff, 0xff],
            auto_lod: true,
        }
    }
}

/// Editor-wide settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub viewport: ViewportConfig,
    /// Settings for new geometry imports
    pub import_settings: GeometryImportSettings,
    /// Configuration used when running the game from the editor
    pub run_configuration: BuildConfiguration,
}

impl EditorConfig {
    /// Read a JSON config file; missing fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }
}
