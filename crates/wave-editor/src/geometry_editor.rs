//! Geometry Editor
//!
//! Editor state for one geometry asset: the LOD being previewed, its
//! renderer, and distance-driven LOD switching.

use std::path::PathBuf;
use std::sync::Arc;

use glam::Vec3;
use parking_lot::Mutex;
use wave_assets::{AssetError, AssetResult, Geometry, MeshLod};

use crate::viewport::{select_lod, MeshRenderer};

/// Geometry editor shared with background loads
pub type SharedGeometryEditor = Arc<Mutex<GeometryEditor>>;

#[derive(Debug)]
pub struct GeometryEditor {
    geometry: Option<Geometry>,
    renderer: Option<MeshRenderer>,
    lod_index: usize,
    /// Switch LODs when the camera moves
    pub auto_lod: bool,
}

impl Default for GeometryEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryEditor {
    pub fn new() -> Self {
        Self {
            geometry: None,
            renderer: None,
            lod_index: 0,
            auto_lod: true,
        }
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn mesh_renderer(&self) -> Option<&MeshRenderer> {
        self.renderer.as_ref()
    }

    fn lods(&self) -> &[MeshLod] {
        self.geometry
            .as_ref()
            .and_then(|geometry| geometry.lod_group(0))
            .map_or(&[], |group| group.lods.as_slice())
    }

    pub fn lod_index(&self) -> usize {
        self.lod_index
    }

    pub fn max_lod_index(&self) -> usize {
        self.lods().len().saturating_sub(1)
    }

    /// Show another LOD, clamped to the available range. The camera is kept.
    pub fn set_lod_index(&mut self, index: usize) -> AssetResult<()> {
        if self.lods().is_empty() {
            return Ok(());
        }
        let index = index.min(self.max_lod_index());
        if index != self.lod_index || self.renderer.is_none() {
            self.lod_index = index;
            self.rebuild_renderer()?;
        }
        Ok(())
    }

    /// Edit `geometry`; the current LOD index is kept when it still exists
    pub fn set_asset(&mut self, geometry: Geometry) -> AssetResult<()> {
        let lod_count = geometry.lod_group(0).map_or(0, |group| group.lods.len());
        if lod_count == 0 {
            return Err(AssetError::MalformedStructure(
                "geometry has no LODs to edit".to_string(),
            ));
        }

        self.geometry = Some(geometry);
        self.lod_index = self.lod_index.min(lod_count - 1);
        self.rebuild_renderer()?;
        self.compute_lod()
    }

    /// Move the camera (offset from its target) and re-evaluate the LOD
    pub fn on_camera_moved(&mut self, position: Vec3) -> AssetResult<()> {
        if let Some(renderer) = &mut self.renderer {
            renderer.set_camera_position(position);
        }
        self.compute_lod()
    }

    fn rebuild_renderer(&mut self) -> AssetResult<()> {
        let renderer = MeshRenderer::new(&self.lods()[self.lod_index], self.renderer.as_ref())?;
        self.renderer = Some(renderer);
        Ok(())
    }

    fn compute_lod(&mut self) -> AssetResult<()> {
        if !self.auto_lod || self.lods().len() < 2 {
            return Ok(());
        }
        let Some(renderer) = &self.renderer else {
            return Ok(());
        };

        let distance = renderer.camera().distance();
        let thresholds: Vec<f32> = self.lods().iter().map(|lod| lod.lod_threshold).collect();
        if let Some(index) = select_lod(&thresholds, distance) {
            self.set_lod_index(index)?;
        }
        Ok(())
    }
}

/// Load `path` on the blocking pool and hand the geometry to `editor`.
///
/// Failures are logged. Must be called from within a tokio runtime.
pub fn open_in_background(
    editor: &SharedGeometryEditor,
    path: PathBuf,
) -> tokio::task::JoinHandle<()> {
    let editor = Arc::clone(editor);
    let display = path.display().to_string();
    Geometry::load_in_background(path, move |result| {
        match result.and_then(|geometry| editor.lock().set_asset(geometry)) {
            Ok(()) => log::info!("Opened geometry {display}"),
            Err(e) => log::error!("Failed to open geometry {display}: {e}"),
        }
    })
}
