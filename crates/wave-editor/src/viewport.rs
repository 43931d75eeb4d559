//! Preview Viewport
//!
//! Places the preview camera around a decoded LOD and picks LODs by camera
//! distance.

use glam::{Mat4, Vec3};
use wave_assets::{AssetError, AssetResult, LodVertexData, MeshLod};
use wave_core::math::Aabb;

/// Camera distance relative to the bounds diagonal
pub const CAMERA_RADIUS_SCALE: f32 = 1.2;

/// Average normal length above which the camera looks along it
pub const DOMINANT_NORMAL_LENGTH: f32 = 0.8;

/// Orbit camera. `position` is an offset from `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewCamera {
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for ViewCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
        }
    }
}

impl ViewCamera {
    /// Frame `bounds`, looking along `average_normal` when the mesh has a
    /// clear facing
    pub fn fit(bounds: &Aabb, average_normal: Vec3) -> Self {
        if bounds.is_empty() {
            return Self::default();
        }

        let size = bounds.size();
        let (width, height) = (size.x, size.y);
        let radius = bounds.diagonal_length() * CAMERA_RADIUS_SCALE;

        let position = if average_normal.length() > DOMINANT_NORMAL_LENGTH {
            average_normal.normalize() * radius
        } else {
            Vec3::new(width, height * 0.5, radius)
        };

        Self {
            position,
            target: bounds.center(),
        }
    }

    /// Direction the camera looks in
    pub fn direction(&self) -> Vec3 {
        -self.position
    }

    /// Camera position in world space
    pub fn offset_position(&self) -> Vec3 {
        self.position + self.target
    }

    /// Distance from the target, used for LOD selection
    pub fn distance(&self) -> f32 {
        self.position.length()
    }

    /// Right-handed view matrix
    pub fn view_matrix(&self) -> Mat4 {
        let forward = self.direction().normalize_or_zero();
        let up = if forward.dot(Vec3::Y).abs() > 0.99 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        Mat4::look_at_rh(self.offset_position(), self.target, up)
    }
}

/// Decoded LOD plus the camera looking at it
#[derive(Debug, Clone)]
pub struct MeshRenderer {
    data: LodVertexData,
    camera: ViewCamera,
}

impl MeshRenderer {
    /// Decode `lod`. With a previous renderer its camera is kept, otherwise
    /// the camera is fitted to the new bounds.
    pub fn new(lod: &MeshLod, previous: Option<&MeshRenderer>) -> AssetResult<Self> {
        if lod.meshes.is_empty() {
            return Err(AssetError::MalformedStructure(format!(
                "LOD {} has no meshes",
                lod.name
            )));
        }

        let data = LodVertexData::from_lod(lod)?;
        let camera = match previous {
            Some(previous) => previous.camera,
            None => ViewCamera::fit(&data.bounds, data.average_normal()),
        };

        log::debug!(
            "Prepared LOD {} with {} vertices, camera at {:?}",
            lod.name,
            data.vertex_count,
            camera.position
        );
        Ok(Self { data, camera })
    }

    pub fn vertex_data(&self) -> &LodVertexData {
        &self.data
    }

    pub fn camera(&self) -> &ViewCamera {
        &self.camera
    }

    pub fn set_camera_position(&mut self, position: Vec3) {
        self.camera.position = position;
    }

    pub fn set_camera_target(&mut self, target: Vec3) {
        self.camera.target = target;
    }
}

/// First LOD, scanning from the most detailed, whose threshold is below
/// `distance`
pub fn select_lod(thresholds: &[f32], distance: f32) -> Option<usize> {
    thresholds
        .iter()
        .position(|&threshold| threshold < distance)
}
