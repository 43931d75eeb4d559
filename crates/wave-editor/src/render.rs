//! Preview Rendering
//!
//! Software rasterizer for mesh previews and thumbnails, and a dedicated
//! render thread that owns a renderer and serves requests over a channel.

use std::thread::{self, JoinHandle};

use crossbeam::channel::{bounded, unbounded, Sender};
use glam::{Mat4, Vec2, Vec3, Vec4};
use image::{Rgba, RgbaImage};
use wave_assets::{AssetError, AssetResult, MeshLod, ThumbnailRenderer};

use crate::config::{Color, ViewportConfig};
use crate::viewport::MeshRenderer;

fn color_to_vec(color: Color) -> Vec3 {
    Vec3::new(
        f32::from(color[0]),
        f32::from(color[1]),
        f32::from(color[2]),
    ) / 255.0
}

/// Flat-shaded z-buffered rasterizer
#[derive(Debug, Clone, Default)]
pub struct PreviewRenderer {
    config: ViewportConfig,
}

impl PreviewRenderer {
    pub fn new(config: ViewportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Draw the LOD held by `mesh_renderer` from its camera
    pub fn draw(&self, mesh_renderer: &MeshRenderer, width: u32, height: u32) -> RgbaImage {
        let mut image = RgbaImage::from_pixel(width, height, Rgba(self.config.background));
        if width == 0 || height == 0 {
            return image;
        }

        let camera = mesh_renderer.camera();
        let projection = Mat4::perspective_rh(
            self.config.fov.to_radians(),
            width as f32 / height as f32,
            self.config.near,
            self.config.far,
        );
        let view_projection = projection * camera.view_matrix();
        let light_direction = camera.position.normalize_or_zero();

        let mut target = RasterTarget {
            image: &mut image,
            depth: vec![f32::INFINITY; width as usize * height as usize],
        };

        for mesh in &mesh_renderer.vertex_data().meshes {
            let projected: Vec<Option<Vec3>> = mesh
                .positions
                .iter()
                .map(|p| project(&view_projection, *p, width, height))
                .collect();

            for triangle in mesh.indices.chunks_exact(3) {
                let corners = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
                let (Some(Some(a)), Some(Some(b)), Some(Some(c))) = (
                    projected.get(corners[0]),
                    projected.get(corners[1]),
                    projected.get(corners[2]),
                ) else {
                    continue;
                };

                let normal = corners
                    .iter()
                    .filter_map(|&i| mesh.normals.get(i))
                    .copied()
                    .sum::<Vec3>()
                    .normalize_or_zero();
                let color = self.shade(normal, light_direction);
                target.fill_triangle([*a, *b, *c], color);
            }
        }

        image
    }

    fn shade(&self, normal: Vec3, light_direction: Vec3) -> Rgba<u8> {
        let lambert = normal.dot(light_direction).max(0.0);
        let hemisphere = 0.5 * (normal.y + 1.0);
        let light = color_to_vec(self.config.ambient_light)
            + color_to_vec(self.config.key_light) * lambert
            + color_to_vec(self.config.sky_light) * hemisphere
            + color_to_vec(self.config.ground_light) * (1.0 - hemisphere);
        let lit = (color_to_vec(self.config.diffuse) * light).clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
        Rgba([lit.x as u8, lit.y as u8, lit.z as u8, 0xff])
    }
}

impl ThumbnailRenderer for PreviewRenderer {
    fn render(&self, lod: &MeshLod, width: u32, height: u32) -> AssetResult<RgbaImage> {
        let mesh_renderer = MeshRenderer::new(lod, None)?;
        Ok(self.draw(&mesh_renderer, width, height))
    }
}

/// Screen-space x, y and NDC depth, `None` behind the camera
fn project(view_projection: &Mat4, position: Vec3, width: u32, height: u32) -> Option<Vec3> {
    let clip: Vec4 = *view_projection * position.extend(1.0);
    if clip.w <= f32::EPSILON {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    Some(Vec3::new(
        (ndc.x + 1.0) * 0.5 * width as f32,
        (1.0 - ndc.y) * 0.5 * height as f32,
        ndc.z,
    ))
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}

struct RasterTarget<'a> {
    image: &'a mut RgbaImage,
    depth: Vec<f32>,
}

impl RasterTarget<'_> {
    fn fill_triangle(&mut self, [a, b, c]: [Vec3; 3], color: Rgba<u8>) {
        let (a2, b2, c2) = (a.truncate(), b.truncate(), c.truncate());
        let area = edge(a2, b2, c2);
        if area.abs() < f32::EPSILON {
            return;
        }

        let (width, height) = self.image.dimensions();
        let min = a2.min(b2).min(c2).floor().max(Vec2::ZERO);
        let max = a2
            .max(b2)
            .max(c2)
            .ceil()
            .min(Vec2::new(width as f32 - 1.0, height as f32 - 1.0));
        if min.x > max.x || min.y > max.y {
            return;
        }

        for y in min.y as u32..=max.y as u32 {
            for x in min.x as u32..=max.x as u32 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                // dividing by the signed area accepts both windings
                let wa = edge(b2, c2, p) / area;
                let wb = edge(c2, a2, p) / area;
                let wc = edge(a2, b2, p) / area;
                if wa < 0.0 || wb < 0.0 || wc < 0.0 {
                    continue;
                }

                let z = wa * a.z + wb * b.z + wc * c.z;
                let index = y as usize * width as usize + x as usize;
                if (-1.0..=1.0).contains(&z) && z < self.depth[index] {
                    self.depth[index] = z;
                    self.image.put_pixel(x, y, color);
                }
            }
        }
    }
}

enum RenderCommand {
    Render {
        lod: MeshLod,
        width: u32,
        height: u32,
        reply: Sender<AssetResult<RgbaImage>>,
    },
    Shutdown,
}

/// Thread that owns a renderer. Requests from any thread go through
/// [`RenderThreadHandle`].
pub struct RenderThread {
    sender: Sender<RenderCommand>,
    thread: Option<JoinHandle<()>>,
}

impl RenderThread {
    /// Spawn the render thread; the renderer is created on it
    pub fn spawn<F, R>(make_renderer: F) -> std::io::Result<Self>
    where
        F: FnOnce() -> R + Send + 'static,
        R: ThumbnailRenderer + 'static,
    {
        let (sender, receiver) = unbounded::<RenderCommand>();
        let thread = thread::Builder::new()
            .name("render".to_string())
            .spawn(move || {
                let renderer = make_renderer();
                log::debug!("Render thread started");
                while let Ok(command) = receiver.recv() {
                    match command {
                        RenderCommand::Render {
                            lod,
                            width,
                            height,
                            reply,
                        } => {
                            // the requester may have given up
                            let _ = reply.send(renderer.render(&lod, width, height));
                        }
                        RenderCommand::Shutdown => break,
                    }
                }
                log::debug!("Render thread stopped");
            })?;

        Ok(Self {
            sender,
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> RenderThreadHandle {
        RenderThreadHandle {
            sender: self.sender.clone(),
        }
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        let _ = self.sender.send(RenderCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Render thread panicked");
            }
        }
    }
}

/// Cloneable sender side of a [`RenderThread`]. Rendering blocks until the
/// render thread replies.
#[derive(Clone)]
pub struct RenderThreadHandle {
    sender: Sender<RenderCommand>,
}

impl ThumbnailRenderer for RenderThreadHandle {
    fn render(&self, lod: &MeshLod, width: u32, height: u32) -> AssetResult<RgbaImage> {
        let stopped = || AssetError::Encoding("render thread is not running".to_string());
        let (reply, response) = bounded(1);
        self.sender
            .send(RenderCommand::Render {
                lod: lod.clone(),
                width,
                height,
                reply,
            })
            .map_err(|_| stopped())?;
        response.recv().map_err(|_| stopped())?
    }
}
