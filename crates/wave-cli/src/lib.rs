//! # Wave CLI
//!
//! Command-line access to the Wave geometry pipeline.
//!
//! ## Commands
//! - `import` - Convert content-tool output into geometry assets
//! - `inspect` - Print the header and LODs of an asset file
//! - `primitive` - Generate a primitive mesh asset
//! - `config` - Write the default editor configuration

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec3;
use serde::Serialize;
use wave_assets::primitive::create_primitive_geometry;
use wave_assets::{
    Asset, Geometry, GeometryImportSettings, PrimitiveInitInfo, PrimitiveMeshType,
};
use wave_editor::{EditorConfig, PreviewRenderer, RenderThread};

/// Wave geometry pipeline CLI
#[derive(Parser)]
#[command(name = "wave")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Editor configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Convert raw content-tool output into geometry assets
    Import {
        /// Raw scene data
        input: PathBuf,

        /// Target asset file; defaults to the input with an .asset extension
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Import settings as JSON, overriding the editor configuration
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },

    /// Print the header and LODs of an asset file
    Inspect {
        /// Asset file
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a primitive mesh asset
    Primitive {
        /// Shape to generate
        #[arg(value_enum)]
        shape: Shape,

        /// Target asset file; defaults to `<shape>.asset`
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Segments along x, y and z
        #[arg(long, value_delimiter = ',', default_values_t = [1, 1, 1])]
        segments: Vec<u32>,

        /// Size along x, y and z
        #[arg(long, value_delimiter = ',', default_values_t = [1.0, 1.0, 1.0])]
        size: Vec<f32>,
    },

    /// Write the default editor configuration
    Config {
        /// Target file
        #[arg(default_value = "wave_editor.json")]
        path: PathBuf,
    },
}

/// Primitive shapes accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shape {
    Plane,
    Cube,
    UvSphere,
    IcoSphere,
    Cylinder,
    Capsule,
}

impl From<Shape> for PrimitiveMeshType {
    fn from(shape: Shape) -> Self {
        match shape {
            Shape::Plane => Self::Plane,
            Shape::Cube => Self::Cube,
            Shape::UvSphere => Self::UvSphere,
            Shape::IcoSphere => Self::IcoSphere,
            Shape::Cylinder => Self::Cylinder,
            Shape::Capsule => Self::Capsule,
        }
    }
}

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let filter = if cli.verbose { "debug" } else { "info" };
    // a logger may already be installed when running inside tests
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .try_init();

    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Commands::Import {
            input,
            output,
            settings,
        } => {
            let settings = match settings {
                Some(path) => load_import_settings(&path)?,
                None => config.import_settings.clone(),
            };
            let output = output.unwrap_or_else(|| input.with_extension("asset"));
            let saved = import(&input, &output, settings, &config)?;
            for path in saved {
                println!("{}", path.display());
            }
        }

        Commands::Inspect { file, json } => {
            let geometry = Geometry::load(&file)
                .with_context(|| format!("Failed to load {}", file.display()))?;
            let summary = AssetSummary::new(&geometry);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{summary}");
            }
        }

        Commands::Primitive {
            shape,
            output,
            segments,
            size,
        } => {
            let info = primitive_info(shape, &segments, &size)?;
            let output = output.unwrap_or_else(|| {
                PathBuf::from(PrimitiveMeshType::from(shape).name()).with_extension("asset")
            });
            let saved = primitive(&info, &output, &config)?;
            println!("{}", saved.display());
        }

        Commands::Config { path } => {
            EditorConfig::default().save(&path)?;
            log::info!("Wrote default configuration to {}", path.display());
        }
    }

    Ok(())
}

fn load_import_settings(path: &Path) -> Result<GeometryImportSettings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read import settings {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid import settings {}", path.display()))
}

/// Decode `input` and save one asset per LOD group next to `output`
pub fn import(
    input: &Path,
    output: &Path,
    settings: GeometryImportSettings,
    config: &EditorConfig,
) -> Result<Vec<PathBuf>> {
    let data =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;

    let mut geometry = Geometry::new();
    geometry.import_settings = settings;
    geometry.set_source_path(input.to_string_lossy());
    geometry
        .from_raw_data(&data)
        .with_context(|| format!("Failed to import {}", input.display()))?;

    let saved = save(&mut geometry, output, config)?;
    if saved.len() < geometry.lod_groups().len() {
        bail!(
            "Saved {} of {} LOD groups to {}",
            saved.len(),
            geometry.lod_groups().len(),
            output.display()
        );
    }
    Ok(saved)
}

fn primitive_info(shape: Shape, segments: &[u32], size: &[f32]) -> Result<PrimitiveInitInfo> {
    let [sx, sy, sz] = segments else {
        bail!("Expected three segment counts, got {}", segments.len());
    };
    let [x, y, z] = size else {
        bail!("Expected three sizes, got {}", size.len());
    };

    let mut info = PrimitiveInitInfo::new(shape.into());
    info.segments = [*sx, *sy, *sz];
    info.size = Vec3::new(*x, *y, *z);
    Ok(info)
}

/// Generate a primitive and save it to `output`
pub fn primitive(info: &PrimitiveInitInfo, output: &Path, config: &EditorConfig) -> Result<PathBuf> {
    let Some(mut geometry) = create_primitive_geometry(info)? else {
        bail!("{} primitives are not supported", info.mesh_type.name());
    };

    save(&mut geometry, output, config)?
        .into_iter()
        .next()
        .with_context(|| format!("Failed to save {}", output.display()))
}

/// Save with thumbnails drawn on a render thread
fn save(geometry: &mut Geometry, output: &Path, config: &EditorConfig) -> Result<Vec<PathBuf>> {
    let viewport = config.viewport.clone();
    let render_thread = RenderThread::spawn(move || PreviewRenderer::new(viewport))
        .context("Failed to start the render thread")?;
    Ok(geometry.save(output, &render_thread.handle()))
}

#[derive(Debug, Serialize)]
struct LodSummary {
    name: String,
    threshold: f32,
    meshes: usize,
    vertices: usize,
    triangles: usize,
}

#[derive(Debug, Serialize)]
struct GroupSummary {
    name: String,
    lods: Vec<LodSummary>,
}

/// What `inspect` prints
#[derive(Debug, Serialize)]
struct AssetSummary {
    guid: String,
    import_date: String,
    source_path: String,
    hash: String,
    icon_bytes: usize,
    import_settings: GeometryImportSettings,
    groups: Vec<GroupSummary>,
}

impl AssetSummary {
    fn new(geometry: &Geometry) -> Self {
        let header = geometry.header();
        let groups = geometry
            .lod_groups()
            .iter()
            .map(|group| GroupSummary {
                name: group.name.clone(),
                lods: group
                    .lods
                    .iter()
                    .map(|lod| LodSummary {
                        name: lod.name.clone(),
                        threshold: lod.lod_threshold,
                        meshes: lod.meshes.len(),
                        vertices: lod.meshes.iter().map(|m| m.vertex_count).sum(),
                        triangles: lod.meshes.iter().map(|m| m.index_count / 3).sum(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            guid: header.guid.to_string(),
            import_date: header.import_date.to_rfc3339(),
            source_path: header.source_path.clone(),
            hash: header.hash.iter().map(|b| format!("{b:02x}")).collect(),
            icon_bytes: header.icon.len(),
            import_settings: geometry.import_settings.clone(),
            groups,
        }
    }
}

impl std::fmt::Display for AssetSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "guid:        {}", self.guid)?;
        writeln!(f, "imported:    {}", self.import_date)?;
        writeln!(f, "source:      {}", self.source_path)?;
        writeln!(f, "hash:        {}", self.hash)?;
        writeln!(f, "icon:        {} bytes", self.icon_bytes)?;
        for group in &self.groups {
            writeln!(f, "group {}", group.name)?;
            for (i, lod) in group.lods.iter().enumerate() {
                writeln!(
                    f,
                    "  lod {i} {:<16} threshold {:>8.2}  {} meshes, {} vertices, {} triangles",
                    lod.name, lod.threshold, lod.meshes, lod.vertices, lod.triangles
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wave_assets::geometry::raw::RawSceneWriter;

    fn cube() -> Geometry {
        create_primitive_geometry(&PrimitiveInitInfo::new(PrimitiveMeshType::Cube))
            .unwrap()
            .unwrap()
    }

    /// Raw scene with a three-LOD `rock` group and a single-LOD `tree` group
    fn raw_scene() -> Vec<u8> {
        let cube = cube();
        let mesh = &cube.lod_groups()[0].lods[0].meshes[0];

        let mut raw = RawSceneWriter::new("props", 2).unwrap();
        raw.begin_group("rock", 3).unwrap();
        raw.write_mesh("rock_high", 0, 40.0, mesh).unwrap();
        raw.write_mesh("rock_mid", 1, 15.0, mesh).unwrap();
        raw.write_mesh("rock_low", 2, 0.0, mesh).unwrap();
        raw.begin_group("tree", 1).unwrap();
        raw.write_mesh("tree", -1, 0.0, mesh).unwrap();
        raw.finish()
    }

    #[test]
    fn test_cli_parse() {
        let cli = Cli::parse_from(["wave", "inspect", "rock.asset"]);
        assert!(matches!(cli.command, Commands::Inspect { json: false, .. }));
    }

    #[test]
    fn test_primitive_command() {
        let cli = Cli::parse_from([
            "wave",
            "-v",
            "primitive",
            "uv-sphere",
            "--segments",
            "16,8,1",
            "--size",
            "2,2,2",
        ]);
        assert!(cli.verbose);
        if let Commands::Primitive {
            shape,
            segments,
            size,
            output,
        } = cli.command
        {
            assert_eq!(shape, Shape::UvSphere);
            assert_eq!(segments, vec![16, 8, 1]);
            assert_eq!(size, vec![2.0, 2.0, 2.0]);
            assert!(output.is_none());
        } else {
            panic!("Expected Primitive command");
        }
    }

    #[test]
    fn test_primitive_info_validation() {
        let info = primitive_info(Shape::Plane, &[4, 2, 1], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(info.mesh_type, PrimitiveMeshType::Plane);
        assert_eq!(info.segments, [4, 2, 1]);
        assert_eq!(info.size, Vec3::new(1.0, 2.0, 3.0));

        assert!(primitive_info(Shape::Plane, &[4, 2], &[1.0, 1.0, 1.0]).is_err());
        assert!(primitive_info(Shape::Plane, &[1, 1, 1], &[1.0]).is_err());
    }

    #[test]
    fn test_primitive_saves_asset() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("cube.asset");
        let info = PrimitiveInitInfo::new(PrimitiveMeshType::Cube);

        let saved = primitive(&info, &output, &EditorConfig::default()).unwrap();
        assert_eq!(saved, output);

        let geometry = Geometry::load(&saved).unwrap();
        assert_eq!(geometry.lod_groups()[0].name, "cube");
        assert!(!geometry.header().icon.is_empty());
    }

    #[test]
    fn test_unsupported_primitive() {
        let dir = tempfile::tempdir().unwrap();
        let info = PrimitiveInitInfo::new(PrimitiveMeshType::Capsule);
        let result = primitive(&info, &dir.path().join("capsule.asset"), &EditorConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_import_writes_one_file_per_group() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("props.raw");
        std::fs::write(&input, raw_scene()).unwrap();

        let settings = GeometryImportSettings {
            calculate_tangents: true,
            ..Default::default()
        };
        let saved = import(
            &input,
            &dir.path().join("props.asset"),
            settings,
            &EditorConfig::default(),
        )
        .unwrap();

        assert_eq!(
            saved,
            vec![
                dir.path().join("props_rock_high.asset"),
                dir.path().join("props_tree.asset"),
            ]
        );

        let rock = Geometry::load(&saved[0]).unwrap();
        assert!(rock.import_settings.calculate_tangents);
        assert_eq!(rock.header().source_path, input.to_string_lossy());

        let summary = AssetSummary::new(&rock);
        assert_eq!(summary.groups[0].lods.len(), 3);
        assert_eq!(summary.groups[0].lods[1].name, "rock_mid");
        assert_eq!(summary.groups[0].lods[1].triangles, 12);
        assert_eq!(summary.hash.len(), 64);
        assert!(summary.to_string().contains("rock_low"));
    }

    #[test]
    fn test_import_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.raw");
        std::fs::write(&input, [1, 2, 3]).unwrap();

        let result = import(
            &input,
            &dir.path().join("broken.asset"),
            GeometryImportSettings::default(),
            &EditorConfig::default(),
        );
        assert!(result.is_err());
        assert!(!dir.path().join("broken.asset").exists());
    }

    #[test]
    fn test_execute_inspect() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("plane.asset");
        primitive(
            &PrimitiveInitInfo::new(PrimitiveMeshType::Plane),
            &output,
            &EditorConfig::default(),
        )
        .unwrap();

        let cli = Cli::parse_from(["wave", "inspect", "--json", output.to_str().unwrap()]);
        execute(cli).unwrap();

        let missing = dir.path().join("missing.asset");
        let cli = Cli::parse_from(["wave", "inspect", missing.to_str().unwrap()]);
        assert!(execute(cli).is_err());
    }

    #[test]
    fn test_execute_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.json");
        let cli = Cli::parse_from(["wave", "config", path.to_str().unwrap()]);
        execute(cli).unwrap();

        let cli = Cli::parse_from([
            "wave",
            "--config",
            path.to_str().unwrap(),
            "inspect",
            "missing.asset",
        ]);
        // the config loads; only the asset is missing
        let error = execute(cli).unwrap_err();
        assert!(error.to_string().contains("missing.asset"));
    }
}
