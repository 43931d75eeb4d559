//! # Wave Editor
//!
//! Editor-side model for the Wave engine, without the GUI layer.
//!
//! ## Features
//! - Geometry editor with preview camera and distance-driven LOD switching
//! - Software preview renderer for thumbnails, on a dedicated render thread
//! - Undo/redo history
//! - Game code build and run through an external IDE

pub mod build;
pub mod config;
pub mod geometry_editor;
pub mod render;
pub mod viewport;

pub use build::{BuildConfiguration, BuildService, EditorProject};
pub use config::{EditorConfig, ViewportConfig};
pub use geometry_editor::{GeometryEditor, SharedGeometryEditor};
pub use render::{PreviewRenderer, RenderThread, RenderThreadHandle};
pub use viewport::{MeshRenderer, ViewCamera, select_lod};

use std::path::PathBuf;

use anyhow::{Context, bail};
use wave_core::undo_redo::UndoRedo;

/// Editor state
pub struct Editor {
    pub project: Option<EditorProject>,
    pub config: EditorConfig,
    pub undo_redo: UndoRedo,
    pub geometry_editor: GeometryEditor,
    build: Box<dyn BuildService>,
    is_playing: bool,
}

impl Editor {
    pub fn new(config: EditorConfig, build: Box<dyn BuildService>) -> Self {
        let mut geometry_editor = GeometryEditor::new();
        geometry_editor.auto_lod = config.viewport.auto_lod;

        Self {
            project: None,
            config,
            undo_redo: UndoRedo::new(),
            geometry_editor,
            build,
            is_playing: false,
        }
    }

    /// Open a project; the directory name is the project name
    pub fn open_project(&mut self, path: PathBuf) -> anyhow::Result<()> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .context("Project path has no directory name")?
            .to_string();

        log::info!("Opened project {name}");
        self.project = Some(EditorProject::new(name, path));
        self.undo_redo.reset();
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Build the game code and start it
    pub fn play(&mut self, debug: bool) -> anyhow::Result<()> {
        let Some(project) = &self.project else {
            bail!("No project is open");
        };
        if self.build.is_debugging() {
            bail!("A game process is already running");
        }

        let configuration = self.config.run_configuration;
        self.build
            .build_solution(project, configuration)
            .with_context(|| format!("Failed to build {}", project.name))?;
        self.build.run(project, configuration, debug);
        self.is_playing = true;
        log::info!("Running {} ({})", project.name, configuration.name());
        Ok(())
    }

    /// Stop play mode
    pub fn stop(&mut self) {
        if self.is_playing {
            self.build.stop();
            self.is_playing = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::tests::RecordingBuildService;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wave_core::undo_redo::UndoRedoAction;

    fn editor_with(service: RecordingBuildService) -> Editor {
        Editor::new(EditorConfig::default(), Box::new(service))
    }

    #[test]
    fn test_editor_creation() {
        let editor = editor_with(RecordingBuildService::default());
        assert!(!editor.is_playing());
        assert!(editor.project.is_none());
        assert!(editor.geometry_editor.auto_lod);
    }

    #[test]
    fn test_play_mode() {
        let service = RecordingBuildService::default();
        let log = service.log.clone();
        let mut editor = editor_with(service);
        editor.open_project(PathBuf::from("projects/Tanks")).unwrap();

        editor.play(true).unwrap();
        assert!(editor.is_playing());
        assert_eq!(
            log.lock().builds,
            vec![("Tanks".to_string(), BuildConfiguration::Debug)]
        );
        assert_eq!(log.lock().runs, vec![("Tanks".to_string(), true)]);

        // already running
        assert!(editor.play(true).is_err());

        editor.stop();
        assert!(!editor.is_playing());
        assert_eq!(log.lock().stops, 1);
    }

    #[test]
    fn test_play_without_project() {
        let mut editor = editor_with(RecordingBuildService::default());
        assert!(editor.play(false).is_err());
    }

    #[test]
    fn test_failed_build_does_not_run() {
        let service = RecordingBuildService {
            fail_builds: true,
            ..Default::default()
        };
        let log = service.log.clone();
        let mut editor = editor_with(service);
        editor.open_project(PathBuf::from("projects/Tanks")).unwrap();

        assert!(editor.play(false).is_err());
        assert!(!editor.is_playing());
        assert!(log.lock().runs.is_empty());
    }

    #[test]
    fn test_open_project_resets_history() {
        let mut editor = editor_with(RecordingBuildService::default());
        let value = Rc::new(RefCell::new(0));
        editor.undo_redo.add(UndoRedoAction::property(
            "set value",
            value,
            |v: &mut i32, n: i32| *v = n,
            0,
            1,
        ));
        assert!(editor.undo_redo.can_undo());

        editor.open_project(PathBuf::from("projects/Tanks")).unwrap();
        assert!(!editor.undo_redo.can_undo());
    }
}
