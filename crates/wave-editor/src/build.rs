//! Game code build and run through an external IDE.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Solution configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BuildConfiguration {
    #[default]
    Debug,
    DebugEditor,
    Release,
    ReleaseEditor,
}

impl BuildConfiguration {
    /// Configuration name as it appears in the solution
    pub fn name(self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::DebugEditor => "DebugEditor",
            Self::Release => "Release",
            Self::ReleaseEditor => "ReleaseEditor",
        }
    }

    /// Configuration that builds the game code library loaded by the editor
    pub fn editor_variant(self) -> Self {
        match self {
            Self::Debug | Self::DebugEditor => Self::DebugEditor,
            Self::Release | Self::ReleaseEditor => Self::ReleaseEditor,
        }
    }
}

/// Game project opened in the editor
#[derive(Debug, Clone, PartialEq)]
pub struct EditorProject {
    pub name: String,
    pub path: PathBuf,
}

impl EditorProject {
    pub fn new(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            path,
        }
    }

    /// `<path>/<name>.sln`
    pub fn solution(&self) -> PathBuf {
        self.path.join(format!("{}.sln", self.name))
    }
}

/// IDE automation used to build and launch game code
pub trait BuildService {
    /// Build the solution; fails when the IDE is busy or the build fails
    fn build_solution(
        &mut self,
        project: &EditorProject,
        configuration: BuildConfiguration,
    ) -> anyhow::Result<()>;

    /// Start the last successful build
    fn run(&mut self, project: &EditorProject, configuration: BuildConfiguration, debug: bool);

    /// Stop a running game
    fn stop(&mut self);

    /// True while the IDE is running a process
    fn is_debugging(&self) -> bool;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;

    /// Calls seen by [`RecordingBuildService`]
    #[derive(Debug, Default)]
    pub(crate) struct BuildLog {
        pub builds: Vec<(String, BuildConfiguration)>,
        pub runs: Vec<(String, bool)>,
        pub stops: usize,
    }

    /// Build service that records calls and succeeds unless told otherwise
    #[derive(Default)]
    pub(crate) struct RecordingBuildService {
        pub log: Arc<Mutex<BuildLog>>,
        pub fail_builds: bool,
        pub debugging: bool,
    }

    impl BuildService for RecordingBuildService {
        fn build_solution(
            &mut self,
            project: &EditorProject,
            configuration: BuildConfiguration,
        ) -> anyhow::Result<()> {
            self.log.lock().builds.push((project.name.clone(), configuration));
            if self.fail_builds {
                anyhow::bail!("build of {} failed", project.name);
            }
            Ok(())
        }

        fn run(&mut self, project: &EditorProject, _configuration: BuildConfiguration, debug: bool) {
            self.log.lock().runs.push((project.name.clone(), debug));
            self.debugging = true;
        }

        fn stop(&mut self) {
            self.log.lock().stops += 1;
            self.debugging = false;
        }

        fn is_debugging(&self) -> bool {
            self.debugging
        }
    }

    #[test]
    fn test_configuration_names() {
        assert_eq!(BuildConfiguration::Debug.name(), "Debug");
        assert_eq!(BuildConfiguration::ReleaseEditor.name(), "ReleaseEditor");
        assert_eq!(
            BuildConfiguration::Release.editor_variant(),
            BuildConfiguration::ReleaseEditor
        );
        assert_eq!(
            BuildConfiguration::DebugEditor.editor_variant(),
            BuildConfiguration::DebugEditor
        );
    }

    #[test]
    fn test_solution_path() {
        let project = EditorProject::new("Tanks", PathBuf::from("projects/Tanks"));
        assert_eq!(project.solution(), PathBuf::from("projects/Tanks/Tanks.sln"));
    }
}
