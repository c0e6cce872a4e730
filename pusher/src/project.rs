//! Unity project layout and initialisation.
//!
//! Every command runs against an explicit [`ProjectLayout`]; nothing reads the
//! current directory after the CLI has resolved it.

use crate::config::CONFIG_FILE_NAME;
use crate::error::{PusherError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use std::fs;

/// Directory, relative to the project root, that holds the registry.
pub const REGISTRY_DIR_NAME: &str = ".tn";

/// Oldest supported Unity release year.
pub const MIN_EDITOR_YEAR: u32 = 2018;

/// Paths of interest inside a Unity project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: Utf8PathBuf,
}

impl ProjectLayout {
    /// Create a layout rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the layout from an optional CLI override, defaulting to the
    /// current directory.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::ProjectNotFound`] when the current directory is
    /// not valid UTF-8, or [`PusherError::Io`] when it cannot be read.
    pub fn resolve(project: Option<&Utf8Path>) -> Result<Self> {
        if let Some(root) = project {
            return Ok(Self::new(root));
        }

        let cwd = std::env::current_dir()?;
        let root = Utf8PathBuf::try_from(cwd).map_err(|err| PusherError::ProjectNotFound {
            project: Utf8PathBuf::from("."),
            reason: format!("current directory is not valid UTF-8: {err}"),
        })?;
        Ok(Self::new(root))
    }

    /// Project root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Unity's `Assets` folder; target paths resolve against it.
    #[must_use]
    pub fn assets_dir(&self) -> Utf8PathBuf {
        self.root.join("Assets")
    }

    /// Unity's `ProjectSettings` folder.
    #[must_use]
    pub fn project_settings_dir(&self) -> Utf8PathBuf {
        self.root.join("ProjectSettings")
    }

    /// `ProjectSettings/ProjectVersion.txt`.
    #[must_use]
    pub fn version_file(&self) -> Utf8PathBuf {
        self.project_settings_dir().join("ProjectVersion.txt")
    }

    /// Registry directory holding one folder per integration.
    #[must_use]
    pub fn registry_dir(&self) -> Utf8PathBuf {
        self.root.join(REGISTRY_DIR_NAME)
    }

    /// Optional configuration file inside the registry directory.
    #[must_use]
    pub fn config_path(&self) -> Utf8PathBuf {
        self.registry_dir().join(CONFIG_FILE_NAME)
    }

    /// Fail unless `init` has created the registry directory.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::NotInitialised`] when the directory is missing.
    pub fn require_initialised(&self) -> Result<()> {
        if self.registry_dir().is_dir() {
            Ok(())
        } else {
            Err(PusherError::NotInitialised {
                project: self.root.clone(),
            })
        }
    }

    /// Check that the root is a supported Unity project and return the
    /// editor version it was last opened with.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::ProjectNotFound`] when a required folder or the
    /// version file is missing or unreadable, or
    /// [`PusherError::UnsupportedEditorVersion`] for editors older than 2018.
    pub fn detect_unity_project(&self) -> Result<EditorVersion> {
        for (dir, label) in [
            (self.assets_dir(), "Assets"),
            (self.project_settings_dir(), "ProjectSettings"),
        ] {
            if !dir.is_dir() {
                return Err(self.not_a_project(format!("missing {label} folder")));
            }
        }

        let version_file = self.version_file();
        let contents = fs::read_to_string(&version_file)
            .map_err(|err| self.not_a_project(format!("cannot read {version_file}: {err}")))?;
        let version = EditorVersion::parse(&contents)
            .ok_or_else(|| self.not_a_project(format!("{version_file} has no m_EditorVersion")))?;

        if version.year < MIN_EDITOR_YEAR {
            return Err(PusherError::UnsupportedEditorVersion {
                version: version.raw,
            });
        }
        debug!("detected Unity {}", version.raw);
        Ok(version)
    }

    /// Verify the Unity project and create the registry directory.
    ///
    /// Running this on an initialised project changes nothing.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::detect_unity_project`] failures, and I/O errors from
    /// creating the directory.
    pub fn init(&self) -> Result<InitOutcome> {
        let version = self.detect_unity_project()?;
        let registry_dir = self.registry_dir();
        if registry_dir.is_dir() {
            return Ok(InitOutcome::AlreadyInitialised);
        }

        fs::create_dir_all(&registry_dir)?;
        info!("created registry directory {registry_dir}");
        Ok(InitOutcome::Created { version })
    }

    fn not_a_project(&self, reason: String) -> PusherError {
        PusherError::ProjectNotFound {
            project: self.root.clone(),
            reason,
        }
    }
}

/// Result of [`ProjectLayout::init`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// The registry directory was created.
    Created {
        /// Editor version found in the project.
        version: EditorVersion,
    },
    /// The registry directory already existed.
    AlreadyInitialised,
}

/// Unity editor version from `ProjectVersion.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorVersion {
    /// Full version string, e.g. `2019.4.1f1`.
    pub raw: String,
    /// Release year, the first dotted component.
    pub year: u32,
}

impl EditorVersion {
    /// Parse the `m_EditorVersion:` line of `ProjectVersion.txt`.
    ///
    /// # Examples
    ///
    /// ```
    /// use toitnups_pusher::project::EditorVersion;
    ///
    /// let version = EditorVersion::parse("m_EditorVersion: 2019.4.1f1\n").expect("version");
    /// assert_eq!(version.year, 2019);
    /// assert_eq!(version.raw, "2019.4.1f1");
    /// ```
    #[must_use]
    pub fn parse(contents: &str) -> Option<Self> {
        let raw = contents
            .lines()
            .find_map(|line| line.trim().strip_prefix("m_EditorVersion:"))?
            .trim();
        let year = raw.split('.').next()?.parse().ok()?;
        Some(Self {
            raw: raw.to_owned(),
            year,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Project {
        _dir: TempDir,
        layout: ProjectLayout,
    }

    #[fixture]
    fn unity_project() -> Project {
        let dir = tempfile::tempdir().expect("create tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_owned()).expect("utf-8 tempdir");
        let layout = ProjectLayout::new(root);
        fs::create_dir_all(layout.assets_dir()).expect("create Assets");
        fs::create_dir_all(layout.project_settings_dir()).expect("create ProjectSettings");
        fs::write(
            layout.version_file(),
            "m_EditorVersion: 2021.3.5f1\nm_EditorVersionWithRevision: 2021.3.5f1 (40eb3a945986)\n",
        )
        .expect("write ProjectVersion.txt");
        Project { _dir: dir, layout }
    }

    #[rstest]
    fn init_creates_registry_once(unity_project: Project) {
        let layout = &unity_project.layout;

        let first = layout.init().expect("first init");
        assert!(matches!(first, InitOutcome::Created { version } if version.year == 2021));
        assert!(layout.registry_dir().is_dir());

        let second = layout.init().expect("second init");
        assert_eq!(second, InitOutcome::AlreadyInitialised);
    }

    #[rstest]
    fn require_initialised_fails_before_init(unity_project: Project) {
        let err = unity_project
            .layout
            .require_initialised()
            .expect_err("not initialised yet");
        assert!(matches!(err, PusherError::NotInitialised { .. }));
    }

    #[rstest]
    #[case::assets("Assets")]
    #[case::settings("ProjectSettings")]
    fn missing_unity_folder_is_not_a_project(unity_project: Project, #[case] folder: &str) {
        let layout = &unity_project.layout;
        fs::remove_dir_all(layout.root().join(folder)).expect("remove folder");

        let err = layout.init().expect_err("not a Unity project");
        assert!(
            matches!(&err, PusherError::ProjectNotFound { reason, .. } if reason.contains(folder))
        );
        assert!(!layout.registry_dir().exists());
    }

    #[rstest]
    fn missing_version_file_is_not_a_project(unity_project: Project) {
        let layout = &unity_project.layout;
        fs::remove_file(layout.version_file()).expect("remove version file");

        let err = layout.init().expect_err("no version file");
        assert!(matches!(err, PusherError::ProjectNotFound { .. }));
    }

    #[rstest]
    fn old_editor_is_rejected(unity_project: Project) {
        let layout = &unity_project.layout;
        fs::write(layout.version_file(), "m_EditorVersion: 2017.4.40f1\n").expect("write version");

        let err = layout.init().expect_err("old editor");
        assert!(
            matches!(&err, PusherError::UnsupportedEditorVersion { version } if version == "2017.4.40f1")
        );
        assert!(!layout.registry_dir().exists());
    }

    #[rstest]
    #[case::first_line("m_EditorVersion: 2018.1.0f2", Some(2018))]
    #[case::crlf("m_EditorVersion: 6000.0.23f1\r\n", Some(6000))]
    #[case::missing_key("editor: 2019.1", None)]
    #[case::not_a_number("m_EditorVersion: next.1", None)]
    fn parses_editor_version(#[case] contents: &str, #[case] year: Option<u32>) {
        assert_eq!(EditorVersion::parse(contents).map(|v| v.year), year);
    }
}
