// src/core/paths.rs

use crate::constants::{ENV_FILENAME, LAUNCHER_HOME_DIR, LAUNCHER_HOME_ENV, PROJECTS_DIR};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures while locating or creating the launcher home.
#[derive(Error, Debug)]
pub enum PathError {
    /// Neither `$LAUNCHER_HOME` nor a user home is available.
    #[error("Could not determine the user's home directory.")]
    HomeDirNotFound,
    /// A file sits where a directory is expected.
    #[error("The launcher home at '{path}' is corrupt: {reason}")]
    CorruptHome { path: String, reason: &'static str },
    /// Creating part of the layout failed.
    #[error("Could not create directory '{path}': {source}")]
    DirCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Locations inside the launcher home. Passed around explicitly so tests can
/// point it at a scratch directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherPaths {
    home: PathBuf,
}

impl LauncherPaths {
    /// Paths rooted at `home`. Nothing is touched on disk.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// `$LAUNCHER_HOME` if set, otherwise `~/.launcher`.
    pub fn resolve() -> Result<Self, PathError> {
        if let Some(custom) = std::env::var_os(LAUNCHER_HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(custom));
        }
        let home = dirs::home_dir().ok_or(PathError::HomeDirNotFound)?;
        Ok(Self::new(home.join(LAUNCHER_HOME_DIR)))
    }

    /// The launcher home itself.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// `<home>/projects`, one descriptor per project.
    pub fn projects_dir(&self) -> PathBuf {
        self.home.join(PROJECTS_DIR)
    }

    /// `<home>/.env`, the global environment.
    pub fn env_file(&self) -> PathBuf {
        self.home.join(ENV_FILENAME)
    }

    /// The launcher counts as configured once both the home and its `.env` exist.
    pub fn is_configured(&self) -> bool {
        self.home.is_dir() && self.env_file().is_file()
    }

    /// Fails if something other than a directory sits where the home or the
    /// projects folder should be. Missing entries are fine.
    pub fn validate(&self) -> Result<(), PathError> {
        if self.home.exists() && !self.home.is_dir() {
            return Err(PathError::CorruptHome {
                path: self.home.display().to_string(),
                reason: "it is not a directory",
            });
        }
        let projects = self.projects_dir();
        if projects.exists() && !projects.is_dir() {
            return Err(PathError::CorruptHome {
                path: self.home.display().to_string(),
                reason: "'projects' is not a directory",
            });
        }
        Ok(())
    }

    /// Creates the home and its projects folder if needed.
    pub fn ensure_layout(&self) -> Result<(), PathError> {
        self.validate()?;
        let projects = self.projects_dir();
        fs::create_dir_all(&projects).map_err(|e| PathError::DirCreation {
            path: projects.display().to_string(),
            source: e,
        })
    }
}

/// Turns what the user typed as a project directory into an absolute path.
///
/// * `""`, `"."` -> `cwd`
/// * `"./x"` -> `cwd/x`
/// * `"/abs"` -> itself
/// * `"~/x"` -> home-relative
/// * anything else -> under `projects_root` when configured, otherwise `cwd`
pub fn resolve_directory(input: &str, cwd: &Path, projects_root: Option<&Path>) -> PathBuf {
    let input = input.trim();
    if input.is_empty() || input == "." {
        return cwd.to_path_buf();
    }
    if let Some(rest) = input.strip_prefix("./") {
        return cwd.join(rest);
    }
    if input.starts_with('~') {
        return PathBuf::from(shellexpand::tilde(input).into_owned());
    }
    let path = Path::new(input);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match projects_root {
        Some(root) => expand_home(root).join(path),
        None => cwd.join(path),
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) if s.starts_with('~') => PathBuf::from(shellexpand::tilde(s).into_owned()),
        _ => path.to_path_buf(),
    }
}
