// src/core/config_store.rs

use crate::models::Project;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Errors raised while reading or writing project descriptors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The name cannot be used as a descriptor file name.
    #[error("Invalid project name '{name}'. Use letters, digits, '-', '_' or '.'.")]
    InvalidName { name: String },
    /// No descriptor file exists for the name.
    #[error("Config file for {name} could not be found!")]
    NotFound { name: String },
    /// The descriptor exists but is not a valid project document.
    #[error("Config file for {name} could not be loaded. Not a valid json? ({source})")]
    InvalidConfig {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    /// Reading or writing the descriptor failed.
    #[error("Filesystem error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The project could not be turned into JSON.
    #[error("Failed to serialize project '{name}': {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

type ConfigResult<T> = Result<T, ConfigError>;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ConfigError + '_ {
    move |source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Names become descriptor file names: ASCII letters, digits, `-`, `_` and
/// `.`, never starting with a dot.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// One JSON descriptor per project under the projects directory, keyed by the
/// lower-cased project name.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    projects_dir: PathBuf,
}

impl ConfigStore {
    /// A store rooted at `projects_dir`. Nothing is created until the first save.
    pub fn new(projects_dir: impl Into<PathBuf>) -> Self {
        Self {
            projects_dir: projects_dir.into(),
        }
    }

    /// The directory holding the descriptors.
    pub fn projects_dir(&self) -> &Path {
        &self.projects_dir
    }

    /// Where the descriptor for `name` lives. The name is not checked.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.projects_dir.join(format!("{}.json", name.to_lowercase()))
    }

    fn descriptor_path(&self, name: &str) -> ConfigResult<PathBuf> {
        if !is_valid_name(name) {
            return Err(ConfigError::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(self.path_for(name))
    }

    /// `false` for invalid names as well as missing files.
    pub fn exists(&self, name: &str) -> bool {
        is_valid_name(name) && self.path_for(name).is_file()
    }

    /// Reads and parses the descriptor for `name`.
    pub fn load(&self, name: &str) -> ConfigResult<Project> {
        let path = self.descriptor_path(name)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ConfigError::NotFound {
                    name: name.to_string(),
                });
            }
            Err(e) => return Err(io_error(&path)(e)),
        };

        serde_json::from_str(&content).map_err(|source| ConfigError::InvalidConfig {
            name: name.to_string(),
            source,
        })
    }

    /// Removes the old descriptor and writes the new one in its place. This is
    /// not an atomic rename: a crash between the two steps loses the file.
    pub fn save(&self, project: &Project) -> ConfigResult<PathBuf> {
        let path = self.descriptor_path(&project.name)?;
        let json = serde_json::to_string_pretty(project).map_err(|source| {
            ConfigError::Serialize {
                name: project.name.clone(),
                source,
            }
        })?;

        fs::create_dir_all(&self.projects_dir).map_err(io_error(&self.projects_dir))?;
        self.remove(&project.name)?;
        fs::write(&path, json).map_err(io_error(&path))?;
        log::debug!("Saved descriptor for '{}' to {}", project.name, path.display());
        Ok(path)
    }

    /// Deletes the descriptor. Removing a missing descriptor is a no-op.
    pub fn remove(&self, name: &str) -> ConfigResult<()> {
        let path = self.descriptor_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    /// Names (file stems) of every descriptor, sorted.
    pub fn list(&self) -> ConfigResult<Vec<String>> {
        if !self.projects_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.projects_dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| ConfigError::Io {
                path: self.projects_dir.display().to_string(),
                source: e.into(),
            })?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
