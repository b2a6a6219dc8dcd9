// src/core/env_loader.rs

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{
    DEFAULT_TLD, DEFAULT_UID, ENV_EXAMPLE_FILENAME, ENV_FILENAME, LAUNCHER_TLD_KEY, XDEBUG_HOST,
};
use crate::core::paths::LauncherPaths;
use crate::models::{Project, Service};

/// Failures while reading or seeding dotenv files.
#[derive(Error, Debug)]
pub enum EnvError {
    /// The file exists but is not valid dotenv.
    #[error("Could not read environment file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: dotenvy::Error,
    },
    /// Copying `.env.example` to `.env` failed.
    #[error("Could not create '{target}' from '{example}': {source}")]
    SeedFromExample {
        example: String,
        target: String,
        #[source]
        source: std::io::Error,
    },
}

/// Environment handed to child processes, layered on top of whatever the
/// launcher itself inherited. Nothing here is ever written into the launcher's
/// own process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvContext {
    vars: BTreeMap<String, String>,
}

impl EnvContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The global layer from `<launcher home>/.env`. A missing file yields an
    /// empty context.
    pub fn load_global(paths: &LauncherPaths) -> Result<Self, EnvError> {
        let mut ctx = Self::new();
        ctx.merge_file(&paths.env_file())?;
        Ok(ctx)
    }

    /// The value of `key`, if any layer set it.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Sets `key`, replacing any layered value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Every variable, sorted by key.
    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    /// Layers a dotenv file over the current values. Returns `false` when the
    /// file does not exist.
    pub fn merge_file(&mut self, path: &Path) -> Result<bool, EnvError> {
        if !path.is_file() {
            return Ok(false);
        }
        log::debug!("Loading environment from {}", path.display());
        let iter = dotenvy::from_path_iter(path).map_err(|source| EnvError::Read {
            path: path.display().to_string(),
            source,
        })?;
        for item in iter {
            match item {
                Ok((key, value)) => {
                    self.vars.insert(key, value);
                }
                Err(e) => log::warn!("Skipping unreadable line in {}: {}", path.display(), e),
            }
        }
        Ok(true)
    }

    /// The global context plus the project-level `.env`, if the project has
    /// one. Built once per command invocation.
    pub fn for_project(&self, project: &Project) -> Result<Self, EnvError> {
        let mut ctx = self.clone();
        ctx.merge_file(&project.directory().join(ENV_FILENAME))?;
        Ok(ctx)
    }

    /// The context for one service operation: the service `.env` (seeded from
    /// `.env.example` when missing) over this context, then the computed values.
    pub fn for_service(&self, project: &Project, service: &Service) -> Result<Self, EnvError> {
        let service_dir = project.service_dir(service);
        let env_file = ensure_service_env(&service_dir)?;

        let mut ctx = self.clone();
        ctx.merge_file(&env_file)?;
        ctx.inject_computed(project, current_uid());
        Ok(ctx)
    }

    /// Computed values always win over anything read from a file.
    pub fn inject_computed(&mut self, project: &Project, uid: u32) {
        let tld = project
            .tld
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.get(LAUNCHER_TLD_KEY).filter(|t| !t.is_empty()))
            .unwrap_or(DEFAULT_TLD)
            .to_string();

        self.set("UID", uid.to_string());
        self.set("WWWUSER", uid.to_string());
        self.set("XDEBUG_HOST", XDEBUG_HOST);
        self.set("TLD", tld);
    }
}

/// Copies `.env.example` to `.env` when the example exists and `.env` does
/// not. An existing `.env` is never touched.
pub fn ensure_service_env(service_dir: &Path) -> Result<PathBuf, EnvError> {
    let env_file = service_dir.join(ENV_FILENAME);
    let example = service_dir.join(ENV_EXAMPLE_FILENAME);
    if !env_file.exists() && example.is_file() {
        log::info!("Creating {} from {}", env_file.display(), example.display());
        fs::copy(&example, &env_file).map_err(|source| EnvError::SeedFromExample {
            example: example.display().to_string(),
            target: env_file.display().to_string(),
            source,
        })?;
    }
    Ok(env_file)
}

/// The current user id, or the fixed default when it cannot be determined or
/// is root.
#[cfg(unix)]
pub fn current_uid() -> u32 {
    match nix::unistd::getuid().as_raw() {
        0 => DEFAULT_UID,
        uid => uid,
    }
}

/// Always the fallback uid off unix.
#[cfg(not(unix))]
pub fn current_uid() -> u32 {
    DEFAULT_UID
}
