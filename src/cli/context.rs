// src/cli/context.rs

use std::fmt;
use std::path::PathBuf;

use crate::constants::PROJECTS_DIRECTORY_KEY;
use crate::core::config_store::ConfigStore;
use crate::core::env_loader::{EnvContext, EnvError};
use crate::core::paths::LauncherPaths;
use crate::system::executor::CommandRunner;
use crate::system::prompt::{AcceptDefaults, Prompter};

/// Everything a handler needs: where the launcher lives, the global
/// environment and the two outside-world boundaries.
pub struct AppContext<'a> {
    /// The launcher home layout.
    pub paths: LauncherPaths,
    /// Descriptors under `paths.projects_dir()`.
    pub store: ConfigStore,
    /// The global `.env`, reloaded after `config` rewrites it.
    pub env: EnvContext,
    /// Runs `git`, `docker` and friends.
    pub runner: &'a dyn CommandRunner,
    /// Asks the user. Swapped for `AcceptDefaults` under `--default`.
    pub prompter: &'a dyn Prompter,
    /// Relative project directories resolve against this.
    pub cwd: PathBuf,
}

impl fmt::Debug for AppContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("paths", &self.paths)
            .field("store", &self.store)
            .field("env", &self.env)
            .field("cwd", &self.cwd)
            .finish_non_exhaustive()
    }
}

impl<'a> AppContext<'a> {
    /// Loads the global `.env` from `paths` and opens the descriptor store.
    pub fn new(
        paths: LauncherPaths,
        runner: &'a dyn CommandRunner,
        prompter: &'a dyn Prompter,
        cwd: PathBuf,
    ) -> Result<Self, EnvError> {
        let env = EnvContext::load_global(&paths)?;
        Ok(Self {
            store: ConfigStore::new(paths.projects_dir()),
            paths,
            env,
            runner,
            prompter,
            cwd,
        })
    }

    /// Re-reads the global `.env`.
    pub fn reload_env(&mut self) -> Result<(), EnvError> {
        self.env = EnvContext::load_global(&self.paths)?;
        Ok(())
    }

    /// Switches to answering every prompt with its default.
    pub fn accept_defaults(&mut self) {
        self.prompter = &AcceptDefaults;
    }

    /// `PROJECTS_DIRECTORY` from the global `.env`, when set.
    pub fn projects_root(&self) -> Option<PathBuf> {
        self.env
            .get(PROJECTS_DIRECTORY_KEY)
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
    }
}
