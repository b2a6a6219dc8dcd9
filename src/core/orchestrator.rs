// src/core/orchestrator.rs

//! Brings the services of a project up or down.
//!
//! Every selected service walks its own state machine and ends in exactly one
//! terminal state (`Up`, `Down`, `Skipped` or `Failed`). A service that stops
//! early never prevents the next one from being processed.

use colored::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{COMPOSE_DEV_FILENAME, COMPOSE_FILENAME, LAUNCHER_CONFIG_FILENAME};
use crate::core::env_loader::{EnvContext, EnvError};
use crate::core::hooks::{HookError, HookRunner};
use crate::models::{LauncherConfig, Project, Service};
use crate::system::executor::{CommandRunner, CommandSpec, ExecutionError};
use crate::system::prompt::Prompter;

/// Failures that abort a start or stop as a whole.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// A `.env` file could not be read or seeded.
    #[error(transparent)]
    Env(#[from] EnvError),
    /// A hook could not ask for confirmation.
    #[error(transparent)]
    Hook(#[from] HookError),
    /// A required command could not run or exited non-zero.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    /// The terminal prompt failed.
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// Why a service was not booted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The name was selected but the project has no such service.
    UnknownService,
    /// The service directory is not on disk.
    MissingDirectory(PathBuf),
    /// There is no `docker-compose.yml` to bring up.
    NoComposeFile,
    /// `launcher.json` exists but does not parse.
    InvalidLauncherConfig(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownService => f.write_str("no such service"),
            Self::MissingDirectory(path) => write!(f, "{} does not exist", path.display()),
            Self::NoComposeFile => write!(f, "there is no {} file", COMPOSE_FILENAME),
            Self::InvalidLauncherConfig(e) => write!(f, "invalid {}: {}", LAUNCHER_CONFIG_FILENAME, e),
        }
    }
}

/// One step of a service's walk through a start or stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceState {
    /// Selected for this run.
    Discovered,
    /// Directory and compose file are present.
    Validated,
    /// `.env` seeded and loaded.
    EnvPrepared,
    /// `before` hooks ran.
    PreHooksRun,
    /// Compose `-f` arguments chosen.
    ComposeFilesResolved,
    /// `after` hooks ran.
    PostHooksRun,
    /// `docker-compose up` succeeded.
    Up,
    /// `docker-compose down` ran.
    Down,
    /// Not attempted.
    Skipped(SkipReason),
    /// Attempted and failed.
    Failed(String),
}

impl ServiceState {
    /// `true` for `Up`, `Down`, `Skipped` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Up | Self::Down | Self::Skipped(_) | Self::Failed(_))
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovered => f.write_str("DISCOVERED"),
            Self::Validated => f.write_str("VALIDATED"),
            Self::EnvPrepared => f.write_str("ENV_PREPARED"),
            Self::PreHooksRun => f.write_str("PRE_HOOKS_RUN"),
            Self::ComposeFilesResolved => f.write_str("COMPOSE_FILES_RESOLVED"),
            Self::PostHooksRun => f.write_str("POST_HOOKS_RUN"),
            Self::Up => f.write_str("UP"),
            Self::Down => f.write_str("DOWN"),
            Self::Skipped(reason) => write!(f, "SKIPPED ({})", reason),
            Self::Failed(e) => write!(f, "FAILED ({})", e),
        }
    }
}

/// The states one service went through, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReport {
    /// The service name.
    pub name: String,
    /// Every state reached, starting at `Discovered`.
    pub trail: Vec<ServiceState>,
}

impl ServiceReport {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            trail: vec![ServiceState::Discovered],
        }
    }

    fn advance(&mut self, state: ServiceState) {
        log::debug!("{}: {}", self.name, state);
        self.trail.push(state);
    }

    /// The last state reached.
    pub fn state(&self) -> &ServiceState {
        self.trail.last().unwrap_or(&ServiceState::Discovered)
    }

    /// Whether `state` appears anywhere in the trail.
    pub fn reached(&self, state: &ServiceState) -> bool {
        self.trail.contains(state)
    }
}

/// Which services a start or stop applies to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selector {
    /// Every service of the project, in descriptor order.
    #[default]
    All,
    /// These names, in this order.
    Only(Vec<String>),
}

impl Selector {
    /// An empty list means every service.
    pub fn from_names(names: Vec<String>) -> Self {
        if names.is_empty() { Self::All } else { Self::Only(names) }
    }
}

/// Flags for `Orchestrator::start_services`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartOptions {
    /// Pull latest commits even when `launcher.json` does not ask for it.
    pub pull: bool,
    /// Answer yes to every confirmation.
    pub force: bool,
}

/// What `Orchestrator::pull_latest` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// The service directory has no `.git`.
    NotARepository,
    /// The working tree was dirty and the user kept the changes.
    Declined,
    /// `git pull` ran. Its exit code is logged, not enforced.
    Pulled,
}

enum Selected<'p> {
    Known(&'p Service),
    Unknown(String),
}

/// Reads `<service>/launcher.json`. A missing file is the default config.
pub fn load_launcher_config(service_dir: &Path) -> Result<LauncherConfig, String> {
    let path = service_dir.join(LAUNCHER_CONFIG_FILENAME);
    if !path.is_file() {
        return Ok(LauncherConfig::default());
    }
    let content = fs::read_to_string(&path).map_err(|e| e.to_string())?;
    serde_json::from_str(&content).map_err(|e| e.to_string())
}

/// `-f` arguments for compose: the base file, then the dev override if present.
pub fn compose_file_args(service_dir: &Path) -> Vec<String> {
    let mut args = vec!["-f".to_string(), COMPOSE_FILENAME.to_string()];
    if service_dir.join(COMPOSE_DEV_FILENAME).is_file() {
        args.push("-f".to_string());
        args.push(COMPOSE_DEV_FILENAME.to_string());
    }
    args
}

/// Starts and stops the services of one project.
pub struct Orchestrator<'a> {
    runner: &'a dyn CommandRunner,
    prompter: &'a dyn Prompter,
    /// Global plus project-level environment.
    env: &'a EnvContext,
}

impl fmt::Debug for Orchestrator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("env", &self.env)
            .finish_non_exhaustive()
    }
}

impl<'a> Orchestrator<'a> {
    /// `env` is the global environment merged with the project `.env`.
    pub fn new(runner: &'a dyn CommandRunner, prompter: &'a dyn Prompter, env: &'a EnvContext) -> Self {
        Self { runner, prompter, env }
    }

    /// Creates the project network unless one with exactly that name exists.
    /// Returns whether it was created.
    pub fn ensure_network(&self, project: &Project) -> Result<bool, ExecutionError> {
        let network = project.network_name();
        let list = CommandSpec::new("docker")
            .args(["network", "ls", "--format", "{{.Name}}"])
            .captured();
        let output = self.runner.run(&list)?.ensure_success(&list)?;

        if output.stdout.lines().any(|line| line.trim() == network) {
            println!("{}", format!(t!("start.network.exists"), network = network));
            return Ok(false);
        }

        println!("{}", format!(t!("start.network.creating"), network = network).cyan());
        let create = CommandSpec::new("docker").args(["network", "create", network.as_str()]);
        self.runner.run(&create)?.ensure_success(&create)?;
        Ok(true)
    }

    /// Pipes the token to `docker login`. Without complete credentials this
    /// does nothing and returns `false`.
    pub fn login_to_registry(&self, project: &Project) -> Result<bool, ExecutionError> {
        let Some(creds) = project.registry.credentials() else {
            log::debug!("No registry credentials for '{}'", project.name());
            return Ok(false);
        };
        println!(
            "{}",
            format!(t!("start.registry.login"), url = creds.url, user = creds.user)
        );
        let spec = CommandSpec::new("docker")
            .args(["login", "-u", creds.user, "--password-stdin", creds.url])
            .stdin(creds.token);
        self.runner.run(&spec)?.ensure_success(&spec)?;
        Ok(true)
    }

    /// Pulls the latest commit of a service repository. A dirty tree is only
    /// discarded after confirmation (or under `force`).
    pub fn pull_latest(
        &self,
        service_name: &str,
        service_dir: &Path,
        force: bool,
    ) -> Result<PullOutcome, OrchestratorError> {
        if !service_dir.join(".git").exists() {
            return Ok(PullOutcome::NotARepository);
        }
        println!("{}", format!(t!("start.pull.pulling"), service = service_name));

        let status = CommandSpec::new("git")
            .args(["status", "--porcelain"])
            .cwd(service_dir)
            .captured();
        let dirty = !self.runner.run(&status)?.stdout.trim().is_empty();

        if dirty {
            let prompt = format!(t!("start.pull.prompt_discard"), service = service_name);
            if !(force || self.prompter.confirm(&prompt, false)?) {
                println!("{}", t!("start.pull.kept_changes").yellow());
                return Ok(PullOutcome::Declined);
            }
            let checkout = CommandSpec::new("git").args(["checkout", "-f"]).cwd(service_dir);
            self.runner.run(&checkout)?.ensure_success(&checkout)?;
        }

        let pull = CommandSpec::new("git").arg("pull").cwd(service_dir);
        let output = self.runner.run(&pull)?;
        if !output.success {
            log::warn!("`git pull` for '{}' exited with {:?}", service_name, output.code);
        }
        Ok(PullOutcome::Pulled)
    }

    /// Boots each selected service in order, one report per service.
    pub fn start_services(
        &self,
        project: &Project,
        selector: &Selector,
        options: StartOptions,
    ) -> Vec<ServiceReport> {
        select(project, selector)
            .into_iter()
            .map(|selected| match selected {
                Selected::Known(service) => self.start_service(project, service, options),
                Selected::Unknown(name) => unknown(&name),
            })
            .collect()
    }

    /// Runs `docker-compose down` for each selected service.
    pub fn stop_services(&self, project: &Project, selector: &Selector) -> Vec<ServiceReport> {
        select(project, selector)
            .into_iter()
            .map(|selected| match selected {
                Selected::Known(service) => self.stop_service(project, service),
                Selected::Unknown(name) => unknown(&name),
            })
            .collect()
    }

    fn start_service(&self, project: &Project, service: &Service, options: StartOptions) -> ServiceReport {
        let mut report = ServiceReport::new(&service.name);
        let dir = project.service_dir(service);
        if !validate(&mut report, &dir) {
            return report;
        }

        println!("{}", format!(t!("start.service.booting"), service = service.name.cyan()));
        if let Err(e) = self.run_start(project, service, &dir, options, &mut report) {
            report.advance(ServiceState::Failed(e.to_string()));
        }
        report
    }

    fn run_start(
        &self,
        project: &Project,
        service: &Service,
        dir: &Path,
        options: StartOptions,
        report: &mut ServiceReport,
    ) -> Result<(), OrchestratorError> {
        let env = self.env.for_service(project, service)?;
        report.advance(ServiceState::EnvPrepared);

        let config = match load_launcher_config(dir) {
            Ok(config) => config,
            Err(e) => {
                report.advance(ServiceState::Skipped(SkipReason::InvalidLauncherConfig(e)));
                return Ok(());
            }
        };

        if options.pull || !config.skips_auto_pull() {
            self.pull_latest(&service.name, dir, options.force)?;
        }

        let mut hooks = HookRunner::new(
            self.runner,
            self.prompter,
            &service.name,
            dir,
            &env,
            options.force,
        );
        hooks.run_all(&config.before)?;
        report.advance(ServiceState::PreHooksRun);

        let files = compose_file_args(dir);
        report.advance(ServiceState::ComposeFilesResolved);

        hooks.run_all(&config.after)?;
        report.advance(ServiceState::PostHooksRun);

        let project_flag = project.compose_project();
        let up = CommandSpec::new("docker-compose")
            .args(files)
            .args(["-p", project_flag.as_str(), "up", "-d", "--build", "--remove-orphans"])
            .cwd(dir)
            .envs(env.vars());
        self.runner.run(&up)?.ensure_success(&up)?;
        report.advance(ServiceState::Up);
        Ok(())
    }

    fn stop_service(&self, project: &Project, service: &Service) -> ServiceReport {
        let mut report = ServiceReport::new(&service.name);
        let dir = project.service_dir(service);
        if !validate(&mut report, &dir) {
            return report;
        }

        println!("{}", format!(t!("stop.service.stopping"), service = service.name.cyan()));
        if let Err(e) = self.run_stop(project, service, &dir, &mut report) {
            report.advance(ServiceState::Failed(e.to_string()));
        }
        report
    }

    fn run_stop(
        &self,
        project: &Project,
        service: &Service,
        dir: &Path,
        report: &mut ServiceReport,
    ) -> Result<(), OrchestratorError> {
        let env = self.env.for_service(project, service)?;
        report.advance(ServiceState::EnvPrepared);

        let project_flag = project.compose_project();
        let down = CommandSpec::new("docker-compose")
            .args(compose_file_args(dir))
            .args(["-p", project_flag.as_str(), "down", "--remove-orphans"])
            .cwd(dir)
            .envs(env.vars());
        self.runner.run(&down)?.ensure_success(&down)?;
        report.advance(ServiceState::Down);
        Ok(())
    }
}

/// Directory and compose file checks shared by start and stop.
fn validate(report: &mut ServiceReport, dir: &Path) -> bool {
    if !dir.is_dir() {
        println!("{}", format!(t!("start.service.missing"), service = report.name).yellow());
        report.advance(ServiceState::Skipped(SkipReason::MissingDirectory(dir.to_path_buf())));
        return false;
    }
    report.advance(ServiceState::Validated);

    if !dir.join(COMPOSE_FILENAME).is_file() {
        println!("{}", format!(t!("start.service.no_compose"), service = report.name).yellow());
        report.advance(ServiceState::Skipped(SkipReason::NoComposeFile));
        return false;
    }
    true
}

fn unknown(name: &str) -> ServiceReport {
    println!("{}", format!(t!("start.service.unknown"), service = name).yellow());
    let mut report = ServiceReport::new(name);
    report.advance(ServiceState::Skipped(SkipReason::UnknownService));
    report
}

/// Project order for known services, then the unknown names as given.
fn select<'p>(project: &'p Project, selector: &Selector) -> Vec<Selected<'p>> {
    match selector {
        Selector::All => project.services().iter().map(Selected::Known).collect(),
        Selector::Only(names) => {
            let mut selected: Vec<Selected<'p>> = project
                .services()
                .iter()
                .filter(|s| names.contains(&s.name))
                .map(Selected::Known)
                .collect();
            let mut seen: Vec<&str> = Vec::new();
            for name in names {
                if project.service(name).is_none() && !seen.contains(&name.as_str()) {
                    seen.push(name);
                    selected.push(Selected::Unknown(name.clone()));
                }
            }
            selected
        }
    }
}
