// src/cli/handlers/commons.rs

// Shared helpers for the command handlers.

use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

use crate::cli::context::AppContext;
use crate::core::discovery::{self, ReconcileReport};
use crate::core::orchestrator::{ServiceReport, ServiceState};
use crate::models::Project;
use crate::system::executor::{CommandRunner, CommandSpec};

/// Loads a descriptor by name. `ConfigError` is passed through untouched so
/// the binary can report it as a clean abort.
pub fn load_project(ctx: &AppContext<'_>, name: &str) -> Result<Project> {
    Ok(ctx.store.load(name)?)
}

/// Rebuilds the service list from git and docker and saves the descriptor.
pub fn reconcile(ctx: &AppContext<'_>, project: &mut Project) -> Result<ReconcileReport> {
    let report = discovery::reconcile(project, ctx.runner, &ctx.store)
        .with_context(|| format!(t!("error.reconcile_failed"), name = project.name()))?;
    for name in &report.unavailable {
        println!("{}", format!(t!("services.unavailable"), service = name).yellow());
    }
    Ok(report)
}

/// Runs a command in `dir` and fails on a non-zero exit.
pub fn run_checked(runner: &dyn CommandRunner, spec: CommandSpec, dir: &Path) -> Result<()> {
    let spec = spec.cwd(dir);
    runner
        .run(&spec)?
        .ensure_success(&spec)
        .with_context(|| format!(t!("error.command_failed"), command = spec))?;
    Ok(())
}

/// Runs each `git` argument list in `dir`, stopping at the first failure.
pub fn run_git_sequence(runner: &dyn CommandRunner, dir: &Path, steps: &[&[&str]]) -> Result<()> {
    for step in steps {
        run_checked(runner, CommandSpec::new("git").args(step.iter().copied()), dir)?;
    }
    Ok(())
}

/// `true` when `git status --untracked-files=no --porcelain` prints nothing.
pub fn is_git_clean(runner: &dyn CommandRunner, dir: &Path) -> bool {
    let spec = CommandSpec::new("git")
        .args(["status", "--untracked-files=no", "--porcelain"])
        .cwd(dir)
        .captured();
    match runner.run(&spec) {
        Ok(output) => output.success && output.stdout.trim().is_empty(),
        Err(e) => {
            log::warn!("Could not read git status in {}: {}", dir.display(), e);
            false
        }
    }
}

/// Prints the final state of each service, colored by outcome.
pub fn print_service_reports(reports: &[ServiceReport]) {
    if reports.is_empty() {
        println!("\n{}", t!("services.none"));
        return;
    }
    println!("\n{}", t!("services.summary_header").bold());
    for report in reports {
        let state = report.state();
        let label = match state {
            ServiceState::Up | ServiceState::Down => state.to_string().green(),
            ServiceState::Failed(_) => state.to_string().red(),
            _ => state.to_string().yellow(),
        };
        println!("  {:<20} {}", report.name.cyan(), label);
    }
}

/// One line per service: container, path and hosts.
pub fn print_services(project: &Project) {
    if project.services().is_empty() {
        println!("    {}", t!("services.none").dimmed());
        return;
    }
    for service in project.services() {
        let hosts = if service.hosts.is_empty() {
            "-".to_string()
        } else {
            service.hosts.join(", ")
        };
        println!(
            "    {:<28} {:<28} {}",
            project.container_name(service).cyan(),
            service.path,
            hosts.green()
        );
    }
}
