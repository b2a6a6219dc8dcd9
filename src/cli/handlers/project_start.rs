// src/cli/handlers/project_start.rs

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;

use super::commons;
use crate::{
    cli::{args::ProjectStartArgs, context::AppContext},
    core::orchestrator::{Orchestrator, Selector, ServiceReport, StartOptions},
    models::Project,
};

/// Handler for `project:start`.
pub fn handle(args: Vec<String>, ctx: &mut AppContext<'_>) -> Result<()> {
    let start_args = ProjectStartArgs::try_parse_from(&args)?;
    if start_args.default {
        ctx.accept_defaults();
    }

    let mut project = commons::load_project(ctx, &start_args.name)?;
    commons::reconcile(ctx, &mut project)?;

    let options = StartOptions {
        pull: start_args.pull,
        force: start_args.force,
    };
    start_project(ctx, &project, &Selector::from_names(start_args.services), options)?;
    Ok(())
}

/// Network, registry login, then every selected service in order.
pub fn start_project(
    ctx: &AppContext<'_>,
    project: &Project,
    selector: &Selector,
    options: StartOptions,
) -> Result<Vec<ServiceReport>> {
    println!(
        "\n{}",
        format!(t!("start.header"), name = project.name()).bold()
    );
    let env = ctx.env.for_project(project)?;
    let orchestrator = Orchestrator::new(ctx.runner, ctx.prompter, &env);

    orchestrator
        .ensure_network(project)
        .with_context(|| format!(t!("start.error.network"), network = project.network_name()))?;

    if let Err(e) = orchestrator.login_to_registry(project) {
        println!("{}", format!(t!("start.registry.failed"), error = e).yellow());
    }

    let reports = orchestrator.start_services(project, selector, options);
    commons::print_service_reports(&reports);
    Ok(reports)
}
