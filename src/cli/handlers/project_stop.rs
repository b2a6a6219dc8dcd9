// src/cli/handlers/project_stop.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use super::commons;
use crate::{
    cli::{args::ProjectStopArgs, context::AppContext},
    core::orchestrator::{Orchestrator, Selector},
};

/// Handler for `project:stop`.
pub fn handle(args: Vec<String>, ctx: &mut AppContext<'_>) -> Result<()> {
    let stop_args = ProjectStopArgs::try_parse_from(&args)?;
    let mut project = commons::load_project(ctx, &stop_args.name)?;
    commons::reconcile(ctx, &mut project)?;

    println!(
        "\n{}",
        format!(t!("stop.header"), name = project.name()).bold()
    );
    let env = ctx.env.for_project(&project)?;
    let reports = Orchestrator::new(ctx.runner, ctx.prompter, &env)
        .stop_services(&project, &Selector::from_names(stop_args.services));
    commons::print_service_reports(&reports);
    Ok(())
}
