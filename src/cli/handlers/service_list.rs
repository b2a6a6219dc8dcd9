// src/cli/handlers/service_list.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use super::commons;
use crate::cli::{args::ServiceListArgs, context::AppContext};

/// Handler for `service:list`.
pub fn handle(args: Vec<String>, ctx: &mut AppContext<'_>) -> Result<()> {
    let list_args = ServiceListArgs::try_parse_from(&args)?;
    let mut project = commons::load_project(ctx, &list_args.name)?;
    commons::reconcile(ctx, &mut project)?;

    println!(
        "{}",
        format!(t!("services.list_header"), name = project.name()).bold()
    );
    commons::print_services(&project);
    Ok(())
}
