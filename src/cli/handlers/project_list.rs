// src/cli/handlers/project_list.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use super::commons;
use crate::cli::{args::ProjectListArgs, context::AppContext};

/// Handler for `project:list`.
pub fn handle(args: Vec<String>, ctx: &mut AppContext<'_>) -> Result<()> {
    ProjectListArgs::try_parse_from(&args)?;

    let names = ctx.store.list()?;
    if names.is_empty() {
        println!("{}", t!("project.list.empty"));
        return Ok(());
    }

    println!("{}", t!("project.list.header").bold());
    for name in names {
        // One broken descriptor must not hide the others.
        let mut project = match ctx.store.load(&name) {
            Ok(project) => project,
            Err(e) => {
                println!("  {} {}", name.red(), e.to_string().dimmed());
                continue;
            }
        };
        if let Err(e) = commons::reconcile(ctx, &mut project) {
            log::warn!("Could not refresh services of '{}': {:#}", name, e);
        }
        println!(
            "\n  {} {}",
            project.name().green().bold(),
            project.directory().display().to_string().dimmed()
        );
        commons::print_services(&project);
    }
    Ok(())
}
