// src/cli/handlers/project_remove.rs

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::fs;

use super::commons;
use crate::cli::{args::ProjectRemoveArgs, context::AppContext};

/// Deletes the project working tree first, then its descriptor.
pub fn handle(args: Vec<String>, ctx: &mut AppContext<'_>) -> Result<()> {
    let remove_args = ProjectRemoveArgs::try_parse_from(&args)?;
    if !ctx.store.exists(&remove_args.name) {
        println!(
            "{}",
            format!(t!("project.remove.not_found"), name = remove_args.name).yellow()
        );
        return Ok(());
    }
    let project = commons::load_project(ctx, &remove_args.name)?;
    let dir = project.directory();

    println!("\n{}", t!("project.remove.warning").red().bold());
    println!("    • {}", dir.display());
    println!("    • {}", ctx.store.path_for(project.name()).display());

    let prompt = format!(t!("project.remove.prompt"), name = project.name());
    if !(remove_args.force || ctx.prompter.confirm(&prompt, false)?) {
        println!("{}", t!("common.cancelled"));
        return Ok(());
    }

    if dir.exists() {
        log::debug!("Purging directory: {}", dir.display());
        fs::remove_dir_all(dir)
            .with_context(|| format!("Failed to delete directory: {}", dir.display()))?;
    }
    ctx.store.remove(project.name())?;

    println!(
        "{} {}",
        t!("common.success").green(),
        format!(t!("project.remove.success"), name = project.name())
    );
    Ok(())
}
