// src/cli/handlers/project_inspect.rs

use anyhow::Result;
use clap::Parser;

use super::commons;
use crate::cli::{args::ProjectInspectArgs, context::AppContext};

/// Handler for `project:inspect`.
pub fn handle(args: Vec<String>, ctx: &mut AppContext<'_>) -> Result<()> {
    let inspect_args = ProjectInspectArgs::try_parse_from(&args)?;
    let project = commons::load_project(ctx, &inspect_args.name)?;
    println!("{}", serde_json::to_string_pretty(&project)?);
    Ok(())
}
