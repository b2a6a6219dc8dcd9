// src/cli/handlers/config.rs

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use colored::*;
use std::fs;
use std::path::PathBuf;

use crate::{
    cli::{args::ConfigArgs, context::AppContext},
    constants::{DEFAULT_PROJECTS_DIRECTORY, PROJECTS_DIRECTORY_KEY},
};

/// Handler for `config`.
pub fn handle(args: Vec<String>, ctx: &mut AppContext<'_>) -> Result<()> {
    let config_args = ConfigArgs::try_parse_from(&args)?;
    if config_args.default {
        ctx.accept_defaults();
    }
    configure_launcher(ctx, config_args.force, config_args.projects_directory.as_deref())?;
    Ok(())
}

/// Creates the launcher home and writes its global `.env`. Returns `false`
/// when an existing configuration was kept.
pub fn configure_launcher(
    ctx: &mut AppContext<'_>,
    force: bool,
    projects_directory: Option<&str>,
) -> Result<bool> {
    println!("{}", t!("config.header").bold());
    ctx.paths.ensure_layout()?;

    let env_file = ctx.paths.env_file();
    if env_file.exists() {
        let replace = force || ctx.prompter.confirm(t!("config.prompt.override"), false)?;
        if !replace {
            println!("{}", t!("config.info.already_configured"));
            return Ok(false);
        }
    }

    let answer = match projects_directory {
        Some(dir) => dir.to_string(),
        None => ctx
            .prompter
            .input(t!("config.prompt.projects_directory"), Some(DEFAULT_PROJECTS_DIRECTORY))?,
    };
    let directory = PathBuf::from(shellexpand::tilde(answer.trim()).into_owned());
    if !directory.is_dir() {
        return Err(anyhow!(
            t!("config.error.directory_missing"),
            path = directory.display()
        ));
    }

    // Keys the launcher does not prompt for are carried over as they were.
    let mut values = ctx.env.vars().clone();
    values.insert(
        PROJECTS_DIRECTORY_KEY.to_string(),
        directory.display().to_string(),
    );
    let content: String = values
        .iter()
        .map(|(key, value)| format!("{}={}\n", key, quote_env_value(value)))
        .collect();
    fs::write(&env_file, content)
        .with_context(|| format!(t!("config.error.write_failed"), path = env_file.display()))?;

    ctx.reload_env()?;
    println!(
        "{} {}",
        t!("common.success").green(),
        format!(t!("config.success"), path = env_file.display())
    );
    Ok(true)
}

/// Double-quotes a dotenv value, escaping what dotenv parsers unescape.
fn quote_env_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
