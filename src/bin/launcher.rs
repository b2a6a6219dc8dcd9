// src/bin/launcher.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use launcher::{
    cli::{Cli, context::AppContext, dispatcher},
    core::{config_store::ConfigError, paths::LauncherPaths},
    system::{executor::SystemRunner, prompt::DialoguerPrompter},
};
use std::env;

/// Sets up logging, resolves the launcher home, and hands the arguments to
/// the dispatcher. All errors surface here.
fn main() {
    env_logger::init();
    if let Err(e) = run_cli(Cli::parse()) {
        // A missing or broken descriptor is a user-facing condition, not a crash.
        if let Some(config_err) = e.downcast_ref::<ConfigError>() {
            eprintln!("\n{}", config_err.to_string().yellow());
            std::process::exit(1);
        }
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let paths = LauncherPaths::resolve()?;
    paths.validate()?;
    let cwd = env::current_dir()?;

    let runner = SystemRunner;
    let prompter = DialoguerPrompter;
    let mut ctx = AppContext::new(paths, &runner, &prompter, cwd)?;
    dispatcher::dispatch(cli.args, &mut ctx)
}
