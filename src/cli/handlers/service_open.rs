// src/cli/handlers/service_open.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use super::commons;
use crate::{
    cli::{args::ServiceOpenArgs, context::AppContext},
    constants::{DEFAULT_EDITOR, LAUNCHER_EDITOR_KEY},
    core::orchestrator::Selector,
    models::Project,
    system::executor::CommandSpec,
};

/// Editor precedence: flag, descriptor, global `LAUNCHER_EDITOR`, built-in.
/// Blank values at any level fall through to the next one.
fn resolve_editor(flag: Option<&str>, project: &Project, ctx: &AppContext<'_>) -> String {
    non_blank(flag)
        .or_else(|| non_blank(project.editor.as_deref()))
        .or_else(|| non_blank(ctx.env.get(LAUNCHER_EDITOR_KEY)))
        .unwrap_or(DEFAULT_EDITOR)
        .to_string()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Handler for `service:open`.
pub fn handle(args: Vec<String>, ctx: &mut AppContext<'_>) -> Result<()> {
    let open_args = ServiceOpenArgs::try_parse_from(&args)?;
    let project = commons::load_project(ctx, &open_args.name)?;
    let editor = resolve_editor(open_args.editor.as_deref(), &project, ctx);

    let selected: Vec<_> = match Selector::from_names(open_args.services) {
        Selector::All => project.services().iter().collect(),
        Selector::Only(names) => {
            for name in names.iter().filter(|n| project.service(n).is_none()) {
                println!("{}", format!(t!("start.service.unknown"), service = name).yellow());
            }
            project
                .services()
                .iter()
                .filter(|s| names.contains(&s.name))
                .collect()
        }
    };

    for service in selected {
        let dir = project.service_dir(service);
        if !dir.is_dir() {
            println!("{}", format!(t!("start.service.missing"), service = service.name).yellow());
            continue;
        }
        println!(
            "{}",
            format!(t!("open.opening"), service = service.name.cyan(), editor = editor)
        );
        let spec = CommandSpec::from_command_line(&editor)?.arg(".").cwd(&dir);
        if let Err(e) = ctx.runner.run(&spec) {
            println!("{}", format!(t!("open.failed"), editor = editor, error = e).red());
        }
    }
    Ok(())
}
