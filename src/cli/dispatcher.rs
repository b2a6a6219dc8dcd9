// src/cli/dispatcher.rs

use anyhow::{Result, anyhow};

use crate::cli::{context::AppContext, handlers};

/// A launcher command, its aliases, and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, &mut AppContext<'_>) -> Result<()>,
}

/// The single source of truth for all commands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "config",
        aliases: &["configure"],
        handler: handlers::config::handle,
    },
    CommandDefinition {
        name: "project:new",
        aliases: &["new"],
        handler: handlers::project_new::handle,
    },
    CommandDefinition {
        name: "project:start",
        aliases: &["start"],
        handler: handlers::project_start::handle,
    },
    CommandDefinition {
        name: "project:stop",
        aliases: &["stop"],
        handler: handlers::project_stop::handle,
    },
    CommandDefinition {
        name: "project:list",
        aliases: &["list", "ls"],
        handler: handlers::project_list::handle,
    },
    CommandDefinition {
        name: "project:inspect",
        aliases: &["inspect"],
        handler: handlers::project_inspect::handle,
    },
    CommandDefinition {
        name: "project:remove",
        aliases: &["remove", "rm"],
        handler: handlers::project_remove::handle,
    },
    CommandDefinition {
        name: "service:add",
        aliases: &["add"],
        handler: handlers::service_add::handle,
    },
    CommandDefinition {
        name: "service:list",
        aliases: &["services"],
        handler: handlers::service_list::handle,
    },
    CommandDefinition {
        name: "service:open",
        aliases: &["open"],
        handler: handlers::service_open::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Names of every registered command, in registry order.
pub fn command_names() -> Vec<&'static str> {
    COMMAND_REGISTRY.iter().map(|cmd| cmd.name).collect()
}

/// `launcher <command> [args...]`: the first argument picks the handler, the
/// rest is handed to it untouched.
pub fn dispatch(all_args: Vec<String>, ctx: &mut AppContext<'_>) -> Result<()> {
    log::debug!("Dispatching args: {:?}", all_args);

    let mut args = all_args.into_iter();
    let Some(name) = args.next() else {
        println!("{}", t!("cli.welcome"));
        return Ok(());
    };

    let command = find_command(&name).ok_or_else(|| {
        anyhow!(
            t!("error.unknown_command"),
            command = name,
            available = command_names().join(", ")
        )
    })?;
    (command.handler)(args.collect(), ctx)
}
