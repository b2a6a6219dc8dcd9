// src/cli/mod.rs

use clap::Parser;

/// One clap struct per command.
pub mod args;
/// Everything a handler needs for one invocation.
pub mod context;
/// The command registry.
pub mod dispatcher;
/// Command handlers.
pub mod handlers;

/// Renders the help template, swapping the semantic tags for ANSI styles (or
/// nothing when colors are off).
fn build_help_string() -> &'static str {
    let use_colors = colored::control::SHOULD_COLORIZE.should_colorize();
    let style = |code: &'static str| if use_colors { code } else { "" };

    let title = style("\x1b[1;33m");
    let cmd = style("\x1b[36m");
    let group = style("\x1b[1;32m");
    let err = style("\x1b[91m");
    let dim = style("\x1b[2m");
    let reset = style("\x1b[0m");

    let formatted = t!("cli.help.template")
        .replace("<title>", title)
        .replace("</title>", reset)
        .replace("<cmd>", cmd)
        .replace("</cmd>", reset)
        .replace("<group>", group)
        .replace("</group>", reset)
        .replace("<err>", err)
        .replace("</err>", reset)
        .replace("<dim>", dim)
        .replace("</dim>", reset);

    Box::leak(formatted.into_boxed_str())
}

/// launcher: boots multi-service development projects.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    help_template = { build_help_string() },
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
#[command(trailing_var_arg = true)]
pub struct Cli {
    /// The command followed by its own arguments. Each handler parses the rest.
    #[arg()]
    pub args: Vec<String>,
}
