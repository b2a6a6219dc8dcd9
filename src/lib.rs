//! `launcher` scaffolds and boots local multi-service development projects.

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

/// Argument parsing, dispatch and one handler per command.
pub mod cli;
/// File names, defaults and environment keys.
pub mod constants;
/// Descriptors, discovery, environment layering, hooks and orchestration.
pub mod core;
/// The project descriptor and its parts.
pub mod models;
/// Processes and prompts.
pub mod system;
