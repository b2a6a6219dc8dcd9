// src/cli/handlers/mod.rs

// One module per launcher command.

/// Helpers shared by the handlers.
pub mod commons;
/// `config`.
pub mod config;
/// `project:inspect`.
pub mod project_inspect;
/// `project:list`.
pub mod project_list;
/// `project:new`.
pub mod project_new;
/// `project:remove`.
pub mod project_remove;
/// `project:start`.
pub mod project_start;
/// `project:stop`.
pub mod project_stop;
/// `service:add`.
pub mod service_add;
/// `service:list`.
pub mod service_list;
/// `service:open`.
pub mod service_open;
