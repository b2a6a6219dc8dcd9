// src/cli/args.rs
use clap::{Parser, ValueEnum};

/// Configures the launcher home and its global .env.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct ConfigArgs {
    /// Where new projects are created by default.
    #[arg(long)]
    pub projects_directory: Option<String>,

    /// Overwrite an existing configuration without asking.
    #[arg(long, short)]
    pub force: bool,

    /// Accept the default answer for every question.
    #[arg(long, short)]
    pub default: bool,
}

/// Creates a new launcher project.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct ProjectNewArgs {
    /// The project name. Asked interactively when missing.
    pub name: Option<String>,

    /// Clone the project from this repository instead of starting empty.
    #[arg(long, short)]
    pub repository: Option<String>,

    /// Where the project lives. Relative names go under PROJECTS_DIRECTORY.
    #[arg(long)]
    pub directory: Option<String>,

    /// Start the project once it is created.
    #[arg(long, short)]
    pub start: bool,

    /// Reuse the stored descriptor of an existing project and only set up
    /// its directory and services.
    #[arg(long, short)]
    pub config: bool,

    /// Accept the default answer for every question.
    #[arg(long, short)]
    pub default: bool,

    /// Answer yes to every confirmation.
    #[arg(long, short)]
    pub force: bool,
}

/// Boots the services of a project.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct ProjectStartArgs {
    /// The project name.
    pub name: String,

    /// Only start these services. Repeat the flag for several.
    #[arg(long = "service", short = 's')]
    pub services: Vec<String>,

    /// Pull the latest commit of every service before booting it.
    #[arg(long, short)]
    pub pull: bool,

    /// Answer yes to every confirmation.
    #[arg(long, short)]
    pub force: bool,

    /// Accept the default answer for every question.
    #[arg(long, short)]
    pub default: bool,
}

/// Stops the services of a project.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct ProjectStopArgs {
    /// The project name.
    pub name: String,

    /// Only stop these services.
    pub services: Vec<String>,
}

/// Lists every project and its services.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct ProjectListArgs {}

/// Prints the descriptor of a project.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct ProjectInspectArgs {
    /// The project name.
    pub name: String,
}

/// Deletes a project directory and its descriptor.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct ProjectRemoveArgs {
    /// The project name.
    pub name: String,

    /// Do not ask for confirmation.
    #[arg(long, short)]
    pub force: bool,
}

/// What `service:add` scaffolds.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    /// `laravel new`.
    LaravelApp,
    /// `laravel new`, API flavour.
    LaravelApi,
    /// `vue init webpack`.
    VueFrontend,
    /// `vue init webpack`, single-page app.
    VueSpa,
    /// `vue init webpack`, mobile app.
    VueMobile,
    /// A clone of an existing repository.
    Git,
    /// A directory already present under `services/`.
    Existent,
}

impl ServiceType {
    /// Every type, in the order the picker shows them.
    pub const ALL: [Self; 7] = [
        Self::LaravelApp,
        Self::LaravelApi,
        Self::VueFrontend,
        Self::VueSpa,
        Self::VueMobile,
        Self::Git,
        Self::Existent,
    ];

    /// The kebab-case name used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LaravelApp => "laravel-app",
            Self::LaravelApi => "laravel-api",
            Self::VueFrontend => "vue-frontend",
            Self::VueSpa => "vue-spa",
            Self::VueMobile => "vue-mobile",
            Self::Git => "git",
            Self::Existent => "existent",
        }
    }
}

/// Adds a service to a project as a git submodule.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct ServiceAddArgs {
    /// The project name.
    pub name: String,

    /// The new service name.
    pub service: String,

    /// What to scaffold. Asked interactively when missing.
    #[arg(long = "type", short = 't', value_enum)]
    pub service_type: Option<ServiceType>,

    /// Clone the service from this repository. Implies `--type git`.
    #[arg(long, short)]
    pub repository: Option<String>,

    /// Accept the default answer for every question.
    #[arg(long, short)]
    pub default: bool,
}

/// Lists the services of a project.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct ServiceListArgs {
    /// The project name.
    pub name: String,
}

/// Opens services in an editor.
#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct ServiceOpenArgs {
    /// The project name.
    pub name: String,

    /// Only open these services.
    pub services: Vec<String>,

    /// Editor command. Falls back to the project, then LAUNCHER_EDITOR.
    #[arg(long, short)]
    pub editor: Option<String>,
}
