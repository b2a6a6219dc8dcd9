// src/constants.rs

/// The name of the launcher home directory, relative to the user's home.
pub const LAUNCHER_HOME_DIR: &str = ".launcher";

/// Environment variable that overrides the launcher home location.
pub const LAUNCHER_HOME_ENV: &str = "LAUNCHER_HOME";

/// The name of the directory holding project descriptors (inside the launcher home).
pub const PROJECTS_DIR: &str = "projects";

/// The name of dotenv files, both global and per service.
pub const ENV_FILENAME: &str = ".env";

/// The per-service template copied to `.env` on first boot.
pub const ENV_EXAMPLE_FILENAME: &str = ".env.example";

/// The folder inside a project where every service lives.
pub const SERVICES_DIR: &str = "services";

/// Required compose file for a service to be bootable.
pub const COMPOSE_FILENAME: &str = "docker-compose.yml";

/// Optional compose override layered on top of the base file.
pub const COMPOSE_DEV_FILENAME: &str = "docker-compose.dev.yml";

/// Per-service hook configuration.
pub const LAUNCHER_CONFIG_FILENAME: &str = "launcher.json";

/// Helper script shipped by services that support the symbolic hook actions.
pub const ROCKET_FILENAME: &str = "rocket";

/// Gates the `composer` hook.
pub const COMPOSER_FILENAME: &str = "composer.json";
/// Gates the `npm` hook.
pub const PACKAGE_FILENAME: &str = "package.json";

/// The shared MySQL container used by the `db-create` hook.
pub const MYSQL_CONTAINER: &str = "dev-env-mysql";

/// User id injected when the real one cannot be determined.
pub const DEFAULT_UID: u32 = 501;

/// Injected as `XDEBUG_HOST` for every service.
pub const XDEBUG_HOST: &str = "127.0.0.1";

/// Prompt defaults for `project:new` and `config`.
pub const DEFAULT_TLD: &str = "local";
/// Default registry for `project:new`.
pub const DEFAULT_REGISTRY_URL: &str = "registry.gitlab.com";
/// Editor used when neither the flag, the project nor the global `.env` names one.
pub const DEFAULT_EDITOR: &str = "pstorm";
/// Suggested projects directory for `config`.
pub const DEFAULT_PROJECTS_DIRECTORY: &str = "~/Code";

/// Keys read from the global `.env`.
pub const PROJECTS_DIRECTORY_KEY: &str = "PROJECTS_DIRECTORY";
/// Global default TLD.
pub const LAUNCHER_TLD_KEY: &str = "LAUNCHER_TLD";
/// Global default editor.
pub const LAUNCHER_EDITOR_KEY: &str = "LAUNCHER_EDITOR";
