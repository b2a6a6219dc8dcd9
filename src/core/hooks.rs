// src/core/hooks.rs

//! `before` / `after` hook dispatch for a single service.
//!
//! Each hook token is either one of a closed set of symbolic actions or a
//! literal command line that is tokenized and run in the service directory.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{COMPOSER_FILENAME, MYSQL_CONTAINER, PACKAGE_FILENAME, ROCKET_FILENAME};
use crate::core::env_loader::EnvContext;
use crate::system::executor::{CommandRunner, CommandSpec};
use crate::system::prompt::Prompter;

/// Hook failures that abort the service. Command exit codes are only logged.
#[derive(Error, Debug)]
pub enum HookError {
    /// The recreate confirmation could not be shown.
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// One `before` / `after` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookAction {
    /// `db-create`: database and user in the shared MySQL container.
    CreateDatabase,
    /// `migrate`: `rocket art migrate`, only after a fresh database.
    Migrate,
    /// `seed`: `rocket art db:seed`, only after a fresh database.
    Seed,
    /// `npm`: `rocket npm install` when `package.json` exists.
    Npm,
    /// `composer`: `rocket composer install` when `composer.json` exists.
    Composer,
    /// Anything else, run as a command line.
    Literal(String),
}

impl HookAction {
    /// Unknown tokens fall through to a literal command.
    pub fn parse(token: &str) -> Self {
        match token.trim() {
            "db-create" => Self::CreateDatabase,
            "migrate" => Self::Migrate,
            "seed" => Self::Seed,
            "npm" => Self::Npm,
            "composer" => Self::Composer,
            _ => Self::Literal(token.to_string()),
        }
    }
}

/// Runs the hooks of one service. A database created by `db-create` unlocks
/// `migrate` and `seed` for the rest of the same start.
pub struct HookRunner<'a> {
    runner: &'a dyn CommandRunner,
    prompter: &'a dyn Prompter,
    service_name: &'a str,
    service_dir: &'a Path,
    env: &'a EnvContext,
    force: bool,
    database_created: bool,
}

impl std::fmt::Debug for HookRunner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRunner")
            .field("service_name", &self.service_name)
            .field("service_dir", &self.service_dir)
            .field("force", &self.force)
            .field("database_created", &self.database_created)
            .finish_non_exhaustive()
    }
}

impl<'a> HookRunner<'a> {
    /// `force` answers yes to the recreate prompt.
    pub fn new(
        runner: &'a dyn CommandRunner,
        prompter: &'a dyn Prompter,
        service_name: &'a str,
        service_dir: &'a Path,
        env: &'a EnvContext,
        force: bool,
    ) -> Self {
        Self {
            runner,
            prompter,
            service_name,
            service_dir,
            env,
            force,
            database_created: false,
        }
    }

    /// Whether `db-create` created a database during this run.
    pub fn database_created(&self) -> bool {
        self.database_created
    }

    /// Runs every token in order.
    pub fn run_all(&mut self, hooks: &[String]) -> Result<(), HookError> {
        for token in hooks {
            self.run(&HookAction::parse(token))?;
        }
        Ok(())
    }

    /// Runs one action in the service directory.
    pub fn run(&mut self, action: &HookAction) -> Result<(), HookError> {
        log::debug!("Hook {:?} for service '{}'", action, self.service_name);
        match action {
            HookAction::CreateDatabase => self.create_database()?,
            HookAction::Migrate => {
                if self.database_created && self.has_files(&[ROCKET_FILENAME, COMPOSER_FILENAME]) {
                    self.rocket(&["art", "migrate"]);
                }
            }
            HookAction::Seed => {
                if self.database_created && self.has_files(&[ROCKET_FILENAME, COMPOSER_FILENAME]) {
                    self.rocket(&["art", "db:seed"]);
                }
            }
            HookAction::Npm => {
                if self.has_files(&[ROCKET_FILENAME, PACKAGE_FILENAME]) {
                    self.rocket(&["npm", "install"]);
                }
            }
            HookAction::Composer => {
                if self.has_files(&[ROCKET_FILENAME, COMPOSER_FILENAME]) {
                    self.rocket(&["composer", "install"]);
                }
            }
            HookAction::Literal(command_line) => self.literal(command_line),
        }
        Ok(())
    }

    fn has_files(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.service_dir.join(name).is_file())
    }

    fn rocket_path(&self) -> PathBuf {
        self.service_dir.join(ROCKET_FILENAME)
    }

    fn rocket(&self, args: &[&str]) {
        let spec = CommandSpec::new(self.rocket_path().display().to_string())
            .args(args.iter().copied())
            .cwd(self.service_dir)
            .envs(self.env.vars());
        self.run_logged(&spec);
    }

    fn literal(&self, command_line: &str) {
        println!(
            "{}",
            format!(
                t!("start.hook.running"),
                command = command_line,
                service = self.service_name
            )
        );
        match CommandSpec::from_command_line(command_line) {
            Ok(spec) => {
                let spec = spec.cwd(self.service_dir).envs(self.env.vars());
                self.run_logged(&spec);
            }
            Err(e) => log::warn!("Skipping hook '{}': {}", command_line, e),
        }
    }

    /// Hook exit codes are reported, never enforced.
    fn run_logged(&self, spec: &CommandSpec) {
        match self.runner.run(spec) {
            Ok(output) if !output.success => {
                log::warn!("Hook `{}` exited with {:?}", spec, output.code);
            }
            Ok(_) => {}
            Err(e) => log::warn!("Hook `{}` could not run: {}", spec, e),
        }
    }

    fn mysql_captured(&self, sql: &str) -> Option<String> {
        let spec = CommandSpec::new("docker")
            .args(["exec", MYSQL_CONTAINER, "mysql", "-N", "-s", "-r", "-e", sql])
            .captured();
        match self.runner.run(&spec) {
            Ok(output) if output.success => Some(output.stdout),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Could not query {}: {}", MYSQL_CONTAINER, e);
                None
            }
        }
    }

    fn mysql(&self, sql: &str) {
        let spec = CommandSpec::new("docker").args(["exec", MYSQL_CONTAINER, "mysql", "-e", sql]);
        self.run_logged(&spec);
    }

    fn mysql_running(&self) -> bool {
        let filter = format!("name={}", MYSQL_CONTAINER);
        let spec = CommandSpec::new("docker")
            .args(["ps", "--filter", filter.as_str(), "-q"])
            .captured();
        matches!(self.runner.run(&spec), Ok(output) if !output.stdout.trim().is_empty())
    }

    fn database_exists(&self, database: &str) -> bool {
        // Exact match: `LIKE` would treat `_` in the name as a wildcard.
        self.mysql_captured(&format!("SHOW DATABASES WHERE `Database` = '{}';", database))
            .is_some_and(|out| !out.trim().is_empty())
    }

    fn create_database(&mut self) -> Result<(), HookError> {
        if !self.mysql_running() {
            log::info!("{} is not running; skipping db-create.", MYSQL_CONTAINER);
            return Ok(());
        }
        println!("{}", t!("hooks.db.mysql_running"));

        let Some(database) = self.env.get("DB_DATABASE").filter(|d| is_sql_identifier(d)) else {
            log::warn!("DB_DATABASE is missing or not a plain identifier; skipping db-create.");
            return Ok(());
        };

        let mut exists = self.database_exists(database);
        if exists {
            println!("{}", format!(t!("hooks.db.exists"), database = database));
            let recreate = self.force || self.prompter.confirm(t!("hooks.db.prompt_recreate"), false)?;
            if recreate {
                println!("{}", format!(t!("hooks.db.dropping"), database = database));
                self.mysql(&format!("DROP DATABASE {};", database));
                exists = self.database_exists(database);
            }
        }

        if !exists {
            println!("{}", format!(t!("hooks.db.creating"), database = database));
            let user = self.env.get("DB_USERNAME").filter(|u| is_sql_identifier(u));
            let password = self.env.get("DB_PASSWORD").unwrap_or_default().replace('\'', "''");

            self.mysql(&format!("CREATE DATABASE IF NOT EXISTS {};", database));
            match user {
                Some(user) => {
                    self.mysql(&format!(
                        "CREATE USER IF NOT EXISTS {}@'%' IDENTIFIED BY '{}';",
                        user, password
                    ));
                    self.mysql(&format!(
                        "GRANT ALL PRIVILEGES ON {}.* TO {}@'%';",
                        database, user
                    ));
                }
                None => log::warn!("DB_USERNAME is missing or not a plain identifier; no user created."),
            }
            self.mysql("FLUSH PRIVILEGES;");
            self.database_created = true;
        }
        Ok(())
    }
}

/// Names are spliced into SQL text, so only plain identifiers are accepted.
fn is_sql_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::testing::{RecordingRunner, ScriptedPrompter};
    use std::fs;
    use tempfile::tempdir;

    fn db_env() -> EnvContext {
        let mut env = EnvContext::new();
        env.set("DB_DATABASE", "shop");
        env.set("DB_USERNAME", "shop_user");
        env.set("DB_PASSWORD", "s3cr'et");
        env
    }

    fn mysql_up(runner: &RecordingRunner) {
        runner.respond_stdout("docker ps --filter name=dev-env-mysql -q", "abc123\n");
    }

    #[test]
    fn test_parse_known_and_literal_tokens() {
        assert_eq!(HookAction::parse("db-create"), HookAction::CreateDatabase);
        assert_eq!(HookAction::parse("migrate"), HookAction::Migrate);
        assert_eq!(HookAction::parse("seed"), HookAction::Seed);
        assert_eq!(HookAction::parse("npm"), HookAction::Npm);
        assert_eq!(HookAction::parse("composer"), HookAction::Composer);
        assert_eq!(
            HookAction::parse("npm run dev"),
            HookAction::Literal("npm run dev".into())
        );
    }

    #[test]
    fn test_literal_runs_in_service_dir_with_env() {
        let tmp = tempdir().unwrap();
        let runner = RecordingRunner::new();
        let prompter = ScriptedPrompter::new();
        let mut env = EnvContext::new();
        env.set("TLD", "test");

        let mut hooks = HookRunner::new(&runner, &prompter, "api", tmp.path(), &env, false);
        hooks
            .run_all(&["php artisan 'cache:clear'".to_string()])
            .unwrap();

        let call = runner.find("php artisan").unwrap();
        assert_eq!(call.args, vec!["artisan", "cache:clear"]);
        assert_eq!(call.cwd.as_deref(), Some(tmp.path()));
        assert_eq!(call.env.get("TLD").map(String::as_str), Some("test"));
    }

    #[test]
    fn test_unparsable_and_failing_literals_do_not_abort() {
        let tmp = tempdir().unwrap();
        let runner = RecordingRunner::new();
        runner.fail_to_spawn("missing-tool");
        let prompter = ScriptedPrompter::new();
        let env = EnvContext::new();

        let mut hooks = HookRunner::new(&runner, &prompter, "api", tmp.path(), &env, false);
        hooks
            .run_all(&[
                "echo 'unbalanced".to_string(),
                "missing-tool --flag".to_string(),
                "echo done".to_string(),
            ])
            .unwrap();
        assert!(runner.ran("echo done"));
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn test_npm_and_composer_need_their_files() {
        let tmp = tempdir().unwrap();
        let runner = RecordingRunner::new();
        let prompter = ScriptedPrompter::new();
        let env = EnvContext::new();

        let mut hooks = HookRunner::new(&runner, &prompter, "web", tmp.path(), &env, false);
        hooks.run(&HookAction::Npm).unwrap();
        hooks.run(&HookAction::Composer).unwrap();
        assert!(runner.calls().is_empty());

        fs::write(tmp.path().join("rocket"), "#!/bin/sh\n").unwrap();
        fs::write(tmp.path().join("package.json"), "{}").unwrap();
        hooks.run(&HookAction::Npm).unwrap();
        hooks.run(&HookAction::Composer).unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].program.ends_with("rocket"));
        assert_eq!(calls[0].args, vec!["npm", "install"]);
    }

    #[test]
    fn test_migrate_requires_a_fresh_database() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("rocket"), "").unwrap();
        fs::write(tmp.path().join("composer.json"), "{}").unwrap();
        let runner = RecordingRunner::new();
        let prompter = ScriptedPrompter::new();
        let env = db_env();

        let mut hooks = HookRunner::new(&runner, &prompter, "api", tmp.path(), &env, false);
        hooks.run(&HookAction::Migrate).unwrap();
        assert!(runner.calls().is_empty());

        mysql_up(&runner);
        hooks.run(&HookAction::CreateDatabase).unwrap();
        assert!(hooks.database_created());
        hooks.run(&HookAction::Migrate).unwrap();
        hooks.run(&HookAction::Seed).unwrap();

        let rocket_calls: Vec<_> = runner
            .calls()
            .into_iter()
            .filter(|c| c.program.ends_with("rocket"))
            .map(|c| c.args.join(" "))
            .collect();
        assert_eq!(rocket_calls, vec!["art migrate", "art db:seed"]);
    }

    #[test]
    fn test_db_create_creates_missing_database_and_user() {
        let tmp = tempdir().unwrap();
        let runner = RecordingRunner::new();
        mysql_up(&runner);
        let prompter = ScriptedPrompter::new();
        let env = db_env();

        let mut hooks = HookRunner::new(&runner, &prompter, "api", tmp.path(), &env, false);
        hooks.run(&HookAction::CreateDatabase).unwrap();

        let sql: Vec<String> = runner
            .calls()
            .iter()
            .filter(|c| c.args.first().map(String::as_str) == Some("exec"))
            .filter_map(|c| c.args.last().cloned())
            .collect();
        assert_eq!(
            sql,
            vec![
                "SHOW DATABASES WHERE `Database` = 'shop';",
                "CREATE DATABASE IF NOT EXISTS shop;",
                "CREATE USER IF NOT EXISTS shop_user@'%' IDENTIFIED BY 's3cr''et';",
                "GRANT ALL PRIVILEGES ON shop.* TO shop_user@'%';",
                "FLUSH PRIVILEGES;",
            ]
        );
        assert!(prompter.asked().is_empty());
    }

    #[test]
    fn test_database_lookup_matches_underscored_names_exactly() {
        let tmp = tempdir().unwrap();
        let runner = RecordingRunner::new();
        mysql_up(&runner);
        let prompter = ScriptedPrompter::new();
        let mut env = db_env();
        env.set("DB_DATABASE", "shop_db");

        let mut hooks = HookRunner::new(&runner, &prompter, "api", tmp.path(), &env, false);
        hooks.run(&HookAction::CreateDatabase).unwrap();

        let lookup = runner
            .find("docker exec dev-env-mysql mysql -N -s -r -e SHOW DATABASES")
            .unwrap();
        assert_eq!(
            lookup.args.last().map(String::as_str),
            Some("SHOW DATABASES WHERE `Database` = 'shop_db';")
        );
        assert!(runner.ran("docker exec dev-env-mysql mysql -e CREATE DATABASE IF NOT EXISTS shop_db;"));
    }

    #[test]
    fn test_db_create_keeps_existing_database_when_declined() {
        let tmp = tempdir().unwrap();
        let runner = RecordingRunner::new();
        mysql_up(&runner);
        runner.respond_stdout("docker exec dev-env-mysql mysql -N -s -r -e SHOW DATABASES", "shop\n");
        let prompter = ScriptedPrompter::new().with_confirms(&[false]);
        let env = db_env();

        let mut hooks = HookRunner::new(&runner, &prompter, "api", tmp.path(), &env, false);
        hooks.run(&HookAction::CreateDatabase).unwrap();

        assert!(!hooks.database_created());
        assert_eq!(prompter.asked().len(), 1);
        assert!(!runner.command_lines().iter().any(|l| l.contains("DROP DATABASE")));
        assert!(!runner.command_lines().iter().any(|l| l.contains("CREATE DATABASE")));
    }

    #[test]
    fn test_db_create_with_force_recreates_without_asking() {
        let tmp = tempdir().unwrap();
        let runner = RecordingRunner::new();
        mysql_up(&runner);
        runner.respond_stdout("docker exec dev-env-mysql mysql -N -s -r -e SHOW DATABASES", "shop\n");
        let prompter = ScriptedPrompter::new();
        let env = db_env();

        let mut hooks = HookRunner::new(&runner, &prompter, "api", tmp.path(), &env, true);
        hooks.run(&HookAction::CreateDatabase).unwrap();

        assert!(prompter.asked().is_empty());
        assert!(runner.ran("docker exec dev-env-mysql mysql -e DROP DATABASE shop;"));
        // The lookup is re-run after the drop and still reports the database.
        assert_eq!(runner.count("docker exec dev-env-mysql mysql -N -s -r -e SHOW"), 2);
        assert!(!hooks.database_created());
    }

    #[test]
    fn test_db_create_is_a_no_op_without_mysql_or_valid_name() {
        let tmp = tempdir().unwrap();
        let runner = RecordingRunner::new();
        let prompter = ScriptedPrompter::new();
        let env = db_env();

        let mut hooks = HookRunner::new(&runner, &prompter, "api", tmp.path(), &env, false);
        hooks.run(&HookAction::CreateDatabase).unwrap();
        assert_eq!(runner.calls().len(), 1);

        mysql_up(&runner);
        let mut bad = EnvContext::new();
        bad.set("DB_DATABASE", "shop; DROP TABLE x");
        let mut hooks = HookRunner::new(&runner, &prompter, "api", tmp.path(), &bad, false);
        hooks.run(&HookAction::CreateDatabase).unwrap();
        assert!(!runner.command_lines().iter().any(|l| l.contains("SHOW DATABASES")));
    }

    #[test]
    fn test_sql_identifier_check() {
        assert!(is_sql_identifier("shop_db1"));
        assert!(!is_sql_identifier(""));
        assert!(!is_sql_identifier("a-b"));
        assert!(!is_sql_identifier("x;y"));
    }
}
