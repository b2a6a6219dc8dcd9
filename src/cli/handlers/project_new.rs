// src/cli/handlers/project_new.rs

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use colored::*;
use std::fs;

use super::{commons, config::configure_launcher, project_start};
use crate::{
    cli::{args::ProjectNewArgs, context::AppContext},
    constants::{
        DEFAULT_EDITOR, DEFAULT_REGISTRY_URL, DEFAULT_TLD, LAUNCHER_EDITOR_KEY, LAUNCHER_TLD_KEY,
    },
    core::{
        config_store::is_valid_name,
        orchestrator::{Selector, StartOptions},
        paths::resolve_directory,
    },
    models::{Project, ProjectSettings, Registry},
    system::executor::CommandSpec,
};

/// Handler for `project:new`.
pub fn handle(args: Vec<String>, ctx: &mut AppContext<'_>) -> Result<()> {
    let new_args = ProjectNewArgs::try_parse_from(&args)?;
    if new_args.default {
        ctx.accept_defaults();
    }

    if !ctx.paths.is_configured() {
        println!("{}", t!("project.new.info.configuring").yellow());
        configure_launcher(ctx, false, None)?;
    }

    let name = match &new_args.name {
        Some(name) => name.clone(),
        None => ctx.prompter.input(t!("project.new.prompt.name"), None)?,
    };
    let name = validate_project_name(&name)?;

    let existing = ctx.store.exists(&name);
    let mut project = if existing && new_args.config {
        println!("{}", format!(t!("project.new.info.using_config"), name = name));
        ctx.store.load(&name)?
    } else {
        if existing {
            let prompt = format!(t!("project.new.prompt.override"), name = name);
            if !(new_args.force || ctx.prompter.confirm(&prompt, false)?) {
                println!("{}", format!(t!("project.new.info.already_exists"), name = name).yellow());
                return Ok(());
            }
        }

        let settings = gather_settings(ctx, &name, &new_args)?;
        let project = Project::new_for_init(settings);

        println!("\n{}", t!("project.new.summary_header").bold());
        println!("{}", serde_json::to_string_pretty(&project)?);
        if !(new_args.force || ctx.prompter.confirm(t!("project.new.prompt.looks_ok"), true)?) {
            println!("{}", t!("common.cancelled"));
            return Ok(());
        }
        project
    };

    // The descriptor is only written once the working tree exists.
    if !prepare_directory(ctx, &project, new_args.force)? {
        return Ok(());
    }
    let saved_to = ctx.store.save(&project)?;
    println!("{}", format!(t!("project.new.saved"), path = saved_to.display()));

    commons::reconcile(ctx, &mut project)?;
    println!(
        "\n{} {}",
        t!("common.success").green(),
        format!(t!("project.new.success"), name = project.name())
    );

    let start = new_args.start || ctx.prompter.confirm(t!("project.new.prompt.start"), true)?;
    if start {
        let options = StartOptions {
            pull: false,
            force: new_args.force,
        };
        project_start::start_project(ctx, &project, &Selector::All, options)?;
    }
    Ok(())
}

/// Project names become descriptor file names, so path characters are out.
fn validate_project_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!(t!("project.new.error.name_required")));
    }
    if !is_valid_name(name) {
        return Err(anyhow!(t!("project.new.error.invalid_name"), name = name));
    }
    Ok(name.to_string())
}

fn non_empty(value: String) -> Option<String> {
    let value = value.trim();
    if value.is_empty() { None } else { Some(value.to_string()) }
}

fn gather_settings(
    ctx: &AppContext<'_>,
    name: &str,
    args: &ProjectNewArgs,
) -> Result<ProjectSettings> {
    let key = name.to_lowercase();
    let prompter = ctx.prompter;

    let directory_answer = match &args.directory {
        Some(dir) => dir.clone(),
        None => prompter.input(t!("project.new.prompt.directory"), Some(&key))?,
    };
    let projects_root = ctx.projects_root();
    let directory = resolve_directory(&directory_answer, &ctx.cwd, projects_root.as_deref());

    let repository = match &args.repository {
        Some(repo) => non_empty(repo.clone()),
        None => non_empty(prompter.input(t!("project.new.prompt.repository"), None)?),
    };

    let tld_default = ctx.env.get(LAUNCHER_TLD_KEY).unwrap_or(DEFAULT_TLD);
    let tld = non_empty(prompter.input(t!("project.new.prompt.tld"), Some(tld_default))?);

    let registry = Registry {
        url: non_empty(prompter.input(t!("project.new.prompt.registry_url"), Some(DEFAULT_REGISTRY_URL))?),
        user: non_empty(prompter.input(t!("project.new.prompt.registry_user"), None)?),
        token: non_empty(prompter.input(t!("project.new.prompt.registry_token"), None)?),
    };

    let network_default = format!("{}-network", key);
    let network = non_empty(prompter.input(t!("project.new.prompt.network"), Some(&network_default))?);

    let editor_default = ctx.env.get(LAUNCHER_EDITOR_KEY).unwrap_or(DEFAULT_EDITOR);
    let editor = non_empty(prompter.input(t!("project.new.prompt.editor"), Some(editor_default))?);

    Ok(ProjectSettings {
        name: name.to_string(),
        directory,
        repository,
        tld,
        network,
        editor,
        registry,
    })
}

/// Creates (or adopts) the project working tree. Returns `false` when the
/// user chose to stop.
fn prepare_directory(ctx: &AppContext<'_>, project: &Project, force: bool) -> Result<bool> {
    let dir = project.directory();
    if dir.exists() {
        let prompt = format!(t!("project.new.prompt.existing_dir"), path = dir.display());
        if force || ctx.prompter.confirm(&prompt, true)? {
            println!("{}", t!("project.new.info.adopting"));
            return Ok(true);
        }
        let prompt = format!(t!("project.new.prompt.remove_dir"), path = dir.display());
        if !ctx.prompter.confirm(&prompt, false)? {
            println!("{}", t!("common.cancelled"));
            return Ok(false);
        }
        fs::remove_dir_all(dir)
            .with_context(|| format!("Failed to delete directory: {}", dir.display()))?;
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    match project.repository() {
        Some(repository) => clone_project(ctx, project, repository)?,
        None => init_project(ctx, project)?,
    }
    Ok(true)
}

fn init_project(ctx: &AppContext<'_>, project: &Project) -> Result<()> {
    let services = project.services_dir();
    fs::create_dir_all(&services)?;
    fs::write(services.join(".gitkeep"), "")?;

    println!("{}", t!("project.new.info.git_init"));
    commons::run_git_sequence(
        ctx.runner,
        project.directory(),
        &[&["init"], &["add", "-A"], &["commit", "-m", "Initial Commit"]],
    )
}

fn clone_project(ctx: &AppContext<'_>, project: &Project, repository: &str) -> Result<()> {
    let dir = project.directory();
    println!("{}", format!(t!("project.new.info.cloning"), repository = repository));
    commons::run_checked(
        ctx.runner,
        CommandSpec::new("git").args(["clone", "--recurse-submodules", repository, "."]),
        dir,
    )?;
    fs::create_dir_all(project.services_dir())?;

    let steps: [&[&str]; 3] = [
        &["submodule", "-q", "foreach", "git", "checkout", "master"],
        &["submodule", "init"],
        &["submodule", "update", "--merge", "--remote"],
    ];
    for step in steps {
        let spec = CommandSpec::new("git").args(step.iter().copied()).cwd(dir);
        match ctx.runner.run(&spec) {
            Ok(output) if output.success => {}
            Ok(output) => log::warn!("`{}` exited with {:?}", spec, output.code),
            Err(e) => log::warn!("`{}` could not run: {}", spec, e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::handlers::fixtures::{configured_home, saved_project, submodule_output};
    use crate::core::config_store::ConfigStore;
    use crate::system::executor::CommandOutput;
    use crate::system::testing::{RecordingRunner, ScriptedPrompter};
    use tempfile::tempdir;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_project_is_initialized_with_a_first_commit() {
        let tmp = tempdir().unwrap();
        let paths = configured_home(tmp.path());
        let runner = RecordingRunner::new();
        // Looks ok: yes. Start now: no.
        let prompter = ScriptedPrompter::new().with_confirms(&[true, false]);
        let mut ctx = AppContext::new(paths, &runner, &prompter, tmp.path().into()).unwrap();

        handle(argv(&["demo"]), &mut ctx).unwrap();

        let project = ctx.store.load("demo").unwrap();
        let project_dir = tmp.path().join("code").join("demo");
        assert_eq!(project.directory(), project_dir.as_path());
        assert!(project.services().is_empty());
        assert_eq!(project.tld.as_deref(), Some("local"));
        assert_eq!(project.network.as_deref(), Some("demo-network"));
        assert_eq!(project.registry.url.as_deref(), Some("registry.gitlab.com"));
        assert!(project.repository.is_none());

        assert!(project_dir.join("services/.gitkeep").is_file());
        let git: Vec<_> = runner
            .calls()
            .into_iter()
            .filter(|c| c.program == "git" && c.args.first().map(String::as_str) != Some("submodule"))
            .collect();
        let lines: Vec<_> = git.iter().map(|c| c.command_line()).collect();
        assert_eq!(lines, vec!["git init", "git add -A", "git commit -m Initial Commit"]);
        assert!(git.iter().all(|c| c.cwd.as_deref() == Some(project_dir.as_path())));
        assert!(!runner.ran("docker-compose"));
    }

    #[test]
    fn test_declining_override_changes_nothing() {
        let tmp = tempdir().unwrap();
        let paths = configured_home(tmp.path());
        let existing = saved_project(&paths, tmp.path(), &["api"]);
        let descriptor = paths.projects_dir().join("demo.json");
        let before = fs::read(&descriptor).unwrap();
        fs::remove_dir_all(existing.directory()).unwrap();

        let runner = RecordingRunner::new();
        let prompter = ScriptedPrompter::new().with_confirms(&[false]);
        let mut ctx = AppContext::new(paths, &runner, &prompter, tmp.path().into()).unwrap();

        handle(argv(&["demo"]), &mut ctx).unwrap();

        assert_eq!(fs::read(&descriptor).unwrap(), before);
        assert!(!existing.directory().exists());
        assert!(runner.calls().is_empty());
        assert_eq!(prompter.asked().len(), 1);
    }

    #[test]
    fn test_repository_is_cloned_with_submodules() {
        let tmp = tempdir().unwrap();
        let paths = configured_home(tmp.path());
        let runner = RecordingRunner::new();
        let prompter = ScriptedPrompter::new().with_confirms(&[false]);
        let mut ctx = AppContext::new(paths, &runner, &prompter, tmp.path().into()).unwrap();

        handle(
            argv(&["Demo", "--repository", "git@example.com:team/demo.git", "--force"]),
            &mut ctx,
        )
        .unwrap();

        let lines = runner.command_lines();
        assert_eq!(lines[0], "git clone --recurse-submodules git@example.com:team/demo.git .");
        assert!(runner.ran("git submodule -q foreach git checkout master"));
        assert!(runner.ran("git submodule init"));
        assert!(runner.ran("git submodule update --merge --remote"));
        assert!(!runner.ran("git init"));
        assert_eq!(
            ctx.store.load("demo").unwrap().repository(),
            Some("git@example.com:team/demo.git")
        );
        // Force skips the confirmation but still asks whether to start.
        let asked = prompter.asked();
        assert!(!asked.iter().any(|p| p == t!("project.new.prompt.looks_ok")));
        assert!(asked.iter().any(|p| p == t!("project.new.prompt.start")));
    }

    #[test]
    fn test_existing_directory_is_adopted_without_git() {
        let tmp = tempdir().unwrap();
        let paths = configured_home(tmp.path());
        fs::create_dir_all(tmp.path().join("code/demo")).unwrap();
        fs::write(tmp.path().join("code/demo/README.md"), "hi").unwrap();
        let runner = RecordingRunner::new();
        // Looks ok, adopt existing, do not start.
        let prompter = ScriptedPrompter::new().with_confirms(&[true, true, false]);
        let mut ctx = AppContext::new(paths, &runner, &prompter, tmp.path().into()).unwrap();

        handle(argv(&["demo"]), &mut ctx).unwrap();

        assert!(tmp.path().join("code/demo/README.md").is_file());
        assert!(!runner.ran("git init"));
        assert!(runner.ran("git submodule foreach"));
        assert!(ctx.store.exists("demo"));
    }

    #[test]
    fn test_start_flag_boots_after_creation() {
        let tmp = tempdir().unwrap();
        let paths = configured_home(tmp.path());
        let runner = RecordingRunner::new();
        let prompter = ScriptedPrompter::new();
        let mut ctx = AppContext::new(paths, &runner, &prompter, tmp.path().into()).unwrap();

        handle(argv(&["demo", "--start", "--force"]), &mut ctx).unwrap();

        assert!(runner.ran("docker network ls"));
        assert!(runner.ran("docker network create demo-network"));
        let asked = prompter.asked();
        assert!(!asked.iter().any(|p| p == t!("project.new.prompt.looks_ok")));
        assert!(!asked.iter().any(|p| p == t!("project.new.prompt.start")));
    }

    #[test]
    fn test_config_flag_sets_up_a_stored_project() {
        let tmp = tempdir().unwrap();
        let paths = configured_home(tmp.path());
        let mut existing = saved_project(&paths, tmp.path(), &["api"]);
        existing.repository = Some("git@example.com:team/demo.git".into());
        ConfigStore::new(paths.projects_dir()).save(&existing).unwrap();
        fs::remove_dir_all(existing.directory()).unwrap();

        let runner = RecordingRunner::new();
        runner.respond_stdout("git submodule foreach", &submodule_output(&["api"]));
        // Start now: no.
        let prompter = ScriptedPrompter::new().with_confirms(&[false]);
        let mut ctx = AppContext::new(paths, &runner, &prompter, tmp.path().into()).unwrap();

        handle(argv(&["demo", "--config"]), &mut ctx).unwrap();

        let clone = runner.find("git clone").unwrap();
        assert_eq!(clone.cwd.as_deref(), Some(existing.directory()));
        assert!(runner.ran("git submodule init"));
        let asked = prompter.asked();
        assert!(!asked.iter().any(|p| p.contains("Override")));
        assert!(!asked.iter().any(|p| p == t!("project.new.prompt.tld")));
        assert!(!asked.iter().any(|p| p == t!("project.new.prompt.looks_ok")));

        let stored = ctx.store.load("demo").unwrap();
        assert_eq!(stored.repository(), Some("git@example.com:team/demo.git"));
        assert_eq!(stored.network.as_deref(), Some("demo-network"));
        assert!(stored.service("api").is_some());
    }

    #[test]
    fn test_cancelled_directory_setup_leaves_no_descriptor() {
        let tmp = tempdir().unwrap();
        let paths = configured_home(tmp.path());
        fs::create_dir_all(tmp.path().join("code/demo")).unwrap();
        let runner = RecordingRunner::new();
        // Looks ok, do not adopt, do not remove.
        let prompter = ScriptedPrompter::new().with_confirms(&[true, false, false]);
        let mut ctx = AppContext::new(paths, &runner, &prompter, tmp.path().into()).unwrap();

        handle(argv(&["demo"]), &mut ctx).unwrap();

        assert!(!ctx.store.exists("demo"));
        assert!(tmp.path().join("code/demo").is_dir());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_failed_git_init_leaves_no_descriptor() {
        let tmp = tempdir().unwrap();
        let paths = configured_home(tmp.path());
        let runner = RecordingRunner::new();
        runner.respond("git commit", CommandOutput::failure(128));
        let prompter = ScriptedPrompter::new().with_confirms(&[true]);
        let mut ctx = AppContext::new(paths, &runner, &prompter, tmp.path().into()).unwrap();

        assert!(handle(argv(&["demo"]), &mut ctx).is_err());
        assert!(runner.ran("git init"));
        assert!(!ctx.store.exists("demo"));
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        assert!(validate_project_name("  ").is_err());
        assert!(validate_project_name("../etc").is_err());
        assert!(validate_project_name("a/b").is_err());
        assert_eq!(validate_project_name(" My-App_2 ").unwrap(), "My-App_2");
    }
}
