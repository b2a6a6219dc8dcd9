// src/cli/handlers/service_add.rs

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use colored::*;
use std::fs;

use super::commons;
use crate::{
    cli::{
        args::{ServiceAddArgs, ServiceType},
        context::AppContext,
    },
    constants::SERVICES_DIR,
    models::Project,
    system::executor::CommandSpec,
};

/// Handler for `service:add`.
pub fn handle(args: Vec<String>, ctx: &mut AppContext<'_>) -> Result<()> {
    let add_args = ServiceAddArgs::try_parse_from(&args)?;
    if add_args.default {
        ctx.accept_defaults();
    }
    if !ctx.paths.is_configured() {
        println!("{}", t!("service.add.info.not_configured").yellow());
    }

    let mut project = commons::load_project(ctx, &add_args.name)?;
    let service = validate_service_name(&add_args.service)?;

    // A stale descriptor must not hide an existing submodule.
    commons::reconcile(ctx, &mut project)?;
    if project.service(&service).is_some() {
        println!("{}", format!(t!("service.add.info.already_exists"), service = service).yellow());
        return Ok(());
    }
    println!("{}", format!(t!("service.add.creating"), service = service.cyan()));

    let parent_was_clean = commons::is_git_clean(ctx.runner, project.directory());
    let service_type = resolve_type(ctx, &add_args)?;
    let mut repository = add_args.repository.clone().filter(|r| !r.trim().is_empty());

    if service_type == ServiceType::Git && repository.is_none() {
        let answer = ctx.prompter.input(t!("service.add.prompt.repository"), None)?;
        repository = Some(answer.trim().to_string()).filter(|r| !r.is_empty());
        if repository.is_none() {
            return Err(anyhow!(t!("service.add.error.repository_required")));
        }
    }

    create_service(ctx, &project, &service, service_type, repository.as_deref())?;
    init_service_repository(ctx, &project, &service)?;
    add_submodule(ctx, &project, &service, repository.as_deref(), parent_was_clean)?;

    commons::reconcile(ctx, &mut project)?;
    println!(
        "{} {}",
        t!("common.success").green(),
        format!(t!("service.add.success"), service = service, name = project.name())
    );
    Ok(())
}

/// Service names double as submodule names and directory names.
fn validate_service_name(name: &str) -> Result<String> {
    let name = name.trim();
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(name.to_string())
    } else {
        Err(anyhow!(t!("service.add.error.invalid_name"), service = name))
    }
}

/// A repository always means `git`; otherwise the flag, otherwise ask.
fn resolve_type(ctx: &AppContext<'_>, args: &ServiceAddArgs) -> Result<ServiceType> {
    if args.repository.as_deref().is_some_and(|r| !r.trim().is_empty()) {
        return Ok(ServiceType::Git);
    }
    if let Some(service_type) = args.service_type {
        return Ok(service_type);
    }
    let items: Vec<&str> = ServiceType::ALL.iter().map(|t| t.as_str()).collect();
    let index = ctx.prompter.select(t!("service.add.prompt.type"), &items, 0)?;
    ServiceType::ALL
        .get(index)
        .copied()
        .ok_or_else(|| anyhow!(t!("service.add.error.invalid_type")))
}

fn create_service(
    ctx: &AppContext<'_>,
    project: &Project,
    service: &str,
    service_type: ServiceType,
    repository: Option<&str>,
) -> Result<()> {
    let services_dir = project.services_dir();
    fs::create_dir_all(&services_dir)
        .with_context(|| format!("Failed to create directory: {}", services_dir.display()))?;

    let spec = match (service_type, repository) {
        (ServiceType::Git, Some(repository)) => {
            CommandSpec::new("git").args(["clone", repository, service])
        }
        (ServiceType::Git, None) => return Err(anyhow!(t!("service.add.error.repository_required"))),
        (ServiceType::LaravelApp | ServiceType::LaravelApi, _) => {
            CommandSpec::new("laravel").args(["new", service])
        }
        (ServiceType::VueFrontend | ServiceType::VueSpa | ServiceType::VueMobile, _) => {
            CommandSpec::new("vue").args(["init", "webpack", service])
        }
        (ServiceType::Existent, _) => {
            let dir = services_dir.join(service);
            if !dir.is_dir() {
                return Err(anyhow!(
                    t!("service.add.error.existent_missing"),
                    path = dir.display()
                ));
            }
            return Ok(());
        }
    };
    commons::run_checked(ctx.runner, spec, &services_dir)
}

/// Gives the service its own repository when it does not have one yet.
fn init_service_repository(ctx: &AppContext<'_>, project: &Project, service: &str) -> Result<()> {
    let dir = project.services_dir().join(service);
    if dir.join(".git").exists() {
        return Ok(());
    }
    commons::run_git_sequence(
        ctx.runner,
        &dir,
        &[&["init"], &["add", "-A"], &["commit", "-m", "Initial Commit"]],
    )
}

fn add_submodule(
    ctx: &AppContext<'_>,
    project: &Project,
    service: &str,
    repository: Option<&str>,
    parent_was_clean: bool,
) -> Result<()> {
    let path = format!("{}/{}", SERVICES_DIR, service);
    let url = match repository {
        Some(repository) => repository.to_string(),
        None => format!("./{}", path),
    };
    commons::run_checked(
        ctx.runner,
        CommandSpec::new("git").args([
            "submodule",
            "add",
            "--name",
            service,
            url.as_str(),
            path.as_str(),
        ]),
        project.directory(),
    )?;

    let message = format!("Add service {} as submodule.", service);
    if parent_was_clean {
        commons::run_git_sequence(
            ctx.runner,
            project.directory(),
            &[&["add", "-A"], &["commit", "-m", message.as_str()]],
        )?;
    } else {
        println!("{}", t!("service.add.info.not_clean").red());
        println!("    git add {} .gitmodules", path);
        println!("    git commit -m '{}'", message);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::handlers::fixtures::{configured_home, saved_project, service_dir, submodule_output};
    use crate::system::executor::CommandOutput;
    use crate::system::testing::{RecordingRunner, ScriptedPrompter};
    use tempfile::tempdir;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_git_service_is_cloned_added_and_committed_when_clean() {
        let tmp = tempdir().unwrap();
        let paths = configured_home(tmp.path());
        let project = saved_project(&paths, tmp.path(), &[]);
        // The clone would create the repository.
        fs::create_dir_all(service_dir(&project, "newsvc").join(".git")).unwrap();
        let runner = RecordingRunner::new();
        let prompter = ScriptedPrompter::new();
        let mut ctx = AppContext::new(paths, &runner, &prompter, tmp.path().into()).unwrap();

        handle(
            argv(&["demo", "newsvc", "--type=git", "--repository=git@example.com:newsvc.git"]),
            &mut ctx,
        )
        .unwrap();

        let clone = runner.find("git clone").unwrap();
        assert_eq!(clone.args, vec!["clone", "git@example.com:newsvc.git", "newsvc"]);
        assert_eq!(clone.cwd.as_deref(), Some(project.services_dir().as_path()));
        assert!(runner.ran(
            "git submodule add --name newsvc git@example.com:newsvc.git services/newsvc"
        ));
        assert!(runner.ran("git commit -m Add service newsvc as submodule."));
        assert!(!runner.ran("git init"));
        // Once before the duplicate check, once after the submodule is added.
        assert_eq!(runner.count("git submodule foreach"), 2);
        assert!(prompter.asked().is_empty());
    }

    #[test]
    fn test_dirty_parent_is_not_committed() {
        let tmp = tempdir().unwrap();
        let paths = configured_home(tmp.path());
        let project = saved_project(&paths, tmp.path(), &[]);
        fs::create_dir_all(service_dir(&project, "newsvc").join(".git")).unwrap();
        let runner = RecordingRunner::new();
        runner.respond_stdout("git status --untracked-files=no --porcelain", " M README.md\n");
        let prompter = ScriptedPrompter::new();
        let mut ctx = AppContext::new(paths, &runner, &prompter, tmp.path().into()).unwrap();

        handle(argv(&["demo", "newsvc", "-r", "git@example.com:newsvc.git"]), &mut ctx).unwrap();

        assert!(runner.ran("git submodule add"));
        assert!(!runner.ran("git commit"));
        assert!(!runner.ran("git add -A"));
    }

    #[test]
    fn test_local_service_gets_its_own_repository() {
        let tmp = tempdir().unwrap();
        let paths = configured_home(tmp.path());
        let project = saved_project(&paths, tmp.path(), &[]);
        fs::create_dir_all(service_dir(&project, "web")).unwrap();
        let runner = RecordingRunner::new();
        // Choose `existent` from the list.
        let prompter = ScriptedPrompter::new().with_selects(&[6]);
        let mut ctx = AppContext::new(paths, &runner, &prompter, tmp.path().into()).unwrap();

        handle(argv(&["demo", "web"]), &mut ctx).unwrap();

        let service_git: Vec<_> = runner
            .calls()
            .into_iter()
            .filter(|c| c.cwd.as_deref() == Some(service_dir(&project, "web").as_path()))
            .map(|c| c.command_line())
            .collect();
        assert_eq!(service_git, vec!["git init", "git add -A", "git commit -m Initial Commit"]);
        assert!(runner.ran("git submodule add --name web ./services/web services/web"));
    }

    #[test]
    fn test_failed_scaffold_stops_before_the_submodule() {
        let tmp = tempdir().unwrap();
        let paths = configured_home(tmp.path());
        saved_project(&paths, tmp.path(), &[]);
        let runner = RecordingRunner::new();
        runner.respond("laravel new", CommandOutput::failure(1));
        let prompter = ScriptedPrompter::new();
        let mut ctx = AppContext::new(paths, &runner, &prompter, tmp.path().into()).unwrap();

        let result = handle(argv(&["demo", "shop", "--type", "laravel-app"]), &mut ctx);
        assert!(result.is_err());
        assert!(!runner.ran("git submodule add"));
    }

    #[test]
    fn test_existing_service_is_reported() {
        let tmp = tempdir().unwrap();
        let paths = configured_home(tmp.path());
        saved_project(&paths, tmp.path(), &["api"]);
        let runner = RecordingRunner::new();
        runner.respond_stdout("git submodule foreach", &submodule_output(&["api"]));
        let prompter = ScriptedPrompter::new();
        let mut ctx = AppContext::new(paths, &runner, &prompter, tmp.path().into()).unwrap();

        handle(argv(&["demo", "api", "--type", "git"]), &mut ctx).unwrap();
        assert!(!runner.ran("git clone"));
        assert!(!runner.ran("git submodule add"));
        assert!(prompter.asked().is_empty());
    }

    #[test]
    fn test_submodule_missing_from_a_stale_descriptor_is_not_added_twice() {
        let tmp = tempdir().unwrap();
        let paths = configured_home(tmp.path());
        // The descriptor predates the `web` submodule.
        saved_project(&paths, tmp.path(), &[]);
        let runner = RecordingRunner::new();
        runner.respond_stdout("git submodule foreach", &submodule_output(&["web"]));
        let prompter = ScriptedPrompter::new();
        let mut ctx = AppContext::new(paths, &runner, &prompter, tmp.path().into()).unwrap();

        handle(argv(&["demo", "web", "-r", "git@example.com:web.git"]), &mut ctx).unwrap();

        assert!(!runner.ran("git clone"));
        assert!(!runner.ran("git submodule add"));
        assert!(ctx.store.load("demo").unwrap().service("web").is_some());
    }
}
