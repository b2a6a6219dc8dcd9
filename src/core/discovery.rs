// src/core/discovery.rs

//! Rebuilds a project's service list from its git submodules and enriches each
//! entry with the virtual hosts of its running container.

use serde::Deserialize;
use thiserror::Error;

use crate::core::config_store::{ConfigError, ConfigStore};
use crate::models::{Project, Service};
use crate::system::executor::{CommandRunner, CommandSpec};

/// Separator printed after every submodule record.
const RECORD_SEPARATOR: &str = "===";

/// Run by `git submodule foreach` once per submodule. Git supplies `$name` and
/// `$sm_path`; nothing from the project is interpolated into it.
const SUBMODULE_RECORD_SCRIPT: &str =
    r#"printf '{"name": "%s", "path": "%s"}===' "$name" "$sm_path""#;

const VIRTUAL_HOST_PREFIX: &str = "VIRTUAL_HOST=";

/// Failures while writing discovered services back.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The service list could not be applied to the descriptor.
    #[error("Could not update the services of '{project}': {source}")]
    Update {
        project: String,
        #[source]
        source: serde_json::Error,
    },
    /// Saving the descriptor failed.
    #[error(transparent)]
    Store(#[from] ConfigError),
}

/// The outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Every submodule, in git order.
    pub services: Vec<Service>,
    /// Submodules whose directory is missing on disk.
    pub unavailable: Vec<String>,
}

#[derive(Deserialize)]
struct SubmoduleRecord {
    name: String,
    path: String,
}

#[derive(Deserialize)]
struct ContainerConfig {
    #[serde(rename = "Env", default)]
    env: Option<Vec<String>>,
}

/// Keeps only the well-formed `{name, path}` records, in output order. The
/// first record wins when a name repeats.
pub fn parse_submodules(output: &str) -> Vec<Service> {
    let mut services: Vec<Service> = Vec::new();
    for fragment in output.split(RECORD_SEPARATOR) {
        // Anything printed before the record belongs to git or a hook.
        let Some(record) = fragment.find('{').and_then(|start| fragment.get(start..)) else {
            continue;
        };
        match serde_json::from_str::<SubmoduleRecord>(record.trim()) {
            Ok(record) if !record.name.is_empty() => {
                if services.iter().all(|s| s.name != record.name) {
                    services.push(Service::new(record.name, record.path));
                }
            }
            Ok(_) => {}
            Err(e) => log::debug!("Discarding submodule fragment {:?}: {}", record, e),
        }
    }
    services
}

/// Extracts the hosts from the `{{json .Config}}` of a container. The last
/// `VIRTUAL_HOST` entry wins; values are split on commas, trimmed, and empty
/// entries dropped.
pub fn parse_virtual_hosts(config_json: &str) -> Vec<String> {
    let config: ContainerConfig = match serde_json::from_str(config_json.trim()) {
        Ok(config) => config,
        Err(_) => return Vec::new(),
    };
    config
        .env
        .unwrap_or_default()
        .iter()
        .rev()
        .find_map(|entry| entry.strip_prefix(VIRTUAL_HOST_PREFIX))
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn list_submodules(project: &Project, runner: &dyn CommandRunner) -> Vec<Service> {
    let spec = CommandSpec::new("git")
        .args(["submodule", "foreach", "--quiet", SUBMODULE_RECORD_SCRIPT])
        .cwd(project.directory())
        .captured();
    match runner.run(&spec) {
        Ok(output) => {
            if !output.success {
                log::warn!(
                    "`git submodule foreach` failed in {}; reading what it printed.",
                    project.directory().display()
                );
            }
            parse_submodules(&output.stdout)
        }
        Err(e) => {
            log::warn!("Could not list submodules of '{}': {}", project.name(), e);
            Vec::new()
        }
    }
}

fn container_hosts(project: &Project, service: &Service, runner: &dyn CommandRunner) -> Vec<String> {
    let container = project.container_name(service);
    let spec = CommandSpec::new("docker")
        .args(["inspect", "--format", "{{json .Config}}", container.as_str()])
        .captured();
    match runner.run(&spec) {
        Ok(output) if output.success => parse_virtual_hosts(&output.stdout),
        Ok(_) => {
            log::debug!("Container '{}' is not running.", container);
            Vec::new()
        }
        Err(e) => {
            log::debug!("Could not inspect '{}': {}", container, e);
            Vec::new()
        }
    }
}

/// Builds the service list from ground truth without touching the project.
pub fn discover(project: &Project, runner: &dyn CommandRunner) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    for mut service in list_submodules(project, runner) {
        if project.service_dir(&service).is_dir() {
            service.hosts = container_hosts(project, &service, runner);
        } else {
            log::info!(
                "Service '{}' is registered but {} does not exist.",
                service.name,
                project.service_dir(&service).display()
            );
            report.unavailable.push(service.name.clone());
        }
        report.services.push(service);
    }
    report
}

/// Discovers the services, writes them into the project and persists it.
pub fn reconcile(
    project: &mut Project,
    runner: &dyn CommandRunner,
    store: &ConfigStore,
) -> Result<ReconcileReport, DiscoveryError> {
    let report = discover(project, runner);
    project
        .set_services(&report.services)
        .map_err(|source| DiscoveryError::Update {
            project: project.name.clone(),
            source,
        })?;
    store.save(project)?;
    Ok(report)
}
