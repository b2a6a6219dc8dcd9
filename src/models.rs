// src/models.rs

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::constants::SERVICES_DIR;

/// Treats an explicit `null` in the descriptor the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// --- PROJECT DESCRIPTOR (`<projects-dir>/<name>.json`) ---

/// Container-registry credentials. Every field is optional.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    /// Registry host, e.g. `registry.gitlab.com`.
    pub url: Option<String>,
    /// Login user.
    pub user: Option<String>,
    /// Token piped to `docker login --password-stdin`.
    pub token: Option<String>,
}

/// A complete set of registry credentials, borrowed from a [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryCredentials<'a> {
    /// Registry host.
    pub url: &'a str,
    /// Login user.
    pub user: &'a str,
    /// Login token.
    pub token: &'a str,
}

impl Registry {
    /// Returns the credentials only when url, user and token are all non-empty.
    pub fn credentials(&self) -> Option<RegistryCredentials<'_>> {
        fn non_empty(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.trim().is_empty())
        }
        Some(RegistryCredentials {
            url: non_empty(&self.url)?,
            user: non_empty(&self.user)?,
            token: non_empty(&self.token)?,
        })
    }
}

/// One git submodule of a project.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Service {
    /// Submodule name, also the compose service suffix.
    pub name: String,
    /// Relative to the project directory, normally `services/<name>`.
    pub path: String,
    /// Virtual hosts published by the running container. Recomputed on every
    /// reconciliation.
    #[serde(default, deserialize_with = "null_as_default")]
    pub hosts: Vec<String>,
}

impl Service {
    /// A service with no known hosts yet.
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            hosts: Vec::new(),
        }
    }

    /// The conventional service entry for `services/<name>`.
    pub fn under_services_dir(name: &str) -> Self {
        Self::new(name, format!("{}/{}", SERVICES_DIR, name))
    }
}

/// The in-memory form of a project descriptor.
///
/// Typed keys are always serialized, `null` included, so the key set of a
/// saved descriptor is fixed. Keys this version does not know about are kept
/// in `extra` and written back untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Project {
    /// Display name. Its lower-cased form keys the descriptor.
    pub name: String,
    /// Absolute path of the working tree.
    pub directory: PathBuf,
    /// Remote the project was cloned from, if any.
    #[serde(default)]
    pub repository: Option<String>,
    /// Top level domain injected as `TLD`.
    #[serde(default)]
    pub tld: Option<String>,
    /// Docker network shared by every service.
    #[serde(default)]
    pub network: Option<String>,
    /// Editor command for `service:open`.
    #[serde(default)]
    pub editor: Option<String>,
    /// Registry login used on start.
    #[serde(default, deserialize_with = "null_as_default")]
    pub registry: Registry,
    /// Discovered submodules, in git order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub services: Vec<Service>,
    /// Unknown keys, preserved on save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Everything `project:new` collects before writing a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectSettings {
    /// The display name.
    pub name: String,
    /// Already resolved to an absolute path.
    pub directory: PathBuf,
    /// `None` starts an empty repository.
    pub repository: Option<String>,
    /// See [`Project::tld`].
    pub tld: Option<String>,
    /// See [`Project::network`].
    pub network: Option<String>,
    /// See [`Project::editor`].
    pub editor: Option<String>,
    /// See [`Project::registry`].
    pub registry: Registry,
}

impl Project {
    /// Builds the descriptor for a freshly created project. It starts with no
    /// services; discovery fills them in.
    pub fn new_for_init(settings: ProjectSettings) -> Self {
        Self {
            name: settings.name,
            directory: settings.directory,
            repository: settings.repository,
            tld: settings.tld,
            network: settings.network,
            editor: settings.editor,
            registry: settings.registry,
            services: Vec::new(),
            extra: Map::new(),
        }
    }

    /// The display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The working tree.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The remote, treating an empty string as none.
    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref().filter(|r| !r.is_empty())
    }

    /// The services as last reconciled.
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Looks a service up by exact name.
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.name == name)
    }

    /// The descriptor file stem and the key used by the config store.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Name passed to `docker-compose -p`. Containers end up as
    /// `<compose project>-<service>`.
    pub fn compose_project(&self) -> String {
        self.name.to_lowercase()
    }

    /// `<compose project>-<service>`.
    pub fn container_name(&self, service: &Service) -> String {
        format!("{}-{}", self.compose_project(), service.name)
    }

    /// The configured network, or `<key>-network`.
    pub fn network_name(&self) -> String {
        match self.network.as_deref().filter(|n| !n.is_empty()) {
            Some(network) => network.to_string(),
            None => format!("{}-network", self.compose_project()),
        }
    }

    /// `<directory>/services`.
    pub fn services_dir(&self) -> PathBuf {
        self.directory.join(SERVICES_DIR)
    }

    /// Where `service` is checked out.
    pub fn service_dir(&self, service: &Service) -> PathBuf {
        self.directory.join(&service.path)
    }

    /// Replaces one top-level field, but only if the key already exists in the
    /// serialized descriptor. Returns `Ok(false)` for an unknown key. A value of
    /// the wrong shape is an error and leaves the project unchanged.
    pub fn update(&mut self, key: &str, value: Value) -> Result<bool, serde_json::Error> {
        let mut fields = match serde_json::to_value(&*self)? {
            Value::Object(fields) => fields,
            _ => return Ok(false),
        };

        match fields.get_mut(key) {
            Some(slot) => *slot = value,
            None => return Ok(false),
        }

        *self = serde_json::from_value(Value::Object(fields))?;
        Ok(true)
    }

    /// Replaces the service list through [`Project::update`].
    pub fn set_services(&mut self, services: &[Service]) -> Result<bool, serde_json::Error> {
        let value = serde_json::to_value(services)?;
        self.update("services", value)
    }
}

// --- SERVICE HOOK CONFIG (`<service>/launcher.json`) ---

/// Per-service hook configuration. It is owned by the service, never written
/// by the launcher.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LauncherConfig {
    /// `true` (the default) skips pulling on start unless a pull is requested.
    #[serde(rename = "git-pull", default)]
    pub git_pull: Option<bool>,
    /// Hooks run once `.env` is ready.
    #[serde(default, deserialize_with = "null_as_default")]
    pub before: Vec<String>,
    /// Hooks run once the compose files are resolved, before `up`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub after: Vec<String>,
}

impl LauncherConfig {
    /// `true` unless `git-pull` is explicitly `false`.
    pub fn skips_auto_pull(&self) -> bool {
        self.git_pull.unwrap_or(true)
    }
}
