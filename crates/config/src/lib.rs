//! Layered configuration for tagport.
//!
//! Sources merge in order, later ones winning:
//!
//! 1. built-in defaults (no services, no importers),
//! 2. a configuration file, TOML, YAML or JSON by extension,
//! 3. `TAGPORT_`-prefixed environment variables, nested keys split on `__`.
//!
//! Without an explicit file, `config.toml` in the platform configuration
//! directory is used when it exists.

pub mod error;
mod importer;
mod services;

pub use crate::importer::{ContentSpec, ImporterSpec, MatchSpec, RuleSpec, StepSpec};
pub use crate::services::Services;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tagport_import::Importer;
use tracing::{debug, instrument};

const ENV_PREFIX: &str = "TAGPORT_";
const DEFAULT_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name to lowercase hexadecimal service key.
    pub services: BTreeMap<String, String>,
    pub importers: Vec<ImporterSpec>,
}
impl Config {
    #[instrument(skip_all, fields(path = ?path))]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => figment = merge_file(figment, path)?,
            None => {
                if let Some(path) = default_path()
                    && path.is_file()
                {
                    debug!(path = %path.display(), "using default configuration file");
                    figment = merge_file(figment, &path)?;
                }
            },
        }
        let figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        figment.extract().or_raise(|| ErrorKind::Load)
    }

    pub fn services(&self) -> Result<Services> {
        Services::from_hex(&self.services)
    }

    /// Every configured importer, in configuration order.
    pub fn importers(&self) -> Result<Vec<Importer>> {
        let services = self.services()?;
        self.importers
            .iter()
            .enumerate()
            .map(|(i, spec)| spec.build(&services, &format!("importers[{i}]")))
            .collect()
    }
}

/// `config.toml` in the platform configuration directory.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "tagport").map(|dirs| dirs.config_dir().join(DEFAULT_FILE_NAME))
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|extension| extension.to_str());
    Ok(match extension {
        Some("toml") => figment.merge(Toml::file_exact(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
    })
}
