//! Project-level registry of source documents, persisted as `.scg.yaml` at
//! the workspace root.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::session::Session;

/// Config file name at the workspace root.
pub const CONFIG_FILE_NAME: &str = ".scg.yaml";

/// A registered source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    /// Overrides the document's own basePath when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    pub uid: String,
}

/// The persisted registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractsConfig {
    pub description: String,
    pub dir_by_root: String,
    pub work_dir: String,
    pub contracts: Vec<Contract>,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        ContractsConfig {
            description: "managed by swagger-client-gen; do not edit by hand".to_string(),
            dir_by_root: "src".to_string(),
            work_dir: "services".to_string(),
            contracts: Vec::new(),
        }
    }
}

impl ContractsConfig {
    /// Register a document, rejecting duplicate names and duplicate URLs.
    pub fn add(&mut self, contract: Contract) -> Result<(), ConfigError> {
        if self.contracts.iter().any(|c| c.name == contract.name) {
            return Err(ConfigError::DuplicateName(contract.name));
        }
        if self.contracts.iter().any(|c| c.url == contract.url) {
            return Err(ConfigError::DuplicateUrl(contract.url));
        }
        self.contracts.push(contract);
        Ok(())
    }

    /// Remove by uid. Returns whether anything was removed.
    pub fn remove(&mut self, uid: &str) -> bool {
        let before = self.contracts.len();
        self.contracts.retain(|c| c.uid != uid);
        self.contracts.len() != before
    }

    pub fn set_base_path(&mut self, uid: &str, base_path: String) -> Result<(), ConfigError> {
        let contract = self
            .contracts
            .iter_mut()
            .find(|c| c.uid == uid)
            .ok_or_else(|| ConfigError::UnknownUid(uid.to_string()))?;
        contract.base_path = Some(base_path);
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&Contract> {
        self.contracts.iter().find(|c| c.name == name)
    }

    /// Output directory for a document, relative to the workspace root.
    pub fn doc_dir(&self, doc_title: &str) -> PathBuf {
        Path::new(&self.dir_by_root)
            .join(&self.work_dir)
            .join(doc_title)
    }
}

/// Load the registry from `dir/.scg.yaml`. A missing file yields the
/// default record and a once-per-session warning.
pub fn load(dir: &Path, session: &mut Session) -> Result<ContractsConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        let key = format!("config:{}", path.display());
        if session.note_once(&key) {
            log::warn!("{} not found, using the default configuration", path.display());
        }
        return Ok(ContractsConfig::default());
    }

    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Write the registry back to `dir/.scg.yaml`.
pub fn save(dir: &Path, config: &ContractsConfig) -> Result<(), ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    let content = serde_yaml_ng::to_string(config).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(&path, content).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}
