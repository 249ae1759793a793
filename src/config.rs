//! Configuration structures and utilities

use crate::core::SourceKind;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the application folder created under the user's chosen parent.
pub const APP_FOLDER_NAME: &str = "GraphForge";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphForgeConfig {
    /// Name of the per-project folder that is triplified
    pub source_data_dir: String,
    /// Name of the derived cache file inside `source_data_dir`
    pub cache_file_name: String,
    /// Extensions (without the dot) that participate in triplification,
    /// and the format each one is read as
    pub source_formats: BTreeMap<String, SourceKind>,
    /// Where the root folder handle is remembered between runs
    pub state_file: PathBuf,
    pub query: QueryConfig,
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Wrap prefixed names such as `rdfs:Class` in angle brackets so they
    /// address the verbatim qualified-name IRIs of the OWL/XML reducer.
    pub bracket_prefixed_names: bool,
    /// Prefix declarations prepended to every query
    pub prefixes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub enabled: bool,
    pub project_name: String,
    /// Target file name -> download URL
    pub sources: BTreeMap<String, String>,
}

impl Default for GraphForgeConfig {
    fn default() -> Self {
        Self {
            source_data_dir: "Source Data".to_string(),
            cache_file_name: "quads.nq".to_string(),
            source_formats: [
                ("owl", SourceKind::OwlXml),
                ("rdf", SourceKind::OwlXml),
                ("ttl", SourceKind::Turtle),
            ]
            .into_iter()
            .map(|(ext, kind)| (ext.to_string(), kind))
            .collect(),
            state_file: default_state_file(),
            query: QueryConfig::default(),
            demo: DemoConfig::default(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        let prefixes = [
            ("owl", "http://www.w3.org/2002/07/owl#"),
            ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
            ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
            ("xsd", "http://www.w3.org/2001/XMLSchema#"),
        ]
        .into_iter()
        .map(|(p, ns)| (p.to_string(), ns.to_string()))
        .collect();

        Self { bracket_prefixed_names: true, prefixes }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        let sources = [
            (
                "bfo.owl",
                "https://raw.githubusercontent.com/BFO-ontology/BFO/v2019-08-26/bfo_classes_only.owl",
            ),
            (
                "pizza.owl",
                "https://raw.githubusercontent.com/owlcs/pizza-ontology/refs/heads/master/pizza.owl",
            ),
        ]
        .into_iter()
        .map(|(name, url)| (name.to_string(), url.to_string()))
        .collect();

        Self { enabled: true, project_name: "Project Demo".to_string(), sources }
    }
}

impl GraphForgeConfig {
    /// Load a JSON configuration file; absent fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config file {}: {}", path.display(), e))
        })?;
        let config: GraphForgeConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.source_data_dir.is_empty() || self.source_data_dir.contains(['/', '\\']) {
            return Err(Error::Config(format!(
                "source_data_dir must be a single folder name, got {:?}",
                self.source_data_dir
            )));
        }
        if self.cache_file_name.is_empty() || self.cache_file_name.contains(['/', '\\']) {
            return Err(Error::Config(format!(
                "cache_file_name must be a single file name, got {:?}",
                self.cache_file_name
            )));
        }
        if let Some(ext) = self.source_formats.keys().find(|ext| ext.is_empty() || ext.contains('.')) {
            return Err(Error::Config(format!(
                "source_formats keys are extensions without a dot, got {:?}",
                ext
            )));
        }
        Ok(())
    }

    /// Format of `file_name` when its extension is a configured source
    /// extension. Matching is case-sensitive and the cache file never matches.
    pub fn source_kind(&self, file_name: &str) -> Option<SourceKind> {
        if file_name == self.cache_file_name {
            return None;
        }
        let (stem, extension) = file_name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        self.source_formats.get(extension).copied()
    }

    pub fn is_source_file(&self, file_name: &str) -> bool {
        self.source_kind(file_name).is_some()
    }
}

fn default_state_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("graphforge")
        .join("state.json")
}
