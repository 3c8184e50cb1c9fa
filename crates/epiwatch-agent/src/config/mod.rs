//! Configuration loading for Epiwatch.
//! Reads epiwatch.toml from the current directory or the path given by
//! `--config` / the EPIWATCH_CONFIG env var. Every field has a default, so a
//! missing file or section is not an error.

use std::path::{Path, PathBuf};

use epiwatch_common::EpiwatchError;
use epiwatch_ingestion::sources::pubmed::{PubMedSettings, DEFAULT_BASE_URL, DEFAULT_TOOL};
use epiwatch_ner::CountryMatch;
use epiwatch_triplets::ReportConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "epiwatch.toml";
pub const API_KEY_ENV: &str = "EPIWATCH_PUBMED_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pubmed: PubMedConfig,
    #[serde(default)]
    pub ner: NerConfig,
    #[serde(default)]
    pub countries: CountriesConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubMedConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub email: Option<String>,
    #[serde(default = "default_tool")]
    pub tool: String,
    pub api_key: Option<String>,
}

fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }
fn default_tool()     -> String { DEFAULT_TOOL.to_string() }

impl Default for PubMedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            email: None,
            tool: default_tool(),
            api_key: None,
        }
    }
}

impl PubMedConfig {
    pub fn to_settings(&self) -> PubMedSettings {
        PubMedSettings {
            base_url: self.base_url.clone(),
            email: self.email.clone(),
            tool: self.tool.clone(),
            api_key: self.api_key.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NerConfig {
    /// TSV vocabulary (`term<TAB>label`) replacing the embedded one.
    pub vocabulary_path: Option<PathBuf>,
    #[serde(default = "default_min_entity_len")]
    pub min_entity_len: usize,
    #[serde(default)]
    pub extra_clinical_terms: Vec<String>,
}

fn default_min_entity_len() -> usize { 3 }

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            vocabulary_path: None,
            min_entity_len: default_min_entity_len(),
            extra_clinical_terms: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountriesConfig {
    #[serde(default)]
    pub match_mode: CountryMatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String { "127.0.0.1:3000".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

mod tests;

impl Config {
    /// Load configuration from `path`, or epiwatch.toml when `None`.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!(
                "Config file not found: {}. Using defaults; copy epiwatch.example.toml to epiwatch.toml to customise.",
                path.display()
            );
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, EpiwatchError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| EpiwatchError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Fill secrets the file leaves unset from the environment.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.pubmed.api_key.as_deref().map_or(true, str::is_empty) {
            self.pubmed.api_key = lookup(API_KEY_ENV).filter(|k| !k.is_empty());
        }
    }
}
