use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::embed::ollama;
use crate::engine::{validate_threshold, DEFAULT_THRESHOLD};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub embed: EmbedConfig,
    pub ingest: IngestConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pairs scoring strictly above this are flagged
    pub threshold: f64,
    /// Max concurrent embedding requests (0 = half available cores)
    pub max_concurrent: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    pub backend: EmbedBackend,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EmbedBackend {
    #[serde(rename = "ollama")]
    Ollama { model: String, url: String },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Descend into subdirectories of directory arguments
    pub recursive: bool,
    /// Max file size in bytes to read (larger files are skipped)
    pub max_file_size: u64,
    /// What to do with files whose extension has no extractor
    pub unsupported: UnsupportedPolicy,
    /// What to do when a supported file fails to extract
    pub on_error: ErrorPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnsupportedPolicy {
    Skip,
    /// Keep the document with empty text
    Empty,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    Skip,
    Fail,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_concurrent: 4,
        }
    }
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            backend: EmbedBackend::Ollama {
                model: ollama::DEFAULT_MODEL.to_string(),
                url: ollama::DEFAULT_URL.to_string(),
            },
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            max_file_size: 16 * 1024 * 1024, // 16MB
            unsupported: UnsupportedPolicy::Skip,
            on_error: ErrorPolicy::Skip,
        }
    }
}

impl Config {
    /// Load config from a .simcheck/config.toml file, falling back to defaults.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = Self::path(project_root);
        let config: Self = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("reading config from {}", config_path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("parsing config from {}", config_path.display()))?
        } else {
            Self::default()
        };
        Ok(config)
    }

    /// Check merged settings. Call after command-line overrides are applied.
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.engine.threshold).context("invalid engine.threshold")?;
        Ok(())
    }

    pub fn path(project_root: &Path) -> PathBuf {
        project_root.join(".simcheck").join("config.toml")
    }

    /// Effective embedding concurrency, resolving 0 to a sensible default.
    pub fn effective_concurrency(&self) -> usize {
        if self.engine.max_concurrent == 0 {
            let num_cpus = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4);
            (num_cpus / 2).max(1)
        } else {
            self.engine.max_concurrent
        }
    }

    /// Write current config to disk (for `simcheck init`).
    pub fn save(&self, project_root: &Path) -> Result<PathBuf> {
        let config_path = Self::path(project_root);
        if let Some(dir) = config_path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating config dir {}", dir.display()))?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)
            .with_context(|| format!("writing config to {}", config_path.display()))?;
        Ok(config_path)
    }
}
