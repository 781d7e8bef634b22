#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::chunking::ChunkingConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub chunking: ChunkingConfig,
    pub sampling: SamplingConfig,
    pub ollama: OllamaConfig,
    pub store: StoreConfig,
}

/// Stratified sampling of the input corpus
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SamplingConfig {
    /// Number of records to draw from the corpus
    pub sample_size: usize,
    /// RNG seed; fixed so the sample ordering (and the id space) is stable
    pub seed: u64,
}

impl Default for SamplingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            sample_size: 12000,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OllamaConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub model: String,
    pub batch_size: u32,
}

impl Default for OllamaConfig {
    #[inline]
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            port: 11434,
            model: "all-minilm:latest".to_string(),
            batch_size: 32,
        }
    }
}

/// Persistent vector collection location and name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    /// Collection (table) name within the vector store
    pub collection: String,
    /// Base directory for persisted data; platform data dir when unset
    pub data_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    #[inline]
    fn default() -> Self {
        Self {
            collection: "complaints".to_string(),
            data_dir: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Data directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid port: {0} (must be between 1 and 65535)")]
    InvalidPort(u16),
    #[error("Invalid protocol: {0} (must be 'http' or 'https')")]
    InvalidProtocol(String),
    #[error("Invalid model name: {0} (cannot be empty)")]
    InvalidModel(String),
    #[error("Invalid batch size: {0} (must be between 1 and 1000)")]
    InvalidBatchSize(u32),
    #[error("Invalid chunk size: {0} (must be at least 1)")]
    InvalidChunkSize(usize),
    #[error("Chunk overlap ({0}) must be smaller than chunk size ({1})")]
    OverlapTooLarge(usize, usize),
    #[error("Invalid sample size: {0} (must be at least 1)")]
    InvalidSampleSize(usize),
    #[error("Invalid collection name: cannot be empty")]
    InvalidCollection,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Config {
    /// Load configuration from `config.toml` under the data directory,
    /// falling back to defaults when the file does not exist.
    #[inline]
    pub fn load(data_dir: Option<&Path>) -> Result<Self> {
        let base = resolve_data_dir(data_dir)?;
        let config_path = base.join("config.toml");

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;
            toml::from_str::<Config>(&content).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?
        } else {
            Config::default()
        };

        if config.store.data_dir.is_none() {
            config.store.data_dir = Some(base);
        }

        config
            .validate()
            .context("Configuration validation failed")?;

        Ok(config)
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        let base = self.base_dir()?;
        fs::create_dir_all(&base)
            .with_context(|| format!("Failed to create data directory: {}", base.display()))?;

        let config_path = base.join("config.toml");
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunking.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize(self.chunking.chunk_size));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(ConfigError::OverlapTooLarge(
                self.chunking.chunk_overlap,
                self.chunking.chunk_size,
            ));
        }
        if self.sampling.sample_size == 0 {
            return Err(ConfigError::InvalidSampleSize(self.sampling.sample_size));
        }
        if self.store.collection.trim().is_empty() {
            return Err(ConfigError::InvalidCollection);
        }
        self.ollama.validate()?;
        Ok(())
    }

    /// Base directory holding the config file and the persisted vector store
    #[inline]
    pub fn base_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.store.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }

    /// Directory the vector store persists its collections under
    #[inline]
    pub fn vector_store_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.base_dir()?.join("vector_store"))
    }
}

impl OllamaConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protocol != "http" && self.protocol != "https" {
            return Err(ConfigError::InvalidProtocol(self.protocol.clone()));
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }
        if self.batch_size == 0 || self.batch_size > 1000 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }
        self.base_url()?;
        Ok(())
    }

    #[inline]
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url_str = format!("{}://{}:{}", self.protocol, self.host, self.port);
        Url::parse(&url_str).map_err(|_| ConfigError::InvalidUrl(url_str))
    }
}

fn resolve_data_dir(data_dir: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match data_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => default_data_dir(),
    }
}

fn default_data_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|dir| dir.join("complaint-index"))
        .ok_or(ConfigError::DirectoryError)
}
