use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use itertools::Itertools;

use crate::IndexError;
use crate::config::Config;
use crate::dataset::{load_records, stratified_sample};
use crate::embeddings::OllamaClient;
use crate::pipeline::PipelineDriver;
use crate::store::VectorStore;

/// Build (or rebuild) the semantic index from a cleaned complaints CSV.
#[inline]
pub async fn run_index(
    input: &Path,
    data_dir: Option<&Path>,
    sample_size: Option<usize>,
    collection: Option<String>,
) -> Result<()> {
    let mut config = Config::load(data_dir)?;
    if let Some(sample_size) = sample_size {
        config.sampling.sample_size = sample_size;
    }
    if let Some(collection) = collection {
        config.store.collection = collection;
    }
    config
        .validate()
        .context("Configuration validation failed")?;

    let records = load_records(input)?;
    if records.is_empty() {
        return Err(IndexError::Config(
            "Input dataset contains no records with a clean narrative".to_string(),
        )
        .into());
    }

    let sampled = stratified_sample(records, config.sampling.sample_size, config.sampling.seed);

    let client =
        OllamaClient::new(&config.ollama).context("Failed to initialize Ollama client")?;

    let store_path = config.vector_store_path()?;
    let mut store = VectorStore::open(&store_path, &config.store.collection)
        .await
        .context("Failed to open vector store")?;

    let summary = PipelineDriver::new(&client, &mut store, config.chunking.clone())
        .with_progress(true)
        .run(&sampled)
        .await?;

    println!("{}", style("Indexing complete").green().bold());
    println!("  Records processed: {}", summary.records_processed);
    println!("  Entries indexed:   {}", summary.entries_indexed);
    println!("  Collection:        {}", config.store.collection);

    if summary.failed_records.is_empty() {
        println!("{}", style("All sampled records indexed.").green());
    } else {
        println!(
            "{}",
            style(format!(
                "  Failed records ({}): {}",
                summary.failed_records.len(),
                summary.failed_records.iter().join(", ")
            ))
            .yellow()
        );
        println!("  Re-running upserts entries in place, so failed records can be retried safely.");
    }

    Ok(())
}

/// Show the persisted collection's location and size.
#[inline]
pub async fn show_status(data_dir: Option<&Path>, collection: Option<String>) -> Result<()> {
    let mut config = Config::load(data_dir)?;
    if let Some(collection) = collection {
        config.store.collection = collection;
    }

    let store_path = config.vector_store_path()?;
    let store = VectorStore::open(&store_path, &config.store.collection)
        .await
        .context("Failed to open vector store")?;
    let count = store.count_entries().await?;

    println!("Collection: {}", config.store.collection);
    println!("Location:   {}", store_path.display());
    println!("Entries:    {}", count);
    if count == 0 {
        println!("No entries yet. Run 'complaint-index index <csv>' to build the index.");
    }

    Ok(())
}

/// Print the effective configuration as TOML.
#[inline]
pub fn show_config(data_dir: Option<&Path>) -> Result<()> {
    let config = Config::load(data_dir)?;
    let content = toml::to_string_pretty(&config).context("Failed to render config")?;
    print!("{}", content);
    Ok(())
}

/// Write a default config file when none exists yet.
#[inline]
pub fn init_config(data_dir: Option<&Path>) -> Result<()> {
    let config = Config::load(data_dir)?;
    let base = config.base_dir()?;
    let config_path = base.join("config.toml");

    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return Ok(());
    }

    config.save()?;
    println!("Wrote default config to {}", config_path.display());
    Ok(())
}
