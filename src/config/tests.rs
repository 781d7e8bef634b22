use super::*;
use tempfile::TempDir;

#[test]
fn default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());

    assert_eq!(config.chunking.chunk_size, 500);
    assert_eq!(config.chunking.chunk_overlap, 50);
    assert_eq!(config.sampling.sample_size, 12000);
    assert_eq!(config.sampling.seed, 42);
    assert_eq!(config.ollama.model, "all-minilm:latest");
    assert_eq!(config.store.collection, "complaints");
}

#[test]
fn overlap_must_be_smaller_than_chunk_size() {
    let mut config = Config::default();
    config.chunking.chunk_overlap = 500;

    let err = config.validate().expect_err("should reject equal overlap");
    assert!(matches!(err, ConfigError::OverlapTooLarge(500, 500)));

    config.chunking.chunk_overlap = 600;
    assert!(config.validate().is_err());
}

#[test]
fn rejects_zero_chunk_size() {
    let mut config = Config::default();
    config.chunking.chunk_size = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidChunkSize(0))
    ));
}

#[test]
fn rejects_zero_sample_size() {
    let mut config = Config::default();
    config.sampling.sample_size = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidSampleSize(0))
    ));
}

#[test]
fn rejects_empty_collection_name() {
    let mut config = Config::default();
    config.store.collection = "  ".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidCollection)
    ));
}

#[test]
fn rejects_invalid_ollama_settings() {
    let mut config = Config::default();
    config.ollama.protocol = "ftp".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidProtocol(_))
    ));

    let mut config = Config::default();
    config.ollama.model = String::new();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidModel(_))
    ));

    let mut config = Config::default();
    config.ollama.batch_size = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidBatchSize(0))
    ));
}

#[test]
fn load_without_file_uses_defaults() {
    let temp = TempDir::new().expect("temp dir");
    let config = Config::load(Some(temp.path())).expect("load defaults");

    assert_eq!(config.chunking, ChunkingConfig::default());
    assert_eq!(config.store.data_dir.as_deref(), Some(temp.path()));
}

#[test]
fn save_and_reload_round_trips() {
    let temp = TempDir::new().expect("temp dir");

    let mut config = Config::load(Some(temp.path())).expect("load defaults");
    config.chunking.chunk_size = 300;
    config.chunking.chunk_overlap = 30;
    config.sampling.sample_size = 100;
    config.store.collection = "complaints_test".to_string();
    config.save().expect("save config");

    let reloaded = Config::load(Some(temp.path())).expect("reload");
    assert_eq!(reloaded, config);
}

#[test]
fn load_rejects_invalid_file() {
    let temp = TempDir::new().expect("temp dir");
    let content = "[chunking]\nchunk_size = 100\nchunk_overlap = 100\n";
    std::fs::write(temp.path().join("config.toml"), content).expect("write config");

    assert!(Config::load(Some(temp.path())).is_err());
}

#[test]
fn vector_store_path_is_under_data_dir() {
    let temp = TempDir::new().expect("temp dir");
    let config = Config::load(Some(temp.path())).expect("load defaults");

    let path = config.vector_store_path().expect("path");
    assert_eq!(path, temp.path().join("vector_store"));
}
