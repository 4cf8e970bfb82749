use super::*;
use tempfile::TempDir;

fn test_config(base_dir: &Path) -> Config {
    Config {
        server: ServerConfig::default(),
        gemini: GeminiConfig::default(),
        ingest: IngestConfig::default(),
        base_dir: base_dir.to_path_buf(),
    }
}

#[test]
fn default_config_is_valid() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = test_config(temp_dir.path());

    assert!(config.validate().is_ok());
    assert_eq!(config.ingest.batch_size, 500);
    assert_eq!(config.ingest.per_category_limit, 50);
    assert_eq!(config.ingest.inter_batch_delay_secs, 20);
    assert_eq!(config.ingest.rate_limit_backoff_secs, 60);
    assert!(
        config
            .ingest
            .quota_markers
            .iter()
            .any(|m| m == "RESOURCE_EXHAUSTED")
    );
}

#[test]
fn load_without_file_returns_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = Config::load(temp_dir.path()).expect("should load defaults");

    assert_eq!(config, test_config(temp_dir.path()));
}

#[test]
fn save_and_reload_roundtrip() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut config = test_config(temp_dir.path());
    config.server.port = 9001;
    config.ingest.batch_size = 250;
    config.gemini.chat_model = "gemini-test".to_string();

    config.save().expect("should save config");

    let reloaded = Config::load(temp_dir.path()).expect("should reload config");
    assert_eq!(reloaded.server.port, 9001);
    assert_eq!(reloaded.ingest.batch_size, 250);
    assert_eq!(reloaded.gemini.chat_model, "gemini-test");
}

#[test]
fn invalid_port_rejected() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut config = test_config(temp_dir.path());
    config.server.port = 0;

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidPort(0))
    ));
}

#[test]
fn invalid_batch_size_rejected() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut config = test_config(temp_dir.path());
    config.ingest.batch_size = 0;

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidBatchSize(0))
    ));
}

#[test]
fn invalid_per_category_limit_rejected() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut config = test_config(temp_dir.path());
    config.ingest.per_category_limit = 5000;

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidPerCategoryLimit(5000))
    ));
}

#[test]
fn empty_chat_model_rejected() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut config = test_config(temp_dir.path());
    config.gemini.chat_model = "  ".to_string();

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidModel(_))
    ));
}

#[test]
fn invalid_temperature_rejected() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut config = test_config(temp_dir.path());
    config.gemini.temperature = 3.5;

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidTemperature(_))
    ));
}

#[test]
fn invalid_api_base_rejected() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut config = test_config(temp_dir.path());
    config.gemini.api_base = "not a url".to_string();

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidUrl(_))
    ));
}

#[test]
fn path_helpers_derive_from_base_dir() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = test_config(temp_dir.path());

    assert_eq!(config.data_dir(), temp_dir.path().join("data"));
    assert_eq!(config.vector_db_path(), temp_dir.path().join("vectors"));
    assert_eq!(config.prompts_dir(), temp_dir.path().join("prompts"));
    assert_eq!(
        config.config_file_path(),
        temp_dir.path().join("config.toml")
    );
}

#[test]
fn missing_api_key_env_is_an_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut config = test_config(temp_dir.path());
    config.gemini.api_key_env = "SHOP_SEARCH_TEST_KEY_THAT_DOES_NOT_EXIST".to_string();

    assert!(matches!(
        config.gemini.api_key(),
        Err(ConfigError::MissingApiKey(_))
    ));
}
