//! Config loading from disk

use std::io::Write;

use tsushima_core::config::GameConfig;
use tsushima_core::error::ConfigError;
use tsushima_core::noise::NoiseBasis;

fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_ron_with_partial_fields() {
    let file = write_temp(
        ".ron",
        "(seed: 7, world: (tile_size: 8.0, basis: Gradient), enemies: (max_enemies: 3))",
    );
    let config = GameConfig::load(file.path()).unwrap();
    assert_eq!(config.seed, 7);
    assert_eq!(config.world.tile_size, 8.0);
    assert_eq!(config.world.basis, NoiseBasis::Gradient);
    assert_eq!(config.world.chunk_tiles, 32, "Missing fields take defaults");
    assert_eq!(config.enemies.max_enemies, 3);
}

#[test]
fn test_load_json_by_extension() {
    let file = write_temp(".json", r#"{"seed": 99, "max_frame_delta": 0.1}"#);
    let config = GameConfig::load(file.path()).unwrap();
    assert_eq!(config.seed, 99);
    assert_eq!(config.max_frame_delta, 0.1);
}

#[test]
fn test_saved_config_reloads() {
    let mut config = GameConfig::default();
    config.seed = 4242;
    config.enemies.detection_range = 20.0;
    let file = write_temp(".ron", &config.to_ron());
    assert_eq!(GameConfig::load(file.path()).unwrap(), config);
}

#[test]
fn test_invalid_values_are_rejected_on_load() {
    let file = write_temp(".ron", "(enemies: (combat_range: 20.0, detection_range: 10.0))");
    assert!(matches!(
        GameConfig::load(file.path()),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.ron");
    assert!(matches!(GameConfig::load(&missing), Err(ConfigError::Io(_))));
}

#[test]
fn test_malformed_ron() {
    let file = write_temp(".ron", "(seed: )");
    assert!(matches!(GameConfig::load(file.path()), Err(ConfigError::Ron(_))));
}
