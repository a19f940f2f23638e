use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::noise::NoiseBasis;

/// Session configuration. Loaded once at startup; the seed fixes every
/// generated field for the lifetime of the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub seed: u32,
    /// Upper bound on a single frame's delta, in seconds
    pub max_frame_delta: f32,
    pub world: WorldConfig,
    pub enemies: EnemyConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 1337,
            max_frame_delta: 0.05,
            world: WorldConfig::default(),
            enemies: EnemyConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Cells per chunk side
    pub chunk_tiles: u32,
    /// World units per cell
    pub tile_size: f32,
    pub load_distance: f32,
    pub unload_distance: f32,
    /// Vertical scale applied to the height field
    pub terrain_height: f32,
    /// Normalised height below which cells are water
    pub water_level: f64,
    /// Distance under which a POI flips to discovered
    pub discovery_radius: f32,
    /// Distance under which the player can use a POI
    pub interaction_radius: f32,
    /// Noise-space units per world unit
    pub noise_scale: f64,
    pub basis: NoiseBasis,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_tiles: 32,
            tile_size: 4.0,
            load_distance: 300.0,
            unload_distance: 400.0,
            terrain_height: 20.0,
            water_level: 0.38,
            discovery_radius: 10.0,
            interaction_radius: 8.0,
            noise_scale: 1.0,
            basis: NoiseBasis::Value,
        }
    }
}

impl WorldConfig {
    /// Preset for the 2D prototype: 16-pixel tiles, visible-area streaming.
    /// Noise is sampled per tile index, not per pixel.
    pub fn prototype() -> Self {
        Self {
            tile_size: 16.0,
            noise_scale: 1.0 / 16.0,
            load_distance: 1024.0,
            unload_distance: 1536.0,
            ..Default::default()
        }
    }

    /// Side length of a chunk in world units
    pub fn chunk_size(&self) -> f32 {
        self.chunk_tiles as f32 * self.tile_size
    }

    /// Chunk-distance within which chunks are kept generated
    pub fn load_radius(&self) -> i32 {
        (self.load_distance / self.chunk_size()).ceil() as i32
    }

    /// Chunk-distance beyond which chunks are destroyed
    pub fn unload_radius(&self) -> i32 {
        (self.unload_distance / self.chunk_size()).ceil() as i32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub max_enemies: usize,
    pub combat_range: f32,
    pub detection_range: f32,
    /// Base seconds between spawns
    pub spawn_interval: f32,
    /// Extra random seconds added to each spawn interval
    pub spawn_jitter: f32,
    pub spawn_distance_min: f32,
    pub spawn_distance_max: f32,
    /// Spawns queued at session start, still subject to the cap
    pub initial_enemies: usize,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            max_enemies: 8,
            combat_range: 5.0,
            detection_range: 15.0,
            spawn_interval: 10.0,
            spawn_jitter: 10.0,
            spawn_distance_min: 30.0,
            spawn_distance_max: 80.0,
            initial_enemies: 3,
        }
    }
}

impl GameConfig {
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.ron` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_ron_str(&text),
        }
    }

    pub fn to_ron(&self) -> String {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()).unwrap_or_default()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.world;
        if w.chunk_tiles == 0 {
            return Err(ConfigError::Invalid("chunk_tiles must be positive".into()));
        }
        if !(w.tile_size > 0.0) {
            return Err(ConfigError::Invalid("tile_size must be positive".into()));
        }
        if !(w.noise_scale.is_finite() && w.noise_scale > 0.0) {
            return Err(ConfigError::Invalid("noise_scale must be positive".into()));
        }
        if !(w.load_distance >= 0.0) {
            return Err(ConfigError::Invalid("load_distance must be non-negative".into()));
        }
        if w.unload_radius() <= w.load_radius() {
            return Err(ConfigError::Invalid(format!(
                "unload radius {} must exceed load radius {}",
                w.unload_radius(),
                w.load_radius()
            )));
        }

        let e = &self.enemies;
        if !(e.combat_range > 0.0) {
            return Err(ConfigError::Invalid("combat_range must be positive".into()));
        }
        if e.detection_range < e.combat_range {
            return Err(ConfigError::Invalid(
                "detection_range must be at least combat_range".into(),
            ));
        }
        if !(e.spawn_distance_min > 0.0) || e.spawn_distance_max < e.spawn_distance_min {
            return Err(ConfigError::Invalid("spawn distance band is empty".into()));
        }
        if !(self.max_frame_delta.is_finite() && self.max_frame_delta > 0.0) {
            return Err(ConfigError::Invalid("max_frame_delta must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn test_default_radii() {
        let w = WorldConfig::default();
        assert_eq!(w.chunk_size(), 128.0);
        assert_eq!(w.load_radius(), 3);
        assert_eq!(w.unload_radius(), 4);
    }

    #[test]
    fn test_prototype_radii_have_hysteresis() {
        let w = WorldConfig::prototype();
        assert!(w.unload_radius() > w.load_radius());
    }

    #[test]
    fn test_rejects_empty_hysteresis_band() {
        let mut config = GameConfig::default();
        config.world.unload_distance = config.world.load_distance;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_degenerate_scales() {
        let mut config = GameConfig::default();
        config.world.noise_scale = 0.0;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.max_frame_delta = f32::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_detection_below_combat() {
        let mut config = GameConfig::default();
        config.enemies.detection_range = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ron_roundtrip() {
        let mut config = GameConfig::default();
        config.seed = 9001;
        config.world.basis = NoiseBasis::Gradient;
        let restored = GameConfig::from_ron_str(&config.to_ron()).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json_str(r#"{"seed": 5, "enemies": {"max_enemies": 2}}"#)
            .unwrap();
        assert_eq!(config.seed, 5);
        assert_eq!(config.enemies.max_enemies, 2);
        assert_eq!(config.enemies.combat_range, 5.0);
        assert_eq!(config.world, WorldConfig::default());
    }

    #[test]
    fn test_bad_ron_is_error() {
        assert!(matches!(
            GameConfig::from_ron_str("(seed: \"nope\")"),
            Err(ConfigError::Ron(_))
        ));
    }
}
