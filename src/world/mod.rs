//! Chunked procedural world.
//!
//! The plane is cut into square chunks of `chunk_tiles` x `chunk_tiles`
//! cells. Each chunk is generated from the seed alone, so unloading is plain
//! destruction and re-entering a region regenerates identical content.
//!
//! Points of interest outlive their chunk: they are registered by id the
//! first time their chunk materialises, and a discovered POI stays discovered
//! across any number of unload/reload cycles.

pub mod wind;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::config::WorldConfig;
use crate::constants::*;
use crate::host::{RenderHandle, RenderObject, Scene};
use crate::noise::{lattice_hash, value_noise, Fbm, NoiseParams, SeededRandom};

/// Terrain category of a world cell, ordered by elevation band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    DeepWater,
    ShallowWater,
    Sand,
    Grass,
    Forest,
    Rock,
    Snow,
}

impl Biome {
    /// Classify normalised height and moisture samples.
    ///
    /// Total over every input: NaN falls through to `Snow`.
    pub fn classify(height: f64, moisture: f64, water_level: f64) -> Self {
        if height < water_level * 0.8 {
            Self::DeepWater
        } else if height < water_level {
            Self::ShallowWater
        } else if height < water_level + 0.03 {
            Self::Sand
        } else if height < 0.6 {
            if moisture > FOREST_MOISTURE {
                Self::Forest
            } else {
                Self::Grass
            }
        } else if height < 0.8 {
            Self::Rock
        } else {
            Self::Snow
        }
    }

    pub fn is_water(&self) -> bool {
        matches!(self, Self::DeepWater | Self::ShallowWater)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeepWater => "deep_water",
            Self::ShallowWater => "shallow_water",
            Self::Sand => "sand",
            Self::Grass => "grass",
            Self::Forest => "forest",
            Self::Rock => "rock",
            Self::Snow => "snow",
        }
    }

    pub fn all() -> [Biome; 7] {
        [
            Self::DeepWater,
            Self::ShallowWater,
            Self::Sand,
            Self::Grass,
            Self::Forest,
            Self::Rock,
            Self::Snow,
        ]
    }
}

/// Per-cell decoration flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decoration {
    #[default]
    None,
    Tree,
    Rock,
}

/// Integer chunk coordinates on the (x, z) plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing a world position
    pub fn from_world(x: f32, z: f32, chunk_size: f32) -> Self {
        Self {
            x: (x / chunk_size).floor() as i32,
            z: (z / chunk_size).floor() as i32,
        }
    }

    /// Euclidean distance in chunk units
    pub fn distance(&self, other: ChunkCoord) -> f32 {
        let dx = (self.x as f64) - (other.x as f64);
        let dz = (self.z as f64) - (other.z as f64);
        (dx * dx + dz * dz).sqrt() as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PoiKind {
    Shrine,
    HotSpring,
}

impl PoiKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shrine => "shrine",
            Self::HotSpring => "hot_spring",
        }
    }
}

/// Stable POI id: at most one POI of each kind per chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoiId {
    pub chunk: ChunkCoord,
    pub kind: PoiKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointOfInterest {
    pub id: PoiId,
    /// World (x, z)
    pub position: Vec2,
    pub interactable: bool,
    /// One-way latch
    pub discovered: bool,
}

impl PointOfInterest {
    pub fn kind(&self) -> PoiKind {
        self.id.kind
    }
}

/// Height, moisture and biome of one world position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainSample {
    pub height: f64,
    pub moisture: f64,
    pub biome: Biome,
}

/// Generated content of one chunk. Immutable once built.
#[derive(Debug, Clone)]
pub struct Chunk {
    coord: ChunkCoord,
    tiles: Vec<Biome>,
    heights: Vec<f32>,
    decor: Vec<Decoration>,
    pois: Vec<PointOfInterest>,
    handles: Vec<RenderHandle>,
}

impl Chunk {
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Biome per cell, row-major by z then x
    pub fn tiles(&self) -> &[Biome] {
        &self.tiles
    }

    /// Terrain elevation per cell, same layout as `tiles`
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn decor(&self) -> &[Decoration] {
        &self.decor
    }

    /// POIs as generated (undiscovered); live state is on `WorldGenerator`
    pub fn pois(&self) -> &[PointOfInterest] {
        &self.pois
    }

    pub fn render_handles(&self) -> &[RenderHandle] {
        &self.handles
    }

    pub fn tree_count(&self) -> usize {
        self.decor.iter().filter(|d| **d == Decoration::Tree).count()
    }

    pub fn rock_count(&self) -> usize {
        self.decor.iter().filter(|d| **d == Decoration::Rock).count()
    }

    /// Content equality, ignoring render handles
    pub fn same_content(&self, other: &Chunk) -> bool {
        self.coord == other.coord
            && self.tiles == other.tiles
            && self.heights.len() == other.heights.len()
            && self
                .heights
                .iter()
                .zip(&other.heights)
                .all(|(a, b)| a.to_bits() == b.to_bits())
            && self.decor == other.decor
            && self.pois == other.pois
    }
}

/// The three continuous fields derived from the world seed
#[derive(Debug, Clone)]
struct WorldFields {
    height: Fbm,
    moisture: Fbm,
    trees: Fbm,
}

impl WorldFields {
    fn new(seed: u32, config: &WorldConfig) -> Self {
        let height = NoiseParams {
            seed: seed.wrapping_add(HEIGHT_SEED_OFFSET),
            octaves: 5,
            lacunarity: 2.1,
            gain: 0.5,
            frequency: 0.005,
        };
        let moisture = NoiseParams {
            seed: seed.wrapping_add(MOISTURE_SEED_OFFSET),
            octaves: 4,
            lacunarity: 2.0,
            gain: 0.55,
            frequency: 0.01,
        };
        let trees = NoiseParams {
            seed: seed.wrapping_add(TREE_SEED_OFFSET),
            octaves: 2,
            lacunarity: 2.0,
            gain: 0.5,
            frequency: 0.05,
        };
        Self {
            height: Fbm::new(height, config.basis),
            moisture: Fbm::new(moisture, config.basis),
            trees: Fbm::new(trees, config.basis),
        }
    }
}

/// Owns every materialised chunk and every registered POI
#[derive(Debug)]
pub struct WorldGenerator {
    config: WorldConfig,
    seed: u32,
    fields: WorldFields,
    chunks: HashMap<ChunkCoord, Chunk>,
    pois: BTreeMap<PoiId, PointOfInterest>,
}

impl WorldGenerator {
    pub fn new(seed: u32, config: WorldConfig) -> Self {
        let fields = WorldFields::new(seed, &config);
        Self {
            config,
            seed,
            fields,
            chunks: HashMap::new(),
            pois: BTreeMap::new(),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn chunk_size(&self) -> f32 {
        self.config.chunk_size()
    }

    pub fn load_radius(&self) -> i32 {
        self.config.load_radius()
    }

    pub fn unload_radius(&self) -> i32 {
        self.config.unload_radius()
    }

    /// Replace the seed: every chunk is destroyed and every POI forgotten
    pub fn set_seed(&mut self, seed: u32, scene: &mut Scene) {
        self.clear(scene);
        self.pois.clear();
        self.seed = seed;
        self.fields = WorldFields::new(seed, &self.config);
        tracing::info!(seed, "world reseeded");
    }

    /// Destroy every loaded chunk, releasing its render handles
    pub fn clear(&mut self, scene: &mut Scene) {
        for (_, chunk) in self.chunks.drain() {
            for handle in chunk.handles {
                scene.remove(handle);
            }
        }
    }

    /// Sample the terrain fields at a world position
    pub fn sample(&self, x: f64, y: f64) -> TerrainSample {
        let (x, y) = self.to_noise_space(x, y);
        let height = self.fields.height.sample(x, y);
        let moisture = self
            .fields
            .moisture
            .sample(x + MOISTURE_COORD_OFFSET, y + MOISTURE_COORD_OFFSET);
        TerrainSample {
            height,
            moisture,
            biome: Biome::classify(height, moisture, self.config.water_level),
        }
    }

    pub fn biome_at(&self, x: f64, y: f64) -> Biome {
        self.sample(x, y).biome
    }

    /// Terrain elevation at a world position; agrees bit-for-bit with the
    /// heights stored in generated chunks
    pub fn get_height_at(&self, x: f32, z: f32) -> f32 {
        let (x, z) = self.to_noise_space(x as f64, z as f64);
        let h = self.fields.height.sample(x, z);
        self.elevation(h)
    }

    fn to_noise_space(&self, x: f64, y: f64) -> (f64, f64) {
        let scale = self.config.noise_scale;
        (x * scale, y * scale)
    }

    fn elevation(&self, height: f64) -> f32 {
        ((height - self.config.water_level) * self.config.terrain_height as f64) as f32
    }

    fn has_tree(&self, x: f64, y: f64) -> bool {
        let (x, y) = self.to_noise_space(x, y);
        self.fields
            .trees
            .sample(x + TREE_COORD_OFFSET_X, y + TREE_COORD_OFFSET_Y)
            > TREE_DENSITY
    }

    /// World position of a global cell index
    fn cell_position(&self, tile_x: i64, tile_z: i64) -> (f32, f32) {
        let ts = self.config.tile_size;
        (tile_x as f32 * ts, tile_z as f32 * ts)
    }

    /// Build a chunk's content without touching the cache or the scene
    pub fn build_chunk(&self, coord: ChunkCoord) -> Chunk {
        let n = self.config.chunk_tiles as usize;
        let base_x = coord.x as i64 * n as i64;
        let base_z = coord.z as i64 * n as i64;

        let mut tiles = Vec::with_capacity(n * n);
        let mut heights = Vec::with_capacity(n * n);
        let mut decor = Vec::with_capacity(n * n);

        for j in 0..n as i64 {
            for i in 0..n as i64 {
                let (wx, wz) = self.cell_position(base_x + i, base_z + j);
                let sample = self.sample(wx as f64, wz as f64);
                tiles.push(sample.biome);
                heights.push(self.elevation(sample.height));
                let tree = sample.biome == Biome::Forest && self.has_tree(wx as f64, wz as f64);
                decor.push(if tree {
                    Decoration::Tree
                } else {
                    Decoration::None
                });
            }
        }

        // Rock scatter: random cells, land only, never on a tree
        let mut rng = SeededRandom::new(lattice_hash(
            coord.x,
            coord.z,
            self.seed.wrapping_add(SCATTER_SEED_OFFSET),
        ));
        let rocks = rng.int(ROCKS_PER_CHUNK.0, ROCKS_PER_CHUNK.1);
        let cells = (n * n) as i32;
        for _ in 0..rocks {
            let idx = rng.int(0, cells - 1) as usize;
            if decor[idx] == Decoration::None && !tiles[idx].is_water() {
                decor[idx] = Decoration::Rock;
            }
        }

        let pois = self.place_structures(coord);

        Chunk {
            coord,
            tiles,
            heights,
            decor,
            pois,
            handles: Vec::new(),
        }
    }

    fn place_structures(&self, coord: ChunkCoord) -> Vec<PointOfInterest> {
        let structure_seed = self.seed.wrapping_add(STRUCTURE_SEED_OFFSET);
        let (cx, cz) = (coord.x as f64, coord.z as f64);
        let size = self.chunk_size();
        let center = Vec2::new(
            (coord.x as f32 + 0.5) * size,
            (coord.z as f32 + 0.5) * size,
        );
        let mut rng = SeededRandom::new(lattice_hash(coord.x, coord.z, structure_seed));
        let mut pois = Vec::new();

        let candidates = [
            (
                PoiKind::Shrine,
                value_noise(cx * 0.1, cz * 0.1, structure_seed),
                SHRINE_THRESHOLD,
                SHRINE_JITTER,
            ),
            (
                PoiKind::HotSpring,
                value_noise(cx * 0.08, cz * 0.08, structure_seed),
                HOT_SPRING_THRESHOLD,
                HOT_SPRING_JITTER,
            ),
        ];

        for (kind, roll, threshold, jitter) in candidates {
            // Both jitter draws happen even when the structure is skipped
            let dx = (rng.next() as f32 - 0.5) * 2.0 * jitter;
            let dz = (rng.next() as f32 - 0.5) * 2.0 * jitter;
            if roll <= threshold {
                continue;
            }
            let position = center + Vec2::new(dx, dz);
            if self
                .biome_at(position.x as f64, position.y as f64)
                .is_water()
            {
                continue;
            }
            pois.push(PointOfInterest {
                id: PoiId { chunk: coord, kind },
                position,
                interactable: true,
                discovered: false,
            });
        }
        pois
    }

    /// Materialise a chunk (idempotent): returns the cached chunk if loaded
    pub fn generate_chunk(&mut self, coord: ChunkCoord, scene: &mut Scene) -> &Chunk {
        if !self.chunks.contains_key(&coord) {
            let mut chunk = self.build_chunk(coord);

            chunk.handles.push(scene.add(RenderObject::Terrain {
                chunk_x: coord.x,
                chunk_z: coord.z,
            }));
            let vegetation = chunk.tree_count() + chunk.rock_count();
            if vegetation > 0 {
                chunk.handles.push(scene.add(RenderObject::Vegetation {
                    chunk_x: coord.x,
                    chunk_z: coord.z,
                    count: vegetation,
                }));
            }
            for poi in &chunk.pois {
                let object = match poi.kind() {
                    PoiKind::Shrine => RenderObject::Shrine {
                        position: poi.position,
                    },
                    PoiKind::HotSpring => RenderObject::HotSpring {
                        position: poi.position,
                    },
                };
                chunk.handles.push(scene.add(object));
                self.pois.entry(poi.id).or_insert_with(|| poi.clone());
            }

            tracing::debug!(
                x = coord.x,
                z = coord.z,
                pois = chunk.pois.len(),
                "chunk generated"
            );
            self.chunks.insert(coord, chunk);
        }
        &self.chunks[&coord]
    }

    /// Destroy a loaded chunk. Returns false if it was not loaded.
    pub fn unload_chunk(&mut self, coord: ChunkCoord, scene: &mut Scene) -> bool {
        match self.chunks.remove(&coord) {
            Some(chunk) => {
                for handle in chunk.handles {
                    scene.remove(handle);
                }
                tracing::debug!(x = coord.x, z = coord.z, "chunk unloaded");
                true
            }
            None => false,
        }
    }

    /// Stream chunks around the focus and run POI discovery.
    ///
    /// Returns the POIs discovered during this call.
    pub fn update(&mut self, focus: Vec3, scene: &mut Scene) -> Vec<PointOfInterest> {
        let center = ChunkCoord::from_world(focus.x, focus.z, self.chunk_size());
        let load = self.load_radius();
        let unload = self.unload_radius() as f32;

        for x in center.x.saturating_sub(load)..=center.x.saturating_add(load) {
            for z in center.z.saturating_sub(load)..=center.z.saturating_add(load) {
                let coord = ChunkCoord::new(x, z);
                if coord.distance(center) <= load as f32 {
                    self.generate_chunk(coord, scene);
                }
            }
        }

        let stale: Vec<ChunkCoord> = self
            .chunks
            .keys()
            .copied()
            .filter(|c| c.distance(center) > unload)
            .collect();
        for coord in stale {
            self.unload_chunk(coord, scene);
        }

        self.discover_near(Vec2::new(focus.x, focus.z))
    }

    fn discover_near(&mut self, focus: Vec2) -> Vec<PointOfInterest> {
        let radius = self.config.discovery_radius;
        let mut found = Vec::new();
        for poi in self.pois.values_mut() {
            if !poi.discovered && poi.position.distance(focus) < radius {
                poi.discovered = true;
                tracing::info!(
                    kind = poi.kind().as_str(),
                    x = poi.position.x,
                    z = poi.position.y,
                    "point of interest discovered"
                );
                found.push(poi.clone());
            }
        }
        found
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn loaded_chunks(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }

    pub fn loaded_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn points_of_interest(&self) -> impl Iterator<Item = &PointOfInterest> {
        self.pois.values()
    }

    pub fn poi(&self, id: PoiId) -> Option<&PointOfInterest> {
        self.pois.get(&id)
    }

    pub fn discovered_count(&self) -> usize {
        self.pois.values().filter(|p| p.discovered).count()
    }

    /// Closest interactable POI within `radius` of a world (x, z)
    pub fn nearest_interactable(&self, position: Vec2, radius: f32) -> Option<&PointOfInterest> {
        self.pois
            .values()
            .filter(|p| p.interactable)
            .map(|p| (p, p.position.distance(position)))
            .filter(|(_, d)| *d < radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| p)
    }

    /// Biome of a global cell, materialising its chunk on demand
    pub fn tile_at(&mut self, tile_x: i64, tile_z: i64, scene: &mut Scene) -> Biome {
        let n = self.config.chunk_tiles as i64;
        let coord = ChunkCoord::new(tile_x.div_euclid(n) as i32, tile_z.div_euclid(n) as i32);
        let (i, j) = (tile_x.rem_euclid(n) as usize, tile_z.rem_euclid(n) as usize);
        self.generate_chunk(coord, scene).tiles[j * n as usize + i]
    }

    /// Whether the cell under a world position is water
    pub fn is_water_at(&mut self, x: f32, z: f32, scene: &mut Scene) -> bool {
        let ts = self.config.tile_size;
        let (tx, tz) = ((x / ts).floor() as i64, (z / ts).floor() as i64);
        self.tile_at(tx, tz, scene).is_water()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world(seed: u32) -> WorldGenerator {
        WorldGenerator::new(seed, WorldConfig::default())
    }

    /// First chunk (scanning outward) that carries a POI
    fn chunk_with_poi(world: &WorldGenerator) -> ChunkCoord {
        for r in 0..60 {
            for x in -r..=r {
                for z in -r..=r {
                    let coord = ChunkCoord::new(x, z);
                    if !world.place_structures(coord).is_empty() {
                        return coord;
                    }
                }
            }
        }
        panic!("no POI found near origin");
    }

    #[test]
    fn test_biome_banding() {
        let wl = 0.38;
        assert_eq!(Biome::classify(0.1, 0.5, wl), Biome::DeepWater);
        assert_eq!(Biome::classify(0.35, 0.5, wl), Biome::ShallowWater);
        assert_eq!(Biome::classify(0.39, 0.5, wl), Biome::Sand);
        assert_eq!(Biome::classify(0.5, 0.3, wl), Biome::Grass);
        assert_eq!(Biome::classify(0.5, 0.7, wl), Biome::Forest);
        assert_eq!(Biome::classify(0.7, 0.7, wl), Biome::Rock);
        assert_eq!(Biome::classify(0.9, 0.1, wl), Biome::Snow);
        assert_eq!(Biome::classify(f64::NAN, 0.1, wl), Biome::Snow);
    }

    #[test]
    fn test_chunk_coord_from_world() {
        assert_eq!(ChunkCoord::from_world(0.0, 0.0, 128.0), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_world(-0.5, 127.9, 128.0), ChunkCoord::new(-1, 0));
        assert_eq!(ChunkCoord::from_world(256.0, -256.0, 128.0), ChunkCoord::new(2, -2));
    }

    #[test]
    fn test_chunk_grid_shape() {
        let w = world(1);
        let chunk = w.build_chunk(ChunkCoord::new(3, -2));
        let cells = 32 * 32;
        assert_eq!(chunk.tiles().len(), cells);
        assert_eq!(chunk.heights().len(), cells);
        assert_eq!(chunk.decor().len(), cells);
    }

    #[test]
    fn test_build_chunk_deterministic() {
        let w = world(42);
        let a = w.build_chunk(ChunkCoord::new(-4, 7));
        let b = w.build_chunk(ChunkCoord::new(-4, 7));
        assert!(a.same_content(&b), "Same seed+coord must reproduce the chunk");
    }

    #[test]
    fn test_trees_only_in_forest() {
        let w = world(7);
        for x in -2..=2 {
            let chunk = w.build_chunk(ChunkCoord::new(x, x));
            for (tile, deco) in chunk.tiles().iter().zip(chunk.decor()) {
                if *deco == Decoration::Tree {
                    assert_eq!(*tile, Biome::Forest);
                }
                if *deco == Decoration::Rock {
                    assert!(!tile.is_water(), "Rocks are never placed in water");
                }
            }
        }
    }

    #[test]
    fn test_height_query_matches_chunk() {
        let mut scene = Scene::headless();
        let mut w = world(99);
        let coord = ChunkCoord::new(-1, 2);
        let ts = w.config().tile_size;
        let chunk = w.generate_chunk(coord, &mut scene).clone();
        for (idx, stored) in chunk.heights().iter().enumerate().step_by(37) {
            let i = (idx % 32) as i64 + coord.x as i64 * 32;
            let j = (idx / 32) as i64 + coord.z as i64 * 32;
            let h = w.get_height_at(i as f32 * ts, j as f32 * ts);
            assert_eq!(h.to_bits(), stored.to_bits(), "Height mismatch at cell {idx}");
        }
    }

    #[test]
    fn test_generate_is_idempotent() {
        let mut scene = Scene::headless();
        let mut w = world(5);
        let coord = ChunkCoord::new(0, 0);
        let first = w.generate_chunk(coord, &mut scene).render_handles().to_vec();
        let live = scene.live_count();
        let second = w.generate_chunk(coord, &mut scene).render_handles().to_vec();
        assert_eq!(first, second);
        assert_eq!(scene.live_count(), live, "Cached chunk must not re-add render objects");
    }

    #[test]
    fn test_update_loads_disc_and_unloads_far() {
        let mut scene = Scene::headless();
        let mut w = world(11);
        w.update(Vec3::ZERO, &mut scene);
        let load = w.load_radius() as f32;
        for coord in w.loaded_chunks() {
            assert!(coord.distance(ChunkCoord::new(0, 0)) <= load);
        }
        assert!(w.is_loaded(ChunkCoord::new(3, 0)));
        assert!(!w.is_loaded(ChunkCoord::new(3, 3)), "Corner is outside the load disc");

        // Teleport far away: everything near the origin goes
        w.update(Vec3::new(10_000.0, 0.0, 10_000.0), &mut scene);
        assert!(!w.is_loaded(ChunkCoord::new(0, 0)));
        let handles: usize = w
            .loaded_chunks()
            .filter_map(|c| w.chunk(c))
            .map(|c| c.render_handles().len())
            .sum();
        assert_eq!(scene.live_count(), handles, "Every unloaded handle must be released");
        assert_eq!(scene.stats().stray_removals, 0);
    }

    #[test]
    fn test_hysteresis_keeps_band() {
        let mut scene = Scene::headless();
        let mut w = world(3);
        let size = w.chunk_size();
        w.update(Vec3::ZERO, &mut scene);
        assert!(w.is_loaded(ChunkCoord::new(-3, 0)));
        // Step one chunk east: (-3, 0) is now 4 away, inside the unload radius
        w.update(Vec3::new(size + 1.0, 0.0, 0.0), &mut scene);
        assert!(w.is_loaded(ChunkCoord::new(-3, 0)), "Band chunk must stay loaded");
        w.update(Vec3::new(2.0 * size + 1.0, 0.0, 0.0), &mut scene);
        assert!(!w.is_loaded(ChunkCoord::new(-3, 0)));
    }

    #[test]
    fn test_reload_reproduces_chunk() {
        let mut scene = Scene::headless();
        let mut w = world(21);
        let coord = ChunkCoord::new(1, 1);
        let before = w.generate_chunk(coord, &mut scene).clone();
        assert!(w.unload_chunk(coord, &mut scene));
        assert!(!w.unload_chunk(coord, &mut scene));
        let after = w.generate_chunk(coord, &mut scene);
        assert!(before.same_content(after));
    }

    #[test]
    fn test_poi_discovery_latch_survives_reload() {
        let mut scene = Scene::headless();
        let mut w = world(1337);
        let coord = chunk_with_poi(&w);
        let poi = w.build_chunk(coord).pois()[0].clone();

        let focus = Vec3::new(poi.position.x, 0.0, poi.position.y);
        let found = w.update(focus, &mut scene);
        assert!(found.iter().any(|p| p.id == poi.id));
        assert!(w.poi(poi.id).map_or(false, |p| p.discovered));

        // Second visit reports nothing new
        assert!(w.update(focus, &mut scene).iter().all(|p| p.id != poi.id));

        w.update(Vec3::new(50_000.0, 0.0, 0.0), &mut scene);
        assert!(!w.is_loaded(coord));
        w.update(focus, &mut scene);
        assert!(w.poi(poi.id).map_or(false, |p| p.discovered), "Discovery never reverts");
        assert_eq!(w.points_of_interest().filter(|p| p.id == poi.id).count(), 1);
    }

    #[test]
    fn test_set_seed_disposes_everything() {
        let mut scene = Scene::headless();
        let mut w = world(8);
        w.update(Vec3::ZERO, &mut scene);
        assert!(scene.live_count() > 0);
        w.set_seed(9, &mut scene);
        assert_eq!(w.loaded_count(), 0);
        assert_eq!(scene.live_count(), 0);
        assert_eq!(w.points_of_interest().count(), 0);
        assert_eq!(w.seed(), 9);
    }

    #[test]
    fn test_tile_at_negative_cells() {
        let mut scene = Scene::headless();
        let mut w = world(4);
        let ts = w.config().tile_size;
        let biome = w.tile_at(-1, -33, &mut scene);
        assert_eq!(biome, w.biome_at(-1.0 * ts as f64, -33.0 * ts as f64));
        assert!(w.is_loaded(ChunkCoord::new(-1, -2)));
    }

    #[test]
    fn test_prototype_samples_per_tile_index() {
        let mut scene = Scene::headless();
        let mut proto = WorldGenerator::new(21, WorldConfig::prototype());
        let unit = world(21);
        for (tx, tz) in [(0_i64, 0_i64), (3, -7), (-40, 12), (65, 65)] {
            assert_eq!(
                proto.tile_at(tx, tz, &mut scene),
                unit.biome_at(tx as f64, tz as f64),
                "Tile ({tx}, {tz})"
            );
        }
    }

    #[test]
    fn test_nearest_interactable() {
        let mut scene = Scene::headless();
        let mut w = world(1337);
        let coord = chunk_with_poi(&w);
        w.generate_chunk(coord, &mut scene);
        let poi = w.build_chunk(coord).pois()[0].clone();
        let near = w.nearest_interactable(poi.position + Vec2::new(3.0, 0.0), 8.0);
        assert_eq!(near.map(|p| p.id), Some(poi.id));
        assert!(w.nearest_interactable(poi.position + Vec2::new(500.0, 0.0), 8.0).is_none());
    }
}
