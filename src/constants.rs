//! Centralized game constants for the tsushima core.
//!
//! Eliminates magic numbers duplicated across the player, enemy and world
//! modules. Values that are meant to be tuned per session (distances, caps,
//! seed) live in `config` instead.

// =====================================================
// Player combat
// =====================================================

/// Per-combo-step damage bonus: final = 1.0 + (combo - 1) * COMBO_STEP_BONUS
pub const COMBO_STEP_BONUS: f64 = 0.2;

/// Longest combo chain
pub const MAX_COMBO: u32 = 3;

/// Seconds after a light attack during which the next one extends the combo
pub const COMBO_WINDOW: f32 = 1.5;

/// Critical damage multiplier (1.5x)
pub const CRIT_DAMAGE_MULT: f64 = 1.5;

/// Heavy attacks ignore combos and deal a flat multiplier
pub const HEAVY_DAMAGE_MULT: f64 = 2.0;

/// Stamina consumed (and required) by a heavy attack
pub const HEAVY_STAMINA_COST: f32 = 30.0;

/// Light attack cooldown at sword mastery 1, reduced per extra level
pub const LIGHT_ATTACK_COOLDOWN: f32 = 0.4;
pub const LIGHT_COOLDOWN_PER_SKILL: f32 = 0.03;

pub const HEAVY_ATTACK_COOLDOWN: f32 = 1.2;

/// Swing window of a light attack: base + per combo step
pub const LIGHT_SWING_BASE: f32 = 0.25;
pub const LIGHT_SWING_PER_COMBO: f32 = 0.05;

pub const HEAVY_SWING: f32 = 0.5;

// =====================================================
// Player stats & progression
// =====================================================

pub const BASE_ATTACK_DAMAGE: f32 = 25.0;
pub const BASE_CRIT_CHANCE: f64 = 0.1;
pub const BASE_MAX_HEALTH: f32 = 100.0;
pub const BASE_MAX_STAMINA: f32 = 100.0;

/// XP needed for level 2
pub const BASE_XP_TO_NEXT: u32 = 100;

/// Multiplicative growth of the XP requirement per level
pub const XP_GROWTH: f64 = 1.4;

pub const SKILL_POINTS_PER_LEVEL: u32 = 2;
pub const HEALTH_PER_LEVEL: f32 = 15.0;
pub const STAMINA_PER_LEVEL: f32 = 8.0;
pub const ATTACK_PER_LEVEL: f32 = 3.0;

/// Fraction of max health restored on respawn
pub const RESPAWN_HEALTH_FRACTION: f32 = 0.5;

// =====================================================
// Player movement
// =====================================================

pub const MOVE_SPEED: f32 = 25.0;
pub const MOVE_SPEED_PER_LEVEL: f32 = 2.0;
pub const SPRINT_MULT: f32 = 1.8;
pub const STEALTH_SPEED_MULT: f32 = 0.6;
pub const SPRINT_STAMINA_DRAIN: f32 = 25.0;
pub const STAMINA_REGEN: f32 = 15.0;
pub const JUMP_FORCE: f32 = 15.0;
pub const JUMP_STAMINA_COST: f32 = 10.0;
pub const GRAVITY: f32 = -30.0;

/// Eye height kept above the terrain surface
pub const PLAYER_STANDING_HEIGHT: f32 = 1.0;

// =====================================================
// Stealth
// =====================================================

pub const STEALTH_PER_SKILL_LEVEL: f32 = 10.0;
pub const STEALTH_MODE_BONUS: f32 = 50.0;
pub const SPRINT_STEALTH_PENALTY: f32 = 30.0;
pub const WALK_STEALTH_PENALTY: f32 = 10.0;

// =====================================================
// Enemy AI
// =====================================================

pub const ENEMY_MAX_HEALTH: f32 = 50.0;
pub const ENEMY_DAMAGE: f32 = 15.0;
pub const ENEMY_SPEED: f32 = 12.0;

/// Patrol movement runs at a fraction of full speed
pub const PATROL_SPEED_FACTOR: f32 = 0.3;

/// Side length of the square a new patrol target is rolled in
pub const PATROL_RANGE: f32 = 20.0;

/// Distance at which a patrol target counts as reached
pub const PATROL_ARRIVAL: f32 = 2.0;

/// Dwell time at a reached patrol target
pub const PATROL_DWELL: f32 = 2.0;

/// Detection range multiplier while the player sprints
pub const SPRINT_DETECTION_MULT: f32 = 1.5;

/// Chase is abandoned beyond detection_range * this
pub const LOSE_TARGET_MULT: f32 = 2.0;

/// Attack falls back to chase beyond combat_range * this
pub const ATTACK_LEASH_MULT: f32 = 1.5;

/// Wind-up before the first swing after entering attack
pub const ATTACK_WINDUP: f32 = 0.5;

/// Fixed interval between enemy swings
pub const ENEMY_ATTACK_INTERVAL: f32 = 1.5;

/// Recovery time of an enemy interrupted by a player strike
pub const STUN_DURATION: f32 = 0.8;

pub const KILL_XP: u32 = 25;
pub const TAKEDOWN_BONUS_XP: u32 = 50;

/// Height enemies are placed at when spawned
pub const ENEMY_SPAWN_HEIGHT: f32 = 2.0;

// =====================================================
// Cosmetics
// =====================================================

pub const HIT_FLASH_SECS: f64 = 0.2;
pub const ALERT_INDICATOR_SECS: f64 = 2.0;

// =====================================================
// World generation
// =====================================================

/// Seed offsets decorrelating the noise fields derived from one world seed
pub const HEIGHT_SEED_OFFSET: u32 = 100;
pub const MOISTURE_SEED_OFFSET: u32 = 200;
pub const TREE_SEED_OFFSET: u32 = 300;
pub const STRUCTURE_SEED_OFFSET: u32 = 400;
pub const SCATTER_SEED_OFFSET: u32 = 500;

/// Moisture is sampled at shifted coordinates
pub const MOISTURE_COORD_OFFSET: f64 = 1000.0;

/// Tree field coordinate offsets
pub const TREE_COORD_OFFSET_X: f64 = 333.0;
pub const TREE_COORD_OFFSET_Y: f64 = 777.0;

/// Tree field threshold inside forest cells
pub const TREE_DENSITY: f64 = 0.72;

/// Moisture above which mid-elevation cells become forest
pub const FOREST_MOISTURE: f64 = 0.55;

pub const SHRINE_THRESHOLD: f64 = 0.7;
pub const HOT_SPRING_THRESHOLD: f64 = 0.65;

/// Half-extent of the jitter box a structure is placed in, around the chunk centre
pub const SHRINE_JITTER: f32 = 20.0;
pub const HOT_SPRING_JITTER: f32 = 30.0;

/// Rocks scattered per chunk (inclusive range)
pub const ROCKS_PER_CHUNK: (i32, i32) = (5, 12);

pub const SHRINE_HEAL: f32 = 20.0;
