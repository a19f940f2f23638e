//! Tsushima - Core Simulation Library
//!
//! Deterministic game logic for an open-world samurai action game:
//! - Seeded noise fields (value noise, fBM, Perlin basis)
//! - Chunked world generation and streaming with points of interest
//! - Enemy AI state machine and spawn policy
//! - Player combat, abilities, progression and movement
//! - Quest log
//! - Host collaborator interfaces (renderer, audio, UI, input)
//! - Top-down 2D prototype camera and autopilot
//! - Frame loop orchestration and the bevy plugin

pub mod config;
pub mod constants;
pub mod enemy;
pub mod error;
pub mod game;
pub mod host;
pub mod logging;
pub mod noise;
pub mod player;
pub mod prototype;
pub mod quests;
pub mod world;
