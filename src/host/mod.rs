//! Host collaborators.
//!
//! The simulation talks to the renderer, audio, UI and input layers only
//! through these capability traits. Each has a no-op implementation chosen at
//! construction time, so a missing collaborator never needs a check at the
//! call site. Renderer and audio calls may fail; the core logs the failure
//! and keeps ticking.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::HostError;
use crate::world::Biome;

/// Opaque id of a scene object owned by the core.
///
/// Every handle passed to `Renderer::add` is passed to `Renderer::remove`
/// exactly once, on the destroy path of whatever owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RenderHandle(pub u64);

/// What a render handle stands for
#[derive(Debug, Clone, PartialEq)]
pub enum RenderObject {
    /// Terrain mesh of one chunk
    Terrain { chunk_x: i32, chunk_z: i32 },
    /// Tree and rock instances of one chunk
    Vegetation { chunk_x: i32, chunk_z: i32, count: usize },
    Shrine { position: Vec2 },
    HotSpring { position: Vec2 },
    Enemy { id: u64, position: Vec3 },
}

pub trait Renderer: Send + Sync {
    fn add(&mut self, handle: RenderHandle, object: RenderObject) -> Result<(), HostError>;
    /// Remove from the scene and release GPU resources
    fn remove(&mut self, handle: RenderHandle) -> Result<(), HostError>;
    /// Cosmetic transform sync; default ignores it
    fn set_position(&mut self, _handle: RenderHandle, _position: Vec3) -> Result<(), HostError> {
        Ok(())
    }
}

/// One-shot audio cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCue {
    Attack,
    Hit,
    LevelUp,
    QuestComplete,
}

pub trait AudioSink: Send + Sync {
    fn play(&mut self, cue: AudioCue) -> Result<(), HostError>;
    /// Continuous per-frame ambience: wind intensity in [0, 1] and the biome underfoot
    fn set_ambience(&mut self, wind_intensity: f32, biome: Biome) -> Result<(), HostError>;
}

/// Category of a UI notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    Info,
    Success,
    Xp,
    Warning,
}

pub trait Notifier: Send + Sync {
    fn notify(&mut self, text: &str, kind: NoticeKind);
    fn quest_progress(&mut self, quest_id: &str, progress: u32, max: u32);
}

/// Named input actions, read as held/not-held once per update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
    Sprint,
    Attack,
    HeavyAttack,
    WindStrike,
    StealthMode,
    Focus,
    Interact,
    Takedown,
}

pub trait InputSource {
    fn is_down(&self, action: Action) -> bool;
}

/// Set of currently held actions; the default input source
#[derive(Resource, Debug, Default, Clone)]
pub struct ActionState {
    held: HashSet<Action>,
}

impl ActionState {
    pub fn press(&mut self, action: Action) {
        self.held.insert(action);
    }

    pub fn release(&mut self, action: Action) {
        self.held.remove(&action);
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn set(&mut self, action: Action, down: bool) {
        if down {
            self.press(action);
        } else {
            self.release(action);
        }
    }
}

impl InputSource for ActionState {
    fn is_down(&self, action: Action) -> bool {
        self.held.contains(&action)
    }
}

/// Stand-in for every collaborator when the host provides none
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHost;

impl Renderer for NoopHost {
    fn add(&mut self, _handle: RenderHandle, _object: RenderObject) -> Result<(), HostError> {
        Ok(())
    }

    fn remove(&mut self, _handle: RenderHandle) -> Result<(), HostError> {
        Ok(())
    }
}

impl AudioSink for NoopHost {
    fn play(&mut self, _cue: AudioCue) -> Result<(), HostError> {
        Ok(())
    }

    fn set_ambience(&mut self, _wind_intensity: f32, _biome: Biome) -> Result<(), HostError> {
        Ok(())
    }
}

impl Notifier for NoopHost {
    fn notify(&mut self, _text: &str, _kind: NoticeKind) {}
    fn quest_progress(&mut self, _quest_id: &str, _progress: u32, _max: u32) {}
}

impl InputSource for NoopHost {
    fn is_down(&self, _action: Action) -> bool {
        false
    }
}

/// Add/remove bookkeeping counters of a `Scene`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneStats {
    pub added: usize,
    pub removed: usize,
    /// Removals refused because the handle was not live
    pub stray_removals: usize,
    /// Collaborator calls that returned an error
    pub failures: usize,
}

/// The core's view of the renderer: allocates handles, tracks which are
/// live, and forwards to the collaborator.
///
/// A handle stays owned by the core even when the renderer rejects the add,
/// so the destroy path still removes it exactly once.
pub struct Scene {
    renderer: Box<dyn Renderer>,
    next_handle: u64,
    live: HashSet<RenderHandle>,
    stats: SceneStats,
}

impl Default for Scene {
    fn default() -> Self {
        Self::headless()
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("live", &self.live.len())
            .field("stats", &self.stats)
            .finish()
    }
}

impl Scene {
    pub fn new(renderer: Box<dyn Renderer>) -> Self {
        Self {
            renderer,
            next_handle: 0,
            live: HashSet::new(),
            stats: SceneStats::default(),
        }
    }

    /// Scene backed by the no-op renderer
    pub fn headless() -> Self {
        Self::new(Box::new(NoopHost))
    }

    pub fn add(&mut self, object: RenderObject) -> RenderHandle {
        self.next_handle += 1;
        let handle = RenderHandle(self.next_handle);
        self.live.insert(handle);
        self.stats.added += 1;
        if let Err(e) = self.renderer.add(handle, object) {
            self.stats.failures += 1;
            tracing::warn!(?handle, error = %e, "renderer add failed");
        }
        handle
    }

    /// Remove and dispose a handle. Returns false if it was not live.
    pub fn remove(&mut self, handle: RenderHandle) -> bool {
        if !self.live.remove(&handle) {
            self.stats.stray_removals += 1;
            tracing::warn!(?handle, "removal of a handle that is not live");
            return false;
        }
        self.stats.removed += 1;
        if let Err(e) = self.renderer.remove(handle) {
            self.stats.failures += 1;
            tracing::warn!(?handle, error = %e, "renderer remove failed");
        }
        true
    }

    pub fn set_position(&mut self, handle: RenderHandle, position: Vec3) {
        if !self.live.contains(&handle) {
            return;
        }
        if let Err(e) = self.renderer.set_position(handle, position) {
            self.stats.failures += 1;
            tracing::warn!(?handle, error = %e, "renderer move failed");
        }
    }

    pub fn is_live(&self, handle: RenderHandle) -> bool {
        self.live.contains(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn stats(&self) -> SceneStats {
        self.stats
    }
}
