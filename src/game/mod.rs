//! Frame loop orchestration.
//!
//! `Game` owns every subsystem and the host collaborators, and advances them
//! in a fixed order each frame: player, world, enemies, audio, UI. Positions
//! are updated before anything that measures distance to them.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::constants::SHRINE_HEAL;
use crate::enemy::{EnemyController, EnemyEvent};
use crate::error::ConfigError;
use crate::host::{
    Action, ActionState, AudioCue, AudioSink, InputSource, NoopHost, NoticeKind, Notifier,
    Renderer, Scene,
};
use crate::player::{MovementInput, Player};
use crate::quests::{QuestLog, QuestUpdate, EXPLORE_WORLD, MASTER_COMBAT, SHRINE_VISITOR};
use crate::world::wind::Wind;
use crate::world::{Biome, PoiKind, PointOfInterest, WorldGenerator};

use crate::player::abilities::AbilityKind;

/// Seed offset of the combat roll stream
const COMBAT_RNG_SALT: u64 = 0x5EED_C0DE;

/// Actions that fire once per press rather than every held frame
const EDGE_ACTIONS: [Action; 2] = [Action::Interact, Action::Takedown];

/// Session counters, mostly for logs and tests
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub frames: u64,
    pub kills: u32,
    pub takedowns: u32,
    pub discoveries: u32,
    pub shrine_prayers: u32,
    pub player_deaths: u32,
    pub level_ups: u32,
    pub audio_failures: u32,
}

/// Result of pressing interact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Prayed,
    Bathed,
}

#[derive(Resource)]
pub struct Game {
    config: GameConfig,
    pub world: WorldGenerator,
    pub enemies: EnemyController,
    pub player: Player,
    pub quests: QuestLog,
    pub scene: Scene,
    audio: Box<dyn AudioSink>,
    notifier: Box<dyn Notifier>,
    rng: Xoshiro256PlusPlus,
    game_time: f64,
    wind: Wind,
    biome: Biome,
    prev_edges: [bool; EDGE_ACTIONS.len()],
    pub stats: GameStats,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("game_time", &self.game_time)
            .field("chunks", &self.world.loaded_count())
            .field("enemies", &self.enemies.count())
            .field("stats", &self.stats)
            .finish()
    }
}

impl Game {
    /// A game with no-op collaborators everywhere
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_host(config, Box::new(NoopHost), Box::new(NoopHost), Box::new(NoopHost))
    }

    pub fn with_host(
        config: GameConfig,
        renderer: Box<dyn Renderer>,
        audio: Box<dyn AudioSink>,
        notifier: Box<dyn Notifier>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble(config, renderer, audio, notifier))
    }

    fn assemble(
        config: GameConfig,
        renderer: Box<dyn Renderer>,
        audio: Box<dyn AudioSink>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let seed = u64::from(config.seed);
        let world = WorldGenerator::new(config.seed, config.world.clone());
        let enemies = EnemyController::new(config.enemies.clone(), seed);
        let player = Player::new();
        let biome = world.biome_at(f64::from(player.position.x), f64::from(player.position.z));
        tracing::info!(seed = config.seed, "game created");
        Self {
            world,
            enemies,
            player,
            quests: QuestLog::new(),
            scene: Scene::new(renderer),
            audio,
            notifier,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed ^ COMBAT_RNG_SALT),
            game_time: 0.0,
            wind: Wind::at(0.0),
            biome,
            prev_edges: [false; EDGE_ACTIONS.len()],
            stats: GameStats::default(),
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn game_time(&self) -> f64 {
        self.game_time
    }

    pub fn wind(&self) -> Wind {
        self.wind
    }

    /// Biome under the player as of the last update
    pub fn biome(&self) -> Biome {
        self.biome
    }

    /// Advance one frame. `dt` is clamped to `max_frame_delta`; a
    /// non-finite delta counts as zero.
    pub fn update(&mut self, dt: f32, input: &dyn InputSource) {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.config.max_frame_delta)
        } else {
            0.0
        };
        self.game_time += f64::from(dt);
        self.stats.frames += 1;
        let level_before = self.player.level;
        let deaths_before = self.player.deaths;

        let pressed = self.edge_presses(input);
        self.update_player(dt, input);
        // Resolved before the enemies look around this frame
        if pressed[1] {
            self.try_takedown();
        }
        self.update_world();
        if pressed[0] {
            self.interact();
        }
        self.update_enemies(dt);
        self.update_audio();

        let gained = self.player.level.saturating_sub(level_before);
        if gained > 0 {
            self.stats.level_ups += gained;
            self.play(AudioCue::LevelUp);
            self.notifier.notify(
                &format!("Level up! You are now level {}", self.player.level),
                NoticeKind::Success,
            );
        }
        let died = self.player.deaths.saturating_sub(deaths_before);
        if died > 0 {
            self.stats.player_deaths += died;
            self.notifier.notify("You have fallen...", NoticeKind::Warning);
        }
    }

    fn edge_presses(&mut self, input: &dyn InputSource) -> [bool; EDGE_ACTIONS.len()] {
        let mut pressed = [false; EDGE_ACTIONS.len()];
        for (i, action) in EDGE_ACTIONS.iter().enumerate() {
            let down = input.is_down(*action);
            pressed[i] = down && !self.prev_edges[i];
            self.prev_edges[i] = down;
        }
        pressed
    }

    fn update_player(&mut self, dt: f32, input: &dyn InputSource) {
        if input.is_down(Action::Attack) && self.player.attack(&mut self.rng).is_some() {
            self.play(AudioCue::Attack);
        }
        if input.is_down(Action::HeavyAttack) && self.player.heavy_attack().is_some() {
            self.play(AudioCue::Attack);
        }
        for (action, kind) in [
            (Action::WindStrike, AbilityKind::WindStrike),
            (Action::StealthMode, AbilityKind::StealthMode),
            (Action::Focus, AbilityKind::Focus),
        ] {
            if input.is_down(action) && self.player.activate(kind) {
                self.notifier
                    .notify(&format!("{} activated", kind.as_str()), NoticeKind::Info);
            }
        }

        let movement = MovementInput::from_input(input);
        let world = &self.world;
        let expired = self
            .player
            .update(dt, &movement, |x, z| world.get_height_at(x, z));
        for kind in expired {
            tracing::debug!(ability = kind.as_str(), "ability expired");
        }
    }

    fn update_world(&mut self) {
        let discovered = self.world.update(self.player.position, &mut self.scene);
        for poi in discovered {
            self.stats.discoveries += 1;
            self.notifier
                .notify(&format!("Discovered: {}", poi.kind().as_str()), NoticeKind::Info);
            self.advance_quest(EXPLORE_WORLD);
        }
    }

    fn update_enemies(&mut self, dt: f32) {
        self.enemies.update(dt, &mut self.player, &mut self.scene);
        self.handle_enemy_events();
    }

    fn handle_enemy_events(&mut self) {
        for event in self.enemies.drain_events() {
            match event {
                EnemyEvent::Hit { .. } | EnemyEvent::PlayerHit { .. } => self.play(AudioCue::Hit),
                EnemyEvent::Alerted { .. } => {
                    self.notifier.notify("An enemy spotted you!", NoticeKind::Warning);
                }
                EnemyEvent::Killed { xp, takedown, .. } => {
                    self.stats.kills += 1;
                    if takedown {
                        self.stats.takedowns += 1;
                    }
                    self.notifier.notify(&format!("+{xp} XP"), NoticeKind::Xp);
                    self.advance_quest(MASTER_COMBAT);
                }
                EnemyEvent::Spawned { .. } => {}
            }
        }
    }

    fn try_takedown(&mut self) {
        let range = self.enemies.config().combat_range;
        let Some(id) = self.enemies.takedown_target(self.player.position, range) else {
            return;
        };
        if self
            .enemies
            .stealth_takedown(id, &mut self.player, &mut self.scene)
        {
            self.notifier.notify("Stealth takedown!", NoticeKind::Success);
            self.handle_enemy_events();
        }
    }

    /// Use the nearest interactable point of interest in reach
    pub fn interact(&mut self) -> Option<Interaction> {
        let reach = self.config.world.interaction_radius;
        let kind = self
            .world
            .nearest_interactable(self.player.position.xz(), reach)
            .map(PointOfInterest::kind)?;

        match kind {
            PoiKind::Shrine => {
                self.player.heal(SHRINE_HEAL);
                self.stats.shrine_prayers += 1;
                self.notifier
                    .notify("You pray at the shrine and feel blessed...", NoticeKind::Success);
                self.advance_quest(SHRINE_VISITOR);
                Some(Interaction::Prayed)
            }
            PoiKind::HotSpring => {
                self.player.restore();
                self.notifier
                    .notify("The warm waters restore you completely!", NoticeKind::Success);
                Some(Interaction::Bathed)
            }
        }
    }

    fn advance_quest(&mut self, id: &str) {
        if let Some(update) = self.quests.advance(id, 1) {
            self.apply_quest_update(&update);
        }
    }

    fn apply_quest_update(&mut self, update: &QuestUpdate) {
        self.notifier
            .quest_progress(&update.id, update.progress, update.max_progress);
        if let Some(xp) = update.reward_xp {
            self.notifier
                .notify(&format!("Quest Complete: {}", update.title), NoticeKind::Success);
            self.notifier.notify(&format!("+{xp} XP"), NoticeKind::Xp);
            self.play(AudioCue::QuestComplete);
            self.player.gain_xp(xp);
        }
    }

    fn update_audio(&mut self) {
        self.wind = Wind::at(self.game_time);
        let p = self.player.position;
        self.biome = self.world.biome_at(f64::from(p.x), f64::from(p.z));
        let intensity = self.wind.audio_intensity(p.y);
        if let Err(err) = self.audio.set_ambience(intensity, self.biome) {
            self.stats.audio_failures += 1;
            tracing::warn!(%err, "ambience update failed");
        }
    }

    fn play(&mut self, cue: AudioCue) {
        if let Err(err) = self.audio.play(cue) {
            self.stats.audio_failures += 1;
            tracing::warn!(%err, ?cue, "audio cue failed");
        }
    }

    /// Re-seed the world and drop every enemy
    pub fn reseed(&mut self, seed: u32) {
        self.config.seed = seed;
        self.world.set_seed(seed, &mut self.scene);
        self.enemies.clear(&mut self.scene);
        tracing::info!(seed, "world re-seeded");
    }
}

/// Runs the core inside a bevy app
pub struct TsushimaPlugin {
    config: GameConfig,
}

impl TsushimaPlugin {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl Plugin for TsushimaPlugin {
    fn build(&self, app: &mut App) {
        let game = Game::assemble(
            self.config.clone(),
            Box::new(NoopHost),
            Box::new(NoopHost),
            Box::new(NoopHost),
        );
        app.insert_resource(game)
            .init_resource::<ActionState>()
            .add_systems(
                Update,
                (
                    keyboard_actions_system.run_if(resource_exists::<ButtonInput<KeyCode>>),
                    mouse_actions_system.run_if(resource_exists::<ButtonInput<MouseButton>>),
                    game_tick_system,
                )
                    .chain(),
            );
    }
}

const KEY_BINDINGS: [(KeyCode, Action); 11] = [
    (KeyCode::KeyW, Action::Forward),
    (KeyCode::KeyS, Action::Backward),
    (KeyCode::KeyA, Action::Left),
    (KeyCode::KeyD, Action::Right),
    (KeyCode::Space, Action::Jump),
    (KeyCode::ShiftLeft, Action::Sprint),
    (KeyCode::KeyR, Action::WindStrike),
    (KeyCode::KeyF, Action::StealthMode),
    (KeyCode::KeyC, Action::Focus),
    (KeyCode::KeyE, Action::Interact),
    (KeyCode::KeyG, Action::Takedown),
];

fn keyboard_actions_system(keys: Res<ButtonInput<KeyCode>>, mut actions: ResMut<ActionState>) {
    for (key, action) in KEY_BINDINGS {
        actions.set(action, keys.pressed(key));
    }
}

fn mouse_actions_system(buttons: Res<ButtonInput<MouseButton>>, mut actions: ResMut<ActionState>) {
    actions.set(Action::Attack, buttons.pressed(MouseButton::Left));
    actions.set(Action::HeavyAttack, buttons.pressed(MouseButton::Right));
}

fn game_tick_system(time: Res<Time>, actions: Res<ActionState>, mut game: ResMut<Game>) {
    game.update(time.delta_secs(), actions.as_ref());
}
