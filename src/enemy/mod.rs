//! Enemy population: spawning, per-enemy AI, damage and death.
//!
//! The controller exclusively owns every enemy and its render handle. Death
//! removes the enemy from the live set and disposes the handle in the same
//! call. Actions aimed at an enemy that is dead or gone are silent no-ops.

pub mod ai;

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::config::EnemyConfig;
use crate::constants::*;
use crate::host::{RenderHandle, RenderObject, Scene};
use crate::player::{DamageTaken, Player};

use ai::{planar_distance, AiContext, EnemyState};

/// Spacing of the staggered opening spawns
const INITIAL_SPAWN_SPACING: f32 = 2.0;

/// One enemy; doubles as an ECS component for hosts that mirror enemies
/// into their own bevy world
#[derive(Component, Debug, Clone)]
pub struct Enemy {
    pub id: u64,
    pub position: Vec3,
    pub health: f32,
    pub max_health: f32,
    pub damage: f32,
    pub speed: f32,
    pub state: EnemyState,
    /// 0 when unaware, 100 once the player has been spotted
    pub alert_level: f32,
    /// Last position the player was seen at
    pub last_seen: Option<Vec3>,
    /// Swing cooldown; doubles as the recovery timer while stunned
    pub attack_cooldown: f32,
    pub patrol_target: Vec3,
    /// Time spent at the current patrol target
    pub patrol_time: f32,
    pub detection_radius: f32,
    pub is_alerted: bool,
    /// Id of the last player swing that landed
    pub last_swing_hit: Option<u64>,
    /// Controller-clock expiry of the red hit flash
    pub hit_flash_until: Option<f64>,
    /// Controller-clock expiry of the alert marker
    pub alert_indicator_until: Option<f64>,
    handle: Option<RenderHandle>,
}

impl Enemy {
    pub fn new(id: u64, position: Vec3, detection_radius: f32) -> Self {
        Self {
            id,
            position,
            health: ENEMY_MAX_HEALTH,
            max_health: ENEMY_MAX_HEALTH,
            damage: ENEMY_DAMAGE,
            speed: ENEMY_SPEED,
            state: EnemyState::Patrol,
            alert_level: 0.0,
            last_seen: None,
            attack_cooldown: 0.0,
            patrol_target: position,
            patrol_time: 0.0,
            detection_radius,
            is_alerted: false,
            last_swing_hit: None,
            hit_flash_until: None,
            alert_indicator_until: None,
            handle: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state != EnemyState::Dead
    }

    pub fn render_handle(&self) -> Option<RenderHandle> {
        self.handle
    }

    pub fn is_flashing(&self) -> bool {
        self.hit_flash_until.is_some()
    }

    pub fn shows_alert(&self) -> bool {
        self.alert_indicator_until.is_some()
    }
}

/// Notable things that happened to enemies, drained once per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyEvent {
    Spawned { id: u64 },
    Alerted { id: u64 },
    /// An enemy took damage from the player
    Hit { id: u64, damage: f32 },
    /// The player took a blow
    PlayerHit { id: u64, damage: DamageTaken },
    Killed { id: u64, xp: u32, takedown: bool },
}

/// Outcome of `EnemyController::damage_enemy`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOutcome {
    pub remaining: f32,
    pub killed: bool,
}

/// Debug view of one enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    pub id: u64,
    pub state: EnemyState,
    pub health: f32,
    pub distance: f32,
}

#[derive(Debug)]
pub struct EnemyController {
    config: EnemyConfig,
    enemies: Vec<Enemy>,
    rng: Xoshiro256PlusPlus,
    next_id: u64,
    spawn_cooldown: f32,
    pending_initial: usize,
    initial_timer: f32,
    /// Seconds since creation; cosmetic expiries are stamped against it
    clock: f64,
    events: Vec<EnemyEvent>,
}

impl EnemyController {
    pub fn new(config: EnemyConfig, seed: u64) -> Self {
        let pending_initial = config.initial_enemies;
        Self {
            config,
            enemies: Vec::new(),
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            next_id: 0,
            spawn_cooldown: 0.0,
            pending_initial,
            initial_timer: 0.0,
            clock: 0.0,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &EnemyConfig {
        &self.config
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Advance spawning, every enemy's AI and the player's strikes
    pub fn update(&mut self, dt: f32, player: &mut Player, scene: &mut Scene) {
        self.clock += f64::from(dt);
        self.expire_cosmetics();
        self.run_spawn_policy(dt, player.position, scene);

        let ctx = AiContext {
            player_position: player.position,
            player_sprinting: player.is_sprinting,
            combat_range: self.config.combat_range,
            detection_range: self.config.detection_range,
        };
        for enemy in self.enemies.iter_mut() {
            let outcome = ai::step(enemy, dt, &ctx, &mut self.rng);
            if outcome.alerted {
                enemy.alert_indicator_until = Some(self.clock + ALERT_INDICATOR_SECS);
                self.events.push(EnemyEvent::Alerted { id: enemy.id });
            }
            if outcome.attacked {
                // The swing lands only if the player is still in reach
                if planar_distance(enemy.position, player.position) <= self.config.combat_range {
                    let damage = player.take_damage(enemy.damage);
                    self.events.push(EnemyEvent::PlayerHit {
                        id: enemy.id,
                        damage,
                    });
                }
            }
        }

        self.resolve_player_strike(player, scene);

        for enemy in &self.enemies {
            if let Some(handle) = enemy.handle {
                scene.set_position(handle, enemy.position);
            }
        }
    }

    fn expire_cosmetics(&mut self) {
        let now = self.clock;
        for enemy in self.enemies.iter_mut() {
            if enemy.hit_flash_until.is_some_and(|t| now >= t) {
                enemy.hit_flash_until = None;
            }
            if enemy.alert_indicator_until.is_some_and(|t| now >= t) {
                enemy.alert_indicator_until = None;
            }
        }
    }

    fn run_spawn_policy(&mut self, dt: f32, around: Vec3, scene: &mut Scene) {
        if self.pending_initial > 0 {
            self.initial_timer -= dt;
            if self.initial_timer <= 0.0 {
                self.pending_initial -= 1;
                self.initial_timer = INITIAL_SPAWN_SPACING;
                self.spawn_enemy(around, scene);
            }
        }

        self.spawn_cooldown -= dt;
        if self.spawn_cooldown <= 0.0 && self.enemies.len() < self.config.max_enemies {
            self.spawn_enemy(around, scene);
            self.spawn_cooldown =
                self.config.spawn_interval + self.rng.gen::<f32>() * self.config.spawn_jitter;
        }
    }

    /// Spawn at a random angle and distance band around a point.
    /// Returns false at the population cap.
    pub fn spawn_enemy(&mut self, around: Vec3, scene: &mut Scene) -> bool {
        if self.enemies.len() >= self.config.max_enemies {
            return false;
        }
        let (min, max) = (self.config.spawn_distance_min, self.config.spawn_distance_max);
        let distance = min + self.rng.gen::<f32>() * (max - min);
        let angle = self.rng.gen::<f32>() * std::f32::consts::TAU;
        let position = Vec3::new(
            around.x + angle.cos() * distance,
            ENEMY_SPAWN_HEIGHT,
            around.z + angle.sin() * distance,
        );
        self.spawn_enemy_at(position, scene).is_some()
    }

    /// Spawn at an exact position. Returns the new id, or None at the cap.
    pub fn spawn_enemy_at(&mut self, position: Vec3, scene: &mut Scene) -> Option<u64> {
        if self.enemies.len() >= self.config.max_enemies {
            return None;
        }
        self.next_id += 1;
        let id = self.next_id;
        let mut enemy = Enemy::new(id, position, self.config.detection_range);
        ai::new_patrol_target(&mut enemy, &mut self.rng);
        enemy.handle = Some(scene.add(RenderObject::Enemy { id, position }));

        self.enemies.push(enemy);
        self.events.push(EnemyEvent::Spawned { id });
        tracing::debug!(id, total = self.enemies.len(), "enemy spawned");
        Some(id)
    }

    /// Every living enemy within combat range takes the active swing once
    fn resolve_player_strike(&mut self, player: &mut Player, scene: &mut Scene) {
        let Some(swing) = player.combat.active_swing() else {
            return;
        };
        let range = self.config.combat_range;
        let struck: Vec<u64> = self
            .enemies
            .iter_mut()
            .filter(|e| e.is_alive() && e.last_swing_hit != Some(swing.id))
            .filter(|e| planar_distance(e.position, player.position) <= range)
            .map(|e| {
                e.last_swing_hit = Some(swing.id);
                e.id
            })
            .collect();

        for id in struck {
            let survived = self
                .damage_enemy(id, swing.damage as f32, player, scene)
                .is_some_and(|hit| !hit.killed);
            if survived {
                if let Some(enemy) = self.enemy_mut(id) {
                    enemy.state = EnemyState::Stunned;
                    enemy.attack_cooldown = STUN_DURATION;
                }
            }
        }
    }

    /// Subtract health; kills at zero. None if no such living enemy.
    pub fn damage_enemy(
        &mut self,
        id: u64,
        amount: f32,
        player: &mut Player,
        scene: &mut Scene,
    ) -> Option<HitOutcome> {
        let flash_until = self.clock + HIT_FLASH_SECS;
        let enemy = self.enemy_mut(id)?;
        enemy.health -= amount;
        enemy.hit_flash_until = Some(flash_until);
        let remaining = enemy.health;
        self.events.push(EnemyEvent::Hit { id, damage: amount });

        let killed = remaining <= 0.0;
        if killed {
            self.kill(id, player, scene, false);
        }
        Some(HitOutcome { remaining, killed })
    }

    /// Kill outright and award kill XP. False if no such living enemy.
    pub fn kill_enemy(&mut self, id: u64, player: &mut Player, scene: &mut Scene) -> bool {
        self.kill(id, player, scene, false)
    }

    fn kill(&mut self, id: u64, player: &mut Player, scene: &mut Scene, takedown: bool) -> bool {
        let Some(index) = self.enemies.iter().position(|e| e.id == id && e.is_alive()) else {
            return false;
        };
        let mut enemy = self.enemies.remove(index);
        enemy.state = EnemyState::Dead;
        if let Some(handle) = enemy.handle.take() {
            scene.remove(handle);
        }

        let mut xp = KILL_XP;
        if takedown {
            xp += TAKEDOWN_BONUS_XP;
        }
        player.gain_xp(xp);
        self.events.push(EnemyEvent::Killed { id, xp, takedown });
        tracing::info!(id, xp, takedown, "enemy defeated");
        true
    }

    /// Instant kill with bonus XP, refused once the enemy is engaged
    pub fn stealth_takedown(&mut self, id: u64, player: &mut Player, scene: &mut Scene) -> bool {
        let Some(enemy) = self.enemy(id) else {
            return false;
        };
        if enemy.state.is_engaged() {
            return false;
        }
        self.kill(id, player, scene, true)
    }

    /// Closest living, unengaged enemy within `range` of a position
    pub fn takedown_target(&self, position: Vec3, range: f32) -> Option<u64> {
        self.enemies
            .iter()
            .filter(|e| e.is_alive() && !e.state.is_engaged())
            .map(|e| (e.id, planar_distance(e.position, position)))
            .filter(|(_, d)| *d <= range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Remove every enemy without awarding XP
    pub fn clear(&mut self, scene: &mut Scene) {
        for mut enemy in self.enemies.drain(..) {
            if let Some(handle) = enemy.handle.take() {
                scene.remove(handle);
            }
        }
    }

    pub fn drain_events(&mut self) -> Vec<EnemyEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn enemy(&self, id: u64) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id && e.is_alive())
    }

    pub fn enemy_mut(&mut self, id: u64) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id && e.is_alive())
    }

    pub fn count(&self) -> usize {
        self.enemies.len()
    }

    pub fn enemies_in_range(&self, position: Vec3, range: f32) -> Vec<&Enemy> {
        self.enemies
            .iter()
            .filter(|e| e.is_alive() && planar_distance(e.position, position) <= range)
            .collect()
    }

    pub fn alerted_enemies(&self) -> Vec<&Enemy> {
        self.enemies
            .iter()
            .filter(|e| e.is_alive() && e.is_alerted)
            .collect()
    }

    /// Some enemy is chasing or attacking within detection range
    pub fn is_player_in_combat(&self, player_position: Vec3) -> bool {
        self.enemies.iter().any(|e| {
            e.state.is_engaged()
                && planar_distance(e.position, player_position) <= self.config.detection_range
        })
    }

    pub fn snapshot(&self, player_position: Vec3) -> Vec<EnemySnapshot> {
        self.enemies
            .iter()
            .map(|e| EnemySnapshot {
                id: e.id,
                state: e.state,
                health: e.health,
                distance: planar_distance(e.position, player_position),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> EnemyController {
        let config = EnemyConfig {
            initial_enemies: 0,
            ..Default::default()
        };
        let mut ctrl = EnemyController::new(config, 7);
        // Keep the interval spawner quiet unless a test wants it
        ctrl.spawn_cooldown = f32::MAX;
        ctrl
    }

    #[test]
    fn test_spawn_respects_cap() {
        let mut scene = Scene::headless();
        let mut ctrl = controller();
        for _ in 0..8 {
            assert!(ctrl.spawn_enemy(Vec3::ZERO, &mut scene));
        }
        assert!(!ctrl.spawn_enemy(Vec3::ZERO, &mut scene), "Cap reached");
        assert_eq!(ctrl.count(), 8);
        assert_eq!(scene.live_count(), 8);
    }

    #[test]
    fn test_spawn_distance_band() {
        let mut scene = Scene::headless();
        let mut ctrl = controller();
        let around = Vec3::new(100.0, 0.0, -40.0);
        for _ in 0..8 {
            ctrl.spawn_enemy(around, &mut scene);
        }
        for enemy in ctrl.enemies() {
            let d = planar_distance(enemy.position, around);
            assert!((30.0..=80.0).contains(&d), "Spawned {d} away");
            assert_eq!(enemy.state, EnemyState::Patrol);
        }
    }

    #[test]
    fn test_interval_spawning() {
        let mut scene = Scene::headless();
        let mut player = Player::new();
        let mut ctrl = controller();
        ctrl.spawn_cooldown = 0.0;
        ctrl.update(0.016, &mut player, &mut scene);
        assert_eq!(ctrl.count(), 1);
        assert!(ctrl.spawn_cooldown >= 10.0 && ctrl.spawn_cooldown <= 20.0);
    }

    #[test]
    fn test_initial_spawns_are_staggered() {
        let mut scene = Scene::headless();
        let mut player = Player::new();
        let mut ctrl = EnemyController::new(EnemyConfig::default(), 3);
        ctrl.update(0.05, &mut player, &mut scene);
        // One staggered spawn plus the first interval spawn
        assert_eq!(ctrl.count(), 2);
        for _ in 0..100 {
            ctrl.update(0.05, &mut player, &mut scene);
        }
        assert_eq!(ctrl.count(), 4);
    }

    #[test]
    fn test_damage_and_kill() {
        let mut scene = Scene::headless();
        let mut player = Player::new();
        let mut ctrl = controller();
        let id = ctrl.spawn_enemy_at(Vec3::new(50.0, 2.0, 0.0), &mut scene).unwrap();

        let hit = ctrl.damage_enemy(id, 20.0, &mut player, &mut scene).unwrap();
        assert_eq!(hit.remaining, 30.0);
        assert!(!hit.killed);
        assert!(ctrl.enemy(id).unwrap().is_flashing());

        let hit = ctrl.damage_enemy(id, 30.0, &mut player, &mut scene).unwrap();
        assert!(hit.killed);
        assert_eq!(ctrl.count(), 0);
        assert_eq!(scene.live_count(), 0, "Kill disposes the render handle");
        assert_eq!(player.xp, 25);

        assert!(ctrl.damage_enemy(id, 10.0, &mut player, &mut scene).is_none());
        assert!(!ctrl.kill_enemy(id, &mut player, &mut scene));
        assert_eq!(player.xp, 25, "Dead enemies award nothing");
        assert_eq!(scene.stats().stray_removals, 0);
    }

    #[test]
    fn test_hit_flash_expires() {
        let mut scene = Scene::headless();
        let mut player = Player::new();
        let mut ctrl = controller();
        let id = ctrl.spawn_enemy_at(Vec3::new(200.0, 2.0, 0.0), &mut scene).unwrap();
        ctrl.damage_enemy(id, 1.0, &mut player, &mut scene);
        ctrl.update(0.1, &mut player, &mut scene);
        assert!(ctrl.enemy(id).unwrap().is_flashing());
        ctrl.update(0.15, &mut player, &mut scene);
        assert!(!ctrl.enemy(id).unwrap().is_flashing());
    }

    #[test]
    fn test_takedown_only_when_unaware() {
        let mut scene = Scene::headless();
        let mut player = Player::new();
        let mut ctrl = controller();
        let calm = ctrl.spawn_enemy_at(Vec3::new(60.0, 2.0, 0.0), &mut scene).unwrap();
        let angry = ctrl.spawn_enemy_at(Vec3::new(-60.0, 2.0, 0.0), &mut scene).unwrap();
        ctrl.enemy_mut(angry).unwrap().state = EnemyState::Chase;

        assert!(!ctrl.stealth_takedown(angry, &mut player, &mut scene));
        assert!(ctrl.stealth_takedown(calm, &mut player, &mut scene));
        assert_eq!(player.xp, 75);
        assert!(ctrl.enemy(calm).is_none());
        assert!(!ctrl.stealth_takedown(calm, &mut player, &mut scene));
    }

    #[test]
    fn test_player_strike_lands_once_per_swing() {
        let mut scene = Scene::headless();
        let mut player = Player::new();
        let mut ctrl = controller();
        let id = ctrl.spawn_enemy_at(Vec3::new(3.0, 2.0, 0.0), &mut scene).unwrap();
        // Sturdy enough to survive one swing
        ctrl.enemy_mut(id).unwrap().health = 500.0;
        player.position = Vec3::new(0.0, 1.0, 0.0);

        let swing = player.attack_with_roll(0.99).unwrap();
        ctrl.update(0.016, &mut player, &mut scene);
        ctrl.update(0.016, &mut player, &mut scene);
        let enemy = ctrl.enemy(id).unwrap();
        assert_eq!(enemy.health, 500.0 - swing.damage as f32);
        assert_eq!(enemy.state, EnemyState::Stunned);
        assert_eq!(enemy.last_swing_hit, Some(swing.id));
    }

    #[test]
    fn test_queries() {
        let mut scene = Scene::headless();
        let mut ctrl = controller();
        let near = ctrl.spawn_enemy_at(Vec3::new(4.0, 2.0, 0.0), &mut scene).unwrap();
        ctrl.spawn_enemy_at(Vec3::new(40.0, 2.0, 0.0), &mut scene);
        assert_eq!(ctrl.enemies_in_range(Vec3::ZERO, 10.0).len(), 1);
        assert!(!ctrl.is_player_in_combat(Vec3::ZERO));
        {
            let enemy = ctrl.enemy_mut(near).unwrap();
            enemy.state = EnemyState::Attack;
            enemy.is_alerted = true;
        }
        assert!(ctrl.is_player_in_combat(Vec3::ZERO));
        assert_eq!(ctrl.alerted_enemies().len(), 1);
        assert_eq!(ctrl.takedown_target(Vec3::ZERO, 50.0).map(|id| id != near), Some(true));
        let snap = ctrl.snapshot(Vec3::ZERO);
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].state, EnemyState::Attack);
    }

    #[test]
    fn test_clear_disposes_all() {
        let mut scene = Scene::headless();
        let mut ctrl = controller();
        for _ in 0..5 {
            ctrl.spawn_enemy(Vec3::ZERO, &mut scene);
        }
        ctrl.clear(&mut scene);
        assert_eq!(ctrl.count(), 0);
        assert_eq!(scene.live_count(), 0);
    }

    #[test]
    fn test_enemy_mirrors_into_ecs_world() {
        let mut world = World::new();
        let enemy = Enemy::new(7, Vec3::new(1.0, 2.0, 3.0), 15.0);
        world.spawn((enemy.clone(), enemy.state));
        let mut query = world.query::<(&Enemy, &EnemyState)>();
        let (mirrored, state) = query.single(&world);
        assert_eq!(mirrored.id, 7);
        assert_eq!(*state, EnemyState::Patrol);
    }
}
