//! Enemy AI behavior.
//!
//! One step per frame: run the current state's behavior, then re-evaluate
//! detection (skipped while stunned or dead), then count the attack
//! cooldown down. Distances are measured on the ground plane; there is no
//! line-of-sight test.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Enemy;
use crate::constants::*;

#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    #[default]
    Patrol,
    Chase,
    Attack,
    /// Recovering from a player strike; `attack_cooldown` is the recovery timer
    Stunned,
    /// Terminal
    Dead,
}

impl EnemyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patrol => "patrol",
            Self::Chase => "chase",
            Self::Attack => "attack",
            Self::Stunned => "stunned",
            Self::Dead => "dead",
        }
    }

    /// Engaged enemies cannot be taken down
    pub fn is_engaged(&self) -> bool {
        matches!(self, Self::Chase | Self::Attack)
    }
}

/// What an enemy sees of the world this frame
#[derive(Debug, Clone, Copy)]
pub struct AiContext {
    pub player_position: Vec3,
    pub player_sprinting: bool,
    pub combat_range: f32,
    pub detection_range: f32,
}

/// Side effects of one step, applied by the controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// First detection of the player since the last reset
    pub alerted: bool,
    /// Swung at a player in range
    pub attacked: bool,
}

pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    a.xz().distance(b.xz())
}

fn move_toward(enemy: &mut Enemy, target: Vec3, distance: f32) {
    let direction = (target.xz() - enemy.position.xz()).normalize_or_zero();
    enemy.position.x += direction.x * distance;
    enemy.position.z += direction.y * distance;
}

/// Roll a new patrol target inside a square around the current position
pub fn new_patrol_target(enemy: &mut Enemy, rng: &mut impl Rng) {
    let dx = (rng.gen::<f32>() - 0.5) * PATROL_RANGE;
    let dz = (rng.gen::<f32>() - 0.5) * PATROL_RANGE;
    enemy.patrol_target = enemy.position + Vec3::new(dx, 0.0, dz);
    enemy.patrol_time = 0.0;
}

/// Advance one enemy by `dt`. Dead enemies are left untouched.
pub fn step(enemy: &mut Enemy, dt: f32, ctx: &AiContext, rng: &mut impl Rng) -> StepOutcome {
    let mut outcome = StepOutcome::default();
    // The stun timer shares `attack_cooldown` and is counted down once, by `stunned`
    let was_stunned = enemy.state == EnemyState::Stunned;

    match enemy.state {
        EnemyState::Dead => return outcome,
        EnemyState::Patrol => patrol(enemy, dt, rng),
        EnemyState::Chase => chase(enemy, dt, ctx, rng),
        EnemyState::Attack => outcome.attacked = attack(enemy, ctx),
        EnemyState::Stunned => stunned(enemy, dt),
    }

    outcome.alerted = detect(enemy, ctx);

    if !was_stunned && enemy.attack_cooldown > 0.0 {
        enemy.attack_cooldown -= dt;
    }
    outcome
}

fn patrol(enemy: &mut Enemy, dt: f32, rng: &mut impl Rng) {
    let target = enemy.patrol_target;
    move_toward(enemy, target, enemy.speed * PATROL_SPEED_FACTOR * dt);

    if planar_distance(enemy.position, target) < PATROL_ARRIVAL {
        enemy.patrol_time += dt;
        if enemy.patrol_time > PATROL_DWELL {
            new_patrol_target(enemy, rng);
        }
    }
}

fn chase(enemy: &mut Enemy, dt: f32, ctx: &AiContext, rng: &mut impl Rng) {
    move_toward(enemy, ctx.player_position, enemy.speed * dt);

    let distance = planar_distance(enemy.position, ctx.player_position);
    if distance <= ctx.combat_range {
        enemy.state = EnemyState::Attack;
        enemy.attack_cooldown = ATTACK_WINDUP;
        tracing::debug!(id = enemy.id, "chase -> attack");
    } else if distance > ctx.detection_range * LOSE_TARGET_MULT {
        enemy.state = EnemyState::Patrol;
        enemy.is_alerted = false;
        enemy.alert_level = 0.0;
        enemy.last_seen = None;
        new_patrol_target(enemy, rng);
        tracing::debug!(id = enemy.id, "lost the player, back to patrol");
    }
}

/// Returns true when the enemy swings this frame
fn attack(enemy: &mut Enemy, ctx: &AiContext) -> bool {
    let distance = planar_distance(enemy.position, ctx.player_position);
    let mut swung = false;

    if enemy.attack_cooldown <= 0.0 && distance <= ctx.combat_range {
        enemy.attack_cooldown = ENEMY_ATTACK_INTERVAL;
        swung = true;
    }

    if distance > ctx.combat_range * ATTACK_LEASH_MULT {
        enemy.state = EnemyState::Chase;
        tracing::debug!(id = enemy.id, "attack -> chase");
    }
    swung
}

fn stunned(enemy: &mut Enemy, dt: f32) {
    enemy.attack_cooldown -= dt;
    if enemy.attack_cooldown <= 0.0 {
        enemy.state = EnemyState::Chase;
    }
}

/// Range check against the player. Returns true on first detection.
fn detect(enemy: &mut Enemy, ctx: &AiContext) -> bool {
    if matches!(enemy.state, EnemyState::Stunned | EnemyState::Dead) {
        return false;
    }
    let mut range = enemy.detection_radius;
    if ctx.player_sprinting {
        range *= SPRINT_DETECTION_MULT;
    }
    if planar_distance(enemy.position, ctx.player_position) > range {
        return false;
    }

    let first = !enemy.is_alerted;
    if first {
        enemy.is_alerted = true;
        enemy.alert_level = 100.0;
        enemy.state = EnemyState::Chase;
        tracing::debug!(id = enemy.id, "player detected");
    }
    enemy.last_seen = Some(ctx.player_position);
    first
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn ctx(player: Vec3) -> AiContext {
        AiContext {
            player_position: player,
            player_sprinting: false,
            combat_range: 5.0,
            detection_range: 15.0,
        }
    }

    fn enemy_at(x: f32, z: f32) -> Enemy {
        Enemy::new(1, Vec3::new(x, 2.0, z), 15.0)
    }

    #[test]
    fn test_detection_starts_chase() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut enemy = enemy_at(10.0, 0.0);
        let out = step(&mut enemy, 0.016, &ctx(Vec3::ZERO), &mut rng);
        assert!(out.alerted);
        assert_eq!(enemy.state, EnemyState::Chase);
        assert!(enemy.last_seen.is_some());

        let again = step(&mut enemy, 0.016, &ctx(Vec3::ZERO), &mut rng);
        assert!(!again.alerted, "Alert is one-shot");
    }

    #[test]
    fn test_sprint_widens_detection() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        let mut enemy = enemy_at(20.0, 0.0);
        enemy.patrol_target = enemy.position;
        step(&mut enemy, 0.016, &ctx(Vec3::ZERO), &mut rng);
        assert_eq!(enemy.state, EnemyState::Patrol);

        let mut sprinting = ctx(Vec3::ZERO);
        sprinting.player_sprinting = true;
        step(&mut enemy, 0.016, &sprinting, &mut rng);
        assert_eq!(enemy.state, EnemyState::Chase, "22.5 range while sprinting");
    }

    #[test]
    fn test_chase_to_attack_sets_windup() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let mut enemy = enemy_at(5.1, 0.0);
        enemy.state = EnemyState::Chase;
        enemy.is_alerted = true;
        step(&mut enemy, 0.05, &ctx(Vec3::ZERO), &mut rng);
        assert_eq!(enemy.state, EnemyState::Attack);
        assert!((enemy.attack_cooldown - (ATTACK_WINDUP - 0.05)).abs() < 1e-6);
    }

    #[test]
    fn test_chase_gives_up_far_away() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4);
        let mut enemy = enemy_at(100.0, 0.0);
        enemy.state = EnemyState::Chase;
        enemy.is_alerted = true;
        step(&mut enemy, 0.05, &ctx(Vec3::ZERO), &mut rng);
        assert_eq!(enemy.state, EnemyState::Patrol);
        assert!(!enemy.is_alerted);
        assert!(enemy.last_seen.is_none());
    }

    #[test]
    fn test_attack_interval_and_leash() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let mut enemy = enemy_at(3.0, 0.0);
        enemy.state = EnemyState::Attack;
        enemy.is_alerted = true;
        let swings = (0..40)
            .filter(|_| step(&mut enemy, 0.05, &ctx(Vec3::ZERO), &mut rng).attacked)
            .count();
        // 2 s of combat at one swing per 1.5 s, first one immediately
        assert_eq!(swings, 2);

        // Between 1x and 1.5x combat range: stays in attack but cannot swing
        let out = step(&mut enemy, 0.05, &ctx(Vec3::new(-4.0, 0.0, 0.0)), &mut rng);
        assert!(!out.attacked);
        assert_eq!(enemy.state, EnemyState::Attack);

        step(&mut enemy, 0.05, &ctx(Vec3::new(-10.0, 0.0, 0.0)), &mut rng);
        assert_eq!(enemy.state, EnemyState::Chase);
    }

    #[test]
    fn test_stunned_recovers_into_chase_and_ignores_detection() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(6);
        let mut enemy = enemy_at(2.0, 0.0);
        enemy.state = EnemyState::Stunned;
        enemy.attack_cooldown = STUN_DURATION;
        let out = step(&mut enemy, 0.5, &ctx(Vec3::ZERO), &mut rng);
        assert!(!out.alerted);
        assert!(!enemy.is_alerted);
        assert_eq!(enemy.state, EnemyState::Stunned);
        step(&mut enemy, 0.5, &ctx(Vec3::ZERO), &mut rng);
        assert_eq!(enemy.state, EnemyState::Chase);
    }

    #[test]
    fn test_patrol_dwells_then_retargets() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let mut enemy = enemy_at(500.0, 500.0);
        enemy.patrol_target = enemy.position + Vec3::new(1.0, 0.0, 0.0);
        let first_target = enemy.patrol_target;
        for _ in 0..41 {
            step(&mut enemy, 0.05, &ctx(Vec3::ZERO), &mut rng);
        }
        assert_ne!(enemy.patrol_target, first_target);
        assert!(planar_distance(enemy.patrol_target, enemy.position) <= PATROL_RANGE);
    }

    #[test]
    fn test_dead_is_inert() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(8);
        let mut enemy = enemy_at(1.0, 0.0);
        enemy.state = EnemyState::Dead;
        let before = enemy.position;
        let out = step(&mut enemy, 0.05, &ctx(Vec3::ZERO), &mut rng);
        assert_eq!(out, StepOutcome::default());
        assert_eq!(enemy.position, before);
        assert_eq!(enemy.state, EnemyState::Dead);
    }
}
