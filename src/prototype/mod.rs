//! Top-down 2D variant: a smoothing camera and a wanderer that walks the
//! generated tiles, either steered by hand or by a water-avoiding autopilot.
//!
//! Plane coordinates are `(x, y)` here and map onto the world's `(x, z)`.

use bevy::prelude::*;
use rand::Rng;

use crate::host::{Action, InputSource, Scene};
use crate::world::WorldGenerator;

/// Walking speed in world units per second
pub const WALKER_SPEED: f32 = 90.0;

/// A wander target closer than this is considered reached
pub const TARGET_REACHED: f32 = 8.0;

/// Distance band of freshly rolled wander targets
pub const WANDER_DISTANCE: (f32, f32) = (200.0, 600.0);

/// Exponential-smoothing follow camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2d {
    pub position: Vec2,
    /// Fraction of the remaining gap closed per follow call
    pub lerp_factor: f32,
}

impl Default for Camera2d {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            lerp_factor: 0.15,
        }
    }
}

impl Camera2d {
    pub fn follow(&mut self, target: Vec2) {
        self.position += (target - self.position) * self.lerp_factor;
    }

    /// World to screen offset from the viewport centre
    pub fn to_screen(&self, world: Vec2, pixel_scale: f32) -> Vec2 {
        ((world - self.position) * pixel_scale).floor()
    }
}

/// The 2D walker
#[derive(Debug, Clone, PartialEq)]
pub struct Walker {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Sprite facing: 1 right, -1 left
    pub dir: i8,
    pub autopilot: bool,
    target: Option<Vec2>,
}

impl Default for Walker {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl Walker {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            dir: 1,
            autopilot: true,
            target: None,
        }
    }

    pub fn target(&self) -> Option<Vec2> {
        self.target
    }

    /// Held direction keys as a plane vector (y grows downward on screen)
    pub fn manual_direction(input: &dyn InputSource) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if input.is_down(Action::Left) {
            dir.x -= 1.0;
        }
        if input.is_down(Action::Right) {
            dir.x += 1.0;
        }
        if input.is_down(Action::Forward) {
            dir.y -= 1.0;
        }
        if input.is_down(Action::Backward) {
            dir.y += 1.0;
        }
        dir
    }

    /// Autopilot steering for this frame: head for the wander target, and
    /// turn perpendicular when the next step would land on water.
    pub fn autopilot_direction(
        &mut self,
        dt: f32,
        world: &mut WorldGenerator,
        scene: &mut Scene,
        rng: &mut impl Rng,
    ) -> Vec2 {
        let position = self.position;
        let target = match self.target {
            Some(t) if t.distance(position) >= TARGET_REACHED => t,
            _ => {
                let angle = rng.gen::<f32>() * std::f32::consts::TAU;
                let (min, max) = WANDER_DISTANCE;
                let distance = min + rng.gen::<f32>() * (max - min);
                let t = position + Vec2::from_angle(angle) * distance;
                self.target = Some(t);
                t
            }
        };

        let heading = (target - position).normalize_or(Vec2::X);
        let next = position + heading * WALKER_SPEED * dt;
        if world.is_water_at(next.x, next.y, scene) {
            Vec2::new(-heading.y, heading.x)
        } else {
            heading
        }
    }

    /// Move one frame along `direction` at walking speed
    pub fn step(&mut self, dt: f32, direction: Vec2) {
        let direction = direction.normalize_or_zero();
        if direction != Vec2::ZERO {
            self.dir = if direction.x >= 0.0 { 1 } else { -1 };
        }
        self.velocity = direction * WALKER_SPEED;
        self.position += self.velocity * dt;
    }

    pub fn update(
        &mut self,
        dt: f32,
        input: &dyn InputSource,
        world: &mut WorldGenerator,
        scene: &mut Scene,
        rng: &mut impl Rng,
    ) {
        let direction = if self.autopilot {
            self.autopilot_direction(dt, world, scene, rng)
        } else {
            Self::manual_direction(input)
        };
        self.step(dt, direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::host::{ActionState, NoopHost};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_camera_smoothing() {
        let mut camera = Camera2d::default();
        camera.follow(Vec2::new(100.0, 0.0));
        assert!((camera.position.x - 15.0).abs() < 1e-4);
        for _ in 0..200 {
            camera.follow(Vec2::new(100.0, 0.0));
        }
        assert!((camera.position.x - 100.0).abs() < 1e-3, "Camera converges");
    }

    #[test]
    fn test_manual_walk_normalises_diagonals() {
        let mut walker = Walker::new(Vec2::ZERO);
        walker.autopilot = false;
        let mut input = ActionState::default();
        input.press(Action::Left);
        input.press(Action::Forward);
        walker.step(1.0, Walker::manual_direction(&input));
        assert!((walker.position.length() - WALKER_SPEED).abs() < 1e-3);
        assert_eq!(walker.dir, -1);
    }

    #[test]
    fn test_idle_keeps_facing() {
        let mut walker = Walker::new(Vec2::ZERO);
        walker.dir = -1;
        walker.step(0.1, Walker::manual_direction(&NoopHost));
        assert_eq!(walker.dir, -1);
        assert_eq!(walker.position, Vec2::ZERO);
    }

    #[test]
    fn test_autopilot_keeps_off_water_and_retargets() {
        let mut world = WorldGenerator::new(1337, WorldConfig::prototype());
        let mut scene = Scene::headless();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
        let mut walker = Walker::new(Vec2::ZERO);

        walker.update(0.05, &NoopHost, &mut world, &mut scene, &mut rng);
        let first = walker.target().unwrap();
        let d = first.distance(Vec2::ZERO);
        assert!((200.0..=600.0).contains(&d), "Wander target {d} away");
        assert!((walker.velocity.length() - WALKER_SPEED).abs() < 1e-3);

        walker.position = first + Vec2::new(1.0, 0.0);
        walker.update(0.05, &NoopHost, &mut world, &mut scene, &mut rng);
        assert_ne!(walker.target(), Some(first), "Reached target is replaced");
    }
}
