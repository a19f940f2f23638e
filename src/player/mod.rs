//! The player: a session singleton mutated by input, combat and enemy AI.
//!
//! Death never destroys the player; `respawn` resets it in place.

pub mod abilities;
pub mod combat;

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::host::{Action, InputSource};

use abilities::{AbilityKind, AbilitySet};
use combat::{AttackStats, CombatState, Swing};

pub const SPAWN_POSITION: Vec3 = Vec3::new(0.0, 2.0, 0.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkillKind {
    SwordMastery,
    Stealth,
    WindControl,
    Meditation,
    Archery,
    Resilience,
}

impl SkillKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SwordMastery => "sword_mastery",
            Self::Stealth => "stealth",
            Self::WindControl => "wind_control",
            Self::Meditation => "meditation",
            Self::Archery => "archery",
            Self::Resilience => "resilience",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub level: u32,
    pub max_level: u32,
    /// Skill points per upgrade
    pub cost: u32,
}

impl Skill {
    const fn new(level: u32, max_level: u32, cost: u32) -> Self {
        Self {
            level,
            max_level,
            cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    pub sword_mastery: Skill,
    pub stealth: Skill,
    pub wind_control: Skill,
    pub meditation: Skill,
    pub archery: Skill,
    pub resilience: Skill,
}

impl Default for Skills {
    fn default() -> Self {
        Self {
            sword_mastery: Skill::new(1, 10, 1),
            stealth: Skill::new(1, 10, 1),
            wind_control: Skill::new(0, 5, 2),
            meditation: Skill::new(0, 8, 1),
            archery: Skill::new(0, 10, 1),
            resilience: Skill::new(1, 10, 1),
        }
    }
}

impl Skills {
    pub fn get(&self, kind: SkillKind) -> &Skill {
        match kind {
            SkillKind::SwordMastery => &self.sword_mastery,
            SkillKind::Stealth => &self.stealth,
            SkillKind::WindControl => &self.wind_control,
            SkillKind::Meditation => &self.meditation,
            SkillKind::Archery => &self.archery,
            SkillKind::Resilience => &self.resilience,
        }
    }

    fn get_mut(&mut self, kind: SkillKind) -> &mut Skill {
        match kind {
            SkillKind::SwordMastery => &mut self.sword_mastery,
            SkillKind::Stealth => &mut self.stealth,
            SkillKind::WindControl => &mut self.wind_control,
            SkillKind::Meditation => &mut self.meditation,
            SkillKind::Archery => &mut self.archery,
            SkillKind::Resilience => &mut self.resilience,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub damage: f32,
    pub crit_bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Armor {
    pub name: String,
    pub defense: f32,
    /// Fraction; x100 when added to the stealth level
    pub stealth_bonus: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accessory {
    pub name: String,
    pub crit_bonus: f64,
    pub stealth_bonus: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub weapon: Weapon,
    pub armor: Armor,
    pub accessory: Option<Accessory>,
}

impl Default for Equipment {
    fn default() -> Self {
        Self {
            weapon: Weapon {
                name: "Iron Katana".into(),
                damage: 25.0,
                crit_bonus: 0.05,
            },
            armor: Armor {
                name: "Simple Kimono".into(),
                defense: 5.0,
                stealth_bonus: 0.1,
            },
            accessory: None,
        }
    }
}

/// Held movement actions for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub sprint: bool,
}

impl MovementInput {
    pub fn from_input(input: &dyn InputSource) -> Self {
        Self {
            forward: input.is_down(Action::Forward),
            backward: input.is_down(Action::Backward),
            left: input.is_down(Action::Left),
            right: input.is_down(Action::Right),
            jump: input.is_down(Action::Jump),
            sprint: input.is_down(Action::Sprint),
        }
    }
}

/// Result of `Player::take_damage`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageTaken {
    /// Health actually removed, after armor
    pub applied: f32,
    /// The hit was lethal and the player respawned
    pub died: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Unit look direction on the (x, z) plane
    pub facing: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub stamina: f32,
    pub max_stamina: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub skill_points: u32,
    pub skills: Skills,
    pub equipment: Equipment,
    pub abilities: AbilitySet,
    pub combat: CombatState,
    /// Derived from sword mastery and level
    pub attack_damage: f32,
    /// Derived from sword mastery; excludes equipment
    pub crit_chance: f64,
    pub is_grounded: bool,
    pub is_moving: bool,
    pub is_sprinting: bool,
    pub is_in_stealth: bool,
    pub deaths: u32,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        let mut player = Self {
            position: SPAWN_POSITION,
            velocity: Vec3::ZERO,
            facing: Vec2::NEG_Y,
            health: BASE_MAX_HEALTH,
            max_health: BASE_MAX_HEALTH,
            stamina: BASE_MAX_STAMINA,
            max_stamina: BASE_MAX_STAMINA,
            level: 1,
            xp: 0,
            xp_to_next: BASE_XP_TO_NEXT,
            skill_points: 0,
            skills: Skills::default(),
            equipment: Equipment::default(),
            abilities: AbilitySet::default(),
            combat: CombatState::default(),
            attack_damage: BASE_ATTACK_DAMAGE,
            crit_chance: BASE_CRIT_CHANCE,
            is_grounded: true,
            is_moving: false,
            is_sprinting: false,
            is_in_stealth: false,
            deaths: 0,
        };
        player.recompute_stats();
        player
    }

    /// Re-derive every stat that depends on skills and level
    pub fn recompute_stats(&mut self) {
        let sword = self.skills.sword_mastery.level.saturating_sub(1) as f32;
        let resilience = self.skills.resilience.level.saturating_sub(1) as f32;
        let levels = self.level.saturating_sub(1) as f32;

        self.attack_damage = BASE_ATTACK_DAMAGE + sword * 5.0 + levels * ATTACK_PER_LEVEL;
        self.crit_chance = BASE_CRIT_CHANCE + sword as f64 * 0.02;
        self.max_health = BASE_MAX_HEALTH + resilience * 15.0 + levels * HEALTH_PER_LEVEL;
        self.max_stamina = BASE_MAX_STAMINA + resilience * 10.0 + levels * STAMINA_PER_LEVEL;
        self.health = self.health.min(self.max_health);
        self.stamina = self.stamina.min(self.max_stamina);

        if self.skills.wind_control.level >= 3 {
            self.abilities.wind_strike.unlocked = true;
        }
    }

    /// Spend skill points on one level of a skill
    pub fn upgrade_skill(&mut self, kind: SkillKind) -> bool {
        let skill = self.skills.get(kind);
        if skill.level >= skill.max_level || self.skill_points < skill.cost {
            return false;
        }
        self.skill_points -= skill.cost;
        self.skills.get_mut(kind).level += 1;
        self.recompute_stats();
        tracing::info!(
            skill = kind.as_str(),
            level = self.skills.get(kind).level,
            "skill upgraded"
        );
        true
    }

    pub fn total_crit_chance(&self) -> f64 {
        let accessory = self.equipment.accessory.as_ref().map_or(0.0, |a| a.crit_bonus);
        self.crit_chance + self.equipment.weapon.crit_bonus + accessory
    }

    pub fn attack_stats(&self) -> AttackStats {
        AttackStats {
            base_damage: f64::from(self.attack_damage) + f64::from(self.equipment.weapon.damage),
            crit_chance: self.total_crit_chance(),
            sword_level: self.skills.sword_mastery.level,
        }
    }

    /// Light attack with an explicit crit roll in [0, 1)
    pub fn attack_with_roll(&mut self, roll: f64) -> Option<Swing> {
        let stats = self.attack_stats();
        let swing = self.combat.light_attack(&stats, roll)?;
        tracing::debug!(
            combo = swing.combo,
            damage = swing.damage,
            critical = swing.critical,
            "attack"
        );
        Some(swing)
    }

    pub fn attack(&mut self, rng: &mut impl Rng) -> Option<Swing> {
        let roll = rng.gen::<f64>();
        self.attack_with_roll(roll)
    }

    pub fn heavy_attack(&mut self) -> Option<Swing> {
        let stats = self.attack_stats();
        let swing = self.combat.heavy_attack(&stats, &mut self.stamina)?;
        tracing::debug!(damage = swing.damage, "heavy attack");
        Some(swing)
    }

    pub fn is_attacking(&self) -> bool {
        self.combat.is_attacking()
    }

    pub fn use_wind_strike(&mut self) -> bool {
        self.abilities.wind_strike.activate(0.0)
    }

    /// Stealth lasts 5 s plus one second per stealth skill level
    pub fn toggle_stealth_mode(&mut self) -> bool {
        let duration = self.abilities.stealth_mode.max_duration + self.skills.stealth.level as f32;
        if !self.abilities.stealth_mode.activate(duration) {
            return false;
        }
        self.is_in_stealth = true;
        true
    }

    pub fn activate_focus(&mut self) -> bool {
        let duration = self.abilities.focus.max_duration;
        self.abilities.focus.activate(duration)
    }

    pub fn activate(&mut self, kind: AbilityKind) -> bool {
        let activated = match kind {
            AbilityKind::WindStrike => self.use_wind_strike(),
            AbilityKind::StealthMode => self.toggle_stealth_mode(),
            AbilityKind::Focus => self.activate_focus(),
        };
        if activated {
            tracing::debug!(ability = kind.as_str(), "ability activated");
        }
        activated
    }

    /// Apply incoming damage after armor (at least 1). A lethal hit respawns.
    pub fn take_damage(&mut self, amount: f32) -> DamageTaken {
        let applied = (amount - self.equipment.armor.defense).max(1.0);
        self.health = (self.health - applied).max(0.0);
        let died = self.health <= 0.0;
        if died {
            tracing::info!(deaths = self.deaths + 1, "player died");
            self.deaths += 1;
            self.respawn();
        }
        DamageTaken { applied, died }
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Full health and stamina
    pub fn restore(&mut self) {
        self.health = self.max_health;
        self.stamina = self.max_stamina;
    }

    /// Add XP, levelling up as many times as it covers. Returns levels gained.
    pub fn gain_xp(&mut self, amount: u32) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        let mut gained = 0;
        while self.xp >= self.xp_to_next {
            self.level_up();
            gained += 1;
        }
        gained
    }

    fn level_up(&mut self) {
        self.xp -= self.xp_to_next;
        self.level += 1;
        self.xp_to_next = ((self.xp_to_next as f64) * XP_GROWTH).floor().max(1.0) as u32;
        self.skill_points += SKILL_POINTS_PER_LEVEL;
        self.recompute_stats();
        self.restore();
        tracing::info!(level = self.level, skill_points = self.skill_points, "level up");
    }

    /// In-place reset after death
    pub fn respawn(&mut self) {
        self.health = (self.max_health * RESPAWN_HEALTH_FRACTION).floor();
        self.stamina = self.max_stamina;
        self.position = SPAWN_POSITION;
        self.velocity = Vec3::ZERO;
        self.is_grounded = true;
        self.abilities.reset_all();
        self.combat.reset();
        self.is_in_stealth = false;
    }

    /// Stealth level in [0, 100]; recomputed on every call
    pub fn stealth_level(&self) -> f32 {
        let mut stealth = self.skills.stealth.level as f32 * STEALTH_PER_SKILL_LEVEL;
        stealth += self.equipment.armor.stealth_bonus * 100.0;
        if let Some(accessory) = &self.equipment.accessory {
            stealth += accessory.stealth_bonus * 100.0;
        }
        if self.is_in_stealth {
            stealth += STEALTH_MODE_BONUS;
        }
        if self.is_moving {
            stealth -= if self.is_sprinting {
                SPRINT_STEALTH_PENALTY
            } else {
                WALK_STEALTH_PENALTY
            };
        }
        stealth.clamp(0.0, 100.0)
    }

    /// Walking speed before sprint and stealth modifiers
    pub fn base_speed(&self) -> f32 {
        MOVE_SPEED + self.level.saturating_sub(1) as f32 * MOVE_SPEED_PER_LEVEL
    }

    /// Advance one frame. `ground_at` gives terrain elevation at (x, z).
    ///
    /// Returns the abilities whose duration ran out this frame.
    pub fn update(
        &mut self,
        dt: f32,
        input: &MovementInput,
        ground_at: impl Fn(f32, f32) -> f32,
    ) -> Vec<AbilityKind> {
        self.combat.tick(dt);
        self.update_movement(dt, input);
        self.update_physics(dt, ground_at);

        let expired = self.abilities.tick(dt);
        if expired.contains(&AbilityKind::StealthMode) {
            self.is_in_stealth = false;
        }
        expired
    }

    fn update_movement(&mut self, dt: f32, input: &MovementInput) {
        let forward = self.facing.normalize_or(Vec2::NEG_Y);
        let right = Vec2::new(-forward.y, forward.x);

        let mut direction = Vec2::ZERO;
        if input.forward {
            direction += forward;
        }
        if input.backward {
            direction -= forward;
        }
        if input.right {
            direction += right;
        }
        if input.left {
            direction -= right;
        }
        let direction = direction.normalize_or_zero();
        self.is_moving = direction != Vec2::ZERO;

        let mut speed = self.base_speed();
        self.is_sprinting = input.sprint && self.is_moving && self.stamina > 0.0;
        if self.is_sprinting {
            speed *= SPRINT_MULT;
            self.stamina = (self.stamina - dt * SPRINT_STAMINA_DRAIN).max(0.0);
        } else {
            self.stamina = (self.stamina + dt * STAMINA_REGEN).min(self.max_stamina);
        }
        if self.is_in_stealth {
            speed *= STEALTH_SPEED_MULT;
        }

        self.velocity.x = direction.x * speed;
        self.velocity.z = direction.y * speed;

        if input.jump && self.is_grounded {
            self.velocity.y = JUMP_FORCE;
            self.is_grounded = false;
            self.stamina = (self.stamina - JUMP_STAMINA_COST).max(0.0);
        }
    }

    fn update_physics(&mut self, dt: f32, ground_at: impl Fn(f32, f32) -> f32) {
        if !self.is_grounded {
            self.velocity.y += GRAVITY * dt;
        }
        self.position += self.velocity * dt;

        let ground = ground_at(self.position.x, self.position.z) + PLAYER_STANDING_HEIGHT;
        // Grounded players follow the terrain downhill as well as up
        if self.is_grounded || self.position.y <= ground {
            self.position.y = ground;
            self.velocity.y = 0.0;
            self.is_grounded = true;
        }
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.position.to_array(),
            health: self.health,
            max_health: self.max_health,
            stamina: self.stamina,
            max_stamina: self.max_stamina,
            level: self.level,
            xp: self.xp,
            xp_to_next: self.xp_to_next,
            skill_points: self.skill_points,
            combo: self.combat.combo_count,
            stealth_level: self.stealth_level(),
            is_in_stealth: self.is_in_stealth,
        }
    }
}

/// Serializable view of the player for HUDs and debug dumps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub position: [f32; 3],
    pub health: f32,
    pub max_health: f32,
    pub stamina: f32,
    pub max_stamina: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub skill_points: u32,
    pub combo: u32,
    pub stealth_level: f32,
    pub is_in_stealth: bool,
}

impl PlayerSnapshot {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
