//! Player attack resolution: cooldowns, combos, crits and swing windows.

use serde::{Deserialize, Serialize};

use crate::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackKind {
    Light,
    Heavy,
}

/// One accepted attack. Enemies remember the id so a swing lands once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Swing {
    pub id: u64,
    pub kind: AttackKind,
    pub damage: u32,
    pub critical: bool,
    /// Combo step this swing was made at (heavy swings report 0)
    pub combo: u32,
}

/// Inputs to the damage formula
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackStats {
    /// Player attack damage plus weapon damage
    pub base_damage: f64,
    /// Total crit chance, in [0, 1]
    pub crit_chance: f64,
    pub sword_level: u32,
}

/// Light-attack damage for a combo step and a crit roll in [0, 1)
pub fn light_damage(base_damage: f64, combo: u32, crit_chance: f64, roll: f64) -> (u32, bool) {
    let combo = combo.clamp(1, MAX_COMBO);
    let mut damage = base_damage * (1.0 + (combo - 1) as f64 * COMBO_STEP_BONUS);
    let critical = roll < crit_chance;
    if critical {
        damage *= CRIT_DAMAGE_MULT;
    }
    (damage.floor().max(0.0) as u32, critical)
}

/// Heavy-attack damage: no combo, no crit
pub fn heavy_damage(base_damage: f64) -> u32 {
    (base_damage * HEAVY_DAMAGE_MULT).floor().max(0.0) as u32
}

/// Cooldown of a light attack at a sword mastery level
pub fn light_cooldown(sword_level: u32) -> f32 {
    let extra = sword_level.saturating_sub(1) as f32;
    (LIGHT_ATTACK_COOLDOWN - extra * LIGHT_COOLDOWN_PER_SKILL).max(0.0)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    pub attack_cooldown: f32,
    pub combo_count: u32,
    pub combo_timer: f32,
    /// Remaining time of the current swing; attacking while > 0
    pub swing_timer: f32,
    pub current: Option<Swing>,
    /// Damage of the most recent accepted attack
    pub last_damage: u32,
    next_swing: u64,
}

impl CombatState {
    pub fn is_attacking(&self) -> bool {
        self.swing_timer > 0.0
    }

    /// The swing in progress, if any
    pub fn active_swing(&self) -> Option<Swing> {
        if self.is_attacking() {
            self.current
        } else {
            None
        }
    }

    fn begin(&mut self, kind: AttackKind, damage: u32, critical: bool, combo: u32, window: f32) -> Swing {
        self.next_swing += 1;
        let swing = Swing {
            id: self.next_swing,
            kind,
            damage,
            critical,
            combo,
        };
        self.swing_timer = window;
        self.current = Some(swing);
        self.last_damage = damage;
        swing
    }

    /// Light attack with an explicit crit roll
    pub fn light_attack(&mut self, stats: &AttackStats, roll: f64) -> Option<Swing> {
        if self.attack_cooldown > 0.0 || self.is_attacking() {
            return None;
        }
        self.attack_cooldown = light_cooldown(stats.sword_level);
        self.combo_count = if self.combo_timer > 0.0 {
            (self.combo_count + 1).min(MAX_COMBO)
        } else {
            1
        };
        self.combo_timer = COMBO_WINDOW;

        let (damage, critical) =
            light_damage(stats.base_damage, self.combo_count, stats.crit_chance, roll);
        let window = LIGHT_SWING_BASE + LIGHT_SWING_PER_COMBO * self.combo_count as f32;
        Some(self.begin(AttackKind::Light, damage, critical, self.combo_count, window))
    }

    /// Heavy attack: needs the cooldown clear and enough stamina, which it spends
    pub fn heavy_attack(&mut self, stats: &AttackStats, stamina: &mut f32) -> Option<Swing> {
        if self.attack_cooldown > 0.0 || *stamina < HEAVY_STAMINA_COST {
            return None;
        }
        *stamina -= HEAVY_STAMINA_COST;
        self.attack_cooldown = HEAVY_ATTACK_COOLDOWN;
        let damage = heavy_damage(stats.base_damage);
        Some(self.begin(AttackKind::Heavy, damage, false, 0, HEAVY_SWING))
    }

    pub fn tick(&mut self, dt: f32) {
        if self.attack_cooldown > 0.0 {
            self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
        }
        if self.swing_timer > 0.0 {
            self.swing_timer -= dt;
            if self.swing_timer <= 0.0 {
                self.swing_timer = 0.0;
                self.current = None;
            }
        }
        if self.combo_timer > 0.0 {
            self.combo_timer -= dt;
            if self.combo_timer <= 0.0 {
                self.combo_timer = 0.0;
                self.combo_count = 0;
            }
        }
    }

    /// Drop any swing, cooldown and combo in progress
    pub fn reset(&mut self) {
        let next_swing = self.next_swing;
        *self = Self {
            next_swing,
            ..Self::default()
        };
    }
}
