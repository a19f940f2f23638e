//! Timed player abilities.
//!
//! Each ability is either instant (fires, then cools down) or timed (stays
//! active for a duration, then cools down). Active and cooling are exclusive
//! phases, and running out of duration is the only way a timed ability ends.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Instant ranged gust, unlocked by wind control
    WindStrike,
    /// Timed: slower movement, higher stealth level
    StealthMode,
    /// Timed
    Focus,
}

impl AbilityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WindStrike => "wind_strike",
            Self::StealthMode => "stealth_mode",
            Self::Focus => "focus",
        }
    }

    pub fn all() -> [AbilityKind; 3] {
        [Self::WindStrike, Self::StealthMode, Self::Focus]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    pub active: bool,
    /// Remaining active time in seconds
    pub duration: f32,
    /// Nominal active time; 0 for instant abilities
    pub max_duration: f32,
    /// Remaining cooldown in seconds
    pub cooldown: f32,
    pub max_cooldown: f32,
    pub unlocked: bool,
}

impl Ability {
    pub fn instant(max_cooldown: f32) -> Self {
        Self {
            active: false,
            duration: 0.0,
            max_duration: 0.0,
            cooldown: 0.0,
            max_cooldown,
            unlocked: true,
        }
    }

    pub fn timed(max_duration: f32, max_cooldown: f32) -> Self {
        Self {
            max_duration,
            ..Self::instant(max_cooldown)
        }
    }

    pub fn locked(mut self) -> Self {
        self.unlocked = false;
        self
    }

    pub fn is_instant(&self) -> bool {
        self.max_duration <= 0.0
    }

    pub fn is_ready(&self) -> bool {
        self.unlocked && !self.active && self.cooldown <= 0.0
    }

    /// Try to fire the ability for `duration` seconds (ignored for instant
    /// abilities). Returns false and leaves every field untouched if it is
    /// locked, active or cooling down.
    pub fn activate(&mut self, duration: f32) -> bool {
        if !self.is_ready() {
            return false;
        }
        if self.is_instant() {
            self.cooldown = self.max_cooldown;
        } else {
            self.active = true;
            self.duration = duration;
        }
        true
    }

    /// Advance timers. Returns true when the ability deactivated this tick.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.cooldown > 0.0 {
            self.cooldown = (self.cooldown - dt).max(0.0);
        }
        if self.active {
            self.duration -= dt;
            if self.duration <= 0.0 {
                self.active = false;
                self.duration = 0.0;
                self.cooldown = self.max_cooldown;
                return true;
            }
        }
        false
    }

    /// Back to neutral: inactive, no cooldown. Unlock state is kept.
    pub fn reset(&mut self) {
        self.active = false;
        self.duration = 0.0;
        self.cooldown = 0.0;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilitySet {
    pub wind_strike: Ability,
    pub stealth_mode: Ability,
    pub focus: Ability,
}

impl Default for AbilitySet {
    fn default() -> Self {
        Self {
            wind_strike: Ability::instant(8.0).locked(),
            stealth_mode: Ability::timed(5.0, 15.0),
            focus: Ability::timed(3.0, 10.0),
        }
    }
}

impl AbilitySet {
    pub fn get(&self, kind: AbilityKind) -> &Ability {
        match kind {
            AbilityKind::WindStrike => &self.wind_strike,
            AbilityKind::StealthMode => &self.stealth_mode,
            AbilityKind::Focus => &self.focus,
        }
    }

    pub fn get_mut(&mut self, kind: AbilityKind) -> &mut Ability {
        match kind {
            AbilityKind::WindStrike => &mut self.wind_strike,
            AbilityKind::StealthMode => &mut self.stealth_mode,
            AbilityKind::Focus => &mut self.focus,
        }
    }

    /// Tick every ability; returns the ones that deactivated
    pub fn tick(&mut self, dt: f32) -> Vec<AbilityKind> {
        AbilityKind::all()
            .into_iter()
            .filter(|kind| self.get_mut(*kind).tick(dt))
            .collect()
    }

    pub fn reset_all(&mut self) {
        for kind in AbilityKind::all() {
            self.get_mut(kind).reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_lifecycle() {
        let mut focus = Ability::timed(3.0, 10.0);
        assert!(focus.activate(3.0));
        assert!(focus.active);
        assert!(!focus.tick(2.0));
        assert!(focus.tick(1.5), "Duration ran out");
        assert!(!focus.active);
        assert_eq!(focus.cooldown, 10.0);
        assert!(!focus.activate(3.0));
        focus.tick(10.0);
        assert!(focus.is_ready());
    }

    #[test]
    fn test_activate_while_cooling_is_noop() {
        let mut ability = Ability::timed(5.0, 15.0);
        ability.cooldown = 4.0;
        ability.duration = 0.7;
        assert!(!ability.activate(5.0));
        assert!(!ability.active);
        assert_eq!(ability.duration, 0.7, "Rejected activation must not touch duration");
    }

    #[test]
    fn test_activate_while_active_is_noop() {
        let mut ability = Ability::timed(5.0, 15.0);
        assert!(ability.activate(5.0));
        ability.tick(1.0);
        assert!(!ability.activate(5.0));
        assert!((ability.duration - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_instant_goes_straight_to_cooldown() {
        let mut strike = Ability::instant(8.0);
        assert!(strike.activate(0.0));
        assert!(!strike.active);
        assert_eq!(strike.cooldown, 8.0);
        assert!(!strike.tick(8.0));
        assert!(strike.is_ready());
    }

    #[test]
    fn test_locked_rejects() {
        let mut set = AbilitySet::default();
        assert!(!set.wind_strike.activate(0.0));
        set.wind_strike.unlocked = true;
        assert!(set.wind_strike.activate(0.0));
    }

    #[test]
    fn test_set_tick_reports_expiry() {
        let mut set = AbilitySet::default();
        set.focus.activate(3.0);
        set.stealth_mode.activate(6.0);
        let expired = set.tick(3.5);
        assert_eq!(expired, vec![AbilityKind::Focus]);
        set.reset_all();
        assert!(set.stealth_mode.is_ready());
        assert!(!set.wind_strike.unlocked, "Reset keeps unlock state");
    }
}
