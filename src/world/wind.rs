use bevy::prelude::*;

/// Altitude at which wind audio sits at its nominal level
const REFERENCE_ALTITUDE: f32 = 10.0;
const ALTITUDE_GAIN: f32 = 0.02;

/// Wind over the island, a pure function of game time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wind {
    /// Unit direction on the (x, z) plane
    pub direction: Vec2,
    pub strength: f32,
}

impl Wind {
    pub fn at(game_time: f64) -> Self {
        let t = game_time * 0.001;
        let x = (t * 0.5).sin() * 0.8 + (t * 0.3).cos() * 0.4;
        let z = (t * 0.7).cos() * 0.6 + (t * 0.4).sin() * 0.5;
        let strength = 0.3 + (t * 0.8).sin() * 0.4 + (t * 1.2).cos() * 0.2;
        Self {
            direction: Vec2::new(x as f32, z as f32).normalize_or(Vec2::X),
            strength: strength as f32,
        }
    }

    /// Ambience level for the audio layer: louder on high ground, in [0, 1]
    pub fn audio_intensity(&self, altitude: f32) -> f32 {
        let altitude_factor =
            (1.0 + (altitude - REFERENCE_ALTITUDE) * ALTITUDE_GAIN).clamp(0.5, 1.5);
        (self.strength * altitude_factor).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wind_at_zero() {
        let wind = Wind::at(0.0);
        // x = 0.4, z = 0.6 before normalising; strength = 0.3 + 0.2
        assert!((wind.strength - 0.5).abs() < 1e-6);
        let expected = Vec2::new(0.4, 0.6).normalize();
        assert!(wind.direction.distance(expected) < 1e-6);
    }

    #[test]
    fn test_direction_is_unit() {
        for i in 0..200 {
            let wind = Wind::at(i as f64 * 123.4);
            assert!((wind.direction.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_audio_intensity_clamped() {
        let calm = Wind {
            direction: Vec2::X,
            strength: -0.3,
        };
        assert_eq!(calm.audio_intensity(10.0), 0.0);
        let gale = Wind {
            direction: Vec2::X,
            strength: 0.9,
        };
        assert_eq!(gale.audio_intensity(500.0), 1.0);
        assert!((gale.audio_intensity(10.0) - 0.9).abs() < 1e-6);
        // Deep valleys bottom out at half volume
        assert!((gale.audio_intensity(-1000.0) - 0.45).abs() < 1e-6);
    }
}
