// Global game settings

/// Settings shared by every entity of a world
#[derive(Debug, Clone, PartialEq)]
pub struct GameSettings {
    /// Scale applied to animation playback (1.0 = normal speed)
    pub game_speed: f32,
    /// Seed of the world's random generator
    pub seed: u64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            game_speed: 1.0,
            seed: 0x5eed,
        }
    }
}

impl GameSettings {
    /// Settings with a given random seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = GameSettings::default();
        assert_eq!(settings.game_speed, 1.0);
    }

    #[test]
    fn test_with_seed() {
        assert_eq!(GameSettings::with_seed(3).seed, 3);
        assert_eq!(GameSettings::with_seed(3).game_speed, 1.0);
    }
}
