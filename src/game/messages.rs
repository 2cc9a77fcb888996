// Messages exchanged between humans, dogs and the HUD

use rand::Rng;

use crate::core::math::{random_triangular, random_uniform};
use crate::engine::messaging::Telegram;
use crate::game::characters::CharacterId;

/// Addressable receivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recipient {
    Human(CharacterId),
    Dog(CharacterId),
    Gui,
}

/// Message payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Hide the dog button of a human
    ClearDogButton(CharacterId),
    /// Show the whistle button of a human
    SetDogButtonToWhistle(CharacterId),
    /// Show the throw button of a human
    SetDogButtonToThrow(CharacterId),
    /// The human threw the stick
    DogStickThrown,
    /// The human died
    DogHumanIsDead,
    /// The human came back to life
    DogHumanIsResurrected,
    /// The human walked away, playtime is over
    DogLetsStopPlaying,
    /// The human whistled
    DogLetsPlay,
}

/// Telegram routed by the game world
pub type GameTelegram = Telegram<Recipient, Message>;

/// How long a receiver takes to react to a message
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Latency {
    Immediate,
    Triangular { min: f32, mode: f32, max: f32 },
    Uniform { min: f32, max: f32 },
}

/// Dog noticing the stick flying
pub const STICK_THROWN_LATENCY: Latency = Latency::Triangular {
    min: 0.3,
    mode: 0.6,
    max: 1.2,
};

/// Dog reacting to its human starting to move, whistling or dying
pub const DOG_REACTION_LATENCY: Latency = Latency::Triangular {
    min: 0.8,
    mode: 1.2,
    max: 2.0,
};

/// Dog noticing its human got back up
pub const RESURRECTION_LATENCY: Latency = Latency::Uniform { min: 0.8, max: 1.5 };

impl Latency {
    /// Draw a delay in seconds
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        match *self {
            Latency::Immediate => 0.0,
            Latency::Triangular { min, mode, max } => random_triangular(rng, min, mode, max),
            Latency::Uniform { min, max } => random_uniform(rng, min, max),
        }
    }

    /// Longest possible delay
    pub fn max_delay(&self) -> f32 {
        match *self {
            Latency::Immediate => 0.0,
            Latency::Triangular { max, .. } | Latency::Uniform { max, .. } => max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_immediate_latency() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(Latency::Immediate.sample(&mut rng), 0.0);
        assert_eq!(Latency::Immediate.max_delay(), 0.0);
    }

    #[test]
    fn test_reaction_latencies_in_range() {
        let mut rng = StdRng::seed_from_u64(9);
        for latency in [STICK_THROWN_LATENCY, DOG_REACTION_LATENCY, RESURRECTION_LATENCY] {
            for _ in 0..200 {
                let delay = latency.sample(&mut rng);
                assert!(delay > 0.0 && delay <= latency.max_delay());
            }
        }
    }
}
