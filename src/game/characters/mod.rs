// Character system
//
// This module contains everything related to characters:
// - Generic state machine driver
// - Human states and the human entity
// - Companion dog and its leaf tasks
// - Steering profiles and path following
// - Skeletons and animation playback

pub mod animation;
pub mod dog;
pub mod fsm;
pub mod human;
pub mod skeleton;
pub mod state;
pub mod steering;

// Re-export commonly used types
pub use dog::DogCharacter;
pub use human::{HumanCharacter, MovementRequest};
pub use skeleton::Skeleton;
pub use state::HumanState;
pub use steering::HumanSteerSettings;

/// Unique identifier for a character
pub type CharacterId = u32;

/// Character errors
#[derive(Debug, thiserror::Error)]
pub enum CharacterError {
    #[error("Unknown human: {0}")]
    UnknownHuman(CharacterId),

    #[error("Unknown dog: {0}")]
    UnknownDog(CharacterId),

    #[error("Unknown human state: {0}")]
    UnknownState(String),

    #[error("Dog {dog} already belongs to human {human}")]
    DogAlreadyOwned { dog: CharacterId, human: CharacterId },
}
