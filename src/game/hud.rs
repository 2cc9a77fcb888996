// Heads-up display state driven by messages

use std::collections::HashMap;

use log::debug;

use super::characters::CharacterId;
use super::messages::Message;

/// What the dog button of a human currently offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DogButton {
    /// No dog, or the dog cannot be commanded right now
    #[default]
    Hidden,
    /// Call the dog to play
    Whistle,
    /// Throw the stick
    Throw,
}

/// Per-human HUD affordances
#[derive(Debug, Default)]
pub struct Hud {
    dog_buttons: HashMap<CharacterId, DogButton>,
}

impl Hud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a HUD message, returns whether it was one
    pub fn handle_message(&mut self, message: &Message) -> bool {
        let (human, button) = match *message {
            Message::ClearDogButton(human) => (human, DogButton::Hidden),
            Message::SetDogButtonToWhistle(human) => (human, DogButton::Whistle),
            Message::SetDogButtonToThrow(human) => (human, DogButton::Throw),
            _ => return false,
        };
        debug!("Dog button of human {human} -> {button:?}");
        self.dog_buttons.insert(human, button);
        true
    }

    /// Dog button shown for a human
    pub fn dog_button(&self, human: CharacterId) -> DogButton {
        self.dog_buttons.get(&human).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_by_default() {
        let hud = Hud::new();
        assert_eq!(hud.dog_button(0), DogButton::Hidden);
    }

    #[test]
    fn test_button_messages() {
        let mut hud = Hud::new();
        assert!(hud.handle_message(&Message::SetDogButtonToWhistle(1)));
        assert_eq!(hud.dog_button(1), DogButton::Whistle);
        assert_eq!(hud.dog_button(2), DogButton::Hidden);

        hud.handle_message(&Message::SetDogButtonToThrow(1));
        assert_eq!(hud.dog_button(1), DogButton::Throw);

        hud.handle_message(&Message::ClearDogButton(1));
        assert_eq!(hud.dog_button(1), DogButton::Hidden);
    }

    #[test]
    fn test_ignores_dog_messages() {
        let mut hud = Hud::new();
        assert!(!hud.handle_message(&Message::DogLetsPlay));
    }
}
