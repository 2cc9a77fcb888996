// Sound cue queue
//
// Game code only asks for cues to be played. Actual playback belongs to an
// audio backend that drains the queue once per frame.

use log::debug;

/// Sound effects the characters can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    /// Human calls the dog
    Whistle,
    /// Dog mourns its human
    Whine,
}

impl Sound {
    /// Asset name of the cue
    pub fn asset_name(&self) -> &'static str {
        match self {
            Self::Whistle => "sounds/whistle.ogg",
            Self::Whine => "sounds/whine.ogg",
        }
    }
}

/// Cues kept when the backend falls behind; older ones are dropped first
pub const MAX_QUEUED_SOUNDS: usize = 32;

/// Collects cues requested during a tick
#[derive(Debug, Default)]
pub struct SoundBoard {
    queued: Vec<Sound>,
}

impl SoundBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a cue
    pub fn play(&mut self, sound: Sound) {
        if self.queued.len() == MAX_QUEUED_SOUNDS {
            let stale = self.queued.remove(0);
            debug!("Sound queue full, dropping {}", stale.asset_name());
        }
        debug!("Playing sound {}", sound.asset_name());
        self.queued.push(sound);
    }

    /// Cues waiting for the audio backend, oldest first
    pub fn queued(&self) -> &[Sound] {
        &self.queued
    }

    /// Hand the queued cues to the audio backend
    pub fn drain(&mut self) -> Vec<Sound> {
        std::mem::take(&mut self.queued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_queues_sound() {
        let mut board = SoundBoard::new();
        board.play(Sound::Whistle);
        assert_eq!(board.queued(), &[Sound::Whistle]);
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut board = SoundBoard::new();
        board.play(Sound::Whine);
        board.play(Sound::Whistle);
        assert_eq!(board.drain(), vec![Sound::Whine, Sound::Whistle]);
        assert!(board.queued().is_empty());
    }

    #[test]
    fn test_undrained_queue_is_bounded() {
        let mut board = SoundBoard::new();
        board.play(Sound::Whistle);
        for _ in 0..MAX_QUEUED_SOUNDS * 3 {
            board.play(Sound::Whine);
        }
        assert_eq!(board.queued().len(), MAX_QUEUED_SOUNDS);
        // The oldest cue went first
        assert!(board.queued().iter().all(|sound| *sound == Sound::Whine));
    }
}
