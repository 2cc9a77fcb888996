// Services handed to character logic during a tick

use log::trace;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::engine::audio::SoundBoard;
use crate::engine::messaging::MessageDispatcher;
use crate::engine::physics::PhysicsWorld;

use super::characters::HumanSteerSettings;
use super::messages::{Latency, Message, Recipient};
use super::settings::GameSettings;

/// Everything in a world that is not a character
pub struct Services {
    pub physics: PhysicsWorld,
    pub messages: MessageDispatcher<Recipient, Message>,
    pub sounds: SoundBoard,
    pub rng: StdRng,
    pub settings: GameSettings,
    pub human_steer_settings: HumanSteerSettings,
}

impl Services {
    pub fn new(settings: GameSettings, physics: PhysicsWorld) -> Self {
        Self {
            physics,
            messages: MessageDispatcher::new(),
            sounds: SoundBoard::new(),
            rng: StdRng::seed_from_u64(settings.seed),
            settings,
            human_steer_settings: HumanSteerSettings::default(),
        }
    }

    /// Borrow the services for one tick
    pub fn context(&mut self, now: f32, delta_time: f32) -> TickContext<'_> {
        TickContext {
            physics: &mut self.physics,
            messages: &mut self.messages,
            sounds: &mut self.sounds,
            rng: &mut self.rng,
            settings: &self.settings,
            steer_settings: &self.human_steer_settings,
            now,
            delta_time,
        }
    }
}

/// Context of state hooks and entity updates
pub struct TickContext<'a> {
    pub physics: &'a mut PhysicsWorld,
    pub messages: &'a mut MessageDispatcher<Recipient, Message>,
    pub sounds: &'a mut SoundBoard,
    pub rng: &'a mut StdRng,
    pub settings: &'a GameSettings,
    /// Shared human profile, read only
    pub steer_settings: &'a HumanSteerSettings,
    /// Simulation time in seconds
    pub now: f32,
    /// Length of this tick in seconds
    pub delta_time: f32,
}

impl TickContext<'_> {
    /// Send a message after a sampled reaction time
    pub fn send(&mut self, latency: Latency, sender: Option<Recipient>, receiver: Recipient, message: Message) {
        let delay = latency.sample(&mut *self.rng);
        trace!("Sending {message:?} to {receiver:?} in {delay:.2}s");
        self.messages.dispatch(self.now, delay, sender, receiver, message);
    }

    /// Send a message deliverable right away
    pub fn send_now(&mut self, sender: Option<Recipient>, receiver: Recipient, message: Message) {
        self.send(Latency::Immediate, sender, receiver, message);
    }
}
