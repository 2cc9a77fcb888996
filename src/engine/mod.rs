// Engine modules: physics, fixed-step loop, messaging, audio cues

pub mod audio;
pub mod game_loop;
pub mod messaging;
pub mod physics;
