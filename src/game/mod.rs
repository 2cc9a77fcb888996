// Game layer: characters, the world that ticks them, and the HUD they talk to

pub mod characters;
pub mod context;
pub mod debug;
pub mod hud;
pub mod messages;
pub mod settings;
pub mod world;

pub use settings::GameSettings;
pub use world::GameWorld;
