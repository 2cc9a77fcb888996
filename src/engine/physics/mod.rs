// Physics system using rapier3d

pub mod body;
mod collision;
mod world;

pub use body::presets;
pub use collision::{CollisionLayer, LayerMask};
pub use world::{PhysicsWorld, RigidBodyHandle};
