// Companion dog
//
// The dog reacts to telegrams from its human by flipping flags, and its brain
// reads those flags every tick to pick a leaf task.

use glam::{Mat4, Quat, Vec3};
use log::{debug, info, warn};
use rapier3d::prelude::{nalgebra, vector};

use crate::core::math::{horizontal, quat_to_glam, quat_to_physics, to_glam};
use crate::engine::audio::Sound;
use crate::engine::physics::{presets, PhysicsWorld, RigidBodyHandle};
use crate::game::context::TickContext;
use crate::game::messages::{Message, Recipient};

use super::skeleton::Skeleton;
use super::steering::{DogSteerSettings, FollowPathSteerer, SteerSettings, SteeringLimits};
use super::CharacterId;

/// Box size of a dog (length, height, width)
pub const DOG_SIZE: Vec3 = Vec3::new(0.9, 0.6, 0.35);

/// Seconds between two whines while the human is dead
pub const WHINE_INTERVAL: f32 = 3.0;

/// Outcome of running a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Succeeded,
    Failed,
}

/// Action at the leaves of a dog's brain
pub trait LeafTask<E> {
    fn execute(&mut self, entity: &mut E, ctx: &mut TickContext<'_>) -> TaskStatus;

    /// Task name for logging
    fn name(&self) -> &'static str;
}

/// Makes the dog whine
#[derive(Debug, Clone, Copy, Default)]
pub struct WhineTask;

impl LeafTask<DogCharacter> for WhineTask {
    fn execute(&mut self, _entity: &mut DogCharacter, ctx: &mut TickContext<'_>) -> TaskStatus {
        ctx.sounds.play(Sound::Whine);
        TaskStatus::Succeeded
    }

    fn name(&self) -> &'static str {
        "whine"
    }
}

/// Trots to its human while the human wants to play
#[derive(Debug, Clone, Copy)]
pub struct FollowHumanTask {
    pub human_position: Vec3,
}

impl LeafTask<DogCharacter> for FollowHumanTask {
    fn execute(&mut self, entity: &mut DogCharacter, _ctx: &mut TickContext<'_>) -> TaskStatus {
        entity.steerer.set_target(self.human_position);
        TaskStatus::Running
    }

    fn name(&self) -> &'static str {
        "follow human"
    }
}

/// A dog, owned by at most one human
#[derive(Debug)]
pub struct DogCharacter {
    pub id: CharacterId,
    pub name: String,

    human: Option<CharacterId>,
    human_wants_to_play: bool,
    stick_thrown: bool,
    human_is_dead: bool,
    /// Time left before the next whine
    whine_cooldown: f32,

    body_handle: RigidBodyHandle,
    steer_settings: DogSteerSettings,
    steerer: FollowPathSteerer,
    limits: SteeringLimits,

    transform: Mat4,
    skeleton: Skeleton,
}

impl DogCharacter {
    /// Create a dog at `position` and add it to the physics world
    pub fn new(id: CharacterId, name: &str, position: Vec3, physics: &mut PhysicsWorld) -> Self {
        let body_handle =
            physics.add_rigid_body(presets::character_body(position + Vec3::Y * (DOG_SIZE.y / 2.0)));
        physics.add_collider(
            presets::dog_collider(DOG_SIZE.x, DOG_SIZE.y, DOG_SIZE.z),
            body_handle,
        );
        let steer_settings = DogSteerSettings::default();

        let mut dog = Self {
            id,
            name: name.to_string(),
            human: None,
            human_wants_to_play: false,
            stick_thrown: false,
            human_is_dead: false,
            whine_cooldown: 0.0,
            body_handle,
            steerer: FollowPathSteerer::new(steer_settings.deceleration_radius),
            limits: steer_settings.limits(),
            steer_settings,
            transform: Mat4::IDENTITY,
            skeleton: Skeleton::quadruped(),
        };
        dog.sync_transform(physics);

        info!("Spawned dog {} ({}) at {:?}", dog.name, dog.id, position);
        dog
    }

    /// React to a telegram from the human. Returns whether it was understood.
    pub fn handle_message(&mut self, message: &Message, ctx: &mut TickContext<'_>) -> bool {
        match message {
            Message::DogLetsPlay => {
                self.human_wants_to_play = true;
                if let Some(human) = self.human {
                    ctx.send_now(
                        Some(Recipient::Dog(self.id)),
                        Recipient::Gui,
                        Message::SetDogButtonToThrow(human),
                    );
                }
            }
            Message::DogLetsStopPlaying => {
                self.human_wants_to_play = false;
                self.stick_thrown = false;
            }
            Message::DogStickThrown => self.stick_thrown = true,
            Message::DogHumanIsDead => {
                self.human_is_dead = true;
                self.human_wants_to_play = false;
                self.whine_cooldown = 0.0;
            }
            Message::DogHumanIsResurrected => self.human_is_dead = false,
            _ => return false,
        }
        debug!("Dog {} got {:?}", self.name, message);
        true
    }

    /// Per-tick update. `human_position` is where the owner stands, if any.
    pub fn update(&mut self, human_position: Option<Vec3>, ctx: &mut TickContext<'_>) {
        if self.human_is_dead {
            self.steerer.clear();
            self.whine_cooldown -= ctx.delta_time;
            if self.whine_cooldown <= 0.0 {
                self.run(WhineTask, ctx);
                self.whine_cooldown = WHINE_INTERVAL;
            }
        } else if let Some(human_position) = human_position.filter(|_| self.human_wants_to_play) {
            self.run(FollowHumanTask { human_position }, ctx);
        }

        self.update_steering(ctx);
    }

    fn run(&mut self, mut task: impl LeafTask<Self>, ctx: &mut TickContext<'_>) -> TaskStatus {
        let status = task.execute(self, ctx);
        if status == TaskStatus::Failed {
            warn!("Dog {}: task {} failed", self.name, task.name());
        }
        status
    }

    fn update_steering(&mut self, ctx: &mut TickContext<'_>) {
        let Some(body) = ctx.physics.get_rigid_body_mut(self.body_handle) else {
            warn!("Dog {} has no rigid body", self.name);
            return;
        };

        let position = to_glam(body.translation());
        let velocity = to_glam(body.linvel());
        match self.steerer.steer(
            position,
            velocity,
            &self.limits,
            &self.steer_settings,
            ctx.delta_time,
        ) {
            Some(next) => {
                body.set_linvel(vector![next.x, velocity.y, next.z], true);
                body.set_rotation(quat_to_physics(Quat::from_rotation_y(self.steerer.yaw())), true);
            }
            None => {
                let mut next = horizontal(velocity) * self.steer_settings.idle_friction();
                if next.length() < self.steer_settings.zero_linear_speed_threshold() {
                    next = Vec3::ZERO;
                }
                body.set_linvel(vector![next.x, velocity.y, next.z], true);
            }
        }
    }

    /// Copy the body pose into the model transform
    pub fn sync_transform(&mut self, physics: &PhysicsWorld) {
        if let Some(body) = physics.get_rigid_body(self.body_handle) {
            self.transform = Mat4::from_rotation_translation(
                quat_to_glam(body.rotation()),
                to_glam(body.translation()),
            ) * Mat4::from_translation(Vec3::new(0.0, -DOG_SIZE.y / 2.0, 0.0));
        }
    }

    pub fn human(&self) -> Option<CharacterId> {
        self.human
    }

    pub fn set_human(&mut self, human: Option<CharacterId>) {
        self.human = human;
        if human.is_none() {
            self.human_wants_to_play = false;
            self.stick_thrown = false;
            self.human_is_dead = false;
            self.steerer.clear();
        }
    }

    pub fn human_wants_to_play(&self) -> bool {
        self.human_wants_to_play
    }

    pub fn stick_thrown(&self) -> bool {
        self.stick_thrown
    }

    pub fn human_is_dead(&self) -> bool {
        self.human_is_dead
    }

    pub fn is_steering(&self) -> bool {
        self.steerer.is_steering()
    }

    pub fn body_handle(&self) -> RigidBodyHandle {
        self.body_handle
    }

    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }
}
