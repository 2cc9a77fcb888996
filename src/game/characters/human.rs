// Human character entity

use std::collections::HashMap;

use glam::{Mat4, Quat, Vec3};
use log::{info, warn};
use rapier3d::prelude::{nalgebra, vector};

use crate::core::math::{horizontal, quat_to_glam, quat_to_physics, to_glam};
use crate::engine::physics::{presets, LayerMask, PhysicsWorld, RigidBodyHandle};
use crate::game::context::TickContext;

use super::animation::{AnimationClip, AnimationController, AnimationListener};
use super::fsm::{self, Agent, StateMachine};
use super::skeleton::{Skeleton, SkeletonError};
use super::state::HumanState;
use super::steering::{FollowPathSteerer, HumanSteerSettings, SteerSettings, SteeringLimits};
use super::CharacterId;

/// Capsule height of a human
pub const HUMAN_HEIGHT: f32 = 1.8;
/// Capsule radius of a human
pub const HUMAN_RADIUS: f32 = 0.3;

/// Clips of the human model with their cycle length in seconds
const HUMAN_CLIPS: [(&str, f32); 6] = [
    ("armature|idle_stand", 2.0),
    ("armature|idle_crouch", 2.0),
    ("armature|move_run", 0.7),
    ("armature|move_walk", 1.0),
    ("armature|move_crouch", 1.2),
    ("armature|action_throw", 1.1),
];

/// Where a human was asked to go
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementRequest {
    /// Pick ray from the camera, follow a path to the ground point it hits
    Pick { origin: Vec3, direction: Vec3 },
    /// Follow a path to a known point
    Target(Vec3),
}

/// A human: steered around, animated, and optionally owning a dog
#[derive(Debug)]
pub struct HumanCharacter {
    pub id: CharacterId,
    pub name: String,
    /// Whether the player has this human selected
    pub selected: bool,
    pub animations: AnimationController,

    state_machine: StateMachine<HumanState>,
    state_animation_listeners: HashMap<HumanState, AnimationListener>,
    /// Movement state resumed when steering starts
    move_state: HumanState,
    /// Overrides the state animation multiplier while set
    animation_speed_multiplier: Option<f32>,
    dog: Option<CharacterId>,

    // Physics
    body_handle: RigidBodyHandle,
    steerer: FollowPathSteerer,
    limits: SteeringLimits,
    ragdoll_control: bool,

    /// Model transform as of the last physics step
    transform: Mat4,
    skeleton: Skeleton,
}

impl HumanCharacter {
    /// Create a human standing at `position` and add it to the physics world
    pub fn new(id: CharacterId, name: &str, position: Vec3, ctx: &mut TickContext<'_>) -> Self {
        let body_handle = ctx
            .physics
            .add_rigid_body(presets::character_body(position + Vec3::Y * (HUMAN_HEIGHT / 2.0)));
        ctx.physics
            .add_collider(presets::human_collider(HUMAN_HEIGHT, HUMAN_RADIUS), body_handle);

        let animations = AnimationController::with_clips(
            HUMAN_CLIPS
                .iter()
                .map(|(clip, duration)| AnimationClip::new(clip, *duration)),
        );
        let state_animation_listeners = HumanState::ALL
            .into_iter()
            .map(|state| (state, AnimationListener::new()))
            .collect();

        let mut human = Self {
            id,
            name: name.to_string(),
            selected: false,
            animations,
            state_machine: StateMachine::new(),
            state_animation_listeners,
            move_state: HumanState::MoveWalk,
            animation_speed_multiplier: None,
            dog: None,
            body_handle,
            steerer: FollowPathSteerer::new(ctx.steer_settings.deceleration_radius),
            limits: SteeringLimits::scaled(ctx.steer_settings, 1.0),
            ragdoll_control: false,
            transform: Mat4::IDENTITY,
            skeleton: Skeleton::humanoid(),
        };
        human.sync_transform(ctx.physics);

        // Walk is remembered as the movement state, then stand still
        fsm::change_state(&mut human, HumanState::MoveWalk, ctx);
        fsm::change_state(&mut human, HumanState::IdleStand, ctx);

        info!("Spawned human {} ({}) at {:?}", human.name, human.id, position);
        human
    }

    /// Per-tick update: steering first, then the current state
    pub fn update(&mut self, ctx: &mut TickContext<'_>) {
        self.update_steering(ctx);
        fsm::update(self, ctx);
    }

    fn update_steering(&mut self, ctx: &mut TickContext<'_>) {
        if self.ragdoll_control {
            return;
        }
        let Some(body) = ctx.physics.get_rigid_body_mut(self.body_handle) else {
            warn!("Human {} has no rigid body", self.name);
            return;
        };

        let position = to_glam(body.translation());
        let velocity = to_glam(body.linvel());
        let settings = ctx.steer_settings;

        match self
            .steerer
            .steer(position, velocity, &self.limits, settings, ctx.delta_time)
        {
            Some(next) => {
                body.set_linvel(vector![next.x, velocity.y, next.z], true);
                body.set_rotation(quat_to_physics(Quat::from_rotation_y(self.steerer.yaw())), true);
            }
            None => {
                let mut next = horizontal(velocity) * settings.idle_friction();
                if next.length() < settings.zero_linear_speed_threshold() {
                    next = Vec3::ZERO;
                }
                body.set_linvel(vector![next.x, velocity.y, next.z], true);
            }
        }
    }

    /// Follow a path to the requested point.
    ///
    /// Only idle or moving humans take requests: a throw or a whistle is never
    /// interrupted. Returns whether a new path is being followed.
    pub fn handle_movement_request(
        &mut self,
        request: MovementRequest,
        visible_layers: LayerMask,
        physics: &PhysicsWorld,
    ) -> bool {
        let Some(state) = self.current_state() else {
            return false;
        };
        if !state.is_idle_state() && !state.is_movement_state() {
            return false;
        }

        match request {
            MovementRequest::Pick { origin, direction } => {
                self.steerer
                    .calculate_new_path(physics, origin, direction, visible_layers)
            }
            MovementRequest::Target(target) => {
                self.steerer.set_target(target);
                true
            }
        }
    }

    /// Switch state no matter what the human is doing
    pub fn handle_state_command(&mut self, state: HumanState, ctx: &mut TickContext<'_>) {
        fsm::change_state(self, state, ctx);
    }

    /// Abandon the current path. Without `snap` friction slows the human down.
    pub fn stop_steering(&mut self, physics: &mut PhysicsWorld, snap: bool) {
        self.steerer.clear();
        if snap {
            if let Some(body) = physics.get_rigid_body_mut(self.body_handle) {
                let velocity = body.linvel().y;
                body.set_linvel(vector![0.0, velocity, 0.0], true);
            }
        }
    }

    pub fn is_steering(&self) -> bool {
        self.steerer.is_steering()
    }

    pub fn linear_velocity(&self, physics: &PhysicsWorld) -> Vec3 {
        physics
            .get_rigid_body(self.body_handle)
            .map_or(Vec3::ZERO, |body| to_glam(body.linvel()))
    }

    /// Whether the human still slides along the ground
    pub fn is_moving(&self, physics: &PhysicsWorld, settings: &HumanSteerSettings) -> bool {
        horizontal(self.linear_velocity(physics)).length() > settings.zero_linear_speed_threshold()
    }

    /// Hand the body over to the physics simulation, or take it back upright
    pub fn set_ragdoll_control(&mut self, physics: &mut PhysicsWorld, ragdoll: bool) {
        self.ragdoll_control = ragdoll;
        let Some(body) = physics.get_rigid_body_mut(self.body_handle) else {
            warn!("Human {} has no rigid body", self.name);
            return;
        };

        if ragdoll {
            body.lock_rotations(false, true);
        } else {
            body.lock_rotations(true, true);
            body.set_angvel(vector![0.0, 0.0, 0.0], true);
            body.set_rotation(quat_to_physics(Quat::from_rotation_y(self.steerer.yaw())), true);
        }
    }

    pub fn is_ragdoll_controlled(&self) -> bool {
        self.ragdoll_control
    }

    /// Copy the body pose into the model transform
    pub fn sync_transform(&mut self, physics: &PhysicsWorld) {
        if let Some(body) = physics.get_rigid_body(self.body_handle) {
            // Model origin is at the feet, the body at the capsule center
            self.transform = Mat4::from_rotation_translation(
                quat_to_glam(body.rotation()),
                to_glam(body.translation()),
            ) * Mat4::from_translation(Vec3::new(0.0, -HUMAN_HEIGHT / 2.0, 0.0));
        }
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

    pub fn body_handle(&self) -> RigidBodyHandle {
        self.body_handle
    }

    pub fn current_state(&self) -> Option<HumanState> {
        self.state_machine.current_state()
    }

    pub fn previous_state(&self) -> Option<HumanState> {
        self.state_machine.previous_state()
    }

    pub fn is_dead(&self) -> bool {
        self.state_machine.is_in_state(HumanState::Dead)
    }

    /// Whether the human is whistling for the dog
    pub fn wants_to_play(&self) -> bool {
        self.state_machine.is_in_state(HumanState::Whistle)
    }

    pub fn current_move_state(&self) -> HumanState {
        self.move_state
    }

    pub fn current_idle_state(&self) -> Option<HumanState> {
        self.move_state.idle_state()
    }

    pub(super) fn set_move_state(&mut self, state: HumanState) {
        self.move_state = state;
    }

    pub fn dog(&self) -> Option<CharacterId> {
        self.dog
    }

    pub fn set_dog(&mut self, dog: Option<CharacterId>) {
        self.dog = dog;
    }

    pub fn animation_speed_multiplier(&self) -> Option<f32> {
        self.animation_speed_multiplier
    }

    pub(super) fn set_animation_speed_multiplier(&mut self, multiplier: Option<f32>) {
        self.animation_speed_multiplier = multiplier;
    }

    /// Steering limits derived from the profile for the current movement
    pub fn limits(&self) -> &SteeringLimits {
        &self.limits
    }

    pub fn deceleration_radius(&self) -> f32 {
        self.steerer.deceleration_radius()
    }

    /// Scale the profile limits for a movement state
    pub(super) fn apply_steering_multiplier(&mut self, settings: &HumanSteerSettings, multiplier: f32) {
        self.limits = SteeringLimits::scaled(settings, multiplier);
        self.steerer
            .set_deceleration_radius(settings.deceleration_radius * multiplier);
    }

    /// Re-derive limits after the shared profile changed
    pub fn refresh_limits(&mut self, settings: &HumanSteerSettings) {
        let multiplier = match self.move_state {
            HumanState::MoveRun => settings.run_multiplier,
            HumanState::MoveCrouch => settings.crouch_multiplier,
            _ => 1.0,
        };
        self.apply_steering_multiplier(settings, multiplier);
    }

    /// Listener of a state, cleared for a fresh clip
    pub(super) fn reset_animation_listener(&self, state: HumanState) -> Option<AnimationListener> {
        let listener = self.state_animation_listeners.get(&state)?;
        listener.set_animation_completed(false);
        Some(listener.clone())
    }

    /// Start a clip with the default speed
    pub(super) fn animate(
        &mut self,
        clip: &str,
        loop_count: i32,
        listener: Option<AnimationListener>,
        transition_time: f32,
    ) {
        if let Err(err) = self
            .animations
            .animate(clip, loop_count, 1.0, listener, transition_time)
        {
            log::error!("{}: {err}", self.name);
        }
    }

    pub fn right_hand_world_position(&self) -> Result<Vec3, SkeletonError> {
        self.bone_midpoint_world_position("right_hand")
    }

    pub fn left_hand_world_position(&self) -> Result<Vec3, SkeletonError> {
        self.bone_midpoint_world_position("left_hand")
    }

    fn bone_midpoint_world_position(&self, id: &str) -> Result<Vec3, SkeletonError> {
        let local = self.skeleton.bone_midpoint(id)?;
        Ok(self.transform.transform_point3(local))
    }
}

impl<'a> Agent<TickContext<'a>> for HumanCharacter {
    type State = HumanState;

    fn state_machine(&self) -> &StateMachine<HumanState> {
        &self.state_machine
    }

    fn state_machine_mut(&mut self) -> &mut StateMachine<HumanState> {
        &mut self.state_machine
    }
}
