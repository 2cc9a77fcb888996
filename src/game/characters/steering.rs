// Steering settings and straight-line path following

use glam::Vec3;

use crate::core::math::horizontal;
use crate::engine::physics::{LayerMask, PhysicsWorld};

/// Maximum distance of a movement-request ray
const MAX_PICK_DISTANCE: f32 = 500.0;

/// Tuning shared by the steering behaviors of a character class
pub trait SteerSettings {
    /// Time over which the arrive behavior tries to reach the desired velocity
    fn time_to_target(&self) -> f32;
    /// Distance from the target considered as arrived
    fn arrival_tolerance(&self) -> f32;
    /// Distance from the target at which to start slowing down
    fn deceleration_radius(&self) -> f32;
    /// How far ahead the path follower predicts the owner's position
    fn prediction_time(&self) -> f32;
    /// Distance along the path of the point being chased
    fn path_offset(&self) -> f32;
    /// Speed under which the owner is considered still
    fn zero_linear_speed_threshold(&self) -> f32;
    /// Per-tick velocity factor applied while not steering
    fn idle_friction(&self) -> f32;
}

/// Steering profile of human characters
#[derive(Debug, Clone, PartialEq)]
pub struct HumanSteerSettings {
    pub max_linear_acceleration: f32,
    pub max_linear_speed: f32,
    pub max_angular_acceleration: f32,
    pub max_angular_speed: f32,
    pub idle_friction: f32,
    pub zero_linear_speed_threshold: f32,
    /// Steering limits scale while running
    pub run_multiplier: f32,
    /// Steering limits scale while crouching
    pub crouch_multiplier: f32,
    pub time_to_target: f32,
    pub arrival_tolerance: f32,
    pub deceleration_radius: f32,
    pub prediction_time: f32,
    pub path_offset: f32,
}

/// Default human tuning
pub const HUMAN_STEER_SETTINGS: HumanSteerSettings = HumanSteerSettings {
    max_linear_acceleration: 50.0,
    max_linear_speed: 2.0,
    max_angular_acceleration: 100.0,
    max_angular_speed: 15.0,
    idle_friction: 0.9,
    zero_linear_speed_threshold: 0.001,
    run_multiplier: 2.0,
    crouch_multiplier: 0.5,
    time_to_target: 0.1,
    arrival_tolerance: 0.1,
    deceleration_radius: 0.5,
    prediction_time: 0.0,
    path_offset: 1.0,
};

impl Default for HumanSteerSettings {
    fn default() -> Self {
        HUMAN_STEER_SETTINGS
    }
}

impl SteerSettings for HumanSteerSettings {
    fn time_to_target(&self) -> f32 {
        self.time_to_target
    }

    fn arrival_tolerance(&self) -> f32 {
        self.arrival_tolerance
    }

    fn deceleration_radius(&self) -> f32 {
        self.deceleration_radius
    }

    fn prediction_time(&self) -> f32 {
        self.prediction_time
    }

    fn path_offset(&self) -> f32 {
        self.path_offset
    }

    fn zero_linear_speed_threshold(&self) -> f32 {
        self.zero_linear_speed_threshold
    }

    fn idle_friction(&self) -> f32 {
        self.idle_friction
    }
}

/// Steering profile of dogs: quicker and twitchier than humans
#[derive(Debug, Clone, PartialEq)]
pub struct DogSteerSettings {
    pub max_linear_acceleration: f32,
    pub max_linear_speed: f32,
    pub max_angular_acceleration: f32,
    pub max_angular_speed: f32,
    pub idle_friction: f32,
    pub zero_linear_speed_threshold: f32,
    pub time_to_target: f32,
    pub arrival_tolerance: f32,
    pub deceleration_radius: f32,
    pub prediction_time: f32,
    pub path_offset: f32,
}

impl Default for DogSteerSettings {
    fn default() -> Self {
        Self {
            max_linear_acceleration: 50.0,
            max_linear_speed: 3.0,
            max_angular_acceleration: 100.0,
            max_angular_speed: 20.0,
            idle_friction: 0.8,
            zero_linear_speed_threshold: 0.001,
            time_to_target: 0.1,
            arrival_tolerance: 0.7,
            deceleration_radius: 1.0,
            prediction_time: 0.0,
            path_offset: 1.0,
        }
    }
}

impl DogSteerSettings {
    pub fn limits(&self) -> SteeringLimits {
        SteeringLimits {
            max_linear_speed: self.max_linear_speed,
            max_linear_acceleration: self.max_linear_acceleration,
            max_angular_speed: self.max_angular_speed,
            max_angular_acceleration: self.max_angular_acceleration,
        }
    }
}

impl SteerSettings for DogSteerSettings {
    fn time_to_target(&self) -> f32 {
        self.time_to_target
    }

    fn arrival_tolerance(&self) -> f32 {
        self.arrival_tolerance
    }

    fn deceleration_radius(&self) -> f32 {
        self.deceleration_radius
    }

    fn prediction_time(&self) -> f32 {
        self.prediction_time
    }

    fn path_offset(&self) -> f32 {
        self.path_offset
    }

    fn zero_linear_speed_threshold(&self) -> f32 {
        self.zero_linear_speed_threshold
    }

    fn idle_friction(&self) -> f32 {
        self.idle_friction
    }
}

/// Effective limits of one entity, derived from its class profile.
/// Never written back into the profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringLimits {
    pub max_linear_speed: f32,
    pub max_linear_acceleration: f32,
    pub max_angular_speed: f32,
    pub max_angular_acceleration: f32,
}

impl SteeringLimits {
    /// Human limits scaled by a per-state multiplier
    pub fn scaled(settings: &HumanSteerSettings, multiplier: f32) -> Self {
        Self {
            max_linear_speed: settings.max_linear_speed * multiplier,
            max_linear_acceleration: settings.max_linear_acceleration * multiplier,
            max_angular_speed: settings.max_angular_speed * multiplier,
            max_angular_acceleration: settings.max_angular_acceleration * multiplier,
        }
    }
}

/// Follows a straight path to a picked point on the ground
#[derive(Debug, Clone)]
pub struct FollowPathSteerer {
    target: Option<Vec3>,
    deceleration_radius: f32,
    /// Heading around +Y, radians
    yaw: f32,
    angular_velocity: f32,
}

impl FollowPathSteerer {
    pub fn new(deceleration_radius: f32) -> Self {
        Self {
            target: None,
            deceleration_radius,
            yaw: 0.0,
            angular_velocity: 0.0,
        }
    }

    pub fn deceleration_radius(&self) -> f32 {
        self.deceleration_radius
    }

    pub fn set_deceleration_radius(&mut self, radius: f32) {
        self.deceleration_radius = radius;
    }

    /// Point being followed, if any
    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    /// Whether a path is being followed
    pub fn is_steering(&self) -> bool {
        self.target.is_some()
    }

    /// Follow a path to `target`
    pub fn set_target(&mut self, target: Vec3) {
        self.target = Some(target);
    }

    /// Pick the ground point under a ray and follow a path to it.
    /// Returns false, leaving the current path alone, if nothing visible was hit.
    pub fn calculate_new_path(
        &mut self,
        physics: &PhysicsWorld,
        origin: Vec3,
        direction: Vec3,
        visible_layers: LayerMask,
    ) -> bool {
        match physics.raycast(origin, direction, MAX_PICK_DISTANCE, visible_layers) {
            Some(hit) => {
                self.target = Some(hit.point);
                true
            }
            None => false,
        }
    }

    /// Abandon the current path
    pub fn clear(&mut self) {
        self.target = None;
        self.angular_velocity = 0.0;
    }

    /// Heading around +Y, radians
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// New horizontal velocity for the owner, `None` once the path is done.
    pub fn steer(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        limits: &SteeringLimits,
        settings: &impl SteerSettings,
        dt: f32,
    ) -> Option<Vec3> {
        let target = self.target?;

        // Aim a little ahead of where we are going to be
        let predicted = position + velocity * settings.prediction_time();
        let to_target = horizontal(target - predicted);
        let distance = to_target.length();
        if distance <= settings.arrival_tolerance() {
            self.target = None;
            return None;
        }

        let target_speed = if distance > self.deceleration_radius {
            limits.max_linear_speed
        } else {
            limits.max_linear_speed * distance / self.deceleration_radius
        };
        let desired = to_target / distance * target_speed;

        let current = horizontal(velocity);
        let acceleration = ((desired - current) / settings.time_to_target().max(f32::EPSILON))
            .clamp_length_max(limits.max_linear_acceleration);
        let next = (current + acceleration * dt).clamp_length_max(limits.max_linear_speed);

        self.face(next, limits, dt);
        Some(next)
    }

    /// Turn towards the direction of travel within the angular limits
    fn face(&mut self, velocity: Vec3, limits: &SteeringLimits, dt: f32) {
        if velocity.length_squared() <= f32::EPSILON {
            return;
        }
        let desired_yaw = velocity.x.atan2(velocity.z);
        let mut error = desired_yaw - self.yaw;
        error = (error + std::f32::consts::PI).rem_euclid(std::f32::consts::TAU) - std::f32::consts::PI;

        let wanted = (error / dt.max(f32::EPSILON)).clamp(-limits.max_angular_speed, limits.max_angular_speed);
        let max_change = limits.max_angular_acceleration * dt;
        self.angular_velocity += (wanted - self.angular_velocity).clamp(-max_change, max_change);
        self.yaw += self.angular_velocity * dt;
    }
}
