use super::collision::CollisionLayer;
use glam::Vec3;
use rapier3d::prelude::*;

/// Builder for creating rigid bodies with common configurations
pub struct BodyBuilder {
    body_type: RigidBodyType,
    translation: Vector<Real>,
    linvel: Vector<Real>,
    gravity_scale: Real,
    linear_damping: Real,
    can_sleep: bool,
    locked_axes: LockedAxes,
}

impl BodyBuilder {
    fn with_type(body_type: RigidBodyType) -> Self {
        Self {
            body_type,
            translation: Vector::zeros(),
            linvel: Vector::zeros(),
            gravity_scale: 1.0,
            linear_damping: 0.0,
            can_sleep: true,
            locked_axes: LockedAxes::empty(),
        }
    }

    /// Create a new dynamic body (affected by forces and collisions)
    pub fn new_dynamic() -> Self {
        Self::with_type(RigidBodyType::Dynamic)
    }

    /// Create a new fixed (static) body (completely immovable)
    pub fn new_fixed() -> Self {
        Self {
            gravity_scale: 0.0,
            can_sleep: false,
            ..Self::with_type(RigidBodyType::Fixed)
        }
    }

    /// Set the initial position of the body
    pub fn position(mut self, position: Vec3) -> Self {
        self.translation = vector![position.x, position.y, position.z];
        self
    }

    /// Set the initial linear velocity
    pub fn linvel(mut self, velocity: Vec3) -> Self {
        self.linvel = vector![velocity.x, velocity.y, velocity.z];
        self
    }

    /// Set the gravity scale (1.0 = normal gravity, 0.0 = no gravity)
    pub fn gravity_scale(mut self, scale: Real) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Set the linear damping applied by the solver
    pub fn linear_damping(mut self, damping: Real) -> Self {
        self.linear_damping = damping;
        self
    }

    /// Set whether the body can sleep when inactive
    pub fn can_sleep(mut self, can_sleep: bool) -> Self {
        self.can_sleep = can_sleep;
        self
    }

    /// Lock all rotations (steered characters stay upright)
    pub fn lock_rotation(mut self) -> Self {
        self.locked_axes = LockedAxes::ROTATION_LOCKED;
        self
    }

    /// Build the rigid body
    pub fn build(self) -> RigidBody {
        RigidBodyBuilder::new(self.body_type)
            .translation(self.translation)
            .linvel(self.linvel)
            .gravity_scale(self.gravity_scale)
            .linear_damping(self.linear_damping)
            .can_sleep(self.can_sleep)
            .locked_axes(self.locked_axes)
            .build()
    }
}

/// Common rigid body and collider configurations for game objects
pub mod presets {
    use super::*;

    /// Steered character body: dynamic, upright, never sleeping.
    /// Friction is applied by the steering code, not the solver.
    pub fn character_body(position: Vec3) -> RigidBody {
        BodyBuilder::new_dynamic()
            .position(position)
            .lock_rotation()
            .can_sleep(false)
            .build()
    }

    /// Human collider (capsule standing on its base)
    pub fn human_collider(height: Real, radius: Real) -> Collider {
        let half_height = (height / 2.0 - radius).max(0.0);
        ColliderBuilder::capsule_y(half_height, radius)
            .collision_groups(CollisionLayer::Human.to_interaction_groups())
            .friction(0.0)
            .restitution(0.0)
            .density(1.0)
            .build()
    }

    /// Dog collider (small box)
    pub fn dog_collider(length: Real, height: Real, width: Real) -> Collider {
        ColliderBuilder::cuboid(length / 2.0, height / 2.0, width / 2.0)
            .collision_groups(CollisionLayer::Dog.to_interaction_groups())
            .friction(0.0)
            .density(1.0)
            .build()
    }

    /// Static ground slab whose top face sits at `top_y`
    pub fn ground_body(top_y: Real, thickness: Real) -> RigidBody {
        BodyBuilder::new_fixed()
            .position(Vec3::new(0.0, top_y - thickness / 2.0, 0.0))
            .build()
    }

    /// Ground collider
    pub fn ground_collider(half_extent: Real, thickness: Real) -> Collider {
        ColliderBuilder::cuboid(half_extent, thickness / 2.0, half_extent)
            .collision_groups(CollisionLayer::Ground.to_interaction_groups())
            .friction(0.8)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_builder_dynamic() {
        let body = BodyBuilder::new_dynamic()
            .position(Vec3::new(1.0, 2.0, 3.0))
            .linvel(Vec3::new(5.0, 0.0, 0.0))
            .build();

        assert_eq!(body.body_type(), RigidBodyType::Dynamic);
        assert_eq!(body.translation().x, 1.0);
        assert_eq!(body.translation().z, 3.0);
        assert_eq!(body.linvel().x, 5.0);
    }

    #[test]
    fn test_fixed_body() {
        let body = BodyBuilder::new_fixed().build();
        assert_eq!(body.body_type(), RigidBodyType::Fixed);
    }

    #[test]
    fn test_character_preset() {
        let body = presets::character_body(Vec3::ZERO);
        let collider = presets::human_collider(1.8, 0.3);

        assert_eq!(body.body_type(), RigidBodyType::Dynamic);
        assert!(body.locked_axes().contains(LockedAxes::ROTATION_LOCKED));
        assert!(!collider.is_sensor());
        assert_eq!(collider.friction(), 0.0);
    }
}
