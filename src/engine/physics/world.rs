use glam::Vec3;
use rapier3d::prelude::*;

use super::collision::LayerMask;

/// Handle to identify rigid bodies
pub type RigidBodyHandle = rapier3d::prelude::RigidBodyHandle;

/// Handle to identify colliders
pub type ColliderHandle = rapier3d::prelude::ColliderHandle;

/// Result of a ray cast against the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Collider that was hit
    pub collider: ColliderHandle,
    /// World-space hit point
    pub point: Vec3,
    /// Distance along the ray
    pub distance: Real,
}

/// Physics world that manages all physics simulation
pub struct PhysicsWorld {
    /// Gravity vector (default: -9.81 m/s² along y)
    gravity: Vector<Real>,

    /// Integration parameters for the physics simulation
    integration_parameters: IntegrationParameters,

    /// Physics pipeline handles collision detection and solving
    physics_pipeline: PhysicsPipeline,

    /// Island manager for sleeping bodies
    island_manager: IslandManager,

    /// Broad phase collision detection
    broad_phase: DefaultBroadPhase,

    /// Narrow phase collision detection
    narrow_phase: NarrowPhase,

    /// Impulse joint set
    impulse_joint_set: ImpulseJointSet,

    /// Multibody joint set
    multibody_joint_set: MultibodyJointSet,

    /// CCD solver for fast-moving objects
    ccd_solver: CCDSolver,

    /// Query pipeline for ray casts, refreshed on every step
    query_pipeline: QueryPipeline,

    /// Rigid body set
    rigid_body_set: RigidBodySet,

    /// Collider set
    collider_set: ColliderSet,
}

impl PhysicsWorld {
    /// Create a new physics world with default settings
    pub fn new() -> Self {
        Self::with_gravity(vector![0.0, -9.81, 0.0])
    }

    /// Create a new physics world with custom gravity
    pub fn with_gravity(gravity: Vector<Real>) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = 1.0 / 60.0;

        Self {
            gravity,
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
        }
    }

    /// Step the physics simulation forward by one timestep
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Add a rigid body to the physics world
    pub fn add_rigid_body(&mut self, body: RigidBody) -> RigidBodyHandle {
        self.rigid_body_set.insert(body)
    }

    /// Add a collider attached to a rigid body
    pub fn add_collider(
        &mut self,
        collider: Collider,
        parent_handle: RigidBodyHandle,
    ) -> ColliderHandle {
        self.collider_set
            .insert_with_parent(collider, parent_handle, &mut self.rigid_body_set)
    }

    /// Remove a rigid body and all its attached colliders
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true, // remove attached colliders
        );
    }

    /// Get a reference to a rigid body
    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    /// Get a mutable reference to a rigid body
    pub fn get_rigid_body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }

    /// Number of rigid bodies in the world
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Cast a ray against the visible layers and return the first hit.
    ///
    /// Uses the query pipeline as of the last `step`.
    pub fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: Real,
        visible_layers: LayerMask,
    ) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );
        let filter = QueryFilter::default().groups(visible_layers.to_query_groups());
        self.query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(collider, distance)| RayHit {
                collider,
                point: origin + direction * distance,
                distance,
            })
    }

    /// Set the timestep for physics simulation
    pub fn set_timestep(&mut self, dt: Real) {
        self.integration_parameters.dt = dt;
    }

    /// Get the current timestep
    pub fn timestep(&self) -> Real {
        self.integration_parameters.dt
    }

}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::super::body::presets;
    use super::super::collision::CollisionLayer;
    use super::*;

    fn world_with_ground() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        let ground = world.add_rigid_body(presets::ground_body(0.0, 1.0));
        world.add_collider(presets::ground_collider(50.0, 1.0), ground);
        world.step();
        world
    }

    #[test]
    fn test_raycast_hits_ground() {
        let world = world_with_ground();
        let hit = world
            .raycast(Vec3::new(2.0, 10.0, -3.0), Vec3::NEG_Y, 100.0, LayerMask::ALL)
            .expect("ray should hit the ground");

        assert!((hit.point.y).abs() < 1e-3);
        assert!((hit.point.x - 2.0).abs() < 1e-3);
        assert!((hit.distance - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_raycast_respects_visible_layers() {
        let world = world_with_ground();
        let hidden = LayerMask::only(CollisionLayer::Scenery);
        assert!(world
            .raycast(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y, 100.0, hidden)
            .is_none());
    }

    #[test]
    fn test_raycast_zero_direction() {
        let world = world_with_ground();
        assert!(world
            .raycast(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO, 100.0, LayerMask::ALL)
            .is_none());
    }

    #[test]
    fn test_free_body_falls() {
        let mut world = PhysicsWorld::new();
        let body = world.add_rigid_body(presets::character_body(Vec3::new(0.0, 5.0, 0.0)));
        world.add_collider(presets::human_collider(1.8, 0.3), body);
        for _ in 0..10 {
            world.step();
        }
        let y = world.get_rigid_body(body).map(|b| b.translation().y);
        assert!(y.is_some_and(|y| y < 5.0));
    }

    #[test]
    fn test_remove_body() {
        let mut world = PhysicsWorld::new();
        let body = world.add_rigid_body(presets::character_body(Vec3::ZERO));
        assert_eq!(world.body_count(), 1);
        world.remove_rigid_body(body);
        assert_eq!(world.body_count(), 0);
        assert!(world.get_rigid_body(body).is_none());
    }
}
