//! Ownership wrapper over the rapier3d simulation.
//!
//! The worker owns exactly one [`PhysicsWorld`]; every rapier set lives here
//! and nothing outside the worker thread ever sees a handle. Stepping uses
//! fixed-timestep-with-accumulator semantics: the caller reports elapsed
//! wall-clock time, the world advances in constant `dt` increments, at most
//! `max_sub_steps` per call.

use rapier3d::prelude::*;

use crate::protocol::InitParams;

mod constraints;
mod shapes;
mod spring;
mod vehicle;

pub use constraints::{ConstraintEntry, cone_twist_joint, distance_joint, hinge_joint, lock_joint, point_to_point_joint};
pub use shapes::{collider_from_def, ShapeDef};
pub use spring::Spring;
pub use vehicle::VehicleInstance;

#[inline]
pub(crate) fn vec3(v: [f32; 3]) -> Vector<Real> {
    vector![v[0], v[1], v[2]]
}

#[inline]
pub(crate) fn point3(v: [f32; 3]) -> Point<Real> {
    point![v[0], v[1], v[2]]
}

/// Build a unit quaternion from wire order (x, y, z, w).
#[inline]
pub(crate) fn unit_quat(q: [f32; 4]) -> Rotation<Real> {
    Rotation::from_quaternion(nalgebra::Quaternion::new(q[3], q[0], q[1], q[2]))
}

use rapier3d::na as nalgebra;

/// The single simulation instance owned by a worker.
pub struct PhysicsWorld {
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: BroadPhase,
    pub narrow_phase: NarrowPhase,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub impulse_joints: ImpulseJointSet,
    pub multibody_joints: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
    accumulator: f32,
}

impl PhysicsWorld {
    pub fn new(params: &InitParams) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = params.delta;
        integration_parameters.max_velocity_iterations = params.solver_iterations as usize;
        integration_parameters.allowed_linear_error = params.tolerance;

        PhysicsWorld {
            gravity: vec3(params.gravity),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            accumulator: 0.0,
        }
    }

    /// Fold elapsed wall-clock time into the accumulator and return how many
    /// fixed sub-steps to run now. A backlog larger than `max_sub_steps`
    /// whole steps is dropped so a stalled consumer cannot wedge the worker
    /// in catch-up.
    pub fn accumulate(&mut self, elapsed: f32, max_sub_steps: u32) -> u32 {
        let dt = self.integration_parameters.dt;
        if dt <= 0.0 {
            return 0;
        }
        self.accumulator += elapsed.max(0.0);
        let mut substeps = (self.accumulator / dt) as u32;
        if substeps >= max_sub_steps {
            substeps = max_sub_steps;
            self.accumulator = 0.0;
        } else {
            self.accumulator -= substeps as f32 * dt;
        }
        substeps
    }

    /// Advance the simulation by exactly one fixed timestep.
    pub fn step_fixed(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Remove a body together with its colliders and attached joints.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    pub fn has_active_bodies(&self) -> bool {
        !self.island_manager.active_dynamic_bodies().is_empty()
    }

    /// Cast a segment ray and return the closest hit as
    /// `(collider, distance from origin)`.
    pub fn cast_ray(&self, from: [f32; 3], to: [f32; 3]) -> Option<(ColliderHandle, f32)> {
        let origin = point3(from);
        let segment = point3(to) - origin;
        let length = segment.norm();
        if length <= f32::EPSILON {
            return None;
        }
        let ray = Ray::new(origin, segment / length);
        self.query_pipeline
            .cast_ray(&self.bodies, &self.colliders, &ray, length, true, QueryFilter::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::InitParams;

    #[test]
    fn accumulator_caps_substeps_and_drops_backlog() {
        let mut world = PhysicsWorld::new(&InitParams::default());
        // 1 second of backlog at 60 Hz would be 60 substeps.
        assert_eq!(world.accumulate(1.0, 10), 10);
        // The backlog is discarded, not carried over.
        assert_eq!(world.accumulate(0.0, 10), 0);
    }

    #[test]
    fn accumulator_carries_partial_steps() {
        let mut world = PhysicsWorld::new(&InitParams::default());
        let dt = world.integration_parameters.dt;
        assert_eq!(world.accumulate(dt * 0.5, 10), 0);
        assert_eq!(world.accumulate(dt * 0.75, 10), 1);
    }

    #[test]
    fn ray_through_a_ball_reports_distance() {
        let mut world = PhysicsWorld::new(&InitParams::default());
        let body = world.bodies.insert(RigidBodyBuilder::fixed().translation(vector![0.0, 0.0, 5.0]).build());
        world
            .colliders
            .insert_with_parent(ColliderBuilder::ball(1.0).build(), body, &mut world.bodies);
        world.step_fixed();

        let hit = world.cast_ray([0.0, 0.0, 0.0], [0.0, 0.0, 10.0]);
        let (_, distance) = hit.expect("ray should hit the ball");
        assert!((distance - 4.0).abs() < 1e-3);
    }
}
