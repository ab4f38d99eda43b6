//! Raycast vehicle wrapper.
//!
//! The controller drives the chassis body directly; the consumer-side wheel
//! bodies only mirror the controller's wheel poses so the scene can attach
//! meshes to them. Wheels are updated before every fixed sub-step and the
//! mirror bodies are written back afterwards.

use rapier3d::control::{DynamicRayCastVehicleController, WheelTuning};
use rapier3d::prelude::*;

use crate::protocol::WheelParams;

use super::{point3, vec3};

pub struct VehicleInstance {
    pub controller: DynamicRayCastVehicleController,
    pub chassis: RigidBodyHandle,
    /// Mirror bodies, one per wheel, in wheel order.
    pub wheel_bodies: Vec<RigidBodyHandle>,
}

impl VehicleInstance {
    pub fn new(chassis: RigidBodyHandle) -> Self {
        Self {
            controller: DynamicRayCastVehicleController::new(chassis),
            chassis,
            wheel_bodies: Vec::new(),
        }
    }

    pub fn add_wheel(&mut self, params: &WheelParams, body: RigidBodyHandle) {
        let mut tuning = WheelTuning::default();
        tuning.suspension_stiffness = params.suspension_stiffness;
        tuning.suspension_compression = params.suspension_compression;
        tuning.suspension_damping = params.suspension_damping;
        tuning.max_suspension_travel = params.max_suspension_travel;
        tuning.side_friction_stiffness = params.side_friction_stiffness;
        tuning.friction_slip = params.friction_slip;
        tuning.max_suspension_force = params.max_suspension_force;

        self.controller.add_wheel(
            point3(params.position),
            vec3(params.direction),
            vec3(params.axle),
            params.suspension_rest_length,
            params.radius,
            &tuning,
        );
        self.wheel_bodies.push(body);
    }

    /// Run suspension raycasts and apply drive/brake/steering forces for one
    /// fixed sub-step.
    pub fn update(
        &mut self,
        dt: f32,
        bodies: &mut RigidBodySet,
        colliders: &ColliderSet,
        queries: &QueryPipeline,
    ) {
        let filter = QueryFilter::exclude_dynamic().exclude_rigid_body(self.chassis);
        self.controller.update_vehicle(dt, bodies, colliders, queries, filter);
    }

    /// Write the controller's wheel poses into the mirror bodies.
    pub fn sync_wheel_bodies(&self, bodies: &mut RigidBodySet) {
        let chassis_rotation = match bodies.get(self.chassis) {
            Some(rb) => *rb.rotation(),
            None => return,
        };
        for (wheel, &handle) in self.controller.wheels().iter().zip(&self.wheel_bodies) {
            let steering = Rotation::from_axis_angle(&Vector::y_axis(), wheel.steering);
            let pose = Isometry::from_parts(wheel.center().coords.into(), chassis_rotation * steering);
            if let Some(rb) = bodies.get_mut(handle) {
                rb.set_position(pose, true);
            }
        }
    }

    pub fn current_speed_kmh(&self) -> f32 {
        self.controller.current_vehicle_speed * 3.6
    }
}
