//! Worker core: dispatcher state machine + handlers + step loop.
//!
//! Two states, guarded by whether the shared state exists yet:
//! - UNINITIALIZED: every event except `init` is queued in arrival order.
//!   `init` builds the state, then drains the queue in that exact order
//!   before any later event runs.
//! - INITIALIZED: events dispatch immediately, one at a time to completion.
//!
//! Dispatch is a closed match over the event enum, so adding a topic without
//! routing it is a compile error rather than a silent no-op. Handler
//! failures (unknown identifiers) are logged and the loop moves on; the
//! worker itself never aborts.

use std::collections::VecDeque;

use crate::protocol::{WorkerEvent, WorkerOutput};

mod state;

#[path = "handlers/bodies.rs"]
mod bodies;
#[path = "handlers/constraints.rs"]
mod constraints;
#[path = "handlers/forces.rs"]
mod forces;
#[path = "handlers/rays.rs"]
mod rays;
#[path = "handlers/setters.rs"]
mod setters;
#[path = "handlers/springs.rs"]
mod springs;
#[path = "handlers/subscriptions.rs"]
mod subscriptions;
#[path = "handlers/vehicles.rs"]
mod vehicles;
#[path = "handlers/world_settings.rs"]
mod world_settings;
#[path = "step/step.rs"]
mod step;

pub use state::{BodyRegistry, SharedState, Subscription, WorkerConfig};

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;

/// The worker's message-receive entrypoint.
///
/// Feed it events in arrival order; it returns whatever the worker posts in
/// response (a frame plus ray hits for `step`, nothing for mutations). The
/// caller decides how events arrive — a channel loop on a native thread, or
/// `onmessage` in a Web Worker.
#[derive(Default)]
pub struct WorkerCore {
    state: Option<SharedState>,
    pending: VecDeque<WorkerEvent>,
}

impl WorkerCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Number of events waiting for `init`.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Handle one event to completion.
    pub fn handle_event(&mut self, event: WorkerEvent) -> Vec<WorkerOutput> {
        let mut out = Vec::new();
        if self.state.is_none() {
            match event {
                WorkerEvent::Init { params } => {
                    self.state = Some(SharedState::new(&params));
                    // Drain strictly in arrival order before going live.
                    while let Some(queued) = self.pending.pop_front() {
                        self.dispatch(queued, &mut out);
                    }
                }
                other => self.pending.push_back(other),
            }
            return out;
        }
        self.dispatch(event, &mut out);
        out
    }

    /// Direct access to the shared state, for embedders and tests.
    pub fn state(&self) -> Option<&SharedState> {
        self.state.as_ref()
    }

    fn dispatch(&mut self, event: WorkerEvent, out: &mut Vec<WorkerOutput>) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let result = match event {
            WorkerEvent::Init { .. } => {
                log::warn!("ignoring second init event");
                Ok(())
            }
            WorkerEvent::Step { params } => {
                step::step(state, params, out);
                Ok(())
            }

            WorkerEvent::AddBox { uuid, params } => bodies::add_box(state, uuid, params),
            WorkerEvent::AddSphere { uuid, params } => bodies::add_sphere(state, uuid, params),
            WorkerEvent::AddPlane { uuid, params } => bodies::add_plane(state, uuid, params),
            WorkerEvent::AddCylinder { uuid, params } => bodies::add_cylinder(state, uuid, params),
            WorkerEvent::AddHeightfield { uuid, params } => bodies::add_heightfield(state, uuid, params),
            WorkerEvent::AddTrimesh { uuid, params } => bodies::add_trimesh(state, uuid, params),
            WorkerEvent::AddCompound { uuid, params } => bodies::add_compound(state, uuid, params),
            WorkerEvent::RemoveBody { uuid } => bodies::remove_body(state, &uuid),

            WorkerEvent::ApplyImpulse { uuid, params } => forces::apply_impulse(state, &uuid, params),
            WorkerEvent::ApplyLocalImpulse { uuid, params } => forces::apply_local_impulse(state, &uuid, params),
            WorkerEvent::ApplyTorque { uuid, params } => forces::apply_torque(state, &uuid, params),
            WorkerEvent::ApplyLocalForce { uuid, params } => forces::apply_local_force(state, &uuid, params),

            WorkerEvent::SetVelocity { uuid, params } => setters::set_velocity(state, &uuid, params),
            WorkerEvent::SetAngularVelocity { uuid, params } => setters::set_angular_velocity(state, &uuid, params),
            WorkerEvent::SetAngularDamping { uuid, params } => setters::set_angular_damping(state, &uuid, params),
            WorkerEvent::SetLinearDamping { uuid, params } => setters::set_linear_damping(state, &uuid, params),
            WorkerEvent::SetCollisionFilterMask { uuid, params } => setters::set_collision_filter_mask(state, &uuid, params),
            WorkerEvent::SetCollisionFilterGroup { uuid, params } => setters::set_collision_filter_group(state, &uuid, params),
            WorkerEvent::SetCollisionResponse { uuid, params } => setters::set_collision_response(state, &uuid, params),
            WorkerEvent::SetQuaternion { uuid, params } => setters::set_quaternion(state, &uuid, params),
            WorkerEvent::SetPosition { uuid, params } => setters::set_position(state, &uuid, params),
            WorkerEvent::Sleep { uuid } => setters::sleep(state, &uuid),

            WorkerEvent::AddPointToPointConstraint { uuid, params } => constraints::add_point_to_point(state, uuid, params),
            WorkerEvent::AddHingeConstraint { uuid, params } => constraints::add_hinge(state, uuid, params),
            WorkerEvent::AddLockConstraint { uuid, params } => constraints::add_lock(state, uuid, params),
            WorkerEvent::AddDistanceConstraint { uuid, params } => constraints::add_distance(state, uuid, params),
            WorkerEvent::AddConeTwistConstraint { uuid, params } => constraints::add_cone_twist(state, uuid, params),
            WorkerEvent::RemoveConstraint { uuid } => constraints::remove_constraint(state, &uuid),
            WorkerEvent::EnableConstraint { uuid } => {
                constraints::set_constraint_enabled(state, &uuid, true);
                Ok(())
            }
            WorkerEvent::DisableConstraint { uuid } => {
                constraints::set_constraint_enabled(state, &uuid, false);
                Ok(())
            }
            WorkerEvent::EnableConstraintMotor { uuid } => constraints::enable_motor(state, &uuid),
            WorkerEvent::DisableConstraintMotor { uuid } => constraints::disable_motor(state, &uuid),
            WorkerEvent::SetConstraintMotorSpeed { uuid, params } => constraints::set_motor_speed(state, &uuid, params),
            WorkerEvent::SetConstraintMotorMaxForce { uuid, params } => constraints::set_motor_max_force(state, &uuid, params),

            WorkerEvent::AddSpring { uuid, params } => springs::add_spring(state, uuid, params),
            WorkerEvent::RemoveSpring { uuid } => springs::remove_spring(state, &uuid),
            WorkerEvent::SetSpringStiffness { uuid, params } => springs::set_stiffness(state, &uuid, params),
            WorkerEvent::SetSpringDamping { uuid, params } => springs::set_damping(state, &uuid, params),
            WorkerEvent::SetSpringRestLength { uuid, params } => springs::set_rest_length(state, &uuid, params),

            WorkerEvent::AddRaycastVehicle { uuid, params } => vehicles::add_vehicle(state, uuid, params),
            WorkerEvent::RemoveRaycastVehicle { uuid } => vehicles::remove_vehicle(state, &uuid),
            WorkerEvent::SetRaycastVehicleSteeringValue { uuid, params } => vehicles::set_steering(state, &uuid, params),
            WorkerEvent::ApplyRaycastVehicleEngineForce { uuid, params } => vehicles::apply_engine_force(state, &uuid, params),
            WorkerEvent::SetRaycastVehicleBrake { uuid, params } => vehicles::set_brake(state, &uuid, params),

            WorkerEvent::AddRay { uuid, params } => {
                rays::add_ray(state, uuid, params);
                Ok(())
            }
            WorkerEvent::RemoveRay { uuid } => rays::remove_ray(state, &uuid),

            WorkerEvent::Subscribe { params } => {
                subscriptions::subscribe(state, params);
                Ok(())
            }
            WorkerEvent::Unsubscribe { params } => {
                subscriptions::unsubscribe(state, params);
                Ok(())
            }

            WorkerEvent::SetBroadphase { params } => {
                world_settings::set_broadphase(state, params);
                Ok(())
            }
            WorkerEvent::SetAxisIndex { params } => {
                world_settings::set_axis_index(state, params);
                Ok(())
            }
            WorkerEvent::SetGravity { params } => {
                world_settings::set_gravity(state, params);
                Ok(())
            }
            WorkerEvent::SetTolerance { params } => {
                world_settings::set_tolerance(state, params);
                Ok(())
            }
            WorkerEvent::SetStep { params } => {
                world_settings::set_step(state, params);
                Ok(())
            }
        };
        if let Err(error) = result {
            log::warn!("event dropped: {error}");
        }
    }
}
