//! Constraint handlers.
//!
//! Creation resolves both body identifiers up front; enable/disable filters
//! the registry by identifier and treats zero matches as a no-op. Motor
//! updates are written to the entry's joint template as well as the live
//! joint so a later re-enable keeps them.

use rapier3d::prelude::*;

use crate::error::WorkerError;
use crate::physics::{
    cone_twist_joint, distance_joint, hinge_joint, lock_joint, point_to_point_joint, point3,
    vec3, ConstraintEntry,
};
use crate::protocol::{
    ConeTwistParams, DistanceParams, HingeParams, LockParams, PointToPointParams, ScalarParams,
};

use super::SharedState;

fn body_pair(
    state: &SharedState,
    body_a: &str,
    body_b: &str,
) -> Result<(RigidBodyHandle, RigidBodyHandle), WorkerError> {
    let a = state
        .bodies
        .get(body_a)
        .ok_or_else(|| WorkerError::UnknownBody(body_a.into()))?;
    let b = state
        .bodies
        .get(body_b)
        .ok_or_else(|| WorkerError::UnknownBody(body_b.into()))?;
    Ok((a, b))
}

fn insert_entry(
    state: &mut SharedState,
    uuid: String,
    body_a: RigidBodyHandle,
    body_b: RigidBodyHandle,
    joint: GenericJoint,
    motor_axis: Option<JointAxis>,
) {
    let mut entry = ConstraintEntry::new(body_a, body_b, joint, motor_axis);
    entry.handle = Some(state.world.impulse_joints.insert(body_a, body_b, joint, true));
    state.constraints.insert(uuid, entry);
}

pub(crate) fn add_point_to_point(state: &mut SharedState, uuid: String, params: PointToPointParams) -> Result<(), WorkerError> {
    let (a, b) = body_pair(state, &params.body_a, &params.body_b)?;
    let joint = point_to_point_joint(point3(params.pivot_a), point3(params.pivot_b));
    insert_entry(state, uuid, a, b, joint, None);
    Ok(())
}

pub(crate) fn add_hinge(state: &mut SharedState, uuid: String, params: HingeParams) -> Result<(), WorkerError> {
    let (a, b) = body_pair(state, &params.body_a, &params.body_b)?;
    let joint = hinge_joint(
        point3(params.pivot_a),
        vec3(params.axis_a),
        point3(params.pivot_b),
        vec3(params.axis_b),
    );
    // The revolute axis is the one a motor can drive.
    insert_entry(state, uuid, a, b, joint, Some(JointAxis::AngX));
    Ok(())
}

pub(crate) fn add_lock(state: &mut SharedState, uuid: String, params: LockParams) -> Result<(), WorkerError> {
    let (a, b) = body_pair(state, &params.body_a, &params.body_b)?;
    let pose_a = *state
        .world
        .bodies
        .get(a)
        .ok_or_else(|| WorkerError::UnknownBody(params.body_a.clone()))?
        .position();
    let pose_b = *state
        .world
        .bodies
        .get(b)
        .ok_or_else(|| WorkerError::UnknownBody(params.body_b.clone()))?
        .position();
    let joint = lock_joint(&pose_a, &pose_b);
    insert_entry(state, uuid, a, b, joint, None);
    Ok(())
}

pub(crate) fn add_distance(state: &mut SharedState, uuid: String, params: DistanceParams) -> Result<(), WorkerError> {
    let (a, b) = body_pair(state, &params.body_a, &params.body_b)?;
    let joint = distance_joint(params.distance);
    insert_entry(state, uuid, a, b, joint, None);
    Ok(())
}

pub(crate) fn add_cone_twist(state: &mut SharedState, uuid: String, params: ConeTwistParams) -> Result<(), WorkerError> {
    let (a, b) = body_pair(state, &params.body_a, &params.body_b)?;
    let joint = cone_twist_joint(
        point3(params.pivot_a),
        point3(params.pivot_b),
        params.angle,
        params.twist_angle,
    );
    insert_entry(state, uuid, a, b, joint, None);
    Ok(())
}

pub(crate) fn remove_constraint(state: &mut SharedState, uuid: &str) -> Result<(), WorkerError> {
    let entry = state
        .constraints
        .remove(uuid)
        .ok_or_else(|| WorkerError::UnknownConstraint(uuid.into()))?;
    if let Some(handle) = entry.handle {
        state.world.impulse_joints.remove(handle, true);
    }
    Ok(())
}

/// Zero matching constraints is a no-op, not a failure.
pub(crate) fn set_constraint_enabled(state: &mut SharedState, uuid: &str, enabled: bool) {
    let Some(entry) = state.constraints.get_mut(uuid) else {
        return;
    };
    match (enabled, entry.handle) {
        (true, None) => {
            entry.handle = Some(state.world.impulse_joints.insert(
                entry.body_a,
                entry.body_b,
                entry.joint,
                true,
            ));
        }
        (false, Some(handle)) => {
            state.world.impulse_joints.remove(handle, true);
            entry.handle = None;
        }
        _ => {}
    }
}

fn with_motor(
    state: &mut SharedState,
    uuid: &str,
    apply: impl Fn(&mut GenericJoint, JointAxis),
) -> Result<(), WorkerError> {
    let entry = state
        .constraints
        .get_mut(uuid)
        .ok_or_else(|| WorkerError::UnknownConstraint(uuid.into()))?;
    let Some(axis) = entry.motor_axis else {
        // Only hinges carry a motor; other kinds ignore motor topics.
        return Ok(());
    };
    apply(&mut entry.joint, axis);
    if let Some(handle) = entry.handle {
        if let Some(joint) = state.world.impulse_joints.get_mut(handle) {
            apply(&mut joint.data, axis);
        }
    }
    Ok(())
}

pub(crate) fn enable_motor(state: &mut SharedState, uuid: &str) -> Result<(), WorkerError> {
    with_motor(state, uuid, |joint, axis| {
        joint.set_motor_max_force(axis, f32::MAX);
    })
}

pub(crate) fn disable_motor(state: &mut SharedState, uuid: &str) -> Result<(), WorkerError> {
    with_motor(state, uuid, |joint, axis| {
        joint.set_motor_velocity(axis, 0.0, 0.0);
        joint.set_motor_max_force(axis, 0.0);
    })
}

pub(crate) fn set_motor_speed(state: &mut SharedState, uuid: &str, params: ScalarParams) -> Result<(), WorkerError> {
    with_motor(state, uuid, |joint, axis| {
        joint.set_motor_velocity(axis, params.value, 1.0);
    })
}

pub(crate) fn set_motor_max_force(state: &mut SharedState, uuid: &str, params: ScalarParams) -> Result<(), WorkerError> {
    with_motor(state, uuid, |joint, axis| {
        joint.set_motor_max_force(axis, params.value);
    })
}
