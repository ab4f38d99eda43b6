//! Force and impulse application.
//!
//! Impulses change momentum immediately; forces accumulate and are consumed
//! by the next fixed sub-step (the step loop clears them afterwards).

use rapier3d::prelude::*;

use crate::error::WorkerError;
use crate::physics::{point3, vec3};
use crate::protocol::{ForceParams, ImpulseParams, TorqueParams};

use super::SharedState;

fn body_mut<'a>(state: &'a mut SharedState, uuid: &str) -> Result<&'a mut RigidBody, WorkerError> {
    let handle = state
        .bodies
        .get(uuid)
        .ok_or_else(|| WorkerError::UnknownBody(uuid.into()))?;
    state
        .world
        .bodies
        .get_mut(handle)
        .ok_or_else(|| WorkerError::UnknownBody(uuid.into()))
}

/// World-frame impulse at an offset from the body origin.
pub(crate) fn apply_impulse(state: &mut SharedState, uuid: &str, params: ImpulseParams) -> Result<(), WorkerError> {
    let body = body_mut(state, uuid)?;
    if params.point == [0.0; 3] {
        body.apply_impulse(vec3(params.impulse), true);
    } else {
        let point = Point::from(*body.translation() + vec3(params.point));
        body.apply_impulse_at_point(vec3(params.impulse), point, true);
    }
    Ok(())
}

/// Body-frame impulse at a body-frame point.
pub(crate) fn apply_local_impulse(state: &mut SharedState, uuid: &str, params: ImpulseParams) -> Result<(), WorkerError> {
    let body = body_mut(state, uuid)?;
    let impulse = body.position().rotation * vec3(params.impulse);
    let point = body.position() * point3(params.point);
    body.apply_impulse_at_point(impulse, point, true);
    Ok(())
}

pub(crate) fn apply_torque(state: &mut SharedState, uuid: &str, params: TorqueParams) -> Result<(), WorkerError> {
    let body = body_mut(state, uuid)?;
    body.add_torque(vec3(params.torque), true);
    Ok(())
}

/// Body-frame force at a body-frame point.
pub(crate) fn apply_local_force(state: &mut SharedState, uuid: &str, params: ForceParams) -> Result<(), WorkerError> {
    let body = body_mut(state, uuid)?;
    let force = body.position().rotation * vec3(params.force);
    let point = body.position() * point3(params.point);
    body.add_force_at_point(force, point, true);
    Ok(())
}
