//! Spring handlers.
//!
//! A spring is registered once and applies its force before every fixed
//! sub-step until removed. World anchors are converted to body-local anchors
//! at creation time; local anchors win when both are supplied.

use rapier3d::prelude::*;

use crate::error::WorkerError;
use crate::physics::{point3, vec3, Spring};
use crate::protocol::{ScalarParams, SpringParams};

use super::SharedState;

fn local_anchor(
    bodies: &RigidBodySet,
    handle: RigidBodyHandle,
    local: Option<[f32; 3]>,
    world: Option<[f32; 3]>,
) -> Vector<Real> {
    if let Some(local) = local {
        return vec3(local);
    }
    if let Some(world) = world {
        if let Some(rb) = bodies.get(handle) {
            return rb.position().inverse_transform_point(&point3(world)).coords;
        }
    }
    Vector::zeros()
}

pub(crate) fn add_spring(state: &mut SharedState, uuid: String, params: SpringParams) -> Result<(), WorkerError> {
    let body_a = state
        .bodies
        .get(&params.body_a)
        .ok_or_else(|| WorkerError::UnknownBody(params.body_a.clone()))?;
    let body_b = state
        .bodies
        .get(&params.body_b)
        .ok_or_else(|| WorkerError::UnknownBody(params.body_b.clone()))?;

    let bodies = &state.world.bodies;
    let spring = Spring {
        body_a,
        body_b,
        local_anchor_a: local_anchor(bodies, body_a, params.local_anchor_a, params.world_anchor_a),
        local_anchor_b: local_anchor(bodies, body_b, params.local_anchor_b, params.world_anchor_b),
        rest_length: params.rest_length,
        stiffness: params.stiffness,
        damping: params.damping,
    };
    state.springs.insert(uuid, spring);
    Ok(())
}

pub(crate) fn remove_spring(state: &mut SharedState, uuid: &str) -> Result<(), WorkerError> {
    state
        .springs
        .remove(uuid)
        .map(|_| ())
        .ok_or_else(|| WorkerError::UnknownSpring(uuid.into()))
}

fn spring_mut<'a>(state: &'a mut SharedState, uuid: &str) -> Result<&'a mut Spring, WorkerError> {
    state
        .springs
        .get_mut(uuid)
        .ok_or_else(|| WorkerError::UnknownSpring(uuid.into()))
}

pub(crate) fn set_stiffness(state: &mut SharedState, uuid: &str, params: ScalarParams) -> Result<(), WorkerError> {
    spring_mut(state, uuid)?.stiffness = params.value;
    Ok(())
}

pub(crate) fn set_damping(state: &mut SharedState, uuid: &str, params: ScalarParams) -> Result<(), WorkerError> {
    spring_mut(state, uuid)?.damping = params.value;
    Ok(())
}

pub(crate) fn set_rest_length(state: &mut SharedState, uuid: &str, params: ScalarParams) -> Result<(), WorkerError> {
    spring_mut(state, uuid)?.rest_length = params.value;
    Ok(())
}
