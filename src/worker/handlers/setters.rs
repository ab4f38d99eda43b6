//! Direct property setters.
//!
//! Plain field assignment on the resolved body, no plausibility validation:
//! a negative damping goes straight through, exactly as sent.

use rapier3d::prelude::*;

use crate::error::WorkerError;
use crate::physics::{unit_quat, vec3};
use crate::protocol::{FlagParams, MaskParams, QuaternionParams, ScalarParams, VectorParams};

use super::SharedState;

fn lookup(state: &SharedState, uuid: &str) -> Result<RigidBodyHandle, WorkerError> {
    state
        .bodies
        .get(uuid)
        .ok_or_else(|| WorkerError::UnknownBody(uuid.into()))
}

fn body_mut<'a>(state: &'a mut SharedState, uuid: &str) -> Result<&'a mut RigidBody, WorkerError> {
    let handle = lookup(state, uuid)?;
    state
        .world
        .bodies
        .get_mut(handle)
        .ok_or_else(|| WorkerError::UnknownBody(uuid.into()))
}

pub(crate) fn set_velocity(state: &mut SharedState, uuid: &str, params: VectorParams) -> Result<(), WorkerError> {
    body_mut(state, uuid)?.set_linvel(vec3(params.value), true);
    Ok(())
}

pub(crate) fn set_angular_velocity(state: &mut SharedState, uuid: &str, params: VectorParams) -> Result<(), WorkerError> {
    body_mut(state, uuid)?.set_angvel(vec3(params.value), true);
    Ok(())
}

pub(crate) fn set_angular_damping(state: &mut SharedState, uuid: &str, params: ScalarParams) -> Result<(), WorkerError> {
    body_mut(state, uuid)?.set_angular_damping(params.value);
    Ok(())
}

pub(crate) fn set_linear_damping(state: &mut SharedState, uuid: &str, params: ScalarParams) -> Result<(), WorkerError> {
    body_mut(state, uuid)?.set_linear_damping(params.value);
    Ok(())
}

pub(crate) fn set_position(state: &mut SharedState, uuid: &str, params: VectorParams) -> Result<(), WorkerError> {
    let body = body_mut(state, uuid)?;
    let pose = Isometry::from_parts(vec3(params.value).into(), *body.rotation());
    body.set_position(pose, true);
    Ok(())
}

pub(crate) fn set_quaternion(state: &mut SharedState, uuid: &str, params: QuaternionParams) -> Result<(), WorkerError> {
    let body = body_mut(state, uuid)?;
    let pose = Isometry::from_parts((*body.translation()).into(), unit_quat(params.value));
    body.set_position(pose, true);
    Ok(())
}

pub(crate) fn sleep(state: &mut SharedState, uuid: &str) -> Result<(), WorkerError> {
    body_mut(state, uuid)?.sleep();
    Ok(())
}

enum FilterHalf {
    Group,
    Mask,
}

fn update_filter(state: &mut SharedState, uuid: &str, bits: u32, half: FilterHalf) -> Result<(), WorkerError> {
    let handle = lookup(state, uuid)?;
    let collider_handles: Vec<ColliderHandle> = state
        .world
        .bodies
        .get(handle)
        .ok_or_else(|| WorkerError::UnknownBody(uuid.into()))?
        .colliders()
        .to_vec();
    for collider_handle in collider_handles {
        if let Some(collider) = state.world.colliders.get_mut(collider_handle) {
            let mut groups = collider.collision_groups();
            match half {
                FilterHalf::Group => groups.memberships = Group::from_bits_truncate(bits),
                FilterHalf::Mask => groups.filter = Group::from_bits_truncate(bits),
            }
            collider.set_collision_groups(groups);
        }
    }
    Ok(())
}

pub(crate) fn set_collision_filter_group(state: &mut SharedState, uuid: &str, params: MaskParams) -> Result<(), WorkerError> {
    update_filter(state, uuid, params.bits(), FilterHalf::Group)
}

pub(crate) fn set_collision_filter_mask(state: &mut SharedState, uuid: &str, params: MaskParams) -> Result<(), WorkerError> {
    update_filter(state, uuid, params.bits(), FilterHalf::Mask)
}

/// `false` downgrades every collider of the body to a sensor.
pub(crate) fn set_collision_response(state: &mut SharedState, uuid: &str, params: FlagParams) -> Result<(), WorkerError> {
    let handle = lookup(state, uuid)?;
    let collider_handles: Vec<ColliderHandle> = state
        .world
        .bodies
        .get(handle)
        .ok_or_else(|| WorkerError::UnknownBody(uuid.into()))?
        .colliders()
        .to_vec();
    for collider_handle in collider_handles {
        if let Some(collider) = state.world.colliders.get_mut(collider_handle) {
            collider.set_sensor(!params.value);
        }
    }
    Ok(())
}
