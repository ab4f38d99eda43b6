//! Persistent ray handlers.
//!
//! A registered ray is cast on every step; results travel as `rayhit`
//! messages next to the frame.

use crate::error::WorkerError;
use crate::protocol::RayParams;

use super::SharedState;

pub(crate) fn add_ray(state: &mut SharedState, uuid: String, params: RayParams) {
    state.rays.insert(uuid, params);
}

pub(crate) fn remove_ray(state: &mut SharedState, uuid: &str) -> Result<(), WorkerError> {
    state
        .rays
        .remove(uuid)
        .map(|_| ())
        .ok_or_else(|| WorkerError::UnknownRay(uuid.into()))
}
