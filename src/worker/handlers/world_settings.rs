//! World-level configuration handlers.

use crate::physics::vec3;
use crate::protocol::{AxisIndexParams, BroadphaseParams, ScalarParams, VectorParams};

use super::SharedState;

/// rapier drives a single internal broadphase; the selection (with its
/// unknown-name fallback already applied during parsing) is recorded so
/// frame consumers and tests can observe it.
pub(crate) fn set_broadphase(state: &mut SharedState, params: BroadphaseParams) {
    state.config.broadphase = params.broadphase;
}

pub(crate) fn set_axis_index(state: &mut SharedState, params: AxisIndexParams) {
    state.config.axis_index = params.value;
}

pub(crate) fn set_gravity(state: &mut SharedState, params: VectorParams) {
    state.config.gravity = params.value;
    state.world.gravity = vec3(params.value);
}

pub(crate) fn set_tolerance(state: &mut SharedState, params: ScalarParams) {
    state.config.tolerance = params.value;
    state.world.integration_parameters.allowed_linear_error = params.value;
}

/// Replace the fixed timestep used by the accumulator and the solver.
pub(crate) fn set_step(state: &mut SharedState, params: ScalarParams) {
    state.config.delta = params.value;
    state.world.integration_parameters.dt = params.value;
}
