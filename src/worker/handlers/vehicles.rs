//! Raycast vehicle handlers.
//!
//! The chassis must exist before the vehicle is added; wheel mirror bodies
//! must exist too (the consumer creates them as kinematic bodies so the
//! worker can write wheel poses into them after each sub-step).

use crate::error::WorkerError;
use crate::physics::VehicleInstance;
use crate::protocol::{VehicleParams, WheelValueParams};

use super::SharedState;

pub(crate) fn add_vehicle(state: &mut SharedState, uuid: String, params: VehicleParams) -> Result<(), WorkerError> {
    let chassis = state
        .bodies
        .get(&params.chassis_body)
        .ok_or_else(|| WorkerError::UnknownBody(params.chassis_body.clone()))?;

    let mut vehicle = VehicleInstance::new(chassis);
    for wheel in &params.wheels {
        let body = state
            .bodies
            .get(&wheel.body)
            .ok_or_else(|| WorkerError::UnknownBody(wheel.body.clone()))?;
        vehicle.add_wheel(wheel, body);
    }
    state.vehicles.insert(uuid, vehicle);
    Ok(())
}

pub(crate) fn remove_vehicle(state: &mut SharedState, uuid: &str) -> Result<(), WorkerError> {
    state
        .vehicles
        .remove(uuid)
        .map(|_| ())
        .ok_or_else(|| WorkerError::UnknownVehicle(uuid.into()))
}

fn wheel_op(
    state: &mut SharedState,
    uuid: &str,
    params: WheelValueParams,
    apply: impl Fn(&mut rapier3d::control::Wheel, f32),
) -> Result<(), WorkerError> {
    let vehicle = state
        .vehicles
        .get_mut(uuid)
        .ok_or_else(|| WorkerError::UnknownVehicle(uuid.into()))?;
    let wheel = vehicle
        .controller
        .wheels_mut()
        .get_mut(params.wheel_index)
        .ok_or_else(|| WorkerError::WheelIndexOutOfRange { uuid: uuid.into(), index: params.wheel_index })?;
    apply(wheel, params.value);
    Ok(())
}

pub(crate) fn set_steering(state: &mut SharedState, uuid: &str, params: WheelValueParams) -> Result<(), WorkerError> {
    wheel_op(state, uuid, params, |wheel, value| wheel.steering = value)
}

pub(crate) fn apply_engine_force(state: &mut SharedState, uuid: &str, params: WheelValueParams) -> Result<(), WorkerError> {
    wheel_op(state, uuid, params, |wheel, value| wheel.engine_force = value)
}

pub(crate) fn set_brake(state: &mut SharedState, uuid: &str, params: WheelValueParams) -> Result<(), WorkerError> {
    wheel_op(state, uuid, params, |wheel, value| wheel.brake = value)
}
