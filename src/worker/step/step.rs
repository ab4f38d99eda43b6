//! Per-frame driver.
//!
//! Advances the simulation by the fixed timestep (accumulator semantics),
//! serializes every body transform into the caller-provided buffers in
//! registry order, samples subscriptions, and emits the frame message. The
//! buffers arrive owned inside the step event and leave owned inside the
//! frame message, so exactly one side can touch them at any time.

use std::collections::HashMap;

use crate::fast;
use crate::physics::{PhysicsWorld, Spring, VehicleInstance};
use crate::protocol::{
    Observation, ObservedValue, RayHitInfo, StepParams, SubscriptionTarget, WorkerOutput,
};

use super::{BodyRegistry, SharedState, Subscription};

pub(super) fn step(state: &mut SharedState, params: StepParams, out: &mut Vec<WorkerOutput>) {
    let StepParams { time_elapsed, mut positions, mut quaternions } = params;
    let dt = state.config.delta;
    let max_sub_steps = state.config.max_sub_steps;

    let SharedState {
        world,
        bodies,
        springs,
        vehicles,
        rays,
        subscriptions,
        bodies_need_syncing,
        ..
    } = state;

    let substeps = world.accumulate(time_elapsed, max_sub_steps);
    for _ in 0..substeps {
        for spring in springs.values() {
            spring.apply_force(&mut world.bodies);
        }
        for vehicle in vehicles.values_mut() {
            vehicle.update(dt, &mut world.bodies, &world.colliders, &world.query_pipeline);
        }
        world.step_fixed();
        for vehicle in vehicles.values() {
            vehicle.sync_wheel_bodies(&mut world.bodies);
        }
        // Accumulated forces (springs, applyTorque, applyLocalForce) are
        // consumed by the sub-step that integrated them.
        for (_, body) in world.bodies.iter_mut() {
            body.reset_forces(false);
            body.reset_torques(false);
        }
    }

    // Buffer slot i belongs to the i-th body in creation order. The caller
    // pre-sizes the buffers to the body count it knows about; grow here when
    // bodies were added since.
    let count = bodies.len();
    if positions.len() < count * 3 {
        positions.resize(count * 3, 0.0);
    }
    if quaternions.len() < count * 4 {
        quaternions.resize(count * 4, 0.0);
    }
    for (i, (_uuid, handle)) in bodies.iter().enumerate() {
        let Some(body) = world.bodies.get(handle) else {
            continue;
        };
        let translation = body.translation();
        fast!(positions, [i * 3] = translation.x);
        fast!(positions, [i * 3 + 1] = translation.y);
        fast!(positions, [i * 3 + 2] = translation.z);
        let rotation = body.rotation();
        fast!(quaternions, [i * 4] = rotation.coords.x);
        fast!(quaternions, [i * 4 + 1] = rotation.coords.y);
        fast!(quaternions, [i * 4 + 2] = rotation.coords.z);
        fast!(quaternions, [i * 4 + 3] = rotation.coords.w);
    }

    let mut observations: Vec<Observation> = subscriptions
        .iter()
        .filter_map(|(&id, sub)| {
            sample(sub, world, bodies, vehicles, springs)
                .map(|value| Observation(id, value, sub.property.clone()))
        })
        .collect();
    // Registry maps iterate in arbitrary order; report in id order.
    observations.sort_by_key(|observation| observation.0);

    let roster = if *bodies_need_syncing {
        *bodies_need_syncing = false;
        Some(bodies.uuids())
    } else {
        None
    };

    out.push(WorkerOutput::Frame {
        positions,
        quaternions,
        observations,
        active: world.has_active_bodies(),
        bodies: roster,
    });

    let mut ray_ids: Vec<&String> = rays.keys().collect();
    ray_ids.sort();
    for uuid in ray_ids {
        let ray = &rays[uuid];
        let hit = world.cast_ray(ray.from, ray.to).map(|(collider, distance)| {
            let body = world
                .colliders
                .get(collider)
                .and_then(|c| c.parent())
                .and_then(|parent| bodies.uuid_of(parent))
                .map(str::to_owned);
            RayHitInfo { body, distance, point: point_along(ray.from, ray.to, distance) }
        });
        out.push(WorkerOutput::RayHit { uuid: uuid.clone(), hit });
    }
}

fn point_along(from: [f32; 3], to: [f32; 3], distance: f32) -> [f32; 3] {
    let segment = [to[0] - from[0], to[1] - from[1], to[2] - from[2]];
    let length = (segment[0] * segment[0] + segment[1] * segment[1] + segment[2] * segment[2]).sqrt();
    if length <= f32::EPSILON {
        return from;
    }
    let scale = distance / length;
    [
        from[0] + segment[0] * scale,
        from[1] + segment[1] * scale,
        from[2] + segment[2] * scale,
    ]
}

/// Resolve one subscription against its target collection. Absent targets and
/// unknown property names are skipped silently.
fn sample(
    sub: &Subscription,
    world: &PhysicsWorld,
    bodies: &BodyRegistry,
    vehicles: &HashMap<String, VehicleInstance>,
    springs: &HashMap<String, Spring>,
) -> Option<ObservedValue> {
    match sub.target {
        SubscriptionTarget::Bodies => {
            let body = world.bodies.get(bodies.get(&sub.uuid)?)?;
            match sub.property.as_str() {
                "position" => {
                    let t = body.translation();
                    Some(ObservedValue::Triple([t.x, t.y, t.z]))
                }
                "velocity" => {
                    let v = body.linvel();
                    Some(ObservedValue::Triple([v.x, v.y, v.z]))
                }
                "angularVelocity" => {
                    let w = body.angvel();
                    Some(ObservedValue::Triple([w.x, w.y, w.z]))
                }
                // Rotations are sampled as Euler angles.
                "quaternion" | "rotation" => {
                    let (roll, pitch, yaw) = body.rotation().euler_angles();
                    Some(ObservedValue::Triple([roll, pitch, yaw]))
                }
                "sleepState" => Some(ObservedValue::Scalar(if body.is_sleeping() { 1.0 } else { 0.0 })),
                _ => None,
            }
        }
        SubscriptionTarget::Vehicles => {
            let vehicle = vehicles.get(&sub.uuid)?;
            match sub.property.as_str() {
                "currentVehicleSpeedKmHour" => Some(ObservedValue::Scalar(vehicle.current_speed_kmh())),
                _ => None,
            }
        }
        SubscriptionTarget::SpringInstances => {
            let spring = springs.get(&sub.uuid)?;
            match sub.property.as_str() {
                "restLength" => Some(ObservedValue::Scalar(spring.rest_length)),
                "stiffness" => Some(ObservedValue::Scalar(spring.stiffness)),
                "damping" => Some(ObservedValue::Scalar(spring.damping)),
                _ => None,
            }
        }
    }
}
