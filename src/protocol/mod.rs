//! Wire protocol between the consumer and the physics worker.
//!
//! Every inbound message is a tagged payload `{ topic, uuid?, params? }`.
//! The worker answers each `step` with a `frame` message carrying the
//! transform buffers, sampled observations and (when the body roster changed)
//! the ordered body identifier list. Registered rays additionally report a
//! `rayhit` message per step.
//!
//! Field names in these types are the protocol; renaming them breaks every
//! consumer. Buffers travel *inside* the messages as owned vectors, so moving
//! a message across a channel moves the backing memory with it.

mod params;

pub use params::*;

use serde::{Deserialize, Serialize};

/// Inbound event, dispatched by topic.
///
/// The enum is closed on purpose: a new topic means a new variant and the
/// compiler walks every `match` that has to learn about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "topic", rename_all = "camelCase")]
pub enum WorkerEvent {
    Init {
        #[serde(default)]
        params: InitParams,
    },
    Step {
        params: StepParams,
    },

    // Body lifecycle, one topic per shape kind.
    AddBox { uuid: String, params: BoxParams },
    AddSphere { uuid: String, params: SphereParams },
    AddPlane { uuid: String, params: PlaneParams },
    AddCylinder { uuid: String, params: CylinderParams },
    AddHeightfield { uuid: String, params: HeightfieldParams },
    AddTrimesh { uuid: String, params: TrimeshParams },
    AddCompound { uuid: String, params: CompoundParams },
    RemoveBody { uuid: String },

    // Forces and impulses.
    ApplyImpulse { uuid: String, params: ImpulseParams },
    ApplyLocalImpulse { uuid: String, params: ImpulseParams },
    ApplyTorque { uuid: String, params: TorqueParams },
    ApplyLocalForce { uuid: String, params: ForceParams },

    // Property setters.
    SetVelocity { uuid: String, params: VectorParams },
    SetAngularVelocity { uuid: String, params: VectorParams },
    SetAngularDamping { uuid: String, params: ScalarParams },
    SetLinearDamping { uuid: String, params: ScalarParams },
    SetCollisionFilterMask { uuid: String, params: MaskParams },
    SetCollisionFilterGroup { uuid: String, params: MaskParams },
    SetCollisionResponse { uuid: String, params: FlagParams },
    SetQuaternion { uuid: String, params: QuaternionParams },
    SetPosition { uuid: String, params: VectorParams },
    Sleep { uuid: String },

    // Constraints.
    AddPointToPointConstraint { uuid: String, params: PointToPointParams },
    AddHingeConstraint { uuid: String, params: HingeParams },
    AddLockConstraint { uuid: String, params: LockParams },
    AddDistanceConstraint { uuid: String, params: DistanceParams },
    AddConeTwistConstraint { uuid: String, params: ConeTwistParams },
    RemoveConstraint { uuid: String },
    EnableConstraint { uuid: String },
    DisableConstraint { uuid: String },
    EnableConstraintMotor { uuid: String },
    DisableConstraintMotor { uuid: String },
    SetConstraintMotorSpeed { uuid: String, params: ScalarParams },
    SetConstraintMotorMaxForce { uuid: String, params: ScalarParams },

    // Springs.
    AddSpring { uuid: String, params: SpringParams },
    RemoveSpring { uuid: String },
    SetSpringStiffness { uuid: String, params: ScalarParams },
    SetSpringDamping { uuid: String, params: ScalarParams },
    SetSpringRestLength { uuid: String, params: ScalarParams },

    // Raycast vehicles.
    AddRaycastVehicle { uuid: String, params: VehicleParams },
    RemoveRaycastVehicle { uuid: String },
    SetRaycastVehicleSteeringValue { uuid: String, params: WheelValueParams },
    ApplyRaycastVehicleEngineForce { uuid: String, params: WheelValueParams },
    SetRaycastVehicleBrake { uuid: String, params: WheelValueParams },

    // Persistent rays.
    AddRay { uuid: String, params: RayParams },
    RemoveRay { uuid: String },

    // Observation sampling.
    Subscribe { params: SubscribeParams },
    Unsubscribe { params: UnsubscribeParams },

    // World configuration.
    SetBroadphase { params: BroadphaseParams },
    SetAxisIndex { params: AxisIndexParams },
    SetGravity { params: VectorParams },
    SetTolerance { params: ScalarParams },
    SetStep { params: ScalarParams },
}

/// Outbound message posted by the worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "topic", rename_all = "camelCase")]
pub enum WorkerOutput {
    /// Per-step synchronization payload. `bodies` is present only when the
    /// identifier-to-index mapping changed since the previous frame.
    Frame {
        positions: Vec<f32>,
        quaternions: Vec<f32>,
        observations: Vec<Observation>,
        active: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bodies: Option<Vec<String>>,
    },
    /// Result of one registered ray for this step; `hit` is `None` on a miss.
    #[serde(rename = "rayhit")]
    RayHit {
        uuid: String,
        hit: Option<RayHitInfo>,
    },
}

/// One sampled subscription: `[id, value, property]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation(pub u32, pub ObservedValue, pub String);

/// Sampled value. Vector properties flatten to a 3-tuple; rotations are
/// converted to Euler angles before sampling, so they arrive as a 3-tuple too.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObservedValue {
    Scalar(f32),
    Triple([f32; 3]),
}

/// Closest intersection of a registered ray.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RayHitInfo {
    /// Identifier of the body that was hit, when the collider belongs to a
    /// registered body.
    pub body: Option<String>,
    pub distance: f32,
    pub point: [f32; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_use_wire_names() {
        let json = serde_json::to_value(&WorkerEvent::Sleep { uuid: "b1".into() }).unwrap();
        assert_eq!(json["topic"], "sleep");
        assert_eq!(json["uuid"], "b1");

        let json = serde_json::to_value(&WorkerEvent::SetRaycastVehicleSteeringValue {
            uuid: "v1".into(),
            params: WheelValueParams { value: 0.5, wheel_index: 2 },
        })
        .unwrap();
        assert_eq!(json["topic"], "setRaycastVehicleSteeringValue");
        assert_eq!(json["params"]["wheelIndex"], 2);
    }

    #[test]
    fn step_payload_field_names() {
        let event: WorkerEvent = serde_json::from_str(
            r#"{"topic":"step","params":{"timeElapsed":0.016,"positions":[0.0,0.0,0.0],"quaternions":[0.0,0.0,0.0,1.0]}}"#,
        )
        .unwrap();
        match event {
            WorkerEvent::Step { params } => {
                assert!((params.time_elapsed - 0.016).abs() < 1e-6);
                assert_eq!(params.positions.len(), 3);
                assert_eq!(params.quaternions.len(), 4);
            }
            other => panic!("parsed wrong variant: {:?}", other),
        }
    }

    #[test]
    fn frame_omits_bodies_until_roster_changes() {
        let frame = WorkerOutput::Frame {
            positions: vec![0.0; 3],
            quaternions: vec![0.0, 0.0, 0.0, 1.0],
            observations: vec![Observation(7, ObservedValue::Triple([0.0, 1.0, 0.0]), "velocity".into())],
            active: true,
            bodies: None,
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["topic"], "frame");
        assert!(json.get("bodies").is_none());
        assert_eq!(json["observations"][0][0], 7);
        assert_eq!(json["observations"][0][2], "velocity");
    }

    #[test]
    fn unknown_broadphase_name_falls_back_to_naive() {
        let event: WorkerEvent = serde_json::from_str(
            r#"{"topic":"setBroadphase","params":{"broadphase":"QuadTree"}}"#,
        )
        .unwrap();
        match event {
            WorkerEvent::SetBroadphase { params } => {
                assert_eq!(params.broadphase, Broadphase::Naive)
            }
            other => panic!("parsed wrong variant: {:?}", other),
        }
    }
}
