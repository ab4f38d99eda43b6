//! Parameter payloads for the worker protocol.
//!
//! Defaults mirror the simulation defaults the consumer relies on when it
//! sends sparse payloads: a body with no `mass` is static, a missing
//! `broadphase` is the naive one, a missing timestep is 60 Hz.

use serde::{Deserialize, Deserializer, Serialize};

fn default_gravity() -> [f32; 3] {
    [0.0, -9.81, 0.0]
}

fn default_delta() -> f32 {
    1.0 / 60.0
}

fn default_max_sub_steps() -> u32 {
    10
}

fn default_solver_iterations() -> u32 {
    10
}

fn default_tolerance() -> f32 {
    0.001
}

fn default_true() -> bool {
    true
}

fn default_friction() -> f32 {
    0.3
}

fn default_restitution() -> f32 {
    0.3
}

fn default_quaternion() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn default_damping() -> f32 {
    0.01
}

fn default_filter_group() -> i32 {
    1
}

fn default_filter_mask() -> i32 {
    -1
}

fn default_radius() -> f32 {
    1.0
}

fn default_unit() -> f32 {
    1.0
}

fn default_wheel_direction() -> [f32; 3] {
    [0.0, -1.0, 0.0]
}

fn default_wheel_axle() -> [f32; 3] {
    [-1.0, 0.0, 0.0]
}

fn default_suspension_rest_length() -> f32 {
    0.3
}

fn default_wheel_radius() -> f32 {
    0.5
}

fn default_suspension_stiffness() -> f32 {
    30.0
}

fn default_suspension_compression() -> f32 {
    4.4
}

fn default_suspension_damping() -> f32 {
    2.3
}

fn default_max_suspension_travel() -> f32 {
    0.3
}

fn default_friction_slip() -> f32 {
    10.5
}

fn default_side_friction_stiffness() -> f32 {
    1.0
}

fn default_max_suspension_force() -> f32 {
    6000.0
}

fn default_spring_rest_length() -> f32 {
    1.0
}

fn default_spring_stiffness() -> f32 {
    100.0
}

fn default_hinge_axis() -> [f32; 3] {
    [1.0, 0.0, 0.0]
}

fn default_twist_axis() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

fn default_cone_angle() -> f32 {
    std::f32::consts::FRAC_PI_2
}

fn default_twist_angle() -> f32 {
    std::f32::consts::PI
}

/// Broadphase algorithm selector.
///
/// Deserialized by name; an unrecognized name falls back to [`Broadphase::Naive`]
/// instead of failing the whole message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Broadphase {
    #[default]
    Naive,
    Sap,
    Grid,
}

impl Broadphase {
    pub fn from_name(name: &str) -> Self {
        match name {
            "SAP" | "Sap" | "sap" => Broadphase::Sap,
            "Grid" | "grid" => Broadphase::Grid,
            _ => Broadphase::Naive,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Broadphase::Naive => "Naive",
            Broadphase::Sap => "SAP",
            Broadphase::Grid => "Grid",
        }
    }
}

impl Serialize for Broadphase {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Broadphase {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Broadphase::from_name(&name))
    }
}

/// Default contact material applied where a body carries no material of its own.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialParams {
    #[serde(default = "default_friction")]
    pub friction: f32,
    #[serde(default = "default_restitution")]
    pub restitution: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self { friction: default_friction(), restitution: default_restitution() }
    }
}

/// Immutable simulation parameters, set once by the `init` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitParams {
    #[serde(default = "default_gravity")]
    pub gravity: [f32; 3],
    /// Fixed timestep, seconds.
    #[serde(default = "default_delta")]
    pub delta: f32,
    #[serde(default = "default_max_sub_steps")]
    pub max_sub_steps: u32,
    #[serde(default)]
    pub broadphase: Broadphase,
    #[serde(default = "default_solver_iterations")]
    pub solver_iterations: u32,
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,
    #[serde(default = "default_true")]
    pub allow_sleep: bool,
    /// Sweep axis for the SAP broadphase (0 = x, 1 = y, 2 = z).
    #[serde(default)]
    pub axis_index: u32,
    #[serde(default)]
    pub default_contact_material: MaterialParams,
}

impl Default for InitParams {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            delta: default_delta(),
            max_sub_steps: default_max_sub_steps(),
            broadphase: Broadphase::Naive,
            solver_iterations: default_solver_iterations(),
            tolerance: default_tolerance(),
            allow_sleep: true,
            axis_index: 0,
            default_contact_material: MaterialParams::default(),
        }
    }
}

/// Per-step input: elapsed wall-clock time plus the two transfer buffers the
/// consumer hands back for this frame. Ownership of the buffers moves with
/// the message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepParams {
    pub time_elapsed: f32,
    #[serde(default)]
    pub positions: Vec<f32>,
    #[serde(default)]
    pub quaternions: Vec<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BodyType {
    Dynamic,
    Static,
    Kinematic,
}

/// Fields shared by every body-creation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyCommon {
    /// Zero mass makes the body static unless `bodyType` overrides it.
    #[serde(default)]
    pub mass: f32,
    #[serde(default)]
    pub position: [f32; 3],
    /// Orientation quaternion, (x, y, z, w).
    #[serde(default = "default_quaternion")]
    pub rotation: [f32; 4],
    #[serde(default)]
    pub velocity: [f32; 3],
    #[serde(default)]
    pub angular_velocity: [f32; 3],
    #[serde(default = "default_damping")]
    pub linear_damping: f32,
    #[serde(default = "default_damping")]
    pub angular_damping: f32,
    #[serde(default)]
    pub material: Option<MaterialParams>,
    #[serde(default = "default_filter_group")]
    pub collision_filter_group: i32,
    #[serde(default = "default_filter_mask")]
    pub collision_filter_mask: i32,
    /// `false` turns the collider into a sensor: it reports overlaps but
    /// produces no contact forces.
    #[serde(default = "default_true")]
    pub collision_response: bool,
    #[serde(default = "default_true")]
    pub allow_sleep: bool,
    #[serde(default)]
    pub body_type: Option<BodyType>,
}

impl Default for BodyCommon {
    fn default() -> Self {
        Self {
            mass: 0.0,
            position: [0.0; 3],
            rotation: default_quaternion(),
            velocity: [0.0; 3],
            angular_velocity: [0.0; 3],
            linear_damping: default_damping(),
            angular_damping: default_damping(),
            material: None,
            collision_filter_group: default_filter_group(),
            collision_filter_mask: default_filter_mask(),
            collision_response: true,
            allow_sleep: true,
            body_type: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxParams {
    #[serde(flatten)]
    pub body: BodyCommon,
    pub half_extents: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SphereParams {
    #[serde(flatten)]
    pub body: BodyCommon,
    #[serde(default = "default_radius")]
    pub radius: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaneParams {
    #[serde(flatten)]
    pub body: BodyCommon,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CylinderParams {
    #[serde(flatten)]
    pub body: BodyCommon,
    #[serde(default = "default_radius")]
    pub radius_top: f32,
    #[serde(default = "default_radius")]
    pub radius_bottom: f32,
    #[serde(default = "default_unit")]
    pub height: f32,
    /// Kept for wire compatibility; the collider is an exact cylinder.
    #[serde(default)]
    pub num_segments: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeightfieldParams {
    #[serde(flatten)]
    pub body: BodyCommon,
    /// Row-major height samples.
    pub data: Vec<Vec<f32>>,
    #[serde(default = "default_unit")]
    pub element_size: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimeshParams {
    #[serde(flatten)]
    pub body: BodyCommon,
    /// Flat xyz triples.
    pub vertices: Vec<f32>,
    /// Flat index triples.
    pub indices: Vec<u32>,
}

/// Child shape of a compound body, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChildShape {
    #[serde(rename = "Box", rename_all = "camelCase")]
    Box { half_extents: [f32; 3] },
    #[serde(rename = "Sphere", rename_all = "camelCase")]
    Sphere { radius: f32 },
    #[serde(rename = "Cylinder", rename_all = "camelCase")]
    Cylinder { radius: f32, height: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundChild {
    #[serde(flatten)]
    pub shape: ChildShape,
    #[serde(default)]
    pub offset: [f32; 3],
    #[serde(default = "default_quaternion")]
    pub quaternion: [f32; 4],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundParams {
    #[serde(flatten)]
    pub body: BodyCommon,
    pub shapes: Vec<CompoundChild>,
}

/// Impulse with an application point: world-frame for `applyImpulse`,
/// body-local for `applyLocalImpulse`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpulseParams {
    pub impulse: [f32; 3],
    #[serde(default)]
    pub point: [f32; 3],
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TorqueParams {
    pub torque: [f32; 3],
}

/// Body-local force at a body-local point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceParams {
    pub force: [f32; 3],
    #[serde(default)]
    pub point: [f32; 3],
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorParams {
    pub value: [f32; 3],
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarParams {
    pub value: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagParams {
    pub value: bool,
}

/// Collision filter bits. Signed on the wire so `-1` means "all bits".
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskParams {
    pub value: i32,
}

impl MaskParams {
    pub fn bits(&self) -> u32 {
        self.value as u32
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuaternionParams {
    /// (x, y, z, w)
    pub value: [f32; 4],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointToPointParams {
    pub body_a: String,
    pub body_b: String,
    #[serde(default)]
    pub pivot_a: [f32; 3],
    #[serde(default)]
    pub pivot_b: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HingeParams {
    pub body_a: String,
    pub body_b: String,
    #[serde(default)]
    pub pivot_a: [f32; 3],
    #[serde(default)]
    pub pivot_b: [f32; 3],
    #[serde(default = "default_hinge_axis")]
    pub axis_a: [f32; 3],
    #[serde(default = "default_hinge_axis")]
    pub axis_b: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockParams {
    pub body_a: String,
    pub body_b: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceParams {
    pub body_a: String,
    pub body_b: String,
    pub distance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConeTwistParams {
    pub body_a: String,
    pub body_b: String,
    #[serde(default)]
    pub pivot_a: [f32; 3],
    #[serde(default)]
    pub pivot_b: [f32; 3],
    #[serde(default = "default_twist_axis")]
    pub axis_a: [f32; 3],
    #[serde(default = "default_twist_axis")]
    pub axis_b: [f32; 3],
    /// Cone half-angle around the twist axis, radians.
    #[serde(default = "default_cone_angle")]
    pub angle: f32,
    #[serde(default = "default_twist_angle")]
    pub twist_angle: f32,
}

/// Spring between two bodies. Anchors may be given in world space (converted
/// at creation time) or directly in each body's local space; local wins when
/// both are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpringParams {
    pub body_a: String,
    pub body_b: String,
    #[serde(default = "default_spring_rest_length")]
    pub rest_length: f32,
    #[serde(default = "default_spring_stiffness")]
    pub stiffness: f32,
    #[serde(default = "default_unit")]
    pub damping: f32,
    #[serde(default)]
    pub local_anchor_a: Option<[f32; 3]>,
    #[serde(default)]
    pub local_anchor_b: Option<[f32; 3]>,
    #[serde(default)]
    pub world_anchor_a: Option<[f32; 3]>,
    #[serde(default)]
    pub world_anchor_b: Option<[f32; 3]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WheelParams {
    /// Identifier of the body mirroring this wheel in the consumer's scene.
    pub body: String,
    /// Chassis-space connection point of the suspension.
    pub position: [f32; 3],
    #[serde(default = "default_wheel_direction")]
    pub direction: [f32; 3],
    #[serde(default = "default_wheel_axle")]
    pub axle: [f32; 3],
    #[serde(default = "default_suspension_rest_length")]
    pub suspension_rest_length: f32,
    #[serde(default = "default_wheel_radius")]
    pub radius: f32,
    #[serde(default = "default_suspension_stiffness")]
    pub suspension_stiffness: f32,
    #[serde(default = "default_suspension_compression")]
    pub suspension_compression: f32,
    #[serde(default = "default_suspension_damping")]
    pub suspension_damping: f32,
    #[serde(default = "default_max_suspension_travel")]
    pub max_suspension_travel: f32,
    #[serde(default = "default_friction_slip")]
    pub friction_slip: f32,
    #[serde(default = "default_side_friction_stiffness")]
    pub side_friction_stiffness: f32,
    #[serde(default = "default_max_suspension_force")]
    pub max_suspension_force: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleParams {
    pub chassis_body: String,
    pub wheels: Vec<WheelParams>,
}

/// Steering / engine force / brake applied to one wheel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WheelValueParams {
    pub value: f32,
    pub wheel_index: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RayParams {
    pub from: [f32; 3],
    pub to: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubscriptionTarget {
    #[default]
    #[serde(rename = "bodies")]
    Bodies,
    #[serde(rename = "vehicles")]
    Vehicles,
    #[serde(rename = "springInstances")]
    SpringInstances,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeParams {
    pub id: u32,
    /// Identifier of the observed object.
    pub uuid: String,
    /// Property name, e.g. `velocity` or `quaternion`.
    pub property: String,
    #[serde(default)]
    pub target: SubscriptionTarget,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsubscribeParams {
    pub id: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadphaseParams {
    pub broadphase: Broadphase,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisIndexParams {
    pub value: u32,
}
