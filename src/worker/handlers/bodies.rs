//! Body lifecycle handlers, one per shape topic.
//!
//! The identifier arrives with the event (the consumer generates it before
//! posting, so it can reference the body immediately); creation inserts it
//! into the registry and marks the roster dirty for the next frame.

use rapier3d::prelude::*;

use crate::error::WorkerError;
use crate::physics::{collider_from_def, unit_quat, vec3, ShapeDef};
use crate::protocol::{
    BodyCommon, BodyType, BoxParams, CompoundParams, CylinderParams, HeightfieldParams,
    PlaneParams, SphereParams, TrimeshParams,
};

use super::SharedState;

pub(crate) fn add_box(state: &mut SharedState, uuid: String, params: BoxParams) -> Result<(), WorkerError> {
    add_body(state, uuid, params.body, ShapeDef::Box { half_extents: params.half_extents })
}

pub(crate) fn add_sphere(state: &mut SharedState, uuid: String, params: SphereParams) -> Result<(), WorkerError> {
    add_body(state, uuid, params.body, ShapeDef::Sphere { radius: params.radius })
}

pub(crate) fn add_plane(state: &mut SharedState, uuid: String, params: PlaneParams) -> Result<(), WorkerError> {
    add_body(state, uuid, params.body, ShapeDef::Plane)
}

pub(crate) fn add_cylinder(state: &mut SharedState, uuid: String, params: CylinderParams) -> Result<(), WorkerError> {
    add_body(
        state,
        uuid,
        params.body,
        ShapeDef::Cylinder {
            radius_top: params.radius_top,
            radius_bottom: params.radius_bottom,
            height: params.height,
        },
    )
}

pub(crate) fn add_heightfield(state: &mut SharedState, uuid: String, params: HeightfieldParams) -> Result<(), WorkerError> {
    add_body(
        state,
        uuid,
        params.body,
        ShapeDef::Heightfield { data: params.data, element_size: params.element_size },
    )
}

pub(crate) fn add_trimesh(state: &mut SharedState, uuid: String, params: TrimeshParams) -> Result<(), WorkerError> {
    add_body(
        state,
        uuid,
        params.body,
        ShapeDef::Trimesh { vertices: params.vertices, indices: params.indices },
    )
}

pub(crate) fn add_compound(state: &mut SharedState, uuid: String, params: CompoundParams) -> Result<(), WorkerError> {
    add_body(state, uuid, params.body, ShapeDef::Compound { children: params.shapes })
}

pub(crate) fn remove_body(state: &mut SharedState, uuid: &str) -> Result<(), WorkerError> {
    let handle = state
        .bodies
        .remove(uuid)
        .ok_or_else(|| WorkerError::UnknownBody(uuid.into()))?;
    state.world.remove_body(handle);
    state.bodies_need_syncing = true;
    Ok(())
}

fn resolve_body_type(common: &BodyCommon) -> BodyType {
    common.body_type.unwrap_or(if common.mass > 0.0 { BodyType::Dynamic } else { BodyType::Static })
}

fn add_body(
    state: &mut SharedState,
    uuid: String,
    common: BodyCommon,
    def: ShapeDef,
) -> Result<(), WorkerError> {
    let collider = collider_from_def(def)?;

    let builder = match resolve_body_type(&common) {
        BodyType::Dynamic => RigidBodyBuilder::dynamic(),
        BodyType::Static => RigidBodyBuilder::fixed(),
        BodyType::Kinematic => RigidBodyBuilder::kinematic_position_based(),
    };
    let pose = Isometry::from_parts(vec3(common.position).into(), unit_quat(common.rotation));
    let body = builder
        .position(pose)
        .linvel(vec3(common.velocity))
        .angvel(vec3(common.angular_velocity))
        .linear_damping(common.linear_damping)
        .angular_damping(common.angular_damping)
        .additional_mass(common.mass)
        .can_sleep(common.allow_sleep && state.config.allow_sleep)
        .build();

    let material = common.material.unwrap_or(state.config.default_contact_material);
    let groups = InteractionGroups::new(
        Group::from_bits_truncate(common.collision_filter_group as u32),
        Group::from_bits_truncate(common.collision_filter_mask as u32),
    );
    let collider = collider
        .friction(material.friction)
        .restitution(material.restitution)
        .collision_groups(groups)
        .sensor(!common.collision_response)
        .build();

    let world = &mut state.world;
    let handle = world.bodies.insert(body);
    world.colliders.insert_with_parent(collider, handle, &mut world.bodies);

    state.bodies.insert(uuid, handle);
    state.bodies_need_syncing = true;
    Ok(())
}
