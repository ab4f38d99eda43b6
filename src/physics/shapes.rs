//! Collision shape construction.
//!
//! Wire payloads describe shapes the way the consumer thinks about them
//! (box half-extents, heightfield sample grid, flat trimesh arrays); this
//! module turns a [`ShapeDef`] into a rapier collider builder. Mass is
//! carried on the rigid body, so every collider is built with zero density.

use rapier3d::na::DMatrix;
use rapier3d::prelude::*;

use crate::error::WorkerError;
use crate::protocol::{ChildShape, CompoundChild};

use super::{unit_quat, vec3};

/// Shape description decoupled from the per-topic wire payloads.
#[derive(Debug, Clone)]
pub enum ShapeDef {
    Box { half_extents: [f32; 3] },
    Sphere { radius: f32 },
    /// Infinite plane facing local +z, oriented by the body rotation.
    Plane,
    Cylinder { radius_top: f32, radius_bottom: f32, height: f32 },
    Heightfield { data: Vec<Vec<f32>>, element_size: f32 },
    Trimesh { vertices: Vec<f32>, indices: Vec<u32> },
    Compound { children: Vec<CompoundChild> },
}

pub fn collider_from_def(def: ShapeDef) -> Result<ColliderBuilder, WorkerError> {
    let builder = match def {
        ShapeDef::Box { half_extents } => {
            ColliderBuilder::cuboid(half_extents[0], half_extents[1], half_extents[2])
        }
        ShapeDef::Sphere { radius } => ColliderBuilder::ball(radius),
        ShapeDef::Plane => ColliderBuilder::halfspace(Vector::z_axis()),
        ShapeDef::Cylinder { radius_top, radius_bottom, height } => {
            ColliderBuilder::cylinder(height * 0.5, 0.5 * (radius_top + radius_bottom))
        }
        ShapeDef::Heightfield { data, element_size } => {
            let nrows = data.len();
            let ncols = data.first().map_or(0, Vec::len);
            if nrows < 2 || ncols < 2 {
                return Err(WorkerError::InvalidShape(
                    "heightfield needs at least a 2x2 sample grid".into(),
                ));
            }
            let heights = DMatrix::from_fn(nrows, ncols, |i, j| {
                data[i].get(j).copied().unwrap_or(0.0)
            });
            let scale = vector![
                element_size * (ncols - 1) as f32,
                1.0,
                element_size * (nrows - 1) as f32
            ];
            ColliderBuilder::heightfield(heights, scale)
        }
        ShapeDef::Trimesh { vertices, indices } => {
            if vertices.len() < 9 || indices.len() < 3 {
                return Err(WorkerError::InvalidShape(
                    "trimesh needs at least one triangle".into(),
                ));
            }
            let points: Vec<Point<Real>> = vertices
                .chunks_exact(3)
                .map(|v| point![v[0], v[1], v[2]])
                .collect();
            let triangles: Vec<[u32; 3]> = indices
                .chunks_exact(3)
                .map(|t| [t[0], t[1], t[2]])
                .collect();
            ColliderBuilder::trimesh(points, triangles)
        }
        ShapeDef::Compound { children } => {
            if children.is_empty() {
                return Err(WorkerError::InvalidShape("compound with no children".into()));
            }
            let shapes = children
                .iter()
                .map(|child| {
                    let pose = Isometry::from_parts(
                        vec3(child.offset).into(),
                        unit_quat(child.quaternion),
                    );
                    (pose, shared_shape(&child.shape))
                })
                .collect();
            ColliderBuilder::compound(shapes)
        }
    };
    Ok(builder.density(0.0))
}

fn shared_shape(shape: &ChildShape) -> SharedShape {
    match *shape {
        ChildShape::Box { half_extents } => {
            SharedShape::cuboid(half_extents[0], half_extents[1], half_extents[2])
        }
        ChildShape::Sphere { radius } => SharedShape::ball(radius),
        ChildShape::Cylinder { radius, height } => SharedShape::cylinder(height * 0.5, radius),
    }
}
