//! Joint construction for the constraint topics.
//!
//! A registry entry keeps the built [`GenericJoint`] next to the live handle
//! so disable/enable can remove the joint from the world and later re-insert
//! the identical joint. Motorized kinds record which axis the motor drives.

use rapier3d::prelude::*;

/// Registry entry: live handle (when enabled) plus everything needed to
/// rebuild the joint.
pub struct ConstraintEntry {
    pub handle: Option<ImpulseJointHandle>,
    pub body_a: RigidBodyHandle,
    pub body_b: RigidBodyHandle,
    pub joint: GenericJoint,
    pub motor_axis: Option<JointAxis>,
}

impl ConstraintEntry {
    pub fn new(
        body_a: RigidBodyHandle,
        body_b: RigidBodyHandle,
        joint: GenericJoint,
        motor_axis: Option<JointAxis>,
    ) -> Self {
        Self { handle: None, body_a, body_b, joint, motor_axis }
    }

    pub fn is_enabled(&self) -> bool {
        self.handle.is_some()
    }
}

pub fn point_to_point_joint(pivot_a: Point<Real>, pivot_b: Point<Real>) -> GenericJoint {
    SphericalJointBuilder::new()
        .local_anchor1(pivot_a)
        .local_anchor2(pivot_b)
        .build()
        .into()
}

/// Hinge with independent local axes on each body.
pub fn hinge_joint(
    pivot_a: Point<Real>,
    axis_a: Vector<Real>,
    pivot_b: Point<Real>,
    axis_b: Vector<Real>,
) -> GenericJoint {
    let axis_a = UnitVector::new_normalize(axis_a);
    let axis_b = UnitVector::new_normalize(axis_b);
    GenericJointBuilder::new(JointAxesMask::LOCKED_REVOLUTE_AXES)
        .local_anchor1(pivot_a)
        .local_anchor2(pivot_b)
        .local_axis1(axis_a)
        .local_axis2(axis_b)
        .build()
}

/// Freeze the current relative pose of the two bodies.
pub fn lock_joint(pose_a: &Isometry<Real>, pose_b: &Isometry<Real>) -> GenericJoint {
    FixedJointBuilder::new()
        .local_frame1(pose_a.inv_mul(pose_b))
        .local_frame2(Isometry::identity())
        .build()
        .into()
}

/// Rope joint keeping the two body origins within `distance` of each other.
pub fn distance_joint(distance: f32) -> GenericJoint {
    RopeJointBuilder::new().limits([0.0, distance]).build().into()
}

/// Ball joint limited to a swing cone and a twist range.
pub fn cone_twist_joint(
    pivot_a: Point<Real>,
    pivot_b: Point<Real>,
    angle: f32,
    twist_angle: f32,
) -> GenericJoint {
    let mut joint: GenericJoint = SphericalJointBuilder::new()
        .local_anchor1(pivot_a)
        .local_anchor2(pivot_b)
        .build()
        .into();
    joint.set_limits(JointAxis::AngX, [-twist_angle, twist_angle]);
    joint.set_limits(JointAxis::AngY, [-angle, angle]);
    joint.set_limits(JointAxis::AngZ, [-angle, angle]);
    joint
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_joint_preserves_relative_pose() {
        let pose_a = Isometry::translation(1.0, 0.0, 0.0);
        let pose_b = Isometry::translation(1.0, 2.0, 0.0);
        let joint = lock_joint(&pose_a, &pose_b);
        let frame = joint.local_frame1;
        assert!((frame.translation.vector - vector![0.0, 2.0, 0.0]).norm() < 1e-6);
    }

    #[test]
    fn cone_twist_limits_are_symmetric() {
        let joint = cone_twist_joint(point![0.0, 0.0, 0.0], point![0.0, 0.0, 0.0], 0.5, 1.0);
        let twist = joint.limits(JointAxis::AngX).expect("twist limit set");
        assert!((twist.min + 1.0).abs() < 1e-6 && (twist.max - 1.0).abs() < 1e-6);
    }
}
