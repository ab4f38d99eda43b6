//! Damped spring between two bodies.
//!
//! rapier has no built-in spring element, so the worker applies the spring
//! force explicitly before every fixed sub-step. Forces accumulate on the
//! bodies and are cleared again after the sub-step integrates them.

use rapier3d::prelude::*;

pub struct Spring {
    pub body_a: RigidBodyHandle,
    pub body_b: RigidBodyHandle,
    /// Anchor in body A's local frame.
    pub local_anchor_a: Vector<Real>,
    /// Anchor in body B's local frame.
    pub local_anchor_b: Vector<Real>,
    pub rest_length: f32,
    pub stiffness: f32,
    pub damping: f32,
}

impl Spring {
    /// Apply the spring force to both anchor points. A spring whose body was
    /// removed does nothing until the spring itself is removed.
    pub fn apply_force(&self, bodies: &mut RigidBodySet) {
        let (pose_a, vel_a, ang_a) = match bodies.get(self.body_a) {
            Some(rb) => (*rb.position(), *rb.linvel(), *rb.angvel()),
            None => return,
        };
        let (pose_b, vel_b, ang_b) = match bodies.get(self.body_b) {
            Some(rb) => (*rb.position(), *rb.linvel(), *rb.angvel()),
            None => return,
        };

        let anchor_a = pose_a * Point::from(self.local_anchor_a);
        let anchor_b = pose_b * Point::from(self.local_anchor_b);

        let separation = anchor_b - anchor_a;
        let length = separation.norm();
        if length <= f32::EPSILON {
            return;
        }
        let axis = separation / length;

        // Relative velocity of the anchor points along the spring axis.
        let arm_a = anchor_a - Point::from(pose_a.translation.vector);
        let arm_b = anchor_b - Point::from(pose_b.translation.vector);
        let anchor_vel_a = vel_a + ang_a.cross(&arm_a);
        let anchor_vel_b = vel_b + ang_b.cross(&arm_b);
        let relative_speed = (anchor_vel_b - anchor_vel_a).dot(&axis);

        // Negative when stretched: pulls B towards A.
        let magnitude = -self.stiffness * (length - self.rest_length) - self.damping * relative_speed;
        let force_on_b = axis * magnitude;

        if let Some(rb) = bodies.get_mut(self.body_a) {
            rb.add_force_at_point(-force_on_b, anchor_a, true);
        }
        if let Some(rb) = bodies.get_mut(self.body_b) {
            rb.add_force_at_point(force_on_b, anchor_b, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stretched_spring_pulls_bodies_together() {
        let mut bodies = RigidBodySet::new();
        let a = bodies.insert(
            RigidBodyBuilder::dynamic()
                .translation(vector![0.0, 0.0, 0.0])
                .additional_mass(1.0)
                .build(),
        );
        let b = bodies.insert(
            RigidBodyBuilder::dynamic()
                .translation(vector![4.0, 0.0, 0.0])
                .additional_mass(1.0)
                .build(),
        );

        let spring = Spring {
            body_a: a,
            body_b: b,
            local_anchor_a: vector![0.0, 0.0, 0.0],
            local_anchor_b: vector![0.0, 0.0, 0.0],
            rest_length: 1.0,
            stiffness: 10.0,
            damping: 0.0,
        };
        spring.apply_force(&mut bodies);

        // Stretched by 3: body A is pulled towards +x, body B towards -x.
        assert!(bodies.get(a).unwrap().user_force().x > 0.0);
        assert!(bodies.get(b).unwrap().user_force().x < 0.0);
    }
}
