use super::*;
use crate::protocol::*;

fn init_event(gravity: [f32; 3]) -> WorkerEvent {
    WorkerEvent::Init {
        params: InitParams { gravity, ..InitParams::default() },
    }
}

fn add_box_event(uuid: &str, mass: f32, position: [f32; 3]) -> WorkerEvent {
    WorkerEvent::AddBox {
        uuid: uuid.into(),
        params: BoxParams {
            body: BodyCommon { mass, position, ..BodyCommon::default() },
            half_extents: [0.5, 0.5, 0.5],
        },
    }
}

fn step_event(time_elapsed: f32) -> WorkerEvent {
    WorkerEvent::Step {
        params: StepParams { time_elapsed, positions: Vec::new(), quaternions: Vec::new() },
    }
}

fn live_core(gravity: [f32; 3]) -> WorkerCore {
    let mut core = WorkerCore::new();
    core.handle_event(init_event(gravity));
    core
}

fn only_frame(outputs: Vec<WorkerOutput>) -> (Vec<f32>, Vec<f32>, Vec<Observation>, bool, Option<Vec<String>>) {
    for output in outputs {
        if let WorkerOutput::Frame { positions, quaternions, observations, active, bodies } = output {
            return (positions, quaternions, observations, active, bodies);
        }
    }
    panic!("no frame in outputs");
}

const DT: f32 = 1.0 / 60.0;

#[test]
fn pre_init_events_are_buffered_and_applied_in_order() {
    let mut core = WorkerCore::new();

    assert!(core.handle_event(add_box_event("a", 1.0, [0.0, 0.0, 0.0])).is_empty());
    assert!(core.handle_event(add_box_event("b", 1.0, [1.0, 0.0, 0.0])).is_empty());
    assert!(core.handle_event(add_box_event("c", 1.0, [2.0, 0.0, 0.0])).is_empty());
    assert!(!core.initialized());
    assert_eq!(core.pending_len(), 3);

    core.handle_event(init_event([0.0, 0.0, 0.0]));
    assert!(core.initialized());
    assert_eq!(core.pending_len(), 0);

    let state = core.state().unwrap();
    let order: Vec<&str> = state.bodies.iter().map(|(uuid, _)| uuid).collect();
    assert_eq!(order, ["a", "b", "c"]);
}

#[test]
fn pre_init_step_produces_no_output_then_runs_exactly_once() {
    let mut core = WorkerCore::new();

    assert!(core.handle_event(add_box_event("a", 1.0, [0.0, 10.0, 0.0])).is_empty());
    assert!(core.handle_event(step_event(DT)).is_empty());

    // Init drains the queue: the buffered step runs now, once.
    let outputs = core.handle_event(init_event([0.0, -10.0, 0.0]));
    let frames = outputs
        .iter()
        .filter(|output| matches!(output, WorkerOutput::Frame { .. }))
        .count();
    assert_eq!(frames, 1);

    let (_, _, _, _, bodies) = only_frame(outputs);
    assert_eq!(bodies.as_deref(), Some(&["a".to_string()][..]));
}

#[test]
fn buffers_hold_three_and_four_entries_per_body_in_creation_order() {
    let mut core = live_core([0.0, 0.0, 0.0]);
    core.handle_event(add_box_event("a", 1.0, [0.0, 1.0, 0.0]));
    core.handle_event(add_box_event("b", 1.0, [5.0, 2.0, 0.0]));
    core.handle_event(add_box_event("c", 1.0, [-3.0, 3.0, 0.0]));

    let (positions, quaternions, _, _, _) = only_frame(core.handle_event(step_event(DT)));
    assert_eq!(positions.len(), 9);
    assert_eq!(quaternions.len(), 12);

    // No gravity, no velocity: bodies stay put, slot i follows creation order.
    assert!((positions[0] - 0.0).abs() < 1e-5 && (positions[1] - 1.0).abs() < 1e-5);
    assert!((positions[3] - 5.0).abs() < 1e-5 && (positions[4] - 2.0).abs() < 1e-5);
    assert!((positions[6] + 3.0).abs() < 1e-5 && (positions[7] - 3.0).abs() < 1e-5);
    // Identity orientation, (x, y, z, w).
    assert!((quaternions[3] - 1.0).abs() < 1e-5);
    assert!(quaternions[0].abs() < 1e-5);
}

#[test]
fn roster_is_sent_only_when_membership_changes() {
    let mut core = live_core([0.0, 0.0, 0.0]);
    core.handle_event(add_box_event("a", 1.0, [0.0, 0.0, 0.0]));

    let (_, _, _, _, bodies) = only_frame(core.handle_event(step_event(DT)));
    assert_eq!(bodies.as_deref(), Some(&["a".to_string()][..]));

    let (_, _, _, _, bodies) = only_frame(core.handle_event(step_event(DT)));
    assert!(bodies.is_none());

    core.handle_event(add_box_event("b", 1.0, [1.0, 0.0, 0.0]));
    core.handle_event(WorkerEvent::RemoveBody { uuid: "a".into() });
    let (positions, _, _, _, bodies) = only_frame(core.handle_event(step_event(DT)));
    assert_eq!(bodies.as_deref(), Some(&["b".to_string()][..]));
    // Body "b" moved into slot 0.
    assert!((positions[0] - 1.0).abs() < 1e-5);

    let (_, _, _, _, bodies) = only_frame(core.handle_event(step_event(DT)));
    assert!(bodies.is_none());
}

#[test]
fn velocity_subscription_tracks_an_applied_impulse() {
    let mut core = live_core([0.0, 0.0, 0.0]);
    core.handle_event(add_box_event("ball", 1.0, [0.0, 0.0, 0.0]));
    core.handle_event(WorkerEvent::Subscribe {
        params: SubscribeParams {
            id: 7,
            uuid: "ball".into(),
            property: "velocity".into(),
            target: SubscriptionTarget::Bodies,
        },
    });
    core.handle_event(WorkerEvent::ApplyImpulse {
        uuid: "ball".into(),
        params: ImpulseParams { impulse: [5.0, 0.0, 0.0], point: [0.0; 3] },
    });

    let (_, _, observations, _, _) = only_frame(core.handle_event(step_event(DT)));
    assert_eq!(observations.len(), 1);
    let Observation(id, value, property) = &observations[0];
    assert_eq!(*id, 7);
    assert_eq!(property, "velocity");
    match value {
        ObservedValue::Triple([vx, vy, vz]) => {
            // Unit mass: the impulse becomes ~5 m/s along +x (minus damping).
            assert!(*vx > 4.0 && *vx <= 5.0, "vx = {vx}");
            assert!(vy.abs() < 1e-4 && vz.abs() < 1e-4);
        }
        other => panic!("expected a 3-tuple, got {:?}", other),
    }
}

#[test]
fn unsubscribe_stops_further_observations() {
    let mut core = live_core([0.0, 0.0, 0.0]);
    core.handle_event(add_box_event("a", 1.0, [0.0, 0.0, 0.0]));
    core.handle_event(WorkerEvent::Subscribe {
        params: SubscribeParams {
            id: 1,
            uuid: "a".into(),
            property: "position".into(),
            target: SubscriptionTarget::Bodies,
        },
    });

    let (_, _, observations, _, _) = only_frame(core.handle_event(step_event(DT)));
    assert_eq!(observations.len(), 1);

    core.handle_event(WorkerEvent::Unsubscribe { params: UnsubscribeParams { id: 1 } });
    let (_, _, observations, _, _) = only_frame(core.handle_event(step_event(DT)));
    assert!(observations.is_empty());
}

#[test]
fn subscription_to_absent_body_is_skipped_silently() {
    let mut core = live_core([0.0, 0.0, 0.0]);
    core.handle_event(WorkerEvent::Subscribe {
        params: SubscribeParams {
            id: 2,
            uuid: "ghost".into(),
            property: "velocity".into(),
            target: SubscriptionTarget::Bodies,
        },
    });
    let (_, _, observations, _, _) = only_frame(core.handle_event(step_event(DT)));
    assert!(observations.is_empty());
}

#[test]
fn disabling_an_unknown_constraint_is_a_no_op() {
    let mut core = live_core([0.0, 0.0, 0.0]);
    core.handle_event(add_box_event("a", 1.0, [0.0, 0.0, 0.0]));
    core.handle_event(add_box_event("b", 1.0, [2.0, 0.0, 0.0]));
    core.handle_event(WorkerEvent::AddPointToPointConstraint {
        uuid: "c1".into(),
        params: PointToPointParams {
            body_a: "a".into(),
            body_b: "b".into(),
            pivot_a: [1.0, 0.0, 0.0],
            pivot_b: [-1.0, 0.0, 0.0],
        },
    });

    core.handle_event(WorkerEvent::DisableConstraint { uuid: "nope".into() });

    let state = core.state().unwrap();
    assert!(state.constraints["c1"].is_enabled());
    assert_eq!(state.world.impulse_joints.len(), 1);
}

#[test]
fn constraint_disable_enable_round_trip() {
    let mut core = live_core([0.0, 0.0, 0.0]);
    core.handle_event(add_box_event("a", 1.0, [0.0, 0.0, 0.0]));
    core.handle_event(add_box_event("b", 1.0, [2.0, 0.0, 0.0]));
    core.handle_event(WorkerEvent::AddHingeConstraint {
        uuid: "h1".into(),
        params: HingeParams {
            body_a: "a".into(),
            body_b: "b".into(),
            pivot_a: [1.0, 0.0, 0.0],
            pivot_b: [-1.0, 0.0, 0.0],
            axis_a: [0.0, 1.0, 0.0],
            axis_b: [0.0, 1.0, 0.0],
        },
    });

    core.handle_event(WorkerEvent::DisableConstraint { uuid: "h1".into() });
    {
        let state = core.state().unwrap();
        assert!(!state.constraints["h1"].is_enabled());
        assert_eq!(state.world.impulse_joints.len(), 0);
    }

    core.handle_event(WorkerEvent::EnableConstraint { uuid: "h1".into() });
    let state = core.state().unwrap();
    assert!(state.constraints["h1"].is_enabled());
    assert_eq!(state.world.impulse_joints.len(), 1);
}

#[test]
fn motor_topics_on_a_motorless_constraint_are_tolerated() {
    let mut core = live_core([0.0, 0.0, 0.0]);
    core.handle_event(add_box_event("a", 1.0, [0.0, 0.0, 0.0]));
    core.handle_event(add_box_event("b", 1.0, [2.0, 0.0, 0.0]));
    core.handle_event(WorkerEvent::AddPointToPointConstraint {
        uuid: "c1".into(),
        params: PointToPointParams {
            body_a: "a".into(),
            body_b: "b".into(),
            pivot_a: [0.0; 3],
            pivot_b: [0.0; 3],
        },
    });

    core.handle_event(WorkerEvent::EnableConstraintMotor { uuid: "c1".into() });
    core.handle_event(WorkerEvent::SetConstraintMotorSpeed {
        uuid: "c1".into(),
        params: ScalarParams { value: 2.0 },
    });
    assert!(core.state().unwrap().constraints.contains_key("c1"));
}

#[test]
fn falling_box_descends_monotonically_under_gravity() {
    let mut core = live_core([0.0, -10.0, 0.0]);
    core.handle_event(add_box_event("crate", 1.0, [0.0, 10.0, 0.0]));

    let mut previous_y = 10.0f32;
    for _ in 0..60 {
        let (positions, _, _, active, _) = only_frame(core.handle_event(step_event(DT)));
        let y = positions[1];
        assert!(y < previous_y, "y did not decrease: {y} >= {previous_y}");
        previous_y = y;
        assert!(active);
    }
    assert!(previous_y < 9.0, "box barely moved: y = {previous_y}");
}

#[test]
fn unknown_identifier_mutation_does_not_abort_the_loop() {
    let mut core = live_core([0.0, 0.0, 0.0]);

    core.handle_event(WorkerEvent::ApplyImpulse {
        uuid: "missing".into(),
        params: ImpulseParams { impulse: [1.0, 0.0, 0.0], point: [0.0; 3] },
    });
    core.handle_event(WorkerEvent::RemoveBody { uuid: "missing".into() });

    // The worker is still live and processes the next message.
    core.handle_event(add_box_event("a", 1.0, [0.0, 0.0, 0.0]));
    assert_eq!(core.state().unwrap().bodies.len(), 1);
}

#[test]
fn spring_pulls_bodies_together_over_steps() {
    let mut core = live_core([0.0, 0.0, 0.0]);
    core.handle_event(add_box_event("a", 1.0, [0.0, 0.0, 0.0]));
    core.handle_event(add_box_event("b", 1.0, [4.0, 0.0, 0.0]));
    core.handle_event(WorkerEvent::AddSpring {
        uuid: "s1".into(),
        params: SpringParams {
            body_a: "a".into(),
            body_b: "b".into(),
            rest_length: 1.0,
            stiffness: 50.0,
            damping: 0.5,
            local_anchor_a: None,
            local_anchor_b: None,
            world_anchor_a: None,
            world_anchor_b: None,
        },
    });

    let mut gap = 4.0f32;
    for _ in 0..30 {
        let (positions, _, _, _, _) = only_frame(core.handle_event(step_event(DT)));
        gap = positions[3] - positions[0];
    }
    assert!(gap < 3.5, "spring did not contract: gap = {gap}");
}

#[test]
fn spring_parameter_setters_mutate_the_instance() {
    let mut core = live_core([0.0, 0.0, 0.0]);
    core.handle_event(add_box_event("a", 1.0, [0.0, 0.0, 0.0]));
    core.handle_event(add_box_event("b", 1.0, [2.0, 0.0, 0.0]));
    core.handle_event(WorkerEvent::AddSpring {
        uuid: "s1".into(),
        params: SpringParams {
            body_a: "a".into(),
            body_b: "b".into(),
            rest_length: 1.0,
            stiffness: 100.0,
            damping: 1.0,
            local_anchor_a: Some([0.1, 0.0, 0.0]),
            local_anchor_b: None,
            world_anchor_a: None,
            world_anchor_b: None,
        },
    });
    core.handle_event(WorkerEvent::SetSpringStiffness {
        uuid: "s1".into(),
        params: ScalarParams { value: 250.0 },
    });
    core.handle_event(WorkerEvent::SetSpringRestLength {
        uuid: "s1".into(),
        params: ScalarParams { value: 2.0 },
    });

    let spring = &core.state().unwrap().springs["s1"];
    assert_eq!(spring.stiffness, 250.0);
    assert_eq!(spring.rest_length, 2.0);
    assert_eq!(spring.local_anchor_a.x, 0.1);
}

#[test]
fn broadphase_setter_records_selection_with_fallback() {
    let mut core = live_core([0.0, 0.0, 0.0]);

    core.handle_event(WorkerEvent::SetBroadphase {
        params: BroadphaseParams { broadphase: Broadphase::from_name("SAP") },
    });
    assert_eq!(core.state().unwrap().config.broadphase, Broadphase::Sap);

    core.handle_event(WorkerEvent::SetBroadphase {
        params: BroadphaseParams { broadphase: Broadphase::from_name("Octree") },
    });
    assert_eq!(core.state().unwrap().config.broadphase, Broadphase::Naive);
}

#[test]
fn set_gravity_takes_effect_on_later_steps() {
    let mut core = live_core([0.0, 0.0, 0.0]);
    core.handle_event(add_box_event("a", 1.0, [0.0, 10.0, 0.0]));

    let (positions, _, _, _, _) = only_frame(core.handle_event(step_event(DT)));
    assert!((positions[1] - 10.0).abs() < 1e-4);

    core.handle_event(WorkerEvent::SetGravity { params: VectorParams { value: [0.0, -10.0, 0.0] } });
    let mut y = 10.0;
    for _ in 0..10 {
        let (positions, _, _, _, _) = only_frame(core.handle_event(step_event(DT)));
        y = positions[1];
    }
    assert!(y < 10.0 - 1e-3);
}

#[test]
fn sleep_event_puts_the_body_to_sleep() {
    let mut core = live_core([0.0, 0.0, 0.0]);
    core.handle_event(add_box_event("a", 1.0, [0.0, 0.0, 0.0]));
    core.handle_event(WorkerEvent::Sleep { uuid: "a".into() });

    let state = core.state().unwrap();
    let handle = state.bodies.get("a").unwrap();
    assert!(state.world.bodies.get(handle).unwrap().is_sleeping());
}

#[test]
fn registered_ray_reports_hits_each_step() {
    let mut core = live_core([0.0, 0.0, 0.0]);
    core.handle_event(add_box_event("wall", 0.0, [0.0, 0.0, 5.0]));
    core.handle_event(WorkerEvent::AddRay {
        uuid: "r1".into(),
        params: RayParams { from: [0.0, 0.0, 0.0], to: [0.0, 0.0, 10.0] },
    });

    let outputs = core.handle_event(step_event(DT));
    let ray_hit = outputs
        .iter()
        .find_map(|output| match output {
            WorkerOutput::RayHit { uuid, hit } if uuid == "r1" => Some(hit.clone()),
            _ => None,
        })
        .expect("rayhit message missing");
    let hit = ray_hit.expect("ray should intersect the wall");
    assert_eq!(hit.body.as_deref(), Some("wall"));
    assert!((hit.distance - 4.5).abs() < 1e-3, "distance = {}", hit.distance);

    core.handle_event(WorkerEvent::RemoveRay { uuid: "r1".into() });
    let outputs = core.handle_event(step_event(DT));
    assert!(!outputs.iter().any(|output| matches!(output, WorkerOutput::RayHit { .. })));
}

#[test]
fn second_init_is_ignored() {
    let mut core = live_core([0.0, -5.0, 0.0]);
    core.handle_event(add_box_event("a", 1.0, [0.0, 0.0, 0.0]));

    core.handle_event(init_event([0.0, 0.0, 0.0]));
    let state = core.state().unwrap();
    assert_eq!(state.bodies.len(), 1);
    assert_eq!(state.config.gravity, [0.0, -5.0, 0.0]);
}
