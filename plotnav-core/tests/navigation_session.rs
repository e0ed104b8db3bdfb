use std::sync::Arc;

use approx::assert_abs_diff_eq;
use chrono::{DateTime, Utc};
use plotnav_core::{
    geodesy::offset_meters,
    navigation::{DistanceUnit, FallbackReason, RelativeDirection},
    prelude::*,
};

const ORIGIN: Coordinate = Coordinate::new(10.950012, 123.337212);

fn at(east: f64, north: f64) -> Coordinate {
    offset_meters(ORIGIN, east, north)
}

fn ts(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_700_000_000_000 + ms).unwrap()
}

fn sample(east: f64, north: f64, ms: i64) -> PositionSample {
    PositionSample::new(at(east, north), ts(ms)).with_accuracy(3.0)
}

/// Road north from the origin for 100 m, then east for 100 m
fn l_shaped_graph() -> Arc<StreetGraph> {
    let roads = vec![vec![at(0.0, 0.0), at(0.0, 100.0), at(100.0, 100.0)]];
    Arc::new(build_graph(&roads, &GraphConfig::default()))
}

// Log output with RUST_LOG=debug
fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn session_with_target() -> NavigationSession<String> {
    init();
    let mut session = NavigationSession::new(l_shaped_graph(), NavigationConfig::default());
    session.start(&mut sample(0.0, -2.0, 0)).unwrap();
    let source = session
        .set_target(NavigationTarget::new(at(100.0, 102.0), "Plot A-12".to_string()))
        .unwrap();
    assert_eq!(source, RouteSource::Graph);
    session
}

fn guidance<T: std::fmt::Debug>(outcome: UpdateOutcome<T>) -> NavigationEvent<T> {
    match outcome {
        UpdateOutcome::Guidance(event) => event,
        other => panic!("expected guidance, got {other:?}"),
    }
}

#[test]
fn contract_violations_fail_fast() {
    let mut session: NavigationSession<String> =
        NavigationSession::new(l_shaped_graph(), NavigationConfig::default());

    assert_eq!(
        session.on_position_update(sample(0.0, 0.0, 0), None),
        Err(NavigationError::NotStarted)
    );
    assert_eq!(
        session.set_target(NavigationTarget::new(at(0.0, 50.0), String::new())),
        Err(NavigationError::NotStarted)
    );

    session.start(&mut sample(0.0, 0.0, 0)).unwrap();
    assert_eq!(
        session.start(&mut sample(0.0, 0.0, 0)),
        Err(NavigationError::AlreadyStarted)
    );
}

#[test]
fn start_retries_then_reports_position_error() {
    let mut session: NavigationSession<()> =
        NavigationSession::new(l_shaped_graph(), NavigationConfig::default());

    let mut calls = 0;
    let mut failing = || -> Result<PositionSample, PositionError> {
        calls += 1;
        Err(PositionError::Timeout)
    };
    assert_eq!(
        session.start(&mut failing),
        Err(NavigationError::PositionUnavailable(PositionError::Timeout))
    );
    assert_eq!(calls, 3);
    assert_eq!(session.state(), SessionState::Idle);

    let mut attempts = 0;
    let mut flaky = || -> Result<PositionSample, PositionError> {
        attempts += 1;
        if attempts < 3 {
            Err(PositionError::Unavailable)
        } else {
            Ok(sample(0.0, 0.0, 0))
        }
    };
    assert!(session.start(&mut flaky).is_ok());
    assert_eq!(session.state(), SessionState::Tracking);
}

#[test]
fn tracking_without_target_updates_heading() {
    let mut session: NavigationSession<()> =
        NavigationSession::new(l_shaped_graph(), NavigationConfig::default());
    session.start(&mut sample(0.0, 0.0, 0)).unwrap();

    let outcome = session
        .on_position_update(sample(0.0, 1.0, 1000), Some(90.0))
        .unwrap();
    assert_eq!(
        outcome,
        UpdateOutcome::Tracked {
            sequence: 2,
            heading: Some(90.0)
        }
    );
}

#[test]
fn heading_smoothing_wraps_through_north() {
    let mut session: NavigationSession<()> =
        NavigationSession::new(l_shaped_graph(), NavigationConfig::default());
    session.start(&mut sample(0.0, 0.0, 0)).unwrap();

    session
        .on_position_update(sample(0.0, 0.0, 1000), Some(350.0))
        .unwrap();
    session
        .on_position_update(sample(0.0, 0.0, 2000), Some(10.0))
        .unwrap();
    assert_abs_diff_eq!(session.heading().unwrap(), 354.0, epsilon = 1e-9);
}

#[test]
fn course_is_used_only_while_moving() {
    let mut session: NavigationSession<()> =
        NavigationSession::new(l_shaped_graph(), NavigationConfig::default());
    session.start(&mut sample(0.0, 0.0, 0)).unwrap();

    let slow = sample(0.0, 1.0, 1000).with_motion(1.0, 90.0);
    session.on_position_update(slow, None).unwrap();
    assert_eq!(session.heading(), None);

    let moving = sample(0.0, 3.0, 2000).with_motion(2.0, 90.0);
    session.on_position_update(moving, None).unwrap();
    assert_eq!(session.heading(), Some(90.0));

    session
        .on_position_update(sample(0.0, 5.0, 3000), Some(0.0))
        .unwrap();
    let moving = sample(0.0, 7.0, 4000).with_motion(2.0, 100.0);
    session.on_position_update(moving, None).unwrap();
    // compass: 90 + 0.2 * -90 = 72; course: 72 + 0.3 * 28 = 80.4
    assert_abs_diff_eq!(session.heading().unwrap(), 80.4, epsilon = 1e-9);
}

#[test]
fn updates_are_throttled() {
    let mut session = session_with_target();

    let outcome = session.on_position_update(sample(0.0, 10.0, 400), None).unwrap();
    assert_eq!(outcome, UpdateOutcome::Throttled);
    assert_eq!(session.sample_count(), 1);

    let event = guidance(session.on_position_update(sample(0.0, 10.0, 1000), None).unwrap());
    assert_eq!(event.sequence, 2);
}

#[test]
fn instructions_follow_the_route() {
    let session = session_with_target();
    let actions: Vec<TurnAction> = session.instructions().iter().map(|i| i.action).collect();
    assert_eq!(
        actions,
        vec![
            TurnAction::Straight,
            TurnAction::Right,
            TurnAction::Left,
            TurnAction::Arrive
        ]
    );
    assert_eq!(session.route().unwrap().node_ids(), &[0, 1, 2]);
}

#[test]
fn announces_upcoming_turn_near_its_end_point() {
    let mut session = session_with_target();

    let event = guidance(
        session
            .on_position_update(sample(0.0, 30.0, 1000), Some(0.0))
            .unwrap(),
    );
    assert_eq!(event.state, SessionState::Targeting);
    assert!(!event.arrived);
    assert!(!event.rerouted);

    let event = guidance(
        session
            .on_position_update(sample(0.0, 70.0, 2000), Some(0.0))
            .unwrap(),
    );
    match event.hint {
        GuidanceHint::Upcoming(instruction) => assert_eq!(instruction.action, TurnAction::Right),
        GuidanceHint::Continue => panic!("expected upcoming right turn"),
    }
    assert_eq!(event.instruction_text, "Turn right in 30 m");
    assert_eq!(event.direction, RelativeDirection::Right);
    assert_eq!(event.direction_arrow(), '→');
    assert_eq!(event.display_distance.unit, DistanceUnit::Meters);
}

#[test]
fn far_from_any_turn_gives_relative_direction() {
    let roads = vec![vec![at(0.0, 0.0), at(0.0, 300.0)]];
    let graph = Arc::new(build_graph(&roads, &GraphConfig::default()));
    let mut session = NavigationSession::new(graph, NavigationConfig::default());
    session.start(&mut sample(0.0, 0.0, 0)).unwrap();
    session
        .set_target(NavigationTarget::new(at(0.0, 300.0), ()))
        .unwrap();

    let event = guidance(
        session
            .on_position_update(sample(0.0, 120.0, 1000), Some(0.0))
            .unwrap(),
    );
    assert_eq!(event.hint, GuidanceHint::Continue);
    assert_eq!(event.direction, RelativeDirection::Straight);
    assert_eq!(event.instruction_text, "Head straight");
    assert_abs_diff_eq!(event.distance_remaining, 180.0, epsilon = 0.05);
}

#[test]
fn arrival_fires_once_then_session_ends_after_grace() {
    let mut session = session_with_target();

    let event = guidance(session.on_position_update(sample(100.0, 100.0, 1000), None).unwrap());
    assert!(event.arrived);
    assert_eq!(event.state, SessionState::Arrived);
    let arrival = event.arrival.expect("arrival event");
    assert_eq!(arrival.metadata, "Plot A-12");
    assert_eq!(arrival.arrived_at, ts(1000));

    for ms in [2000, 3000, 4000] {
        let event = guidance(session.on_position_update(sample(100.0, 100.0, ms), None).unwrap());
        assert!(event.arrived);
        assert!(event.arrival.is_none());
    }

    assert_eq!(
        session.on_position_update(sample(100.0, 100.0, 6000), None),
        Ok(UpdateOutcome::Ended)
    );
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.target().is_none());
    assert_eq!(
        session.on_position_update(sample(100.0, 100.0, 7000), None),
        Err(NavigationError::NotStarted)
    );
}

#[test]
fn tick_ends_session_after_grace() {
    let mut session = session_with_target();
    session.on_position_update(sample(100.0, 101.0, 1000), None).unwrap();
    assert_eq!(session.state(), SessionState::Arrived);

    assert_eq!(session.tick(ts(5999)), None);
    assert_eq!(session.tick(ts(6000)), Some(UpdateOutcome::Ended));
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn new_target_after_arrival_can_arrive_again() {
    let mut session = session_with_target();
    session.on_position_update(sample(100.0, 101.0, 1000), None).unwrap();
    assert_eq!(session.state(), SessionState::Arrived);

    session
        .set_target(NavigationTarget::new(at(0.0, 100.0), "Plot B-3".to_string()))
        .unwrap();
    assert_eq!(session.state(), SessionState::Targeting);

    let event = guidance(session.on_position_update(sample(0.0, 98.0, 2000), None).unwrap());
    assert_eq!(event.arrival.map(|a| a.metadata), Some("Plot B-3".to_string()));
}

#[test]
fn reroutes_after_confirmed_off_route_samples() {
    let mut session = session_with_target();

    let event = guidance(session.on_position_update(sample(70.0, 40.0, 1000), None).unwrap());
    assert_eq!(event.state, SessionState::Rerouting);
    assert!(!event.rerouted);

    let event = guidance(session.on_position_update(sample(70.0, 40.0, 2000), None).unwrap());
    assert!(event.rerouted);
    assert_eq!(event.state, SessionState::Targeting);
    assert_eq!(session.guidance()[0], at(70.0, 40.0));
    assert_eq!(session.route().unwrap().node_ids(), &[2]);
}

#[test]
fn returning_to_route_cancels_rerouting() {
    let mut session = session_with_target();

    session.on_position_update(sample(70.0, 40.0, 1000), None).unwrap();
    assert_eq!(session.state(), SessionState::Rerouting);

    let event = guidance(session.on_position_update(sample(0.0, 40.0, 2000), None).unwrap());
    assert_eq!(event.state, SessionState::Targeting);
    assert!(!event.rerouted);
}

#[test]
fn empty_graph_falls_back_to_direct_line() {
    let mut session = NavigationSession::new(
        Arc::new(build_graph::<Vec<Coordinate>>(&[], &GraphConfig::default())),
        NavigationConfig::default(),
    );
    session.start(&mut sample(0.0, 0.0, 0)).unwrap();

    let source = session
        .set_target(NavigationTarget::new(at(30.0, 40.0), 7_u32))
        .unwrap();
    assert_eq!(source, RouteSource::DirectFallback(FallbackReason::EmptyGraph));
    assert!(source.is_degraded());

    let route = session.route().unwrap();
    assert_eq!(route.coordinates(), &[at(0.0, 0.0), at(30.0, 40.0)]);
    assert_abs_diff_eq!(route.distance(), 50.0, epsilon = 0.01);
    assert_eq!(session.instructions().len(), 1);
    assert_eq!(session.instructions()[0].action, TurnAction::Arrive);

    match session.on_position_update(sample(3.0, 4.0, 1000), None).unwrap() {
        UpdateOutcome::Guidance(event) => {
            assert_eq!(event.route_source, source);
            assert_abs_diff_eq!(event.distance_remaining, 45.0, epsilon = 0.01);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn disconnected_target_falls_back_to_direct_line() {
    let roads = vec![
        vec![at(0.0, 0.0), at(0.0, 50.0)],
        vec![at(200.0, 0.0), at(200.0, 50.0)],
    ];
    let graph = Arc::new(build_graph(&roads, &GraphConfig::default()));
    let mut session = NavigationSession::new(graph, NavigationConfig::default());
    session.start(&mut sample(0.0, 0.0, 0)).unwrap();

    let source = session
        .set_target(NavigationTarget::new(at(200.0, 50.0), ()))
        .unwrap();
    assert_eq!(source, RouteSource::DirectFallback(FallbackReason::Unreachable));
}

#[test]
fn replacing_graph_replans_active_target() {
    let empty = Arc::new(build_graph::<Vec<Coordinate>>(&[], &GraphConfig::default()));
    let mut session = NavigationSession::new(empty, NavigationConfig::default());
    session.start(&mut sample(0.0, -2.0, 0)).unwrap();
    session
        .set_target(NavigationTarget::new(at(100.0, 102.0), ()))
        .unwrap();
    assert!(session.route_source().unwrap().is_degraded());

    assert_eq!(session.replace_graph(l_shaped_graph()), Some(RouteSource::Graph));
    assert_eq!(session.route().unwrap().node_ids(), &[0, 1, 2]);
}

#[test]
fn position_errors_leave_state_untouched() {
    let mut session = session_with_target();
    let report = session.on_position_error(PositionError::PermissionDenied);
    assert_eq!(report.error, PositionError::PermissionDenied);
    assert_eq!(report.reason, "Location permission was denied");
    assert_eq!(report.state, SessionState::Targeting);
    assert_eq!(session.state(), SessionState::Targeting);

    // Session keeps working after the failure
    assert!(matches!(
        session.on_position_update(sample(0.0, 20.0, 1000), None),
        Ok(UpdateOutcome::Guidance(_))
    ));
}

#[test]
fn stop_is_idempotent() {
    let mut session = session_with_target();
    session.stop();
    session.stop();
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.route().is_none());
    assert!(session.instructions().is_empty());
    assert!(session.target().is_none());

    session.start(&mut sample(0.0, 0.0, 10_000)).unwrap();
    assert_eq!(session.state(), SessionState::Tracking);
}

#[test]
fn clock_moving_back_restarts_throttle_window() {
    let mut session: NavigationSession<()> =
        NavigationSession::new(l_shaped_graph(), NavigationConfig::default());
    session.start(&mut sample(0.0, 0.0, 60_000)).unwrap();

    let outcome = session.on_position_update(sample(0.0, 5.0, 1000), None).unwrap();
    assert_eq!(
        outcome,
        UpdateOutcome::Tracked {
            sequence: 2,
            heading: None
        }
    );
    assert_eq!(session.position().unwrap().timestamp, ts(1000));

    // Throttling continues from the corrected clock
    assert_eq!(
        session.on_position_update(sample(0.0, 6.0, 1500), None),
        Ok(UpdateOutcome::Throttled)
    );
    assert!(matches!(
        session.on_position_update(sample(0.0, 7.0, 2000), None),
        Ok(UpdateOutcome::Tracked { sequence: 3, .. })
    ));
}

#[test]
fn clock_moving_back_after_arrival_still_ends_after_grace() {
    let mut session = session_with_target();
    session.on_position_update(sample(100.0, 101.0, 30_000), None).unwrap();
    assert_eq!(session.state(), SessionState::Arrived);

    session.on_position_update(sample(100.0, 101.0, 2000), None).unwrap();
    assert_eq!(session.state(), SessionState::Arrived);
    assert_eq!(session.tick(ts(6999)), None);
    assert_eq!(session.tick(ts(7000)), Some(UpdateOutcome::Ended));
}
