use marl_viewer::domains::agent::{Agent, AgentId, AgentKind, AgentStore, LatLng, Waypoint};
use marl_viewer::domains::motion::{MotionEngine, MotionParams};
use std::time::{Duration, Instant};

fn vehicle(id: &str, lat: f64, lng: f64) -> Agent {
    Agent::new(AgentId::from(id), LatLng::new(lat, lng), AgentKind::Vehicle)
}

fn wp(lat: f64, lng: f64) -> Waypoint {
    Waypoint::new(lat, lng, 0.0)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}

#[test]
fn test_vehicle_reaches_single_waypoint_and_requests_renewal() {
    let engine = MotionEngine::default();
    let store: AgentStore = vec![vehicle("v1", 0.0, 0.0).with_path(vec![wp(0.0, 0.001)])]
        .into_iter()
        .collect();

    let outcome = engine.tick(&store, 3.0, Instant::now());
    let next = outcome.store.expect("vehicle should have moved");
    let agent = next.get("v1").unwrap();

    assert_eq!(agent.position, LatLng::new(0.0, 0.001));
    assert!(agent.path.is_none());
    assert!(agent.path_cursor.is_none());
    assert!(agent.awaiting_path);
    assert_eq!(outcome.completed, vec![AgentId::from("v1")]);
    assert_eq!(outcome.renewals, vec![AgentId::from("v1")]);
}

#[test]
fn test_partial_step_moves_along_segment() {
    let engine = MotionEngine::default();
    let store: AgentStore = vec![vehicle("v1", 0.0, 0.0).with_path(vec![wp(0.0, 0.001)])]
        .into_iter()
        .collect();

    let next = engine.tick(&store, 0.4, Instant::now()).store.unwrap();
    let agent = next.get("v1").unwrap();

    assert!(approx(agent.position.lat, 0.0));
    assert!(approx(agent.position.lng, 0.0002));
    assert_eq!(agent.path_cursor, Some(0));
    assert!(!agent.awaiting_path);
}

#[test]
fn test_exact_arrival_splits_evenly() {
    // Unit speed keeps the arithmetic exact.
    let params = MotionParams {
        vehicle_speed: 1.0,
        arrival_threshold: 0.0,
        ..MotionParams::default()
    };
    let engine = MotionEngine::new(params);
    let store: AgentStore = vec![vehicle("v1", 0.0, 0.0).with_path(vec![wp(0.0, 0.5), wp(0.0, 1.0)])]
        .into_iter()
        .collect();

    let after_half = engine.tick(&store, 0.25, Instant::now()).store.unwrap();
    assert_eq!(after_half.get("v1").unwrap().position, LatLng::new(0.0, 0.25));
    assert_eq!(after_half.get("v1").unwrap().path_cursor, Some(0));

    let at_first = engine.tick(&after_half, 0.25, Instant::now()).store.unwrap();
    let agent = at_first.get("v1").unwrap();
    assert_eq!(agent.position, LatLng::new(0.0, 0.5));
    assert_eq!(agent.path_cursor, Some(1));
}

#[test]
fn test_one_waypoint_per_tick_even_with_spare_distance() {
    let engine = MotionEngine::default();
    let store: AgentStore = vec![vehicle("v1", 0.0, 0.0)
        .with_path(vec![wp(0.0, 0.0001), wp(0.0, 0.0002), wp(0.0, 0.0003)])]
    .into_iter()
    .collect();

    let next = engine.tick(&store, 5.0, Instant::now()).store.unwrap();
    let agent = next.get("v1").unwrap();
    assert_eq!(agent.position, LatLng::new(0.0, 0.0001));
    assert_eq!(agent.path_cursor, Some(1));
}

#[test]
fn test_zero_delta_changes_nothing() {
    let engine = MotionEngine::default();
    let idle = {
        let mut a = vehicle("idle", 1.0, 1.0);
        a.awaiting_path = true;
        a
    };
    let store: AgentStore = vec![vehicle("v1", 0.0, 0.0).with_path(vec![wp(0.0, 0.001)]), idle]
        .into_iter()
        .collect();

    for dt in [0.0, -1.0, f64::NAN] {
        let outcome = engine.tick(&store, dt, Instant::now());
        assert!(!outcome.changed());
        assert!(outcome.renewals.is_empty());
        assert!(outcome.completed.is_empty());
    }
}

#[test]
fn test_fleeing_doubles_speed() {
    let engine = MotionEngine::default();
    let calm = vehicle("calm", 0.0, 0.0).with_path(vec![wp(0.0, 0.01)]);
    let fleeing = vehicle("flee", 0.0, 0.0).with_path(vec![wp(0.0, 0.01)]).fleeing(true);
    let store: AgentStore = vec![calm, fleeing].into_iter().collect();

    let next = engine.tick(&store, 1.0, Instant::now()).store.unwrap();
    assert!(approx(next.get("calm").unwrap().position.lng, 0.0005));
    assert!(approx(next.get("flee").unwrap().position.lng, 0.001));
}

#[test]
fn test_pedestrian_speed() {
    let engine = MotionEngine::default();
    let ped = Agent::new(AgentId::from("p"), LatLng::new(0.0, 0.0), AgentKind::Pedestrian)
        .with_path(vec![wp(0.001, 0.0)]);
    let store: AgentStore = vec![ped].into_iter().collect();

    let next = engine.tick(&store, 2.0, Instant::now()).store.unwrap();
    assert!(approx(next.get("p").unwrap().position.lat, 0.0002));
}

#[test]
fn test_agent_without_path_stays_put() {
    let engine = MotionEngine::default();
    let store: AgentStore = vec![vehicle("still", 3.0, 4.0)].into_iter().collect();

    let outcome = engine.tick(&store, 1.0, Instant::now());
    assert!(outcome.store.is_none());
    // Never had a path, so it is not waiting on one either.
    assert!(outcome.renewals.is_empty());
}

#[test]
fn test_renewal_respects_cooldown() {
    let engine = MotionEngine::default();
    let t0 = Instant::now();
    let mut idle = vehicle("idle", 0.0, 0.0);
    idle.awaiting_path = true;
    idle.last_path_request = Some(t0);
    let store: AgentStore = vec![idle].into_iter().collect();

    let too_soon = engine.tick(&store, 0.016, t0 + Duration::from_millis(2_999));
    assert!(too_soon.renewals.is_empty());

    let at_boundary = engine.tick(&store, 0.016, t0 + Duration::from_millis(3_000));
    assert!(at_boundary.renewals.is_empty());

    let after = engine.tick(&store, 0.016, t0 + Duration::from_millis(3_001));
    assert_eq!(after.renewals, vec![AgentId::from("idle")]);
    // Asking for a path alone does not change the store.
    assert!(after.store.is_none());
}

#[test]
fn test_fleeing_idle_agent_does_not_ask() {
    let engine = MotionEngine::default();
    let mut idle = vehicle("idle", 0.0, 0.0).fleeing(true);
    idle.awaiting_path = true;
    let store: AgentStore = vec![idle].into_iter().collect();

    let outcome = engine.tick(&store, 0.5, Instant::now());
    assert!(outcome.renewals.is_empty());
}

#[test]
fn test_exhausted_path_within_cooldown_does_not_ask() {
    let engine = MotionEngine::default();
    let t0 = Instant::now();
    let mut agent = vehicle("v1", 0.0, 0.0).with_path(vec![wp(0.0, 0.00001)]);
    agent.last_path_request = Some(t0);
    let store: AgentStore = vec![agent].into_iter().collect();

    let outcome = engine.tick(&store, 0.1, t0 + Duration::from_millis(500));
    assert_eq!(outcome.completed, vec![AgentId::from("v1")]);
    assert!(outcome.renewals.is_empty());
    assert!(outcome.store.unwrap().get("v1").unwrap().awaiting_path);
}

#[test]
fn test_input_store_is_not_modified() {
    let engine = MotionEngine::default();
    let store: AgentStore = vec![vehicle("v1", 0.0, 0.0).with_path(vec![wp(0.0, 0.001)])]
        .into_iter()
        .collect();
    let before = store.clone();

    let _ = engine.tick(&store, 1.0, Instant::now());
    assert_eq!(store, before);
}

#[test]
fn test_within_threshold_snaps_even_with_tiny_delta() {
    let engine = MotionEngine::default();
    let ped = Agent::new(AgentId::from("p"), LatLng::new(0.0, 0.0), AgentKind::Pedestrian)
        .with_path(vec![wp(0.0, 0.00004), wp(0.0, 0.001)]);
    let store: AgentStore = vec![ped].into_iter().collect();

    // 1e-9 s covers far less than the 0.00004 gap; only the threshold lets it arrive.
    let next = engine.tick(&store, 1e-9, Instant::now()).store.unwrap();
    let agent = next.get("p").unwrap();
    assert_eq!(agent.position, LatLng::new(0.0, 0.00004));
    assert_eq!(agent.path_cursor, Some(1));
}

#[test]
fn test_frame_by_frame_walk_ends_exactly_on_last_waypoint() {
    let engine = MotionEngine::default();
    let path = vec![
        Waypoint::new(37.7752, -122.419, 4.0),
        Waypoint::new(37.7752, -122.4187, 5.0),
        Waypoint::new(37.7755, -122.4187, 6.0),
    ];
    let last = path[2].position();
    let mut store: AgentStore = vec![vehicle("v1", 37.775, -122.419).with_path(path)]
        .into_iter()
        .collect();

    let now = Instant::now();
    let mut renewals = Vec::new();
    for _ in 0..1_000 {
        let outcome = engine.tick(&store, 1.0 / 60.0, now);
        renewals.extend(outcome.renewals);
        if let Some(next) = outcome.store {
            store = next;
        }
        if store.get("v1").unwrap().path.is_none() {
            break;
        }
    }

    let agent = store.get("v1").unwrap();
    assert_eq!(agent.position, last);
    assert!(agent.path.is_none());
    assert!(agent.path_cursor.is_none());
    assert!(agent.awaiting_path);
    assert_eq!(renewals, vec![AgentId::from("v1")]);
}
