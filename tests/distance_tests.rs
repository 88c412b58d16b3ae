//! Tests for the distance index and its fallback policies.

use collection_routes::distance::{haversine_km, DistanceIndex, EdgeSource, FallbackPolicy};
use collection_routes::error::OptimizerError;
use collection_routes::problem::{DistanceEdge, Problem, Zone};

/// Three zones, with only 1 -> 2 and 3 -> 2 measured.
fn create_test_problem() -> Problem {
    let zones = vec![
        Zone::new(1, "North", 4.70, -74.05),
        Zone::new(2, "Center", 4.65, -74.08),
        Zone::new(3, "South", 4.60, -74.10),
    ];
    let edges = vec![
        DistanceEdge::new(1, 2, 6.5, 18.0),
        DistanceEdge::new(3, 2, 5.0, 14.0),
    ];

    Problem::new(zones, edges).unwrap()
}

#[test]
fn test_lookup_forward_then_reverse() {
    let index = DistanceIndex::new(&create_test_problem(), FallbackPolicy::Reject).unwrap();

    let forward = index.lookup(1, 2).unwrap();
    assert_eq!(forward.source, EdgeSource::Forward);
    assert_eq!(forward.distance_km, 6.5);
    assert_eq!(forward.time_min, 18.0);

    let reverse = index.lookup(2, 1).unwrap();
    assert_eq!(reverse.source, EdgeSource::Reverse);
    assert_eq!(reverse.distance_km, 6.5);
    assert_eq!(reverse.time_min, 18.0);
}

#[test]
fn test_forward_measurement_wins_over_reverse() {
    let zones = vec![Zone::new(1, "A", 0.0, 0.0), Zone::new(2, "B", 0.0, 0.1)];
    let edges = vec![
        DistanceEdge::new(1, 2, 3.0, 9.0),
        DistanceEdge::new(2, 1, 4.0, 12.0),
    ];
    let problem = Problem::new(zones, edges).unwrap();
    let index = DistanceIndex::new(&problem, FallbackPolicy::Reject).unwrap();

    assert_eq!(index.lookup(1, 2).unwrap().distance_km, 3.0);
    assert_eq!(index.lookup(2, 1).unwrap().distance_km, 4.0);
}

#[test]
fn test_fixed_fallback() {
    let policy = FallbackPolicy::Fixed {
        distance_km: 3.0,
        time_min: 10.0,
    };
    let index = DistanceIndex::new(&create_test_problem(), policy).unwrap();

    let leg = index.lookup(1, 3).unwrap();
    assert_eq!(leg.source, EdgeSource::Estimated);
    assert_eq!(leg.distance_km, 3.0);
    assert_eq!(leg.time_min, 10.0);
}

#[test]
fn test_haversine_fallback_is_deterministic_and_symmetric() {
    let policy = FallbackPolicy::Haversine {
        speed_kmh: 30.0,
        detour_factor: 1.0,
    };
    let index = DistanceIndex::new(&create_test_problem(), policy).unwrap();

    let there = index.lookup(1, 3).unwrap();
    let back = index.lookup(3, 1).unwrap();
    assert_eq!(there.source, EdgeSource::Estimated);
    assert_eq!(there, back);
    assert_eq!(there, index.lookup(1, 3).unwrap());

    let expected = haversine_km((4.70, -74.05), (4.60, -74.10));
    assert!((there.distance_km - expected).abs() < 1e-9);
    assert!((there.time_min - expected / 30.0 * 60.0).abs() < 1e-9);
}

#[test]
fn test_haversine_known_distance() {
    // One degree of latitude is roughly 111.2 km.
    let d = haversine_km((0.0, 0.0), (1.0, 0.0));
    assert!((d - 111.195).abs() < 0.01, "got {}", d);
    assert_eq!(haversine_km((10.0, 20.0), (10.0, 20.0)), 0.0);
}

#[test]
fn test_reject_policy_fails_lookup_of_missing_pair() {
    let index = DistanceIndex::new(&create_test_problem(), FallbackPolicy::Reject).unwrap();
    assert!(matches!(
        index.lookup(1, 3),
        Err(OptimizerError::Evaluation { .. })
    ));
}

#[test]
fn test_unknown_zone_lookup_fails() {
    let index = DistanceIndex::new(&create_test_problem(), FallbackPolicy::default()).unwrap();
    assert!(index.lookup(1, 99).is_err());
    assert!(!index.contains(99));
    assert!(index.contains(2));
}

#[test]
fn test_missing_pairs() {
    let index = DistanceIndex::new(&create_test_problem(), FallbackPolicy::default()).unwrap();

    assert_eq!(index.missing_pairs(&[1, 2, 3]), vec![(1, 3)]);
    assert!(index.missing_pairs(&[1, 2]).is_empty());
}

#[test]
fn test_duplicate_directed_edge_is_rejected() {
    let zones = vec![Zone::new(1, "A", 0.0, 0.0), Zone::new(2, "B", 0.0, 0.1)];
    let edges = vec![
        DistanceEdge::new(1, 2, 3.0, 9.0),
        DistanceEdge::new(1, 2, 3.5, 9.5),
    ];
    let problem = Problem::new(zones, edges).unwrap();

    assert!(matches!(
        DistanceIndex::new(&problem, FallbackPolicy::default()),
        Err(OptimizerError::Validation { .. })
    ));
}

#[test]
fn test_invalid_policy_is_a_configuration_error() {
    let policy = FallbackPolicy::Haversine {
        speed_kmh: 0.0,
        detour_factor: 1.2,
    };
    assert!(matches!(
        DistanceIndex::new(&create_test_problem(), policy),
        Err(OptimizerError::Configuration { .. })
    ));
}
