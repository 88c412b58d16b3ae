//! Tests for objective evaluation.

use collection_routes::distance::{DistanceIndex, FallbackPolicy};
use collection_routes::encoding::RouteEncoder;
use collection_routes::error::OptimizerError;
use collection_routes::objective::{Evaluator, ObjectiveVector};
use collection_routes::problem::{DistanceEdge, Problem, Zone};

/// Four zones on a line, 1 km apart, 3 minutes per km.
/// Zone 3 carries a 1000 minute penalty.
fn create_test_problem() -> Problem {
    let zones = vec![
        Zone::new(1, "A", 0.0, 0.00),
        Zone::new(2, "B", 0.0, 0.01).with_penalty(5.0),
        Zone::new(3, "C", 0.0, 0.02).with_penalty(1000.0),
        Zone::new(4, "D", 0.0, 0.03),
    ];

    let mut edges = Vec::new();
    for a in 1..=4u32 {
        for b in (a + 1)..=4 {
            let km = (b - a) as f64;
            edges.push(DistanceEdge::new(a, b, km, km * 3.0));
        }
    }

    Problem::new(zones, edges).unwrap()
}

fn create_evaluator(closed_tour: bool) -> Evaluator {
    let problem = create_test_problem();
    let index = DistanceIndex::new(&problem, FallbackPolicy::Reject).unwrap();
    let encoder = RouteEncoder::new(&problem.zone_ids()).unwrap();
    Evaluator::new(&problem, index, encoder, closed_tour).unwrap()
}

#[test]
fn test_open_path() {
    let evaluator = create_evaluator(false);

    let evaluation = evaluator.evaluate_route(&[1, 2, 3, 4]).unwrap();
    assert_eq!(evaluation.objectives.distance_km, 3.0);
    assert_eq!(evaluation.objectives.time_min, 9.0 + 1005.0);
    assert_eq!(evaluation.estimated_legs, 0);

    let evaluation = evaluator.evaluate_route(&[1, 3, 2, 4]).unwrap();
    assert_eq!(evaluation.objectives.distance_km, 2.0 + 1.0 + 2.0);
}

#[test]
fn test_closed_tour_adds_return_leg() {
    let evaluator = create_evaluator(true);
    assert!(evaluator.closed_tour());

    let evaluation = evaluator.evaluate_route(&[1, 2, 3, 4]).unwrap();
    assert_eq!(evaluation.objectives.distance_km, 3.0 + 3.0);
    assert_eq!(evaluation.objectives.time_min, 18.0 + 1005.0);
}

#[test]
fn test_penalty_is_counted_once_regardless_of_position() {
    let evaluator = create_evaluator(false);

    for route in [[3, 1, 2, 4], [1, 3, 2, 4], [1, 2, 4, 3]] {
        let evaluation = evaluator.evaluate_route(&route).unwrap();
        let traversal = evaluation.objectives.distance_km * 3.0;
        assert_eq!(evaluation.objectives.time_min, traversal + 1005.0);
    }
}

#[test]
fn test_estimated_legs_are_counted() {
    let zones = vec![
        Zone::new(1, "A", 0.0, 0.0),
        Zone::new(2, "B", 0.0, 0.1),
        Zone::new(3, "C", 0.0, 0.2),
    ];
    let problem = Problem::new(zones, vec![DistanceEdge::new(1, 2, 1.0, 2.0)]).unwrap();
    let policy = FallbackPolicy::Fixed {
        distance_km: 10.0,
        time_min: 20.0,
    };
    let index = DistanceIndex::new(&problem, policy).unwrap();
    let encoder = RouteEncoder::new(&problem.zone_ids()).unwrap();
    let evaluator = Evaluator::new(&problem, index, encoder, false).unwrap();

    let evaluation = evaluator.evaluate_route(&[1, 2, 3]).unwrap();
    assert_eq!(evaluation.estimated_legs, 1);
    assert_eq!(evaluation.objectives, ObjectiveVector::new(11.0, 22.0));
}

#[test]
fn test_corrupted_chromosome_is_an_evaluation_error() {
    let evaluator = create_evaluator(false);

    assert!(matches!(
        evaluator.evaluate(&[0, 1, 1, 3]),
        Err(OptimizerError::Evaluation { .. })
    ));
    assert!(matches!(
        evaluator.evaluate(&[0, 1, 2]),
        Err(OptimizerError::Evaluation { .. })
    ));
    assert!(evaluator.evaluate_route(&[1, 2, 3, 9]).is_err());
}

#[test]
fn test_evaluate_all_keeps_order() {
    let evaluator = create_evaluator(false);
    let chromosomes = vec![vec![0, 1, 2, 3], vec![0, 2, 1, 3], vec![3, 2, 1, 0]];

    let batch = evaluator.evaluate_all(&chromosomes).unwrap();
    for (chromosome, evaluation) in chromosomes.iter().zip(batch) {
        assert_eq!(evaluation, evaluator.evaluate(chromosome).unwrap());
    }
}

#[test]
fn test_dominance() {
    let a = ObjectiveVector::new(1.0, 2.0);
    let b = ObjectiveVector::new(1.0, 3.0);
    let c = ObjectiveVector::new(0.5, 4.0);

    assert!(a.dominates(&b));
    assert!(!b.dominates(&a));
    assert!(!a.dominates(&a));
    assert!(!a.dominates(&c));
    assert!(!c.dominates(&a));
}

#[test]
fn test_objective_vector_get_by_index() {
    let objectives = ObjectiveVector::new(12.5, 40.0);
    assert_eq!(objectives.get(0), 12.5);
    assert_eq!(objectives.get(1), 40.0);
}

#[test]
#[should_panic(expected = "objective index 2 out of range")]
fn test_objective_vector_get_rejects_unknown_index() {
    ObjectiveVector::new(12.5, 40.0).get(2);
}
