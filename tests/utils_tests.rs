//! Tests for result formatting and export.

use collection_routes::config::Config;
use collection_routes::problem::{DistanceEdge, Problem, Zone};
use collection_routes::utils::{format_duration, format_front, save_result};
use collection_routes::{OptimizationResult, ParetoOptimizer};
use std::fs;
use std::time::Duration;

fn run_small_problem() -> OptimizationResult {
    let zones = vec![
        Zone::new(1, "A", 4.60, -74.10),
        Zone::new(2, "B", 4.61, -74.09).with_penalty(20.0),
        Zone::new(3, "C", 4.62, -74.08),
        Zone::new(4, "D", 4.63, -74.07),
    ];
    let edges = vec![
        DistanceEdge::new(1, 2, 1.0, 9.0),
        DistanceEdge::new(1, 3, 2.0, 3.0),
        DistanceEdge::new(2, 3, 1.0, 8.0),
        DistanceEdge::new(2, 4, 2.0, 2.0),
        DistanceEdge::new(3, 4, 1.0, 7.0),
    ];
    let problem = Problem::new(zones, edges).unwrap();
    let config = Config::new()
        .with_population_size(6)
        .with_generations(5)
        .with_seed(10);

    ParetoOptimizer::new(problem, config).unwrap().run().unwrap()
}

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(Duration::from_millis(0)), "0h 00m 00.000s");
    assert_eq!(format_duration(Duration::from_millis(3_723_045)), "1h 02m 03.045s");
}

#[test]
fn test_format_front_marks_best_route() {
    let result = run_small_problem();
    let text = format_front(&result);

    assert!(text.starts_with(&format!(
        "Pareto front: {} routes",
        result.pareto_front.len()
    )));
    assert!(text.lines().any(|line| line.starts_with('*')));
    assert!(text.contains("1 zone pairs priced with"));
}

#[test]
fn test_save_result_writes_json() {
    let result = run_small_problem();
    let path = std::env::temp_dir().join(format!("collection_routes_{}_result.json", std::process::id()));

    save_result(&result, &path).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        json["pareto_front"].as_array().unwrap().len(),
        result.pareto_front.len()
    );
    assert_eq!(json["best"]["route"].as_array().unwrap().len(), 4);
    assert_eq!(json["missing_pairs"], 1);

    fs::remove_file(path).ok();
}

#[test]
fn test_saved_result_reads_back() {
    let result = run_small_problem();
    let path = std::env::temp_dir().join(format!("collection_routes_{}_reload.json", std::process::id()));

    save_result(&result, &path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    fs::remove_file(&path).ok();

    let loaded: OptimizationResult = serde_json::from_str(&text).unwrap();
    assert_eq!(loaded.pareto_front.len(), result.pareto_front.len());
    for (read, written) in loaded.pareto_front.iter().zip(&result.pareto_front) {
        assert_eq!(read.route, written.route);
        assert_eq!(
            read.crowding_distance.is_infinite(),
            written.crowding_distance.is_infinite()
        );
        assert!((read.objectives.time_min - written.objectives.time_min).abs() < 1e-9);
    }
    assert_eq!(loaded.best.route, result.best.route);
    assert_eq!(loaded.warnings, result.warnings);
}
