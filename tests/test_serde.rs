#![cfg(feature = "serde")]

use std::time::Duration;

use swarmsearch::{
    optimiser::{
        parallel_swarm_search::Initialisation, OptimiseResult, Optimiser, ParallelSwarmSearch,
        SwarmOptions, Termination,
    },
    problem::{Bounds, SphereFunction},
};

#[test]
fn test_options_round_trip_through_json() {
    let options = SwarmOptions::builder()
        .swarm_size(25)
        .neighbourhood_probability(0.3)
        .migration_stall(4)
        .seed(8)
        .initialisation(Initialisation::Hammersley)
        .trace_path("swarm.trace")
        .build();
    let json = serde_json::to_string(&options).unwrap();
    let restored: SwarmOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, options);

    let termination = Termination::default()
        .with_acceptable_fitness(1e-3)
        .with_maximal_duration(Duration::from_secs(2));
    let json = serde_json::to_string(&termination).unwrap();
    let restored: Termination = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, termination);
}

#[test]
fn test_result_and_bounds_serialise() {
    let bounds = Bounds::uniform(2, -1.0, 1.0).unwrap();
    let restored: Bounds = serde_json::from_str(&serde_json::to_string(&bounds).unwrap()).unwrap();
    assert_eq!(restored, bounds);

    let problem = SphereFunction::with_bounds(bounds);
    let options = SwarmOptions::builder().swarm_size(5).threads(1).seed(2).build();
    let result = ParallelSwarmSearch::new(options, Termination::default().with_maximal_iterations(10))
        .optimise(&problem)
        .unwrap();

    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"stop_reason\":\"MaximalIterations\""));
    let restored: OptimiseResult = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, result);
}

#[test]
fn test_default_termination_keeps_its_infinite_target() {
    let termination = Termination::default();
    assert_eq!(termination.acceptable_fitness(), f64::NEG_INFINITY);

    let json = serde_json::to_string(&termination).unwrap();
    assert!(json.contains("\"acceptable_fitness\":\"-inf\""));
    let restored: Termination = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, termination);
}

#[test]
fn test_unevaluated_result_round_trips() {
    let result = OptimiseResult::new(2, f64::NEG_INFINITY);
    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"best_position\":[\"NaN\",\"NaN\"]"));
    assert!(json.contains("\"best_fitness\":\"inf\""));

    let restored: OptimiseResult = serde_json::from_str(&json).unwrap();
    assert!(restored.best_position.iter().all(|x| x.is_nan()));
    assert_eq!(restored.best_fitness, f64::INFINITY);
    assert_eq!(restored.acceptable_fitness, f64::NEG_INFINITY);
    assert_eq!(restored.iterations, 0);
    assert_eq!(restored.stop_reason, None);
}

#[test]
fn test_integer_fitness_and_unknown_strings() {
    let json = r#"{"acceptable_fitness":2,"maximal_iterations":5,"maximal_evaluations":0,"maximal_duration":{"secs":0,"nanos":0}}"#;
    let termination: Termination = serde_json::from_str(json).unwrap();
    assert_eq!(termination.acceptable_fitness(), 2.0);

    let json = json.replace(":2,", ":\"infinity\",");
    assert!(serde_json::from_str::<Termination>(&json).is_err());
}
