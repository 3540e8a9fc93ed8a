use std::fs;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use swarmsearch::{
    error::OptimiseError,
    island::{Coordinator, IslandHandle, LocalIslands},
    optimiser::{
        parallel_swarm_search::{Migration, Swarm},
        OptimiseResult, Optimiser, ParallelSwarmSearch, StopReason, SwarmOptions, Termination,
    },
    problem::{GriewankFunction, Problem, RastriginFunction, SphereFunction},
};

/// Runs `work` once per island, each on its own thread, and returns the results by rank.
fn on_islands<T, F>(size: usize, work: F) -> Vec<T>
where
    T: Send,
    F: Fn(&IslandHandle) -> T + Sync,
{
    let handles = LocalIslands::new(size).unwrap();
    thread::scope(|scope| {
        let workers: Vec<_> = handles
            .iter()
            .map(|handle| {
                let work = &work;
                scope.spawn(move || work(handle))
            })
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect()
    })
}

fn island_optimiser(handle: &IslandHandle, options: SwarmOptions, termination: Termination) -> ParallelSwarmSearch {
    ParallelSwarmSearch::new(options, termination).with_coordinator(Arc::new(handle.clone()))
}

#[test]
fn test_worse_island_adopts_winner() {
    let problem = RastriginFunction::new(4).unwrap();
    let options = SwarmOptions::builder().swarm_size(8).threads(1).build();

    // (migration, best position before, best fitness after, particle positions after, worst index before)
    let outcomes = on_islands(2, |handle| {
        let mut swarm = Swarm::new(&problem, &options, 1234, handle.rank()).unwrap();
        for _ in 0..5 {
            swarm.step();
        }
        let worst = swarm
            .particles()
            .iter()
            .enumerate()
            .fold(0, |worst, (n, particle)| {
                if particle.personal_best_fitness() > swarm.particles()[worst].personal_best_fitness() {
                    n
                } else {
                    worst
                }
            });
        let best_before = swarm.best_position().to_vec();
        let migration = swarm.migrate(handle).unwrap();
        let positions: Vec<Vec<f64>> = swarm
            .particles()
            .iter()
            .map(|particle| particle.personal_best_position().to_vec())
            .collect();
        (migration, best_before, swarm.best_fitness(), positions, worst)
    });

    let sent: Vec<usize> = outcomes
        .iter()
        .enumerate()
        .filter(|(_, outcome)| matches!(outcome.0, Migration::Sent { .. }))
        .map(|(rank, _)| rank)
        .collect();
    assert_eq!(sent.len(), 1);
    let winner = sent[0];
    let loser = 1 - winner;

    match outcomes[loser].0 {
        Migration::Received { owner, fitness, replaced } => {
            assert_eq!(owner, winner);
            assert_eq!(replaced, outcomes[loser].4);
            assert_eq!(outcomes[loser].3[replaced], outcomes[winner].1);
            assert_eq!(fitness, outcomes[winner].2);
            assert_eq!(problem.evaluate(&outcomes[loser].3[replaced]), fitness);
        }
        Migration::Sent { .. } => panic!("Expected the worse island to receive"),
    }
    assert_eq!(outcomes[loser].2, outcomes[winner].2);
}

#[test]
fn test_islands_finish_with_the_same_best() {
    let problem = GriewankFunction::new(5).unwrap();
    let results: Vec<OptimiseResult> = on_islands(3, |handle| {
        let options = SwarmOptions::builder().swarm_size(12).threads(2).seed(77).build();
        let termination = Termination::default().with_maximal_iterations(60);
        island_optimiser(handle, options, termination)
            .optimise(&problem)
            .unwrap()
    });

    for result in &results {
        assert_eq!(result.iterations, 60);
        assert_eq!(result.stop_reason, Some(StopReason::MaximalIterations));
        assert_eq!(result.best_fitness, results[0].best_fitness);
        assert!(problem.bounds().contains(&result.best_position));
    }
}

#[test]
fn test_sparse_migration_stops_at_the_iteration_limit() {
    let problem = SphereFunction::new(3).unwrap();
    let results: Vec<OptimiseResult> = on_islands(2, |handle| {
        let options = SwarmOptions::builder()
            .swarm_size(6)
            .threads(1)
            .seed(5)
            .migration_stall(2)
            .build();
        let termination = Termination::default().with_maximal_iterations(20);
        island_optimiser(handle, options, termination)
            .optimise(&problem)
            .unwrap()
    });

    for result in &results {
        assert_eq!(result.iterations, 20);
        assert_eq!(result.evaluations, 20 * 6);
        assert_eq!(result.stop_reason, Some(StopReason::MaximalIterations));
    }
}

#[test]
fn test_islands_stop_right_after_solving_between_migrations() {
    let problem = SphereFunction::new(2).unwrap();
    let results: Vec<OptimiseResult> = on_islands(2, |handle| {
        let options = SwarmOptions::builder()
            .swarm_size(6)
            .threads(1)
            .seed(13)
            .migration_stall(9)
            .build();
        let termination = Termination::default()
            .with_acceptable_fitness(10.0)
            .with_maximal_iterations(3);
        island_optimiser(handle, options, termination)
            .optimise(&problem)
            .unwrap()
    });

    // The Hammersley half of the swarm already contains a point below 10.
    for result in &results {
        assert_eq!(result.iterations, 1);
        assert!(result.solved());
        assert_eq!(result.stop_reason, Some(StopReason::Solved));
    }
}

#[test]
fn test_iteration_limit_between_migrations() {
    let problem = RastriginFunction::new(3).unwrap();
    let results: Vec<OptimiseResult> = on_islands(3, |handle| {
        let options = SwarmOptions::builder()
            .swarm_size(5)
            .threads(1)
            .seed(21)
            .migration_stall(9)
            .build();
        let termination = Termination::default().with_maximal_iterations(3);
        island_optimiser(handle, options, termination)
            .optimise(&problem)
            .unwrap()
    });

    for result in &results {
        assert_eq!(result.iterations, 3);
        assert_eq!(result.stop_reason, Some(StopReason::MaximalIterations));
    }
}

#[test]
fn test_failed_island_releases_its_peers() {
    let (sender, receiver) = mpsc::channel();
    for handle in LocalIslands::new(2).unwrap() {
        let sender = sender.clone();
        thread::spawn(move || {
            let problem = SphereFunction::new(2).unwrap();
            let mut options = SwarmOptions::builder().swarm_size(4).threads(1).seed(3).build();
            if handle.rank() == 0 {
                options.set_trace_path(Some(PathBuf::from("/nonexistent-directory/swarm.trace")));
            }
            let rank = handle.rank();
            let result = island_optimiser(&handle, options, Termination::default().with_maximal_iterations(5))
                .optimise(&problem);
            let _ = sender.send((rank, result));
        });
    }
    drop(sender);

    let mut outcomes = Vec::new();
    for _ in 0..2 {
        match receiver.recv_timeout(Duration::from_secs(30)) {
            Ok(outcome) => outcomes.push(outcome),
            Err(_) => panic!("An island is still blocked after its peer failed"),
        }
    }
    outcomes.sort_by_key(|(rank, _)| *rank);

    match &outcomes[0].1 {
        Err(OptimiseError::Other(message)) => assert!(message.contains("trace file")),
        other => panic!("Expected a trace file error, got {:?}", other),
    }
    assert!(matches!(outcomes[1].1, Err(OptimiseError::Communication(_))));
}

#[test]
fn test_islands_write_separate_traces() {
    let directory = std::env::temp_dir().join(format!("swarmsearch-islands-{}", std::process::id()));
    fs::create_dir_all(&directory).unwrap();
    let path = directory.join("swarm.trace");

    let problem = SphereFunction::new(2).unwrap();
    let results: Vec<OptimiseResult> = on_islands(2, |handle| {
        let options = SwarmOptions::builder()
            .swarm_size(4)
            .threads(1)
            .seed(17)
            .trace_path(path.clone())
            .build();
        island_optimiser(handle, options, Termination::default().with_maximal_iterations(8))
            .optimise(&problem)
            .unwrap()
    });

    for (rank, result) in results.iter().enumerate() {
        let contents = fs::read_to_string(directory.join(format!("swarm.trace.{}", rank))).unwrap();
        assert_eq!(contents.lines().count(), result.iterations);
    }
    assert!(!path.exists());
    fs::remove_dir_all(&directory).unwrap();
}

#[test]
fn test_peer_stop_ends_every_island() {
    let problem = SphereFunction::new(2).unwrap();
    let results: Vec<OptimiseResult> = on_islands(2, |handle| {
        let options = SwarmOptions::builder().swarm_size(5).threads(1).seed(9).build();
        let maximal_iterations = if handle.rank() == 0 { 7 } else { 1_000 };
        let termination = Termination::default().with_maximal_iterations(maximal_iterations);
        island_optimiser(handle, options, termination)
            .optimise(&problem)
            .unwrap()
    });

    assert_eq!(results[0].stop_reason, Some(StopReason::MaximalIterations));
    assert_eq!(results[1].stop_reason, Some(StopReason::Peer));
    assert_eq!(results[0].iterations, 7);
    assert_eq!(results[1].iterations, 7);
}
