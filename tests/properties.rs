use rand::prelude::*;
use sched_model::{
    PolicyKind, ProcessDef, Sim, SimConfig, SimOutcome,
    core::{SimEvent, Ticks},
    scheduler::{
        AgScheduler,
        ag::{EXHAUSTED_QUANTUM_BONUS, checkpoints},
    },
};

const SEEDS: u64 = 40;

fn random_workload(rng: &mut StdRng) -> Vec<ProcessDef> {
    let count = rng.random_range(1..=8);
    let mut arrival = 0;
    (0..count)
        .map(|i| {
            // Occasional gaps leave the CPU idle
            if rng.random::<f64>() < 0.5 {
                arrival += rng.random_range(0..=6);
            }
            let def = ProcessDef::new(
                format!("P{i}"),
                arrival,
                rng.random_range(1..=12),
                rng.random_range(1..=6),
            );
            if rng.random::<f64>() < 0.7 {
                def.with_quantum(rng.random_range(1..=7))
            } else {
                def
            }
        })
        .collect()
}

fn random_config(rng: &mut StdRng) -> SimConfig {
    SimConfig::new()
        .with_context_switch(rng.random_range(0..=3))
        .with_quantum(rng.random_range(1..=6))
        .with_aging_interval(rng.random_range(1..=8))
}

fn for_each_run(mut check: impl FnMut(&Sim, &SimOutcome)) {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let defs = random_workload(&mut rng);
        let config = random_config(&mut rng);
        let sim = Sim::new(defs, config).expect("generated workloads are valid");
        for outcome in sim.run_all() {
            check(&sim, &outcome);
        }
    }
}

#[test]
fn metrics_follow_from_completion_time() {
    for_each_run(|_, outcome| {
        for p in &outcome.processes {
            assert!(p.completion_time >= p.arrival_time + p.burst_time);
            assert_eq!(p.turnaround_time, p.completion_time - p.arrival_time);
            assert_eq!(p.waiting_time, p.turnaround_time - p.burst_time);
        }
        let last = outcome.processes.iter().map(|p| p.completion_time).max();
        assert_eq!(last, Some(outcome.makespan), "{}", outcome.policy);
    });
}

#[test]
fn every_process_executes_exactly_its_burst() {
    for_each_run(|_, outcome| {
        for (id, p) in outcome.processes.iter().enumerate() {
            assert_eq!(outcome.trace.units_of(id), p.burst_time, "{}", p.name);
        }
        let total: Ticks = outcome.processes.iter().map(|p| p.burst_time).sum();
        assert_eq!(outcome.trace.len() as Ticks, total);
    });
}

#[test]
fn nothing_runs_before_arrival_or_after_completion() {
    for_each_run(|_, outcome| {
        for sample in outcome.trace.samples() {
            let p = &outcome.processes[sample.process];
            assert!(sample.time >= p.arrival_time, "{} ran early", p.name);
            assert!(sample.time < p.completion_time, "{} ran late", p.name);
        }
    });
}

#[test]
fn reruns_are_identical() {
    for_each_run(|sim, outcome| {
        let again = sim.run(outcome.policy);
        assert_eq!(again.processes, outcome.processes);
        assert_eq!(again.trace, outcome.trace);
        assert_eq!(again.context_switches, outcome.context_switches);
    });
}

#[test]
fn ag_quantum_only_grows_by_checkpoint_rules() {
    for_each_run(|sim, outcome| {
        if outcome.policy != PolicyKind::Ag {
            return;
        }
        for (def, p) in sim.defs().iter().zip(&outcome.processes) {
            let history = &p.quantum_history;
            let initial = def.quantum.unwrap_or(sim.config().quantum);
            assert_eq!(history.first(), Some(&initial), "{}", p.name);
            assert_eq!(history.last(), Some(&0), "{}", p.name);
            assert_eq!(
                history.iter().filter(|&&q| q == 0).count(),
                1,
                "{}",
                p.name
            );

            for pair in history[..history.len() - 1].windows(2) {
                assert!(pair[1] >= pair[0], "{}: {history:?}", p.name);
            }
        }
    });
}

#[test]
fn ag_extensions_match_the_checkpoint_formulas() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let defs = random_workload(&mut rng);
        let sim = Sim::new(defs, random_config(&mut rng)).expect("valid workload");
        let mut core = sim.core::<AgScheduler>();

        while !core.finished() {
            let before: Vec<Ticks> = core.ctx.processes.iter().map(|p| p.quantum).collect();
            let events = core.step();

            for p in &core.ctx.processes {
                let q = before[p.id];
                if p.quantum == q {
                    continue;
                }
                let (t1, t2) = checkpoints(q);
                let used = events.iter().find_map(|event| match *event {
                    SimEvent::Preempted { process, used, .. } if process == p.id => Some(used),
                    _ => None,
                });
                let expected = match used {
                    Some(used) if used == t1 => q + (q - used).div_ceil(2),
                    Some(used) => {
                        assert!((t2..q).contains(&used), "seed {seed}: {} used {used}", p.name);
                        q + (q - used)
                    }
                    None => q + EXHAUSTED_QUANTUM_BONUS,
                };
                assert_eq!(p.quantum, expected, "seed {seed}: {} from {q}", p.name);
                assert_eq!(p.quantum_history.last(), Some(&expected));
            }
        }
    }
}

#[test]
fn other_policies_leave_no_quantum_history() {
    for_each_run(|_, outcome| {
        if outcome.policy == PolicyKind::Ag {
            return;
        }
        assert!(
            outcome.processes.iter().all(|p| p.quantum_history.is_empty()),
            "{}",
            outcome.policy
        );
    });
}

#[test]
fn round_robin_with_oversized_quantum_is_fcfs() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let defs = random_workload(&mut rng);
        let longest = defs.iter().map(|d| d.burst_time).max().unwrap_or(1);
        let config = SimConfig::new()
            .with_context_switch(rng.random_range(0..=3))
            .with_quantum(longest + 1);

        let mut by_arrival: Vec<&ProcessDef> = defs.iter().collect();
        by_arrival.sort_by_key(|d| d.arrival_time);
        let expected: Vec<&str> = by_arrival.iter().map(|d| d.name.as_str()).collect();

        let sim = Sim::new(defs.clone(), config).expect("valid workload");
        let outcome = sim.run(PolicyKind::RoundRobin);
        assert_eq!(outcome.execution_order(), expected, "seed {seed}");
        assert_eq!(
            outcome.context_switches,
            defs.len() as u64 - 1,
            "seed {seed}"
        );
    }
}

#[test]
fn zero_switch_cost_single_process_runs_straight_through() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..SEEDS {
        let arrival = rng.random_range(0..=20);
        let burst = rng.random_range(1..=15);
        let def = ProcessDef::new("P", arrival, burst, rng.random_range(-3..=3));
        let sim = Sim::new(vec![def], random_config(&mut rng).with_context_switch(0))
            .expect("valid workload");
        for outcome in sim.run_all() {
            let p = &outcome.processes[0];
            assert_eq!(p.waiting_time, 0, "{}", outcome.policy);
            assert_eq!(p.turnaround_time, burst, "{}", outcome.policy);
        }
    }
}
