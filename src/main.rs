use std::{env, process::ExitCode, str::FromStr};

use average::Estimate;
use log::{LevelFilter, Metadata, Record};
use rand::prelude::*;
use sched_model::{Fixture, PolicyKind, ProcessDef, Sim, SimConfig};

struct SimpleLogger;

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{} - {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: SimpleLogger = SimpleLogger;

fn init_logger() {
    let level = env::var("SCHED_LOG")
        .ok()
        .and_then(|s| LevelFilter::from_str(&s).ok())
        .unwrap_or(LevelFilter::Info);
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn main() -> ExitCode {
    init_logger();

    let mut json = false;
    let mut paths = Vec::new();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            _ => paths.push(arg),
        }
    }
    if !paths.is_empty() {
        return check_fixtures(&paths);
    }

    demo(json);
    ExitCode::SUCCESS
}

fn check_fixtures(paths: &[String]) -> ExitCode {
    let mut failed = 0;
    for path in paths {
        let verdicts =
            Fixture::load(path).and_then(|fixture| fixture.evaluate().map_err(Into::into));
        match verdicts {
            Ok(verdicts) => {
                for verdict in verdicts {
                    println!("{path}: {verdict}");
                    if !verdict.passed() {
                        failed += 1;
                    }
                }
            }
            Err(err) => {
                log::error!("{path}: {err}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        println!("{failed} check(s) failed");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn demo(json: bool) {
    let defs = vec![
        ProcessDef::new("P1", 0, 8, 3).with_quantum(4),
        ProcessDef::new("P2", 1, 4, 1).with_quantum(3),
        ProcessDef::new("P3", 2, 2, 4).with_quantum(5),
        ProcessDef::new("P4", 3, 1, 2).with_quantum(2),
        ProcessDef::new("P5", 4, 3, 5).with_quantum(4),
    ];
    let config = SimConfig::new()
        .with_context_switch(1)
        .with_quantum(2)
        .with_aging_interval(5);
    let sim = match Sim::new(defs, config) {
        Ok(sim) => sim,
        Err(err) => {
            log::error!("demo workload rejected: {err}");
            return;
        }
    };
    for outcome in sim.run_all() {
        if !json {
            println!("{outcome}\n");
            continue;
        }
        match serde_json::to_string_pretty(&outcome.summary()) {
            Ok(summary) => println!("{summary}"),
            Err(err) => log::error!("cannot serialize {} summary: {err}", outcome.policy),
        }
    }

    let defs = bernoulli_processes(200, 0.3, 0.3, 2, 6, 0);
    let Ok(sim) = Sim::new(defs, config) else {
        return;
    };
    println!("===== {} random processes =====", sim.defs().len());
    for policy in PolicyKind::ALL {
        let outcome = sim.run(policy);
        let waiting = outcome.processes.iter().map(|p| p.waiting_time as f64);
        let turnaround = outcome.processes.iter().map(|p| p.turnaround_time as f64);
        println!(
            "{policy}: average waiting {:.2} ticks, average turnaround {:.2} ticks, {} context switches",
            avg(waiting),
            avg(turnaround),
            outcome.context_switches
        );
    }
}

fn bernoulli_processes(
    ticks: u64,
    p_arrival: f64,
    p_short: f64,
    short_ticks: u64,
    long_ticks: u64,
    seed: u64,
) -> Vec<ProcessDef> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut defs = Vec::new();

    for t in 0..ticks {
        if rng.random::<f64>() < p_arrival {
            let burst = if rng.random::<f64>() < p_short {
                short_ticks
            } else {
                long_ticks
            };
            let priority = rng.random_range(1..=5);
            let name = format!("J{}", defs.len());
            defs.push(ProcessDef::new(name, t, burst, priority));
        }
    }

    defs
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    let mean: average::Mean = iter.collect();
    if mean.is_empty() {
        0.0
    } else {
        mean.estimate()
    }
}
