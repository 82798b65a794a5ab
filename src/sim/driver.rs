use super::{ConfigError, ProcessDef, ProcessResult, SimConfig, SimOutcome};
use crate::{
    core::{Process, SchedCore, SimEvent},
    scheduler::{
        AgScheduler, AgingScheduler, PolicyKind, RoundRobinScheduler, Scheduler, SjfScheduler,
    },
};

/// A validated workload plus configuration. Every run works on a fresh copy
/// of the process set, so the same `Sim` can run any number of policies.
#[derive(Debug, Clone)]
pub struct Sim {
    defs: Vec<ProcessDef>,
    config: SimConfig,
}

impl Sim {
    pub fn new(defs: Vec<ProcessDef>, config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        config.validate_processes(&defs)?;
        Ok(Self { defs, config })
    }

    pub fn defs(&self) -> &[ProcessDef] {
        &self.defs
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn run(&self, policy: PolicyKind) -> SimOutcome {
        match policy {
            PolicyKind::Psjf => self.run_with::<SjfScheduler>(),
            PolicyKind::RoundRobin => self.run_with::<RoundRobinScheduler>(),
            PolicyKind::Priority => self.run_with::<AgingScheduler>(),
            PolicyKind::Ag => self.run_with::<AgScheduler>(),
        }
    }

    pub fn run_all(&self) -> Vec<SimOutcome> {
        PolicyKind::ALL.iter().map(|&policy| self.run(policy)).collect()
    }

    /// A fresh driver over its own copy of the workload, for stepping by hand.
    pub fn core<S: Scheduler>(&self) -> SchedCore<S> {
        let processes = self
            .defs
            .iter()
            .enumerate()
            .map(|(id, def)| Process::new(id, def, self.config.quantum))
            .collect();
        SchedCore::new(processes, &self.config)
    }

    pub fn run_with<S: Scheduler>(&self) -> SimOutcome {
        let mut core = self.core::<S>();

        let mut context_switches = 0;
        while !core.finished() {
            let now = core.now();
            for event in core.step() {
                log::trace!("t={} {:?}", now, event);
                if let SimEvent::ContextSwitch { .. } = event {
                    context_switches += 1;
                }
            }
        }

        log::info!(
            "{}: {} processes finished at t={} after {} steps",
            S::KIND,
            self.defs.len(),
            core.now(),
            core.observer().steps()
        );

        let makespan = core.now();
        let processes = core
            .ctx
            .processes
            .iter()
            .map(|p| {
                let metrics = p.metrics.expect("Finished run left a process without metrics");
                ProcessResult {
                    name: p.name.clone(),
                    arrival_time: p.arrival_time,
                    burst_time: p.burst_time,
                    priority: p.priority,
                    completion_time: metrics.completion_time,
                    turnaround_time: metrics.turnaround_time,
                    waiting_time: metrics.waiting_time,
                    quantum_history: p.quantum_history.clone(),
                }
            })
            .collect();

        SimOutcome {
            policy: S::KIND,
            processes,
            trace: core.trace,
            context_switches,
            makespan,
        }
    }
}
