use std::fmt;

use average::Mean;
use serde::Serialize;

use super::ProcessResult;
use crate::{
    core::{ExecutionTrace, Ticks},
    scheduler::PolicyKind,
};

/// Everything a single policy run produced.
#[derive(Debug, Clone)]
pub struct SimOutcome {
    pub policy: PolicyKind,
    /// In input order
    pub processes: Vec<ProcessResult>,
    pub trace: ExecutionTrace,
    pub context_switches: u64,
    /// Clock value when the last process completed
    pub makespan: Ticks,
}

impl SimOutcome {
    pub fn process(&self, name: &str) -> Option<&ProcessResult> {
        self.processes.iter().find(|p| p.name == name)
    }

    pub fn average_waiting_time(&self) -> f64 {
        mean(self.processes.iter().map(|p| p.waiting_time))
    }

    pub fn average_turnaround_time(&self) -> f64 {
        mean(self.processes.iter().map(|p| p.turnaround_time))
    }

    /// Condensed execution order as process names.
    pub fn execution_order(&self) -> Vec<&str> {
        self.trace
            .execution_order()
            .into_iter()
            .map(|id| self.processes[id].name.as_str())
            .collect()
    }

    pub fn summary(&self) -> OutcomeSummary {
        OutcomeSummary {
            policy: self.policy,
            average_waiting_time: self.average_waiting_time(),
            average_turnaround_time: self.average_turnaround_time(),
            execution_order: self
                .execution_order()
                .into_iter()
                .map(str::to_owned)
                .collect(),
            processes: self.processes.clone(),
        }
    }
}

fn mean(values: impl Iterator<Item = Ticks>) -> f64 {
    let mean: Mean = values.map(|v| v as f64).collect();
    // `Mean` estimates NaN with no samples; empty workloads report 0.0
    if mean.is_empty() {
        0.0
    } else {
        mean.mean()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeSummary {
    pub policy: PolicyKind,
    pub average_waiting_time: f64,
    pub average_turnaround_time: f64,
    pub execution_order: Vec<String>,
    pub processes: Vec<ProcessResult>,
}

impl fmt::Display for SimOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "===== {} =====", self.policy)?;
        writeln!(f, "Execution Order: {}", self.execution_order().join(" "))?;

        let mut by_name: Vec<&ProcessResult> = self.processes.iter().collect();
        by_name.sort_by(|a, b| a.name.cmp(&b.name));
        for p in by_name {
            write!(
                f,
                "{} - Waiting Time: {}, Turnaround Time: {}",
                p.name, p.waiting_time, p.turnaround_time
            )?;
            if !p.quantum_history.is_empty() {
                write!(f, ", Quantum History: {:?}", p.quantum_history)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Average Waiting Time: {:.2}", self.average_waiting_time())?;
        writeln!(
            f,
            "Average Turnaround Time: {:.2}",
            self.average_turnaround_time()
        )?;
        write!(
            f,
            "Context Switches: {}, Makespan: {}",
            self.context_switches, self.makespan
        )
    }
}
