//! Recorded scenarios: a workload, its settings, and the metrics each policy
//! is expected to reach.

use std::{collections::BTreeMap, error::Error, fmt, fs, io, path::Path};

use serde::{Deserialize, Serialize};

use super::{ConfigError, ProcessDef, Sim, SimConfig, SimOutcome};
use crate::{core::Ticks, scheduler::PolicyKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    pub input: FixtureInput,
    pub expected_output: ExpectedOutput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureInput {
    pub processes: Vec<ProcessDef>,
    #[serde(default)]
    pub context_switch: Ticks,
    #[serde(default = "default_quantum")]
    pub rr_quantum: Ticks,
    #[serde(default = "default_aging_interval")]
    pub aging_interval: Ticks,
}

fn default_quantum() -> Ticks {
    SimConfig::DEFAULT_QUANTUM
}

fn default_aging_interval() -> Ticks {
    SimConfig::DEFAULT_AGING_INTERVAL
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpectedOutput {
    PerPolicy(BTreeMap<PolicyKind, ExpectedMetrics>),
    // AG-only fixtures record a single flat result
    Single(ExpectedMetrics),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedMetrics {
    pub average_waiting_time: f64,
    pub average_turnaround_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_order: Option<Vec<String>>,
}

/// Result of comparing one policy run against its expectation.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub policy: PolicyKind,
    pub tolerance: f64,
    pub expected: ExpectedMetrics,
    pub actual_waiting_time: f64,
    pub actual_turnaround_time: f64,
    /// `None` when the fixture records no execution order
    pub order_matches: Option<bool>,
}

impl Verdict {
    pub fn compare(expected: &ExpectedMetrics, outcome: &SimOutcome, tolerance: f64) -> Self {
        let order_matches = expected
            .execution_order
            .as_ref()
            .map(|order| outcome.execution_order() == *order);
        Self {
            policy: outcome.policy,
            tolerance,
            expected: expected.clone(),
            actual_waiting_time: outcome.average_waiting_time(),
            actual_turnaround_time: outcome.average_turnaround_time(),
            order_matches,
        }
    }

    pub fn waiting_deviation(&self) -> f64 {
        (self.actual_waiting_time - self.expected.average_waiting_time).abs()
    }

    pub fn turnaround_deviation(&self) -> f64 {
        (self.actual_turnaround_time - self.expected.average_turnaround_time).abs()
    }

    pub fn passed(&self) -> bool {
        self.waiting_deviation() <= self.tolerance
            && self.turnaround_deviation() <= self.tolerance
            && self.order_matches != Some(false)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed() { "PASS" } else { "FAIL" };
        write!(
            f,
            "{status} [{}] WT {:.2} (expected {:.2}), TAT {:.2} (expected {:.2})",
            self.policy,
            self.actual_waiting_time,
            self.expected.average_waiting_time,
            self.actual_turnaround_time,
            self.expected.average_turnaround_time
        )?;
        if self.order_matches == Some(false) {
            write!(f, ", execution order differs")?;
        }
        Ok(())
    }
}

impl Fixture {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, FixtureError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn config(&self) -> SimConfig {
        SimConfig::new()
            .with_context_switch(self.input.context_switch)
            .with_quantum(self.input.rr_quantum)
            .with_aging_interval(self.input.aging_interval)
    }

    pub fn sim(&self) -> Result<Sim, ConfigError> {
        Sim::new(self.input.processes.clone(), self.config())
    }

    pub fn expectations(&self) -> Vec<(PolicyKind, &ExpectedMetrics)> {
        match &self.expected_output {
            ExpectedOutput::PerPolicy(map) => map.iter().map(|(&k, v)| (k, v)).collect(),
            ExpectedOutput::Single(expected) => vec![(PolicyKind::Ag, expected)],
        }
    }

    /// Runs every policy the fixture has expectations for, each on its own
    /// copy of the workload, using each policy's default tolerance.
    pub fn evaluate(&self) -> Result<Vec<Verdict>, ConfigError> {
        self.evaluate_with(|policy| policy.default_tolerance())
    }

    pub fn evaluate_with(
        &self,
        tolerance: impl Fn(PolicyKind) -> f64,
    ) -> Result<Vec<Verdict>, ConfigError> {
        let sim = self.sim()?;
        Ok(self
            .expectations()
            .into_iter()
            .map(|(policy, expected)| {
                let outcome = sim.run(policy);
                Verdict::compare(expected, &outcome, tolerance(policy))
            })
            .collect())
    }
}

#[derive(Debug)]
pub enum FixtureError {
    Io(io::Error),
    Parse(serde_json::Error),
    Config(ConfigError),
}

impl fmt::Display for FixtureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "cannot read fixture: {err}"),
            Self::Parse(err) => write!(f, "malformed fixture: {err}"),
            Self::Config(err) => write!(f, "invalid fixture input: {err}"),
        }
    }
}

impl Error for FixtureError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<io::Error> for FixtureError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for FixtureError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

impl From<ConfigError> for FixtureError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}
