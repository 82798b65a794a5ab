use serde::{Deserialize, Serialize};

use crate::core::{Priority, Ticks};

/// Caller-supplied description of one process. Each run builds its own
/// mutable copy from this, so a definition can be reused across policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDef {
    pub name: String,
    #[serde(rename = "arrival")]
    pub arrival_time: Ticks,
    #[serde(rename = "burst")]
    pub burst_time: Ticks,
    pub priority: Priority,
    /// Initial quantum for AG; falls back to the configured quantum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantum: Option<Ticks>,
}

impl ProcessDef {
    pub fn new(
        name: impl Into<String>,
        arrival_time: Ticks,
        burst_time: Ticks,
        priority: Priority,
    ) -> Self {
        Self {
            name: name.into(),
            arrival_time,
            burst_time,
            priority,
            quantum: None,
        }
    }

    pub fn with_quantum(mut self, quantum: Ticks) -> Self {
        self.quantum = Some(quantum);
        self
    }
}

/// Final state of one process after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResult {
    pub name: String,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    pub priority: Priority,
    pub completion_time: Ticks,
    pub turnaround_time: Ticks,
    pub waiting_time: Ticks,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quantum_history: Vec<Ticks>,
}
