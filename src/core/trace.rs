use super::state::{ProcessId, Ticks};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceSample {
    /// Clock value at the start of the executed unit
    pub time: Ticks,
    pub process: ProcessId,
}

/// Which process held the CPU for each executed unit. Idle and context-switch
/// units are not sampled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionTrace {
    samples: Vec<TraceSample>,
}

impl ExecutionTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, time: Ticks, process: ProcessId) {
        debug_assert!(
            self.samples.last().is_none_or(|last| last.time < time),
            "Trace samples must be strictly increasing in time"
        );
        self.samples.push(TraceSample { time, process });
    }

    pub fn samples(&self) -> &[TraceSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn units_of(&self, process: ProcessId) -> Ticks {
        self.samples.iter().filter(|s| s.process == process).count() as Ticks
    }

    /// Run-length condensed execution order: consecutive repeats collapse.
    pub fn execution_order(&self) -> Vec<ProcessId> {
        let mut order: Vec<ProcessId> = Vec::new();
        for sample in &self.samples {
            if order.last() != Some(&sample.process) {
                order.push(sample.process);
            }
        }
        order
    }
}
