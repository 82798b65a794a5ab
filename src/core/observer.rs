use super::{
    state::{ProcessState, SimCtx, Ticks},
    trace::ExecutionTrace,
};

#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
    // Executed units per process, fed incrementally from the trace
    executed: Vec<Ticks>,
    samples_seen: usize,
}

impl Observer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, ctx: &SimCtx, trace: &ExecutionTrace) {
        self.step += 1;

        // Only walk the table when the checks can fire
        if !cfg!(debug_assertions) {
            return;
        }

        self.executed.resize(ctx.processes.len(), 0);
        for sample in &trace.samples()[self.samples_seen..] {
            self.executed[sample.process] += 1;
        }
        self.samples_seen = trace.len();

        for process in &ctx.processes {
            let id = process.id;
            debug_assert!(
                process.remaining_time <= process.burst_time,
                "Process {id} has more remaining time than its burst"
            );

            let executed = self.executed[id];
            debug_assert_eq!(
                executed + process.remaining_time,
                process.burst_time,
                "Process {id} executed units do not account for its burst"
            );

            match (process.state, process.metrics) {
                (ProcessState::Completed, Some(metrics)) => {
                    debug_assert_eq!(
                        metrics.turnaround_time,
                        metrics.completion_time - process.arrival_time,
                        "Process {id} turnaround must equal completion - arrival"
                    );
                    debug_assert_eq!(
                        metrics.waiting_time + process.burst_time,
                        metrics.turnaround_time,
                        "Process {id} waiting must equal turnaround - burst"
                    );
                }
                (ProcessState::Completed, None) => {
                    debug_assert!(false, "Completed process {id} has no metrics");
                }
                (_, Some(_)) => {
                    debug_assert!(false, "Incomplete process {id} already has metrics");
                }
                (state, None) => {
                    debug_assert!(
                        process.remaining_time > 0,
                        "Process {id} in state {state:?} has nothing left to run"
                    );
                }
            }
        }
    }
}
