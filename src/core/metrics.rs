use super::state::Ticks;

/// Per-process timing derived once a process finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub completion_time: Ticks,
    /// `completion - arrival`
    pub turnaround_time: Ticks,
    /// `turnaround - burst`
    pub waiting_time: Ticks,
}

impl Metrics {
    pub fn at_completion(arrival_time: Ticks, burst_time: Ticks, completion_time: Ticks) -> Self {
        debug_assert!(
            completion_time >= arrival_time + burst_time,
            "completion {completion_time} precedes arrival {arrival_time} + burst {burst_time}"
        );
        let turnaround_time = completion_time.saturating_sub(arrival_time);
        Self {
            completion_time,
            turnaround_time,
            waiting_time: turnaround_time.saturating_sub(burst_time),
        }
    }
}
