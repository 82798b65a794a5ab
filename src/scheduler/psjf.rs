use std::cmp::Ordering;

use keyed_priority_queue::KeyedPriorityQueue;

use super::{EnqueueFlags, PolicyKind, ProcessId, Scheduler, SimCtx, TickDecision, Ticks};
use crate::sim::SimConfig;

#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub struct SjfKey {
    remaining: Ticks,
    arrival: Ticks,
    // Input position; earlier-discovered process wins exact ties
    process: ProcessId,
}

impl SjfKey {
    fn of(ctx: &SimCtx, process: ProcessId) -> Self {
        let p = ctx.process(process);
        Self {
            remaining: p.remaining_time,
            arrival: p.arrival_time,
            process,
        }
    }
}

// KeyedPriorityQueue is a max-heap, so we need to flip-flop SjfKey's Ord
impl PartialOrd for SjfKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SjfKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.remaining, other.arrival, other.process).cmp(&(
            self.remaining,
            self.arrival,
            self.process,
        ))
    }
}

/// Shortest remaining time first, re-evaluated after every unit.
pub struct SjfScheduler {
    pool: KeyedPriorityQueue<ProcessId, SjfKey>,
}

impl Scheduler for SjfScheduler {
    const KIND: PolicyKind = PolicyKind::Psjf;

    fn init(_ctx: &mut SimCtx, _config: &SimConfig) -> Self {
        Self {
            pool: KeyedPriorityQueue::new(),
        }
    }

    fn enqueue(&mut self, ctx: &mut SimCtx, process: ProcessId, _flags: EnqueueFlags) {
        self.pool.push(process, SjfKey::of(ctx, process));
    }

    // The pick stays in the pool; it only leaves on completion
    fn dispatch(&mut self, _ctx: &mut SimCtx) -> Option<ProcessId> {
        self.pool.peek().map(|(&process, _)| process)
    }

    fn tick(&mut self, ctx: &mut SimCtx, process: ProcessId) -> TickDecision {
        if ctx.process(process).is_completed() {
            self.pool.remove(&process);
        } else {
            self.pool
                .set_priority(&process, SjfKey::of(ctx, process))
                .expect("Running process missing from SJF pool");
        }
        TickDecision::Release
    }
}
