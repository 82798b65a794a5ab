use std::collections::VecDeque;

use super::{EnqueueFlags, PolicyKind, ProcessId, Scheduler, SimCtx, TickDecision, Ticks};
use crate::sim::SimConfig;

/// FIFO ready queue with a fixed quantum. Every dispatch except the very first
/// of a run pays the context switch, even when the same process comes back.
pub struct RoundRobinScheduler {
    queue: VecDeque<ProcessId>,
    quantum: Ticks,
    slice_left: Ticks,
}

impl Scheduler for RoundRobinScheduler {
    const KIND: PolicyKind = PolicyKind::RoundRobin;

    fn init(_ctx: &mut SimCtx, config: &SimConfig) -> Self {
        Self {
            queue: VecDeque::new(),
            quantum: config.quantum,
            slice_left: 0,
        }
    }

    fn enqueue(&mut self, _ctx: &mut SimCtx, process: ProcessId, _flags: EnqueueFlags) {
        self.queue.push_back(process);
    }

    fn dispatch(&mut self, _ctx: &mut SimCtx) -> Option<ProcessId> {
        self.queue.pop_front()
    }

    fn needs_switch(&self, prev: Option<ProcessId>, _next: ProcessId) -> bool {
        prev.is_some()
    }

    fn running(&mut self, ctx: &mut SimCtx, process: ProcessId) {
        self.slice_left = self.quantum;
        ctx.process_mut(process).quantum = self.quantum;
    }

    fn tick(&mut self, ctx: &mut SimCtx, process: ProcessId) -> TickDecision {
        if ctx.process(process).is_completed() {
            return TickDecision::Release;
        }

        self.slice_left = self.slice_left.saturating_sub(1);
        if self.slice_left == 0 {
            TickDecision::Expire
        } else {
            TickDecision::Continue
        }
    }

    // No per-unit idle stepping: jump straight to the next arrival
    fn idle_until(&self, ctx: &SimCtx) -> Ticks {
        ctx.next_arrival().unwrap_or(ctx.now + 1)
    }
}
