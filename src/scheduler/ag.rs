//! Adaptive quantum scheduler.
//!
//! Each process carries its own quantum `q`. While a slice runs, two
//! checkpoints may cut it short in favour of a competitor waiting in the ready
//! queue:
//!
//! - at `used == ⌈q/4⌉`, a strictly better (lower) priority wins; the preempted
//!   process banks `⌈(q - used)/2⌉` extra quantum;
//! - otherwise, at any `⌈q/2⌉ <= used < q`, a strictly shorter remaining time
//!   wins; the preempted process banks the whole unused `q - used`.
//!
//! A slice that runs out untouched is requeued with `q + 2`. Completion
//! preempts every checkpoint and closes the quantum history with a `0`.

use std::collections::VecDeque;

use super::{EnqueueFlags, PolicyKind, ProcessId, Scheduler, SimCtx, TickDecision, Ticks};
use crate::{core::Process, sim::SimConfig};

/// Quantum added when a slice is used up without a checkpoint preemption.
pub const EXHAUSTED_QUANTUM_BONUS: Ticks = 2;

/// Checkpoint offsets within a slice of quantum `q`: `(⌈q/4⌉, ⌈q/2⌉)`.
pub fn checkpoints(quantum: Ticks) -> (Ticks, Ticks) {
    (quantum.div_ceil(4), quantum.div_ceil(2))
}

pub struct AgScheduler {
    queue: VecDeque<ProcessId>,
    slice_start: Ticks,
}

impl AgScheduler {
    // First strict minimum in queue order
    fn best_waiting_by<K: Ord>(
        &self,
        ctx: &SimCtx,
        key: impl Fn(&Process) -> K,
    ) -> Option<ProcessId> {
        let mut best: Option<(ProcessId, K)> = None;
        for &process in &self.queue {
            let k = key(ctx.process(process));
            if best.as_ref().is_none_or(|(_, best_k)| k < *best_k) {
                best = Some((process, k));
            }
        }
        best.map(|(process, _)| process)
    }

    fn preempt(
        &mut self,
        ctx: &mut SimCtx,
        process: ProcessId,
        challenger: ProcessId,
        quantum: Ticks,
    ) -> TickDecision {
        self.grant_quantum(ctx, process, quantum);
        self.queue.push_back(process);
        let index = self
            .queue
            .iter()
            .position(|&p| p == challenger)
            .expect("Challenger missing from AG ready queue");
        self.queue.remove(index);
        log::debug!(
            "t={} {} preempted by {}, quantum now {}",
            ctx.now,
            ctx.process(process).name,
            ctx.process(challenger).name,
            quantum
        );
        TickDecision::Switch(challenger)
    }

    fn grant_quantum(&self, ctx: &mut SimCtx, process: ProcessId, quantum: Ticks) {
        let p = ctx.process_mut(process);
        p.quantum = quantum;
        p.quantum_history.push(quantum);
    }
}

impl Scheduler for AgScheduler {
    const KIND: PolicyKind = PolicyKind::Ag;

    fn init(ctx: &mut SimCtx, _config: &SimConfig) -> Self {
        // Initial quanta were resolved against the config when processes were built
        for process in &mut ctx.processes {
            process.quantum_history = vec![process.quantum];
        }
        Self {
            queue: VecDeque::new(),
            slice_start: 0,
        }
    }

    fn enqueue(&mut self, _ctx: &mut SimCtx, process: ProcessId, _flags: EnqueueFlags) {
        self.queue.push_back(process);
    }

    fn dispatch(&mut self, _ctx: &mut SimCtx) -> Option<ProcessId> {
        self.queue.pop_front()
    }

    fn running(&mut self, ctx: &mut SimCtx, _process: ProcessId) {
        self.slice_start = ctx.now;
    }

    fn tick(&mut self, ctx: &mut SimCtx, process: ProcessId) -> TickDecision {
        if ctx.process(process).is_completed() {
            ctx.process_mut(process).quantum_history.push(0);
            return TickDecision::Release;
        }

        let used = ctx.now - self.slice_start;
        let (quantum, priority, remaining) = {
            let p = ctx.process(process);
            (p.quantum, p.priority, p.remaining_time)
        };
        let (t1, t2) = checkpoints(quantum);

        // At most one checkpoint is evaluated per unit
        if used == t1 {
            if let Some(challenger) = self.best_waiting_by(ctx, |p| p.priority) {
                if ctx.process(challenger).priority < priority {
                    let granted = quantum.saturating_add((quantum - used).div_ceil(2));
                    return self.preempt(ctx, process, challenger, granted);
                }
            }
        } else if (t2..quantum).contains(&used) {
            if let Some(challenger) = self.best_waiting_by(ctx, |p| p.remaining_time) {
                if ctx.process(challenger).remaining_time < remaining {
                    let granted = quantum.saturating_add(quantum - used);
                    return self.preempt(ctx, process, challenger, granted);
                }
            }
        }

        if used >= quantum {
            let granted = quantum.saturating_add(EXHAUSTED_QUANTUM_BONUS);
            self.grant_quantum(ctx, process, granted);
            self.queue.push_back(process);
            return TickDecision::Release;
        }

        TickDecision::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{ProcessDef, Sim, SimOutcome};

    fn run(defs: Vec<ProcessDef>, context_switch: u64) -> SimOutcome {
        Sim::new(defs, SimConfig::new().with_context_switch(context_switch))
            .expect("valid workload")
            .run(PolicyKind::Ag)
    }

    fn history<'a>(outcome: &'a SimOutcome, name: &str) -> &'a [Ticks] {
        &outcome.process(name).expect(name).quantum_history
    }

    #[test]
    fn checkpoint_offsets_round_up() {
        assert_eq!(checkpoints(1), (1, 1));
        assert_eq!(checkpoints(2), (1, 1));
        assert_eq!(checkpoints(4), (1, 2));
        assert_eq!(checkpoints(5), (2, 3));
        assert_eq!(checkpoints(7), (2, 4));
        assert_eq!(checkpoints(8), (2, 4));
        assert_eq!(checkpoints(9), (3, 5));
    }

    #[test]
    fn priority_checkpoint_banks_half_the_unused_quantum() {
        // q=4: t1=1, P1 yields to the better-priority P2 with ceil(3/2) banked
        let defs = vec![
            ProcessDef::new("P1", 0, 10, 5).with_quantum(4),
            ProcessDef::new("P2", 0, 3, 1).with_quantum(4),
        ];
        let outcome = run(defs, 0);
        assert_eq!(outcome.execution_order(), vec!["P1", "P2", "P1"]);
        assert_eq!(history(&outcome, "P1"), &[4, 6, 8, 0]);
        assert_eq!(history(&outcome, "P2"), &[4, 0]);
        assert_eq!(outcome.process("P1").expect("P1").completion_time, 13);
    }

    #[test]
    fn checkpoint_switch_pays_context_switch() {
        let defs = vec![
            ProcessDef::new("P1", 0, 10, 5).with_quantum(4),
            ProcessDef::new("P2", 0, 3, 1).with_quantum(4),
        ];
        let outcome = run(defs, 2);
        assert_eq!(outcome.context_switches, 2);
        assert_eq!(outcome.process("P2").expect("P2").completion_time, 6);
        assert_eq!(outcome.process("P1").expect("P1").completion_time, 17);
    }

    #[test]
    fn shortest_job_checkpoint_banks_the_full_remainder() {
        // P2 arrives at t=1, so it is not visible to P1's first checkpoint
        let defs = vec![
            ProcessDef::new("P1", 0, 10, 5).with_quantum(4),
            ProcessDef::new("P2", 1, 3, 9).with_quantum(4),
        ];
        let outcome = run(defs, 0);
        assert_eq!(
            outcome.execution_order(),
            vec!["P1", "P2", "P1", "P2", "P1"]
        );
        assert_eq!(history(&outcome, "P1"), &[4, 6, 9, 0]);
        assert_eq!(history(&outcome, "P2"), &[4, 6, 0]);
    }

    #[test]
    fn exhausted_quantum_grows_by_two() {
        let defs = vec![
            ProcessDef::new("P1", 0, 5, 1).with_quantum(2),
            ProcessDef::new("P2", 0, 5, 1).with_quantum(2),
        ];
        let outcome = run(defs, 0);
        assert_eq!(outcome.execution_order(), vec!["P1", "P2", "P1", "P2"]);
        assert_eq!(history(&outcome, "P1"), &[2, 4, 0]);
        assert_eq!(history(&outcome, "P2"), &[2, 4, 0]);
    }

    #[test]
    fn quantum_growth_saturates() {
        let def = ProcessDef::new("P", 0, 5, 1).with_quantum(Ticks::MAX);
        let mut ctx = SimCtx::new(vec![Process::new(0, &def, 2)]);
        let mut scheduler = AgScheduler::init(&mut ctx, &SimConfig::new());
        scheduler.running(&mut ctx, 0);

        ctx.now = Ticks::MAX;
        assert_eq!(scheduler.tick(&mut ctx, 0), TickDecision::Release);
        assert_eq!(ctx.process(0).quantum, Ticks::MAX);
        assert_eq!(ctx.process(0).quantum_history, vec![Ticks::MAX, Ticks::MAX]);
    }

    #[test]
    fn missing_quantum_falls_back_to_config() {
        let sim = Sim::new(
            vec![ProcessDef::new("P1", 0, 5, 1)],
            SimConfig::new().with_quantum(3),
        )
        .expect("valid workload");
        let outcome = sim.run(PolicyKind::Ag);
        assert_eq!(history(&outcome, "P1"), &[3, 5, 0]);
    }
}
