use rustc_hash::FxHashMap;

use super::{EnqueueFlags, PolicyKind, ProcessId, Scheduler, SimCtx, TickDecision, Ticks};
use crate::{core::Priority, sim::SimConfig};

/// Static priority with aging. Every unit an eligible process spends off the
/// CPU bumps its aging counter; each full `aging_interval` of waiting lowers
/// its effective priority by one.
pub struct AgingScheduler {
    // Admission order, which is arrival order
    pool: Vec<ProcessId>,
    aging: FxHashMap<ProcessId, Ticks>,
    aging_interval: Ticks,
}

impl AgingScheduler {
    pub fn effective_priority(&self, ctx: &SimCtx, process: ProcessId) -> Priority {
        let waited = self.aging.get(&process).copied().unwrap_or(0);
        let bonus = Priority::try_from(waited / self.aging_interval).unwrap_or(Priority::MAX);
        ctx.process(process).priority.saturating_sub(bonus)
    }

    pub fn aging_of(&self, process: ProcessId) -> Ticks {
        self.aging.get(&process).copied().unwrap_or(0)
    }
}

impl Scheduler for AgingScheduler {
    const KIND: PolicyKind = PolicyKind::Priority;

    fn init(_ctx: &mut SimCtx, config: &SimConfig) -> Self {
        Self {
            pool: Vec::new(),
            aging: FxHashMap::default(),
            aging_interval: config.aging_interval,
        }
    }

    fn enqueue(&mut self, _ctx: &mut SimCtx, process: ProcessId, _flags: EnqueueFlags) {
        self.pool.push(process);
        self.aging.insert(process, 0);
    }

    fn dispatch(&mut self, ctx: &mut SimCtx) -> Option<ProcessId> {
        let mut best: Option<(ProcessId, Priority)> = None;
        for &process in &self.pool {
            let effective = self.effective_priority(ctx, process);
            best = match best {
                None => Some((process, effective)),
                Some((_, best_effective)) if effective < best_effective => {
                    Some((process, effective))
                }
                Some((best_process, best_effective))
                    if effective == best_effective
                        && ctx.process(process).arrival_time
                            < ctx.process(best_process).arrival_time =>
                {
                    Some((process, effective))
                }
                keep => keep,
            };
        }
        best.map(|(process, _)| process)
    }

    fn running(&mut self, _ctx: &mut SimCtx, process: ProcessId) {
        self.aging.insert(process, 0);
    }

    fn tick(&mut self, ctx: &mut SimCtx, process: ProcessId) -> TickDecision {
        if ctx.process(process).is_completed() {
            self.pool.retain(|&p| p != process);
            self.aging.remove(&process);
        }
        TickDecision::Release
    }

    // Idle and switch units age everybody, including the process about to run
    fn elapsed(&mut self, _ctx: &mut SimCtx, running: Option<ProcessId>) {
        for &process in &self.pool {
            if Some(process) != running {
                *self.aging.entry(process).or_insert(0) += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::Process,
        sim::{ProcessDef, Sim},
    };

    fn run(defs: Vec<ProcessDef>, context_switch: u64, aging: u64) -> crate::sim::SimOutcome {
        let config = SimConfig::new()
            .with_context_switch(context_switch)
            .with_aging_interval(aging);
        Sim::new(defs, config)
            .expect("valid workload")
            .run(PolicyKind::Priority)
    }

    #[test]
    fn effective_priority_floors_at_interval_boundaries() {
        let def = ProcessDef::new("P", 0, 1, 7);
        let mut ctx = SimCtx::new(vec![Process::new(0, &def, 2)]);
        let config = SimConfig::new().with_aging_interval(5);
        let mut scheduler = AgingScheduler::init(&mut ctx, &config);
        scheduler.enqueue(&mut ctx, 0, crate::scheduler::ENQ_ARRIVAL);

        let mut seen = Vec::new();
        for _ in 0..11 {
            seen.push(scheduler.effective_priority(&ctx, 0));
            scheduler.elapsed(&mut ctx, None);
        }
        assert_eq!(seen, vec![7, 7, 7, 7, 7, 6, 6, 6, 6, 6, 5]);

        scheduler.running(&mut ctx, 0);
        assert_eq!(scheduler.aging_of(0), 0);
        assert_eq!(scheduler.effective_priority(&ctx, 0), 7);
    }

    #[test]
    fn equal_priority_keeps_admission_order() {
        let defs = vec![ProcessDef::new("A", 0, 2, 1), ProcessDef::new("B", 0, 2, 1)];
        let outcome = run(defs, 0, 5);
        assert_eq!(outcome.execution_order(), vec!["A", "B"]);
    }

    #[test]
    fn aging_lets_a_starved_process_through() {
        let defs = vec![ProcessDef::new("L", 0, 12, 1), ProcessDef::new("H", 0, 2, 3)];
        let outcome = run(defs, 0, 2);
        assert_eq!(outcome.execution_order(), vec!["L", "H", "L", "H"]);
        let h = outcome.process("H").expect("H");
        assert_eq!(h.completion_time, 14);
        assert_eq!(outcome.process("L").expect("L").completion_time, 13);
    }

    #[test]
    fn switch_units_count_towards_aging() {
        let defs = vec![ProcessDef::new("L", 0, 12, 1), ProcessDef::new("H", 0, 2, 3)];
        let outcome = run(defs, 1, 2);
        assert_eq!(outcome.execution_order(), vec!["L", "H", "L", "H", "L"]);
        assert_eq!(outcome.process("H").expect("H").completion_time, 16);
        assert_eq!(outcome.process("L").expect("L").completion_time, 18);
    }
}
