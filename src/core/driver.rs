use super::{
    event::SimEvent,
    observer::Observer,
    state::{Process, ProcessId, SimCtx, Ticks},
    trace::ExecutionTrace,
};
use crate::{
    scheduler::{ENQ_ARRIVAL, ENQ_REENQ, Scheduler, TickDecision},
    sim::SimConfig,
};

pub struct SchedCore<S: Scheduler> {
    pub ctx: SimCtx,
    pub scheduler: S,
    pub trace: ExecutionTrace,
    context_switch: Ticks,
    // Process mid-slice
    current: Option<ProcessId>,
    // Chosen by a `TickDecision::Switch`, slice not started yet
    handoff: Option<ProcessId>,
    last_ran: Option<ProcessId>,
    // Clock value when the current slice's first unit started
    slice_start: Ticks,
    observer: Observer,
}

impl<S: Scheduler> SchedCore<S> {
    pub fn new(processes: Vec<Process>, config: &SimConfig) -> Self {
        let mut ctx = SimCtx::new(processes);
        let scheduler = S::init(&mut ctx, config);
        Self {
            ctx,
            scheduler,
            trace: ExecutionTrace::new(),
            context_switch: config.context_switch,
            current: None,
            handoff: None,
            last_ran: None,
            slice_start: 0,
            observer: Observer::new(),
        }
    }

    pub fn finished(&self) -> bool {
        self.ctx.all_completed()
    }

    /// Runs one unit of work (or one idle stretch) and returns what happened.
    pub fn step(&mut self) -> Vec<SimEvent> {
        let mut events = Vec::new();
        if self.finished() {
            return events;
        }

        self.admit_arrivals(&mut events);

        let process = match (self.current, self.handoff.take()) {
            (Some(process), _) => process,
            (None, Some(process)) => {
                self.start_slice(process, &mut events);
                process
            }
            (None, None) => match self.scheduler.dispatch(&mut self.ctx) {
                Some(process) => {
                    self.start_slice(process, &mut events);
                    process
                }
                None => {
                    self.idle(&mut events);
                    self.observer.observe(&self.ctx, &self.trace);
                    return events;
                }
            },
        };

        self.run_unit(process, &mut events);
        self.observer.observe(&self.ctx, &self.trace);
        events
    }

    fn admit_arrivals(&mut self, events: &mut Vec<SimEvent>) {
        for process in self.ctx.take_arrivals() {
            self.scheduler.enqueue(&mut self.ctx, process, ENQ_ARRIVAL);
            events.push(SimEvent::Arrived { process });
        }
    }

    // One unit of time passes with nobody executing
    fn pass_unit(&mut self, events: &mut Vec<SimEvent>) {
        self.ctx.advance_time(1);
        self.admit_arrivals(events);
        self.scheduler.elapsed(&mut self.ctx, None);
    }

    fn idle(&mut self, events: &mut Vec<SimEvent>) {
        let from = self.ctx.now;
        let until = self.scheduler.idle_until(&self.ctx).max(from + 1);
        events.push(SimEvent::Idle { from, until });
        while self.ctx.now < until {
            self.pass_unit(events);
        }
    }

    fn start_slice(&mut self, process: ProcessId, events: &mut Vec<SimEvent>) {
        if self.scheduler.needs_switch(self.last_ran, process) {
            log::debug!(
                "t={} context switch {:?} -> {} ({} units)",
                self.ctx.now,
                self.last_ran,
                process,
                self.context_switch
            );
            events.push(SimEvent::ContextSwitch {
                from: self.last_ran,
                to: process,
                cost: self.context_switch,
            });
            for _ in 0..self.context_switch {
                self.pass_unit(events);
            }
        }

        self.slice_start = self.ctx.now;
        self.ctx.set_running(process);
        self.scheduler.running(&mut self.ctx, process);
        events.push(SimEvent::Dispatched { process });
    }

    fn run_unit(&mut self, process: ProcessId, events: &mut Vec<SimEvent>) {
        let started = self.ctx.now;
        let remaining = self.ctx.execute(process);
        self.trace.record(started, process);
        self.ctx.advance_time(1);

        if remaining == 0 {
            self.ctx.mark_completed(process, self.ctx.now);
            log::debug!("t={} {} completed", self.ctx.now, process);
            events.push(SimEvent::Completed { process });
        }

        let decision = self.scheduler.tick(&mut self.ctx, process);
        self.admit_arrivals(events);
        self.scheduler.elapsed(&mut self.ctx, Some(process));
        self.last_ran = Some(process);

        let completed = self.ctx.process(process).is_completed();
        debug_assert!(
            !(completed && decision == TickDecision::Continue),
            "Completed process {process} cannot keep the CPU"
        );

        self.current = None;
        match decision {
            TickDecision::Continue => self.current = Some(process),
            TickDecision::Release => {
                if !completed {
                    self.ctx.mark_runnable(process);
                }
            }
            TickDecision::Expire => {
                self.ctx.mark_runnable(process);
                self.scheduler.enqueue(&mut self.ctx, process, ENQ_REENQ);
                events.push(SimEvent::SliceExpired { process });
            }
            TickDecision::Switch(next) => {
                self.ctx.mark_runnable(process);
                self.handoff = Some(next);
                events.push(SimEvent::Preempted {
                    process,
                    by: next,
                    used: self.ctx.now - self.slice_start,
                });
            }
        }
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}
