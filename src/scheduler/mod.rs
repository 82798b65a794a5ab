pub mod ag;
pub mod priority;
pub mod psjf;
pub mod rr;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    core::{ProcessId, SimCtx, Ticks},
    sim::SimConfig,
};
pub use ag::AgScheduler;
pub use priority::AgingScheduler;
pub use psjf::SjfScheduler;
pub use rr::RoundRobinScheduler;

pub type EnqueueFlags = u64;

// Newly admitted by the arrival feed
pub const ENQ_ARRIVAL: EnqueueFlags = 1 << 0;
// Requeued after its slice ran out
pub const ENQ_REENQ: EnqueueFlags = 1 << 1;

/// What the driver does with the running process after a unit executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    /// Keep the current slice going.
    Continue,
    /// Free the CPU. The scheduler already holds the process in its ready pool
    /// (or it completed); selection happens on the next step.
    Release,
    /// Slice used up. The driver re-enqueues the process with [`ENQ_REENQ`]
    /// behind whatever arrived during this unit.
    Expire,
    /// Hand the CPU straight to another process. The scheduler has already
    /// requeued the preempted one.
    Switch(ProcessId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PolicyKind {
    #[serde(rename = "SJF", alias = "PSJF")]
    Psjf,
    #[serde(rename = "RR")]
    RoundRobin,
    #[serde(rename = "Priority")]
    Priority,
    #[serde(rename = "AG")]
    Ag,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 4] = [Self::Psjf, Self::RoundRobin, Self::Priority, Self::Ag];

    /// Tolerance the recorded expectations for this policy were checked with.
    pub fn default_tolerance(self) -> f64 {
        match self {
            Self::Ag => 0.5,
            _ => 0.1,
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Psjf => "Preemptive SJF",
            Self::RoundRobin => "Round Robin",
            Self::Priority => "Priority with Aging",
            Self::Ag => "AG",
        };
        f.write_str(name)
    }
}

pub trait Scheduler {
    const KIND: PolicyKind;

    fn init(ctx: &mut SimCtx, config: &SimConfig) -> Self;

    fn enqueue(&mut self, ctx: &mut SimCtx, process: ProcessId, flags: EnqueueFlags);

    /// Picks the process for a fresh slice, or `None` to leave the CPU idle.
    fn dispatch(&mut self, ctx: &mut SimCtx) -> Option<ProcessId>;

    /// Whether a context switch is charged before `next` starts its slice.
    fn needs_switch(&self, prev: Option<ProcessId>, next: ProcessId) -> bool {
        prev.is_some_and(|prev| prev != next)
    }

    // Called right before the first unit of a slice, after any context switch
    fn running(&mut self, _ctx: &mut SimCtx, _process: ProcessId) {}

    fn tick(&mut self, ctx: &mut SimCtx, process: ProcessId) -> TickDecision;

    // Called for every unit of simulated time, once arrivals for the new time are admitted
    fn elapsed(&mut self, _ctx: &mut SimCtx, _running: Option<ProcessId>) {}

    fn idle_until(&self, ctx: &SimCtx) -> Ticks {
        ctx.now + 1
    }
}
