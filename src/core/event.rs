use crate::core::{ProcessId, Ticks};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    Arrived {
        process: ProcessId,
    },
    // Charged before `to` starts its slice; `cost` may be zero
    ContextSwitch {
        from: Option<ProcessId>,
        to: ProcessId,
        cost: Ticks,
    },
    Dispatched {
        process: ProcessId,
    },
    SliceExpired {
        process: ProcessId,
    },
    // `used` counts the units the preempted slice ran
    Preempted {
        process: ProcessId,
        by: ProcessId,
        used: Ticks,
    },
    Completed {
        process: ProcessId,
    },
    // CPU idle from `from` until `until`
    Idle {
        from: Ticks,
        until: Ticks,
    },
}
