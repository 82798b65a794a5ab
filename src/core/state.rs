use super::metrics::Metrics;
use crate::sim::ProcessDef;

// Index into Process Vec
pub type ProcessId = usize;
pub type Ticks = u64;
pub type Priority = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    // Not yet admitted by the arrival feed
    Pending,
    Runnable,
    Running,
    Completed,
}

#[derive(Debug, Clone)]
pub struct Process {
    pub id: ProcessId,
    pub name: String,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    pub priority: Priority,
    pub state: ProcessState,
    pub remaining_time: Ticks,
    // Only meaningful under RR/AG
    pub quantum: Ticks,
    pub quantum_history: Vec<Ticks>,
    pub metrics: Option<Metrics>,
}

impl Process {
    pub fn new(id: ProcessId, def: &ProcessDef, default_quantum: Ticks) -> Self {
        Self {
            id,
            name: def.name.clone(),
            arrival_time: def.arrival_time,
            burst_time: def.burst_time,
            priority: def.priority,
            state: ProcessState::Pending,
            remaining_time: def.burst_time,
            quantum: def.quantum.unwrap_or(default_quantum),
            quantum_history: Vec::new(),
            metrics: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state == ProcessState::Completed
    }
}

#[derive(Debug)]
pub struct SimCtx {
    pub now: Ticks,
    pub processes: Vec<Process>,

    // Process ids sorted by (arrival_time, id); the arrival feed walks this once
    arrival_order: Vec<ProcessId>,
    arrival_cursor: usize,
    completed: usize,
}

impl SimCtx {
    pub fn new(processes: Vec<Process>) -> Self {
        for (index, process) in processes.iter().enumerate() {
            debug_assert_eq!(process.id, index, "ProcessId must match Vec index");
        }

        let mut arrival_order: Vec<ProcessId> = (0..processes.len()).collect();
        // Stable: ties keep input order
        arrival_order.sort_by_key(|&id| processes[id].arrival_time);

        Self {
            now: 0,
            processes,
            arrival_order,
            arrival_cursor: 0,
            completed: 0,
        }
    }

    pub fn advance_time(&mut self, delta: Ticks) {
        self.now = self.now.saturating_add(delta);
    }

    /// Moves every pending process whose arrival time has been reached into the
    /// runnable state, returning them in arrival order.
    pub fn take_arrivals(&mut self) -> Vec<ProcessId> {
        let mut arrived = Vec::new();
        while let Some(&id) = self.arrival_order.get(self.arrival_cursor) {
            if self.processes[id].arrival_time > self.now {
                break;
            }
            self.processes[id].state = ProcessState::Runnable;
            arrived.push(id);
            self.arrival_cursor += 1;
        }
        arrived
    }

    pub fn next_arrival(&self) -> Option<Ticks> {
        self.arrival_order
            .get(self.arrival_cursor)
            .map(|&id| self.processes[id].arrival_time)
    }

    pub fn process(&self, id: ProcessId) -> &Process {
        &self.processes[id]
    }

    pub fn process_mut(&mut self, id: ProcessId) -> &mut Process {
        &mut self.processes[id]
    }

    pub fn all_completed(&self) -> bool {
        self.completed == self.processes.len()
    }

    pub fn set_running(&mut self, id: ProcessId) {
        let process = self.process_mut(id);
        debug_assert_eq!(
            process.state,
            ProcessState::Runnable,
            "Process {id} must be runnable before it is dispatched"
        );
        process.state = ProcessState::Running;
    }

    pub fn mark_runnable(&mut self, id: ProcessId) {
        let process = self.process_mut(id);
        debug_assert!(
            process.state != ProcessState::Completed,
            "Completed process {id} cannot be runnable"
        );
        process.state = ProcessState::Runnable;
    }

    // Runs `id` for one unit; the clock is advanced by the caller
    pub fn execute(&mut self, id: ProcessId) -> Ticks {
        let process = self.process_mut(id);
        debug_assert_eq!(
            process.state,
            ProcessState::Running,
            "Process {id} must be running to execute"
        );
        process.remaining_time = process
            .remaining_time
            .checked_sub(1)
            .expect("Executed a process with no remaining time");
        process.remaining_time
    }

    pub fn mark_completed(&mut self, id: ProcessId, completion_time: Ticks) {
        let process = &mut self.processes[id];
        debug_assert!(
            process.state == ProcessState::Running && process.remaining_time == 0,
            "Process {id} must have been running to completion before marked complete"
        );
        debug_assert!(process.metrics.is_none(), "Process {id} completed twice");

        process.state = ProcessState::Completed;
        process.metrics = Some(Metrics::at_completion(
            process.arrival_time,
            process.burst_time,
            completion_time,
        ));
        self.completed += 1;
    }
}
