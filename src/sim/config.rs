use std::{error::Error, fmt};

use super::ProcessDef;
use crate::core::Ticks;
use rustc_hash::FxHashSet;

/// Simulation-wide settings shared by every policy run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Units charged whenever the running process changes
    pub context_switch: Ticks,
    /// Round Robin slice, and the AG fallback for processes without their own
    pub quantum: Ticks,
    /// Waiting units per one step of priority boost
    pub aging_interval: Ticks,
}

impl SimConfig {
    pub const DEFAULT_QUANTUM: Ticks = 2;
    pub const DEFAULT_AGING_INTERVAL: Ticks = 5;

    pub fn new() -> Self {
        Self {
            context_switch: 0,
            quantum: Self::DEFAULT_QUANTUM,
            aging_interval: Self::DEFAULT_AGING_INTERVAL,
        }
    }

    pub fn with_context_switch(self, context_switch: Ticks) -> Self {
        Self {
            context_switch,
            ..self
        }
    }

    pub fn with_quantum(self, quantum: Ticks) -> Self {
        Self { quantum, ..self }
    }

    pub fn with_aging_interval(self, aging_interval: Ticks) -> Self {
        Self {
            aging_interval,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quantum == 0 {
            return Err(ConfigError::ZeroQuantum);
        }
        if self.aging_interval == 0 {
            return Err(ConfigError::ZeroAgingInterval);
        }
        Ok(())
    }

    pub fn validate_processes(&self, defs: &[ProcessDef]) -> Result<(), ConfigError> {
        let mut names = FxHashSet::default();
        for def in defs {
            if def.name.is_empty() {
                return Err(ConfigError::EmptyName);
            }
            if def.burst_time == 0 {
                return Err(ConfigError::ZeroBurst {
                    name: def.name.clone(),
                });
            }
            if def.quantum == Some(0) {
                return Err(ConfigError::ZeroProcessQuantum {
                    name: def.name.clone(),
                });
            }
            if !names.insert(def.name.as_str()) {
                return Err(ConfigError::DuplicateName {
                    name: def.name.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Round Robin / AG quantum must be positive
    ZeroQuantum,
    /// Aging divides by the interval
    ZeroAgingInterval,
    ZeroBurst {
        name: String,
    },
    ZeroProcessQuantum {
        name: String,
    },
    DuplicateName {
        name: String,
    },
    EmptyName,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroQuantum => write!(f, "quantum must be greater than zero"),
            Self::ZeroAgingInterval => write!(f, "aging interval must be greater than zero"),
            Self::ZeroBurst { name } => {
                write!(f, "process {name} has a zero burst time")
            }
            Self::ZeroProcessQuantum { name } => {
                write!(f, "process {name} has a zero initial quantum")
            }
            Self::DuplicateName { name } => {
                write!(f, "process name {name} is used more than once")
            }
            Self::EmptyName => write!(f, "process name must not be empty"),
        }
    }
}

impl Error for ConfigError {}
