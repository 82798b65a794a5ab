pub mod core;
pub mod scheduler;
pub mod sim;

pub use scheduler::{PolicyKind, Scheduler};
pub use sim::{ConfigError, Fixture, ProcessDef, Sim, SimConfig, SimOutcome};
