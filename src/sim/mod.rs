pub mod config;
pub mod driver;
pub mod fixture;
pub mod outcome;
pub mod process;

pub use config::{ConfigError, SimConfig};
pub use driver::Sim;
pub use fixture::{ExpectedMetrics, ExpectedOutput, Fixture, FixtureError, Verdict};
pub use outcome::{OutcomeSummary, SimOutcome};
pub use process::{ProcessDef, ProcessResult};
