//! CertChain scenario runner
//!
//! Drives a `CertRegistry` through a scripted sequence of calls loaded from
//! TOML and reports each step's outcome.

pub mod runner;
pub mod scenario;

pub use runner::{run_scenario, ScenarioReport, StepOutcome};
pub use scenario::{ReceiverSpec, Scenario, Step, StepSpec};
