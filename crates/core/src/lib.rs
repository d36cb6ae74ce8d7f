//! avd-provision core - shared types
//!
//! Error taxonomy, step configuration, the external-process seam and the
//! run state machine used by the toolchain and emulator crates.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod process;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{Abi, StepConfig, Tag};
pub use error::{Result, StepError};
pub use orchestrator::{Orchestrator, RunState};
pub use process::{run_to_completion, CommandOutcome, CommandRunner, Invocation, RunFailure, SystemRunner};

/// avd-provision version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
