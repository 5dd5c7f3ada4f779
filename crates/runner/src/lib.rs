//! suiterunner - unit test suite orchestration
//!
//! This crate drives a directory of independent native test suites:
//! - Discovers `unit_test*` suite directories under a root
//! - Removes artifacts left over by a previous cycle
//! - Rebuilds each suite with the platform toolchain
//! - Runs each suite binary, appending its stdout to `results.txt`
//! - Classifies every suite from its results file and prints a report
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Pipeline                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  discover(root) -> [Suite]                                  │
//! │                                                             │
//! │  pass 1, per suite (sequential):                            │
//! │    ├── ArtifactCleaner::clean(dir)  -> CleanReport          │
//! │    ├── BuildExecutor::build(dir)    -> ProcessStatus        │
//! │    └── RunExecutor::run(dir)        -> ProcessStatus        │
//! │                                                             │
//! │  pass 2, per suite (sequential):                            │
//! │    └── ResultClassifier             -> Pass | Fail          │
//! │                                                             │
//! │  ReportAggregator -> RunReport -> ConsoleReporter           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The process working directory is never changed: every stage takes the
//! suite path explicitly and child processes are spawned inside it.

pub mod build;
pub mod classify;
pub mod cleaner;
pub mod config;
pub mod discovery;
pub mod error;
pub mod exec;
pub mod pipeline;
pub mod report;
pub mod run;
pub mod suite;

pub use classify::{Classification, FailureReason, ResultClassifier};
pub use config::RunnerConfig;
pub use error::{RunnerError, RunnerResult};
pub use pipeline::Pipeline;
pub use report::{ConsoleReporter, Reporter, RunReport};
pub use suite::{Outcome, ProcessStatus, Suite};
