//! Per-suite state carried through the pipeline

use std::path::PathBuf;
use std::time::Duration;

use crate::classify::{Classification, FailureReason};

/// Final verdict for a suite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Pass => write!(f, "pass"),
            Outcome::Fail => write!(f, "fail"),
        }
    }
}

/// How a child process invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessStatus {
    /// No command was configured for the stage
    Skipped,
    /// The process exited; `code` is `None` when it was killed by a signal
    Exited { code: Option<i32> },
    /// The process outlived its limit and was killed
    TimedOut { after: Duration },
    /// The process could not be started or waited on
    Failed { reason: String },
}

impl ProcessStatus {
    pub fn success(&self) -> bool {
        matches!(self, ProcessStatus::Exited { code: Some(0) } | ProcessStatus::Skipped)
    }
}

impl std::fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessStatus::Skipped => write!(f, "skipped"),
            ProcessStatus::Exited { code: Some(code) } => write!(f, "exit code {}", code),
            ProcessStatus::Exited { code: None } => write!(f, "terminated by signal"),
            ProcessStatus::TimedOut { after } => write!(f, "timed out after {}s", after.as_secs()),
            ProcessStatus::Failed { reason } => write!(f, "{}", reason),
        }
    }
}

/// Position of a suite in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteState {
    Discovered,
    Cleaned,
    Built,
    Executed,
    Classified(Outcome),
}

/// One discovered test suite directory
#[derive(Debug, Clone)]
pub struct Suite {
    /// Absolute path of the suite directory
    pub path: PathBuf,

    /// Whether the artifact cleaner has visited the directory
    pub cleaned: bool,

    /// Non-fatal errors raised while removing artifacts
    pub clean_errors: Vec<String>,

    /// Summary status of the build steps, `None` until built
    pub build: Option<ProcessStatus>,

    /// Status of the suite executable, `None` until executed
    pub run: Option<ProcessStatus>,

    /// Results file content, `None` when absent
    pub output: Option<String>,

    /// Verdict, `None` until classified
    pub classification: Option<Classification>,
}

impl Suite {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            cleaned: false,
            clean_errors: Vec::new(),
            build: None,
            run: None,
            output: None,
            classification: None,
        }
    }

    /// Directory name, which is also the executable's base name
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn state(&self) -> SuiteState {
        if let Some(classification) = &self.classification {
            SuiteState::Classified(classification.outcome)
        } else if self.run.is_some() {
            SuiteState::Executed
        } else if self.build.is_some() {
            SuiteState::Built
        } else if self.cleaned {
            SuiteState::Cleaned
        } else {
            SuiteState::Discovered
        }
    }

    /// Outcome of the suite; anything not classified yet counts as a failure
    pub fn outcome(&self) -> Outcome {
        self.classification
            .as_ref()
            .map(|c| c.outcome)
            .unwrap_or(Outcome::Fail)
    }

    pub fn passed(&self) -> bool {
        self.outcome() == Outcome::Pass
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        self.classification.as_ref().and_then(|c| c.reason)
    }
}
