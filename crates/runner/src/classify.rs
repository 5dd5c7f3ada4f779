//! Pass/fail classification of captured suite output

use std::path::Path;
use tracing::warn;

use crate::config::{ClassifierConfig, DEFAULT_MARKER};
use crate::suite::Outcome;

/// Why a suite was classified as failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// No results file was produced
    ResultsMissing,
    /// The results file exists but is empty
    ResultsEmpty,
    /// The results file lacks the success marker
    MarkerAbsent,
    /// The suite binary was killed for running too long
    TimedOut,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::ResultsMissing => write!(f, "results file missing"),
            FailureReason::ResultsEmpty => write!(f, "results file empty"),
            FailureReason::MarkerAbsent => write!(f, "success marker not found"),
            FailureReason::TimedOut => write!(f, "suite timed out"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub outcome: Outcome,
    pub reason: Option<FailureReason>,
}

impl Classification {
    pub fn pass() -> Self {
        Self {
            outcome: Outcome::Pass,
            reason: None,
        }
    }

    pub fn fail(reason: FailureReason) -> Self {
        Self {
            outcome: Outcome::Fail,
            reason: Some(reason),
        }
    }
}

/// Decides a suite's outcome from its results file
#[derive(Debug, Clone)]
pub struct ResultClassifier {
    marker: String,
}

impl Default for ResultClassifier {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
        }
    }
}

impl ResultClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            marker: config.marker.clone(),
        }
    }

    /// Pass iff `content` contains the marker
    pub fn classify(&self, content: &str) -> Classification {
        if content.is_empty() {
            Classification::fail(FailureReason::ResultsEmpty)
        } else if content.contains(&self.marker) {
            Classification::pass()
        } else {
            Classification::fail(FailureReason::MarkerAbsent)
        }
    }

    /// Classify captured output, `None` meaning no results file
    pub fn classify_output(&self, output: Option<&str>) -> Classification {
        match output {
            Some(content) => self.classify(content),
            None => Classification::fail(FailureReason::ResultsMissing),
        }
    }

    pub fn classify_file(&self, path: &Path) -> Classification {
        self.classify_output(read_results(path).as_deref())
    }
}

/// Read a results file, `None` when it is absent, not a regular file or unreadable
pub fn read_results(path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }
    match std::fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            warn!("Cannot read {}: {}", path.display(), e);
            None
        }
    }
}
