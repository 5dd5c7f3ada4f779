//! Removal of artifacts left behind by a previous build/run cycle

use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::CleanerConfig;
use crate::error::{RunnerError, RunnerResult};

/// One entry of the artifact list
#[derive(Debug, Clone)]
enum ArtifactRule {
    /// A file or directory with exactly this name
    Exact(String),
    /// Files whose name matches a wildcard pattern
    Pattern { source: String, regex: Regex },
}

impl ArtifactRule {
    fn parse(entry: &str) -> RunnerResult<Self> {
        if !entry.contains(['*', '?']) {
            return Ok(ArtifactRule::Exact(entry.to_string()));
        }
        let translated = regex::escape(entry)
            .replace(r"\*", ".*")
            .replace(r"\?", ".");
        let regex = Regex::new(&format!("^{}$", translated)).map_err(|source| RunnerError::Pattern {
            pattern: entry.to_string(),
            source,
        })?;
        Ok(ArtifactRule::Pattern {
            source: entry.to_string(),
            regex,
        })
    }
}

/// What a cleaning pass did
#[derive(Debug, Default, Clone)]
pub struct CleanReport {
    pub removed: Vec<PathBuf>,
    pub errors: Vec<String>,
}

/// Deletes the configured artifacts from a suite directory
#[derive(Debug, Clone)]
pub struct ArtifactCleaner {
    rules: Vec<ArtifactRule>,
}

impl ArtifactCleaner {
    pub fn new(config: &CleanerConfig) -> RunnerResult<Self> {
        let rules = config
            .artifacts
            .iter()
            .map(|entry| ArtifactRule::parse(entry))
            .collect::<RunnerResult<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Always remove `name`, the file suite output is appended to, so a
    /// previous run's results can never be classified again
    pub fn with_results_file(mut self, name: &str) -> Self {
        let listed = self
            .rules
            .iter()
            .any(|rule| matches!(rule, ArtifactRule::Exact(existing) if existing == name));
        if !listed {
            self.rules.push(ArtifactRule::Exact(name.to_string()));
        }
        self
    }

    /// Remove every listed artifact present in `dir`.
    ///
    /// Never fails: deletion errors are logged and collected in the report,
    /// and cleaning carries on with the remaining entries.
    pub fn clean(&self, dir: &Path) -> CleanReport {
        let mut report = CleanReport::default();

        for rule in &self.rules {
            match rule {
                ArtifactRule::Exact(name) => remove_entry(&dir.join(name), &mut report),
                ArtifactRule::Pattern { source, regex } => {
                    let entries = match fs::read_dir(dir) {
                        Ok(entries) => entries,
                        Err(e) => {
                            record_error(&mut report, format!("Error listing {} for '{}': {}", dir.display(), source, e));
                            continue;
                        }
                    };
                    for entry in entries.flatten() {
                        let name = entry.file_name();
                        if !regex.is_match(&name.to_string_lossy()) {
                            continue;
                        }
                        let path = entry.path();
                        if path.is_file() {
                            remove_entry(&path, &mut report);
                        }
                    }
                }
            }
        }

        report
    }
}

fn remove_entry(path: &Path, report: &mut CleanReport) {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return,
        Err(e) => {
            record_error(report, format!("Error: {}: {}", path.display(), e));
            return;
        }
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => {
            debug!("Removed {}", path.display());
            report.removed.push(path.to_path_buf());
        }
        Err(e) => record_error(report, format!("Error deleting {}: {}", path.display(), e)),
    }
}

fn record_error(report: &mut CleanReport, message: String) {
    warn!("{}", message);
    report.errors.push(message);
}
