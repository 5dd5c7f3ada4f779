//! Runner configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{RunnerError, RunnerResult};

/// Substring a directory path must contain to be treated as a suite
pub const DEFAULT_SUITE_PATTERN: &str = "unit_test";

/// Text a suite binary prints when none of its cases failed
pub const DEFAULT_MARKER: &str = "Failed test case number : 0";

/// File each suite binary's stdout is appended to
pub const DEFAULT_RESULTS_FILE: &str = "results.txt";

/// Runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Directory whose immediate children are scanned for suites
    pub root: PathBuf,

    /// Name of the results file inside each suite directory
    pub results_file: String,

    /// Discovery configuration
    pub discovery: DiscoveryConfig,

    /// Artifact cleaning configuration
    pub cleaner: CleanerConfig,

    /// Build and run commands
    pub toolchain: ToolchainConfig,

    /// Result classification
    pub classifier: ClassifierConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            results_file: DEFAULT_RESULTS_FILE.to_string(),
            discovery: DiscoveryConfig::default(),
            cleaner: CleanerConfig::default(),
            toolchain: ToolchainConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

/// Discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Substring matched against each candidate's absolute path
    pub pattern: String,

    /// Keep only suites whose directory name contains this
    pub filter: Option<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_SUITE_PATTERN.to_string(),
            filter: None,
        }
    }
}

/// Artifact cleaning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Entry names removed from a suite directory before it is rebuilt.
    /// `*` and `?` wildcards make an entry a file-name pattern.
    pub artifacts: Vec<String>,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            artifacts: [
                "unit_test*.exe",
                ".vs",
                "x64",
                "log.txt",
                DEFAULT_RESULTS_FILE,
                "sequence.store",
                "orders",
                "messages_incoming",
                "messages_outgoing",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// A program and its argument vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Build and run commands for the host platform
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Build steps, run in order inside the suite directory
    pub build_steps: Vec<CommandSpec>,

    /// Appended to the suite directory name to form the executable name
    pub executable_suffix: String,

    /// Arguments passed to the suite executable
    pub run_args: Vec<String>,

    /// Limit for each build step in seconds (0 = no limit)
    pub build_timeout_secs: u64,

    /// Limit for the suite executable in seconds (0 = no limit)
    pub run_timeout_secs: u64,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        if cfg!(windows) {
            Self {
                build_steps: vec![CommandSpec::new("cmd", ["/C", "build_msvc.bat", "no_pause"])],
                executable_suffix: ".exe".to_string(),
                run_args: vec!["no_pause".to_string()],
                build_timeout_secs: 600,
                run_timeout_secs: 1800,
            }
        } else {
            Self {
                build_steps: vec![
                    CommandSpec::new("make", ["clean"]),
                    CommandSpec::new("make", ["debug"]),
                ],
                executable_suffix: String::new(),
                run_args: Vec::new(),
                build_timeout_secs: 600,
                run_timeout_secs: 1800,
            }
        }
    }
}

impl ToolchainConfig {
    pub fn build_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.build_timeout_secs)
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.run_timeout_secs)
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Result classification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Exact substring whose presence in the results file means success
    pub marker: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
        }
    }
}

impl RunnerConfig {
    /// Load configuration from a TOML file, falling back to defaults if it does not exist
    pub fn load(path: &Path) -> RunnerResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Check values that would make every suite fail for the wrong reason
    pub fn validate(&self) -> RunnerResult<()> {
        if self.discovery.pattern.is_empty() {
            return Err(RunnerError::InvalidConfig(
                "discovery.pattern must not be empty".to_string(),
            ));
        }
        if self.classifier.marker.is_empty() {
            return Err(RunnerError::InvalidConfig(
                "classifier.marker must not be empty".to_string(),
            ));
        }
        let results = Path::new(&self.results_file);
        if self.results_file.is_empty() || results.components().count() != 1 {
            return Err(RunnerError::InvalidConfig(format!(
                "results_file must be a plain file name, got '{}'",
                self.results_file
            )));
        }
        if let Some(step) = self.toolchain.build_steps.iter().find(|s| s.program.is_empty()) {
            return Err(RunnerError::InvalidConfig(format!(
                "build step has an empty program: {:?}",
                step.args
            )));
        }
        Ok(())
    }

    /// Path of the results file inside a suite directory
    pub fn results_path(&self, suite_dir: &Path) -> PathBuf {
        suite_dir.join(&self.results_file)
    }
}
