//! Suite run stage

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::RunnerConfig;
use crate::exec::Invocation;
use crate::suite::ProcessStatus;

/// Runs a suite's compiled binary, appending its stdout to the results file
#[derive(Debug, Clone)]
pub struct RunExecutor {
    executable_suffix: String,
    args: Vec<String>,
    results_file: String,
    timeout: Option<Duration>,
}

impl RunExecutor {
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            executable_suffix: config.toolchain.executable_suffix.clone(),
            args: config.toolchain.run_args.clone(),
            results_file: config.results_file.clone(),
            timeout: config.toolchain.run_timeout(),
        }
    }

    /// The binary is named after its suite directory
    pub fn executable_path(&self, suite_dir: &Path) -> PathBuf {
        let name = suite_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        suite_dir.join(format!("{}{}", name, self.executable_suffix))
    }

    pub async fn run(&self, suite_dir: &Path) -> ProcessStatus {
        let executable = self.executable_path(suite_dir);

        // Leave the results file absent when there is nothing to run
        if !executable.is_file() {
            warn!("Executable not found: {}", executable.display());
            return ProcessStatus::Failed {
                reason: format!("executable not found: {}", executable.display()),
            };
        }

        info!("Running {}", executable.display());

        let status = match Invocation::new(&executable, suite_dir)
            .args(self.args.iter().cloned())
            .append_stdout(suite_dir.join(&self.results_file))
            .timeout(self.timeout)
            .execute()
            .await
        {
            Ok(status) => status,
            Err(e) => ProcessStatus::Failed { reason: e.to_string() },
        };

        info!("{} finished: {}", executable.display(), status);
        status
    }
}
