//! Suite build stage

use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{CommandSpec, ToolchainConfig};
use crate::exec::Invocation;
use crate::suite::ProcessStatus;

/// Runs the configured build steps inside a suite directory
#[derive(Debug, Clone)]
pub struct BuildExecutor {
    steps: Vec<CommandSpec>,
    timeout: Option<Duration>,
}

impl BuildExecutor {
    pub fn new(config: &ToolchainConfig) -> Self {
        Self {
            steps: config.build_steps.clone(),
            timeout: config.build_timeout(),
        }
    }

    /// Run every build step in order.
    ///
    /// A failing step does not stop the ones after it. The returned status is
    /// the first unsuccessful step's, or the last step's when all succeeded.
    pub async fn build(&self, suite_dir: &Path) -> ProcessStatus {
        let mut summary: Option<ProcessStatus> = None;

        for step in &self.steps {
            info!("Building: {}", step);

            let status = match Invocation::new(&step.program, suite_dir)
                .args(step.args.iter().cloned())
                .timeout(self.timeout)
                .execute()
                .await
            {
                Ok(status) => status,
                Err(e) => ProcessStatus::Failed { reason: e.to_string() },
            };

            if !status.success() {
                warn!("Build step '{}' in {}: {}", step, suite_dir.display(), status);
            }

            let keep_previous = summary.as_ref().is_some_and(|s| !s.success());
            if !keep_previous {
                summary = Some(status);
            }
        }

        summary.unwrap_or(ProcessStatus::Skipped)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn executor(steps: Vec<CommandSpec>) -> BuildExecutor {
        BuildExecutor::new(&ToolchainConfig {
            build_steps: steps,
            build_timeout_secs: 10,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_no_steps_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(executor(vec![]).build(tmp.path()).await, ProcessStatus::Skipped);
    }

    #[tokio::test]
    async fn test_failing_step_does_not_stop_later_steps() {
        let tmp = tempfile::tempdir().unwrap();
        let status = executor(vec![
            CommandSpec::new("sh", ["-c", "exit 2"]),
            CommandSpec::new("sh", ["-c", "touch built.flag"]),
        ])
        .build(tmp.path())
        .await;

        assert_eq!(status, ProcessStatus::Exited { code: Some(2) });
        assert!(tmp.path().join("built.flag").exists());
    }

    #[tokio::test]
    async fn test_missing_toolchain_is_recorded() {
        let tmp = tempfile::tempdir().unwrap();
        let status = executor(vec![CommandSpec::new("definitely-not-a-build-tool", ["debug"])])
            .build(tmp.path())
            .await;
        assert!(matches!(status, ProcessStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn test_all_steps_succeed() {
        let tmp = tempfile::tempdir().unwrap();
        let status = executor(vec![
            CommandSpec::new("sh", ["-c", "true"]),
            CommandSpec::new("sh", ["-c", "exit 0"]),
        ])
        .build(tmp.path())
        .await;
        assert!(status.success());
    }
}
