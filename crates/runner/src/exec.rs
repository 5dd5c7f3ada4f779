//! Structured child process invocation
//!
//! Build and run stages never go through a shell: each invocation names a
//! program, an argument vector and the working directory explicitly, and
//! reports its exit status.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{RunnerError, RunnerResult};
use crate::suite::ProcessStatus;

/// Time a child gets to exit after SIGTERM before it is killed
#[cfg_attr(not(unix), allow(dead_code))]
const TERMINATE_GRACE: Duration = Duration::from_millis(500);

/// A single child process to run to completion
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Program to execute
    pub program: PathBuf,

    /// Arguments passed to the program
    pub args: Vec<String>,

    /// Working directory of the child
    pub cwd: PathBuf,

    /// File the child's stdout is appended to; inherited when `None`
    pub stdout_append: Option<PathBuf>,

    /// Kill the child after this long
    pub timeout: Option<Duration>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, cwd: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
            stdout_append: None,
            timeout: None,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn append_stdout(mut self, path: PathBuf) -> Self {
        self.stdout_append = Some(path);
        self
    }

    pub fn timeout(mut self, limit: Option<Duration>) -> Self {
        self.timeout = limit;
        self
    }

    /// Start the process and wait for it, honouring the timeout.
    ///
    /// Errors only when the process cannot be started; everything after a
    /// successful spawn is reported through the returned status.
    pub async fn execute(&self) -> RunnerResult<ProcessStatus> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if let Some(path) = &self.stdout_append {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| RunnerError::ResultsFile {
                    path: path.clone(),
                    source,
                })?;
            cmd.stdout(Stdio::from(file));
        }

        debug!("Spawning {} {:?} in {}", self.program.display(), self.args, self.cwd.display());

        let mut child = cmd.spawn().map_err(|source| RunnerError::Spawn {
            program: self.program.display().to_string(),
            source,
        })?;

        let waited = match self.timeout {
            Some(limit) => match timeout(limit, child.wait()).await {
                Ok(waited) => waited,
                Err(_) => {
                    warn!("{} exceeded {}s, terminating", self.program.display(), limit.as_secs());
                    terminate(&mut child).await;
                    return Ok(ProcessStatus::TimedOut { after: limit });
                }
            },
            None => child.wait().await,
        };

        Ok(match waited {
            Ok(status) => ProcessStatus::Exited { code: status.code() },
            Err(e) => ProcessStatus::Failed {
                reason: format!("waiting on {} failed: {}", self.program.display(), e),
            },
        })
    }
}

/// Stop a child, gracefully first where the platform allows it
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        if let Some(pid) = child.id() {
            if kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_ok()
                && timeout(TERMINATE_GRACE, child.wait()).await.is_ok()
            {
                return;
            }
        }
    }

    if let Err(e) = child.kill().await {
        warn!("Failed to kill child process: {}", e);
    }
}
