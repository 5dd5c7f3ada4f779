//! suiterunner CLI - Main Entry Point
//!
//! Rebuilds and runs every `unit_test*` suite under a directory and prints
//! which ones passed.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use suiterunner::{ConsoleReporter, Pipeline, RunReport, RunnerConfig};

/// Rebuild, run and check every unit test suite under a directory
#[derive(Parser, Debug)]
#[command(name = "suiterunner")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing the suite folders [default: .]
    #[arg(env = "SUITERUNNER_ROOT")]
    root: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, env = "SUITERUNNER_CONFIG", default_value = "suiterunner.toml")]
    config: PathBuf,

    /// Only run suites whose directory name contains this
    #[arg(short, long)]
    filter: Option<String>,

    /// Text whose presence in results.txt marks a suite as passed
    #[arg(long, env = "SUITERUNNER_MARKER")]
    marker: Option<String>,

    /// Limit for each build step in seconds (0 = no limit)
    #[arg(long, env = "SUITERUNNER_BUILD_TIMEOUT")]
    build_timeout: Option<u64>,

    /// Limit for each suite binary in seconds (0 = no limit)
    #[arg(long, env = "SUITERUNNER_RUN_TIMEOUT")]
    run_timeout: Option<u64>,

    /// Run the existing binaries without rebuilding them
    #[arg(long)]
    skip_build: bool,

    /// Exit with status 1 when any suite fails
    #[arg(long)]
    strict: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Layer command-line overrides over the file configuration
    fn apply(self, mut config: RunnerConfig) -> RunnerConfig {
        if let Some(root) = self.root {
            config.root = root;
        }
        if self.filter.is_some() {
            config.discovery.filter = self.filter;
        }
        if let Some(marker) = self.marker {
            config.classifier.marker = marker;
        }
        if let Some(secs) = self.build_timeout {
            config.toolchain.build_timeout_secs = secs;
        }
        if let Some(secs) = self.run_timeout {
            config.toolchain.run_timeout_secs = secs;
        }
        if self.skip_build {
            config.toolchain.build_steps.clear();
        }
        config
    }
}

/// Process exit status for a completed run
fn exit_code(strict: bool, report: &RunReport) -> i32 {
    if strict && !report.all_passed() {
        1
    } else {
        0
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let file_config = RunnerConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    let strict = cli.strict;
    let color = !cli.no_color;
    let config = cli.apply(file_config);

    info!("suiterunner v{}", env!("CARGO_PKG_VERSION"));

    let pipeline = Pipeline::new(config).context("Invalid configuration")?;
    let mut reporter = ConsoleReporter::stdout(color);
    let report = pipeline
        .run(&mut reporter)
        .await
        .context("Suite run aborted")?;

    let code = exit_code(strict, &report);
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use suiterunner::report::ReportAggregator;
    use suiterunner::{Classification, FailureReason, Suite};

    fn report_with(classifications: Vec<Classification>) -> RunReport {
        let suites = classifications
            .into_iter()
            .enumerate()
            .map(|(i, classification)| {
                let mut suite = Suite::new(PathBuf::from(format!("/t/unit_test_{}", i)));
                suite.classification = Some(classification);
                suite
            })
            .collect();
        ReportAggregator::start().finish(suites)
    }

    #[test]
    fn test_exit_code_is_zero_without_strict() {
        let report = report_with(vec![
            Classification::pass(),
            Classification::fail(FailureReason::MarkerAbsent),
        ]);
        assert_eq!(exit_code(false, &report), 0);
    }

    #[test]
    fn test_strict_exit_code_on_failure() {
        let report = report_with(vec![
            Classification::pass(),
            Classification::fail(FailureReason::ResultsMissing),
        ]);
        assert_eq!(exit_code(true, &report), 1);
    }

    #[test]
    fn test_strict_exit_code_when_all_pass() {
        assert_eq!(exit_code(true, &report_with(vec![Classification::pass()])), 0);
        assert_eq!(exit_code(true, &report_with(vec![])), 0);
    }

    #[test]
    fn test_defaults_keep_file_config() {
        let cli = Cli::parse_from(["suiterunner"]);
        let mut file = RunnerConfig::default();
        file.classifier.marker = "from file".to_string();

        let config = cli.apply(file);
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.classifier.marker, "from file");
        assert!(!config.toolchain.build_steps.is_empty());
    }

    #[test]
    fn test_flags_override_file_config() {
        let cli = Cli::parse_from([
            "suiterunner",
            "tests",
            "--filter",
            "arena",
            "--run-timeout",
            "0",
            "--skip-build",
            "--strict",
        ]);
        assert!(cli.strict);

        let config = cli.apply(RunnerConfig::default());
        assert_eq!(config.root, PathBuf::from("tests"));
        assert_eq!(config.discovery.filter.as_deref(), Some("arena"));
        assert_eq!(config.toolchain.run_timeout(), None);
        assert!(config.toolchain.build_steps.is_empty());
    }
}
