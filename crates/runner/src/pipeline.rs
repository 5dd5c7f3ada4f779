//! Orchestrates discovery, the build+run pass and the classification pass

use tracing::{debug, info, warn};

use crate::build::BuildExecutor;
use crate::classify::{read_results, Classification, FailureReason, ResultClassifier};
use crate::cleaner::ArtifactCleaner;
use crate::config::RunnerConfig;
use crate::discovery::discover;
use crate::error::RunnerResult;
use crate::report::{ReportAggregator, Reporter, RunReport};
use crate::run::RunExecutor;
use crate::suite::{ProcessStatus, Suite};

/// Sequential suite pipeline
pub struct Pipeline {
    config: RunnerConfig,
    cleaner: ArtifactCleaner,
    builder: BuildExecutor,
    runner: RunExecutor,
    classifier: ResultClassifier,
}

impl Pipeline {
    pub fn new(config: RunnerConfig) -> RunnerResult<Self> {
        config.validate()?;
        Ok(Self {
            cleaner: ArtifactCleaner::new(&config.cleaner)?.with_results_file(&config.results_file),
            builder: BuildExecutor::new(&config.toolchain),
            runner: RunExecutor::new(&config),
            classifier: ResultClassifier::new(&config.classifier),
            config,
        })
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Find the suites under the configured root
    pub fn discover(&self) -> RunnerResult<Vec<Suite>> {
        let paths = discover(&self.config.root, &self.config.discovery)?;
        Ok(paths.into_iter().map(Suite::new).collect())
    }

    /// Run the whole pipeline and hand the result to `reporter`.
    ///
    /// Only discovery and writing the report can fail; anything that goes
    /// wrong for an individual suite ends up as that suite's failure.
    pub async fn run<R: Reporter>(&self, reporter: &mut R) -> RunnerResult<RunReport> {
        let aggregator = ReportAggregator::start();

        let mut suites = self.discover()?;
        info!(
            "Discovered {} suite(s) under {}",
            suites.len(),
            self.config.root.display()
        );

        for suite in suites.iter_mut() {
            if let Err(e) = reporter.suite_started(suite) {
                warn!("Failed to write progress: {}", e);
            }
            self.prepare(suite).await;
        }

        for suite in suites.iter_mut() {
            self.classify(suite);
        }

        let report = aggregator.finish(suites);
        info!(
            "Suite results: {} passed, {} failed ({} ms)",
            report.passed(),
            report.failed(),
            report.elapsed.as_millis()
        );

        reporter.report(&report)?;
        Ok(report)
    }

    /// Clean, build and run one suite
    pub async fn prepare(&self, suite: &mut Suite) {
        let clean = self.cleaner.clean(&suite.path);
        debug!(
            "Cleaned {}: {} removed, {} error(s)",
            suite.path.display(),
            clean.removed.len(),
            clean.errors.len()
        );
        suite.clean_errors = clean.errors;
        suite.cleaned = true;

        suite.build = Some(self.builder.build(&suite.path).await);
        suite.run = Some(self.runner.run(&suite.path).await);
        debug!("{} reached {:?}", suite.name(), suite.state());
    }

    /// Read the suite's results file and decide its outcome
    pub fn classify(&self, suite: &mut Suite) {
        suite.output = read_results(&self.config.results_path(&suite.path));

        let classification = match &suite.run {
            Some(ProcessStatus::TimedOut { .. }) => Classification::fail(FailureReason::TimedOut),
            _ => self.classifier.classify_output(suite.output.as_deref()),
        };

        if let Some(reason) = classification.reason {
            let build = suite.build.as_ref().map(ToString::to_string).unwrap_or_else(|| "not built".to_string());
            let run = suite.run.as_ref().map(ToString::to_string).unwrap_or_else(|| "not run".to_string());
            warn!(
                "{} failed: {} (build: {}, run: {})",
                suite.name(),
                reason,
                build,
                run
            );
        }

        suite.classification = Some(classification);
        debug!("{} reached {:?}", suite.name(), suite.state());
    }
}
