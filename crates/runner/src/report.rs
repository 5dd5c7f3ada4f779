//! Run aggregation and console reporting

use chrono::{DateTime, Utc};
use colored::{Color, Colorize};
use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::suite::Suite;

/// Everything a finished run produced, suites in discovery order
#[derive(Debug, Clone)]
pub struct RunReport {
    pub suites: Vec<Suite>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.suites.len()
    }

    pub fn passed(&self) -> usize {
        self.suites.iter().filter(|s| s.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

/// Tracks wall-clock time around a run
#[derive(Debug)]
pub struct ReportAggregator {
    started_at: DateTime<Utc>,
    start: Instant,
}

impl ReportAggregator {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            start: Instant::now(),
        }
    }

    pub fn finish(self, suites: Vec<Suite>) -> RunReport {
        RunReport {
            suites,
            started_at: self.started_at,
            finished_at: Utc::now(),
            elapsed: self.start.elapsed(),
        }
    }
}

/// Whole minutes and remaining whole seconds, e.g. "2 minutes and 5 seconds"
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{} minutes and {} seconds", secs / 60, secs % 60)
}

/// Receives pipeline progress and the final report
pub trait Reporter {
    /// Called before a suite is cleaned, built and run
    fn suite_started(&mut self, suite: &Suite) -> io::Result<()>;

    /// Called once after every suite has been classified
    fn report(&mut self, report: &RunReport) -> io::Result<()>;
}

/// Prints colored status lines and the elapsed time
pub struct ConsoleReporter<W: Write> {
    out: W,
    color: bool,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, text: String, color: Color) -> String {
        if self.color {
            text.as_str().color(color).to_string()
        } else {
            text
        }
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn suite_started(&mut self, suite: &Suite) -> io::Result<()> {
        let banner = self.paint(
            format!("Performing test on folder {}", suite.path.display()),
            Color::Blue,
        );
        writeln!(self.out)?;
        writeln!(self.out, "{}", banner)?;
        writeln!(self.out)?;
        self.out.flush()
    }

    fn report(&mut self, report: &RunReport) -> io::Result<()> {
        writeln!(self.out)?;

        for suite in &report.suites {
            if suite.passed() {
                let line = self.paint(format!("Tests in {} passed", suite.path.display()), Color::Green);
                writeln!(self.out, "{}", line)?;
            } else {
                let line = self.paint(
                    format!("Tests in {} failed !!!", suite.path.display()),
                    Color::Red,
                );
                writeln!(self.out)?;
                writeln!(self.out, "{}", line)?;
                writeln!(self.out)?;
            }
        }

        writeln!(self.out)?;
        writeln!(self.out, "Elapsed time: {}", format_elapsed(report.elapsed))?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Classification, FailureReason};
    use std::path::PathBuf;
    use test_case::test_case;

    #[test_case(125, "2 minutes and 5 seconds" ; "over two minutes")]
    #[test_case(59, "0 minutes and 59 seconds" ; "under a minute")]
    #[test_case(0, "0 minutes and 0 seconds" ; "zero")]
    #[test_case(3600, "60 minutes and 0 seconds" ; "one hour")]
    fn test_format_elapsed(secs: u64, expected: &str) {
        assert_eq!(format_elapsed(Duration::from_secs(secs)), expected);
    }

    #[test]
    fn test_format_elapsed_truncates_fractions() {
        assert_eq!(format_elapsed(Duration::from_millis(61_999)), "1 minutes and 1 seconds");
    }

    fn suite(path: &str, classification: Option<Classification>) -> Suite {
        let mut suite = Suite::new(PathBuf::from(path));
        suite.classification = classification;
        suite
    }

    fn report_of(suites: Vec<Suite>, secs: u64) -> RunReport {
        let now = Utc::now();
        RunReport {
            suites,
            started_at: now,
            finished_at: now,
            elapsed: Duration::from_secs(secs),
        }
    }

    fn render(report: &RunReport) -> String {
        let mut reporter = ConsoleReporter::new(Vec::new(), false);
        reporter.report(report).unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_report_lines_in_discovery_order() {
        let report = report_of(
            vec![
                suite("/t/unit_test_orderbook", Some(Classification::pass())),
                suite("/t/unit_test_alloc", Some(Classification::fail(FailureReason::ResultsEmpty))),
                suite("/t/unit_test_cache", None),
            ],
            125,
        );

        let text = render(&report);
        let lines: Vec<&str> = text.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(
            lines,
            vec![
                "Tests in /t/unit_test_orderbook passed",
                "Tests in /t/unit_test_alloc failed !!!",
                "Tests in /t/unit_test_cache failed !!!",
                "Elapsed time: 2 minutes and 5 seconds",
            ]
        );
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 2);
        assert!(!report.all_passed());
    }

    #[test]
    fn test_empty_report() {
        let report = report_of(vec![], 0);
        let text = render(&report);
        assert_eq!(text, "\n\nElapsed time: 0 minutes and 0 seconds\n\n");
        assert!(report.all_passed());
    }

    #[test]
    fn test_colored_output() {
        colored::control::set_override(true);
        let mut reporter = ConsoleReporter::new(Vec::new(), true);
        reporter
            .report(&report_of(vec![suite("/t/unit_test_a", Some(Classification::pass()))], 1))
            .unwrap();
        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.contains("\u{1b}[32mTests in /t/unit_test_a passed\u{1b}[0m"));
    }

    #[test]
    fn test_suite_banner() {
        let mut reporter = ConsoleReporter::new(Vec::new(), false);
        reporter
            .suite_started(&Suite::new(PathBuf::from("/t/unit_test_segment")))
            .unwrap();
        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(text, "\nPerforming test on folder /t/unit_test_segment\n\n");
    }
}
