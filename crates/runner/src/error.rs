//! Error types for suite orchestration

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Cannot scan suite root {root}: {source}")]
    Discovery {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Suite root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot open results file {path}: {source}")]
    ResultsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid artifact pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RunnerResult<T> = Result<T, RunnerError>;
