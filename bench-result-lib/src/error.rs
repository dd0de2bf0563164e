use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to read a magnitude out of a single measurement line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MagnitudeError {
    #[error("expected at least 2 tokens, found {found}")]
    TooFewTokens { found: usize },

    #[error("token `{token}` is not an integer")]
    InvalidInteger {
        token: String,
        #[source]
        source: ParseIntError,
    },
}

#[derive(Error, Debug)]
pub enum ResultError {
    #[error("failed to read result file `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {index} is out of range, the result file has {available} lines")]
    MissingLine { index: usize, available: usize },

    #[error("line {index} is malformed")]
    Line {
        index: usize,
        #[source]
        source: MagnitudeError,
    },

    #[error("failed to write report")]
    Output(#[from] std::io::Error),

    #[error("failed to render chart: {0}")]
    Chart(String),

    #[error("rendering is already configured")]
    RenderingConfigured,
}

pub type Result<T> = std::result::Result<T, ResultError>;
