use sha2::{Digest, Sha256};
use std::fmt;
use std::io::Write;
use std::ops::Range;
use std::path::Path;
use tracing::{debug, trace};

pub mod chart;
pub mod error;
pub mod util;

pub use error::{MagnitudeError, Result, ResultError};

/// Path of the result file, relative to the working directory.
pub const DEFAULT_RESULT_PATH: &str = "result";

/// Number of lines in each measurement window.
pub const WINDOW_LEN: usize = 15;

/// Lines needed for a complete report: one proof window followed by one verify window.
pub const REQUIRED_LINES: usize = 2 * WINDOW_LEN;

/// The magnitude is the second token counted from the end of a line.
pub const MAGNITUDE_POSITION_FROM_END: usize = 2;

pub const PROOF_DIVISOR: f64 = 1e9;
pub const VERIFY_DIVISOR: f64 = 1e6;

/// Charts always plot milliseconds-scaled values, whichever window is drawn.
pub const PLOT_DIVISOR: f64 = 1e6;

pub const X_AXIS_LABEL: &str = "Merkle Tree size";
pub const Y_AXIS_LABEL: &str = "time cost (ms)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Proof,
    Verify,
}

impl Window {
    /// Windows in the order they appear in the result file.
    pub const ALL: [Window; 2] = [Window::Proof, Window::Verify];

    /// Index of the first line of the window.
    pub fn start(&self) -> usize {
        match self {
            Window::Proof => 0,
            Window::Verify => WINDOW_LEN,
        }
    }

    /// Line indices covered by the window.
    pub fn indices(&self) -> Range<usize> {
        self.start()..self.start() + WINDOW_LEN
    }

    /// Divisor applied to magnitudes in print mode.
    pub fn print_divisor(&self) -> f64 {
        match self {
            Window::Proof => PROOF_DIVISOR,
            Window::Verify => VERIFY_DIVISOR,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Window::Proof => "proof耗时",
            Window::Verify => "verify耗时",
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Proof => write!(f, "proof"),
            Window::Verify => write!(f, "verify"),
        }
    }
}

/// Chart data for one window: x is the 1-based position inside the window.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    window: Window,
    points: Vec<(u32, f64)>,
}

impl Series {
    pub fn window(&self) -> Window {
        self.window
    }

    pub fn title(&self) -> &'static str {
        self.window.title()
    }

    pub fn x_label(&self) -> &'static str {
        X_AXIS_LABEL
    }

    pub fn y_label(&self) -> &'static str {
        Y_AXIS_LABEL
    }

    pub fn points(&self) -> &[(u32, f64)] {
        &self.points
    }
}

/// The lines of a benchmark result file, read in full.
#[derive(Debug, Clone)]
pub struct ResultFile {
    lines: Vec<String>,
    fingerprint: String,
}

impl ResultFile {
    /// Reads the whole file at `path`. The file is closed before this returns.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ResultError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let results = Self::parse(&content);
        debug!(
            path = %path.display(),
            lines = results.len(),
            fingerprint = %results.fingerprint(),
            "loaded result file"
        );

        Ok(results)
    }

    pub fn parse(content: &str) -> Self {
        ResultFile {
            lines: content.lines().map(String::from).collect(),
            fingerprint: hex::encode(Sha256::digest(content.as_bytes())),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Hex-encoded SHA-256 of the file content.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn line(&self, index: usize) -> Result<&str> {
        self.lines
            .get(index)
            .map(String::as_str)
            .ok_or(ResultError::MissingLine {
                index,
                available: self.lines.len(),
            })
    }

    pub fn magnitude(&self, index: usize) -> Result<i64> {
        let magnitude = extract_magnitude(self.line(index)?)
            .map_err(|source| ResultError::Line { index, source })?;
        trace!(index, magnitude, "extracted magnitude");
        Ok(magnitude)
    }

    /// The magnitude on line `index` divided by `divisor`.
    pub fn scaled(&self, index: usize, divisor: f64) -> Result<f64> {
        Ok(self.magnitude(index)? as f64 / divisor)
    }

    /// Builds the chart series of `window`, scaled by [`PLOT_DIVISOR`].
    pub fn series(&self, window: Window) -> Result<Series> {
        let points = window
            .indices()
            .enumerate()
            .map(|(position, index)| {
                let value = self.scaled(index, PLOT_DIVISOR)?;
                Ok(((position + 1) as u32, value))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Series { window, points })
    }
}

/// Parses the second-to-last whitespace-separated token of `line` as an integer.
///
/// # Examples
///
/// ```
/// use bench_result_lib::extract_magnitude;
///
/// let line = "Proving time for Bls12_381 with 8 leaves: 1234567 ns";
/// assert_eq!(extract_magnitude(line), Ok(1234567));
/// ```
pub fn extract_magnitude(line: &str) -> std::result::Result<i64, MagnitudeError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let token = tokens
        .len()
        .checked_sub(MAGNITUDE_POSITION_FROM_END)
        .map(|position| tokens[position])
        .ok_or(MagnitudeError::TooFewTokens {
            found: tokens.len(),
        })?;

    token
        .parse::<i64>()
        .map_err(|source| MagnitudeError::InvalidInteger {
            token: token.to_string(),
            source,
        })
}

/// Writes the print-mode report: the proof window over [`PROOF_DIVISOR`], then the
/// verify window over [`VERIFY_DIVISOR`], one value per line.
///
/// Each value is written as soon as it is computed. On the first missing or malformed
/// line the report stops and the error is returned.
pub fn write_report<W: Write>(results: &ResultFile, out: &mut W) -> Result<()> {
    for window in Window::ALL {
        for index in window.indices() {
            let value = results.scaled(index, window.print_divisor())?;
            writeln!(out, "{:?}", value)?;
        }
    }

    out.flush()?;
    Ok(())
}
