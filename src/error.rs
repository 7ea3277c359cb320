//! Error types for the NanoComp pipeline.
//!
//! Extraction failures are reported per file through [`ExtractionError`] and
//! wrapped with the offending path once they reach the aggregator. Nothing in
//! the pipeline recovers locally, every variant ends the run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NanoCompError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to extract metrics from {}: {source}", .path.display())]
    Extraction {
        path: PathBuf,
        #[source]
        source: ExtractionError,
    },

    #[error("cannot take log10 of non-positive read length {value} at row {row}")]
    NumericDomain { row: usize, value: u64 },

    #[error("column `{0}` is not present in the metrics table")]
    MissingColumn(String),

    #[error("failed to render the {metric} plot: {message}")]
    Render { metric: String, message: String },

    #[error("failed to set up logging: {0}")]
    Logging(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl NanoCompError {
    pub fn extraction(path: impl Into<PathBuf>, source: impl Into<ExtractionError>) -> Self {
        NanoCompError::Extraction {
            path: path.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("malformed fastq record: {0}")]
    Fastq(#[from] bio::io::fastq::Error),

    #[error("malformed bam record: {0}")]
    Bam(String),

    #[error("malformed summary file: {0}")]
    Csv(#[from] csv::Error),

    #[error("column `{column}` required for read type {read_type} is missing")]
    MissingColumn { column: String, read_type: String },

    #[error("invalid value `{value}` in column `{column}` at line {line}")]
    InvalidValue {
        column: String,
        value: String,
        line: u64,
    },

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("could not start worker threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid summary column layout: {0}")]
    Layout(#[from] config::ConfigError),
}

pub type Result<T, E = NanoCompError> = std::result::Result<T, E>;
