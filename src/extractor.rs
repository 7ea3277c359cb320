use std::path::Path;

use crate::config::ReadType;
use crate::error::ExtractionError;
use crate::metrics::MetricsTable;
use crate::{bam, fastq, summary};

/// Turns one input file into a per-read metrics table.
///
/// `threads` is a hint for the extractor's own parallelism. Callers issue one
/// call per file and never run calls concurrently.
pub trait Extractor {
    fn fastq(&self, path: &Path, threads: usize) -> Result<MetricsTable, ExtractionError>;

    fn bam(&self, path: &Path, threads: usize) -> Result<MetricsTable, ExtractionError>;

    fn summary(&self, path: &Path, read_type: ReadType) -> Result<MetricsTable, ExtractionError>;
}

/// Reads metrics straight from fastq, bam and sequencing summary files.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileExtractor;

impl Extractor for FileExtractor {
    fn fastq(&self, path: &Path, threads: usize) -> Result<MetricsTable, ExtractionError> {
        fastq::process_fastq_plain(path, threads).map(MetricsTable::Fastq)
    }

    fn bam(&self, path: &Path, threads: usize) -> Result<MetricsTable, ExtractionError> {
        bam::process_bam(path, threads).map(MetricsTable::Bam)
    }

    fn summary(&self, path: &Path, read_type: ReadType) -> Result<MetricsTable, ExtractionError> {
        summary::process_summary(path, read_type).map(MetricsTable::Summary)
    }
}
