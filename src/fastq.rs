use std::path::Path;

use bio::io::fastq;
use log::info;
use rayon::prelude::*;

use crate::error::ExtractionError;
use crate::io::open_text_file;
use crate::metrics::FastqMetrics;
use crate::quality::ave_qual_ascii;

/// Length and mean quality of every read in a (compressed) fastq file.
///
/// Records are parsed in order on the calling thread; the per-read metrics are
/// computed on a pool of `threads` workers.
pub fn process_fastq_plain(
    file_path: &Path,
    threads: usize,
) -> Result<Vec<FastqMetrics>, ExtractionError> {
    info!(
        "Starting to collect statistics from plain fastq file {}",
        file_path.display()
    );
    let reader = fastq::Reader::from_bufread(open_text_file(file_path)?);

    let records = reader
        .records()
        .collect::<Result<Vec<fastq::Record>, fastq::Error>>()?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()?;

    let metrics = pool.install(|| records.par_iter().map(read_metrics).collect::<Vec<_>>());

    info!(
        "Collected statistics of {} reads from {}",
        metrics.len(),
        file_path.display()
    );
    Ok(metrics)
}

fn read_metrics(record: &fastq::Record) -> FastqMetrics {
    FastqMetrics {
        lengths: record.seq().len() as u64,
        quals: ave_qual_ascii(record.qual()),
    }
}
