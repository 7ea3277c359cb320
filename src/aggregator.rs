//! # aggregator.rs
//!
//! Collects the metrics of every input file of a run into one [`UnifiedTable`].
//!
//! The extractor is called once per file, sequentially and in input order.
//! fastq and bam tables all carry the same label, the complete list of input
//! paths, while each summary table is labelled with its own path. Plot legends
//! therefore show one combined dataset for fastq/bam runs and one dataset per
//! file for summary runs.

use std::sync::Arc;

use log::info;

use crate::config::{InputSource, ReadType, SourceKind};
use crate::error::{NanoCompError, Result};
use crate::extractor::Extractor;
use crate::metrics::{DatasetLabel, MetricsTable, UnifiedTable};

/// Extract, label and concatenate the metrics of all files of `source`.
///
/// `read_type` is only used for summary input and `threads` is passed to the
/// extractor untouched. The first failing file aborts the whole aggregation.
pub fn aggregate<E>(
    extractor: &E,
    source: &InputSource,
    read_type: ReadType,
    threads: usize,
) -> Result<UnifiedTable>
where
    E: Extractor + ?Sized,
{
    let labelled = match source.kind {
        SourceKind::Fastq | SourceKind::Bam => {
            let label = Arc::new(DatasetLabel::Group(source.paths.clone()));
            source
                .paths
                .iter()
                .map(|path| {
                    let table = match source.kind {
                        SourceKind::Fastq => extractor.fastq(path, threads),
                        _ => extractor.bam(path, threads),
                    }
                    .map_err(|e| NanoCompError::extraction(path, e))?;
                    Ok((table, Arc::clone(&label)))
                })
                .collect::<Result<Vec<(MetricsTable, Arc<DatasetLabel>)>>>()?
        }
        SourceKind::Summary => source
            .paths
            .iter()
            .map(|path| {
                let table = extractor
                    .summary(path, read_type)
                    .map_err(|e| NanoCompError::extraction(path, e))?;
                Ok((table, Arc::new(DatasetLabel::File(path.clone()))))
            })
            .collect::<Result<Vec<(MetricsTable, Arc<DatasetLabel>)>>>()?,
    };

    let table = UnifiedTable::concat(labelled);
    info!(
        "Gathered metrics for plotting: {} reads from {} {} file(s)",
        table.len(),
        source.paths.len(),
        source.kind
    );
    Ok(table)
}
