//! BAM processing and per-alignment metrics
//!
//! This module provides functionality for:
//! - Reading BAM files with a multithreaded BGZF decoder
//! - Skipping unmapped, secondary and supplementary records
//! - Calculating read length, mean quality, aligned length and percent identity

use std::fs::File;
use std::num::NonZeroUsize;
use std::path::Path;

use log::info;
use noodles::bam;
use noodles::bgzf;
use noodles::sam::alignment::record::cigar::op::Kind;
use noodles::sam::alignment::record::data::field::{Tag, Value};

use crate::error::ExtractionError;
use crate::metrics::BamMetrics;
use crate::quality::ave_qual;

/// BAM stores a missing quality string as a run of 0xff bytes.
const MISSING_QUALITY: u8 = 0xff;

/// Metrics of every primary, mapped alignment in a BAM file.
///
/// `threads` sets the number of BGZF decompression workers.
pub fn process_bam(file_path: &Path, threads: usize) -> Result<Vec<BamMetrics>, ExtractionError> {
    info!(
        "Starting to collect statistics from bam file {}",
        file_path.display()
    );
    let file = File::open(file_path)?;
    let worker_count = NonZeroUsize::new(threads).unwrap_or(NonZeroUsize::MIN);
    let decoder = bgzf::MultithreadedReader::with_worker_count(worker_count, file);
    let mut reader = bam::io::Reader::from(decoder);
    reader.read_header()?;

    let mut metrics = Vec::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = result?;

        let flags = record.flags();
        if flags.is_unmapped() || flags.is_secondary() || flags.is_supplementary() {
            skipped += 1;
            continue;
        }

        metrics.push(alignment_metrics(&record)?);
    }

    info!(
        "Collected statistics of {} alignments from {}, skipped {} unmapped, secondary or supplementary records",
        metrics.len(),
        file_path.display(),
        skipped
    );
    Ok(metrics)
}

fn alignment_metrics(record: &bam::Record) -> Result<BamMetrics, ExtractionError> {
    let read_id = record.name().map(|name| name.to_string());

    let quality_scores = record.quality_scores();
    let quals: &[u8] = quality_scores.as_ref();
    let quals = if quals.iter().all(|&q| q == MISSING_QUALITY) {
        None
    } else {
        ave_qual(quals)
    };

    // query bases inside the alignment, and indel bases for the MD fallback
    let mut aligned_lengths = 0u64;
    let mut indels = 0u64;
    for op in record.cigar().iter() {
        let op = op?;
        let len = op.len() as u64;
        match op.kind() {
            Kind::Match | Kind::SequenceMatch | Kind::SequenceMismatch => aligned_lengths += len,
            Kind::Insertion => {
                aligned_lengths += len;
                indels += len;
            }
            Kind::Deletion => indels += len,
            _ => {}
        }
    }

    let data = record.data();
    let edit_distance = match data.get(&Tag::EDIT_DISTANCE).transpose()? {
        Some(value) => {
            let nm = value.as_int().ok_or_else(|| {
                ExtractionError::Bam(format!("NM tag is not an integer: {:?}", value))
            })?;
            Some(u64::try_from(nm).map_err(|_| {
                ExtractionError::Bam(format!("NM tag is negative: {}", nm))
            })?)
        }
        None => match data.get(&Tag::MISMATCHED_POSITIONS).transpose()? {
            Some(Value::String(md)) => Some(md_mismatches(md) + indels),
            Some(value) => {
                return Err(ExtractionError::Bam(format!(
                    "MD tag is not a string: {:?}",
                    value
                )));
            }
            None => None,
        },
    };

    Ok(BamMetrics {
        read_id,
        lengths: record.sequence().len() as u64,
        quals,
        aligned_lengths,
        mapq: record.mapping_quality().map(u8::from),
        percent_identity: edit_distance.and_then(|nm| percent_identity(nm, aligned_lengths)),
    })
}

/// `100 * (1 - edit_distance / aligned_length)`, undefined for an empty
/// alignment.
pub fn percent_identity(edit_distance: u64, aligned_length: u64) -> Option<f64> {
    if aligned_length == 0 {
        return None;
    }
    Some(100.0 * (1.0 - edit_distance as f64 / aligned_length as f64))
}

/// Number of mismatched reference bases in an MD string. Bases following `^`
/// are deleted, not mismatched, and are counted from the CIGAR instead.
pub fn md_mismatches(md: &[u8]) -> u64 {
    let mut mismatches = 0;
    let mut in_deletion = false;
    for &c in md {
        if c == b'^' {
            in_deletion = true;
        } else if c.is_ascii_digit() {
            in_deletion = false;
        } else if c.is_ascii_alphabetic() && !in_deletion {
            mismatches += 1;
        }
    }
    mismatches
}
