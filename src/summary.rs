use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord};
use log::info;

use crate::config::{ReadType, SummaryColumns};
use crate::error::ExtractionError;
use crate::io::open_text_file;
use crate::metrics::SummaryMetrics;

/// Per-read metrics from an albacore/guppy sequencing summary.
///
/// `read_type` selects the length and quality columns. Reads without a
/// basecall for that read type have length 0 and are dropped.
pub fn process_summary(
    file_path: &Path,
    read_type: ReadType,
) -> Result<Vec<SummaryMetrics>, ExtractionError> {
    info!(
        "Starting to collect statistics from summary file {} for read type {}",
        file_path.display(),
        read_type
    );
    let columns = SummaryColumns::for_read_type(read_type)?;

    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(open_text_file(file_path)?);

    let layout = ColumnIndex::resolve(reader.headers()?, &columns, read_type)?;

    let mut metrics = Vec::new();
    let mut removed = 0usize;
    for result in reader.records() {
        let record = result?;
        let row = layout.read_row(&record)?;
        if row.lengths == 0 {
            removed += 1;
            continue;
        }
        metrics.push(row);
    }

    if removed > 0 {
        info!(
            "Removed {} reads without a {} basecall from {}",
            removed,
            read_type,
            file_path.display()
        );
    }
    info!(
        "Collected statistics of {} reads from {}",
        metrics.len(),
        file_path.display()
    );
    Ok(metrics)
}

/// Positions of the interesting columns in one summary header.
struct ColumnIndex {
    length: (usize, String),
    quality: (usize, String),
    read_id: Option<usize>,
    channel: Option<usize>,
    start_time: Option<usize>,
    duration: Option<usize>,
}

impl ColumnIndex {
    fn resolve(
        headers: &StringRecord,
        columns: &SummaryColumns,
        read_type: ReadType,
    ) -> Result<ColumnIndex, ExtractionError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let required = |name: &str| {
            find(name)
                .map(|i| (i, name.to_string()))
                .ok_or_else(|| ExtractionError::MissingColumn {
                    column: name.to_string(),
                    read_type: read_type.to_string(),
                })
        };

        Ok(ColumnIndex {
            length: required(columns.length.as_str())?,
            quality: required(columns.quality.as_str())?,
            read_id: find("read_id"),
            channel: find("channel"),
            start_time: find("start_time"),
            duration: find("duration"),
        })
    }

    fn read_row(&self, record: &StringRecord) -> Result<SummaryMetrics, ExtractionError> {
        let line = record.position().map_or(0, |p| p.line());

        // lengths are sometimes written as floats, e.g. "1234.0"
        let length: f64 = parse_field(record, &self.length, line)?;
        if length < 0.0 || length.fract() != 0.0 {
            return Err(invalid_value(record, &self.length, line));
        }

        Ok(SummaryMetrics {
            read_id: self
                .read_id
                .and_then(|i| record.get(i))
                .map(|s| s.to_string()),
            channel: parse_optional(record, self.channel, "channel", line)?,
            start_time: parse_optional(record, self.start_time, "start_time", line)?,
            duration: parse_optional(record, self.duration, "duration", line)?,
            lengths: length as u64,
            quals: parse_field(record, &self.quality, line)?,
        })
    }
}

fn parse_optional<T: FromStr>(
    record: &StringRecord,
    index: Option<usize>,
    name: &str,
    line: u64,
) -> Result<Option<T>, ExtractionError> {
    match index {
        Some(i) => parse_field(record, &(i, name.to_string()), line).map(Some),
        None => Ok(None),
    }
}

fn parse_field<T: FromStr>(
    record: &StringRecord,
    column: &(usize, String),
    line: u64,
) -> Result<T, ExtractionError> {
    record
        .get(column.0)
        .and_then(|value| value.trim().parse::<T>().ok())
        .ok_or_else(|| invalid_value(record, column, line))
}

fn invalid_value(record: &StringRecord, column: &(usize, String), line: u64) -> ExtractionError {
    ExtractionError::InvalidValue {
        column: column.1.clone(),
        value: record.get(column.0).unwrap_or("").to_string(),
        line,
    }
}
