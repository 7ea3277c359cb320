//! # metrics.rs
//!
//! Per-read metric tables and the unified table they are merged into.
//!
//! Each extractor returns a [`MetricsTable`], a tagged variant over the fixed
//! row schema of its input kind. The aggregator normalises every row to the
//! superset [`MetricsRow`] (fields a kind does not produce stay `None`) and
//! attaches a shared [`DatasetLabel`]. The resulting [`UnifiedTable`] is the
//! only thing handed to rendering.

use std::fmt::{self, Display};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{NanoCompError, Result};

/// Metrics of one fastq read.
#[derive(Debug, Clone, PartialEq)]
pub struct FastqMetrics {
    pub lengths: u64,
    pub quals: Option<f64>,
}

/// Metrics of one primary alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct BamMetrics {
    pub read_id: Option<String>,
    pub lengths: u64,
    pub quals: Option<f64>,
    pub aligned_lengths: u64,
    pub mapq: Option<u8>,
    pub percent_identity: Option<f64>,
}

/// Metrics of one row of a sequencing summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryMetrics {
    pub read_id: Option<String>,
    pub channel: Option<u32>,
    pub start_time: Option<f64>,
    pub duration: Option<f64>,
    pub lengths: u64,
    pub quals: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetricsTable {
    Fastq(Vec<FastqMetrics>),
    Bam(Vec<BamMetrics>),
    Summary(Vec<SummaryMetrics>),
}

impl MetricsTable {
    pub fn len(&self) -> usize {
        match self {
            MetricsTable::Fastq(rows) => rows.len(),
            MetricsTable::Bam(rows) => rows.len(),
            MetricsTable::Summary(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_percent_identity(&self) -> bool {
        matches!(self, MetricsTable::Bam(_))
    }

    /// Normalise to superset rows carrying `label`.
    fn into_rows(self, label: &Arc<DatasetLabel>) -> Vec<MetricsRow> {
        match self {
            MetricsTable::Fastq(rows) => rows
                .into_iter()
                .map(|r| MetricsRow {
                    quals: r.quals,
                    ..MetricsRow::new(r.lengths, Arc::clone(label))
                })
                .collect(),
            MetricsTable::Bam(rows) => rows
                .into_iter()
                .map(|r| MetricsRow {
                    read_id: r.read_id,
                    quals: r.quals,
                    aligned_lengths: Some(r.aligned_lengths),
                    mapq: r.mapq,
                    percent_identity: r.percent_identity,
                    ..MetricsRow::new(r.lengths, Arc::clone(label))
                })
                .collect(),
            MetricsTable::Summary(rows) => rows
                .into_iter()
                .map(|r| MetricsRow {
                    read_id: r.read_id,
                    quals: Some(r.quals),
                    channel: r.channel,
                    start_time: r.start_time,
                    duration: r.duration,
                    ..MetricsRow::new(r.lengths, Arc::clone(label))
                })
                .collect(),
        }
    }
}

/// Identity of the input a row came from.
///
/// fastq and bam runs label every row with the whole list of input paths,
/// summary runs label each row with its own file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DatasetLabel {
    Group(Vec<PathBuf>),
    File(PathBuf),
}

impl Display for DatasetLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetLabel::Group(paths) => {
                let joined: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
                write!(f, "{}", joined.join(", "))
            }
            DatasetLabel::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A plottable column of the unified table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Lengths,
    LogLength,
    Quals,
    PercentIdentity,
}

impl Metric {
    pub fn column_name(&self) -> &'static str {
        match self {
            Metric::Lengths => "lengths",
            Metric::LogLength => "log length",
            Metric::Quals => "quals",
            Metric::PercentIdentity => "percentIdentity",
        }
    }

    pub fn axis_label(&self) -> &'static str {
        match self {
            Metric::Lengths => "Read length",
            Metric::LogLength => "Read length (log scale)",
            Metric::Quals => "Average base call quality score",
            Metric::PercentIdentity => "Percent identity",
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

/// One row of the unified table.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRow {
    pub dataset: Arc<DatasetLabel>,
    pub lengths: u64,
    pub log_length: Option<f64>,
    pub quals: Option<f64>,
    pub percent_identity: Option<f64>,
    pub aligned_lengths: Option<u64>,
    pub mapq: Option<u8>,
    pub read_id: Option<String>,
    pub channel: Option<u32>,
    pub start_time: Option<f64>,
    pub duration: Option<f64>,
}

impl MetricsRow {
    fn new(lengths: u64, dataset: Arc<DatasetLabel>) -> Self {
        MetricsRow {
            dataset,
            lengths,
            log_length: None,
            quals: None,
            percent_identity: None,
            aligned_lengths: None,
            mapq: None,
            read_id: None,
            channel: None,
            start_time: None,
            duration: None,
        }
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Lengths => Some(self.lengths as f64),
            Metric::LogLength => self.log_length,
            Metric::Quals => self.quals,
            Metric::PercentIdentity => self.percent_identity,
        }
    }
}

/// All per-file tables of a run, concatenated in input order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnifiedTable {
    rows: Vec<MetricsRow>,
    has_percent_identity: bool,
    has_log_length: bool,
}

impl UnifiedTable {
    /// Concatenate labelled tables. Row `i` of the result is addressed by its
    /// position, so the index is contiguous from 0.
    pub fn concat<I>(tables: I) -> UnifiedTable
    where
        I: IntoIterator<Item = (MetricsTable, Arc<DatasetLabel>)>,
    {
        let mut unified = UnifiedTable::default();
        for (table, label) in tables {
            unified.has_percent_identity |= table.has_percent_identity();
            unified.rows.extend(table.into_rows(&label));
        }
        unified
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[MetricsRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&MetricsRow> {
        self.rows.get(index)
    }

    pub fn has_column(&self, metric: Metric) -> bool {
        match metric {
            Metric::Lengths | Metric::Quals => true,
            Metric::LogLength => self.has_log_length,
            Metric::PercentIdentity => self.has_percent_identity,
        }
    }

    /// Add the `log length` column, `log10(lengths)`.
    ///
    /// Every row is checked before anything is written, so a non-positive
    /// length leaves the table without the column.
    pub fn derive_log_length(&mut self) -> Result<()> {
        if let Some((row, r)) = self.rows.iter().enumerate().find(|(_, r)| r.lengths == 0) {
            return Err(NanoCompError::NumericDomain {
                row,
                value: r.lengths,
            });
        }
        for r in self.rows.iter_mut() {
            r.log_length = Some((r.lengths as f64).log10());
        }
        self.has_log_length = true;
        Ok(())
    }

    /// Values of `metric` with the label of the row they came from. Rows
    /// without a value for the metric are skipped.
    pub fn column(&self, metric: Metric) -> Result<Vec<(&DatasetLabel, f64)>> {
        if !self.has_column(metric) {
            return Err(NanoCompError::MissingColumn(metric.column_name().to_string()));
        }
        Ok(self
            .rows
            .iter()
            .filter_map(|r| r.value(metric).map(|v| (r.dataset.as_ref(), v)))
            .collect())
    }
}
