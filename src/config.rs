//! # config.rs
//!
//! Command-line configuration of a NanoComp run and the embedded layout of
//! sequencing summary files.
//! It includes:
//! - `InputConfig`: Parses command-line arguments.
//! - `InputSource`: The single active data source and its files.
//! - `ReadType`, `FigureFormat`: Enumerated option values.
//! - `SummaryColumns`: Summary columns holding length and quality per read type.

use clap::{ArgGroup, Parser, ValueEnum};
use config::Config;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::error::{ExtractionError, NanoCompError};

/// Configuration parsed from CLI input arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "NanoComp",
    version = env!("CARGO_PKG_VERSION"),
    about = "Compares Oxford Nanopore Sequencing datasets."
)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .multiple(false)
        .args(["fastq", "summary", "bam"])
))]
pub struct InputConfig {
    /// Set the allowed number of threads to be used by the script
    #[arg(short, long, default_value_t = 4, value_parser = parse_threads)]
    pub threads: usize,
    /// Which read type to extract information about from summary.
    #[arg(long = "readtype", value_enum, default_value_t = ReadType::OneD)]
    pub read_type: ReadType,
    /// Specify directory in which output has to be created.
    #[arg(short, long, default_value = ".")]
    pub outdir: PathBuf,
    /// Specify an optional prefix to be used for the output files.
    #[arg(short, long, default_value = "")]
    pub prefix: String,
    /// Specify the output format of the plots.
    #[arg(short, long, value_enum, default_value_t = FigureFormat::Png)]
    pub format: FigureFormat,
    /// Data is in default fastq format.
    #[arg(long, num_args = 1..)]
    pub fastq: Option<Vec<PathBuf>>,
    /// Data is a summary file generated by albacore.
    #[arg(long, num_args = 1..)]
    pub summary: Option<Vec<PathBuf>>,
    /// Data as a sorted bam file.
    #[arg(long, num_args = 1..)]
    pub bam: Option<Vec<PathBuf>>,
}

fn parse_threads(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("thread count must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Kind of input files of a run. Only one kind is active at a time.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SourceKind {
    Fastq,
    Bam,
    Summary,
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind_str = match self {
            SourceKind::Fastq => "fastq",
            SourceKind::Bam => "bam",
            SourceKind::Summary => "summary",
        };
        write!(f, "{}", kind_str)
    }
}

/// The active data source and its files, in the order they were given.
#[derive(Debug, PartialEq, Clone)]
pub struct InputSource {
    pub kind: SourceKind,
    pub paths: Vec<PathBuf>,
}

impl InputSource {
    pub fn new(kind: SourceKind, paths: Vec<PathBuf>) -> Self {
        InputSource { kind, paths }
    }
}

/// Read type of a sequencing summary.
#[derive(Debug, PartialEq, Eq, Clone, Copy, ValueEnum)]
pub enum ReadType {
    #[value(name = "1D")]
    OneD,
    #[value(name = "2D")]
    TwoD,
    #[value(name = "1D2")]
    OneDSquare,
}

impl Display for ReadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let read_type_str = match self {
            ReadType::OneD => "1D",
            ReadType::TwoD => "2D",
            ReadType::OneDSquare => "1D2",
        };
        write!(f, "{}", read_type_str)
    }
}

/// Image formats the plots can be written in.
#[derive(Debug, PartialEq, Eq, Clone, Copy, ValueEnum)]
pub enum FigureFormat {
    Png,
    Jpg,
    Jpeg,
    Bmp,
    Svg,
}

impl FigureFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            FigureFormat::Png => "png",
            FigureFormat::Jpg => "jpg",
            FigureFormat::Jpeg => "jpeg",
            FigureFormat::Bmp => "bmp",
            FigureFormat::Svg => "svg",
        }
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, FigureFormat::Svg)
    }
}

impl Display for FigureFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl InputConfig {
    pub fn new(source: InputSource) -> Self {
        let mut input_config = InputConfig {
            threads: 4,
            read_type: ReadType::OneD,
            outdir: PathBuf::from("."),
            prefix: String::new(),
            format: FigureFormat::Png,
            fastq: None,
            summary: None,
            bam: None,
        };
        match source.kind {
            SourceKind::Fastq => input_config.fastq = Some(source.paths),
            SourceKind::Bam => input_config.bam = Some(source.paths),
            SourceKind::Summary => input_config.summary = Some(source.paths),
        }
        input_config
    }

    ///
    /// Returns the one data source selected on the command line.
    ///
    /// # Errors
    /// Returns an error if no source or more than one source is set.
    pub fn source(&self) -> Result<InputSource, NanoCompError> {
        let sources: Vec<InputSource> = [
            (SourceKind::Fastq, &self.fastq),
            (SourceKind::Bam, &self.bam),
            (SourceKind::Summary, &self.summary),
        ]
        .into_iter()
        .filter_map(|(kind, paths)| paths.as_ref().map(|p| InputSource::new(kind, p.clone())))
        .collect();

        match <[InputSource; 1]>::try_from(sources) {
            Ok([source]) => Ok(source),
            Err(sources) if sources.is_empty() => Err(NanoCompError::Configuration(
                "one of --fastq, --summary or --bam is required".to_string(),
            )),
            Err(sources) => Err(NanoCompError::Configuration(format!(
                "only one data source can be used at a time, got {}",
                sources
                    .iter()
                    .map(|s| s.kind.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }

    /// Output path prefix: files are written as `<outdir>/<prefix><name>`.
    pub fn output_prefix(&self) -> OutputPrefix {
        OutputPrefix::new(&self.outdir, &self.prefix)
    }
}

/// Directory and file name prefix every output file is written under.
#[derive(Debug, PartialEq, Clone)]
pub struct OutputPrefix {
    pub outdir: PathBuf,
    pub prefix: String,
}

impl OutputPrefix {
    pub fn new(outdir: &Path, prefix: &str) -> Self {
        OutputPrefix {
            outdir: outdir.to_path_buf(),
            prefix: prefix.to_string(),
        }
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.outdir.join(format!("{}{}", self.prefix, name))
    }
}

///
/// Column layout of sequencing summary files, one entry per read type.
pub const SUMMARY_COLUMNS_CONFIG_STR: &str = include_str!("../data/summary_columns.toml");

/// Summary columns that hold the length and mean quality of a read type.
#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct SummaryColumns {
    pub length: String,
    pub quality: String,
}

impl SummaryColumns {
    ///
    /// Looks up the summary columns for `read_type` in the embedded layout.
    ///
    /// # Errors
    /// Returns an error if the layout cannot be parsed or lacks the read type.
    pub fn for_read_type(read_type: ReadType) -> Result<SummaryColumns, ExtractionError> {
        let layout: HashMap<String, SummaryColumns> = Config::builder()
            .add_source(config::File::from_str(
                SUMMARY_COLUMNS_CONFIG_STR,
                config::FileFormat::Toml,
            ))
            .build()?
            .try_deserialize::<HashMap<String, SummaryColumns>>()?;

        layout
            .get(&read_type.to_string().to_lowercase())
            .cloned()
            .ok_or_else(|| {
                ExtractionError::UnsupportedFormat(format!(
                    "no summary column layout for read type {}",
                    read_type
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_columns() {
        let one_d = SummaryColumns::for_read_type(ReadType::OneD).unwrap();
        assert_eq!(one_d.length, "sequence_length_template");
        assert_eq!(one_d.quality, "mean_qscore_template");
        let two_d = SummaryColumns::for_read_type(ReadType::TwoD).unwrap();
        assert_eq!(two_d.length, "sequence_length_2d");
        assert_eq!(two_d.quality, "mean_qscore_2d");
        let one_d_square = SummaryColumns::for_read_type(ReadType::OneDSquare).unwrap();
        assert_eq!(one_d_square.length, "sequence_length");
        assert_eq!(one_d_square.quality, "mean_qscore");
    }

    #[test]
    fn test_args() {
        let missing_source = InputConfig::try_parse_from(["nanocomp", "--threads", "2"]);
        assert!(
            missing_source.is_err(),
            "Expected an error, but parsing succeeded"
        );

        let two_sources = InputConfig::try_parse_from([
            "nanocomp",
            "--fastq",
            "a.fastq",
            "--bam",
            "a.bam",
        ]);
        assert!(
            two_sources.is_err(),
            "Expected an error, but parsing succeeded"
        );

        let empty_source = InputConfig::try_parse_from(["nanocomp", "--fastq"]);
        assert!(empty_source.is_err());

        let zero_threads =
            InputConfig::try_parse_from(["nanocomp", "-t", "0", "--fastq", "a.fastq"]);
        assert!(zero_threads.is_err());

        let bad_format =
            InputConfig::try_parse_from(["nanocomp", "-f", "gif", "--fastq", "a.fastq"]);
        assert!(bad_format.is_err());

        let valid_long_args = InputConfig::try_parse_from([
            "nanocomp",
            "--threads",
            "8",
            "--readtype",
            "1D2",
            "--outdir",
            "out",
            "--prefix",
            "run1_",
            "--format",
            "svg",
            "--summary",
            "s1.txt",
            "s2.txt",
        ])
        .expect("Expected success, but parsing failed with error");
        assert_eq!(valid_long_args.threads, 8);
        assert_eq!(valid_long_args.read_type, ReadType::OneDSquare);
        assert_eq!(valid_long_args.format, FigureFormat::Svg);
        assert_eq!(
            valid_long_args.source().unwrap(),
            InputSource::new(
                SourceKind::Summary,
                vec![PathBuf::from("s1.txt"), PathBuf::from("s2.txt")]
            )
        );

        let valid_short_args =
            InputConfig::try_parse_from(["nanocomp", "-o", "out", "-p", "x", "--bam", "a.bam"])
                .expect("Expected success, but parsing failed with error");
        assert_eq!(valid_short_args.threads, 4);
        assert_eq!(valid_short_args.read_type, ReadType::OneD);
        assert_eq!(valid_short_args.format, FigureFormat::Png);
        assert_eq!(valid_short_args.source().unwrap().kind, SourceKind::Bam);
    }

    #[test]
    fn test_source_requires_exactly_one_kind() {
        let mut config = InputConfig::new(InputSource::new(
            SourceKind::Fastq,
            vec![PathBuf::from("a.fastq")],
        ));
        assert_eq!(config.source().unwrap().kind, SourceKind::Fastq);

        config.bam = Some(vec![PathBuf::from("a.bam")]);
        assert!(matches!(
            config.source(),
            Err(NanoCompError::Configuration(_))
        ));

        config.fastq = None;
        config.bam = None;
        assert!(matches!(
            config.source(),
            Err(NanoCompError::Configuration(_))
        ));
    }

    #[test]
    fn test_output_prefix() {
        let prefix = OutputPrefix::new(Path::new("out"), "run1_");
        assert_eq!(
            prefix.file("NanoComp_lengths.png"),
            PathBuf::from("out/run1_NanoComp_lengths.png")
        );
        let no_prefix = OutputPrefix::new(Path::new("."), "");
        assert_eq!(
            no_prefix.file("NanoComp_quals.svg"),
            PathBuf::from("./NanoComp_quals.svg")
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ReadType::OneDSquare.to_string(), "1D2");
        assert_eq!(FigureFormat::Jpeg.to_string(), "jpeg");
        assert_eq!(SourceKind::Summary.to_string(), "summary");
        assert!(FigureFormat::Svg.is_vector());
        assert!(!FigureFormat::Png.is_vector());
    }
}
