use std::cell::RefCell;
use std::path::{Path, PathBuf};

use nanocomp::aggregator::aggregate;
use nanocomp::config::{
    FigureFormat, InputConfig, InputSource, OutputPrefix, ReadType, SourceKind,
};
use nanocomp::context::RunContext;
use nanocomp::error::{NanoCompError, Result};
use nanocomp::extractor::FileExtractor;
use nanocomp::metrics::{DatasetLabel, Metric, UnifiedTable};
use nanocomp::plot::{Renderer, ViolinRenderer, plot_file};

fn data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

#[derive(Default)]
struct RecordingRenderer {
    calls: RefCell<Vec<Metric>>,
}

impl Renderer for RecordingRenderer {
    fn violin_plot(
        &self,
        table: &UnifiedTable,
        metric: Metric,
        output: &OutputPrefix,
        format: FigureFormat,
        _log_scale: bool,
    ) -> Result<PathBuf> {
        assert!(table.has_column(metric));
        self.calls.borrow_mut().push(metric);
        Ok(plot_file(output, metric, format))
    }
}

#[test]
fn fastq_files_are_labelled_with_the_whole_input_list() {
    let paths = vec![data("a.fastq"), data("b.fastq")];
    let source = InputSource::new(SourceKind::Fastq, paths.clone());
    let table = aggregate(&FileExtractor, &source, ReadType::OneD, 2).unwrap();

    assert_eq!(table.len(), 5);
    let lengths: Vec<u64> = table.rows().iter().map(|r| r.lengths).collect();
    assert_eq!(lengths, vec![20, 12, 32, 30, 8]);

    let label = DatasetLabel::Group(paths);
    assert!(table.rows().iter().all(|r| *r.dataset == label));

    let quals: Vec<f64> = table.rows().iter().map(|r| r.quals.unwrap()).collect();
    for (got, expected) in quals.iter().zip([20.0, 10.0, 40.0, 30.0, 20.0]) {
        assert!((got - expected).abs() < 1e-9);
    }
}

#[test]
fn summary_files_are_labelled_per_file() {
    let source = InputSource::new(SourceKind::Summary, vec![data("s1.txt"), data("s2.txt")]);
    let table = aggregate(&FileExtractor, &source, ReadType::OneD, 4).unwrap();

    assert_eq!(table.len(), 10);
    for (i, row) in table.rows().iter().enumerate() {
        let expected = if i < 4 { data("s1.txt") } else { data("s2.txt") };
        assert_eq!(*row.dataset, DatasetLabel::File(expected));
    }
    assert_eq!(table.row(0).unwrap().read_id.as_deref(), Some("s1_r1"));
    assert_eq!(table.row(9).unwrap().channel, Some(49));
    assert_eq!(table.row(4).unwrap().quals, Some(10.1));
}

#[test]
fn summary_with_wrong_read_type_fails_as_a_whole() {
    let source = InputSource::new(SourceKind::Summary, vec![data("s1.txt"), data("s2.txt")]);
    let err = aggregate(&FileExtractor, &source, ReadType::TwoD, 4).unwrap_err();
    match err {
        NanoCompError::Extraction { path, .. } => assert_eq!(path, data("s1.txt")),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn missing_input_file_fails() {
    let source = InputSource::new(
        SourceKind::Fastq,
        vec![data("a.fastq"), data("does_not_exist.fastq")],
    );
    let err = aggregate(&FileExtractor, &source, ReadType::OneD, 1).unwrap_err();
    assert!(matches!(err, NanoCompError::Extraction { .. }));
}

#[test]
fn aggregation_is_repeatable() {
    let source = InputSource::new(SourceKind::Fastq, vec![data("b.fastq"), data("a.fastq")]);
    let first = aggregate(&FileExtractor, &source, ReadType::OneD, 3).unwrap();
    let second = aggregate(&FileExtractor, &source, ReadType::OneD, 1).unwrap();
    assert_eq!(first, second);
}

#[test]
fn pipeline_draws_the_three_standard_plots_for_summaries() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = InputConfig::new(InputSource::new(
        SourceKind::Summary,
        vec![data("s1.txt"), data("s2.txt")],
    ));
    config.outdir = dir.path().to_path_buf();
    config.prefix = "cmp_".to_string();
    config.format = FigureFormat::Svg;

    let ctx = RunContext {
        output: config.output_prefix(),
        format: config.format,
        log_file: dir.path().join("cmp_NanoComp_test.log"),
    };
    let renderer = RecordingRenderer::default();
    let plots = nanocomp::run_with(&config, &ctx, &FileExtractor, &renderer).unwrap();

    assert_eq!(
        *renderer.calls.borrow(),
        vec![Metric::Lengths, Metric::LogLength, Metric::Quals]
    );
    assert_eq!(
        plots,
        vec![
            dir.path().join("cmp_NanoComp_lengths.svg"),
            dir.path().join("cmp_NanoComp_log_length.svg"),
            dir.path().join("cmp_NanoComp_quals.svg"),
        ]
    );
}

fn render_summaries(format: FigureFormat) -> (tempfile::TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = InputConfig::new(InputSource::new(
        SourceKind::Summary,
        vec![data("s1.txt"), data("s2.txt")],
    ));
    config.outdir = dir.path().to_path_buf();
    config.format = format;

    let ctx = RunContext {
        output: config.output_prefix(),
        format,
        log_file: dir.path().join("NanoComp_test.log"),
    };
    let plots = nanocomp::run_with(&config, &ctx, &FileExtractor, &ViolinRenderer).unwrap();
    (dir, plots)
}

fn assert_written(plots: &[PathBuf]) {
    assert_eq!(plots.len(), 3);
    for plot in plots {
        let size = std::fs::metadata(plot).unwrap().len();
        assert!(size > 0, "{} is empty", plot.display());
    }
}

#[test]
fn violin_renderer_writes_svg_plots() {
    let (dir, plots) = render_summaries(FigureFormat::Svg);
    assert_eq!(plots[0], dir.path().join("NanoComp_lengths.svg"));
    assert_written(&plots);
}

#[test]
fn violin_renderer_writes_bitmap_plots() {
    let (dir, plots) = render_summaries(FigureFormat::Png);
    assert_eq!(plots[2], dir.path().join("NanoComp_quals.png"));
    assert_written(&plots);
}
