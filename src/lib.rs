use std::path::PathBuf;

use log::info;

pub mod aggregator;
pub mod bam;
pub mod config;
pub mod context;
pub mod error;
pub mod extractor;
pub mod fastq;
pub mod io;
pub mod metrics;
pub mod plot;
pub mod quality;
pub mod summary;

use crate::config::InputConfig;
use crate::context::RunContext;
use crate::error::Result;
use crate::extractor::{Extractor, FileExtractor};
use crate::plot::{Renderer, ViolinRenderer};

/// Aggregate the input files of `config` and draw the comparison plots into
/// the output location of `ctx`. Returns the written plot files.
pub fn run(config: &InputConfig, ctx: &RunContext) -> Result<Vec<PathBuf>> {
    run_with(config, ctx, &FileExtractor, &ViolinRenderer)
}

/// [`run`] with explicit extractor and renderer.
pub fn run_with<E, R>(
    config: &InputConfig,
    ctx: &RunContext,
    extractor: &E,
    renderer: &R,
) -> Result<Vec<PathBuf>>
where
    E: Extractor + ?Sized,
    R: Renderer + ?Sized,
{
    let source = config.source()?;
    let mut table = aggregator::aggregate(extractor, &source, config.read_type, config.threads)?;

    table.derive_log_length()?;

    let plots = plot::make_plots(&table, renderer, &ctx.output, ctx.format)?;
    info!("Succesfully processed all input.");
    Ok(plots)
}
