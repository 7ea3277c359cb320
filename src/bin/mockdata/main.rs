//! Writes simulated nanopore datasets, one fastq file and one sequencing
//! summary per dataset, for trying out NanoComp and for the benchmarks.

use std::fs;
use std::path::PathBuf;

use anyhow::{Result, bail};
use bio::io::fastq;
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, LogNormal, Normal};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "NanoComp mockdata",
    about = "Simulate fastq and sequencing summary files of several nanopore runs.",
    version = env!("CARGO_PKG_VERSION")
)]
struct MockConfig {
    /// Directory the simulated files are written to.
    #[arg(short, long, default_value = "sim_data")]
    outdir: PathBuf,
    /// Number of datasets to simulate. Each dataset gets slightly longer and
    /// better reads than the previous one.
    #[arg(short, long, default_value_t = 3)]
    datasets: usize,
    /// Number of reads per dataset.
    #[arg(short, long, default_value_t = 1000)]
    reads: usize,
    /// Seed of the random generator.
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
}

const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];
const SUMMARY_HEADER: [&str; 6] = [
    "read_id",
    "channel",
    "start_time",
    "duration",
    "sequence_length_template",
    "mean_qscore_template",
];

fn main() -> Result<()> {
    let config = MockConfig::parse();
    if config.datasets == 0 || config.reads == 0 {
        bail!("at least one dataset with one read is required");
    }
    fs::create_dir_all(&config.outdir)?;

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    for dataset in 0..config.datasets {
        let lengths = LogNormal::new(8.0 + 0.2 * dataset as f64, 0.6)?;
        let quality = Normal::new(10.0 + dataset as f64, 2.0)?;

        let fastq_path = config.outdir.join(format!("mock_{}.fastq", dataset + 1));
        let summary_path = config
            .outdir
            .join(format!("mock_{}_sequencing_summary.txt", dataset + 1));

        let mut fastq_writer = fastq::Writer::to_file(&fastq_path)?;
        let mut summary_writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(&summary_path)?;
        summary_writer.write_record(SUMMARY_HEADER)?;

        let mut start_time = 0.0;
        for read in 0..config.reads {
            let length = (lengths.sample(&mut rng) as usize).max(1);
            let mean_q: f64 = quality.sample(&mut rng).clamp(2.0, 40.0);

            let seq: Vec<u8> = (0..length)
                .map(|_| BASES[rng.random_range(0..BASES.len())])
                .collect();
            let phred: Vec<u8> = (0..length)
                .map(|_| {
                    let q = mean_q + rng.random_range(-3.0..3.0);
                    q.round().clamp(2.0, 40.0) as u8
                })
                .collect();
            let qual: Vec<u8> = phred.iter().map(|q| q + 33).collect();

            let read_id = format!("mock_{}_read_{}", dataset + 1, read + 1);
            fastq_writer.write(&read_id, None, &seq, &qual)?;

            let duration = length as f64 / 450.0;
            let channel = rng.random_range(1..=512u32);
            summary_writer.write_record([
                read_id,
                channel.to_string(),
                format!("{:.3}", start_time),
                format!("{:.3}", duration),
                length.to_string(),
                format!(
                    "{:.3}",
                    nanocomp::quality::ave_qual(&phred).unwrap_or(mean_q)
                ),
            ])?;
            start_time += duration;
        }

        fastq_writer.flush()?;
        summary_writer.flush()?;
        println!(
            "✅ Wrote {} reads to {} and {}",
            config.reads,
            fastq_path.display(),
            summary_path.display()
        );
    }

    Ok(())
}
