use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use env_logger::{Builder, Env, Target};
use log::info;

use crate::config::{FigureFormat, InputConfig, OutputPrefix};
use crate::error::{NanoCompError, Result};

/// Process-wide setup of a run: the output directory and the log file.
///
/// Created once at startup and passed to whatever needs to know where output
/// goes.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub output: OutputPrefix,
    pub format: FigureFormat,
    pub log_file: PathBuf,
}

impl RunContext {
    /// Creates the output directory, installs the log file as the global log
    /// sink and records the arguments of the run.
    ///
    /// # Errors
    /// Returns an error if the output directory or log file cannot be created,
    /// or if a logger is already installed.
    pub fn init(config: &InputConfig) -> Result<RunContext> {
        let output = config.output_prefix();
        prepare_output_dir(&output.outdir)?;

        let log_file = log_file_path(&output, &Local::now().format("%Y%m%d_%H%M").to_string());
        init_logs(&log_file)?;

        info!(
            "NanoComp {} started with arguments {:?}",
            env!("CARGO_PKG_VERSION"),
            config
        );

        Ok(RunContext {
            output,
            format: config.format,
            log_file,
        })
    }
}

/// Create `outdir` and its parents unless it already is a directory.
pub fn prepare_output_dir(outdir: &Path) -> Result<()> {
    if outdir.is_file() {
        return Err(NanoCompError::Configuration(format!(
            "output path {} is a file, please use a valid directory",
            outdir.display()
        )));
    }
    if !outdir.exists() {
        fs::create_dir_all(outdir)?;
    }
    Ok(())
}

pub fn log_file_path(output: &OutputPrefix, timestamp: &str) -> PathBuf {
    output.file(&format!("NanoComp_{}.log", timestamp))
}

fn init_logs(log_file: &Path) -> Result<()> {
    let file = File::create(log_file)?;
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {} {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .try_init()
        .map_err(|e| NanoCompError::Logging(e.to_string()))
}
