use clap::Parser;
use colored::Colorize;
use log::error;
use std::process;

use nanocomp::config::InputConfig;
use nanocomp::context::RunContext;

fn main() {
    println!(
        "{} {}",
        "NanoComp for comparing Oxford Nanopore sequencing runs and alignments.\n Version:"
            .cyan()
            .bold(),
        env!("CARGO_PKG_VERSION").cyan().bold()
    );
    let config = InputConfig::parse();
    let ctx = RunContext::init(&config).unwrap_or_else(|err| {
        eprintln!("Problem setting up the run: {}", err.to_string().red().bold());
        process::exit(1);
    });
    println!("✅ Configurations validated, starting analysis...");
    println!("📝 Logging to {}", ctx.log_file.display());

    match nanocomp::run(&config, &ctx) {
        Ok(plots) => {
            for plot in plots {
                println!("📊 {}", plot.display());
            }
            println!("✅ Succesfully processed all input.");
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Application error: {}", e.to_string().red().bold());
            process::exit(1);
        }
    }
}
