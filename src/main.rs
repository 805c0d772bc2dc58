use anyhow::Context;
use clap::Parser;
use climate_series::SeriesError;
use climate_series::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    if let Err(error) = run(args) {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

    runtime.block_on(async {
        // Ctrl-C drops the command future, discarding any unpersisted JSON temp file
        tokio::select! {
            result = commands::run(args) => result.map_err(anyhow::Error::from),
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to install Ctrl-C handler")?;
                eprintln!("\nReceived Ctrl-C, shutting down...");
                Err(SeriesError::Interrupted {
                    reason: "interrupted by user".to_string(),
                }
                .into())
            }
        }
    })
}
