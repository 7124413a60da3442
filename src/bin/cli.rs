// src/bin/cli.rs
use clap::Parser;
use forecast_check::cli;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = cli::Args::parse();
    if !cli::run(args)? {
        std::process::exit(1);
    }
    Ok(())
}
