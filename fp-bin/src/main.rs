use anyhow::{Context, Result};
use clap::Parser;
use fp_bin::{run, Cli};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let placement = run(&cli)?;
    match &cli.output {
        Some(path) => std::fs::write(path, placement)
            .with_context(|| format!("cannot write output file {}", path.display()))?,
        None => print!("{placement}"),
    }
    Ok(())
}
