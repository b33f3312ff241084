//! Command line decompressor: `aplib <file>` writes `<file>.out`.
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use aplib::{trace::TracingSink, DecodeStats, Decompressor};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aplib")]
#[command(about = "Decompress aPLib compressed files", long_about = None)]
struct Cli {
    /// Compressed input file
    input: PathBuf,

    /// Where to write the decompressed data (default: `<input>.out`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print back-reference and bitstream statistics
    #[arg(long)]
    stats: bool,

    /// More logging; -vv logs every decoded operation
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_stats(stats: &DecodeStats) {
    println!(
        "Max backref distance {}, max backref length {}",
        stats.max_offset, stats.max_match_length
    );
    println!(
        "{} bits (= {} bytes) + {} bytes data",
        stats.bits_read,
        stats.bits_read / 8,
        stats.data_bytes_read
    );
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let compressed = std::fs::read(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    let now = Instant::now();
    let decoded = Decompressor::with_trace(compressed.as_slice(), TracingSink)
        .decode()
        .with_context(|| format!("failed to decompress {}", cli.input.display()))?;
    tracing::debug!("decoded in {:?}", now.elapsed());

    let output = cli.output.unwrap_or_else(|| {
        let mut name = cli.input.clone().into_os_string();
        name.push(".out");
        PathBuf::from(name)
    });
    std::fs::write(&output, &decoded.data)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!(
        "{} -> {} ({} bytes)",
        cli.input.display(),
        output.display(),
        decoded.data.len()
    );

    if cli.stats {
        print_stats(&decoded.stats);
    }
    Ok(())
}
