// src/main.rs
//! Scans a RP66V1 file or directory and writes out the index(es) in XML.

use anyhow::Context;
use clap::Parser;
use rp66v1_index::batch::{plot_results, run_batch, write_summary, BatchConfig};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Writes compact XML indexes of RP66V1 (DLIS) files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file or directory
    path_in: PathBuf,

    /// Output path, `.xml` is appended. The index is printed if absent
    path_out: Option<PathBuf>,

    /// Process input recursively
    #[arg(short, long)]
    recurse: bool,

    /// Also write out private EFLRs
    #[arg(short, long)]
    private: bool,

    /// Worker threads for a directory, 0 uses every core. Sequential if absent
    #[arg(short, long, env = "RP66V1_INDEX_JOBS")]
    jobs: Option<usize>,

    /// Directory to write gnuplot data, script and plot to
    #[arg(long)]
    gnuplot: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);
    if let Err(err) = run(&args) {
        error!("{:#}", err);
    }
    ExitCode::SUCCESS
}

fn run(args: &Args) -> anyhow::Result<()> {
    info!("Cmd: {}", std::env::args().collect::<Vec<_>>().join(" "));
    let config = BatchConfig {
        recurse: args.recurse,
        private: args.private,
        jobs: args.jobs,
    };
    let start = Instant::now();
    let results = run_batch(&args.path_in, args.path_out.as_deref(), &config)
        .with_context(|| format!("indexing {}", args.path_in.display()))?;
    let elapsed = start.elapsed();

    if let Some(dir) = &args.gnuplot {
        if let Err(err) = plot_results(&results, dir) {
            error!("gnuplot failed: {}", err);
        }
    }
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_summary(&mut out, &results, elapsed).context("writing summary")?;
    out.flush()?;
    Ok(())
}

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli() {
        Args::command().debug_assert();
        let args = Args::try_parse_from(["rp66v1-index", "in", "out", "-r", "-j", "4", "--gnuplot", "plots"]).unwrap();
        assert_eq!(args.path_in, PathBuf::from("in"));
        assert_eq!(args.path_out, Some(PathBuf::from("out")));
        assert!(args.recurse);
        assert!(!args.private);
        assert_eq!(args.jobs, Some(4));
        assert_eq!(args.gnuplot, Some(PathBuf::from("plots")));
    }
}
