//! vx-core CLI: one-pass chart-event extraction.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use vx_core::{EpisodeIndex, ExitCode, WindowFilter};

use vx_common::{Error, Result, RunId};
use vx_config::ExtractConfig;
use vx_store::{read_episode_table, ChartStore, CsvChunks};

/// Extract chart events inside the look-back windows preceding the end
/// of each stay's first mechanical-ventilation episode.
#[derive(Parser, Debug)]
#[command(name = "vx-core", version)]
struct Cli {
    /// Chart-events CSV to scan
    events: PathBuf,

    /// Precomputed ventilation-episode table (Parquet)
    #[arg(long)]
    episodes: PathBuf,

    /// Output artifact directory (overwritten if it is a previous artifact)
    #[arg(long)]
    out: PathBuf,

    /// Run configuration file (JSON); defaults to $VENTEX_CONFIG, then
    /// built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured chunk size (rows per chunk)
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Stop after this many chunks and persist the partial result
    #[arg(long)]
    max_chunks: Option<u64>,

    /// Total row count of the events table, used only for the progress
    /// estimate
    #[arg(long)]
    total_rows: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log errors only
    #[arg(long, conflicts_with = "verbose")]
    quiet: bool,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn resolve_config(cli: &Cli) -> Result<ExtractConfig> {
    let (mut config, source) = ExtractConfig::resolve(cli.config.as_deref())
        .map_err(|e| Error::Config(e.to_string()))?;

    if let Some(chunk_size) = cli.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(max_chunks) = cli.max_chunks {
        config.max_chunks = Some(max_chunks);
    }
    if let Some(total_rows) = cli.total_rows {
        config.total_rows_hint = Some(total_rows);
    }

    vx_config::validate(&config).map_err(|errors| {
        let joined = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Error::Config(joined)
    })?;

    tracing::debug!(%source, ?config, "configuration resolved");
    Ok(config)
}

fn run(cli: &Cli) -> Result<()> {
    let run_id = RunId::new();
    let config = resolve_config(cli)?;

    tracing::info!(
        %run_id,
        events = %cli.events.display(),
        episodes = %cli.episodes.display(),
        out = %cli.out.display(),
        "starting extraction"
    );

    let episode_table =
        read_episode_table(&cli.episodes).map_err(|e| Error::EpisodeTable(e.to_string()))?;
    let index = EpisodeIndex::build(&episode_table, &config.windows)?;
    tracing::info!(stays = index.len(), "episode index built");
    if index.is_empty() {
        tracing::warn!("no stay has a first ventilation episode; result tables will be empty");
    }

    let chunks = CsvChunks::open(&cli.events, config.chunk_size)
        .map_err(|e| Error::EventSource(e.to_string()))?;

    let windows = config.windows.clone();
    let outcome = WindowFilter::new(index, config).run(chunks)?;

    // The artifact is only touched once the scan has fully succeeded;
    // a malformed source never leaves partial output behind.
    let mut store =
        ChartStore::create(&cli.out, run_id).map_err(|e| Error::Store(e.to_string()))?;
    for (window, table) in windows.iter().zip(outcome.tables.iter()) {
        store
            .write_table(&window.name, table)
            .map_err(|e| Error::Store(e.to_string()))?;
    }
    let manifest = store.finish().map_err(|e| Error::Store(e.to_string()))?;

    tracing::info!(
        chunks = outcome.stats.chunks_processed,
        rows_scanned = outcome.stats.rows_scanned,
        tables = manifest.tables.len(),
        partial = outcome.stats.capped,
        "done processing chart events"
    );
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(err) = run(&cli) {
        tracing::error!(code = err.code(), "{err}");
        std::process::exit(ExitCode::from(&err).as_i32());
    }
}
