//! CLI entry point for the call-log analytics tool.
//!
//! Each subcommand runs one load cycle over a contacts export and a call-log
//! export (local file or URL), then reports, exports or searches the result.

use anyhow::Result;
use call_log_analytics::config::Settings;
use call_log_analytics::fetch::{BasicClient, is_remote};
use call_log_analytics::output::{export_ranked_csv, format_duration, print_json, print_pretty};
use call_log_analytics::sources::{
    CallLogSource, ContactSource, FileCallLogSource, FileContactSource, HttpCallLogSource,
    StaticSource,
};
use call_log_analytics::{Partition, PartitionSnapshot, PublishedSnapshot, Ranking, SnapshotStore};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "call_log_analytics")]
#[command(about = "Aggregate a phone's call history into per-contact analytics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Call-log export: path to a JSON file (optionally gzipped) or URL
    #[arg(value_name = "FILE_OR_URL")]
    calls: String,

    /// Contacts export (JSON). Without it every number is unknown
    #[arg(short, long)]
    contacts: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize both partitions
    Analyze {
        #[command(flatten)]
        sources: SourceArgs,

        /// How many ranked counterparties to list per partition
        #[arg(short, long, default_value_t = 10)]
        top: usize,

        /// Also log the full snapshot as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write one partition's ranking to a CSV file
    Export {
        #[command(flatten)]
        sources: SourceArgs,

        #[arg(short, long, value_enum, default_value_t = PartitionArg::Known)]
        partition: PartitionArg,

        #[arg(short, long, value_enum, default_value_t = RankingArg::Count)]
        by: RankingArg,

        /// CSV file to write
        #[arg(short, long, default_value = "call_ranking.csv")]
        output: String,

        /// Keep only the first N rows
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Find counterparties by name or number
    Search {
        #[command(flatten)]
        sources: SourceArgs,

        query: String,

        #[arg(short, long, value_enum, default_value_t = PartitionArg::Known)]
        partition: PartitionArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PartitionArg {
    Known,
    Unknown,
}

impl From<PartitionArg> for Partition {
    fn from(arg: PartitionArg) -> Self {
        match arg {
            PartitionArg::Known => Partition::Known,
            PartitionArg::Unknown => Partition::Unknown,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RankingArg {
    Count,
    Duration,
}

impl From<RankingArg> for Ranking {
    fn from(arg: RankingArg) -> Self {
        match arg {
            RankingArg::Count => Ranking::Count,
            RankingArg::Duration => Ranking::Duration,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let settings = Settings::from_env()?;

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = Path::new(&settings.log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&settings.log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("call_log_analytics.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let store = SnapshotStore::new(settings.hour_zone);

    match cli.command {
        Commands::Analyze { sources, top, json } => {
            let published = load(&store, &sources).await?;

            report("known", &published.known, top);
            report("unknown", &published.unknown, top);

            print_pretty(&published);
            if json {
                print_json(&*published)?;
            }
        }
        Commands::Export {
            sources,
            partition,
            by,
            output,
            limit,
        } => {
            let published = load(&store, &sources).await?;
            let snapshot = published.partition(partition.into());

            let rows = export_ranked_csv(&output, snapshot, by.into(), limit)?;
            info!(path = %output, rows, "Ranking exported");
        }
        Commands::Search {
            sources,
            query,
            partition,
        } => {
            let published = load(&store, &sources).await?;
            let matches = published.partition(partition.into()).search(&query);

            info!(query = %query, matches = matches.len(), "Search results");
            for record in matches {
                info!(
                    name = %record.name,
                    number = %record.phone_number,
                    calls = record.count,
                    duration = %format_duration(record.duration),
                    missed = record.missed,
                    "Match"
                );
            }
        }
    }

    Ok(())
}

/// Builds the sources named on the command line and runs one load cycle.
#[tracing::instrument(skip_all, fields(calls = %args.calls, contacts = ?args.contacts))]
async fn load(store: &SnapshotStore, args: &SourceArgs) -> Result<Arc<PublishedSnapshot>> {
    let contacts: Box<dyn ContactSource> = match &args.contacts {
        Some(path) => Box::new(FileContactSource::new(path)),
        None => Box::new(StaticSource::default()),
    };

    let calls: Box<dyn CallLogSource> = if is_remote(&args.calls) {
        Box::new(HttpCallLogSource::new(BasicClient::new(), &args.calls))
    } else {
        Box::new(FileCallLogSource::new(&args.calls))
    };

    Ok(store.refresh(contacts.as_ref(), calls.as_ref()).await?)
}

/// Logs summary figures and the head of both rankings for one partition.
fn report(label: &str, snapshot: &PartitionSnapshot, top: usize) {
    let stats = &snapshot.stats;

    info!(
        partition = label,
        calls = stats.total,
        duration = %format_duration(stats.duration),
        missed = stats.missed,
        missed_pct = %format!("{:.1}", stats.missed_pct()),
        avg_duration = %format_duration(stats.average_duration().round() as u64),
        peak_hour = ?snapshot.hourly.peak_hour(),
        top_talker = %snapshot.top.name,
        top_talker_duration = %format_duration(snapshot.top.duration),
        "Partition summary"
    );

    for ranking in [Ranking::Count, Ranking::Duration] {
        for (rank, record) in snapshot.ranked(ranking).iter().take(top).enumerate() {
            info!(
                partition = label,
                ranking = ?ranking,
                rank = rank + 1,
                name = %record.name,
                number = %record.phone_number,
                calls = record.count,
                duration = %format_duration(record.duration),
                missed = record.missed,
                "Ranked"
            );
        }
    }
}
