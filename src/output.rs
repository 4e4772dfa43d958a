//! Output formatting and export for finished snapshots.
//!
//! Supports pretty-printing, JSON serialization, and ranked CSV export.

use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use tracing::{debug, info};

use crate::analyzers::rank::Ranking;
use crate::error::Result;
use crate::snapshot::{AnalyticsSnapshot, PartitionSnapshot};

/// Logs a snapshot using Rust's debug pretty-print format.
pub fn print_pretty(snapshot: &AnalyticsSnapshot) {
    debug!("{:#?}", snapshot);
}

/// Logs any serializable value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Renders seconds the way the dashboard shows them: `"2h 5m"`,
/// `"4m 10s"`, `"42s"`.
pub fn format_duration(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;

    if h > 0 {
        format!("{h}h {m}m")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}

#[derive(Serialize)]
struct RankedRow<'a> {
    #[serde(rename = "Rank")]
    rank: usize,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Number")]
    number: &'a str,
    #[serde(rename = "Count")]
    count: u64,
    #[serde(rename = "Duration(s)")]
    duration: u64,
}

/// Writes a partition's ranking as CSV rows with a header, ranks starting
/// at 1. `limit` keeps only the first rows. Returns the number of rows.
pub fn write_ranked<W: Write>(
    writer: W,
    partition: &PartitionSnapshot,
    ranking: Ranking,
    limit: Option<usize>,
) -> Result<usize> {
    let records = partition.ranked(ranking);
    let take = limit.unwrap_or(records.len());

    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);

    let mut rows = 0;
    for (index, record) in records.iter().take(take).enumerate() {
        writer.serialize(RankedRow {
            rank: index + 1,
            name: &record.name,
            number: &record.phone_number,
            count: record.count,
            duration: record.duration,
        })?;
        rows += 1;
    }

    if rows == 0 {
        writer.write_record(["Rank", "Name", "Number", "Count", "Duration(s)"])?;
    }

    writer.flush()?;
    Ok(rows)
}

/// Exports a ranking to a CSV file, replacing any existing file.
pub fn export_ranked_csv(
    path: &str,
    partition: &PartitionSnapshot,
    ranking: Ranking,
    limit: Option<usize>,
) -> Result<usize> {
    debug!(path, ?ranking, "Exporting ranked CSV");
    let file = File::create(path)?;
    write_ranked(file, partition, ranking, limit)
}
