use std::cmp::Reverse;

use crate::analyzers::aggregate::PartitionAccumulator;
use crate::analyzers::types::CounterpartyRecord;
use crate::snapshot::PartitionSnapshot;
use crate::stats::SummaryStats;

/// Ordering applied to a partition's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ranking {
    /// Most calls first.
    Count,
    /// Longest total talk time first.
    Duration,
}

/// Sorts records in place, descending on the ranking's key. The sort is
/// stable, so ties keep their incoming order.
pub fn rank(records: &mut [CounterpartyRecord], ranking: Ranking) {
    match ranking {
        Ranking::Count => records.sort_by_key(|r| Reverse(r.count)),
        Ranking::Duration => records.sort_by_key(|r| Reverse(r.duration)),
    }
}

/// Turns one partition's accumulated state into its immutable snapshot.
///
/// Does not touch the accumulator, so it can run any number of times.
/// Ties in either ranking fall back to ascending normalized key.
pub fn finalize(acc: &PartitionAccumulator) -> PartitionSnapshot {
    let records: Vec<CounterpartyRecord> = acc.records().cloned().collect();
    let stats = SummaryStats::from_records(&records);

    let mut list_by_count = records.clone();
    rank(&mut list_by_count, Ranking::Count);

    let mut list_by_duration = records;
    rank(&mut list_by_duration, Ranking::Duration);

    let top = list_by_duration
        .first()
        .cloned()
        .unwrap_or_else(CounterpartyRecord::placeholder);

    PartitionSnapshot {
        stats,
        hourly: *acc.hourly(),
        list_by_count,
        list_by_duration,
        top,
    }
}
