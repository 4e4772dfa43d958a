//! Finalized analytics and their publication.
//!
//! [`build_snapshot`] is the whole pipeline as a pure function. The
//! [`SnapshotStore`] runs it against the collaborator sources, one load
//! cycle at a time, and swaps the published result in a single step.

use serde::Serialize;
use std::ops::Deref;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::analyzers::aggregate::Aggregator;
use crate::analyzers::classify::{HourZone, classify};
use crate::analyzers::rank::{Ranking, finalize};
use crate::analyzers::types::{CounterpartyRecord, Partition, RawCallEntry};
use crate::contacts::{ContactIndex, RawContact};
use crate::error::Result;
use crate::sources::{CallLogSource, ContactSource};
use crate::stats::{HourlyHistogram, SummaryStats};

/// Read-only analytics for one partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionSnapshot {
    pub stats: SummaryStats,
    pub hourly: HourlyHistogram,
    pub list_by_count: Vec<CounterpartyRecord>,
    pub list_by_duration: Vec<CounterpartyRecord>,
    /// Longest total duration, or the `"N/A"` placeholder when empty.
    pub top: CounterpartyRecord,
}

impl PartitionSnapshot {
    pub fn ranked(&self, ranking: Ranking) -> &[CounterpartyRecord] {
        match ranking {
            Ranking::Count => &self.list_by_count,
            Ranking::Duration => &self.list_by_duration,
        }
    }

    /// Records, most frequent first, whose name contains `query` ignoring
    /// case or whose original number contains it verbatim.
    pub fn search(&self, query: &str) -> Vec<&CounterpartyRecord> {
        let needle = query.to_lowercase();
        self.list_by_count
            .iter()
            .filter(|r| r.name.to_lowercase().contains(&needle) || r.phone_number.contains(query))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.list_by_count.is_empty()
    }
}

/// Both partitions of one load cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsSnapshot {
    pub known: PartitionSnapshot,
    pub unknown: PartitionSnapshot,
}

impl AnalyticsSnapshot {
    pub fn partition(&self, partition: Partition) -> &PartitionSnapshot {
        match partition {
            Partition::Known => &self.known,
            Partition::Unknown => &self.unknown,
        }
    }
}

/// Runs the full pipeline over raw collections.
///
/// Deterministic: the same inputs always give an equal snapshot.
pub fn build_snapshot(
    contacts: &[RawContact],
    calls: &[RawCallEntry],
    zone: &HourZone,
) -> AnalyticsSnapshot {
    let index = ContactIndex::build(contacts);

    let mut aggregator = Aggregator::new();
    for call in calls {
        aggregator.add(&classify(call, &index, zone));
    }

    let (known, unknown) = aggregator.into_partitions();
    AnalyticsSnapshot {
        known: finalize(&known),
        unknown: finalize(&unknown),
    }
}

/// A snapshot as handed to consumers, tagged with its load-cycle number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedSnapshot {
    pub version: u64,
    #[serde(flatten)]
    pub snapshot: AnalyticsSnapshot,
}

impl Deref for PublishedSnapshot {
    type Target = AnalyticsSnapshot;

    fn deref(&self) -> &AnalyticsSnapshot {
        &self.snapshot
    }
}

/// Holds the latest published snapshot and serializes load cycles.
///
/// Readers get an `Arc` to a finished snapshot; a failed cycle leaves the
/// previous one in place.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    zone: HourZone,
    current: RwLock<Option<Arc<PublishedSnapshot>>>,
    /// Held for the length of a load cycle; guards the last version issued.
    cycle: Mutex<u64>,
}

impl SnapshotStore {
    pub fn new(zone: HourZone) -> Self {
        Self {
            zone,
            current: RwLock::new(None),
            cycle: Mutex::new(0),
        }
    }

    pub async fn current(&self) -> Option<Arc<PublishedSnapshot>> {
        self.current.read().await.clone()
    }

    /// Runs one load cycle and publishes its result.
    ///
    /// An unreadable contact source counts as an empty address book. Any
    /// call-log failure is returned and nothing is published.
    #[tracing::instrument(skip_all)]
    pub async fn refresh(
        &self,
        contacts: &dyn ContactSource,
        calls: &dyn CallLogSource,
    ) -> Result<Arc<PublishedSnapshot>> {
        let mut last_version = self.cycle.lock().await;

        let contacts = match contacts.load_contacts().await {
            Ok(contacts) => contacts,
            Err(e) => {
                warn!(error = %e, "No contacts available, treating every number as unknown");
                Vec::new()
            }
        };

        let calls = calls.load_calls().await?;

        let snapshot = build_snapshot(&contacts, &calls, &self.zone);
        *last_version += 1;
        let published = Arc::new(PublishedSnapshot {
            version: *last_version,
            snapshot,
        });

        *self.current.write().await = Some(Arc::clone(&published));

        info!(
            version = published.version,
            contacts = contacts.len(),
            calls = calls.len(),
            known = published.known.list_by_count.len(),
            unknown = published.unknown.list_by_count.len(),
            "Published analytics snapshot"
        );

        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::CallType;
    use crate::error::Error;
    use crate::sources::{StaticSource, UnsupportedCallLog};
    use async_trait::async_trait;

    const AT_14_UTC: i64 = 1_705_329_000_000;

    struct BrokenContacts;

    #[async_trait]
    impl ContactSource for BrokenContacts {
        async fn load_contacts(&self) -> Result<Vec<RawContact>> {
            Err(Error::unavailable("contacts", "permission denied"))
        }
    }

    fn sample() -> StaticSource {
        StaticSource::new(
            vec![RawContact::new("Alice", &["9876543210"])],
            vec![
                RawCallEntry::new("+91-98765-43210", 120, AT_14_UTC, CallType::Incoming),
                RawCallEntry::new("5551234", 0, AT_14_UTC, CallType::Missed),
            ],
        )
    }

    #[test]
    fn test_build_snapshot_empty_log() {
        let snapshot = build_snapshot(&[], &[], &HourZone::utc());

        for partition in [&snapshot.known, &snapshot.unknown] {
            assert_eq!(partition.stats, SummaryStats::default());
            assert_eq!(partition.top.name, "N/A");
            assert_eq!(partition.top.duration, 0);
            assert!(partition.is_empty());
        }
    }

    #[test]
    fn test_search_by_name_and_number() {
        let source = sample();
        let snapshot = build_snapshot(&source.contacts, &source.calls, &HourZone::utc());

        assert_eq!(snapshot.known.search("ALI").len(), 1);
        assert_eq!(snapshot.known.search("98765").len(), 1);
        assert!(snapshot.known.search("bob").is_empty());
        assert_eq!(snapshot.unknown.search("555").len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_publishes_versioned_snapshots() {
        let store = SnapshotStore::new(HourZone::utc());
        let source = sample();
        assert!(store.current().await.is_none());

        let first = store.refresh(&source, &source).await.unwrap();
        let second = store.refresh(&source, &source).await.unwrap();

        assert_eq!(first.version, 1);
        assert_eq!(second.version, 2);
        assert_eq!(first.snapshot, second.snapshot);
        assert_eq!(store.current().await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_failed_call_log_keeps_previous_snapshot() {
        let store = SnapshotStore::new(HourZone::utc());
        let source = sample();
        store.refresh(&source, &source).await.unwrap();

        let err = store.refresh(&source, &UnsupportedCallLog).await.unwrap_err();

        assert!(matches!(err, Error::Unsupported { .. }));
        let current = store.current().await.unwrap();
        assert_eq!(current.version, 1);
        assert_eq!(current.known.stats.total, 1);
    }

    #[tokio::test]
    async fn test_unsupported_call_log_publishes_nothing() {
        let store = SnapshotStore::new(HourZone::utc());

        assert!(store.refresh(&sample(), &UnsupportedCallLog).await.is_err());
        assert!(store.current().await.is_none());
    }

    #[tokio::test]
    async fn test_broken_contact_source_degrades_to_unknown() {
        let store = SnapshotStore::new(HourZone::utc());

        let published = store.refresh(&BrokenContacts, &sample()).await.unwrap();

        assert!(published.known.is_empty());
        assert_eq!(published.unknown.stats.total, 2);
        assert_eq!(published.unknown.stats.duration, 120);
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_are_serialized() {
        let store = Arc::new(SnapshotStore::new(HourZone::utc()));
        let source = Arc::new(sample());

        let mut tasks = vec![];
        for _ in 0..8 {
            let store = Arc::clone(&store);
            let source = Arc::clone(&source);
            tasks.push(tokio::spawn(async move {
                store.refresh(&*source, &*source).await.map(|s| s.version)
            }));
        }

        let mut versions = vec![];
        for task in tasks {
            versions.push(task.await.unwrap().unwrap());
        }
        versions.sort_unstable();

        assert_eq!(versions, (1..=8).collect::<Vec<u64>>());
        assert_eq!(store.current().await.unwrap().version, 8);
    }
}
