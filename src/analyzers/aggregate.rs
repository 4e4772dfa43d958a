use std::collections::BTreeMap;

use crate::analyzers::types::{ClassifiedEntry, CounterpartyRecord, Partition};
use crate::stats::HourlyHistogram;

/// Running state for one partition during a load cycle.
///
/// Keyed by normalized number in a `BTreeMap` so iteration, and therefore
/// every derived ranking, is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionAccumulator {
    pub(crate) records: BTreeMap<String, CounterpartyRecord>,
    pub(crate) hourly: HourlyHistogram,
}

impl PartitionAccumulator {
    fn add(&mut self, entry: &ClassifiedEntry) {
        self.records
            .entry(entry.key.clone())
            .or_insert_with(|| CounterpartyRecord::from_first_entry(entry))
            .record(entry);

        if let Some(hour) = entry.hour {
            self.hourly.record(hour);
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &CounterpartyRecord> {
        self.records.values()
    }

    pub fn get(&self, key: &str) -> Option<&CounterpartyRecord> {
        self.records.get(key)
    }

    pub fn hourly(&self) -> &HourlyHistogram {
        &self.hourly
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Folds classified entries into the known and unknown partitions.
///
/// Counts, durations, missed tallies and histograms do not depend on fold
/// order. A record's name and original number come from the first entry
/// folded for its key; later variants are not reconciled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregator {
    known: PartitionAccumulator,
    unknown: PartitionAccumulator,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: &ClassifiedEntry) {
        match entry.partition {
            Partition::Known => self.known.add(entry),
            Partition::Unknown => self.unknown.add(entry),
        }
    }

    pub fn partition(&self, partition: Partition) -> &PartitionAccumulator {
        match partition {
            Partition::Known => &self.known,
            Partition::Unknown => &self.unknown,
        }
    }

    /// Returns `(known, unknown)`.
    pub fn into_partitions(self) -> (PartitionAccumulator, PartitionAccumulator) {
        (self.known, self.unknown)
    }
}

impl<'a> Extend<&'a ClassifiedEntry> for Aggregator {
    fn extend<I: IntoIterator<Item = &'a ClassifiedEntry>>(&mut self, iter: I) {
        for entry in iter {
            self.add(entry);
        }
    }
}

impl<'a> FromIterator<&'a ClassifiedEntry> for Aggregator {
    fn from_iter<I: IntoIterator<Item = &'a ClassifiedEntry>>(iter: I) -> Self {
        let mut aggregator = Aggregator::new();
        aggregator.extend(iter);
        aggregator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::CallType;
    use proptest::prelude::*;

    fn entry(
        partition: Partition,
        key: &str,
        duration: u64,
        hour: Option<u8>,
        call_type: CallType,
    ) -> ClassifiedEntry {
        ClassifiedEntry {
            partition,
            key: key.to_string(),
            display_name: format!("name-{key}"),
            phone_number: key.to_string(),
            duration,
            hour,
            missed: call_type.is_missed(),
            call_type,
        }
    }

    #[test]
    fn test_empty_aggregator() {
        let (known, unknown) = Aggregator::new().into_partitions();

        assert!(known.is_empty());
        assert!(unknown.is_empty());
        assert_eq!(known.hourly().total(), 0);
        assert_eq!(unknown.hourly().total(), 0);
    }

    #[test]
    fn test_entries_route_to_their_partition() {
        let entries = vec![
            entry(Partition::Known, "111", 60, Some(9), CallType::Incoming),
            entry(Partition::Known, "111", 30, Some(9), CallType::Outgoing),
            entry(Partition::Unknown, "222", 0, Some(22), CallType::Missed),
        ];

        let aggregator: Aggregator = entries.iter().collect();

        let known = aggregator.partition(Partition::Known);
        let alice = known.get("111").unwrap();
        assert_eq!(known.len(), 1);
        assert_eq!(alice.count, 2);
        assert_eq!(alice.duration, 90);
        assert_eq!(alice.missed, 0);
        assert_eq!(alice.incoming, 1);
        assert_eq!(alice.outgoing, 1);
        assert!(alice.is_known);
        assert_eq!(known.hourly()[9], 2);

        let unknown = aggregator.partition(Partition::Unknown);
        let stranger = unknown.get("222").unwrap();
        assert_eq!(stranger.count, 1);
        assert_eq!(stranger.missed, 1);
        assert!(!stranger.is_known);
        assert_eq!(unknown.hourly()[22], 1);
        assert_eq!(unknown.hourly()[9], 0);
    }

    #[test]
    fn test_missing_hour_still_counts_call() {
        let aggregator: Aggregator = [entry(Partition::Unknown, "333", 45, None, CallType::Incoming)]
            .iter()
            .collect();

        let unknown = aggregator.partition(Partition::Unknown);
        assert_eq!(unknown.get("333").unwrap().count, 1);
        assert_eq!(unknown.get("333").unwrap().duration, 45);
        assert_eq!(unknown.hourly().total(), 0);
    }

    #[test]
    fn test_first_seen_identity_wins() {
        let mut first = entry(Partition::Unknown, "5551234", 10, Some(1), CallType::Incoming);
        first.display_name = "Pizza Place".to_string();
        first.phone_number = "555-1234".to_string();
        let mut second = entry(Partition::Unknown, "5551234", 10, Some(1), CallType::Incoming);
        second.display_name = "Pizza".to_string();
        second.phone_number = "+5551234".to_string();

        let aggregator: Aggregator = [first, second].iter().collect();

        let record = aggregator.partition(Partition::Unknown).get("5551234").unwrap();
        assert_eq!(record.name, "Pizza Place");
        assert_eq!(record.phone_number, "555-1234");
        assert_eq!(record.count, 2);
    }

    fn arb_entry() -> impl Strategy<Value = ClassifiedEntry> {
        (
            prop_oneof![Just(Partition::Known), Just(Partition::Unknown)],
            prop::sample::select(vec!["100", "200", "300", "400"]),
            0u64..4_000,
            prop::option::of(0u8..24),
            prop_oneof![
                Just(CallType::Incoming),
                Just(CallType::Outgoing),
                Just(CallType::Missed),
                Just(CallType::Rejected),
            ],
        )
            .prop_map(|(partition, key, duration, hour, call_type)| {
                entry(partition, key, duration, hour, call_type)
            })
    }

    fn tallies(acc: &PartitionAccumulator) -> Vec<(String, u64, u64, u64, u64, u64)> {
        acc.records()
            .map(|r| (r.key.clone(), r.count, r.duration, r.missed, r.incoming, r.outgoing))
            .collect()
    }

    proptest! {
        #[test]
        fn prop_fold_order_does_not_change_totals(
            (entries, shuffled) in prop::collection::vec(arb_entry(), 0..60)
                .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
        ) {
            let a: Aggregator = entries.iter().collect();
            let b: Aggregator = shuffled.iter().collect();

            for partition in [Partition::Known, Partition::Unknown] {
                let (pa, pb) = (a.partition(partition), b.partition(partition));
                prop_assert_eq!(tallies(pa), tallies(pb));
                prop_assert_eq!(pa.hourly(), pb.hourly());
            }
        }
    }
}
