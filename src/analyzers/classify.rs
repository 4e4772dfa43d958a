use chrono::{DateTime, FixedOffset, Local, Offset, Timelike, Utc};
use tracing::debug;

use crate::analyzers::types::{ClassifiedEntry, Partition, RawCallEntry};
use crate::contacts::ContactIndex;
use crate::normalize::normalize_number;

/// Time zone in which call timestamps are bucketed by hour of day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HourZone {
    /// The host's local zone, DST included.
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl HourZone {
    pub fn utc() -> Self {
        HourZone::Fixed(Utc.fix())
    }

    /// Hour (0–23) of an epoch-millisecond timestamp, or `None` if it is
    /// outside chrono's representable range.
    pub fn hour_of(&self, timestamp_ms: i64) -> Option<u8> {
        let utc = DateTime::from_timestamp_millis(timestamp_ms)?;
        let hour = match self {
            HourZone::Local => utc.with_timezone(&Local).hour(),
            HourZone::Fixed(offset) => utc.with_timezone(offset).hour(),
        };
        u8::try_from(hour).ok()
    }
}

/// Resolves one call-log row against the contact index.
///
/// Missing or unusable fields fall back to defaults: duration 0, no hour
/// bucket, not missed. A row without a number gets an empty key and lands
/// in the unknown partition.
pub fn classify(entry: &RawCallEntry, contacts: &ContactIndex, zone: &HourZone) -> ClassifiedEntry {
    let phone_number = entry.phone_number.clone().unwrap_or_default();
    let key = normalize_number(&phone_number);

    let contact_name = if key.is_empty() {
        None
    } else {
        contacts.name_for(&key)
    };

    let partition = match contact_name {
        Some(_) => Partition::Known,
        None => Partition::Unknown,
    };

    let display_name = match (contact_name, entry.name.as_deref()) {
        (Some(name), _) => name.to_string(),
        (None, Some(hint)) if !hint.trim().is_empty() => hint.to_string(),
        _ => phone_number.clone(),
    };

    let duration = entry
        .duration
        .and_then(|d| u64::try_from(d).ok())
        .unwrap_or(0);

    let hour = entry.timestamp.and_then(|ts| zone.hour_of(ts));
    if hour.is_none() {
        debug!(
            number = %phone_number,
            timestamp = ?entry.timestamp,
            "No usable timestamp, skipping hour bucket"
        );
    }

    ClassifiedEntry {
        partition,
        key,
        display_name,
        phone_number,
        duration,
        hour,
        missed: entry.call_type.is_missed(),
        call_type: entry.call_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::CallType;
    use crate::contacts::RawContact;

    // 2024-01-15T14:30:00Z
    const AT_14_UTC: i64 = 1_705_329_000_000;

    fn index() -> ContactIndex {
        ContactIndex::build(&[RawContact::new("Alice", &["9876543210"])])
    }

    #[test]
    fn test_known_contact_takes_contact_name() {
        let entry = RawCallEntry::new("+91-98765-43210", 120, AT_14_UTC, CallType::Incoming)
            .with_name("Al (work)");

        let c = classify(&entry, &index(), &HourZone::utc());

        assert_eq!(c.partition, Partition::Known);
        assert_eq!(c.key, "9876543210");
        assert_eq!(c.display_name, "Alice");
        assert_eq!(c.phone_number, "+91-98765-43210");
        assert_eq!(c.duration, 120);
        assert_eq!(c.hour, Some(14));
        assert!(!c.missed);
    }

    #[test]
    fn test_unknown_uses_name_hint_then_number() {
        let hinted =
            RawCallEntry::new("5551234", 0, AT_14_UTC, CallType::Missed).with_name("Pizza");
        let bare = RawCallEntry::new("5551234", 0, AT_14_UTC, CallType::Missed).with_name("  ");

        let hinted = classify(&hinted, &index(), &HourZone::utc());
        let bare = classify(&bare, &index(), &HourZone::utc());

        assert_eq!(hinted.partition, Partition::Unknown);
        assert_eq!(hinted.display_name, "Pizza");
        assert_eq!(bare.display_name, "5551234");
        assert!(bare.missed);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let entry = RawCallEntry {
            phone_number: Some("5551234".to_string()),
            ..Default::default()
        };

        let c = classify(&entry, &index(), &HourZone::utc());

        assert_eq!(c.duration, 0);
        assert_eq!(c.hour, None);
        assert!(!c.missed);
        assert_eq!(c.call_type, CallType::Unknown);
    }

    #[test]
    fn test_negative_duration_and_out_of_range_timestamp() {
        let entry = RawCallEntry::new("5551234", -5, i64::MAX, CallType::Outgoing);

        let c = classify(&entry, &index(), &HourZone::utc());

        assert_eq!(c.duration, 0);
        assert_eq!(c.hour, None);
    }

    #[test]
    fn test_missing_number_is_unknown_with_empty_key() {
        let c = classify(&RawCallEntry::default(), &index(), &HourZone::utc());

        assert_eq!(c.partition, Partition::Unknown);
        assert_eq!(c.key, "");
        assert_eq!(c.display_name, "");
    }

    #[test]
    fn test_fixed_offset_shifts_hour() {
        let ist = HourZone::Fixed(FixedOffset::east_opt(5 * 3600 + 1800).unwrap());
        assert_eq!(ist.hour_of(AT_14_UTC), Some(20));

        let pst = HourZone::Fixed(FixedOffset::west_opt(8 * 3600).unwrap());
        assert_eq!(pst.hour_of(AT_14_UTC), Some(6));
    }

    #[test]
    fn test_local_zone_always_yields_valid_hour() {
        let hour = HourZone::Local.hour_of(AT_14_UTC).unwrap();
        assert!(hour < 24);
    }
}
