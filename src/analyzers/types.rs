//! Data types used by the analytics pipeline.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One row of the device call log, as exported.
///
/// Every field is optional on the wire. Values of the wrong shape are read
/// as absent rather than rejecting the row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawCallEntry {
    #[serde(
        default,
        alias = "phoneNumber",
        alias = "number",
        deserialize_with = "lenient_string"
    )]
    pub phone_number: Option<String>,
    /// Name the device attached to the call, often empty or the number itself.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    /// Seconds.
    #[serde(default, deserialize_with = "lenient_int")]
    pub duration: Option<i64>,
    /// Milliseconds since the Unix epoch.
    #[serde(default, deserialize_with = "lenient_int")]
    pub timestamp: Option<i64>,
    #[serde(default, rename = "type", alias = "call_type", alias = "callType")]
    pub call_type: CallType,
}

impl RawCallEntry {
    pub fn new(phone_number: &str, duration: i64, timestamp: i64, call_type: CallType) -> Self {
        Self {
            phone_number: Some(phone_number.to_string()),
            name: None,
            duration: Some(duration),
            timestamp: Some(timestamp),
            call_type,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => parse_int(&s),
        _ => None,
    })
}

fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
}

/// Kind of call reported by the device.
///
/// Only [`CallType::Missed`] changes how a call is counted; incoming and
/// outgoing feed the per-counterparty direction tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    Incoming,
    Outgoing,
    Missed,
    Rejected,
    Blocked,
    Voicemail,
    #[default]
    Unknown,
}

impl CallType {
    /// Maps the legacy numeric call-log codes.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => CallType::Incoming,
            2 => CallType::Outgoing,
            3 => CallType::Missed,
            4 => CallType::Voicemail,
            5 => CallType::Rejected,
            6 => CallType::Blocked,
            _ => CallType::Unknown,
        }
    }

    /// Maps a symbolic label (any case) or a numeric code written as text.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if let Ok(code) = label.parse::<i64>() {
            return Self::from_code(code);
        }
        match label.to_ascii_uppercase().as_str() {
            "INCOMING" => CallType::Incoming,
            "OUTGOING" => CallType::Outgoing,
            "MISSED" => CallType::Missed,
            "REJECTED" => CallType::Rejected,
            "BLOCKED" => CallType::Blocked,
            "VOICEMAIL" => CallType::Voicemail,
            _ => CallType::Unknown,
        }
    }

    pub fn is_missed(self) -> bool {
        self == CallType::Missed
    }
}

impl<'de> Deserialize<'de> for CallType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => CallType::from_label(&s),
            Value::Number(n) => n.as_i64().map(CallType::from_code).unwrap_or_default(),
            _ => CallType::Unknown,
        })
    }
}

/// Whether the counterparty matched a saved contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    Known,
    Unknown,
}

/// A call-log row after identity resolution, ready to be folded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEntry {
    pub partition: Partition,
    pub key: String,
    pub display_name: String,
    /// The number exactly as the call log reported it.
    pub phone_number: String,
    pub duration: u64,
    /// Local hour of day, `None` when the timestamp was unusable.
    pub hour: Option<u8>,
    pub missed: bool,
    pub call_type: CallType,
}

/// Running totals for one counterparty within a partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterpartyRecord {
    pub key: String,
    pub name: String,
    /// First number seen for this key, unnormalized.
    pub phone_number: String,
    pub count: u64,
    pub duration: u64,
    pub missed: u64,
    pub incoming: u64,
    pub outgoing: u64,
    pub is_known: bool,
}

impl CounterpartyRecord {
    /// Zeroed record taking its identity from the first entry seen for the key.
    pub fn from_first_entry(entry: &ClassifiedEntry) -> Self {
        Self {
            key: entry.key.clone(),
            name: entry.display_name.clone(),
            phone_number: entry.phone_number.clone(),
            count: 0,
            duration: 0,
            missed: 0,
            incoming: 0,
            outgoing: 0,
            is_known: entry.partition == Partition::Known,
        }
    }

    /// Stand-in for the top record of an empty partition.
    pub fn placeholder() -> Self {
        Self {
            key: String::new(),
            name: "N/A".to_string(),
            phone_number: String::new(),
            count: 0,
            duration: 0,
            missed: 0,
            incoming: 0,
            outgoing: 0,
            is_known: false,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.key.is_empty() && self.count == 0 && self.name == "N/A"
    }

    /// Tallies saturate rather than overflow on absurd durations.
    pub(crate) fn record(&mut self, entry: &ClassifiedEntry) {
        self.count = self.count.saturating_add(1);
        self.duration = self.duration.saturating_add(entry.duration);
        if entry.missed {
            self.missed = self.missed.saturating_add(1);
        }
        match entry.call_type {
            CallType::Incoming => self.incoming = self.incoming.saturating_add(1),
            CallType::Outgoing => self.outgoing = self.outgoing.saturating_add(1),
            _ => {}
        }
    }
}
