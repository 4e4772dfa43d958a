//! Contact records and the normalized-number lookup built from them.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::normalize::normalize_number;

/// A contact as exported by the device address book.
///
/// Read leniently: a null or non-text name becomes empty, and phone number
/// elements that cannot be read are dropped one by one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawContact {
    #[serde(default, deserialize_with = "deserialize_name")]
    pub name: String,
    #[serde(
        default,
        alias = "phoneNumbers",
        alias = "numbers",
        deserialize_with = "deserialize_numbers"
    )]
    pub phone_numbers: Vec<String>,
}

impl RawContact {
    pub fn new(name: impl Into<String>, phone_numbers: &[&str]) -> Self {
        Self {
            name: name.into(),
            phone_numbers: phone_numbers.iter().map(|n| n.to_string()).collect(),
        }
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn deserialize_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text(&Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Address-book exports list numbers either as bare strings or as labeled
/// objects (`{"label": "mobile", "number": "..."}`).
fn phone_entry(value: &Value) -> Option<String> {
    match value {
        Value::Object(fields) => fields.get("number").and_then(text),
        other => text(other),
    }
}

fn deserialize_numbers<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(entries) => {
            let total = entries.len();
            let numbers: Vec<String> = entries.iter().filter_map(phone_entry).collect();
            if numbers.len() < total {
                debug!(total, kept = numbers.len(), "Dropped unreadable phone numbers");
            }
            numbers
        }
        single => phone_entry(&single).into_iter().collect(),
    })
}

/// Normalized phone number → contact display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactIndex {
    names: HashMap<String, String>,
}

impl ContactIndex {
    /// Indexes every number of every contact.
    ///
    /// A number shared by several contacts maps to the last one in input
    /// order. Numbers that normalize to an empty key identify nobody and
    /// are left out.
    pub fn build(contacts: &[RawContact]) -> Self {
        let mut names = HashMap::new();

        for contact in contacts {
            for number in &contact.phone_numbers {
                let key = normalize_number(number);
                if key.is_empty() {
                    continue;
                }
                if let Some(previous) = names.insert(key, contact.name.clone()) {
                    if previous != contact.name {
                        debug!(
                            number = %number,
                            previous = %previous,
                            name = %contact.name,
                            "Number shared by several contacts, keeping the later one"
                        );
                    }
                }
            }
        }

        Self { names }
    }

    pub fn name_for(&self, key: &str) -> Option<&str> {
        self.names.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.names.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
