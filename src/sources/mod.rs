//! Collaborators that supply the raw collections for a load cycle.
//!
//! [`ContactSource`] and [`CallLogSource`] are the two inbound seams. A
//! failing contact source degrades to an empty contact index; a failing
//! call-log source aborts the load cycle.

mod file;
mod http;

pub use file::{FileCallLogSource, FileContactSource};
pub use http::HttpCallLogSource;

use async_trait::async_trait;

use crate::analyzers::types::RawCallEntry;
use crate::contacts::RawContact;
use crate::error::{Error, Result};

/// Supplies the device address book.
#[async_trait]
pub trait ContactSource: Send + Sync {
    async fn load_contacts(&self) -> Result<Vec<RawContact>>;
}

/// Supplies the device call history.
#[async_trait]
pub trait CallLogSource: Send + Sync {
    async fn load_calls(&self) -> Result<Vec<RawCallEntry>>;
}

/// In-memory collections, handy for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pub contacts: Vec<RawContact>,
    pub calls: Vec<RawCallEntry>,
}

impl StaticSource {
    pub fn new(contacts: Vec<RawContact>, calls: Vec<RawCallEntry>) -> Self {
        Self { contacts, calls }
    }
}

#[async_trait]
impl ContactSource for StaticSource {
    async fn load_contacts(&self) -> Result<Vec<RawContact>> {
        Ok(self.contacts.clone())
    }
}

#[async_trait]
impl CallLogSource for StaticSource {
    async fn load_calls(&self) -> Result<Vec<RawCallEntry>> {
        Ok(self.calls.clone())
    }
}

/// Call-log source for platforms that expose no call history.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedCallLog;

#[async_trait]
impl CallLogSource for UnsupportedCallLog {
    async fn load_calls(&self) -> Result<Vec<RawCallEntry>> {
        Err(Error::Unsupported {
            source_name: "call log".to_string(),
        })
    }
}
