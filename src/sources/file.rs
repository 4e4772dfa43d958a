use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{CallLogSource, ContactSource};
use crate::analyzers::types::RawCallEntry;
use crate::contacts::RawContact;
use crate::error::{Error, Result};
use crate::parser::{parse_call_log, parse_contacts};

/// Reads an address-book export from disk.
#[derive(Debug, Clone)]
pub struct FileContactSource {
    path: PathBuf,
}

impl FileContactSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Reads a call-log export from disk.
#[derive(Debug, Clone)]
pub struct FileCallLogSource {
    path: PathBuf,
}

impl FileCallLogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// A file that cannot be opened at all makes the whole source unavailable.
async fn read_export(path: &Path, source_name: &str) -> Result<Vec<u8>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::unavailable(source_name, format!("{}: {e}", path.display())))?;
    debug!(path = %path.display(), bytes = bytes.len(), "Read export file");
    Ok(bytes)
}

#[async_trait]
impl ContactSource for FileContactSource {
    async fn load_contacts(&self) -> Result<Vec<RawContact>> {
        let bytes = read_export(&self.path, "contacts").await?;
        parse_contacts(&bytes)
    }
}

#[async_trait]
impl CallLogSource for FileCallLogSource {
    async fn load_calls(&self) -> Result<Vec<RawCallEntry>> {
        let bytes = read_export(&self.path, "call log").await?;
        parse_call_log(&bytes)
    }
}
