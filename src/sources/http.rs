use async_trait::async_trait;

use super::CallLogSource;
use crate::analyzers::types::RawCallEntry;
use crate::error::{Error, Result};
use crate::fetch::{HttpClient, fetch_bytes};
use crate::parser::parse_call_log;

/// Fetches a call-log export from a URL.
pub struct HttpCallLogSource<C> {
    client: C,
    url: String,
}

impl<C: HttpClient> HttpCallLogSource<C> {
    pub fn new(client: C, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl<C: HttpClient> CallLogSource for HttpCallLogSource<C> {
    #[tracing::instrument(skip(self), fields(url = %self.url))]
    async fn load_calls(&self) -> Result<Vec<RawCallEntry>> {
        let bytes = fetch_bytes(&self.client, &self.url)
            .await
            .map_err(|e| Error::unavailable("call log", e))?;
        parse_call_log(&bytes)
    }
}
