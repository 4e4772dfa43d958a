//! HTTP retrieval of remote exports.
//!
//! Sources talk to the network through [`HttpClient`] so they can be driven
//! by canned responses in tests.

use async_trait::async_trait;
use reqwest::{Request, Response, Url};
use tracing::debug;

use crate::error::{Error, Result};

/// Label used for failures before any request is sent.
const REMOTE_EXPORT: &str = "remote export";

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

/// Plain `reqwest::Client` with gzip transfer decoding.
#[derive(Debug, Clone, Default)]
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> Self {
        Self(reqwest::Client::new())
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        self.0.execute(req).await
    }
}

/// True for `http://` and `https://` URLs; anything else is treated as a path.
pub fn is_remote(location: &str) -> bool {
    Url::parse(location).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// GETs `url` through `client` and returns the body.
///
/// Non-success statuses are errors.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Vec<u8>> {
    let parsed =
        Url::parse(url).map_err(|e| Error::unavailable(REMOTE_EXPORT, format!("{url}: {e}")))?;
    let req = Request::new(reqwest::Method::GET, parsed);

    let resp = client.execute(req).await?.error_for_status()?;
    let bytes = resp.bytes().await?;
    debug!(url, bytes = bytes.len(), "Fetched remote export");
    Ok(bytes.to_vec())
}
