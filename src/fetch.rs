use reqwest::blocking::Client;
use tracing::debug;

use crate::error::{Result, ScrapeError};

/// Source of raw page bytes. Any failure is `ScrapeError::Unavailable`.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Plain blocking HTTP. No retries and no caching.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> reqwest::Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(HttpFetcher { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let unavailable = |reason: String| ScrapeError::Unavailable {
            url: url.to_string(),
            reason,
        };

        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {}", status)));
        }

        let body = response.bytes().map_err(|e| unavailable(e.to_string()))?;
        debug!(bytes = body.len(), "Fetched {}", url);
        Ok(body.to_vec())
    }
}
