use std::time::Duration;

use anyhow::{Context, Result};
use deluxe_core::config::{ApiMode, DeliveryConfig};
use deluxe_core::delivery::{EntryCollection, PageQuery};
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that can answer a page query with a delivery result set.
pub trait EntrySource: Send + Sync {
    fn fetch_entries(&self, query: &PageQuery) -> Result<EntryCollection>;
}

pub struct CdnClient {
    agent: ureq::Agent,
    entries_url: String,
    token: String,
}

impl CdnClient {
    pub fn new(config: &DeliveryConfig, mode: ApiMode) -> Result<Self> {
        let token = config.token(mode)?;
        Ok(Self::with_endpoint(config.entries_url(mode), token))
    }

    pub fn with_endpoint(entries_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
            entries_url: entries_url.into(),
            token: token.into(),
        }
    }
}

impl EntrySource for CdnClient {
    fn fetch_entries(&self, query: &PageQuery) -> Result<EntryCollection> {
        let mut request = self
            .agent
            .get(&self.entries_url)
            .set("Authorization", &format!("Bearer {}", self.token));
        for (key, value) in query.to_params() {
            request = request.query(&key, &value);
        }
        debug!(url = %self.entries_url, slug = ?query.slug, "fetching entries");
        let body = request
            .call()
            .with_context(|| format!("request to {} failed", self.entries_url))?
            .into_string()
            .context("failed to read delivery response")?;
        EntryCollection::from_json(&body).context("failed to parse delivery response")
    }
}
