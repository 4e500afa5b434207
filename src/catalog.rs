use tracing::debug;

use crate::{
    error::{SyncError, SyncResult},
    models::ShowRecord,
};

/// Path of the show listing, relative to the catalog base address.
pub const SHOWS_PATH: &str = "shows";

/// Fetches the show listing from the external catalog. One GET per call; no
/// retry, pagination or caching.
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(client: reqwest::Client, base_url: String) -> SyncResult<Self> {
        if base_url.trim().is_empty() {
            return Err(SyncError::Configuration(
                "catalog base address is missing or blank".to_string(),
            ));
        }
        Ok(Self { client, base_url })
    }

    pub fn shows_url(&self) -> String {
        format!("{}/{}", self.base_url.trim().trim_end_matches('/'), SHOWS_PATH)
    }

    pub async fn fetch_shows(&self) -> SyncResult<Vec<ShowRecord>> {
        let url = self.shows_url();
        debug!(url = %url, "fetching catalog shows");

        let resp = self.client.get(&url).send().await.map_err(SyncError::Network)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SyncError::Remote(status));
        }

        let body = resp.bytes().await.map_err(SyncError::Network)?;
        let records: Vec<ShowRecord> = serde_json::from_slice(&body)?;

        debug!(records = records.len(), "decoded catalog shows");
        Ok(records)
    }
}
