use crate::acquisition::{Granule, GranuleCatalog, GranuleQuery};
use crate::error::{ProcessingError, Result};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const CMR_SEARCH_URL: &str = "https://cmr.earthdata.nasa.gov/search/granules.json";
pub const TOKEN_ENV_VAR: &str = "EARTHDATA_TOKEN";
const DATA_LINK_REL_SUFFIX: &str = "/data#";
const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct CmrResponse {
    feed: CmrFeed,
}

#[derive(Debug, Deserialize)]
struct CmrFeed {
    #[serde(default)]
    entry: Vec<CmrEntry>,
}

#[derive(Debug, Deserialize)]
struct CmrEntry {
    id: String,
    #[serde(default)]
    links: Vec<CmrLink>,
}

#[derive(Debug, Deserialize)]
struct CmrLink {
    #[serde(default)]
    rel: String,
    href: String,
}

/// Granules with a data link, in catalog order. Entries without one are skipped.
fn granules_from_response(body: &str) -> Result<Vec<Granule>> {
    let response: CmrResponse = serde_json::from_str(body)?;
    Ok(response
        .feed
        .entry
        .into_iter()
        .filter_map(|entry| {
            entry
                .links
                .into_iter()
                .find(|link| link.rel.ends_with(DATA_LINK_REL_SUFFIX))
                .map(|link| Granule::new(entry.id, link.href))
        })
        .collect())
}

/// NASA Common Metadata Repository granule search with Earthdata downloads.
pub struct CmrCatalog {
    client: Client,
    search_url: String,
    token: Option<String>,
    page_size: usize,
}

impl CmrCatalog {
    /// Uses the bearer token in `EARTHDATA_TOKEN` when set.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            search_url: CMR_SEARCH_URL.to_string(),
            token: std::env::var(TOKEN_ENV_VAR).ok().filter(|t| !t.is_empty()),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn with_search_url(mut self, search_url: &str) -> Self {
        self.search_url = search_url.to_string();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn search_url(&self, query: &GranuleQuery) -> Result<Url> {
        let temporal = format!("{}T00:00:00Z,{}T23:59:59Z", query.date, query.date);
        let page_size = self.page_size.to_string();
        Url::parse_with_params(
            &self.search_url,
            [
                ("short_name", query.short_name.as_str()),
                ("temporal", temporal.as_str()),
                ("bounding_box", "-180,-90,180,90"),
                ("page_size", page_size.as_str()),
            ],
        )
        .map_err(|e| ProcessingError::Config(format!("invalid search URL {}: {}", self.search_url, e)))
    }
}

impl Default for CmrCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl GranuleCatalog for CmrCatalog {
    async fn search(&self, query: &GranuleQuery) -> Result<Vec<Granule>> {
        let url = self.search_url(query)?;
        tracing::debug!("Searching {}", url);

        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let granules = granules_from_response(&body)?;
        tracing::info!("Found {} granules for {}", granules.len(), query.date);
        Ok(granules)
    }

    async fn download(&self, granule: &Granule, dest_dir: &Path) -> Result<PathBuf> {
        let mut request = self.client.get(&granule.url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let mut response = request.send().await?.error_for_status()?;

        // Partial downloads stay in the temporary file and are discarded on error.
        let mut temp = NamedTempFile::new_in(dest_dir)?;
        while let Some(chunk) = response.chunk().await? {
            temp.write_all(&chunk)?;
        }
        temp.flush()?;

        let target = dest_dir.join(granule.file_name());
        temp.persist(&target).map_err(|e| ProcessingError::Io(e.error))?;
        Ok(target)
    }
}
