//! YouTube Data API search client

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use super::content::{Track, SEARCH_PAGE_SIZE};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("search API returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("unexpected search response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Anything that can turn a free-form query into tracks
#[async_trait]
pub trait VideoSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Track>, SearchError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: ItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct ItemId {
    #[serde(rename = "videoId")]
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    default: Thumbnail,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

/// Map a raw search response body into tracks
pub fn parse_search_response(body: &str) -> Result<Vec<Track>, serde_json::Error> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .items
        .into_iter()
        .take(SEARCH_PAGE_SIZE)
        .map(|item| Track {
            id: item.id.video_id,
            title: decode_html_entities(&item.snippet.title),
            thumbnail_url: item.snippet.thumbnails.default.url,
        })
        .collect())
}

/// Titles come back HTML-escaped
fn decode_html_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[derive(Clone)]
pub struct YoutubeClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl YoutubeClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl VideoSearch for YoutubeClient {
    async fn search(&self, query: &str) -> Result<Vec<Track>, SearchError> {
        tracing::debug!(query, "Search request started");
        let url = format!("{}/search", self.endpoint.trim_end_matches('/'));
        let max_results = SEARCH_PAGE_SIZE.to_string();

        let response = self
            .http
            .get(url)
            .query(&[
                ("part", "snippet"),
                ("maxResults", max_results.as_str()),
                ("q", query),
                ("type", "video"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status));
        }

        let body = response.text().await?;
        let tracks = parse_search_response(&body)?;
        tracing::info!(query, results = tracks.len(), "Search request successful");
        Ok(tracks)
    }
}
