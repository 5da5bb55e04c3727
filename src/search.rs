//! Video search
//!
//! `VideoSearch` is the seam between the recommendation pipeline and the
//! YouTube Data API. Uses a long-lived reqwest::Client for connection pooling.

use crate::config::YouTubeConfig;
use crate::error::BotError;
use crate::models::Candidate;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};

const SEARCH_PATH: &str = "/youtube/v3/search";
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Trait for video search backends
#[async_trait]
pub trait VideoSearch: Send + Sync {
    /// Ordered candidates for `query`; an empty list is not an error
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<Candidate>>;
}

/// YouTube Data API v3 client (connection-pooled)
pub struct YouTubeSearchClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl YouTubeSearchClient {
    pub fn new(config: &YouTubeConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(config.timeout)
            .build()
            .map_err(|e| BotError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl VideoSearch for YouTubeSearchClient {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<Candidate>> {
        let url = format!("{}{}", self.base_url, SEARCH_PATH);
        let max_results = max_results.to_string();

        debug!(query = %query, "Calling YouTube search");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("maxResults", max_results.as_str()),
                ("type", "video"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("YouTube search request failed: {}", e);
                BotError::ExternalService(format!("YouTube request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = %status, "YouTube search error response: {}", error_text);
            return Err(BotError::ExternalService(format!(
                "YouTube API returned {}: {}",
                status, error_text
            )));
        }

        let body: SearchResponse = response.json().await.map_err(|e| {
            error!("Failed to parse YouTube response: {}", e);
            BotError::ExternalService(format!("YouTube parse error: {}", e))
        })?;

        Ok(body.into_candidates())
    }
}

/// Fixed results for development & testing
/// Keeps the pipeline functional without network access
pub struct StaticVideoSearch {
    outcome: std::result::Result<Vec<Candidate>, String>,
}

impl StaticVideoSearch {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            outcome: Ok(candidates),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Every search fails with an external service error
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
        }
    }
}

#[async_trait]
impl VideoSearch for StaticVideoSearch {
    async fn search(&self, _query: &str, max_results: u32) -> Result<Vec<Candidate>> {
        match &self.outcome {
            Ok(candidates) => Ok(candidates
                .iter()
                .take(max_results as usize)
                .cloned()
                .collect()),
            Err(message) => Err(BotError::ExternalService(message.clone())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: ItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
}

impl SearchResponse {
    /// Items without a video id (channels, playlists) are skipped
    fn into_candidates(self) -> Vec<Candidate> {
        self.items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                Some(Candidate::new(
                    item.snippet.title,
                    format!("{}{}", WATCH_URL, video_id),
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_response_parsing() {
        let json = r#"{
            "kind": "youtube#searchListResponse",
            "items": [
                {"id": {"kind": "youtube#video", "videoId": "abc123"}, "snippet": {"title": "Song A"}},
                {"id": {"kind": "youtube#channel", "channelId": "UCxyz"}, "snippet": {"title": "A Channel"}},
                {"id": {"kind": "youtube#video", "videoId": "def456"}, "snippet": {"title": "Song B"}}
            ]
        }"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();
        let candidates = response.into_candidates();

        assert_eq!(
            candidates,
            vec![
                Candidate::new("Song A", "https://www.youtube.com/watch?v=abc123"),
                Candidate::new("Song B", "https://www.youtube.com/watch?v=def456"),
            ]
        );
    }

    #[test]
    fn test_missing_items_is_empty() {
        let response: SearchResponse = serde_json::from_str(r#"{"kind": "x"}"#).unwrap();
        assert!(response.into_candidates().is_empty());
    }

    #[tokio::test]
    async fn test_static_search_respects_max_results() {
        let search = StaticVideoSearch::new(vec![
            Candidate::new("a", "http://x/a"),
            Candidate::new("b", "http://x/b"),
            Candidate::new("c", "http://x/c"),
        ]);

        let results = tokio_test::assert_ok!(search.search("q", 2).await);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "a");
    }

    #[tokio::test]
    async fn test_static_search_failure() {
        let search = StaticVideoSearch::failing("quota exceeded");
        let err = tokio_test::assert_err!(search.search("q", 5).await);
        assert!(err.is_external());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_external_error() {
        let mut config = YouTubeConfig::new("key");
        config.base_url = "http://127.0.0.1:9".to_string();
        config.timeout = Duration::from_secs(2);

        let client = YouTubeSearchClient::new(&config).unwrap();
        let err = client.search("人気の曲 曲", 5).await.unwrap_err();
        assert!(matches!(err, BotError::ExternalService(_)));
    }

    fn mock_config(server: &MockServer) -> YouTubeConfig {
        let mut config = YouTubeConfig::new("test-key");
        config.base_url = server.uri();
        config
    }

    #[tokio::test]
    async fn test_search_request_and_parsing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/search"))
            .and(query_param("part", "snippet"))
            .and(query_param("q", "リラックス 曲"))
            .and(query_param("maxResults", "5"))
            .and(query_param("type", "video"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "kind": "youtube#searchListResponse",
                "items": [
                    {"id": {"kind": "youtube#video", "videoId": "abc123"}, "snippet": {"title": "Song A"}},
                    {"id": {"kind": "youtube#playlist", "playlistId": "PL1"}, "snippet": {"title": "A List"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = YouTubeSearchClient::new(&mock_config(&server)).unwrap();
        let candidates = tokio_test::assert_ok!(client.search("リラックス 曲", 5).await);

        assert_eq!(
            candidates,
            vec![Candidate::new(
                "Song A",
                "https://www.youtube.com/watch?v=abc123"
            )]
        );
    }

    #[tokio::test]
    async fn test_error_status_is_external_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/search"))
            .respond_with(ResponseTemplate::new(403).set_body_string("quotaExceeded"))
            .expect(1)
            .mount(&server)
            .await;

        let client = YouTubeSearchClient::new(&mock_config(&server)).unwrap();
        let err = tokio_test::assert_err!(client.search("人気の曲 曲", 5).await);

        assert!(matches!(err, BotError::ExternalService(_)));
        let message = err.to_string();
        assert!(message.contains("403"));
        assert!(message.contains("quotaExceeded"));
    }

    #[tokio::test]
    async fn test_unparsable_body_is_external_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = YouTubeSearchClient::new(&mock_config(&server)).unwrap();
        let err = tokio_test::assert_err!(client.search("雨の日の曲 曲", 5).await);
        assert!(err.is_external());
    }
}
