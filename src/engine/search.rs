// Brio Assistant Engine — Search Backends
// Abstract web-search capability consumed by the web_search tool. The
// primary/secondary fallback ordering lives in the tool executor, not here:
// a backend only knows how to answer one query.

use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{SearchResponse, SearchResult};
use async_trait::async_trait;
use log::info;
use std::time::Duration;

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Backend name, used in logs and diagnostics.
    fn name(&self) -> &str;

    async fn search(&self, query: &str) -> EngineResult<SearchResponse>;
}

// ── SearxNG-style JSON metasearch backend ───────────────────────────────

/// Queries a SearxNG-compatible instance (`GET /search?q=…&format=json`).
pub struct SearxBackend {
    name: String,
    base_url: String,
    client: reqwest::Client,
}

impl SearxBackend {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        SearxBackend {
            name: name.into(),
            base_url: base_url.into(),
            client: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(5))
                .timeout(Duration::from_secs(15))
                .user_agent("brio-engine/0.1")
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl SearchBackend for SearxBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query: &str) -> EngineResult<SearchResponse> {
        let url = format!(
            "{}/search?q={}&format=json",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(query)
        );
        info!("[search] {} query: '{}'", self.name, query);

        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(EngineError::Other(format!(
                "{} returned HTTP {}",
                self.name,
                resp.status().as_u16()
            )));
        }

        let body: serde_json::Value = resp.json().await?;

        let answer = body["answers"]
            .as_array()
            .and_then(|a| a.first())
            .and_then(|v| {
                // SearxNG emits either plain strings or {answer: …} objects
                v.as_str()
                    .map(str::to_string)
                    .or_else(|| v["answer"].as_str().map(str::to_string))
            });

        let results = body["results"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        let title = item["title"].as_str()?.to_string();
                        let url = item["url"].as_str().unwrap_or_default().to_string();
                        let snippet = item["content"].as_str().unwrap_or_default().to_string();
                        Some(SearchResult { title, url, snippet })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(SearchResponse { answer, results })
    }
}
