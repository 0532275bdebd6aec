use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::provider::{Suggestion, SuggestionResponse, SuggestionSource};

const SUGGESTIONS_PATH: &str = "/api/sugerencias/";

/// Suggestions served by the music library web app.
pub struct ServerSuggestions {
    base_url: String,
    http: reqwest::Client,
}

impl ServerSuggestions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn url_for(&self, query: &str) -> String {
        format!(
            "{}{}?q={}",
            self.base_url.trim_end_matches('/'),
            SUGGESTIONS_PATH,
            urlencoding::encode(query)
        )
    }
}

#[async_trait]
impl SuggestionSource for ServerSuggestions {
    async fn lookup(&self, query: &str) -> Result<Vec<Suggestion>> {
        let url = self.url_for(query);
        debug!("fetching suggestions from {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to send suggestion request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Suggestion request failed ({}): {}", status, error_text);
        }

        let body: SuggestionResponse = response
            .json()
            .await
            .context("Failed to parse suggestion response")?;

        Ok(body.results)
    }
}
