//! HTTP client for the reading service REST API.
//!
//! This module provides the `ApiClient` struct implementing
//! `ContentGateway` over the hosted backend: catalog and progress
//! fetches, completion recording, and paginated verse retrieval.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{Chapter, ProgressSummary, Verse};

use super::{ContentGateway, GatewayError};

// ============================================================================
// Constants
// ============================================================================

/// Default base URL for the content API.
/// Overridable through config for staging environments.
const API_BASE_URL: &str = "https://api.gitadaily.app/v1";

/// HTTP request timeout in seconds.
/// 30s allows for slow mobile networks while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
/// 3 retries with exponential backoff usually succeeds without excessive delay.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
/// 1 second is polite to the server while not making users wait too long.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Page size for verse listing requests.
/// The longest chapter has 78 verses, so most chapters fit in two pages.
const VERSES_PAGE_SIZE: i32 = 50;

/// API client for the reading service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against the default base URL
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            token: None,
        })
    }

    /// Override the base URL (trailing slashes are trimmed)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    /// This is more efficient than creating a new client for each request.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(), // Cheap clone, shares connection pool
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            // Rate limited - signal to retry
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(GatewayError::from_status(status, &body).into())
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(GatewayError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(url)
                .headers(self.auth_headers()?)
                .send()
                .await
                .with_context(|| format!("Failed to send GET request to {}", url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response
                        .json()
                        .await
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    // Rate limited
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(GatewayError::RateLimited.into());
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn post<B: Serialize>(&self, url: &str, body: &B) -> Result<reqwest::Response> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .post(url)
                .headers(self.auth_headers()?)
                .json(body)
                .send()
                .await
                .with_context(|| format!("Failed to send POST request to {}", url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response),
                None => {
                    // Rate limited
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(GatewayError::RateLimited.into());
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }
}

#[async_trait]
impl ContentGateway for ApiClient {
    /// Fetch the chapter catalog annotated with the user's completed counts
    async fn fetch_catalog_with_progress(&self) -> Result<Vec<Chapter>> {
        let url = format!("{}/catalog?includeProgress=true", self.base_url);

        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .context("Failed to fetch catalog")?;

        let response = Self::check_response(response).await?;

        let text = response.text().await.context("Failed to read catalog response body")?;
        debug!("Catalog response received");

        // Try to parse as array directly first, then as wrapped object
        if let Ok(chapters) = serde_json::from_str::<Vec<Chapter>>(&text) {
            return Ok(chapters);
        }

        let wrapper: CatalogResponse = serde_json::from_str(&text)
            .context("Failed to parse catalog response")?;
        Ok(wrapper.chapters)
    }

    async fn fetch_user_progress(&self) -> Result<ProgressSummary> {
        let url = format!("{}/users/me/progress", self.base_url);
        self.get(&url).await
    }

    async fn record_completion(&self, verse_id: &str, time_spent_seconds: i64) -> Result<()> {
        let url = format!("{}/users/me/completions", self.base_url);
        let body = serde_json::json!({
            "verseId": verse_id,
            "timeSpentSeconds": time_spent_seconds,
        });

        let response = self.post(&url, &body).await?;
        debug!(verse_id, status = %response.status(), "Completion recorded");
        Ok(())
    }

    /// Fetch all verses of a chapter, walking the paginated endpoint
    async fn fetch_verses(&self, chapter_number: i32) -> Result<Vec<Verse>> {
        let mut verses: Vec<Verse> = Vec::new();
        let mut page = 1;

        loop {
            let url = format!(
                "{}/chapters/{}/verses?page={}&pageSize={}",
                self.base_url, chapter_number, page, VERSES_PAGE_SIZE
            );
            let response: VersesResponse = self.get(&url).await?;

            let fetched = response.verses.len();
            verses.extend(response.verses);

            let total = response.total_count.unwrap_or(verses.len() as i32);
            debug!(chapter = chapter_number, page, fetched, total, "Verses page received");

            // An empty page means the server disagrees with its own total
            if fetched == 0 || verses.len() as i32 >= total {
                break;
            }
            page += 1;
        }

        Ok(verses)
    }
}

// Internal API response types for parsing

#[derive(Debug, Clone, Deserialize)]
struct CatalogResponse {
    #[serde(default, alias = "data")]
    chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, Deserialize)]
struct VersesResponse {
    #[serde(default)]
    verses: Vec<Verse>,
    #[serde(rename = "totalCount")]
    total_count: Option<i32>,
}
