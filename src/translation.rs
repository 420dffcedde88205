use crate::config::Config;
use crate::i18n::Language;
use crate::metrics::TranslationMetrics;
use crate::retry::{with_retry_if, RetryConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

/// Outcome of one translation attempt.
///
/// The gateway never propagates an error to its caller: an empty `text`
/// together with `error: Some(_)` means "translation unavailable", which is
/// distinct from a deliberately empty result (`error: None`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    pub error: Option<String>,
}

impl Translation {
    /// A successful (or short-circuited) result.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error: None,
        }
    }

    /// A degraded result: translation unavailable.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            error: Some(reason.into()),
        }
    }

    /// Whether this outcome carries no usable translation.
    pub fn is_unavailable(&self) -> bool {
        self.error.is_some()
    }
}

/// Text translation seam.
///
/// Implemented over HTTP in production and by scripted fakes in tests, so
/// the composer and disambiguator can be exercised without a network.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: Language, target: Language) -> Translation;
}

/// MyMemory response envelope.
///
/// Application-level failures arrive as a 200 with a non-200
/// `responseStatus` embedded in the body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    response_status: i64,
    #[serde(default)]
    response_details: Option<String>,
    #[serde(default)]
    response_data: Option<ResponseData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    #[serde(default)]
    translated_text: Option<String>,
}

/// Translation gateway over the MyMemory HTTP API.
pub struct MyMemoryTranslator {
    client: reqwest::Client,
    api_url: String,
    retry: RetryConfig,
}

impl MyMemoryTranslator {
    /// Build a gateway from configuration, with its own HTTP client.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()
            .context("Failed to build HTTP client for translation gateway")?;

        Ok(Self::with_client(client, config.translation_api_url.clone()))
    }

    /// Build a gateway around an existing client (shared connection pool).
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            retry: RetryConfig::translation(),
        }
    }

    /// Override the retry policy.
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// One request to the translation engine.
    ///
    /// Errors here are internal; the public `translate` maps them to a
    /// degraded [`Translation`] after the retry policy is exhausted.
    async fn fetch(&self, text: &str, source: Language, target: Language) -> Result<String> {
        TranslationMetrics::global().record_request();

        let langpair = format!("{}|{}", source.code(), target.code());
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("q", text), ("langpair", langpair.as_str())])
            .send()
            .await
            .context("Failed to send request to translation engine")?;

        if !response.status().is_success() {
            let status = response.status();
            anyhow::bail!("Translation engine error ({})", status);
        }

        let body: ApiResponse = response
            .json()
            .await
            .context("Failed to parse translation engine response")?;

        if body.response_status != 200 {
            anyhow::bail!(
                "Translation engine error ({}): {}",
                body.response_status,
                body.response_details.unwrap_or_default()
            );
        }

        Ok(body
            .response_data
            .and_then(|d| d.translated_text)
            .unwrap_or_default())
    }
}

#[async_trait]
impl Translator for MyMemoryTranslator {
    async fn translate(&self, text: &str, source: Language, target: Language) -> Translation {
        // Don't translate empty text
        if text.trim().is_empty() {
            TranslationMetrics::global().record_short_circuit();
            return Translation::ok("");
        }

        // Don't translate if same language. Beyond saving a round trip, the
        // engine tends to echo or garble same-language input.
        if source.code() == target.code() {
            TranslationMetrics::global().record_short_circuit();
            debug!("Skipping same-language translation ({})", source.code());
            return Translation::ok(text);
        }

        let result = with_retry_if(
            &self.retry,
            &format!("Translation {}->{}", source.code(), target.code()),
            || self.fetch(text, source, target),
            is_retryable_error,
        )
        .await;

        match result {
            Ok(translated) => Translation::ok(translated),
            Err(e) => {
                TranslationMetrics::global().record_failure();
                warn!(
                    "Translation {}->{} unavailable: {}",
                    source.code(),
                    target.code(),
                    e
                );
                Translation::unavailable(e.to_string())
            }
        }
    }
}

/// Determine if an error is retryable (5xx errors, 429 rate limit, network errors).
/// Other 4xx client errors and embedded application errors should not be retried.
fn is_retryable_error(error: &anyhow::Error) -> bool {
    let error_str = error.to_string();

    // Check if it's an engine error with a status code
    // Error format: "Translation engine error (503 Service Unavailable)"
    if error_str.contains("Translation engine error") {
        if let Some(start) = error_str.find('(') {
            if let Some(end) = error_str[start..].find(')') {
                let status_str = &error_str[start + 1..start + end];
                let status_num = status_str.split_whitespace().next().unwrap_or("");
                if let Ok(status) = status_num.parse::<u16>() {
                    return status == 429 || status >= 500;
                }
            }
        }
    }

    // Retry network errors, timeouts, and other transient failures
    true
}
