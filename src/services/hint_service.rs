//! Client for the external hint ("whisp") generation service.
//!
//! Hint generation is strictly best-effort: any failure is logged and the
//! turn falls back to a deterministic default hint, so a flaky or
//! unconfigured AI endpoint never blocks gameplay.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::AppConfig;

/// HTTP client wrapper for the hint generation endpoint.
pub struct HintClient {
    http: reqwest::Client,
    endpoint: Option<String>,
}

#[derive(Serialize)]
struct HintRequest<'a> {
    theme: &'a str,
    element: &'a str,
}

#[derive(Deserialize)]
struct HintResponse {
    hint: String,
}

impl HintClient {
    /// Build the client from the application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.hint_timeout())
            .build()
            .unwrap_or_default();

        Self {
            http,
            endpoint: config.hint_endpoint().map(str::to_owned),
        }
    }

    /// Generate a hint for the given prompt, falling back to a default cue
    /// when the endpoint is unconfigured, unreachable, or returns garbage.
    pub async fn generate(&self, theme: &str, element: &str) -> String {
        let Some(endpoint) = self.endpoint.as_deref() else {
            return default_hint(theme);
        };

        match self.request_hint(endpoint, theme, element).await {
            Ok(hint) if !hint.trim().is_empty() => hint,
            Ok(_) => {
                warn!(theme, "hint service returned an empty hint; using default");
                default_hint(theme)
            }
            Err(err) => {
                warn!(theme, error = %err, "hint generation failed; using default");
                default_hint(theme)
            }
        }
    }

    async fn request_hint(
        &self,
        endpoint: &str,
        theme: &str,
        element: &str,
    ) -> Result<String, reqwest::Error> {
        let response = self
            .http
            .post(endpoint)
            .json(&HintRequest { theme, element })
            .send()
            .await?
            .error_for_status()?;

        let body: HintResponse = response.json().await?;
        Ok(body.hint)
    }
}

fn default_hint(theme: &str) -> String {
    format!("Something to do with {theme}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_endpoint_falls_back_to_default() {
        let client = HintClient::from_config(&AppConfig::default());
        let hint = client.generate("ghost stories", "haunted mill").await;
        assert_eq!(hint, "Something to do with ghost stories...");
    }
}
