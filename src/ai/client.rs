use reqwest::Client;
use serde_json::{json, Value};

use crate::{
    config::{ClassifierConfig, ParseStrategy},
    domain::DetectError,
};

use super::inference::{build_request, system_prompt, user_prompt};

#[derive(Clone)]
pub struct ClassifierClient {
    http: Client,
    config: ClassifierConfig,
}

impl ClassifierClient {
    pub fn new(http: Client, config: ClassifierConfig) -> Self {
        Self { http, config }
    }

    pub fn default_model(&self) -> &str {
        &self.config.model
    }

    /// Sends one classification request and returns the provider's raw JSON.
    ///
    /// A body that is not JSON comes back as `{"raw": <text>}` so the caller
    /// can decide how strict to be about it.
    pub async fn classify(
        &self,
        text: &str,
        domain: Option<&str>,
        model: Option<&str>,
        strategy: ParseStrategy,
    ) -> Result<Value, DetectError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(DetectError::ConfigurationMissing)?;

        let model = model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(self.config.model.as_str())
            .to_string();
        let request = build_request(
            self.config.flavor,
            model,
            self.config.max_tokens,
            system_prompt(strategy),
            user_prompt(text, domain),
        );

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .timeout(self.config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(target: "classifier", error = %err, timeout = err.is_timeout(), "classifier request failed");
                err
            })?
            .error_for_status()
            .map_err(|err| {
                tracing::warn!(target: "classifier", status = ?err.status(), "classifier returned error status");
                err
            })?;

        let body = response.text().await?;
        match serde_json::from_str::<Value>(&body) {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::warn!(
                    target: "classifier",
                    error = %err,
                    bytes = body.len(),
                    "classifier body is not json"
                );
                Ok(json!({ "raw": body }))
            }
        }
    }
}
