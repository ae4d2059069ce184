// =============================================================================
// OpenAI Chat Completions Client — structured outputs
// =============================================================================
//
// SECURITY: The API key is sent only as a bearer header and never logged.
//
// Request shape:
//   messages        = [system: instructions, user: payload]
//   response_format = { type: "json_schema", json_schema: { name, strict, schema } }
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::config::SignalConfig;
use crate::contract::schema::SCHEMA_NAME;
use crate::contract::Contract;
use crate::reasoning::{Completion, InferenceError, ReasoningEngine, TokenUsage};

/// Longest slice of an error body kept in `InferenceError::Status`.
const MAX_ERROR_BODY: usize = 512;

/// OpenAI-compatible chat-completions client.
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    pub fn new(config: &SignalConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.inference_timeout())
            .build()
            .context("failed to build reqwest client")?;

        debug!(base_url = %config.base_url, model = %config.model, "OpenAiClient initialised");

        Ok(Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            timeout: config.inference_timeout(),
            client,
        })
    }

    // -------------------------------------------------------------------------
    // Request / response helpers
    // -------------------------------------------------------------------------

    /// JSON body for POST /chat/completions.
    pub fn request_body(&self, contract: &Contract) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": contract.instructions },
                { "role": "user", "content": contract.payload },
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": SCHEMA_NAME,
                    "strict": true,
                    "schema": contract.schema,
                },
            },
        })
    }

    fn map_transport(&self, e: reqwest::Error) -> InferenceError {
        if e.is_timeout() {
            InferenceError::Timeout(self.timeout)
        } else {
            InferenceError::Transport(e.to_string())
        }
    }
}

/// Pull the first choice's content (and usage) out of a completion body.
pub fn parse_completion(body: &Value) -> Result<Completion, InferenceError> {
    let message = body
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| InferenceError::MalformedEnvelope("no choices[0].message".to_string()))?;

    if let Some(refusal) = message.get("refusal").and_then(Value::as_str) {
        return Err(InferenceError::Refused(refusal.to_string()));
    }

    let content = message
        .get("content")
        .and_then(Value::as_str)
        .filter(|c| !c.trim().is_empty())
        .ok_or(InferenceError::EmptyResponse)?;

    let usage = body.get("usage").map(|u| {
        let field = |name: &str| u.get(name).and_then(Value::as_u64).unwrap_or(0);
        TokenUsage {
            prompt_tokens: field("prompt_tokens"),
            completion_tokens: field("completion_tokens"),
            total_tokens: field("total_tokens"),
        }
    });

    Ok(Completion {
        content: content.to_string(),
        usage,
    })
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY).collect()
}

#[async_trait]
impl ReasoningEngine for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    /// POST {base_url}/chat/completions.
    #[instrument(skip(self, contract), name = "openai::infer", fields(model = %self.model))]
    async fn infer(&self, contract: &Contract) -> Result<Completion, InferenceError> {
        let url = format!("{}/chat/completions", self.base_url);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(contract))
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| self.map_transport(e))?;

        if !status.is_success() {
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body: truncate(&text),
            });
        }

        let body: Value = serde_json::from_str(&text)
            .map_err(|e| InferenceError::MalformedEnvelope(e.to_string()))?;

        let completion = parse_completion(&body)?;
        debug!(bytes = completion.content.len(), "completion received");
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::schema::signal_schema;

    fn contract() -> Contract {
        Contract {
            instructions: "rules".to_string(),
            payload: "data".to_string(),
            schema: signal_schema(),
        }
    }

    fn client() -> OpenAiClient {
        let config = SignalConfig {
            api_key: "sk-test".to_string(),
            model: "gpt-test".to_string(),
            ..SignalConfig::default()
        };
        OpenAiClient::new(&config).unwrap()
    }

    #[test]
    fn request_body_uses_strict_json_schema() {
        let body = client().request_body(&contract());
        assert_eq!(body["model"], "gpt-test");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "rules");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "data");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], SCHEMA_NAME);
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
        assert_eq!(body["response_format"]["json_schema"]["schema"], signal_schema());
    }

    #[test]
    fn parses_content_and_usage() {
        let body = json!({
            "choices": [{ "message": { "role": "assistant", "content": "{\"a\":1}", "refusal": null } }],
            "usage": { "prompt_tokens": 900, "completion_tokens": 80, "total_tokens": 980 }
        });
        let c = parse_completion(&body).unwrap();
        assert_eq!(c.content, "{\"a\":1}");
        assert_eq!(
            c.usage,
            Some(TokenUsage {
                prompt_tokens: 900,
                completion_tokens: 80,
                total_tokens: 980
            })
        );
    }

    #[test]
    fn missing_usage_is_none() {
        let body = json!({ "choices": [{ "message": { "content": "{}" } }] });
        assert!(parse_completion(&body).unwrap().usage.is_none());
    }

    #[test]
    fn refusal_is_an_error() {
        let body = json!({ "choices": [{ "message": { "content": null, "refusal": "cannot help" } }] });
        assert!(matches!(
            parse_completion(&body),
            Err(InferenceError::Refused(r)) if r == "cannot help"
        ));
    }

    #[test]
    fn empty_content_is_an_error() {
        let body = json!({ "choices": [{ "message": { "content": "  " } }] });
        assert!(matches!(parse_completion(&body), Err(InferenceError::EmptyResponse)));
    }

    #[test]
    fn no_choices_is_malformed() {
        let body = json!({ "choices": [] });
        assert!(matches!(
            parse_completion(&body),
            Err(InferenceError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn error_bodies_are_truncated() {
        let long = "x".repeat(MAX_ERROR_BODY * 2);
        assert_eq!(truncate(&long).len(), MAX_ERROR_BODY);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_failure() {
        let config = SignalConfig {
            api_key: "sk-test".to_string(),
            base_url: "http://127.0.0.1:1".to_string(),
            ..SignalConfig::default()
        };
        let client = OpenAiClient::new(&config).unwrap();
        let err = client.infer(&contract()).await.unwrap_err();
        assert!(matches!(err, InferenceError::Transport(_)));
    }
}
