//! OpenAI-compatible chat completions adapter
//!
//! Serves OpenAI itself and DeepSeek, which speaks the same protocol but
//! only supports free-form JSON mode: for DeepSeek the schema travels in
//! the system prompt instead of `response_format`.

use super::ProviderEndpoint;
use super::error::{ProviderError, parse_model_json};
use async_trait::async_trait;
use debate_application::{ProviderClient, ProviderOutcome, ProviderRequest};
use serde_json::{Value, json};
use tracing::debug;

/// How the adapter asks for structured output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonMode {
    /// `response_format: json_schema`
    Schema,
    /// `response_format: json_object` plus the schema inlined in the prompt
    Object,
}

pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    mode: JsonMode,
}

impl OpenAiCompatibleClient {
    pub fn new(http: reqwest::Client, endpoint: &ProviderEndpoint, api_key: String, mode: JsonMode) -> Self {
        Self {
            http,
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            api_key,
            mode,
        }
    }

    async fn send(&self, request: &ProviderRequest) -> Result<Value, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %request.model, schema = request.schema_name, "POST {}", url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&build_body(request, self.mode))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        parse_response(&body)
    }
}

#[async_trait]
impl ProviderClient for OpenAiCompatibleClient {
    async fn submit(&self, request: &ProviderRequest) -> ProviderOutcome {
        match self.send(request).await {
            Ok(value) => ProviderOutcome::Ok(value),
            Err(e) => e.into_outcome(),
        }
    }
}

pub(crate) fn build_body(request: &ProviderRequest, mode: JsonMode) -> Value {
    let (system, response_format) = match mode {
        JsonMode::Schema => (
            request.system_prompt.clone(),
            json!({
                "type": "json_schema",
                "json_schema": {
                    "name": request.schema_name,
                    "schema": request.schema,
                    "strict": false,
                }
            }),
        ),
        JsonMode::Object => (
            format!(
                "{}\n\nRespond with a single JSON object matching this schema:\n{}",
                request.system_prompt, request.schema
            ),
            json!({ "type": "json_object" }),
        ),
    };

    let mut body = json!({
        "model": request.model,
        "messages": [
            { "role": "system", "content": system },
            { "role": "user", "content": request.user_prompt },
        ],
        "response_format": response_format,
    });
    if let Some(temperature) = request.temperature {
        body["temperature"] = json!(temperature);
    }
    if let Some(top_p) = request.top_p {
        body["top_p"] = json!(top_p);
    }
    body
}

pub(crate) fn parse_response(body: &Value) -> Result<Value, ProviderError> {
    let message = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| ProviderError::MalformedResponse("response has no choices".into()))?;

    if let Some(refusal) = message.get("refusal").and_then(Value::as_str) {
        return Err(ProviderError::Refusal(refusal.to_string()));
    }

    let content = message
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| ProviderError::MalformedResponse("message has no content".into()))?;
    parse_model_json(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ProviderRequest {
        ProviderRequest {
            model: "gpt-5".into(),
            system_prompt: "You are a solver.".into(),
            user_prompt: "What is 6 * 7?".into(),
            schema_name: "solution",
            schema: json!({"type": "object", "properties": {"answer": {"type": "string"}}}),
            temperature: Some(0.2),
            top_p: None,
        }
    }

    #[test]
    fn test_schema_mode_body() {
        let body = build_body(&request(), JsonMode::Schema);
        assert_eq!(body["model"], "gpt-5");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "solution");
        assert_eq!(body["messages"][0]["content"], "You are a solver.");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["temperature"], 0.2);
        assert!(body.get("top_p").is_none());
    }

    #[test]
    fn test_object_mode_inlines_schema() {
        let body = build_body(&request(), JsonMode::Object);
        assert_eq!(body["response_format"]["type"], "json_object");
        let system = body["messages"][0]["content"].as_str().unwrap();
        assert!(system.starts_with("You are a solver."));
        assert!(system.contains("\"answer\""));
    }

    #[test]
    fn test_parse_response_content() {
        let body = json!({
            "choices": [{ "message": { "role": "assistant", "content": "{\"answer\": \"42\"}" } }]
        });
        assert_eq!(parse_response(&body).unwrap()["answer"], "42");
    }

    #[test]
    fn test_parse_response_errors() {
        assert!(matches!(
            parse_response(&json!({ "choices": [] })),
            Err(ProviderError::MalformedResponse(_))
        ));
        let refused = json!({
            "choices": [{ "message": { "content": null, "refusal": "cannot help" } }]
        });
        assert!(matches!(parse_response(&refused), Err(ProviderError::Refusal(_))));
    }

    #[test]
    fn test_refusal_mentioning_insufficient_stays_retryable() {
        let refused = json!({
            "choices": [{ "message": {
                "content": null,
                "refusal": "I have insufficient information to answer this puzzle."
            } }]
        });
        let outcome = parse_response(&refused).unwrap_err().into_outcome();
        assert!(matches!(
            outcome,
            debate_application::ProviderOutcome::Retryable(_)
        ));
    }
}
