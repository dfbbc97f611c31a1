//! Gemini `generateContent` adapter

use super::ProviderEndpoint;
use super::error::{ProviderError, parse_model_json};
use async_trait::async_trait;
use debate_application::{ProviderClient, ProviderOutcome, ProviderRequest};
use serde_json::{Value, json};
use tracing::debug;

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, endpoint: &ProviderEndpoint, api_key: String) -> Self {
        Self {
            http,
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn send(&self, request: &ProviderRequest) -> Result<Value, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, request.model);
        debug!(model = %request.model, schema = request.schema_name, "POST {}", url);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&build_body(request))
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
impl ProviderClient for GeminiClient {
    async fn submit(&self, request: &ProviderRequest) -> ProviderOutcome {
        match self.send(request).await {
            Ok(value) => ProviderOutcome::Ok(value),
            Err(e) => e.into_outcome(),
        }
    }
}

pub(crate) fn build_body(request: &ProviderRequest) -> Value {
    let mut generation = json!({
        "responseMimeType": "application/json",
        "responseJsonSchema": request.schema,
    });
    if let Some(temperature) = request.temperature {
        generation["temperature"] = json!(temperature);
    }
    if let Some(top_p) = request.top_p {
        generation["topP"] = json!(top_p);
    }

    json!({
        "systemInstruction": { "parts": [{ "text": request.system_prompt }] },
        "contents": [{ "role": "user", "parts": [{ "text": request.user_prompt }] }],
        "generationConfig": generation,
    })
}

pub(crate) fn parse_response(body: &Value) -> Result<Value, ProviderError> {
    let candidate = body
        .get("candidates")
        .and_then(|c| c.get(0))
        .ok_or_else(|| match body.pointer("/promptFeedback/blockReason").and_then(Value::as_str) {
            Some(reason) => ProviderError::Refusal(format!("prompt blocked: {}", reason)),
            None => ProviderError::MalformedResponse("response has no candidates".into()),
        })?;

    let text: String = candidate
        .pointer("/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate
            .get("finishReason")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        return Err(ProviderError::MalformedResponse(format!(
            "candidate has no text (finish reason: {})",
            reason
        )));
    }
    parse_model_json(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_shape() {
        let request = ProviderRequest {
            model: "gemini-3-flash-preview".into(),
            system_prompt: "judge".into(),
            user_prompt: "pick".into(),
            schema_name: "judgment",
            schema: json!({"type": "object"}),
            temperature: Some(0.7),
            top_p: Some(0.95),
        };
        let body = build_body(&request);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "judge");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "pick");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["temperature"], 0.7);
        assert_eq!(body["generationConfig"]["topP"], 0.95);
    }

    #[test]
    fn test_parse_joins_parts() {
        let body = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"answer\":" }, { "text": " \"42\"}" }] },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(parse_response(&body).unwrap()["answer"], "42");
    }

    #[test]
    fn test_parse_blocked_and_empty() {
        let blocked = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert!(matches!(parse_response(&blocked), Err(ProviderError::Refusal(_))));

        let empty = json!({ "candidates": [{ "finishReason": "MAX_TOKENS" }] });
        let err = parse_response(&empty).unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }
}
