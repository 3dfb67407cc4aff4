use super::LLMClient;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::model::{normalize_model_name, ModelDescriptor};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Upper bound on model list pages followed
const MAX_MODEL_PAGES: usize = 20;

/// Credential header; keeps the key out of request URLs and error messages
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiModelsResponse {
    models: Option<Vec<ModelDescriptor>>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: Option<String>,
    status: Option<String>,
    #[serde(default)]
    details: Vec<serde_json::Value>,
}

pub struct GeminiClient {
    client: reqwest::Client,
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GeminiClient {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(120))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    fn api_key(config: &LLMConfig) -> Result<&str> {
        config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::AuthError("Missing API key for Google provider".to_string()))
    }

    fn endpoint(config: &LLMConfig, path: &str) -> String {
        format!("{}/{}", config.base_url.trim_end_matches('/'), path)
    }

    async fn dispatch(request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        request
            .send()
            .await
            .map_err(|e| AppError::NetworkError(format!("Request failed: {}", e.without_url())))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = Self::dispatch(request).await?;
        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        Ok(response)
    }
}

async fn error_from(response: reqwest::Response) -> AppError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    classify_error(status, &text)
}

fn parse_error(e: reqwest::Error) -> AppError {
    AppError::LLMError(format!("Failed to parse JSON: {}", e.without_url()))
}

/// Map a non-success response to the error taxonomy.
fn classify_error(status: StatusCode, body: &str) -> AppError {
    let parsed = serde_json::from_str::<GeminiErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|env| env.error.message.clone())
        .unwrap_or_else(|| body.trim().to_string());
    let api_status = parsed
        .as_ref()
        .and_then(|env| env.error.status.clone())
        .unwrap_or_default();
    let key_rejected = parsed.as_ref().is_some_and(|env| {
        env.error
            .details
            .iter()
            .any(|d| d.get("reason").and_then(|r| r.as_str()) == Some("API_KEY_INVALID"))
    }) || message.contains("API key not valid");

    let detail = format!("API error ({}): {}", status, message);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::AuthError(detail),
        StatusCode::BAD_REQUEST if key_rejected => AppError::AuthError(detail),
        StatusCode::NOT_FOUND => AppError::NotFound(detail),
        StatusCode::TOO_MANY_REQUESTS => AppError::RateLimitError(detail),
        _ if api_status == "RESOURCE_EXHAUSTED" => AppError::RateLimitError(detail),
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            AppError::NetworkError(detail)
        }
        _ => AppError::LLMError(detail),
    }
}

#[async_trait]
impl LLMClient for GeminiClient {
    async fn generate(&self, config: &LLMConfig, system: &str, user: &str) -> Result<String> {
        let api_key = Self::api_key(config)?;
        let model_id = normalize_model_name(&config.model);
        let url = Self::endpoint(config, &format!("{}:generateContent", model_id));

        let system_instruction = if system.trim().is_empty() {
            None
        } else {
            Some(GeminiContent {
                parts: vec![GeminiPart {
                    text: system.to_string(),
                }],
                role: None,
            })
        };

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: user.to_string(),
                }],
                role: Some("user".to_string()),
            }],
            system_instruction,
            generation_config: Some(GenerationConfig {
                temperature: config.temperature.map(|t| t as f64),
                max_output_tokens: config.max_tokens,
            }),
        };

        debug!(model = %model_id, prompt_chars = user.len(), "Sending generateContent request");

        let response = self
            .send(
                self.client
                    .post(&url)
                    .header(API_KEY_HEADER, api_key)
                    .json(&body),
            )
            .await?;

        let json: GeminiResponse = response
            .json()
            .await
            .map_err(parse_error)?;

        if let Some(reason) = json.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(AppError::LLMError(format!("Prompt blocked: {}", reason)));
        }

        let candidate = json
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::LLMError("Response contained no candidates".to_string()))?;

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate
                .finish_reason
                .unwrap_or_else(|| "UNKNOWN".to_string());
            warn!(model = %model_id, finish_reason = %reason, "Candidate without text");
            return Err(AppError::LLMError(format!(
                "Response contained no text (finish reason: {})",
                reason
            )));
        }

        info!(model = %model_id, response_chars = text.len(), "Received generated content");
        Ok(text)
    }

    async fn list_models(&self, config: &LLMConfig) -> Result<Vec<ModelDescriptor>> {
        let api_key = Self::api_key(config)?;
        let url = Self::endpoint(config, "models");

        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_MODEL_PAGES {
            let mut request = self
                .client
                .get(&url)
                .header(API_KEY_HEADER, api_key)
                .query(&[("pageSize", "1000")]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let json: GeminiModelsResponse = self
                .send(request)
                .await?
                .json()
                .await
                .map_err(parse_error)?;

            models.extend(json.models.unwrap_or_default());

            page_token = json.next_page_token.filter(|t| !t.is_empty());
            if page_token.is_none() {
                break;
            }
        }

        if page_token.is_some() {
            warn!(
                pages = MAX_MODEL_PAGES,
                count = models.len(),
                "Model list truncated, more pages remain"
            );
        }

        debug!(count = models.len(), "Listed models");
        Ok(models)
    }

    async fn get_model(&self, config: &LLMConfig, name: &str) -> Result<ModelDescriptor> {
        let api_key = Self::api_key(config)?;
        let model_id = normalize_model_name(name);
        let url = Self::endpoint(config, &model_id);

        let request = self.client.get(&url).header(API_KEY_HEADER, api_key);
        let response = Self::dispatch(request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match error_from(response).await {
                AppError::AuthError(msg) => AppError::AuthError(msg),
                // An unknown model name can also surface as 400 INVALID_ARGUMENT
                err if matches!(status, StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST) => {
                    AppError::NotFound(format!("Model '{}': {}", model_id, err))
                }
                err => err,
            });
        }

        response.json().await.map_err(parse_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn config_for(server: &MockServer, key: &str) -> LLMConfig {
        LLMConfig::default()
            .with_base_url(server.base_url())
            .with_api_key(key)
            .with_model("models/gemini-1.5-flash-latest")
    }

    fn invalid_key_body() -> serde_json::Value {
        json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT",
                "details": [{
                    "@type": "type.googleapis.com/google.rpc.ErrorInfo",
                    "reason": "API_KEY_INVALID",
                    "domain": "googleapis.com"
                }]
            }
        })
    }

    #[tokio::test]
    async fn test_list_models_invalid_key_is_auth_error() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/models")
                    .header("x-goog-api-key", "bad-key");
                then.status(400)
                    .header("content-type", "application/json")
                    .json_body(invalid_key_body());
            })
            .await;

        let err = GeminiClient::new()
            .list_models(&config_for(&server, "bad-key"))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, AppError::AuthError(_)));
    }

    #[tokio::test]
    async fn test_list_models_follows_pages() {
        let server = MockServer::start_async().await;
        let first = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/models")
                    .header("x-goog-api-key", "good-key")
                    .query_param_missing("pageToken");
                then.status(200).json_body(json!({
                    "models": [{"name": "models/gemini-1.5-flash-latest"}],
                    "nextPageToken": "page2"
                }));
            })
            .await;
        let second = server
            .mock_async(|when, then| {
                when.method(GET).path("/models").query_param("pageToken", "page2");
                then.status(200).json_body(json!({
                    "models": [{"name": "models/gemini-pro", "displayName": "Gemini Pro"}]
                }));
            })
            .await;

        let models = GeminiClient::new()
            .list_models(&config_for(&server, "good-key"))
            .await
            .unwrap();

        first.assert_async().await;
        second.assert_async().await;
        let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["models/gemini-1.5-flash-latest", "models/gemini-pro"]);
    }

    #[tokio::test]
    async fn test_missing_key_is_auth_error() {
        let config = LLMConfig::default().with_base_url("http://127.0.0.1:9");
        let err = GeminiClient::new().list_models(&config).await.unwrap_err();
        assert!(matches!(err, AppError::AuthError(_)));
    }

    #[tokio::test]
    async fn test_get_unknown_model_is_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/models/no-such-model");
                then.status(404).json_body(json!({
                    "error": {"code": 404, "message": "models/no-such-model is not found", "status": "NOT_FOUND"}
                }));
            })
            .await;

        let err = GeminiClient::new()
            .get_model(&config_for(&server, "good-key"), "no-such-model")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_generate_returns_candidate_text() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/models/gemini-1.5-flash-latest:generateContent")
                    .header("x-goog-api-key", "good-key");
                then.status(200).json_body(json!({
                    "candidates": [{
                        "content": {"parts": [{"text": "Rows 1, 3 "}, {"text": "and 4."}], "role": "model"},
                        "finishReason": "STOP"
                    }]
                }));
            })
            .await;

        let text = GeminiClient::new()
            .generate(&config_for(&server, "good-key"), "", "Which 3 wines?")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(text, "Rows 1, 3 and 4.");
    }

    #[tokio::test]
    async fn test_generate_rate_limited() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(429).json_body(json!({
                    "error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}
                }));
            })
            .await;

        let err = GeminiClient::new()
            .generate(&config_for(&server, "good-key"), "", "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RateLimitError(_)));
    }

    #[tokio::test]
    async fn test_generate_blocked_candidate() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({
                    "candidates": [{"finishReason": "SAFETY"}]
                }));
            })
            .await;

        let err = GeminiClient::new()
            .generate(&config_for(&server, "good-key"), "", "hello")
            .await
            .unwrap_err();
        match err {
            AppError::LLMError(msg) => assert!(msg.contains("SAFETY")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let config = LLMConfig::default()
            .with_base_url("http://127.0.0.1:1")
            .with_api_key("SUPER-SECRET-KEY");
        let err = GeminiClient::with_timeout(Duration::from_secs(2))
            .list_models(&config)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NetworkError(_)));
        assert!(!err.to_string().contains("SUPER-SECRET-KEY"));
    }

    #[tokio::test]
    async fn test_key_not_in_error_messages() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).body("not json");
            })
            .await;

        let config = config_for(&server, "SUPER-SECRET-KEY");
        let client = GeminiClient::new();
        let errors = [
            client.list_models(&config).await.unwrap_err(),
            client.get_model(&config, "gemini-pro").await.unwrap_err(),
        ];
        for err in errors {
            assert!(matches!(err, AppError::LLMError(_)));
            assert!(!err.to_string().contains("SUPER-SECRET-KEY"), "{}", err);
        }
    }

    #[tokio::test]
    async fn test_list_models_stops_after_page_limit() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/models");
                then.status(200).json_body(json!({
                    "models": [{"name": "models/gemini-pro"}],
                    "nextPageToken": "again"
                }));
            })
            .await;

        let models = GeminiClient::new()
            .list_models(&config_for(&server, "good-key"))
            .await
            .unwrap();

        mock.assert_hits_async(MAX_MODEL_PAGES).await;
        assert_eq!(models.len(), MAX_MODEL_PAGES);
    }

    #[tokio::test]
    async fn test_get_model_bad_request_is_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/models/bogus-model");
                then.status(400).json_body(json!({
                    "error": {"code": 400, "message": "Model name is invalid", "status": "INVALID_ARGUMENT"}
                }));
            })
            .await;

        let err = GeminiClient::new()
            .get_model(&config_for(&server, "good-key"), "bogus-model")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_model_invalid_key_stays_auth_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/models/gemini-pro");
                then.status(400).json_body(invalid_key_body());
            })
            .await;

        let err = GeminiClient::new()
            .get_model(&config_for(&server, "bad-key"), "gemini-pro")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthError(_)));
    }

    #[test]
    fn test_classify_error() {
        assert!(matches!(
            classify_error(StatusCode::FORBIDDEN, "{}"),
            AppError::AuthError(_)
        ));
        assert!(matches!(
            classify_error(StatusCode::SERVICE_UNAVAILABLE, "overloaded"),
            AppError::NetworkError(_)
        ));
        assert!(matches!(
            classify_error(StatusCode::BAD_REQUEST, r#"{"error":{"message":"bad field"}}"#),
            AppError::LLMError(_)
        ));
    }
}
