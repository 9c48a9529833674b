//! OpenAI-compatible chat-completions client implementing the LlmClient
//! port.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::LlmConfig;
use crate::domain::ports::{ChatMessage, Completion, CompletionRequest, LlmClient};

pub struct OpenAiClient {
    http_client: ReqwestClient,
    base_url: String,
    api_key: String,
    default_model: String,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> DomainResult<Self> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| DomainError::LlmError("no API key configured".to_string()))?;

        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::LlmError(format!("client build failed: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            default_model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        model: &str,
        max_tokens: u32,
    ) -> DomainResult<String> {
        let body = ChatCompletionBody {
            model,
            messages,
            max_tokens,
            temperature: 0.2,
        };

        let response = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DomainError::LlmError(format!(
                "completion failed with status {status}: {detail}"
            )));
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                DomainError::MalformedLlmOutput("response carried no choices".to_string())
            })?;
        debug!(model, chars = text.len(), "completion received");
        Ok(text)
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> DomainResult<Completion> {
        let model = request.model.as_deref().unwrap_or(&self.default_model);
        let max_tokens = request.max_tokens.unwrap_or(self.max_tokens);
        let text = self.chat(&request.messages, model, max_tokens).await?;
        Ok(Completion {
            text,
            confidence: None,
            model: model.to_string(),
        })
    }

    async fn classify(&self, system_prompt: &str, user_prompt: &str) -> DomainResult<Value> {
        let messages = [
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_prompt),
        ];
        let text = self
            .chat(&messages, &self.default_model, self.max_tokens)
            .await?;
        parse_json_payload(&text)
    }
}

/// Extract a JSON object from the completion text, tolerating markdown
/// code fences around it.
fn parse_json_payload(text: &str) -> DomainResult<Value> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map_or(trimmed, |rest| rest.trim_end_matches("```"));

    serde_json::from_str(body.trim())
        .map_err(|e| DomainError::MalformedLlmOutput(format!("invalid JSON payload: {e}")))
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_config(base_url: &str) -> LlmConfig {
        LlmConfig {
            base_url: base_url.to_string(),
            api_key: Some("test-key".to_string()),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 5,
            max_tokens: 200,
        }
    }

    #[test]
    fn json_payload_parses_with_and_without_fences() {
        let plain = parse_json_payload(r#"{"intent": "tabular"}"#).unwrap();
        assert_eq!(plain["intent"], "tabular");

        let fenced = parse_json_payload("```json\n{\"intent\": \"conceptual\"}\n```").unwrap();
        assert_eq!(fenced["intent"], "conceptual");

        assert!(parse_json_payload("not json at all").is_err());
    }

    #[tokio::test]
    async fn complete_extracts_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_body(
                json!({
                    "choices": [{"message": {"role": "assistant", "content": "resposta"}}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = OpenAiClient::new(&test_config(&server.url())).unwrap();
        let completion = client
            .complete(CompletionRequest {
                messages: vec![ChatMessage::user("pergunta")],
                model: None,
                max_tokens: None,
            })
            .await
            .unwrap();

        assert_eq!(completion.text, "resposta");
        assert_eq!(completion.model, "gpt-4o-mini");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_llm_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = OpenAiClient::new(&test_config(&server.url())).unwrap();
        let result = client.classify("system", "user").await;
        assert!(matches!(result, Err(DomainError::LlmError(_))));
    }

    #[tokio::test]
    async fn classify_parses_fenced_json() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(
                json!({
                    "choices": [{"message": {"role": "assistant",
                        "content": "```json\n{\"bairros\": [\"CRISTAL\"]}\n```"}}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = OpenAiClient::new(&test_config(&server.url())).unwrap();
        let value = client.classify("system", "user").await.unwrap();
        assert_eq!(value["bairros"][0], "CRISTAL");
    }
}
