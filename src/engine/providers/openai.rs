// Brio Assistant Engine — OpenAI-Compatible Backend
// Handles OpenAI, OpenRouter, Groq, DeepSeek, Mistral, and any other
// provider speaking the `/chat/completions` dialect. Non-streaming: the
// engine consumes whole completions and splices tool results afterwards.

use super::CompletionBackend;
use crate::atoms::error::ProviderError;
use crate::atoms::types::{Completion, Message, Role};
use async_trait::async_trait;
use log::info;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

pub struct OpenAiBackend {
    provider_id: String,
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiBackend {
    pub fn new(
        provider_id: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        OpenAiBackend {
            provider_id: provider_id.into(),
            client: Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn format_messages(system_prompt: &str, history: &[Message]) -> Vec<Value> {
        let mut out = Vec::with_capacity(history.len() + 1);
        if !system_prompt.is_empty() {
            out.push(json!({"role": "system", "content": system_prompt}));
        }
        for msg in history {
            let role = match msg.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            out.push(json!({"role": role, "content": msg.content}));
        }
        out
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    fn id(&self) -> &str {
        &self.provider_id
    }

    async fn complete(
        &self,
        model: &str,
        system_prompt: &str,
        history: &[Message],
    ) -> Result<Completion, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let payload = json!({
            "model": model,
            "messages": Self::format_messages(system_prompt, history),
        });

        info!("[provider] {} completion via {}", self.provider_id, model);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                provider: self.provider_id.clone(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ProviderError::Http {
                provider: self.provider_id.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: Value =
            serde_json::from_str(&body).map_err(|e| ProviderError::ResponseParse {
                provider: self.provider_id.clone(),
                message: e.to_string(),
            })?;

        let content = parsed["choices"]
            .get(0)
            .and_then(|c| c["message"]["content"].as_str())
            .ok_or_else(|| ProviderError::ResponseParse {
                provider: self.provider_id.clone(),
                message: "missing choices[0].message.content".into(),
            })?
            .to_string();

        let tokens_used = parsed["usage"]["total_tokens"].as_u64().map(|t| t as u32);

        Ok(Completion { content, tokens_used })
    }
}

// ── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_formatting() {
        let history = vec![Message::user("hola"), Message::assistant("¡hola!")];
        let formatted = OpenAiBackend::format_messages("be helpful", &history);
        assert_eq!(formatted.len(), 3);
        assert_eq!(formatted[0]["role"], "system");
        assert_eq!(formatted[1]["role"], "user");
        assert_eq!(formatted[2]["role"], "assistant");
    }

    #[test]
    fn test_empty_system_prompt_omitted() {
        let formatted = OpenAiBackend::format_messages("", &[Message::user("hi")]);
        assert_eq!(formatted.len(), 1);
        assert_eq!(formatted[0]["role"], "user");
    }
}
