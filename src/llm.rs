//! # Generative-text client
//!
//! Thin client for an Ollama-compatible chat endpoint. Requests carry a
//! bounded timeout and transport failures are retried a fixed number of
//! times with linear backoff before surfacing as ServiceUnavailable.
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::warn;

use crate::{config::Config, error::AppError};

const BACKOFF_STEP: Duration = Duration::from_millis(250);

pub struct LlmClient {
    http: Client,
    chat_url: String,
    model: String,
    retries: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl LlmClient {
    pub fn new(config: &Config) -> Self {
        Self::with_endpoint(
            &config.llm_url,
            &config.llm_model,
            config.llm_timeout_ms,
            config.llm_retries,
        )
    }

    pub fn with_endpoint(url: &str, model: &str, timeout_ms: u64, retries: u32) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .expect("HTTP client misconfigured!");

        Self {
            http,
            chat_url: format!("{}/api/chat", url.trim_end_matches('/')),
            model: model.to_string(),
            retries,
        }
    }

    /// Send one user prompt and return the completion text.
    pub async fn complete(&self, prompt: &str) -> Result<String, AppError> {
        for attempt in 0..=self.retries {
            if attempt > 0 {
                sleep(BACKOFF_STEP * attempt).await;
            }

            match self.chat(prompt).await {
                Ok(content) => return Ok(content),
                Err(e) => {
                    warn!(
                        "Generative service call failed (attempt {}/{}): {e}",
                        attempt + 1,
                        self.retries + 1
                    );
                }
            }
        }

        Err(AppError::ServiceUnavailable(
            "Generative service unreachable".to_string(),
        ))
    }

    async fn chat(&self, prompt: &str) -> Result<String, reqwest::Error> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let response = self
            .http
            .post(&self.chat_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;

        Ok(response.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_service_reports_unavailable() {
        // Reserved TEST-NET address, nothing listens there.
        let client = LlmClient::with_endpoint("http://192.0.2.1:1", "test-model", 100, 0);

        let err = client.complete("prompt").await.unwrap_err();
        assert!(matches!(err, AppError::ServiceUnavailable(_)));
    }

    #[test]
    fn test_chat_url_normalized() {
        let client = LlmClient::with_endpoint("http://localhost:11434/", "m", 100, 0);

        assert_eq!(client.chat_url, "http://localhost:11434/api/chat");
    }
}
