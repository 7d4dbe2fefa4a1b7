use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::LlmConfig;

const VISION_TIMEOUT: Duration = Duration::from_secs(30);

/// Contract for the multimodal LLM backend. One text completion per call,
/// stateless across calls.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        session_id: Uuid,
        system: &str,
        prompt: &str,
        image_base64: &str,
    ) -> anyhow::Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        #[serde(rename = "type")]
        content_type: &'static str,
        text: String,
    },
    ImageUrl {
        #[serde(rename = "type")]
        content_type: &'static str,
        image_url: ImageData,
    },
}

#[derive(Debug, Serialize)]
struct ImageData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: String,
}

/// OpenAI-compatible chat-completions client used when an API key is
/// configured. The connection pool is built once and shared.
pub struct RemoteLlmClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl RemoteLlmClient {
    pub fn new(config: &LlmConfig, api_key: String) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(VISION_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl LlmClient for RemoteLlmClient {
    async fn complete(
        &self,
        session_id: Uuid,
        system: &str,
        prompt: &str,
        image_base64: &str,
    ) -> anyhow::Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: vec![ContentPart::Text {
                        content_type: "text",
                        text: system.to_string(),
                    }],
                },
                ChatMessage {
                    role: "user",
                    content: vec![
                        ContentPart::Text {
                            content_type: "text",
                            text: prompt.to_string(),
                        },
                        ContentPart::ImageUrl {
                            content_type: "image_url",
                            image_url: ImageData {
                                url: format!("data:image/jpeg;base64,{image_base64}"),
                            },
                        },
                    ],
                },
            ],
            max_tokens: 800,
        };

        debug!(%session_id, model = %self.model, "sending vision request");
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header("X-Session-Id", session_id.to_string())
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow::anyhow!("empty completion"))?;
        Ok(content)
    }
}

/// Deterministic replacement used when no LLM key is configured. The choice
/// between the three presets depends only on the payload size, so every
/// process answers identically.
pub struct StubLlmClient;

const STUB_SMALL_LIMIT: usize = 50_000;
const STUB_MEDIUM_LIMIT: usize = 200_000;

#[async_trait]
impl LlmClient for StubLlmClient {
    async fn complete(
        &self,
        _session_id: Uuid,
        _system: &str,
        _prompt: &str,
        image_base64: &str,
    ) -> anyhow::Result<String> {
        let preset = if image_base64.len() < STUB_SMALL_LIMIT {
            r#"{
                "calories": 320, "protein": 18, "carbohydrates": 4, "net_carbs": 3,
                "fat": 26, "fiber": 1, "keto_score": 9, "confidence": 0.8,
                "foods_detected": ["omelette au fromage"],
                "portions": ["1 assiette"]
            }"#
        } else if image_base64.len() < STUB_MEDIUM_LIMIT {
            r#"{
                "calories": 480, "protein": 38, "carbohydrates": 6, "net_carbs": 3,
                "fat": 33, "fiber": 3, "keto_score": 9, "confidence": 0.8,
                "foods_detected": ["saumon grillé", "épinards sautés"],
                "portions": ["150 g", "100 g"]
            }"#
        } else {
            r#"{
                "calories": 640, "protein": 42, "carbohydrates": 12, "net_carbs": 5,
                "fat": 47, "fiber": 7, "keto_score": 8, "confidence": 0.8,
                "foods_detected": ["avocat", "saumon grillé", "brocoli vapeur"],
                "portions": ["1/2 avocat", "150 g", "120 g"]
            }"#
        };
        Ok(preset.to_string())
    }
}
