//! Strategic risk insights from a locally hosted chat model (Ollama `/api/chat`).
//!
//! Every call is a single non-streaming request with no retries. Failures are
//! returned as [`InsightError`] so the caller can pick its own fallback text.

use std::time::Duration;

use delaycast_core::PredictionResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

// ── Prompt templates ──

const ANALYST_SYSTEM_PROMPT: &str = "\
You are a senior supply chain risk analyst. You read shipping and trade news \
and explain, in plain business language, what it means for shipment delays.";

const CONSULTANT_SYSTEM_PROMPT: &str = "\
You are a professional logistics consultant advising an operations manager. \
Be brief and practical.";

fn build_summary_prompt(headlines: &[String]) -> String {
    let list: String = headlines.iter().map(|h| format!("- {h}\n")).collect();
    format!(
        "Current logistics headlines:\n\
         {list}\n\
         Based on these headlines, identify the top 2 global risks that could \
         delay shipments this week. Say which headline implies the most financial \
         risk for importers and which signals a shift in trade routes. \
         Answer in a concise paragraph of at most three sentences."
    )
}

fn build_advice_prompt(prediction: &PredictionResult, region: &str, product: &str) -> String {
    format!(
        "Scenario:\n\
         - A shipment of {product} is going to {region}.\n\
         - Our delay model predicts a {percentage} probability of delay ({risk}).\n\
         \n\
         Give two lines of strategic advice to mitigate this risk.",
        percentage = prediction.percentage(),
        risk = prediction.risk.as_str(),
    )
}

// ── Types ──

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("model returned an empty response")]
    EmptyResponse,
    #[error("no headlines to analyse")]
    NoHeadlines,
}

#[derive(Debug, Clone)]
pub struct InsightConfig {
    /// Base URL of the Ollama server, without trailing slash.
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_tokens: 512,
            temperature: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub system_prompt: Option<String>,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateResponse {
    pub text: String,
    pub model: String,
    pub tokens_used: u32,
}

// Wire format of Ollama's chat endpoint.

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatOptions {
    num_predict: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Deserialize)]
struct ChatResponse {
    model: String,
    message: ChatMessage,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

// ── Client ──

/// HTTP client for a local chat model.
pub struct InsightClient {
    client: reqwest::Client,
    config: InsightConfig,
}

impl InsightClient {
    pub fn new(mut config: InsightConfig) -> Result<Self, InsightError> {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    /// Request a default-configured generation for `user_prompt`.
    pub fn request(&self, system_prompt: Option<&str>, user_prompt: String) -> GenerateRequest {
        GenerateRequest {
            system_prompt: system_prompt.map(str::to_string),
            user_prompt,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    /// Send one chat completion to the model server.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, InsightError> {
        let url = format!("{}/api/chat", self.config.base_url);
        let body = chat_request(&self.config.model, request);

        info!(url = %url, model = %self.config.model, "requesting chat completion");
        let resp = self.client.post(&url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InsightError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        let response = parse_chat_response(&bytes)?;
        info!(tokens = response.tokens_used, "chat completion received");
        Ok(response)
    }

    /// A short strategic-risk paragraph for the given headlines.
    pub async fn summarize(&self, headlines: &[String]) -> Result<String, InsightError> {
        if headlines.is_empty() {
            return Err(InsightError::NoHeadlines);
        }
        let request = self.request(Some(ANALYST_SYSTEM_PROMPT), build_summary_prompt(headlines));
        Ok(self.generate(&request).await?.text)
    }

    /// Two lines of mitigation advice for a predicted delay.
    pub async fn advise(
        &self,
        prediction: &PredictionResult,
        region: &str,
        product: &str,
    ) -> Result<String, InsightError> {
        let request = self.request(
            Some(CONSULTANT_SYSTEM_PROMPT),
            build_advice_prompt(prediction, region, product),
        );
        Ok(self.generate(&request).await?.text)
    }
}

fn chat_request<'a>(model: &'a str, request: &GenerateRequest) -> ChatRequest<'a> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &request.system_prompt {
        messages.push(ChatMessage {
            role: "system".into(),
            content: system.clone(),
        });
    }
    messages.push(ChatMessage {
        role: "user".into(),
        content: request.user_prompt.clone(),
    });
    ChatRequest {
        model,
        messages,
        stream: false,
        options: ChatOptions {
            num_predict: request.max_tokens,
            temperature: request.temperature,
        },
    }
}

fn parse_chat_response(bytes: &[u8]) -> Result<GenerateResponse, InsightError> {
    let parsed: ChatResponse = serde_json::from_slice(bytes)?;
    let text = parsed.message.content.trim().to_string();
    if text.is_empty() {
        return Err(InsightError::EmptyResponse);
    }
    Ok(GenerateResponse {
        text,
        model: parsed.model,
        tokens_used: parsed.prompt_eval_count + parsed.eval_count,
    })
}
