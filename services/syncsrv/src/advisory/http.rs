//! OpenAI-compatible chat-completions backend
//!
//! Both prompts ask for a JSON object; the model output is parsed straight
//! into the target type, so anything that does not fit is an error and the
//! caller falls back.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AdvisoryService, ConnectivityDiagnosis, HealthInsight, HealthSummary};
use crate::config::AdvisoryConfig;
use crate::error::{Result, SyncsrvError};
use crate::links::LinkSample;

const SYSTEM_PROMPT: &str = "You are a database replication infrastructure expert. \
     Always answer with a single JSON object and nothing else.";

pub struct HttpAdvisory {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl HttpAdvisory {
    pub fn new(config: &AdvisoryConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| SyncsrvError::Config("advisory.endpoint is not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("syncsrv/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: completions_url(endpoint),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn complete<T: DeserializeOwned>(&self, prompt: &str) -> Result<T> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: 0.2,
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SyncsrvError::AdvisoryTimeout
            } else {
                SyncsrvError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncsrvError::advisory(format!(
                "{} returned HTTP {}",
                self.url, status
            )));
        }

        let reply: ChatResponse = response.json().await?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| SyncsrvError::advisory("completion contained no content"))?;
        debug!("Advisory reply: {} bytes", content.len());

        parse_json_content(&content)
    }
}

#[async_trait]
impl AdvisoryService for HttpAdvisory {
    fn name(&self) -> &str {
        "http"
    }

    async fn analyze_health(&self, summary: &HealthSummary) -> Result<HealthInsight> {
        self.complete(&health_prompt(summary)).await
    }

    async fn diagnose_connectivity(&self, links: &[LinkSample]) -> Result<ConnectivityDiagnosis> {
        self.complete(&connectivity_prompt(links)?).await
    }
}

/// `<base>/chat/completions`, unless the endpoint already names it
fn completions_url(endpoint: &str) -> String {
    let base = endpoint.trim_end_matches('/');
    if base.ends_with("/chat/completions") {
        base.to_string()
    } else {
        format!("{}/chat/completions", base)
    }
}

fn health_prompt(summary: &HealthSummary) -> String {
    format!(
        "Analyze these replication metrics:\n\
         - Records tracked: {}\n\
         - Pending (unprocessed): {}\n\
         - In transit: {}\n\
         - Server nodes: {}\n\n\
         Give a concise health summary of two or three sentences and one \
         high-priority recommendation for the database administrator. \
         Respond as {{\"summary\": string, \"recommendation\": string}}.",
        summary.total,
        summary.pending,
        summary.in_transit,
        summary.nodes.join(", ")
    )
}

fn connectivity_prompt(links: &[LinkSample]) -> Result<String> {
    let stats = serde_json::to_string(links)
        .map_err(|e| SyncsrvError::Internal(format!("link serialization: {}", e)))?;
    Ok(format!(
        "Diagnose these database link statistics (latency_ms 0 means the link is down):\n\
         {}\n\n\
         Predict whether any link (DS, TS, KS) risks a 403 or 504 timeout. \
         Respond as {{\"score\": number 0-100 (connectivity confidence), \
         \"log_entry\": string (brief technical log line), \
         \"risk_level\": \"Low\" | \"Medium\" | \"High\"}}.",
        stats
    ))
}

/// Parse model output, tolerating a surrounding markdown code fence
fn parse_json_content<T: DeserializeOwned>(content: &str) -> Result<T> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(unfenced.trim())
        .map_err(|e| SyncsrvError::advisory(format!("unparseable advisory reply: {}", e)))
}
