// src/services/analyzer.rs

//! AI content-suggestion client.
//!
//! Sends a page's URL, title and description to one of the supported chat
//! APIs and parses the reply into [`Suggestions`].

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{AnalyzerConfig, Provider, Suggestions};
use crate::services::ContentAnalyzer;

const SYSTEM_PROMPT: &str = "You are a web development expert focused on SEO, accessibility \
and performance. Give short, actionable suggestions.";

const ANTHROPIC_VERSION: &str = "2023-06-01";
const ANTHROPIC_MAX_TOKENS: u32 = 1024;

/// Pick a provider and API key.
///
/// The preferred provider wins when its key is set; otherwise the first
/// provider in [`Provider::FALLBACK_ORDER`] with a key is used.
pub fn select_provider(
    preferred: Provider,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<(Provider, String)> {
    let key_for = |provider: Provider| {
        lookup(provider.api_key_var())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .map(|key| (provider, key))
    };

    key_for(preferred).or_else(|| Provider::FALLBACK_ORDER.into_iter().find_map(key_for))
}

/// [`ContentAnalyzer`] that calls a hosted language model.
#[derive(Debug, Clone)]
pub struct AiAnalyzer {
    client: Client,
    provider: Provider,
    api_key: String,
    model: String,
    temperature: f32,
    base_url: String,
}

impl AiAnalyzer {
    pub fn new(client: Client, provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            client,
            provider,
            api_key: api_key.into(),
            model: provider.default_model().to_string(),
            temperature: AnalyzerConfig::default().temperature,
            base_url: default_base_url(provider).to_string(),
        }
    }

    /// Build from config, reading the API key from the environment.
    pub fn from_env(client: Client, config: &AnalyzerConfig) -> Result<Self> {
        let (provider, key) = select_provider(config.provider, |var| std::env::var(var).ok())
            .ok_or_else(|| {
                let vars: Vec<_> = Provider::FALLBACK_ORDER
                    .iter()
                    .map(|p| p.api_key_var())
                    .collect();
                AppError::config(format!(
                    "AI analysis requires an API key; set one of {}",
                    vars.join(", ")
                ))
            })?;

        if provider != config.provider {
            log::info!(
                "No key for {}, using {} for analysis",
                config.provider,
                provider
            );
        }

        let mut analyzer = Self::new(client, provider, key);
        analyzer.temperature = config.temperature;
        // The model override belongs to the configured provider only.
        if provider == config.provider {
            if let Some(model) = &config.model {
                analyzer.model = model.clone();
            }
        }
        Ok(analyzer)
    }

    /// Point requests at another host, e.g. a proxy or a test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    async fn complete_openai(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "temperature": self.temperature,
        });

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let reply: OpenAiReply = check_status(self.provider, response).await?.json().await?;

        reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AppError::analysis("no response from openai"))
    }

    async fn complete_gemini(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "contents": [{ "parts": [{ "text": format!("{SYSTEM_PROMPT}\n\n{prompt}") }] }],
            "generationConfig": { "temperature": self.temperature },
        });

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;
        let reply: GeminiReply = check_status(self.provider, response).await?.json().await?;

        reply
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| AppError::analysis("no response from gemini"))
    }

    async fn complete_anthropic(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "max_tokens": ANTHROPIC_MAX_TOKENS,
            "system": SYSTEM_PROMPT,
            "temperature": self.temperature,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;
        let reply: AnthropicReply = check_status(self.provider, response).await?.json().await?;

        reply
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text)
            .ok_or_else(|| AppError::analysis("no response from anthropic"))
    }
}

#[async_trait]
impl ContentAnalyzer for AiAnalyzer {
    async fn analyze(&self, url: &str, title: &str, description: &str) -> Result<Suggestions> {
        let prompt = build_prompt(url, title, description);
        let reply = match self.provider {
            Provider::OpenAi => self.complete_openai(&prompt).await?,
            Provider::Gemini => self.complete_gemini(&prompt).await?,
            Provider::Anthropic => self.complete_anthropic(&prompt).await?,
        };
        parse_suggestions(&reply)
    }
}

fn default_base_url(provider: Provider) -> &'static str {
    match provider {
        Provider::OpenAi => "https://api.openai.com",
        Provider::Gemini => "https://generativelanguage.googleapis.com",
        Provider::Anthropic => "https://api.anthropic.com",
    }
}

fn build_prompt(url: &str, title: &str, description: &str) -> String {
    format!(
        r#"Review this web page and suggest improvements.

URL: {url}
Title: {title}
Description: {description}

Cover four areas:
1. SEO (meta tags, title, structured data)
2. Content quality (how well the title and description work)
3. Accessibility (likely issues)
4. Performance (likely bottlenecks)

Reply with ONLY a JSON object of this shape:
{{
  "seo": ["..."],
  "content_quality": ["..."],
  "accessibility": ["..."],
  "performance": ["..."]
}}"#
    )
}

async fn check_status(provider: Provider, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::analysis(format!("{provider} API error: {status} - {body}")))
}

/// Parse a model reply, unwrapping a fenced code block if present.
pub fn parse_suggestions(reply: &str) -> Result<Suggestions> {
    let content = strip_code_fence(reply);
    serde_json::from_str(content).map_err(|e| {
        AppError::analysis(format!("failed to parse AI response: {e} - content: {content}"))
    })
}

fn strip_code_fence(reply: &str) -> &str {
    let inner = if let Some(idx) = reply.find("```json") {
        &reply[idx + "```json".len()..]
    } else if let Some(idx) = reply.find("```") {
        &reply[idx + "```".len()..]
    } else {
        return reply.trim();
    };

    match inner.find("```") {
        Some(end) => inner[..end].trim(),
        None => inner.trim(),
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiReply {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct GeminiReply {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicReply {
    #[serde(default)]
    content: Vec<AnthropicBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}
