use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tourguide_core::config::{PolishConfig, PolishProvider};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";

const SYSTEM_PROMPT: &str =
    "You are a concise, professional tour guide who writes brief, structured answers.";
const MAX_TOKENS: u32 = 260;
const TEMPERATURE: f32 = 0.15;

/// Optional rewrite of a composed reply. Implementations must keep `**bold**`
/// spans and list lines intact; callers fall back to the original on error.
#[async_trait]
pub trait Polisher: Send + Sync {
    fn name(&self) -> &'static str;
    async fn polish(&self, text: &str) -> Result<String>;
}

/// Deterministic compactor: tidies whitespace per line and caps the length at
/// a line or sentence boundary.
#[derive(Clone, Debug)]
pub struct LocalPolisher {
    max_len: usize,
}

impl LocalPolisher {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn compact(&self, text: &str) -> String {
        let mut lines = Vec::new();
        let mut previous_blank = true;
        for line in text.lines() {
            let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
            if collapsed.is_empty() {
                if !previous_blank {
                    lines.push(String::new());
                }
                previous_blank = true;
            } else {
                lines.push(collapsed);
                previous_blank = false;
            }
        }
        let compacted = lines.join("\n").trim_end().to_string();
        cap_at_boundary(&compacted, self.max_len)
    }
}

#[async_trait]
impl Polisher for LocalPolisher {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn polish(&self, text: &str) -> Result<String> {
        Ok(self.compact(text))
    }
}

/// Chat-completions client for OpenAI and OpenAI-compatible servers (Ollama).
#[derive(Clone)]
pub struct ChatCompletionsPolisher {
    provider: &'static str,
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
    max_len: usize,
}

impl ChatCompletionsPolisher {
    pub fn new(
        provider: &'static str,
        base_url: impl Into<String>,
        api_key: Option<SecretString>,
        model: impl Into<String>,
        timeout: Duration,
        max_len: usize,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            provider,
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            max_len,
        })
    }

    fn prompt(text: &str) -> String {
        format!(
            "Rewrite as a professional, friendly tour guide.\n\
             Output style:\n\
             - Start with a one-sentence answer.\n\
             - Then 3–6 short bullets with the most useful facts/details.\n\
             - If it is an itinerary, use a numbered list with minute estimates.\n\
             - Keep it concise, specific, and free of filler or marketing fluff.\n\
             - Use simple Markdown only (bold, bullets, numbered lists).\n\
             Text to rewrite:\n{text}"
        )
    }
}

impl std::fmt::Debug for ChatCompletionsPolisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsPolisher")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[async_trait]
impl Polisher for ChatCompletionsPolisher {
    fn name(&self) -> &'static str {
        self.provider
    }

    async fn polish(&self, text: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": &self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": Self::prompt(text)}
            ],
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE
        });

        let mut request =
            self.client.post(format!("{}/chat/completions", self.base_url)).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("{} polish error {}: {}", self.provider, status, body));
        }

        let parsed: CompletionResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| anyhow!("{} returned no completion", self.provider))?;

        Ok(content.chars().take(self.max_len).collect())
    }
}

/// Builds the configured polisher, if any.
pub fn polisher_from_config(config: &PolishConfig) -> Result<Option<Arc<dyn Polisher>>> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let polisher: Arc<dyn Polisher> = match config.provider {
        PolishProvider::None => return Ok(None),
        PolishProvider::Local => Arc::new(LocalPolisher::new(config.max_len)),
        PolishProvider::OpenAi => Arc::new(ChatCompletionsPolisher::new(
            "openai",
            config.base_url.clone().unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            config.api_key.clone(),
            config.model.clone(),
            timeout,
            config.max_len,
        )?),
        PolishProvider::Ollama => Arc::new(ChatCompletionsPolisher::new(
            "ollama",
            config.base_url.clone().unwrap_or_else(|| OLLAMA_BASE_URL.to_string()),
            config.api_key.clone(),
            config.model.clone(),
            timeout,
            config.max_len,
        )?),
    };
    Ok(Some(polisher))
}

fn cap_at_boundary(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let capped = text.chars().take(max_len).collect::<String>();
    let floor = capped.len() / 3;
    let boundary = capped
        .char_indices()
        .filter(|(index, character)| {
            *index >= floor && matches!(*character, '\n' | '.' | '!' | '?')
        })
        .map(|(index, character)| if character == '\n' { index } else { index + 1 })
        .last();
    match boundary {
        Some(end) => capped[..end].trim_end().to_string(),
        None => capped.trim_end().to_string(),
    }
}
