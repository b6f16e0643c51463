//! OpenAI chat-completion oracles: mention extraction and outlier judging.
//!
//! Both oracles share a thin chat client and the same defensive parsing:
//! model replies are fence-stripped and parsed as JSON; an extractor reply
//! that fails to parse counts as zero items, a judge reply that fails to
//! parse is a judge failure the reviewer degrades on.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::Mention;

use super::{Extractor, OutlierJudge, PlaceSummary};

const CHAT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Origin label stamped on LLM-extracted mentions
pub const LLM_LABEL: &str = "llm";

/// Minimal chat-completions client shared by the OpenAI oracles.
struct ChatClient {
    api_key: String,
    model: String,
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl ChatClient {
    fn new(api_key: String, model: String, endpoint: String) -> Self {
        Self {
            api_key,
            model,
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": system},
                    {"role": "user", "content": user},
                ],
                "temperature": temperature,
                "max_tokens": max_tokens,
            }))
            .send()
            .await
            .context("Failed to reach chat completions API")?
            .error_for_status()
            .context("Chat completions API returned an error status")?;

        let payload: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat completions response")?;

        Ok(payload
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

/// Strip a Markdown code fence wrapping a model reply, if present.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let body = match trimmed.find('\n') {
        Some(nl) => &trimmed[nl + 1..],
        None => return trimmed,
    };
    body.trim_end().trim_end_matches("```").trim()
}

// ============================================================================
// Extractor
// ============================================================================

/// LLM-based location mention extractor.
pub struct OpenAiExtractor {
    chat: ChatClient,
    /// Item cap passed to the model per chunk
    max_items: usize,
}

/// One item of the extraction reply
#[derive(Debug, Deserialize)]
struct ExtractedItem {
    #[serde(default)]
    name: String,
    #[serde(default)]
    sentence: String,
}

impl OpenAiExtractor {
    pub fn new(api_key: String, max_items: usize) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL.to_string(), max_items)
    }

    pub fn with_model(api_key: String, model: String, max_items: usize) -> Self {
        Self {
            chat: ChatClient::new(api_key, model, CHAT_ENDPOINT.to_string()),
            max_items,
        }
    }

    /// Point at a different endpoint (tests, proxies).
    pub fn with_endpoint(api_key: String, endpoint: impl Into<String>, max_items: usize) -> Self {
        Self {
            chat: ChatClient::new(api_key, DEFAULT_MODEL.to_string(), endpoint.into()),
            max_items,
        }
    }

    fn prompt(&self, language: &str) -> String {
        format!(
            "Extract real geographic locations and addresses mentioned in the text. \
             Include cities, countries, regions, rivers, landmarks, streets, and full \
             street addresses with numbers when present. Return a JSON array. Each item \
             must include: {{\"name\": exact span copied from the text (use the longest \
             specific span available; keep numbers and street names), \"sentence\": the \
             sentence containing the mention}}. Do not shorten to just the city if a \
             longer address span is present. Language: {language}. Limit to {max} items. \
             Only real places, no people or objects.",
            language = language,
            max = self.max_items,
        )
    }

    /// Parse a model reply into items; anything unparseable is zero items.
    fn parse_items(content: &str) -> Vec<ExtractedItem> {
        serde_json::from_str(strip_code_fence(content)).unwrap_or_default()
    }

    /// Convert reply items to mentions anchored inside the chunk.
    ///
    /// Span location is best-effort: an ASCII-case-insensitive search for the
    /// sentence (else the name) inside the chunk. When neither is found the
    /// mention anchors at the chunk offset.
    fn items_to_mentions(
        items: Vec<ExtractedItem>,
        chunk: &str,
        chunk_index: usize,
        chunk_offset: usize,
    ) -> Vec<Mention> {
        let lower_chunk = chunk.to_ascii_lowercase();
        let mut mentions = Vec::new();

        for item in items {
            let name = item.name.trim();
            if name.is_empty() {
                continue;
            }
            let sentence = item.sentence.trim();

            let needle = if sentence.is_empty() { name } else { sentence };
            let pos = lower_chunk.find(&needle.to_ascii_lowercase());
            if pos.is_none() {
                debug!(%name, chunk_index, "span not found in chunk, anchoring at chunk offset");
            }
            let start_char = chunk_offset + pos.unwrap_or(0);

            mentions.push(Mention::new(
                name,
                if sentence.is_empty() { name } else { sentence },
                start_char,
                start_char + name.len(),
                chunk_index,
                Some(LLM_LABEL.to_string()),
            ));
        }

        mentions
    }
}

#[async_trait]
impl Extractor for OpenAiExtractor {
    async fn extract(
        &self,
        chunk: &str,
        chunk_index: usize,
        chunk_offset: usize,
        language: &str,
    ) -> Result<Vec<Mention>> {
        let reply = self
            .chat
            .complete(&self.prompt(language), chunk, 0.0, 300)
            .await?;

        let items = Self::parse_items(&reply);
        debug!(chunk_index, items = items.len(), "extraction reply parsed");

        Ok(Self::items_to_mentions(items, chunk, chunk_index, chunk_offset))
    }
}

// ============================================================================
// Judge
// ============================================================================

/// LLM-based reviewer that flags contextually-suspicious geocoded places.
pub struct OpenAiJudge {
    chat: ChatClient,
    temperature: f64,
}

impl OpenAiJudge {
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL.to_string())
    }

    pub fn with_model(api_key: String, model: String) -> Self {
        Self {
            chat: ChatClient::new(api_key, model, CHAT_ENDPOINT.to_string()),
            temperature: 0.2,
        }
    }

    /// Point at a different endpoint (tests, proxies).
    pub fn with_endpoint(api_key: String, endpoint: impl Into<String>) -> Self {
        Self {
            chat: ChatClient::new(api_key, DEFAULT_MODEL.to_string(), endpoint.into()),
            temperature: 0.2,
        }
    }

    /// Parse the judge reply as a JSON array of place names.
    fn parse_names(content: &str) -> Result<Vec<String>> {
        let names: Vec<serde_json::Value> = serde_json::from_str(strip_code_fence(content))
            .context("Judge reply is not a JSON array")?;
        Ok(names
            .into_iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect())
    }
}

#[async_trait]
impl OutlierJudge for OpenAiJudge {
    async fn judge(
        &self,
        summaries: &[PlaceSummary],
        dominant_country: Option<&str>,
        language: &str,
    ) -> Result<Vec<String>> {
        let system = format!(
            "You are validating geocoded places from one book written in '{language}'. \
             The dominant country is likely: {dominant}. Given the list of places, flag \
             the ones that look far away or out of context compared to the dominant \
             country and the sentences. Only flag truly suspicious outliers. Return a \
             JSON array of place names to review (use the 'name' field). If none, \
             return an empty array.",
            language = language,
            dominant = dominant_country.unwrap_or("unknown"),
        );
        let places_json =
            serde_json::to_string(summaries).context("Failed to serialize place summaries")?;

        let reply = self
            .chat
            .complete(&system, &places_json, self.temperature, 300)
            .await?;

        Self::parse_names(&reply)
    }
}
