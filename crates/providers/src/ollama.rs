//! Ollama-backed decision source.
//!
//! Talks to an Ollama-compatible `/api/chat` endpoint, asks for a
//! JSON action object, and retries malformed output with the parse
//! error fed back to the model. After the retry budget is spent the
//! source reports `DecisionError` — the only fatal failure in the
//! system.

use async_trait::async_trait;
use hatchling_core::action::Action;
use hatchling_core::decision::{CapabilitySet, DecisionSource};
use hatchling_core::error::DecisionError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DEFAULT_RETRY_BUDGET: u32 = 3;

/// A decision source backed by a local Ollama server.
pub struct OllamaSource {
    base_url: String,
    model: String,
    agent_name: String,
    retry_budget: u32,
    client: reqwest::Client,
    /// Conversation history owned by the source, as the contract
    /// requires. Contexts are appended as user turns, decisions as
    /// assistant turns.
    history: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

impl OllamaSource {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        agent_name: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(240))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            agent_name: agent_name.into(),
            retry_budget: DEFAULT_RETRY_BUDGET,
            client,
            history: Vec::new(),
        }
    }

    /// Override the retry budget.
    pub fn with_retry_budget(mut self, retries: u32) -> Self {
        self.retry_budget = retries.max(1);
        self
    }

    async fn chat(&self, messages: &[ChatMessage], json_mode: bool) -> Result<String, DecisionError> {
        let url = format!("{}/api/chat", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            format: json_mode.then_some("json"),
            options: ChatOptions {
                temperature: 0.7,
                num_predict: 1024,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DecisionError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DecisionError::Unreachable(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| DecisionError::Unreachable(format!("bad chat payload: {e}")))?;
        Ok(parsed.message.content)
    }

    fn instruction(&self, context: &str, actions_left: u32, capabilities: &CapabilitySet) -> String {
        let listing: String = capabilities
            .capabilities
            .iter()
            .map(|c| format!("- `{}`: {}\n", c.action_type, c.description))
            .collect();

        format!(
            "You are {name}, an autonomous agent with {actions_left} action points left.\n\n\
             {context}\n\n\
             ## AVAILABLE ACTIONS\n{listing}\n\
             Respond with ONE JSON object and nothing else:\n\
             {{\"action_type\": \"...\", \"params\": {{...}}, \"reasoning\": \"...\", \
             \"self_criticism\": \"...\", \"emotions\": \"...\", \"next_move_preview\": \"...\"}}",
            name = self.agent_name,
        )
    }

    fn parse_action(raw: &str) -> Result<Action, String> {
        // Models sometimes wrap the object in markdown fences.
        let trimmed = raw
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();

        let action: Action =
            serde_json::from_str(trimmed).map_err(|e| format!("not a valid action object: {e}"))?;
        if action.action_type.trim().is_empty() {
            return Err("missing action_type".into());
        }
        Ok(action)
    }
}

#[async_trait]
impl DecisionSource for OllamaSource {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn next_action(
        &mut self,
        context: &str,
        actions_left: u32,
        capabilities: &CapabilitySet,
    ) -> Result<Action, DecisionError> {
        let prompt = self.instruction(context, actions_left, capabilities);
        self.history.push(ChatMessage {
            role: "user".into(),
            content: prompt,
        });

        let mut last_error = String::new();
        for attempt in 1..=self.retry_budget {
            let raw = self.chat(&self.history, true).await?;
            debug!(attempt, bytes = raw.len(), "Decision candidate received");

            match Self::parse_action(&raw) {
                Ok(action) => {
                    self.history.push(ChatMessage {
                        role: "assistant".into(),
                        content: raw,
                    });
                    return Ok(action);
                }
                Err(reason) => {
                    warn!(attempt, reason = %reason, "Malformed action, retrying");
                    last_error = reason.clone();
                    self.history.push(ChatMessage {
                        role: "user".into(),
                        content: format!(
                            "Your last reply was rejected: {reason}. Reply with exactly one \
                             valid JSON action object."
                        ),
                    });
                }
            }
        }

        Err(DecisionError::MalformedAction {
            attempts: self.retry_budget,
            last_error,
        })
    }

    async fn reflect(&mut self, prompt: &str) -> Result<String, DecisionError> {
        let messages = vec![ChatMessage {
            role: "user".into(),
            content: prompt.to_string(),
        }];
        self.chat(&messages, false)
            .await
            .map_err(|e| DecisionError::ReflectionFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_plain_json() {
        let raw = r#"{"action_type": "wiki_search", "params": {"query": "molting"}}"#;
        let action = OllamaSource::parse_action(raw).unwrap();
        assert_eq!(action.action_type, "wiki_search");
        assert_eq!(action.str_param("query"), Some("molting"));
    }

    #[test]
    fn parse_strips_markdown_fences() {
        let raw = "```json\n{\"action_type\": \"create_post\", \"params\": {}}\n```";
        let action = OllamaSource::parse_action(raw).unwrap();
        assert_eq!(action.action_type, "create_post");
    }

    #[test]
    fn parse_rejects_empty_action_type() {
        let raw = r#"{"action_type": "  ", "params": {}}"#;
        assert!(OllamaSource::parse_action(raw).is_err());
    }

    #[test]
    fn parse_rejects_non_json() {
        assert!(OllamaSource::parse_action("I think I should search the wiki").is_err());
    }

    #[test]
    fn instruction_lists_capabilities() {
        let source = OllamaSource::new("http://localhost:11434", "llama3", "hatchling");
        let caps = CapabilitySet::new(vec![hatchling_core::decision::Capability::new(
            "wiki_search",
            "Search the wiki",
        )]);
        let prompt = source.instruction("CONTEXT", 7, &caps);
        assert!(prompt.contains("wiki_search"));
        assert!(prompt.contains("7 action points"));
        assert!(prompt.contains("CONTEXT"));
    }
}
