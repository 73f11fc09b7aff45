use std::time::Duration;

use anyhow::Context;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::model::history::{HistoryBuffer, MAX_HISTORY};
use crate::model::message::HistoryEntry;

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 1024;

/// Shown to the player whenever inference fails. Contains no extraction
/// vocabulary, so it never mutates the game state.
pub const DEGRADED_NARRATIVE: &str = "The arcane connection wavers... (Temporary disturbance)";

/// Why an inference call degraded. Diagnostic only; the player just sees
/// [`DEGRADED_NARRATIVE`].
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed response body: {0}")]
    MalformedBody(String),

    #[error("response contained no narrative")]
    EmptyContent,
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            InferenceError::Transport(format!("request timed out: {err}"))
        } else {
            InferenceError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl From<&HistoryEntry> for ChatMessage {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            role: entry.role.as_str().into(),
            content: entry.content.clone(),
        }
    }
}

#[derive(Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: ChatMessageResponse,
}

#[derive(Deserialize)]
pub struct ChatMessageResponse {
    pub content: Option<String>,
}

/// Status and body of an HTTP exchange, before any interpretation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// The opaque boundary to the completion provider: one request out, one
/// raw response back.
pub trait ChatTransport {
    fn post(&self, request: &ChatCompletionRequest) -> Result<RawResponse, InferenceError>;
}

pub struct HttpTransport {
    http: Client,
    api_url: String,
    api_key: String,
}

impl HttpTransport {
    /// `timeout` of `None` leaves the request unbounded.
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            api_url: api_url.into(),
            api_key: api_key.into(),
        })
    }
}

impl ChatTransport for HttpTransport {
    fn post(&self, request: &ChatCompletionRequest) -> Result<RawResponse, InferenceError> {
        let resp = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()?;

        let status = resp.status().as_u16();
        let body = resp.text()?;

        Ok(RawResponse { status, body })
    }
}

/// Outcome of one inference call. Never an error from the caller's side.
#[derive(Debug)]
pub enum Completion {
    Narrative(String),
    Degraded(InferenceError),
}

impl Completion {
    pub fn text(&self) -> &str {
        match self {
            Completion::Narrative(text) => text,
            Completion::Degraded(_) => DEGRADED_NARRATIVE,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Completion::Degraded(_))
    }
}

pub struct InferenceClient<T> {
    transport: T,
    model: String,
}

impl<T: ChatTransport> InferenceClient<T> {
    pub fn new(transport: T, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }

    /// Sends the system prompt, the trailing history window and the new
    /// input as a single request.
    ///
    /// On success the exchange is appended to `history`. On any failure the
    /// history is left alone and the degraded narrative is returned instead.
    /// Never retries.
    pub fn complete(
        &self,
        system_prompt: &str,
        history: &mut HistoryBuffer,
        user_input: &str,
    ) -> Completion {
        let window = history.windowed(MAX_HISTORY);
        let request = self.build_request(system_prompt, window, user_input);

        match self.request_narrative(&request) {
            Ok(narrative) => {
                let sent = window.len();
                history.push_exchange(user_input, &narrative);
                debug!(
                    window = sent,
                    stored = history.len(),
                    chars = narrative.len(),
                    "inference succeeded"
                );
                Completion::Narrative(narrative)
            }
            Err(err) => Completion::Degraded(err),
        }
    }

    pub fn build_request(
        &self,
        system_prompt: &str,
        window: &[HistoryEntry],
        user_input: &str,
    ) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(window.len() + 2);
        messages.push(ChatMessage {
            role: "system".into(),
            content: system_prompt.to_string(),
        });
        messages.extend(window.iter().map(ChatMessage::from));
        messages.push(ChatMessage {
            role: "user".into(),
            content: user_input.to_string(),
        });

        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }

    fn request_narrative(&self, request: &ChatCompletionRequest) -> Result<String, InferenceError> {
        let raw = self.transport.post(request)?;

        if !(200..300).contains(&raw.status) {
            return Err(InferenceError::Api {
                status: raw.status,
                body: raw.body,
            });
        }

        let resp: ChatCompletionResponse = serde_json::from_str(&raw.body)
            .map_err(|e| InferenceError::MalformedBody(e.to_string()))?;

        let content = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| InferenceError::MalformedBody("no choices".into()))?
            .message
            .content
            .ok_or_else(|| InferenceError::MalformedBody("choice has no content".into()))?;

        if content.trim().is_empty() {
            return Err(InferenceError::EmptyContent);
        }

        Ok(content)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedTransport;
    use super::*;

    fn client(transport: ScriptedTransport) -> InferenceClient<ScriptedTransport> {
        InferenceClient::new(transport, "test-model")
    }

    #[test]
    fn success_returns_narrative_and_records_exchange() {
        let client = client(ScriptedTransport::new().narrative("You enter a dark cave."));
        let mut history = HistoryBuffer::new();

        let completion = client.complete("system", &mut history, "go north");

        assert!(!completion.is_degraded());
        assert_eq!(completion.text(), "You enter a dark cave.");
        assert_eq!(history.len(), 2);
        assert_eq!(history.windowed(2)[0], HistoryEntry::user("go north"));
        assert_eq!(
            history.windowed(2)[1],
            HistoryEntry::assistant("You enter a dark cave.")
        );
    }

    #[test]
    fn request_is_system_then_window_then_input() {
        let transport = ScriptedTransport::new().narrative("ok");
        let requests = transport.requests();
        let client = client(transport);

        let mut history = HistoryBuffer::new();
        history.push_exchange("look", "A village square.");

        client.complete("be a DM", &mut history, "talk to the smith");

        let sent = requests.borrow();
        assert_eq!(sent.len(), 1);
        let req = &sent[0];
        assert_eq!(req.model, "test-model");
        assert_eq!(req.temperature, 0.7);
        assert_eq!(req.max_tokens, 1024);

        let roles: Vec<&str> = req.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(req.messages[0].content, "be a DM");
        assert_eq!(req.messages[1].content, "look");
        assert_eq!(req.messages[3].content, "talk to the smith");
    }

    #[test]
    fn only_the_trailing_window_is_sent() {
        let transport = ScriptedTransport::new().narrative("ok");
        let requests = transport.requests();
        let client = client(transport);

        let mut history = HistoryBuffer::new();
        for i in 0..15 {
            history.push_exchange(&format!("action {i}"), &format!("reply {i}"));
        }

        client.complete("system", &mut history, "next");

        let sent = requests.borrow();
        let messages = &sent[0].messages;
        assert_eq!(messages.len(), MAX_HISTORY + 2);
        assert_eq!(messages[1].content, "action 5");
        assert_eq!(messages[MAX_HISTORY].content, "reply 14");
    }

    #[test]
    fn transport_failure_degrades_without_touching_history() {
        let client = client(
            ScriptedTransport::new().reply(Err(InferenceError::Transport("dns".into()))),
        );
        let mut history = HistoryBuffer::new();
        history.push_exchange("look", "A forest.");

        let completion = client.complete("system", &mut history, "go");

        assert!(matches!(completion, Completion::Degraded(InferenceError::Transport(_))));
        assert_eq!(completion.text(), DEGRADED_NARRATIVE);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn non_success_status_degrades() {
        let client = client(ScriptedTransport::new().reply(Ok(RawResponse {
            status: 401,
            body: "invalid api key".into(),
        })));
        let mut history = HistoryBuffer::new();

        let completion = client.complete("system", &mut history, "go");

        assert!(matches!(
            completion,
            Completion::Degraded(InferenceError::Api { status: 401, .. })
        ));
        assert!(history.is_empty());
    }

    #[test]
    fn malformed_bodies_degrade() {
        for body in ["not json", r#"{"choices": []}"#, r#"{"choices": [{"message": {}}]}"#] {
            let client = client(ScriptedTransport::new().reply(Ok(RawResponse {
                status: 200,
                body: body.into(),
            })));
            let mut history = HistoryBuffer::new();

            let completion = client.complete("system", &mut history, "go");

            assert!(
                matches!(completion, Completion::Degraded(InferenceError::MalformedBody(_))),
                "body {body:?} should be malformed"
            );
            assert!(history.is_empty());
        }
    }

    #[test]
    fn blank_content_degrades() {
        let client = client(ScriptedTransport::new().narrative("  \n\t "));
        let mut history = HistoryBuffer::new();

        let completion = client.complete("system", &mut history, "go");

        assert!(matches!(completion, Completion::Degraded(InferenceError::EmptyContent)));
        assert_eq!(completion.text(), DEGRADED_NARRATIVE);
        assert!(history.is_empty());
    }

    #[test]
    fn each_call_sends_exactly_one_request() {
        let transport = ScriptedTransport::new();
        let requests = transport.requests();
        let client = client(transport);
        let mut history = HistoryBuffer::new();

        client.complete("system", &mut history, "go");

        assert_eq!(requests.borrow().len(), 1);
    }
}
