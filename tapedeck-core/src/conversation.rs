//! Chat requests and their conversion into agent input.
//!
//! Clients send the running conversation as `[role, content]` pairs. Roles are
//! mapped permissively: anything that is not recognised as the assistant is
//! treated as the human side.

use serde::{Deserialize, Serialize};

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Ai,
}

impl Role {
    /// Map a client-supplied role name.
    ///
    /// `human`/`user` and `assistant`/`ai` are recognised; any other role
    /// falls back to [`Role::Human`].
    pub fn from_chat_role(role: &str) -> Self {
        match role {
            "human" | "user" => Role::Human,
            "assistant" | "ai" => Role::Ai,
            other => {
                log::debug!("unrecognised chat role '{}', treating as human", other);
                Role::Human
            }
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Human => write!(f, "human"),
            Role::Ai => write!(f, "ai"),
        }
    }
}

/// One part of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    /// Text content
    Text { text: String },
    /// Image referenced by URL (including `data:` URLs)
    ImageUrl { url: String },
}

/// A message in the agent's input history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<Content>,
}

impl Message {
    /// Create a human message with text content
    pub fn human(text: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: vec![Content::Text { text: text.into() }],
        }
    }

    /// Create an AI message with text content
    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            content: vec![Content::Text { text: text.into() }],
        }
    }

    /// Create a human message carrying a base64-encoded PNG
    pub fn png_image(base64: &str) -> Self {
        Self {
            role: Role::Human,
            content: vec![Content::ImageUrl {
                url: format!("data:image/png;base64,{}", base64),
            }],
        }
    }

    /// Concatenated text parts of this message
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                Content::Text { text } => Some(text.as_str()),
                Content::ImageUrl { .. } => None,
            })
            .collect()
    }
}

/// Request body sent by a chat client.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The new user message.
    pub input: String,
    /// Prior conversation as `[role, content]` pairs, oldest first.
    #[serde(default)]
    pub chat_history: Vec<(String, String)>,
    /// Optional base64-encoded PNG attachment.
    #[serde(default)]
    pub file: Option<String>,
}

impl ChatRequest {
    /// A request with no history and no attachment.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            chat_history: Vec::new(),
            file: None,
        }
    }

    /// Add a history entry.
    pub fn with_history(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.chat_history.push((role.into(), content.into()));
        self
    }

    /// Attach a base64-encoded PNG.
    pub fn with_file(mut self, base64: impl Into<String>) -> Self {
        self.file = Some(base64.into());
        self
    }
}

/// What the producer receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentInput {
    /// The new user message.
    pub input: String,
    /// Converted history, with any attachment as the last entry.
    pub chat_history: Vec<Message>,
}

impl AgentInput {
    /// Input with an empty history.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            chat_history: Vec::new(),
        }
    }
}

impl From<ChatRequest> for AgentInput {
    fn from(request: ChatRequest) -> Self {
        let mut chat_history = convert_chat_history(&request.chat_history);
        if let Some(file) = request.file.as_deref() {
            chat_history.push(Message::png_image(file));
        }
        Self {
            input: request.input,
            chat_history,
        }
    }
}

/// Convert `[role, content]` pairs into messages, preserving order.
pub fn convert_chat_history(history: &[(String, String)]) -> Vec<Message> {
    history
        .iter()
        .map(|(role, content)| match Role::from_chat_role(role) {
            Role::Human => Message::human(content.as_str()),
            Role::Ai => Message::ai(content.as_str()),
        })
        .collect()
}
