use serde::{Deserialize, Serialize};
use std::fmt;

/// Conversational role. The only two roles accepted downstream are `user`
/// and `assistant`; deserialization is total and coerces anything else to
/// `user` so a turn sequence can never produce an ill-formed provider
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Coercing deserializer: unknown role strings become `user` rather than
// being dropped or rejected
impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(de: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(de)?;
        Ok(match s.to_ascii_lowercase().as_str() {
            "assistant" => Role::Assistant,
            "user" => Role::User,
            other => {
                tracing::warn!("coercing unrecognized role '{other}' to user");
                Role::User
            }
        })
    }
}

/// One message in a conversation. Immutable once created; insertion order is
/// conversational order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// Provider wire message format. Some providers omit `role` on response
// messages, so it is defaultable on the way in; requests always set it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: String,
    pub content: String,
}

// Provider request format. Constructed fresh per call, never persisted.
#[derive(Debug, Serialize, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// The two documented provider success shapes, modeled as an explicit
/// variant type so normalization is a single total mapping instead of shape
/// sniffing at call sites.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProviderPayload {
    /// Messages-style payload: the text lives at `content[0].text`
    Blocks { content: Vec<ContentBlock> },
    /// Chat-completions-style payload: the text lives at
    /// `choices[0].message.content`
    Choices { choices: Vec<ChatChoice> },
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}
