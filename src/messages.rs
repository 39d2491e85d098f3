//! Message types shared by all providers
//!
//! A conversation is an ordered list of [`Message`]s, each carrying a role and
//! an ordered list of [`ContentItem`]s. Providers turn it into their own wire
//! format and answer with a stream of [`ResponseChunk`]s.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Message role in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Developer,
}

impl Role {
    /// Wire name of the role
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Developer => "developer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image reference carried by an `image_url` content item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Content item in a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentItem {
    /// Create a text item
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create an image reference item
    #[must_use]
    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }

    /// Type tag as it appears on the wire
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::ImageUrl { .. } => "image_url",
        }
    }
}

/// A single message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentItem>,
}

impl Message {
    /// Create a message with a single text item
    #[must_use]
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![ContentItem::text(text)],
        }
    }

    /// Create a new user message
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Create a new assistant message
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    /// Create a new system message
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }
}

/// Kind of incremental output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    Assistant,
    Thinking,
}

/// A unit of incremental model output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseChunk {
    #[serde(rename = "type")]
    pub kind: ChunkKind,
    pub content: String,
}

impl ResponseChunk {
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            kind: ChunkKind::Assistant,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn thinking(content: impl Into<String>) -> Self {
        Self {
            kind: ChunkKind::Thinking,
            content: content.into(),
        }
    }
}

/// Generated image payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResponseChunk {
    pub b64_data: String,
}

/// What the host is asking the provider to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    Chat,
    Edit,
    Complete,
    Image,
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Chat => "chat",
            Self::Edit => "edit",
            Self::Complete => "complete",
            Self::Image => "image",
        };
        f.write_str(name)
    }
}
