use std::fmt::Display;

use rig::{OneOrMany, providers::openai};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageRole {
    #[serde(rename = "system")]
    System,

    #[serde(rename = "user")]
    User,

    #[serde(rename = "assistant")]
    Assistant,
}

impl Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        serde_plain::to_string(self)
            .map_err(|_| std::fmt::Error)?
            .fmt(f)
    }
}

/// One entry of a conversation, in the `{ role, content }` shape chat widgets send.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<ChatMessage> for openai::Message {
    fn from(message: ChatMessage) -> Self {
        match message.role {
            MessageRole::System => openai::Message::system(&message.content),
            MessageRole::User => openai::Message::User {
                content: OneOrMany::one(message.content.into()),
                name: None,
            },
            MessageRole::Assistant => openai::Message::Assistant {
                content: vec![message.content.into()],
                refusal: None,
                audio: None,
                name: None,
                tool_calls: vec![],
            },
        }
    }
}
