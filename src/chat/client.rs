use async_trait::async_trait;
use futures::stream::BoxStream;

use super::message::ChatMessage;

#[cfg(test)]
pub mod mock;
mod providers;

pub use providers::{OpenAIBackend, SamplingSettings};

/// One incremental fragment of a streamed completion. Chunks without text
/// (role announcements, tool calls, keep-alives) carry `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Delta {
    pub content: Option<String>,
}

impl Delta {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
        }
    }

    pub fn empty() -> Self {
        Self { content: None }
    }
}

pub type DeltaStream = BoxStream<'static, Result<Delta, CompletionError>>;

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error(transparent)]
    Provider(#[from] rig::completion::CompletionError),

    #[error("conversation has no user prompt to complete")]
    MissingPrompt,

    #[error("{0}")]
    Transport(String),
}

/// Anything that can turn an ordered message list into a stream of deltas.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn create_stream(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<DeltaStream, CompletionError>;
}
