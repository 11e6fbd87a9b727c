use std::sync::Arc;

use async_stream::stream;
use futures::{StreamExt, stream::BoxStream};
use serde_json::Value;

use super::{
    client::{CompletionBackend, CompletionError},
    knowledge::KnowledgeBase,
    message::ChatMessage,
    prompt::{SystemPrompt, seed_messages},
    validate::{ValidationError, validate_value},
};

/// Identity of a configured chatbot. Fixed once built; reconfiguring means
/// building a new one.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatbotConfig {
    model: String,
    system_prompt: SystemPrompt,
    seed_messages: Vec<ChatMessage>,
    max_input_length: usize,
}

impl ChatbotConfig {
    pub fn new(
        model: impl Into<String>,
        system_prompt: SystemPrompt,
        seed_messages: Vec<ChatMessage>,
        max_input_length: usize,
    ) -> Self {
        Self {
            model: model.into(),
            system_prompt,
            seed_messages,
            max_input_length,
        }
    }

    /// The Thoughtful AI assistant: knowledge base prompt plus its seed exchanges.
    pub fn thoughtful(model: impl Into<String>, max_input_length: usize) -> anyhow::Result<Self> {
        let knowledge = KnowledgeBase::thoughtful();

        Ok(Self::new(
            model,
            SystemPrompt::new(&knowledge)?,
            seed_messages(&knowledge)?,
            max_input_length,
        ))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn system_prompt(&self) -> &SystemPrompt {
        &self.system_prompt
    }

    pub fn seed_messages(&self) -> &[ChatMessage] {
        &self.seed_messages
    }

    pub fn max_input_length(&self) -> usize {
        self.max_input_length
    }
}

/// Ways a turn can end early; `Display` is what the chat widget shows.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("[ERROR] Failed to get response from OpenAI: {0}")]
    Invocation(#[source] CompletionError),

    #[error("[ERROR] Error while streaming response: {0}")]
    Stream(#[source] CompletionError),
}

/// System prompt, seeds, caller history, then the new user turn. Never
/// reorders, dedups or truncates.
pub fn assemble(
    user_prompt: &str,
    history: &[ChatMessage],
    config: &ChatbotConfig,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(config.seed_messages.len() + history.len() + 2);

    messages.push(ChatMessage::system(config.system_prompt.to_string()));
    messages.extend_from_slice(&config.seed_messages);
    messages.extend_from_slice(history);
    messages.push(ChatMessage::user(user_prompt));

    messages
}

#[derive(Clone)]
pub struct Chatbot {
    config: Arc<ChatbotConfig>,
    backend: Arc<dyn CompletionBackend>,
}

impl Chatbot {
    pub fn new(config: ChatbotConfig, backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            config: Arc::new(config),
            backend,
        }
    }

    pub fn config(&self) -> &ChatbotConfig {
        &self.config
    }

    /// Runs one turn. Every item is the full reply so far, never a diff; the
    /// last item is the turn's final text. Nothing survives between turns.
    pub fn chat(
        &self,
        prompt: impl Into<Value>,
        history: Vec<ChatMessage>,
    ) -> BoxStream<'static, String> {
        let Self { config, backend } = self.clone();
        let prompt = prompt.into();

        let turn = stream! {
            let prompt = match validate_value(&prompt, config.max_input_length) {
                Ok(prompt) => prompt.to_string(),
                Err(why) => {
                    log::info!("turn rejected: {why}");
                    yield ChatError::from(why).to_string();
                    return;
                }
            };

            let messages = assemble(&prompt, &history, &config);
            log::info!(
                "sending turn to {} ({} messages, {} from history)",
                config.model,
                messages.len(),
                history.len()
            );

            let mut deltas = match backend.create_stream(&config.model, messages).await {
                Ok(deltas) => deltas,
                Err(why) => {
                    let message = ChatError::Invocation(why).to_string();
                    log::error!("{message}");
                    yield message;
                    return;
                }
            };

            let mut response = String::new();
            while let Some(chunk) = deltas.next().await {
                match chunk {
                    Ok(delta) => {
                        response.push_str(delta.content.as_deref().unwrap_or_default());
                        yield response.clone();
                    }
                    Err(why) => {
                        // partial text is dropped, the error replaces it
                        let message = ChatError::Stream(why).to_string();
                        log::error!("{message}");
                        yield message;
                        return;
                    }
                }
            }

            log::info!("turn completed ({} chars)", response.chars().count());
        };

        turn.boxed()
    }
}
