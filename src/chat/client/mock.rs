use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;

use crate::chat::message::ChatMessage;

use super::{CompletionBackend, CompletionError, Delta, DeltaStream};

#[derive(Clone, Debug)]
pub enum Script {
    /// Stream these chunks; `Err` entries break the stream with that cause.
    Chunks(Vec<Result<Option<&'static str>, &'static str>>),
    /// Fail before any chunk is produced.
    Refuse(&'static str),
}

/// Scripted backend that records every conversation it is asked to complete.
pub struct MockBackend {
    script: Script,
    calls: Mutex<Vec<(String, Vec<ChatMessage>)>>,
}

impl MockBackend {
    pub fn streaming(chunks: &[&'static str]) -> Self {
        Self::new(Script::Chunks(chunks.iter().map(|c| Ok(Some(*c))).collect()))
    }

    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: Mutex::new(vec![]),
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<ChatMessage>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn create_stream(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<DeltaStream, CompletionError> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), messages));

        match &self.script {
            Script::Refuse(cause) => Err(CompletionError::Transport(cause.to_string())),
            Script::Chunks(chunks) => {
                let items = chunks
                    .iter()
                    .map(|chunk| match chunk {
                        Ok(text) => Ok(Delta {
                            content: text.map(str::to_string),
                        }),
                        Err(cause) => Err(CompletionError::Transport(cause.to_string())),
                    })
                    .collect::<Vec<_>>();

                Ok(futures::stream::iter(items).boxed())
            }
        }
    }
}
