use anyhow::Context;
use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use rig::{completion::CompletionError as ProviderError, providers::openai};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::chat::message::{ChatMessage, MessageRole};

use super::{CompletionBackend, CompletionError, Delta, DeltaStream};

const OPENAI_API_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SamplingSettings {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u64>,
}

/// Streams chat completions from OpenAI (or any OpenAI-compatible endpoint).
#[derive(Clone)]
pub struct OpenAIBackend {
    http: reqwest::Client,
    base_url: String,
    settings: SamplingSettings,
}

impl OpenAIBackend {
    pub fn new(
        api_key: &str,
        base_url: Option<&str>,
        settings: SamplingSettings,
    ) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .context("API key is not a valid header value")?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("failed to build the OpenAI HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url
                .unwrap_or(OPENAI_API_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            settings,
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAIBackend {
    async fn create_stream(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<DeltaStream, CompletionError> {
        let body = request_body(model, messages, self.settings)?;

        log::debug!("streaming completion from {model} via {}", self.base_url);

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(ProviderError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.map_err(ProviderError::from)?;
            return Err(ProviderError::ProviderError(format!("{status}: {text}")).into());
        }

        let deltas = stream! {
            let mut body = response.bytes_stream();
            let mut buffer = Vec::new();
            let mut finished = false;

            while let Some(chunk) = body.next().await {
                match chunk {
                    Ok(bytes) => buffer.extend_from_slice(&bytes),
                    Err(why) => {
                        yield Err(CompletionError::from(ProviderError::from(why)));
                        return;
                    }
                }

                for line in drain_lines(&mut buffer) {
                    match parse_event(&line) {
                        None => {}
                        Some(Ok(Event::Done)) => return,
                        Some(Ok(Event::Delta { delta, last })) => {
                            finished |= last;
                            yield Ok(delta);
                        }
                        Some(Err(why)) => {
                            yield Err(why);
                            return;
                        }
                    }
                }
            }

            if !finished {
                yield Err(CompletionError::Transport(
                    "connection closed before the response finished".to_string(),
                ));
            }
        };

        Ok(deltas.boxed())
    }
}

/// Chat completion body for an assembled conversation. The conversation has to
/// end with the user turn being answered.
fn request_body(
    model: &str,
    messages: Vec<ChatMessage>,
    settings: SamplingSettings,
) -> Result<Value, CompletionError> {
    if !matches!(messages.last(), Some(last) if last.role == MessageRole::User) {
        return Err(CompletionError::MissingPrompt);
    }

    let messages = messages
        .into_iter()
        .map(openai::Message::from)
        .collect::<Vec<_>>();

    let mut body = json!({
        "model": model,
        "messages": messages,
        "stream": true,
    });

    // only sent when configured, some models reject them
    if let Some(temperature) = settings.temperature {
        body["temperature"] = json!(temperature);
    }
    if let Some(max_tokens) = settings.max_tokens {
        body["max_tokens"] = json!(max_tokens);
    }

    Ok(body)
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: ChoiceDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChoiceDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, PartialEq)]
enum Event {
    Delta { delta: Delta, last: bool },
    Done,
}

/// Takes every complete line out of `buffer`, leaving a trailing partial line
/// for the next chunk.
fn drain_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut lines = vec![];

    while let Some(end) = buffer.iter().position(|byte| *byte == b'\n') {
        let line = buffer.drain(..=end).collect::<Vec<_>>();
        let line = String::from_utf8_lossy(&line);
        lines.push(line.trim_end_matches(['\n', '\r']).to_string());
    }

    lines
}

/// One server-sent line. Comments, blank lines and other fields yield nothing.
fn parse_event(line: &str) -> Option<Result<Event, CompletionError>> {
    let data = line.strip_prefix("data:")?.trim_start();

    if data == "[DONE]" {
        return Some(Ok(Event::Done));
    }

    let chunk = match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => chunk,
        Err(why) => return Some(Err(ProviderError::from(why).into())),
    };

    if let Some(error) = chunk.error {
        return Some(Err(ProviderError::ProviderError(error.message).into()));
    }

    let choice = chunk.choices.into_iter().next();
    let last = choice
        .as_ref()
        .is_some_and(|choice| choice.finish_reason.is_some());
    let delta = match choice.and_then(|choice| choice.delta.content) {
        Some(text) => Delta::text(text),
        None => Delta::empty(),
    };

    Some(Ok(Event::Delta { delta, last }))
}
