use axum::{
    Json, Router,
    extract::State,
    response::{
        Html,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures::{Stream, StreamExt, stream};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::chat::{ChatMessage, Chatbot};

#[derive(Clone)]
struct AppState {
    chatbot: Chatbot,
}

pub fn router(chatbot: Chatbot) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/chat", post(chat))
        .with_state(AppState { chatbot })
}

async fn index() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "model": state.chatbot.config().model(),
    }))
}

/// `message` stays untyped so non-string input reaches validation instead of
/// being rejected by the extractor.
#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Value,
    #[serde(default)]
    history: Vec<ChatMessage>,
}

/// One `message` event per update carrying the full reply so far, then `done`.
async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let updates = state
        .chatbot
        .chat(req.message, req.history)
        .map(|text| Event::default().json_data(json!({ "text": text })))
        .chain(stream::once(async {
            Ok(Event::default().event("done").data(""))
        }));

    Sse::new(updates).keep_alive(KeepAlive::default())
}
