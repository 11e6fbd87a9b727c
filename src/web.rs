use anyhow::Context;
use tokio::net::TcpListener;

use crate::{chat::Chatbot, config::structure::ServerConfig};

mod routes;

/// Serves the chat widget and its streaming API.
pub struct WebServer {
    chatbot: Chatbot,
    server: ServerConfig,
}

impl WebServer {
    pub fn new(chatbot: Chatbot, server: ServerConfig) -> Self {
        Self { chatbot, server }
    }

    /// Binds, optionally opens a browser on the widget, and serves until the process stops.
    pub async fn run(self) -> anyhow::Result<()> {
        let WebServer { chatbot, server } = self;

        let listener = TcpListener::bind((server.host.as_str(), server.port))
            .await
            .with_context(|| format!("failed to bind {}:{}", server.host, server.port))?;

        let url = format!("http://{}", listener.local_addr()?);
        log::info!("chat widget listening on {url} (model {})", chatbot.config().model());

        if server.open_browser {
            if let Err(why) = webbrowser::open(&url) {
                log::warn!("could not open a browser on {url}: {why}");
            }
        }

        axum::serve(listener, routes::router(chatbot))
            .await
            .context("server stopped unexpectedly")
    }
}
