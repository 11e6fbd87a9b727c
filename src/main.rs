use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use chat::{
    Chatbot, ChatbotConfig,
    client::{OpenAIBackend, SamplingSettings},
};
use colored::Colorize;
use config::store::ChatBotConfig;
use utils::log::Logger;
use web::WebServer;

mod chat;
mod config;
mod utils;
mod web;

const API_KEY_ENV: &str = "OPENAI_API_KEY";
const CONFIG_PATH_ENV: &str = "CHATBOT_CONFIG";

#[tokio::main]
async fn main() {
    if let Err(why) = run().await {
        eprintln!("{} {why:#}", "[ERROR] Startup failed:".red().bold());
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // a missing .env is fine, the variable may come from the shell
    let _ = dotenvy::dotenv();

    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string());
    let config = ChatBotConfig::read(PathBuf::from(path))?;

    Logger::init(config.log_level)?;
    if config.created() {
        log::info!("no config found, wrote defaults to {}", config.path.display());
    }

    let key = api_key(std::env::var(API_KEY_ENV).ok())?;

    let backend = OpenAIBackend::new(
        &key,
        config.llm.base_url.as_deref(),
        SamplingSettings {
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
        },
    )?;

    let chatbot_config = ChatbotConfig::thoughtful(&config.llm.model, config.validation.max_length)
        .context("failed to build the chatbot prompt")?;
    let chatbot = Chatbot::new(chatbot_config, Arc::new(backend));

    WebServer::new(chatbot, config.server.clone()).run().await
}

/// The OpenAI credential. Unset and blank are the same failure.
fn api_key(var: Option<String>) -> anyhow::Result<String> {
    var.filter(|key| !key.trim().is_empty())
        .with_context(|| format!("{API_KEY_ENV} environment variable not set."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_blank_key_is_fatal() {
        for var in [None, Some(String::new()), Some("   \t".to_string())] {
            let err = api_key(var.clone()).unwrap_err();
            assert_eq!(
                err.to_string(),
                "OPENAI_API_KEY environment variable not set.",
                "{var:?}"
            );
        }
    }

    #[test]
    fn present_key_is_used_as_is() {
        assert_eq!(api_key(Some("sk-live".to_string())).unwrap(), "sk-live");
    }
}
