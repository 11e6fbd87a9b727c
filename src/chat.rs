pub mod client;
mod engine;
mod knowledge;
mod message;
mod prompt;
mod validate;

pub use engine::{Chatbot, ChatbotConfig};
pub use message::ChatMessage;
#[cfg(test)]
pub use prompt::SystemPrompt;
pub use validate::DEFAULT_MAX_LENGTH;
