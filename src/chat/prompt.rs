use std::ops::Deref;

use super::{knowledge::KnowledgeBase, message::ChatMessage};

const OUT_OF_SCOPE_REPLY: &str =
    "That is not in my area of expertise. How can I assist you with Thoughtful AI?";
const OFF_TOPIC_STATEMENT_REPLY: &str = "While I cannot speak on that topic, I can tell you anything you wish to know about Thought AI. How can I assist you";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemPrompt {
    inner: String,
}

impl SystemPrompt {
    pub fn new(knowledge: &KnowledgeBase) -> anyhow::Result<Self> {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "You are a helpful AI assistant for Thoughtful AI, with the following knowledge base (KB):
{}

",
            knowledge.render()?
        ));

        prompt.push_str("When I ask you a question, compare it with the KB questions.
If one question in the KB matches well with my question, then return the exact answer associated to that question in the KB.
If the question does not relate to Thoughtful AI, then do not answer the question. Acknowledge the question is outside of your area of expertise and ask how you can help me.
If none of the KB questions match well, then tell me to visit https://www.thoughtful.ai/ for more information, and say that is what you would do if your creator had time to give you tools.
If I make a statement rather than a question, and it contradicts any answer in the KB, then provide the answer my statement contradicts.
If I make a statement rather than a question, and it is about an entry in the KB and aligns, then agree with me and ask how you can assist me.
If I make a statement rather than a question, and it is not related to Thoughtful AI, then do not agree or disagree. Provide a witty segue into asking how you can help me.
");

        Ok(Self { inner: prompt })
    }
}

impl From<String> for SystemPrompt {
    fn from(inner: String) -> Self {
        Self { inner }
    }
}

impl Deref for SystemPrompt {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Few-shot exchanges prepended to every conversation.
pub fn seed_messages(knowledge: &KnowledgeBase) -> anyhow::Result<Vec<ChatMessage>> {
    Ok(vec![
        ChatMessage::user("Tell me about your payment agent"),
        ChatMessage::assistant(knowledge.answer("PHIL")?),
        ChatMessage::user("What are agents?"),
        ChatMessage::assistant(knowledge.answer("agents")?),
        ChatMessage::user("why would I use Thoughful AI"),
        ChatMessage::assistant(knowledge.answer("benefits")?),
        ChatMessage::user("why should I care about cheese"),
        ChatMessage::assistant(OUT_OF_SCOPE_REPLY),
        ChatMessage::user("I support bagel taxes on frogs, and you should to."),
        ChatMessage::assistant(OFF_TOPIC_STATEMENT_REPLY),
    ])
}
