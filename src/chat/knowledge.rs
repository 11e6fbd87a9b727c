use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub question: String,
    pub answer: String,
}

/// Canonical question/answer pairs the assistant is scoped to.
///
/// Entries keep their insertion order so the rendered prompt is stable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnowledgeBase {
    entries: IndexMap<String, KnowledgeEntry>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(
        mut self,
        key: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        self.entries.insert(
            key.into(),
            KnowledgeEntry {
                question: question.into(),
                answer: answer.into(),
            },
        );
        self
    }

    /// The Thoughtful AI knowledge base the demo ships with.
    pub fn thoughtful() -> Self {
        Self::new()
            .with_entry(
                "EVA",
                "What does the eligibility verification agent (EVA) do?",
                "EVA automates the process of verifying a patient’s eligibility and benefits information in real-time, eliminating manual data entry errors and reducing claim rejections.",
            )
            .with_entry(
                "CAM",
                "What does the claims processing agent (CAM) do?",
                "CAM streamlines the submission and management of claims, improving accuracy, reducing manual intervention, and accelerating reimbursements.",
            )
            .with_entry(
                "PHIL",
                "How does the payment posting agent (PHIL) work?",
                "PHIL automates the posting of payments to patient accounts, ensuring fast, accurate reconciliation of payments and reducing administrative burden.",
            )
            .with_entry(
                "agents",
                "Tell me about Thoughtful AI's Agents.",
                "Thoughtful AI provides a suite of AI-powered automation agents designed to streamline healthcare processes. These include Eligibility Verification (EVA), Claims Processing (CAM), and Payment Posting (PHIL), among others.",
            )
            .with_entry(
                "benefits",
                "What are the benefits of using Thoughtful AI's agents?",
                "Using Thoughtful AI's Agents can significantly reduce administrative costs, improve operational efficiency, and reduce errors in critical processes like claims management and payment posting.",
            )
    }

    pub fn get(&self, key: &str) -> Option<&KnowledgeEntry> {
        self.entries.get(key)
    }

    /// Looks up an answer, failing with the missing key so prompt construction can bail.
    pub fn answer(&self, key: &str) -> anyhow::Result<&str> {
        self.get(key)
            .map(|entry| entry.answer.as_str())
            .ok_or_else(|| anyhow::anyhow!("knowledge base has no entry for \"{key}\""))
    }

    /// Textual form interpolated into the system prompt.
    pub fn render(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thoughtful_entries_keep_their_order() {
        let kb = KnowledgeBase::thoughtful();

        assert_eq!(
            kb.entries.keys().collect::<Vec<_>>(),
            vec!["EVA", "CAM", "PHIL", "agents", "benefits"]
        );
    }

    #[test]
    fn answer_reports_missing_keys() {
        let kb = KnowledgeBase::thoughtful();

        assert!(kb.answer("PHIL").unwrap().starts_with("PHIL automates"));

        let err = kb.answer("BOB").unwrap_err();
        assert!(err.to_string().contains("BOB"));
    }

    #[test]
    fn render_includes_every_question_and_answer() {
        let kb = KnowledgeBase::thoughtful();
        let rendered = kb.render().unwrap();

        for (key, entry) in &kb.entries {
            assert!(rendered.contains(&format!("\"{key}\"")));
            assert!(rendered.contains(&entry.question));
            assert!(rendered.contains(&entry.answer));
        }

        // first key rendered first
        assert!(rendered.find("\"EVA\"").unwrap() < rendered.find("\"benefits\"").unwrap());
    }
}
