//! Response assembly.
//!
//! [`Assistant`] ties the pieces of the retrieval flow together: detect the
//! year, load that year's knowledge, score it, and fall back to a search
//! across all years when the targeted lookup comes up empty.

use std::sync::Arc;

use crate::config::Config;
use crate::knowledge::{FsKnowledgeBase, KnowledgeSource};
use crate::models::{Answer, Question, Year};
use crate::scorer::Scorer;
use crate::year::detect_year;

/// Reply for a blank or missing question.
pub const EMPTY_QUESTION_MESSAGE: &str = "Please enter a question.";

/// Answers questions from a [`KnowledgeSource`].
///
/// Holds no mutable state; one instance is shared by all requests.
pub struct Assistant {
    source: Arc<dyn KnowledgeSource>,
    scorer: Scorer,
    fallback_message: String,
}

impl Assistant {
    pub fn new(
        source: Arc<dyn KnowledgeSource>,
        scorer: Scorer,
        fallback_message: String,
    ) -> Self {
        Self {
            source,
            scorer,
            fallback_message,
        }
    }

    /// Builds an assistant over the filesystem knowledge base named in `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(FsKnowledgeBase::new(&config.knowledge.root)),
            Scorer::from_config(&config.answer),
            config.answer.fallback_message.clone(),
        )
    }

    pub fn answer(&self, question: &Question) -> Answer {
        let q = question.as_str();
        let detected = detect_year(q);

        if let Some(year) = detected {
            let doc = self.source.load(year);
            if !doc.is_empty() {
                let text = self.scorer.find_relevant_answer(q, &doc.content);
                if !text.is_empty() {
                    return self.log(detected, Answer::Year { year, text });
                }
            }
        }

        let blocks: Vec<(Year, String)> = Year::ALL
            .into_iter()
            .filter_map(|year| {
                let doc = self.source.load(year);
                if doc.is_empty() {
                    return None;
                }
                let text = self.scorer.find_relevant_answer(q, &doc.content);
                (!text.is_empty()).then_some((year, text))
            })
            .collect();

        let answer = if blocks.is_empty() {
            Answer::Fallback(self.fallback_message.clone())
        } else {
            Answer::Global(blocks)
        };
        self.log(detected, answer)
    }

    fn log(&self, detected: Option<Year>, answer: Answer) -> Answer {
        tracing::debug!(
            detected_year = detected.map(Year::number).unwrap_or(0),
            kind = answer.kind(),
            "answered question"
        );
        answer
    }
}
