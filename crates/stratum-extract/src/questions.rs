use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use stratum_core::{Metadata, StratumError, TextCompletion, TextNode};

use crate::prompts::{render, QUESTIONS_PROMPT};
use crate::{complete_or_empty, Extractor};

pub const QUESTIONS_KEY: &str = "questionsThisExcerptCanAnswer";

/// Generates questions each node's text can answer.
pub struct QuestionsExtractor {
    model: Arc<dyn TextCompletion>,
    num_questions: usize,
}

impl QuestionsExtractor {
    pub fn new(model: Arc<dyn TextCompletion>) -> Self {
        Self {
            model,
            num_questions: 5,
        }
    }

    pub fn with_num_questions(mut self, num_questions: usize) -> Self {
        self.num_questions = num_questions;
        self
    }

    async fn questions_for(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }
        let prompt = render(QUESTIONS_PROMPT, text)
            .replace("{num_questions}", &self.num_questions.to_string());
        complete_or_empty(self.model.as_ref(), &prompt).await
    }
}

#[async_trait]
impl Extractor for QuestionsExtractor {
    async fn extract(&self, nodes: &[TextNode]) -> Result<Vec<Metadata>, StratumError> {
        let answers: Vec<String> =
            join_all(nodes.iter().map(|node| self.questions_for(&node.text))).await;

        Ok(answers
            .into_iter()
            .map(|questions| {
                let mut fragment = Metadata::new();
                fragment.insert(QUESTIONS_KEY.to_string(), Value::String(questions));
                fragment
            })
            .collect())
    }
}
