use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use stratum_core::{Metadata, StratumError, TextCompletion, TextNode};

use crate::prompts::{render, KEYWORDS_PROMPT};
use crate::{complete_or_empty, Extractor};

pub const KEYWORDS_KEY: &str = "excerptKeywords";

/// Extracts unique keywords from every node.
pub struct KeywordExtractor {
    model: Arc<dyn TextCompletion>,
    num_keywords: usize,
}

impl KeywordExtractor {
    pub fn new(model: Arc<dyn TextCompletion>) -> Self {
        Self {
            model,
            num_keywords: 5,
        }
    }

    pub fn with_num_keywords(mut self, num_keywords: usize) -> Self {
        self.num_keywords = num_keywords;
        self
    }

    async fn keywords_for(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }
        let prompt = render(KEYWORDS_PROMPT, text)
            .replace("{num_keywords}", &self.num_keywords.to_string());
        complete_or_empty(self.model.as_ref(), &prompt).await
    }
}

#[async_trait]
impl Extractor for KeywordExtractor {
    async fn extract(&self, nodes: &[TextNode]) -> Result<Vec<Metadata>, StratumError> {
        let keywords: Vec<String> =
            join_all(nodes.iter().map(|node| self.keywords_for(&node.text))).await;

        Ok(keywords
            .into_iter()
            .map(|extracted| {
                let mut fragment = Metadata::new();
                fragment.insert(KEYWORDS_KEY.to_string(), Value::String(extracted));
                fragment
            })
            .collect())
    }
}
