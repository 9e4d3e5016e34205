use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use stratum_core::{Metadata, StratumError, TextCompletion, TextNode};

use crate::prompts::{render, SUMMARY_PROMPT};
use crate::{complete_or_empty, Extractor};

pub const SUMMARY_KEY: &str = "sectionSummary";
pub const PREV_SUMMARY_KEY: &str = "prevSectionSummary";
pub const NEXT_SUMMARY_KEY: &str = "nextSectionSummary";

/// Summarizes every node; optionally also records each node's neighbor
/// summaries for consumers that want surrounding context.
pub struct SummaryExtractor {
    model: Arc<dyn TextCompletion>,
    include_neighbors: bool,
}

impl SummaryExtractor {
    pub fn new(model: Arc<dyn TextCompletion>) -> Self {
        Self {
            model,
            include_neighbors: false,
        }
    }

    /// Also write the previous and next node's summaries onto each node.
    pub fn with_neighbors(mut self) -> Self {
        self.include_neighbors = true;
        self
    }

    async fn summarize(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }
        let prompt = render(SUMMARY_PROMPT, text);
        complete_or_empty(self.model.as_ref(), &prompt).await
    }
}

#[async_trait]
impl Extractor for SummaryExtractor {
    async fn extract(&self, nodes: &[TextNode]) -> Result<Vec<Metadata>, StratumError> {
        let summaries: Vec<String> =
            join_all(nodes.iter().map(|node| self.summarize(&node.text))).await;

        let mut fragments = vec![Metadata::new(); nodes.len()];
        for (index, summary) in summaries.iter().enumerate() {
            fragments[index].insert(SUMMARY_KEY.to_string(), Value::String(summary.clone()));
            if self.include_neighbors {
                if index > 0 && !summaries[index - 1].is_empty() {
                    fragments[index].insert(
                        PREV_SUMMARY_KEY.to_string(),
                        Value::String(summaries[index - 1].clone()),
                    );
                }
                if index + 1 < summaries.len() && !summaries[index + 1].is_empty() {
                    fragments[index].insert(
                        NEXT_SUMMARY_KEY.to_string(),
                        Value::String(summaries[index + 1].clone()),
                    );
                }
            }
        }
        Ok(fragments)
    }
}
