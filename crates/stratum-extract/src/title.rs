use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use stratum_core::{Metadata, StratumError, TextCompletion, TextNode};

use crate::prompts::{render, TITLE_CANDIDATE_PROMPT, TITLE_COMBINE_PROMPT};
use crate::{complete_or_empty, Extractor};

/// Metadata key written by [`TitleExtractor`].
pub const TITLE_KEY: &str = "documentTitle";

/// Computes one title per source group and writes it onto every node of
/// the group, so all chunks of one document report the same title.
///
/// Two-phase: a candidate title is generated per node, then the
/// concatenated candidates are combined into a single title for the group.
pub struct TitleExtractor {
    model: Arc<dyn TextCompletion>,
}

impl TitleExtractor {
    pub fn new(model: Arc<dyn TextCompletion>) -> Self {
        Self { model }
    }

    async fn candidate_title(&self, text: &str) -> String {
        let prompt = render(TITLE_CANDIDATE_PROMPT, text);
        complete_or_empty(self.model.as_ref(), &prompt).await
    }

    async fn group_title(&self, nodes: &[TextNode], indices: &[usize]) -> String {
        let candidate_futures = indices
            .iter()
            .filter(|&&index| !nodes[index].text.trim().is_empty())
            .map(|&index| self.candidate_title(&nodes[index].text));
        let candidates: Vec<String> = join_all(candidate_futures)
            .await
            .into_iter()
            .filter(|candidate| !candidate.is_empty())
            .collect();

        if candidates.is_empty() {
            return String::new();
        }
        let prompt = render(TITLE_COMBINE_PROMPT, &candidates.join(", "));
        complete_or_empty(self.model.as_ref(), &prompt).await
    }
}

#[async_trait]
impl Extractor for TitleExtractor {
    async fn extract(&self, nodes: &[TextNode]) -> Result<Vec<Metadata>, StratumError> {
        // Group node indices by source id, preserving first-seen order.
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, node) in nodes.iter().enumerate() {
            let key = node.source_id().to_string();
            if !groups.contains_key(&key) {
                order.push(key.clone());
            }
            groups.entry(key).or_default().push(index);
        }

        let group_futures = order.iter().map(|key| {
            let indices = groups[key].clone();
            async move {
                let title = self.group_title(nodes, &indices).await;
                (indices, title)
            }
        });
        let results = join_all(group_futures).await;

        let mut fragments = vec![Metadata::new(); nodes.len()];
        for (indices, title) in results {
            for index in indices {
                fragments[index].insert(TITLE_KEY.to_string(), Value::String(title.clone()));
            }
        }
        Ok(fragments)
    }
}
