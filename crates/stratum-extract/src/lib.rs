use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

mod keywords;
mod prompts;
mod questions;
mod scripted;
mod summary;
mod title;

pub use keywords::KeywordExtractor;
pub use questions::QuestionsExtractor;
pub use scripted::ScriptedCompletion;
pub use summary::SummaryExtractor;
pub use title::TitleExtractor;

pub use stratum_core::{merge_metadata, Metadata, StratumError, TextCompletion, TextNode};

/// A metadata extractor: given a node list, produce one metadata fragment
/// per node, in the same order.
///
/// Extraction is best-effort. A failed completion call never fails the
/// batch; the affected node simply receives an empty value. Empty or
/// whitespace-only node text short-circuits to an empty value without
/// calling the collaborator at all.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, nodes: &[TextNode]) -> Result<Vec<Metadata>, StratumError>;
}

/// Run extractors in order, overlaying each returned fragment onto its
/// node's metadata.
pub async fn apply_extractors(
    extractors: &[Arc<dyn Extractor>],
    nodes: &mut [TextNode],
) -> Result<(), StratumError> {
    for extractor in extractors {
        let fragments = extractor.extract(nodes).await?;
        if fragments.len() != nodes.len() {
            return Err(StratumError::Extraction(format!(
                "extractor returned {} fragments for {} nodes",
                fragments.len(),
                nodes.len()
            )));
        }
        for (node, fragment) in nodes.iter_mut().zip(&fragments) {
            merge_metadata(&mut node.metadata, fragment);
        }
    }
    Ok(())
}

/// Resolve a completion, recovering from failure with an empty string.
pub(crate) async fn complete_or_empty(model: &dyn TextCompletion, prompt: &str) -> String {
    match model.complete(prompt).await {
        Ok(text) => text.trim().to_string(),
        Err(error) => {
            warn!(%error, "text completion failed; leaving metadata empty");
            String::new()
        }
    }
}
