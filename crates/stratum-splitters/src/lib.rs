mod character;
mod html;
mod json;
pub mod language;
mod markdown;
mod merge;
mod recursive;
mod semantic_markdown;
mod sentence;
mod token;

pub use character::CharacterSplitter;
pub use html::{HtmlHeaderSplitter, HtmlSectionSplitter};
pub use json::RecursiveJsonSplitter;
pub use language::Language;
pub use markdown::MarkdownHeaderSplitter;
pub use merge::{split_text_with_regex, KeepSeparator, LengthFn, SplitConfig};
pub use recursive::RecursiveCharacterSplitter;
pub use semantic_markdown::SemanticMarkdownSplitter;
pub use sentence::SentenceSplitter;
pub use token::{TokenEncoding, TokenSplitter};

// Re-export the node model for downstream convenience.
pub use stratum_core::{RelatedNode, StratumError, TextNode, Transformer};

/// Trait for splitting text into chunks.
pub trait TextSplitter: Send + Sync {
    /// Split a string into chunk strings.
    fn split_text(&self, text: &str) -> Result<Vec<String>, StratumError>;

    /// Whether produced nodes should carry character offsets into the
    /// originating document.
    fn add_start_index(&self) -> bool {
        false
    }

    /// Split each node's text and produce chunk nodes. Every chunk inherits
    /// its source node's metadata and links back to it.
    fn split_nodes(&self, nodes: &[TextNode]) -> Result<Vec<TextNode>, StratumError> {
        let mut result = Vec::new();
        for node in nodes {
            let chunks = self.split_text(&node.text)?;
            result.extend(build_nodes_from_splits(chunks, node, self.add_start_index()));
        }
        Ok(result)
    }
}

/// Build chunk nodes from plain text splits: inherited metadata, a SOURCE
/// back-reference, PREVIOUS/NEXT sibling links, and (optionally) absolute
/// character offsets located by searching forward through the source text.
pub fn build_nodes_from_splits(
    chunks: Vec<String>,
    source: &TextNode,
    add_start_index: bool,
) -> Vec<TextNode> {
    let mut nodes: Vec<TextNode> = Vec::new();
    let mut search_from = 0usize;

    for chunk in chunks {
        let mut node = TextNode::new(chunk)
            .with_metadata(source.metadata.clone())
            .with_metadata_separator(source.metadata_separator.clone());
        node.relationships.source = Some(RelatedNode::new(source.id.clone()));

        if add_start_index {
            if let Some(found) = source.text[search_from..].find(&node.text) {
                let byte_start = search_from + found;
                let char_start = source.text[..byte_start].chars().count();
                node.start_char_idx = Some(char_start);
                node.end_char_idx = Some(char_start + node.text.chars().count());
                // Advance past the first character so an overlapping next
                // chunk can still be found.
                let step = node.text.chars().next().map(|ch| ch.len_utf8()).unwrap_or(1);
                search_from = byte_start + step;
            }
        }
        nodes.push(node);
    }

    link_siblings(&mut nodes);
    nodes
}

/// Attach splitter-produced nodes (which may already carry their own
/// derived metadata, e.g. header tags) to a source node: the source's
/// metadata is inherited underneath the chunk's own keys.
pub fn attach_to_source(mut chunks: Vec<TextNode>, source: &TextNode) -> Vec<TextNode> {
    for chunk in &mut chunks {
        let own = std::mem::take(&mut chunk.metadata);
        let mut merged = source.metadata.clone();
        stratum_core::merge_metadata(&mut merged, &own);
        chunk.metadata = merged;
        chunk.relationships.source = Some(RelatedNode::new(source.id.clone()));
    }
    link_siblings(&mut chunks);
    chunks
}

/// Wire PREVIOUS/NEXT links between consecutive nodes.
pub fn link_siblings(nodes: &mut [TextNode]) {
    let ids: Vec<String> = nodes.iter().map(|node| node.id.clone()).collect();
    for (i, node) in nodes.iter_mut().enumerate() {
        if i > 0 {
            node.relationships.previous = Some(RelatedNode::new(ids[i - 1].clone()));
        }
        if i + 1 < ids.len() {
            node.relationships.next = Some(RelatedNode::new(ids[i + 1].clone()));
        }
    }
}

/// Every splitting strategy satisfies the pipeline's `Transformer`
/// contract through its `split_nodes` implementation.
macro_rules! impl_transformer {
    ($($splitter:ty),+ $(,)?) => {$(
        impl Transformer for $splitter {
            fn transform(&self, nodes: Vec<TextNode>) -> Result<Vec<TextNode>, StratumError> {
                self.split_nodes(&nodes)
            }
        }
    )+};
}

impl_transformer!(
    CharacterSplitter,
    RecursiveCharacterSplitter,
    TokenSplitter,
    SentenceSplitter,
    MarkdownHeaderSplitter,
    SemanticMarkdownSplitter,
    HtmlHeaderSplitter,
    HtmlSectionSplitter,
    RecursiveJsonSplitter,
);
