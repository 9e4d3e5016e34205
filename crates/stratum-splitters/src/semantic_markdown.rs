use stratum_core::{StratumError, TextNode};
use tiktoken_rs::CoreBPE;

use crate::markdown::MarkdownHeaderSplitter;
use crate::token::TokenEncoding;
use crate::TextSplitter;

const DEFAULT_JOIN_THRESHOLD: usize = 500;

/// Header-splits markdown, then greedily coalesces token-starved sections
/// bottom-up: working from the deepest heading level upward, a section at
/// the target depth is absorbed into its predecessor when their combined
/// token count stays below the join threshold and the predecessor is at the
/// same or a shallower depth.
pub struct SemanticMarkdownSplitter {
    join_threshold: usize,
    bpe: CoreBPE,
}

struct Section {
    depth: usize,
    node: TextNode,
    tokens: usize,
}

impl SemanticMarkdownSplitter {
    pub fn new() -> Result<Self, StratumError> {
        Self::with_encoding(TokenEncoding::default())
    }

    pub fn with_encoding(encoding: TokenEncoding) -> Result<Self, StratumError> {
        Ok(Self {
            join_threshold: DEFAULT_JOIN_THRESHOLD,
            bpe: encoding.load()?,
        })
    }

    pub fn with_join_threshold(mut self, join_threshold: usize) -> Self {
        self.join_threshold = join_threshold;
        self
    }

    fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    /// Split into header sections and merge small ones into their enclosing
    /// section. Merging re-measures the merged text; this is the one place
    /// an existing node's content mutates instead of being copied forward.
    pub fn split_semantic(&self, text: &str) -> Vec<TextNode> {
        // Headings stay in the body so an absorbed section keeps its title.
        let splitter = MarkdownHeaderSplitter::all_headers().with_strip_headers(false);
        let mut sections: Vec<Section> = splitter
            .split_markdown(text)
            .into_iter()
            .map(|node| Section {
                depth: section_depth(&node),
                tokens: self.count_tokens(&node.text),
                node,
            })
            .collect();

        for depth in (1..=6).rev() {
            let mut i = 1;
            while i < sections.len() {
                let mergeable = sections[i].depth == depth
                    && sections[i - 1].depth <= sections[i].depth
                    && sections[i - 1].tokens + sections[i].tokens < self.join_threshold;
                if mergeable {
                    let absorbed = sections.remove(i);
                    let target = &mut sections[i - 1];
                    target.node.text.push('\n');
                    target.node.text.push_str(&absorbed.node.text);
                    target.tokens = self.count_tokens(&target.node.text);
                } else {
                    i += 1;
                }
            }
        }

        sections.into_iter().map(|section| section.node).collect()
    }
}

/// A section's depth is the deepest header recorded in its metadata; text
/// before any heading sits at depth zero.
fn section_depth(node: &TextNode) -> usize {
    (1..=6)
        .filter(|depth| node.metadata.contains_key(&format!("Header {depth}")))
        .max()
        .unwrap_or(0)
}

impl TextSplitter for SemanticMarkdownSplitter {
    fn split_text(&self, text: &str) -> Result<Vec<String>, StratumError> {
        Ok(self
            .split_semantic(text)
            .into_iter()
            .map(|node| node.text)
            .collect())
    }

    fn split_nodes(&self, nodes: &[TextNode]) -> Result<Vec<TextNode>, StratumError> {
        let mut result = Vec::new();
        for node in nodes {
            result.extend(crate::attach_to_source(self.split_semantic(&node.text), node));
        }
        Ok(result)
    }
}
