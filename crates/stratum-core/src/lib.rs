use std::collections::HashMap;
use std::sync::OnceLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Open string-keyed metadata map carried by every node.
///
/// Values are JSON values, which keeps the set of representable types closed
/// (string, number, bool, array, object) while staying serializable.
pub type Metadata = HashMap<String, Value>;

/// Overlay `overlay` onto `base`: keys present in `overlay` replace
/// same-named keys in `base`, all other keys in `base` are preserved.
pub fn merge_metadata(base: &mut Metadata, overlay: &Metadata) {
    for (key, value) in overlay {
        base.insert(key.clone(), value.clone());
    }
}

// ---------------------------------------------------------------------------
// Node model
// ---------------------------------------------------------------------------

/// Whether a node is a top-level input unit or a derived chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A top-level input unit, the grouping unit for document-level metadata.
    Document,
    /// A segment derived from a document by a splitting strategy.
    Chunk,
}

/// A back-reference to a related node. Never an ownership edge; exists so
/// chunks can be grouped and looked up by their originating node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedNode {
    pub node_id: String,
}

impl RelatedNode {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
        }
    }
}

/// The relationship links a node may carry. All links are optional except
/// children, which is a (possibly empty) list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRelationships {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<RelatedNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<RelatedNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<RelatedNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<RelatedNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RelatedNode>,
}

/// Default separator between rendered metadata lines.
pub const DEFAULT_METADATA_SEPARATOR: &str = "\n";

/// The unit of content flowing through the chunking pipeline.
///
/// Immutable after construction apart from metadata overlays applied by the
/// extraction stage. The content hash is computed lazily on first access and
/// cached; it covers kind, character offsets, and text, never the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextNode {
    pub id: String,
    pub kind: NodeKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: Metadata,
    #[serde(default)]
    pub relationships: NodeRelationships,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_char_idx: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_char_idx: Option<usize>,
    #[serde(default = "default_metadata_separator")]
    pub metadata_separator: String,
    #[serde(skip)]
    hash: OnceLock<String>,
}

fn default_metadata_separator() -> String {
    DEFAULT_METADATA_SEPARATOR.to_string()
}

impl PartialEq for TextNode {
    fn eq(&self, other: &Self) -> bool {
        // The cached hash is derived state and does not participate.
        self.id == other.id
            && self.kind == other.kind
            && self.text == other.text
            && self.metadata == other.metadata
            && self.relationships == other.relationships
            && self.start_char_idx == other.start_char_idx
            && self.end_char_idx == other.end_char_idx
            && self.metadata_separator == other.metadata_separator
    }
}

impl TextNode {
    /// Create a chunk node with a generated id.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: NodeKind::Chunk,
            text: text.into(),
            metadata: HashMap::new(),
            relationships: NodeRelationships::default(),
            start_char_idx: None,
            end_char_idx: None,
            metadata_separator: default_metadata_separator(),
            hash: OnceLock::new(),
        }
    }

    /// Create a top-level document node with a generated id.
    pub fn document(text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Document,
            ..Self::new(text)
        }
    }

    // -- Builder methods -----------------------------------------------------

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_metadata_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_relationships(mut self, relationships: NodeRelationships) -> Self {
        self.relationships = relationships;
        self
    }

    pub fn with_char_span(mut self, start: usize, end: usize) -> Self {
        self.start_char_idx = Some(start);
        self.end_char_idx = Some(end);
        self
    }

    pub fn with_metadata_separator(mut self, separator: impl Into<String>) -> Self {
        self.metadata_separator = separator.into();
        self
    }

    // -- Accessors -----------------------------------------------------------

    pub fn is_document(&self) -> bool {
        self.kind == NodeKind::Document
    }

    /// The id used when grouping chunks by originating document: the source
    /// relationship's node id, or this node's own id if no source is set.
    pub fn source_id(&self) -> &str {
        self.relationships
            .source
            .as_ref()
            .map(|related| related.node_id.as_str())
            .unwrap_or(&self.id)
    }

    /// Content fingerprint, computed on first access and cached.
    ///
    /// Two nodes with identical kind, offsets, and text always hash
    /// identically; the id never participates.
    pub fn hash(&self) -> &str {
        self.hash.get_or_init(|| {
            let mut hasher = Sha256::new();
            hasher.update(match self.kind {
                NodeKind::Document => b"document".as_slice(),
                NodeKind::Chunk => b"chunk".as_slice(),
            });
            hasher.update([0u8]);
            if let Some(start) = self.start_char_idx {
                hasher.update(start.to_le_bytes());
            }
            hasher.update([0u8]);
            if let Some(end) = self.end_char_idx {
                hasher.update(end.to_le_bytes());
            }
            hasher.update([0u8]);
            hasher.update(self.text.as_bytes());
            format!("{:x}", hasher.finalize())
        })
    }

    /// Render metadata lines (`key: value`, keys sorted) followed by the
    /// text, for consumers that embed metadata-prefixed content.
    pub fn content_with_metadata(&self) -> String {
        if self.metadata.is_empty() {
            return self.text.clone();
        }
        let mut keys: Vec<&String> = self.metadata.keys().collect();
        keys.sort();
        let rendered: Vec<String> = keys
            .into_iter()
            .map(|key| {
                let value = &self.metadata[key];
                match value {
                    Value::String(s) => format!("{key}: {s}"),
                    other => format!("{key}: {other}"),
                }
            })
            .collect();
        format!("{}\n\n{}", rendered.join(&self.metadata_separator), self.text)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Unified error type for the chunking pipeline.
#[derive(Debug, Error)]
pub enum StratumError {
    /// Invalid or inconsistent configuration, raised before any splitting.
    #[error("config error: {0}")]
    Config(String),
    /// Input the pipeline cannot process (e.g. an unknown language name).
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),
    #[error("splitter error: {0}")]
    Splitter(String),
    #[error("extraction error: {0}")]
    Extraction(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Core traits
// ---------------------------------------------------------------------------

/// External text-completion collaborator consumed by the metadata
/// extractors. Given a rendered prompt, returns generated text or fails;
/// callers treat failures as recoverable.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, StratumError>;
}

/// The contract every splitting strategy implements: consume a node list,
/// produce a new ordered node list with derived text and metadata.
pub trait Transformer: Send + Sync {
    fn transform(&self, nodes: Vec<TextNode>) -> Result<Vec<TextNode>, StratumError>;
}
