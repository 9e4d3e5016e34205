//! Document chunking and metadata extraction for RAG pipelines.
//!
//! `DocumentChunker` is the entry point: construct it from text with a
//! declared content type, call `chunk()` with a strategy (or let the
//! content type pick one), and read back the produced nodes.

mod chunker;
mod params;

pub use chunker::{ContentType, DocumentChunker};
pub use params::{
    ChunkParams, ChunkStrategy, CharacterOptions, ExtractParams, HtmlOptions, JsonOptions,
    KeywordsParams, MarkdownOptions, QuestionsParams, RecursiveOptions, SemanticMarkdownOptions,
    SentenceOptions, SummaryParams, TitleParams, TokenOptions, DEFAULT_OVERLAP, DEFAULT_SIZE,
};

pub use stratum_core::{
    merge_metadata, Metadata, NodeKind, NodeRelationships, RelatedNode, StratumError,
    TextCompletion, TextNode, Transformer,
};
pub use stratum_extract::{
    apply_extractors, Extractor, KeywordExtractor, QuestionsExtractor, ScriptedCompletion,
    SummaryExtractor, TitleExtractor,
};
pub use stratum_splitters::{
    build_nodes_from_splits, CharacterSplitter, HtmlHeaderSplitter, HtmlSectionSplitter,
    KeepSeparator, Language, MarkdownHeaderSplitter, RecursiveCharacterSplitter,
    RecursiveJsonSplitter, SemanticMarkdownSplitter, SentenceSplitter, SplitConfig, TextSplitter,
    TokenEncoding, TokenSplitter,
};
