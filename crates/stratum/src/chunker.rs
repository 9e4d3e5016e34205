use std::sync::Arc;

use stratum_core::{Metadata, StratumError, TextNode};
use stratum_extract::{
    apply_extractors, Extractor, KeywordExtractor, QuestionsExtractor, SummaryExtractor,
    TitleExtractor,
};
use stratum_splitters::{
    CharacterSplitter, HtmlHeaderSplitter, HtmlSectionSplitter, Language, MarkdownHeaderSplitter,
    RecursiveCharacterSplitter, RecursiveJsonSplitter, SemanticMarkdownSplitter, SentenceSplitter,
    TextSplitter, TokenSplitter,
};
use tracing::debug;

use crate::params::{
    ChunkParams, ChunkStrategy, ExtractParams, HtmlOptions, JsonOptions, MarkdownOptions,
    RecursiveOptions, DEFAULT_SIZE,
};

/// Declared content type of the input; selects the default strategy when
/// `chunk()` is called without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Text,
    Markdown,
    Html,
    Json,
}

/// Public entry point of the chunking pipeline: holds the input documents,
/// dispatches a validated strategy over them, optionally runs metadata
/// extraction, and exposes the resulting node list.
pub struct DocumentChunker {
    doc_type: ContentType,
    docs: Vec<TextNode>,
}

impl DocumentChunker {
    /// Build from `(text, metadata)` pairs with a declared content type.
    pub fn new(doc_type: ContentType, entries: Vec<(String, Metadata)>) -> Self {
        let docs = entries
            .into_iter()
            .map(|(text, metadata)| TextNode::document(text).with_metadata(metadata))
            .collect();
        Self { doc_type, docs }
    }

    pub fn from_text(text: impl Into<String>, metadata: Metadata) -> Self {
        Self::new(ContentType::Text, vec![(text.into(), metadata)])
    }

    pub fn from_markdown(text: impl Into<String>, metadata: Metadata) -> Self {
        Self::new(ContentType::Markdown, vec![(text.into(), metadata)])
    }

    pub fn from_html(text: impl Into<String>, metadata: Metadata) -> Self {
        Self::new(ContentType::Html, vec![(text.into(), metadata)])
    }

    pub fn from_json(text: impl Into<String>, metadata: Metadata) -> Self {
        Self::new(ContentType::Json, vec![(text.into(), metadata)])
    }

    pub fn doc_type(&self) -> ContentType {
        self.doc_type
    }

    /// Current node list: the input documents before `chunk()`, the
    /// produced chunks afterwards.
    pub fn docs(&self) -> &[TextNode] {
        &self.docs
    }

    pub fn texts(&self) -> Vec<&str> {
        self.docs.iter().map(|node| node.text.as_str()).collect()
    }

    pub fn metadata(&self) -> Vec<&Metadata> {
        self.docs.iter().map(|node| &node.metadata).collect()
    }

    /// Split the held documents and optionally run extraction over the
    /// produced chunks. All configuration is validated before any
    /// splitting occurs.
    pub async fn chunk(&mut self, params: ChunkParams) -> Result<&[TextNode], StratumError> {
        let strategy = match params.strategy {
            Some(strategy) => strategy,
            None => self.default_strategy(),
        };
        debug!(strategy = strategy.name(), "dispatching chunk strategy");

        let mut chunks = dispatch(&strategy, &self.docs)?;

        if let Some(extract) = params.extract {
            let extractors = build_extractors(extract);
            apply_extractors(&extractors, &mut chunks).await?;
        }

        self.docs = chunks;
        Ok(&self.docs)
    }

    fn default_strategy(&self) -> ChunkStrategy {
        match self.doc_type {
            ContentType::Html => ChunkStrategy::Html(HtmlOptions {
                headers: (1..=3)
                    .map(|depth| (format!("h{depth}"), format!("Header {depth}")))
                    .collect(),
                sections: Vec::new(),
            }),
            ContentType::Markdown => ChunkStrategy::Recursive(RecursiveOptions {
                language: Some(Language::Markdown),
                ..RecursiveOptions::default()
            }),
            ContentType::Json => ChunkStrategy::Json(JsonOptions::new(DEFAULT_SIZE)),
            ContentType::Text => ChunkStrategy::Recursive(RecursiveOptions::default()),
        }
    }
}

/// Exhaustive dispatch over the strategy set; every arm builds its
/// splitter (validating options in the process) and runs it.
fn dispatch(strategy: &ChunkStrategy, docs: &[TextNode]) -> Result<Vec<TextNode>, StratumError> {
    match strategy {
        ChunkStrategy::Character(opts) => {
            let splitter = CharacterSplitter::new(opts.size, opts.overlap)?
                .with_separator(opts.separator.clone())
                .with_separator_regex(opts.is_separator_regex)
                .with_keep_separator(opts.keep_separator)
                .with_add_start_index(opts.add_start_index);
            splitter.split_nodes(docs)
        }
        ChunkStrategy::Recursive(opts) => {
            if opts.language.is_some() && opts.separators.is_some() {
                return Err(StratumError::Config(
                    "recursive strategy accepts either `language` or `separators`, not both"
                        .into(),
                ));
            }
            let mut splitter = match opts.language {
                Some(language) => {
                    RecursiveCharacterSplitter::from_language(language, opts.size, opts.overlap)?
                }
                None => RecursiveCharacterSplitter::new(opts.size, opts.overlap)?,
            };
            if let Some(separators) = &opts.separators {
                splitter = splitter.with_separators(separators.clone());
            }
            splitter = splitter
                .with_separator_regex(opts.is_separator_regex)
                .with_add_start_index(opts.add_start_index);
            splitter.split_nodes(docs)
        }
        ChunkStrategy::Token(opts) => {
            let splitter = TokenSplitter::with_encoding(opts.encoding, opts.size, opts.overlap)?;
            splitter.split_nodes(docs)
        }
        ChunkStrategy::Sentence(opts) => {
            let mut splitter = SentenceSplitter::new(opts.max_size, opts.overlap)?
                .with_word_fallback(opts.fallback_to_words)
                .with_character_fallback(opts.fallback_to_characters);
            if let Some(target_size) = opts.target_size {
                splitter = splitter.with_target_size(target_size)?;
            }
            if let Some(enders) = &opts.sentence_enders {
                splitter = splitter.with_sentence_enders(enders.clone());
            }
            splitter.split_nodes(docs)
        }
        ChunkStrategy::Markdown(opts) => dispatch_markdown(opts, docs),
        ChunkStrategy::SemanticMarkdown(opts) => {
            let splitter = SemanticMarkdownSplitter::with_encoding(opts.encoding)?
                .with_join_threshold(opts.join_threshold);
            splitter.split_nodes(docs)
        }
        ChunkStrategy::Html(opts) => {
            if !opts.headers.is_empty() && !opts.sections.is_empty() {
                return Err(StratumError::Config(
                    "html strategy accepts either `headers` or `sections`, not both".into(),
                ));
            }
            if opts.headers.is_empty() && opts.sections.is_empty() {
                return Err(StratumError::Config(
                    "html strategy requires `headers` or `sections`".into(),
                ));
            }
            if !opts.headers.is_empty() {
                HtmlHeaderSplitter::new(opts.headers.clone()).split_nodes(docs)
            } else {
                HtmlSectionSplitter::new(opts.sections.clone()).split_nodes(docs)
            }
        }
        ChunkStrategy::Json(opts) => {
            if opts.max_size == 0 {
                return Err(StratumError::Config(
                    "json strategy requires a positive `max_size`".into(),
                ));
            }
            let mut splitter = RecursiveJsonSplitter::new(opts.max_size)?
                .with_convert_lists(opts.convert_lists)
                .with_ensure_ascii(opts.ensure_ascii);
            if let Some(min_size) = opts.min_size {
                splitter = splitter.with_min_size(min_size);
            }
            splitter.split_nodes(docs)
        }
    }
}

fn dispatch_markdown(opts: &MarkdownOptions, docs: &[TextNode]) -> Result<Vec<TextNode>, StratumError> {
    if opts.headers.is_none() && !opts.return_each_line {
        // No header configuration: fall back to recursive splitting with
        // the markdown separator table.
        let splitter =
            RecursiveCharacterSplitter::from_language(Language::Markdown, opts.size, opts.overlap)?;
        return splitter.split_nodes(docs);
    }
    let splitter = match &opts.headers {
        Some(headers) => MarkdownHeaderSplitter::new(headers.clone()),
        None => MarkdownHeaderSplitter::all_headers(),
    };
    splitter
        .with_return_each_line(opts.return_each_line)
        .with_strip_headers(opts.strip_headers)
        .split_nodes(docs)
}

/// Extractors run in a fixed order so later fragments overlay earlier
/// ones deterministically.
fn build_extractors(params: ExtractParams) -> Vec<Arc<dyn Extractor>> {
    let mut extractors: Vec<Arc<dyn Extractor>> = Vec::new();
    if let Some(title) = params.title {
        extractors.push(Arc::new(TitleExtractor::new(title.model)));
    }
    if let Some(summary) = params.summary {
        let mut extractor = SummaryExtractor::new(summary.model);
        if summary.include_neighbors {
            extractor = extractor.with_neighbors();
        }
        extractors.push(Arc::new(extractor));
    }
    if let Some(questions) = params.questions {
        extractors.push(Arc::new(
            QuestionsExtractor::new(questions.model).with_num_questions(questions.num_questions),
        ));
    }
    if let Some(keywords) = params.keywords {
        extractors.push(Arc::new(
            KeywordExtractor::new(keywords.model).with_num_keywords(keywords.num_keywords),
        ));
    }
    extractors
}
