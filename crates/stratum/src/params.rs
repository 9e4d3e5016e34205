use std::sync::Arc;

use stratum_core::TextCompletion;
use stratum_splitters::{KeepSeparator, Language, TokenEncoding};

/// Default chunk size in length-units.
pub const DEFAULT_SIZE: usize = 512;
/// Default overlap between consecutive chunks.
pub const DEFAULT_OVERLAP: usize = 50;

/// The closed set of splitting strategies. Strategy-specific options live
/// on each variant, so an option can never leak across strategies.
#[derive(Debug, Clone)]
pub enum ChunkStrategy {
    Character(CharacterOptions),
    Recursive(RecursiveOptions),
    Token(TokenOptions),
    Sentence(SentenceOptions),
    Markdown(MarkdownOptions),
    SemanticMarkdown(SemanticMarkdownOptions),
    Html(HtmlOptions),
    Json(JsonOptions),
}

impl ChunkStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            ChunkStrategy::Character(_) => "character",
            ChunkStrategy::Recursive(_) => "recursive",
            ChunkStrategy::Token(_) => "token",
            ChunkStrategy::Sentence(_) => "sentence",
            ChunkStrategy::Markdown(_) => "markdown",
            ChunkStrategy::SemanticMarkdown(_) => "semantic-markdown",
            ChunkStrategy::Html(_) => "html",
            ChunkStrategy::Json(_) => "json",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CharacterOptions {
    pub size: usize,
    pub overlap: usize,
    pub separator: String,
    pub is_separator_regex: bool,
    pub keep_separator: KeepSeparator,
    pub add_start_index: bool,
}

impl Default for CharacterOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            overlap: DEFAULT_OVERLAP,
            separator: "\n\n".to_string(),
            is_separator_regex: false,
            keep_separator: KeepSeparator::default(),
            add_start_index: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecursiveOptions {
    pub size: usize,
    pub overlap: usize,
    /// Custom separator list; mutually exclusive with `language`.
    pub separators: Option<Vec<String>>,
    /// Use a per-language separator table; mutually exclusive with `separators`.
    pub language: Option<Language>,
    pub is_separator_regex: bool,
    pub add_start_index: bool,
}

impl Default for RecursiveOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            overlap: DEFAULT_OVERLAP,
            separators: None,
            language: None,
            is_separator_regex: false,
            add_start_index: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenOptions {
    /// Size and overlap are measured in tokens of `encoding`.
    pub size: usize,
    pub overlap: usize,
    pub encoding: TokenEncoding,
}

impl Default for TokenOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            overlap: DEFAULT_OVERLAP,
            encoding: TokenEncoding::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SentenceOptions {
    pub max_size: usize,
    pub overlap: usize,
    /// Early-close threshold; defaults to 80% of `max_size`.
    pub target_size: Option<usize>,
    pub sentence_enders: Option<Vec<char>>,
    pub fallback_to_words: bool,
    pub fallback_to_characters: bool,
}

impl Default for SentenceOptions {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_SIZE,
            overlap: DEFAULT_OVERLAP,
            target_size: None,
            sentence_enders: None,
            fallback_to_words: true,
            fallback_to_characters: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Size and overlap apply to the recursive fallback used when no
    /// headers are configured.
    pub size: usize,
    pub overlap: usize,
    pub headers: Option<Vec<(String, String)>>,
    pub return_each_line: bool,
    pub strip_headers: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            overlap: DEFAULT_OVERLAP,
            headers: None,
            return_each_line: false,
            strip_headers: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SemanticMarkdownOptions {
    /// Sections whose combined token count stays below this are joined.
    pub join_threshold: usize,
    pub encoding: TokenEncoding,
}

impl Default for SemanticMarkdownOptions {
    fn default() -> Self {
        Self {
            join_threshold: 500,
            encoding: TokenEncoding::default(),
        }
    }
}

/// Exactly one of `headers` / `sections` must be configured.
#[derive(Debug, Clone, Default)]
pub struct HtmlOptions {
    pub headers: Vec<(String, String)>,
    pub sections: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct JsonOptions {
    pub max_size: usize,
    pub min_size: Option<usize>,
    pub convert_lists: bool,
    pub ensure_ascii: bool,
}

impl JsonOptions {
    /// `max_size` is required for the JSON strategy.
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            min_size: None,
            convert_lists: false,
            ensure_ascii: true,
        }
    }
}

/// Which extractors to run after splitting; each carries the completion
/// model it should call.
#[derive(Clone, Default)]
pub struct ExtractParams {
    pub title: Option<TitleParams>,
    pub summary: Option<SummaryParams>,
    pub questions: Option<QuestionsParams>,
    pub keywords: Option<KeywordsParams>,
}

#[derive(Clone)]
pub struct TitleParams {
    pub model: Arc<dyn TextCompletion>,
}

#[derive(Clone)]
pub struct SummaryParams {
    pub model: Arc<dyn TextCompletion>,
    pub include_neighbors: bool,
}

impl SummaryParams {
    pub fn new(model: Arc<dyn TextCompletion>) -> Self {
        Self {
            model,
            include_neighbors: false,
        }
    }
}

#[derive(Clone)]
pub struct QuestionsParams {
    pub model: Arc<dyn TextCompletion>,
    pub num_questions: usize,
}

impl QuestionsParams {
    pub fn new(model: Arc<dyn TextCompletion>) -> Self {
        Self {
            model,
            num_questions: 5,
        }
    }
}

#[derive(Clone)]
pub struct KeywordsParams {
    pub model: Arc<dyn TextCompletion>,
    pub num_keywords: usize,
}

impl KeywordsParams {
    pub fn new(model: Arc<dyn TextCompletion>) -> Self {
        Self {
            model,
            num_keywords: 5,
        }
    }
}

/// Parameters for one `chunk()` call.
#[derive(Clone, Default)]
pub struct ChunkParams {
    /// Strategy to apply; when absent the document's content type selects
    /// the default.
    pub strategy: Option<ChunkStrategy>,
    /// Extraction pass to run over the produced chunks.
    pub extract: Option<ExtractParams>,
}

impl ChunkParams {
    pub fn with_strategy(strategy: ChunkStrategy) -> Self {
        Self {
            strategy: Some(strategy),
            extract: None,
        }
    }
}
