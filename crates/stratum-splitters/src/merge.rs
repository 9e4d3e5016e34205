use std::sync::Arc;

use regex::Regex;
use stratum_core::StratumError;
use tracing::warn;

/// Unit in which `size` and `overlap` are measured. Characters by default;
/// strategies substitute byte, word, or token counters.
pub type LengthFn = Arc<dyn Fn(&str) -> usize + Send + Sync>;

/// What to do with the separator when splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeepSeparator {
    /// Drop the separator from the pieces.
    #[default]
    Discard,
    /// Prepend the separator to the piece that follows it.
    Start,
    /// Append the separator to the piece that precedes it.
    End,
}

/// Shared size/overlap bookkeeping used by the character, recursive, and
/// sentence-adjacent strategies.
#[derive(Clone)]
pub struct SplitConfig {
    pub size: usize,
    pub overlap: usize,
    pub length_function: LengthFn,
    pub keep_separator: KeepSeparator,
    pub add_start_index: bool,
    pub strip_whitespace: bool,
}

impl SplitConfig {
    /// Fails fast when `overlap > size`; that is a configuration error, not
    /// a runtime data error.
    pub fn new(size: usize, overlap: usize) -> Result<Self, StratumError> {
        if size == 0 {
            return Err(StratumError::Config("chunk size must be positive".into()));
        }
        if overlap > size {
            return Err(StratumError::Config(format!(
                "got a larger chunk overlap ({overlap}) than chunk size ({size}); overlap must be smaller"
            )));
        }
        Ok(Self {
            size,
            overlap,
            length_function: Arc::new(|text| text.chars().count()),
            keep_separator: KeepSeparator::default(),
            add_start_index: false,
            strip_whitespace: true,
        })
    }

    pub fn with_length_function(mut self, length_function: LengthFn) -> Self {
        self.length_function = length_function;
        self
    }

    pub fn with_keep_separator(mut self, keep_separator: KeepSeparator) -> Self {
        self.keep_separator = keep_separator;
        self
    }

    pub fn with_add_start_index(mut self, add_start_index: bool) -> Self {
        self.add_start_index = add_start_index;
        self
    }

    pub fn with_strip_whitespace(mut self, strip_whitespace: bool) -> Self {
        self.strip_whitespace = strip_whitespace;
        self
    }

    pub fn length(&self, text: &str) -> usize {
        (self.length_function)(text)
    }

    /// Join pieces into one chunk. Returns `None` when the joined chunk is
    /// empty (after optional whitespace stripping).
    pub fn join_docs(&self, docs: &[String], separator: &str) -> Option<String> {
        let joined = docs.join(separator);
        let joined = if self.strip_whitespace {
            joined.trim().to_string()
        } else {
            joined
        };
        if joined.is_empty() {
            None
        } else {
            Some(joined)
        }
    }

    /// Re-group already-split pieces into chunks of at most `size`
    /// length-units, seeding each new chunk with the maximal trailing
    /// subsequence of the previous chunk whose cumulative length stays
    /// within `overlap`.
    ///
    /// A single piece that alone exceeds `size` is emitted verbatim with a
    /// warning: an atomic piece cannot be divided further here, and no data
    /// is ever dropped.
    pub fn merge_splits(&self, splits: &[String], separator: &str) -> Vec<String> {
        let separator_len = self.length(separator);
        let mut docs: Vec<String> = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut total = 0usize;

        for piece in splits {
            let piece_len = self.length(piece);
            let join_len = if current.is_empty() { 0 } else { separator_len };

            if total + piece_len + join_len > self.size {
                if total > self.size {
                    warn!(
                        chunk_len = total,
                        max = self.size,
                        "emitting a chunk above the configured size"
                    );
                }
                if !current.is_empty() {
                    if let Some(doc) = self.join_docs(&current, separator) {
                        docs.push(doc);
                    }
                    // Shrink the retained tail until it fits the overlap
                    // window and leaves room for the incoming piece.
                    loop {
                        let join_len = if current.is_empty() { 0 } else { separator_len };
                        let keep_shrinking = total > self.overlap
                            || (total + piece_len + join_len > self.size && total > 0);
                        if !keep_shrinking || current.is_empty() {
                            break;
                        }
                        let removed = self.length(&current[0])
                            + if current.len() > 1 { separator_len } else { 0 };
                        total = total.saturating_sub(removed);
                        current.remove(0);
                    }
                }
            }

            current.push(piece.clone());
            total += piece_len + if current.len() > 1 { separator_len } else { 0 };
        }

        if let Some(doc) = self.join_docs(&current, separator) {
            docs.push(doc);
        }
        docs
    }
}

/// Split `text` on a regular-expression separator, applying the
/// keep-separator policy. An empty separator splits into single characters.
pub fn split_text_with_regex(
    text: &str,
    separator: &str,
    keep_separator: KeepSeparator,
) -> Result<Vec<String>, StratumError> {
    if separator.is_empty() {
        return Ok(text
            .chars()
            .map(String::from)
            .collect());
    }

    let re = Regex::new(separator).map_err(|e| {
        StratumError::Config(format!("invalid separator pattern `{separator}`: {e}"))
    })?;

    let pieces: Vec<String> = match keep_separator {
        KeepSeparator::Discard => re.split(text).map(str::to_string).collect(),
        KeepSeparator::Start | KeepSeparator::End => {
            // Interleave text segments and separators: [t0, s0, t1, .., tn].
            let mut segments: Vec<String> = Vec::new();
            let mut last = 0;
            for found in re.find_iter(text) {
                segments.push(text[last..found.start()].to_string());
                segments.push(found.as_str().to_string());
                last = found.end();
            }
            segments.push(text[last..].to_string());

            let mut pieces = Vec::new();
            if keep_separator == KeepSeparator::Start {
                pieces.push(segments[0].clone());
                let mut i = 1;
                while i + 1 < segments.len() {
                    pieces.push(format!("{}{}", segments[i], segments[i + 1]));
                    i += 2;
                }
            } else {
                let mut i = 0;
                while i + 1 < segments.len() {
                    pieces.push(format!("{}{}", segments[i], segments[i + 1]));
                    i += 2;
                }
                if segments.len() % 2 == 1 {
                    pieces.push(segments[segments.len() - 1].clone());
                }
            }
            pieces
        }
    };

    Ok(pieces.into_iter().filter(|piece| !piece.is_empty()).collect())
}
