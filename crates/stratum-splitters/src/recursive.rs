use regex::Regex;
use stratum_core::StratumError;

use crate::language::Language;
use crate::merge::{split_text_with_regex, KeepSeparator, LengthFn, SplitConfig};
use crate::TextSplitter;

/// Tries an ordered list of separators, coarsest first, recursing into the
/// next separator for any piece that still exceeds the size ceiling.
pub struct RecursiveCharacterSplitter {
    config: SplitConfig,
    separators: Vec<String>,
    is_separator_regex: bool,
}

impl RecursiveCharacterSplitter {
    pub fn new(size: usize, overlap: usize) -> Result<Self, StratumError> {
        Ok(Self {
            config: SplitConfig::new(size, overlap)?.with_keep_separator(KeepSeparator::Start),
            separators: ["\n\n", "\n", " ", ""].map(String::from).to_vec(),
            is_separator_regex: false,
        })
    }

    /// Use the separator table of a supported language.
    pub fn from_language(
        language: Language,
        size: usize,
        overlap: usize,
    ) -> Result<Self, StratumError> {
        Ok(Self::new(size, overlap)?
            .with_separators(language.separators().into_iter().map(String::from).collect()))
    }

    pub fn with_separators(mut self, separators: Vec<String>) -> Self {
        self.separators = separators;
        self
    }

    pub fn with_separator_regex(mut self, is_regex: bool) -> Self {
        self.is_separator_regex = is_regex;
        self
    }

    pub fn with_keep_separator(mut self, keep_separator: KeepSeparator) -> Self {
        self.config = self.config.with_keep_separator(keep_separator);
        self
    }

    pub fn with_length_function(mut self, length_function: LengthFn) -> Self {
        self.config = self.config.with_length_function(length_function);
        self
    }

    pub fn with_add_start_index(mut self, add_start_index: bool) -> Self {
        self.config = self.config.with_add_start_index(add_start_index);
        self
    }

    pub fn with_strip_whitespace(mut self, strip_whitespace: bool) -> Self {
        self.config = self.config.with_strip_whitespace(strip_whitespace);
        self
    }

    fn pattern_for(&self, separator: &str) -> String {
        if self.is_separator_regex {
            separator.to_string()
        } else {
            regex::escape(separator)
        }
    }

    fn split_recursive(
        &self,
        text: &str,
        separators: &[String],
    ) -> Result<Vec<String>, StratumError> {
        let mut final_chunks: Vec<String> = Vec::new();

        // Pick the first separator present in the text; the last entry is
        // the fallback when nothing coarser matches.
        let mut separator = separators.last().cloned().unwrap_or_default();
        let mut remaining: &[String] = &[];
        for (idx, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = candidate.clone();
                break;
            }
            let re = Regex::new(&self.pattern_for(candidate)).map_err(|e| {
                StratumError::Config(format!("invalid separator pattern `{candidate}`: {e}"))
            })?;
            if re.is_match(text) {
                separator = candidate.clone();
                remaining = &separators[idx + 1..];
                break;
            }
        }

        let splits =
            split_text_with_regex(text, &self.pattern_for(&separator), self.config.keep_separator)?;
        let join_separator = match self.config.keep_separator {
            KeepSeparator::Discard => separator.as_str(),
            KeepSeparator::Start | KeepSeparator::End => "",
        };

        let mut good: Vec<String> = Vec::new();
        for piece in splits {
            if self.config.length(&piece) < self.config.size {
                good.push(piece);
            } else {
                if !good.is_empty() {
                    final_chunks.extend(self.config.merge_splits(&good, join_separator));
                    good.clear();
                }
                if remaining.is_empty() {
                    tracing::warn!(
                        piece_len = self.config.length(&piece),
                        max = self.config.size,
                        "no finer separator left; emitting oversized piece verbatim"
                    );
                    final_chunks.push(piece);
                } else {
                    final_chunks.extend(self.split_recursive(&piece, remaining)?);
                }
            }
        }
        if !good.is_empty() {
            final_chunks.extend(self.config.merge_splits(&good, join_separator));
        }

        Ok(final_chunks)
    }
}

impl TextSplitter for RecursiveCharacterSplitter {
    fn split_text(&self, text: &str) -> Result<Vec<String>, StratumError> {
        self.split_recursive(text, &self.separators)
    }

    fn add_start_index(&self) -> bool {
        self.config.add_start_index
    }
}
