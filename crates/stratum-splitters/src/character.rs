use stratum_core::StratumError;

use crate::merge::{split_text_with_regex, KeepSeparator, LengthFn, SplitConfig};
use crate::TextSplitter;

/// Splits on exactly one separator (literal or regular expression), then
/// re-groups the pieces under the size/overlap contract.
pub struct CharacterSplitter {
    config: SplitConfig,
    separator: String,
    is_separator_regex: bool,
}

impl CharacterSplitter {
    pub fn new(size: usize, overlap: usize) -> Result<Self, StratumError> {
        Ok(Self {
            config: SplitConfig::new(size, overlap)?,
            separator: "\n\n".to_string(),
            is_separator_regex: false,
        })
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Treat the separator as a regular expression instead of a literal.
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
}

impl TextSplitter for CharacterSplitter {
    fn split_text(&self, text: &str) -> Result<Vec<String>, StratumError> {
        let pattern = if self.is_separator_regex {
            self.separator.clone()
        } else {
            regex::escape(&self.separator)
        };
        let splits = split_text_with_regex(text, &pattern, self.config.keep_separator)?;
        // When the separator is kept it already rides on a piece; joining
        // with it again would duplicate it.
        let join_separator = match self.config.keep_separator {
            KeepSeparator::Discard => self.separator.as_str(),
            KeepSeparator::Start | KeepSeparator::End => "",
        };
        Ok(self.config.merge_splits(&splits, join_separator))
    }

    fn add_start_index(&self) -> bool {
        self.config.add_start_index
    }
}
