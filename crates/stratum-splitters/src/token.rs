use std::str::FromStr;

use stratum_core::StratumError;
use tiktoken_rs::CoreBPE;

use crate::TextSplitter;

/// Tokenizer encodings selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenEncoding {
    #[default]
    Cl100kBase,
    O200kBase,
    P50kBase,
    R50kBase,
}

impl TokenEncoding {
    pub(crate) fn load(self) -> Result<CoreBPE, StratumError> {
        let loaded = match self {
            TokenEncoding::Cl100kBase => tiktoken_rs::cl100k_base(),
            TokenEncoding::O200kBase => tiktoken_rs::o200k_base(),
            TokenEncoding::P50kBase => tiktoken_rs::p50k_base(),
            TokenEncoding::R50kBase => tiktoken_rs::r50k_base(),
        };
        loaded.map_err(|e| StratumError::Config(format!("failed to load tokenizer: {e}")))
    }
}

impl FromStr for TokenEncoding {
    type Err = StratumError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "cl100k_base" => Ok(TokenEncoding::Cl100kBase),
            "o200k_base" => Ok(TokenEncoding::O200kBase),
            "p50k_base" => Ok(TokenEncoding::P50kBase),
            "r50k_base" => Ok(TokenEncoding::R50kBase),
            other => Err(StratumError::UnsupportedInput(format!(
                "unknown tokenizer encoding `{other}`"
            ))),
        }
    }
}

/// Splits by sliding a window of `size` tokens over the encoded text,
/// advancing by `size - overlap` tokens, and decoding each window.
pub struct TokenSplitter {
    bpe: CoreBPE,
    size: usize,
    overlap: usize,
}

impl TokenSplitter {
    pub fn new(size: usize, overlap: usize) -> Result<Self, StratumError> {
        Self::with_encoding(TokenEncoding::default(), size, overlap)
    }

    pub fn with_encoding(
        encoding: TokenEncoding,
        size: usize,
        overlap: usize,
    ) -> Result<Self, StratumError> {
        if size == 0 {
            return Err(StratumError::Config("chunk size must be positive".into()));
        }
        if overlap >= size {
            return Err(StratumError::Config(format!(
                "token overlap ({overlap}) must be smaller than chunk size ({size})"
            )));
        }
        Ok(Self {
            bpe: encoding.load()?,
            size,
            overlap,
        })
    }

    /// Token count of `text` under this splitter's encoding. Special-token
    /// markers in the input are treated as plain text.
    pub fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

impl TextSplitter for TokenSplitter {
    fn split_text(&self, text: &str) -> Result<Vec<String>, StratumError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let ids = self.bpe.encode_ordinary(text);
        let mut chunks = Vec::new();
        let mut start = 0;
        while start < ids.len() {
            let end = (start + self.size).min(ids.len());
            let window = ids[start..end].to_vec();
            let piece = self
                .bpe
                .decode(window)
                .map_err(|e| StratumError::Splitter(format!("token decode failed: {e}")))?;
            chunks.push(piece);
            if end == ids.len() {
                break;
            }
            start += self.size - self.overlap;
        }
        Ok(chunks)
    }
}
