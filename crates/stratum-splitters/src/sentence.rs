use stratum_core::StratumError;
use tracing::warn;

use crate::TextSplitter;

const DEFAULT_SENTENCE_ENDERS: [char; 3] = ['.', '!', '?'];

/// Honorific titles that end in a period without ending a sentence.
const TITLES: [&str; 15] = [
    "Dr", "Mr", "Mrs", "Ms", "Prof", "Sr", "Jr", "St", "Rev", "Gen", "Hon", "Capt", "Lt", "Col",
    "Sgt",
];

/// Groups whole sentences into chunks of at most `max_size` length-units,
/// closing early once a chunk reaches `target_size` and seeding each new
/// chunk with a trailing-sentence overlap window.
///
/// A sentence that alone exceeds `max_size` falls back to word-boundary
/// splitting, and a word that alone exceeds `max_size` falls back to
/// character splitting; either fallback level can be disabled.
pub struct SentenceSplitter {
    max_size: usize,
    target_size: usize,
    overlap: usize,
    sentence_enders: Vec<char>,
    fallback_to_words: bool,
    fallback_to_characters: bool,
}

impl SentenceSplitter {
    pub fn new(max_size: usize, overlap: usize) -> Result<Self, StratumError> {
        if max_size == 0 {
            return Err(StratumError::Config("max size must be positive".into()));
        }
        if overlap > max_size {
            return Err(StratumError::Config(format!(
                "got a larger overlap ({overlap}) than max size ({max_size}); overlap must be smaller"
            )));
        }
        Ok(Self {
            max_size,
            target_size: max_size * 4 / 5,
            overlap,
            sentence_enders: DEFAULT_SENTENCE_ENDERS.to_vec(),
            fallback_to_words: true,
            fallback_to_characters: true,
        })
    }

    pub fn with_target_size(mut self, target_size: usize) -> Result<Self, StratumError> {
        if target_size > self.max_size {
            return Err(StratumError::Config(format!(
                "target size ({target_size}) must not exceed max size ({})",
                self.max_size
            )));
        }
        self.target_size = target_size;
        Ok(self)
    }

    pub fn with_sentence_enders(mut self, enders: Vec<char>) -> Self {
        self.sentence_enders = enders;
        self
    }

    pub fn with_word_fallback(mut self, enabled: bool) -> Self {
        self.fallback_to_words = enabled;
        self
    }

    pub fn with_character_fallback(mut self, enabled: bool) -> Self {
        self.fallback_to_characters = enabled;
        self
    }

    /// Scan for sentence boundaries: a configured ender counts only when the
    /// whitespace that follows it is followed by an uppercase letter and the
    /// token before it is not a recognized abbreviation.
    pub fn split_into_sentences(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut sentences = Vec::new();
        let mut start = 0;

        for i in 0..chars.len() {
            if self.sentence_enders.contains(&chars[i]) && self.is_boundary(&chars, i, start) {
                let sentence: String = chars[start..=i].iter().collect();
                let trimmed = sentence.trim();
                if !trimmed.is_empty() {
                    sentences.push(trimmed.to_string());
                }
                start = i + 1;
            }
        }
        if start < chars.len() {
            let tail: String = chars[start..].iter().collect();
            let trimmed = tail.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
        }
        sentences
    }

    fn is_boundary(&self, chars: &[char], idx: usize, start: usize) -> bool {
        let mut next = idx + 1;
        if next >= chars.len() {
            return true;
        }
        if !chars[next].is_whitespace() {
            return false;
        }
        while next < chars.len() && chars[next].is_whitespace() {
            next += 1;
        }
        if next >= chars.len() {
            return true;
        }
        if !chars[next].is_uppercase() {
            return false;
        }

        let mut word_start = idx;
        while word_start > start && !chars[word_start - 1].is_whitespace() {
            word_start -= 1;
        }
        let token: String = chars[word_start..=idx].iter().collect();
        !is_abbreviation(&token)
    }

    fn close_group(
        &self,
        chunks: &mut Vec<String>,
        current: &mut Vec<String>,
        current_len: &mut usize,
        incoming_len: usize,
        emit: bool,
    ) {
        if current.is_empty() {
            return;
        }
        // `emit` is false when `current` holds only the previous chunk's
        // overlap seed, which has already been emitted.
        if emit {
            chunks.push(current.join(" "));
        }

        // Seed the next chunk with the maximal trailing-sentence window that
        // fits the overlap budget and still leaves room for the incoming
        // sentence.
        let mut seed: Vec<String> = Vec::new();
        let mut seed_len = 0usize;
        for sentence in current.iter().rev() {
            let sentence_len = sentence.chars().count();
            let join_len = if seed.is_empty() { 0 } else { 1 };
            if seed_len + join_len + sentence_len > self.overlap {
                break;
            }
            let incoming_join = if incoming_len == 0 { 0 } else { 1 };
            if seed_len + join_len + sentence_len + incoming_join + incoming_len > self.max_size {
                break;
            }
            seed_len += join_len + sentence_len;
            seed.insert(0, sentence.clone());
        }
        *current = seed;
        *current_len = seed_len;
    }

    fn split_oversized_sentence(&self, sentence: &str) -> Vec<String> {
        if !self.fallback_to_words {
            warn!(
                sentence_len = sentence.chars().count(),
                max = self.max_size,
                "sentence exceeds max size and word fallback is disabled; emitting verbatim"
            );
            return vec![sentence.to_string()];
        }

        let mut chunks: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in sentence.split_whitespace() {
            let word_len = word.chars().count();
            if word_len > self.max_size {
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                if self.fallback_to_characters {
                    chunks.extend(split_by_characters(word, self.max_size));
                } else {
                    warn!(
                        word_len,
                        max = self.max_size,
                        "word exceeds max size and character fallback is disabled; emitting verbatim"
                    );
                    chunks.push(word.to_string());
                }
                continue;
            }

            let join_len = if current.is_empty() { 0 } else { 1 };
            if current_len + join_len + word_len > self.max_size {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if !current.is_empty() {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(word);
            current_len += word_len;
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }
}

impl TextSplitter for SentenceSplitter {
    fn split_text(&self, text: &str) -> Result<Vec<String>, StratumError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let sentences = self.split_into_sentences(text);
        let mut chunks: Vec<String> = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut current_len = 0usize;
        // Whether `current` holds anything beyond the seeded overlap window;
        // an overlap-only tail has already been emitted.
        let mut fresh = false;

        for sentence in sentences {
            let sentence_len = sentence.chars().count();

            if sentence_len > self.max_size {
                if fresh && !current.is_empty() {
                    chunks.push(current.join(" "));
                }
                current.clear();
                current_len = 0;
                fresh = false;
                chunks.extend(self.split_oversized_sentence(&sentence));
                continue;
            }

            if !current.is_empty() && current_len + 1 + sentence_len > self.max_size {
                self.close_group(&mut chunks, &mut current, &mut current_len, sentence_len, fresh);
                fresh = false;
            }

            if !current.is_empty() {
                current_len += 1;
            }
            current_len += sentence_len;
            current.push(sentence);
            fresh = true;

            if current_len >= self.target_size {
                self.close_group(&mut chunks, &mut current, &mut current_len, 0, true);
                fresh = false;
            }
        }

        if fresh && !current.is_empty() {
            chunks.push(current.join(" "));
        }
        Ok(chunks)
    }
}

fn split_by_characters(word: &str, max_size: usize) -> Vec<String> {
    word.chars()
        .collect::<Vec<char>>()
        .chunks(max_size)
        .map(|piece| piece.iter().collect())
        .collect()
}

/// Abbreviation classes that suppress a sentence boundary: honorific
/// titles, dotted initialisms (`U.S.A.`, `a.m.`), single capital letters,
/// and bare numbers.
fn is_abbreviation(token: &str) -> bool {
    let trimmed = token.trim_end_matches(['.', '!', '?']);
    if trimmed.is_empty() {
        return false;
    }
    if TITLES.contains(&trimmed) {
        return true;
    }
    if is_dotted_initialism(token) {
        return true;
    }
    let mut chars = trimmed.chars();
    if let (Some(only), None) = (chars.next(), chars.next()) {
        if only.is_uppercase() {
            return true;
        }
    }
    if trimmed.chars().any(|c| c.is_ascii_digit())
        && trimmed.chars().all(|c| c.is_ascii_digit() || c == '.')
    {
        return true;
    }
    matches!(trimmed.to_ascii_lowercase().as_str(), "am" | "pm")
}

/// Alternating letter/dot runs with at least two dots: `U.S.A.`, `a.m.`.
fn is_dotted_initialism(token: &str) -> bool {
    let mut expecting_letter = true;
    let mut dots = 0;
    for ch in token.chars() {
        if expecting_letter {
            if !ch.is_alphabetic() {
                return false;
            }
        } else {
            if ch != '.' {
                return false;
            }
            dots += 1;
        }
        expecting_letter = !expecting_letter;
    }
    dots >= 2 && expecting_letter
}
