use serde_json::{Map, Value};
use stratum_core::StratumError;
use tracing::warn;

use crate::TextSplitter;

/// Recursively splits a JSON value into fragments that each serialize
/// within `max_size`, preserving the full key path from the root so the
/// fragments can be merged back into the original value.
///
/// Structure is never split mid-value: an oversized entry recurses, and
/// only a long string leaf is char-sliced as a last resort. Adjacent small
/// array items are greedily re-packed into one fragment.
pub struct RecursiveJsonSplitter {
    max_size: usize,
    min_size: usize,
    convert_lists: bool,
    ensure_ascii: bool,
}

#[derive(Clone)]
enum Seg {
    Key(String),
    Index,
}

impl RecursiveJsonSplitter {
    pub fn new(max_size: usize) -> Result<Self, StratumError> {
        if max_size == 0 {
            return Err(StratumError::Config("max size must be positive".into()));
        }
        Ok(Self {
            max_size,
            min_size: max_size.saturating_sub(200),
            convert_lists: false,
            ensure_ascii: true,
        })
    }

    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    /// Rewrite arrays as index-keyed objects before chunking.
    pub fn with_convert_lists(mut self, convert_lists: bool) -> Self {
        self.convert_lists = convert_lists;
        self
    }

    /// When set, non-ASCII code points are escaped (`\uXXXX`) before the
    /// size check; when unset, sizing uses raw UTF-8 byte length.
    pub fn with_ensure_ascii(mut self, ensure_ascii: bool) -> Self {
        self.ensure_ascii = ensure_ascii;
        self
    }

    /// Serialize a fragment the way it is measured.
    pub fn serialize(&self, value: &Value) -> Result<String, StratumError> {
        let rendered = serde_json::to_string(value)?;
        Ok(if self.ensure_ascii {
            escape_non_ascii(&rendered)
        } else {
            rendered
        })
    }

    fn json_size(&self, value: &Value) -> Result<usize, StratumError> {
        Ok(self.serialize(value)?.len())
    }

    pub fn split_json(&self, data: &Value) -> Result<Vec<Value>, StratumError> {
        let data = if self.convert_lists {
            convert_lists(data)
        } else {
            data.clone()
        };

        if self.json_size(&data)? <= self.max_size {
            return Ok(vec![data]);
        }

        let template = match &data {
            Value::Array(_) => Value::Array(Vec::new()),
            _ => Value::Object(Map::new()),
        };
        let mut chunks = vec![template.clone()];
        self.recurse(&data, &mut Vec::new(), &mut chunks, &template)?;
        chunks.retain(|chunk| match chunk {
            Value::Object(map) => !map.is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => true,
        });
        Ok(chunks)
    }

    fn recurse(
        &self,
        data: &Value,
        path: &mut Vec<Seg>,
        chunks: &mut Vec<Value>,
        template: &Value,
    ) -> Result<(), StratumError> {
        match data {
            Value::Object(map) => {
                for (key, value) in map {
                    let mut single = Map::new();
                    single.insert(key.clone(), value.clone());
                    let entry_size = self.json_size(&Value::Object(single))?;
                    let current_size = self.json_size(last_chunk(chunks))?;
                    let remaining = self.max_size.saturating_sub(current_size);

                    path.push(Seg::Key(key.clone()));
                    if entry_size < remaining {
                        set_nested(last_chunk_mut(chunks), path, value.clone());
                    } else {
                        if current_size >= self.min_size {
                            chunks.push(template.clone());
                        }
                        self.recurse(value, path, chunks, template)?;
                    }
                    path.pop();
                }
            }
            Value::Array(items) => {
                self.split_array(items, path, chunks, template)?;
            }
            leaf => {
                self.place_leaf(leaf, path, chunks, template)?;
            }
        }
        Ok(())
    }

    /// Greedily re-pack adjacent small items into array fragments; an item
    /// too large for a fragment of its own recurses instead.
    fn split_array(
        &self,
        items: &[Value],
        path: &mut Vec<Seg>,
        chunks: &mut Vec<Value>,
        template: &Value,
    ) -> Result<(), StratumError> {
        let mut pending: Vec<Value> = Vec::new();
        for item in items {
            // Two bytes of bracket overhead for the enclosing fragment.
            if self.json_size(item)? + 2 > self.max_size {
                if !pending.is_empty() {
                    self.emit_array_fragment(std::mem::take(&mut pending), path, chunks, template)?;
                }
                if self.json_size(last_chunk(chunks))? >= self.min_size {
                    chunks.push(template.clone());
                }
                path.push(Seg::Index);
                self.recurse(item, path, chunks, template)?;
                path.pop();
                continue;
            }

            let mut candidate = pending.clone();
            candidate.push(item.clone());
            if self.json_size(&Value::Array(candidate.clone()))? > self.max_size
                && !pending.is_empty()
            {
                self.emit_array_fragment(std::mem::take(&mut pending), path, chunks, template)?;
            }
            pending.push(item.clone());
        }
        if !pending.is_empty() {
            self.emit_array_fragment(pending, path, chunks, template)?;
        }
        Ok(())
    }

    fn emit_array_fragment(
        &self,
        batch: Vec<Value>,
        path: &mut Vec<Seg>,
        chunks: &mut Vec<Value>,
        template: &Value,
    ) -> Result<(), StratumError> {
        let fragment = Value::Array(batch);
        let fragment_size = self.json_size(&fragment)?;
        let current_size = self.json_size(last_chunk(chunks))?;
        if current_size + fragment_size > self.max_size && current_size >= self.min_size {
            chunks.push(template.clone());
        }
        set_nested(last_chunk_mut(chunks), path, fragment);
        Ok(())
    }

    fn place_leaf(
        &self,
        leaf: &Value,
        path: &mut Vec<Seg>,
        chunks: &mut Vec<Value>,
        template: &Value,
    ) -> Result<(), StratumError> {
        if let Value::String(text) = leaf {
            let overhead = {
                let mut probe = last_chunk(chunks).clone();
                set_nested(&mut probe, path, Value::String(String::new()));
                self.json_size(&probe)?
            };
            if overhead + escaped_len(text, self.ensure_ascii) > self.max_size {
                self.slice_string(text, path, chunks, template)?;
                return Ok(());
            }
        } else if self.json_size(leaf)? > self.max_size {
            warn!(
                max = self.max_size,
                "indivisible JSON scalar exceeds max size; emitting verbatim"
            );
        }
        set_nested(last_chunk_mut(chunks), path, leaf.clone());
        Ok(())
    }

    /// Last resort: slice a long string leaf into raw character pieces that
    /// each fit alongside their key-path overhead.
    fn slice_string(
        &self,
        text: &str,
        path: &mut Vec<Seg>,
        chunks: &mut Vec<Value>,
        template: &Value,
    ) -> Result<(), StratumError> {
        let overhead = {
            let mut probe = template.clone();
            set_nested(&mut probe, path, Value::String(String::new()));
            self.json_size(&probe)?
        };
        let budget = self.max_size.saturating_sub(overhead).max(1);

        let mut piece = String::new();
        let mut piece_len = 0usize;
        for ch in text.chars() {
            let ch_len = escaped_len(&ch.to_string(), self.ensure_ascii);
            if piece_len + ch_len > budget && !piece.is_empty() {
                self.emit_string_piece(std::mem::take(&mut piece), path, chunks, template);
                piece_len = 0;
            }
            piece.push(ch);
            piece_len += ch_len;
        }
        if !piece.is_empty() {
            self.emit_string_piece(piece, path, chunks, template);
        }
        Ok(())
    }

    fn emit_string_piece(
        &self,
        piece: String,
        path: &mut Vec<Seg>,
        chunks: &mut Vec<Value>,
        template: &Value,
    ) {
        if path.is_empty() {
            chunks.push(Value::String(piece));
            return;
        }
        let needs_new = match last_chunk(chunks) {
            Value::Object(map) => !map.is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => true,
        };
        if needs_new {
            chunks.push(template.clone());
        }
        set_nested(last_chunk_mut(chunks), path, Value::String(piece));
    }
}

fn last_chunk(chunks: &[Value]) -> &Value {
    &chunks[chunks.len() - 1]
}

fn last_chunk_mut(chunks: &mut [Value]) -> &mut Value {
    let last = chunks.len() - 1;
    &mut chunks[last]
}

/// Write `value` at `path` inside a fragment, creating intermediate
/// objects (for keys) and single-element arrays (for array positions).
fn set_nested(slot: &mut Value, path: &[Seg], value: Value) {
    match path.split_first() {
        None => {
            // Two array fragments landing at the same path in one chunk
            // extend each other instead of clobbering.
            if let Value::Array(incoming) = value {
                if let Value::Array(existing) = slot {
                    existing.extend(incoming);
                } else {
                    *slot = Value::Array(incoming);
                }
            } else {
                *slot = value;
            }
        }
        Some((Seg::Key(key), rest)) => {
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(map) = slot {
                let child = map.entry(key.clone()).or_insert(Value::Null);
                set_nested(child, rest, value);
            }
        }
        Some((Seg::Index, rest)) => {
            if !slot.is_array() {
                *slot = Value::Array(Vec::new());
            }
            if let Value::Array(items) = slot {
                if rest.is_empty() {
                    items.push(value);
                } else {
                    if items.is_empty() {
                        items.push(Value::Null);
                    }
                    if let Some(last) = items.last_mut() {
                        set_nested(last, rest, value);
                    }
                }
            }
        }
    }
}

/// Rewrite arrays as index-keyed objects, recursively.
fn convert_lists(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Object(
            items
                .iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), convert_lists(item)))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), convert_lists(item)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Escape non-ASCII code points as JSON `\uXXXX` sequences (UTF-16 units).
fn escape_non_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii() {
            out.push(ch);
        } else {
            let mut buffer = [0u16; 2];
            for unit in ch.encode_utf16(&mut buffer) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}

/// Length contribution of `text` inside a serialized JSON string.
fn escaped_len(text: &str, ensure_ascii: bool) -> usize {
    text.chars()
        .map(|ch| {
            if ch == '"' || ch == '\\' {
                2
            } else if ch.is_ascii_control() {
                match ch {
                    '\n' | '\r' | '\t' => 2,
                    _ => 6,
                }
            } else if ch.is_ascii() {
                1
            } else if ensure_ascii {
                6 * ch.encode_utf16(&mut [0u16; 2]).len()
            } else {
                ch.len_utf8()
            }
        })
        .sum()
}

impl TextSplitter for RecursiveJsonSplitter {
    fn split_text(&self, text: &str) -> Result<Vec<String>, StratumError> {
        let value: Value = serde_json::from_str(text)?;
        self.split_json(&value)?
            .iter()
            .map(|fragment| self.serialize(fragment))
            .collect()
    }
}

