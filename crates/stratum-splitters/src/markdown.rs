use std::collections::HashMap;

use serde_json::Value;
use stratum_core::{StratumError, TextNode};

use crate::TextSplitter;

/// Splits markdown on heading lines, tagging every emitted chunk with the
/// most recent heading text at each configured depth at or above it.
///
/// Code fences suppress heading detection. `return_each_line` emits one
/// node per source line (still tagged with its inherited headings) for
/// consumers that need line-level granularity with header context.
pub struct MarkdownHeaderSplitter {
    headers_to_split_on: Vec<(String, String)>,
    return_each_line: bool,
    strip_headers: bool,
}

impl MarkdownHeaderSplitter {
    /// `headers_to_split_on` pairs a heading prefix with the metadata key to
    /// store its text under, e.g. `("##", "Header 2")`.
    pub fn new(headers_to_split_on: Vec<(String, String)>) -> Self {
        Self {
            headers_to_split_on,
            return_each_line: false,
            strip_headers: true,
        }
    }

    /// Default configuration: split on #, ##, ###.
    pub fn default_headers() -> Self {
        Self::new(
            (1..=3)
                .map(|depth| ("#".repeat(depth), format!("Header {depth}")))
                .collect(),
        )
    }

    /// All six heading depths.
    pub fn all_headers() -> Self {
        Self::new(
            (1..=6)
                .map(|depth| ("#".repeat(depth), format!("Header {depth}")))
                .collect(),
        )
    }

    pub fn with_return_each_line(mut self, return_each_line: bool) -> Self {
        self.return_each_line = return_each_line;
        self
    }

    pub fn with_strip_headers(mut self, strip_headers: bool) -> Self {
        self.strip_headers = strip_headers;
        self
    }

    /// Split markdown into nodes carrying header metadata.
    pub fn split_markdown(&self, text: &str) -> Vec<TextNode> {
        // Longest prefix first so "###" is not matched as "#".
        let mut headers = self.headers_to_split_on.clone();
        headers.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let mut blocks: Vec<(Vec<String>, HashMap<String, String>)> = Vec::new();
        let mut current_lines: Vec<String> = Vec::new();
        let mut current_meta: HashMap<String, String> = HashMap::new();
        // Open headers as (depth, metadata key, heading text).
        let mut stack: Vec<(usize, String, String)> = Vec::new();
        let mut in_code_block = false;
        let mut opening_fence = "";

        for line in text.lines() {
            let stripped = line.trim();

            if !in_code_block {
                if stripped.starts_with("```") && stripped.matches("```").count() == 1 {
                    in_code_block = true;
                    opening_fence = "```";
                } else if stripped.starts_with("~~~") {
                    in_code_block = true;
                    opening_fence = "~~~";
                }
            } else if stripped.starts_with(opening_fence) {
                in_code_block = false;
                opening_fence = "";
            }

            if in_code_block {
                current_lines.push(stripped.to_string());
                continue;
            }

            let mut matched: Option<(String, usize, String)> = None;
            for (prefix, name) in &headers {
                if let Some(rest) = stripped.strip_prefix(prefix.as_str()) {
                    if rest.is_empty() || rest.starts_with(' ') {
                        matched = Some((name.clone(), prefix.len(), rest.trim().to_string()));
                        break;
                    }
                }
            }

            if let Some((name, depth, header_text)) = matched {
                if !current_lines.is_empty() {
                    blocks.push((std::mem::take(&mut current_lines), current_meta.clone()));
                }
                while stack
                    .last()
                    .is_some_and(|(open_depth, _, _)| *open_depth >= depth)
                {
                    if let Some((_, open_name, _)) = stack.pop() {
                        current_meta.remove(&open_name);
                    }
                }
                stack.push((depth, name.clone(), header_text.clone()));
                current_meta.insert(name, header_text);
                if !self.strip_headers {
                    current_lines.push(stripped.to_string());
                }
            } else if !stripped.is_empty() {
                current_lines.push(stripped.to_string());
            } else if !current_lines.is_empty() {
                blocks.push((std::mem::take(&mut current_lines), current_meta.clone()));
            }
        }
        if !current_lines.is_empty() {
            blocks.push((current_lines, current_meta));
        }

        if self.return_each_line {
            return blocks
                .into_iter()
                .flat_map(|(lines, meta)| {
                    lines
                        .into_iter()
                        .map(move |line| to_node(line, &meta))
                        .collect::<Vec<_>>()
                })
                .collect();
        }

        // Aggregate consecutive blocks that share the same header metadata.
        let mut aggregated: Vec<(String, HashMap<String, String>)> = Vec::new();
        for (lines, meta) in blocks {
            let content = lines.join("\n");
            match aggregated.last_mut() {
                Some((existing, existing_meta)) if *existing_meta == meta => {
                    existing.push('\n');
                    existing.push_str(&content);
                }
                _ => aggregated.push((content, meta)),
            }
        }
        aggregated
            .into_iter()
            .map(|(content, meta)| to_node(content, &meta))
            .collect()
    }
}

fn to_node(content: String, meta: &HashMap<String, String>) -> TextNode {
    let mut node = TextNode::new(content);
    for (key, value) in meta {
        node.metadata
            .insert(key.clone(), Value::String(value.clone()));
    }
    node
}

impl TextSplitter for MarkdownHeaderSplitter {
    fn split_text(&self, text: &str) -> Result<Vec<String>, StratumError> {
        Ok(self
            .split_markdown(text)
            .into_iter()
            .map(|node| node.text)
            .collect())
    }

    fn split_nodes(&self, nodes: &[TextNode]) -> Result<Vec<TextNode>, StratumError> {
        let mut result = Vec::new();
        for node in nodes {
            result.extend(crate::attach_to_source(self.split_markdown(&node.text), node));
        }
        Ok(result)
    }
}
