use std::collections::HashMap;

use scraper::{ElementRef, Html, Node};
use serde_json::Value;
use stratum_core::{StratumError, TextNode};

use crate::TextSplitter;

/// Splits HTML on configured header tags, tagging every chunk with the open
/// header hierarchy and the XPath of the element that opened it.
pub struct HtmlHeaderSplitter {
    headers_to_split_on: Vec<(String, String)>,
}

impl HtmlHeaderSplitter {
    /// Each pair maps a header tag to the metadata key for its text,
    /// e.g. `("h2", "Header 2")`. Order defines priority: earlier entries
    /// are shallower.
    pub fn new(headers_to_split_on: Vec<(String, String)>) -> Self {
        Self {
            headers_to_split_on: lowercase_tags(headers_to_split_on),
        }
    }

    /// Default configuration: split on h1, h2, h3.
    pub fn default_headers() -> Self {
        Self::new(
            (1..=3)
                .map(|depth| (format!("h{depth}"), format!("Header {depth}")))
                .collect(),
        )
    }

    pub fn split_html(&self, html: &str) -> Vec<TextNode> {
        let document = Html::parse_document(html);
        let levels: HashMap<&str, usize> = self
            .headers_to_split_on
            .iter()
            .enumerate()
            .map(|(level, (tag, _))| (tag.as_str(), level))
            .collect();

        let mut state = Walk {
            open: Vec::new(),
            buffer: Vec::new(),
            current_xpath: None,
            chunks: Vec::new(),
        };
        self.walk(document.root_element(), &levels, &mut state);
        state.flush();
        state.chunks
    }

    fn walk(&self, element: ElementRef<'_>, levels: &HashMap<&str, usize>, state: &mut Walk) {
        for child in element.children() {
            match child.value() {
                Node::Element(child_element) => {
                    let tag = child_element.name();
                    if matches!(tag, "head" | "script" | "style") {
                        continue;
                    }
                    let Some(child_ref) = ElementRef::wrap(child) else {
                        continue;
                    };
                    if let Some(&level) = levels.get(tag) {
                        state.flush();
                        state.open.retain(|(open_level, _, _)| *open_level < level);
                        let label = self.headers_to_split_on[level].1.clone();
                        state.open.push((level, label, element_text(child_ref)));
                        state.current_xpath = Some(xpath_of(child_ref));
                    } else {
                        self.walk(child_ref, levels, state);
                    }
                }
                Node::Text(text) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        state.buffer.push(trimmed.to_string());
                    }
                }
                _ => {}
            }
        }
    }
}

struct Walk {
    // Open headers as (level, metadata key, heading text).
    open: Vec<(usize, String, String)>,
    buffer: Vec<String>,
    current_xpath: Option<String>,
    chunks: Vec<TextNode>,
}

impl Walk {
    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let mut node = TextNode::new(self.buffer.join("\n"));
        for (_, label, text) in &self.open {
            node.metadata
                .insert(label.clone(), Value::String(text.clone()));
        }
        if let Some(xpath) = &self.current_xpath {
            node.metadata
                .insert("xpath".to_string(), Value::String(xpath.clone()));
        }
        self.buffer.clear();
        self.chunks.push(node);
    }
}

impl TextSplitter for HtmlHeaderSplitter {
    fn split_text(&self, text: &str) -> Result<Vec<String>, StratumError> {
        Ok(self
            .split_html(text)
            .into_iter()
            .map(|node| node.text)
            .collect())
    }

    fn split_nodes(&self, nodes: &[TextNode]) -> Result<Vec<TextNode>, StratumError> {
        let mut result = Vec::new();
        for node in nodes {
            result.extend(crate::attach_to_source(self.split_html(&node.text), node));
        }
        Ok(result)
    }
}

/// Splits HTML into one chunk per configured top-level section: a section
/// runs from one configured header to the next, and any nested sub-headers
/// are merged into the section's text rather than starting new chunks.
pub struct HtmlSectionSplitter {
    sections_to_split_on: Vec<(String, String)>,
}

impl HtmlSectionSplitter {
    pub fn new(sections_to_split_on: Vec<(String, String)>) -> Self {
        Self {
            sections_to_split_on: lowercase_tags(sections_to_split_on),
        }
    }

    pub fn default_sections() -> Self {
        Self::new(
            (1..=2)
                .map(|depth| (format!("h{depth}"), format!("Header {depth}")))
                .collect(),
        )
    }

    pub fn split_html(&self, html: &str) -> Vec<TextNode> {
        let document = Html::parse_document(html);
        let labels: HashMap<&str, &str> = self
            .sections_to_split_on
            .iter()
            .map(|(tag, label)| (tag.as_str(), label.as_str()))
            .collect();

        let mut state = SectionWalk {
            current: None,
            buffer: Vec::new(),
            chunks: Vec::new(),
        };
        self.walk(document.root_element(), &labels, &mut state);
        state.flush();
        state.chunks
    }

    fn walk(&self, element: ElementRef<'_>, labels: &HashMap<&str, &str>, state: &mut SectionWalk) {
        for child in element.children() {
            match child.value() {
                Node::Element(child_element) => {
                    let tag = child_element.name();
                    if matches!(tag, "head" | "script" | "style") {
                        continue;
                    }
                    let Some(child_ref) = ElementRef::wrap(child) else {
                        continue;
                    };
                    if let Some(label) = labels.get(tag) {
                        state.flush();
                        let header_text = element_text(child_ref);
                        state.current =
                            Some((label.to_string(), header_text.clone(), xpath_of(child_ref)));
                        state.buffer.push(header_text);
                    } else {
                        self.walk(child_ref, labels, state);
                    }
                }
                Node::Text(text) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        state.buffer.push(trimmed.to_string());
                    }
                }
                _ => {}
            }
        }
    }
}

struct SectionWalk {
    // The governing section header as (metadata key, heading text, xpath).
    current: Option<(String, String, String)>,
    buffer: Vec<String>,
    chunks: Vec<TextNode>,
}

impl SectionWalk {
    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let mut node = TextNode::new(self.buffer.join("\n"));
        if let Some((label, text, xpath)) = &self.current {
            node.metadata
                .insert(label.clone(), Value::String(text.clone()));
            node.metadata
                .insert("xpath".to_string(), Value::String(xpath.clone()));
        }
        self.buffer.clear();
        self.chunks.push(node);
    }
}

impl TextSplitter for HtmlSectionSplitter {
    fn split_text(&self, text: &str) -> Result<Vec<String>, StratumError> {
        Ok(self
            .split_html(text)
            .into_iter()
            .map(|node| node.text)
            .collect())
    }

    fn split_nodes(&self, nodes: &[TextNode]) -> Result<Vec<TextNode>, StratumError> {
        let mut result = Vec::new();
        for node in nodes {
            result.extend(crate::attach_to_source(self.split_html(&node.text), node));
        }
        Ok(result)
    }
}

fn lowercase_tags(pairs: Vec<(String, String)>) -> Vec<(String, String)> {
    pairs
        .into_iter()
        .map(|(tag, label)| (tag.to_ascii_lowercase(), label))
        .collect()
}

/// Concatenated text of an element with whitespace collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// 1-indexed XPath-like position of an element, counting same-tag preceding
/// siblings at every ancestor level.
fn xpath_of(element: ElementRef<'_>) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut current = Some(element);
    while let Some(el) = current {
        let name = el.value().name();
        let mut position = 1;
        for sibling in el.prev_siblings() {
            if let Some(sibling_el) = ElementRef::wrap(sibling) {
                if sibling_el.value().name() == name {
                    position += 1;
                }
            }
        }
        parts.push(format!("{name}[{position}]"));
        current = el.parent().and_then(ElementRef::wrap);
    }
    parts.reverse();
    format!("/{}", parts.join("/"))
}
