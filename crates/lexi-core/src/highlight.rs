use std::collections::BTreeSet;

use lexi_config::highlight::HighlightConfig;
use lexi_types::{Match, NodeId};

use crate::document::Document;
use crate::error::DomError;

/// Writes and dissolves marker elements
#[derive(Debug, Clone)]
pub struct Highlighter {
    config: HighlightConfig,
}

impl Highlighter {
    pub fn new(config: HighlightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    pub fn is_marker(&self, doc: &Document, node: NodeId) -> bool {
        doc.is_element(node) && doc.has_class(node, &self.config.marker_class)
    }

    pub fn is_processed(&self, doc: &Document, node: NodeId) -> bool {
        doc.attribute(node, &self.config.processed_attribute).is_some()
    }

    /// Element carrying a reserved id, e.g. the popup host
    pub fn is_reserved(&self, doc: &Document, node: NodeId) -> bool {
        doc.attribute(node, "id")
            .is_some_and(|id| id.starts_with(&self.config.reserved_prefix))
    }

    /// The node or one of its ancestors belongs to the extension
    pub fn is_extension_owned(&self, doc: &Document, node: NodeId) -> bool {
        self.is_reserved(doc, node) || doc.ancestors(node).any(|a| self.is_reserved(doc, a))
    }

    /// Text left between markers directly under the body
    ///
    /// The body never carries the processed flag, so these runs are
    /// recognised by their marker neighbours instead.
    pub fn is_settled_gap(&self, doc: &Document, node: NodeId) -> bool {
        let body = doc.body();
        if !doc.is_text(node) || doc.parent(node) != Some(body) {
            return false;
        }
        let siblings = doc.children(body);
        let Some(pos) = siblings.iter().position(|&n| n == node) else {
            return false;
        };
        let before = pos.checked_sub(1).and_then(|i| siblings.get(i));
        let after = siblings.get(pos + 1);
        before
            .into_iter()
            .chain(after)
            .any(|&n| self.is_marker(doc, n))
    }

    pub fn marker_key<'d>(&self, doc: &'d Document, marker: NodeId) -> Option<&'d str> {
        doc.attribute(marker, &self.config.key_attribute)
    }

    /// The marker containing `node`, if any (a click may land on the marker's text)
    pub fn enclosing_marker(&self, doc: &Document, node: NodeId) -> Option<NodeId> {
        std::iter::once(node)
            .chain(doc.ancestors(node))
            .find(|&n| self.is_marker(doc, n))
    }

    /// Every marker under the body in document order
    pub fn markers(&self, doc: &Document) -> Vec<NodeId> {
        doc.descendants(doc.body())
            .filter(|&n| self.is_marker(doc, n))
            .collect()
    }

    /// Replace `node` with plain text runs and markers for `matches`
    ///
    /// `matches` must be ordered and non-overlapping. Returns markers created.
    pub fn render(
        &self,
        doc: &mut Document,
        node: NodeId,
        matches: &[Match],
    ) -> Result<usize, DomError> {
        if matches.is_empty() {
            return Ok(0);
        }
        let text = doc.text(node).ok_or(DomError::NotText(node))?.to_string();
        let parent = doc.parent(node).ok_or(DomError::Detached(node))?;

        let mut fragment = Vec::with_capacity(matches.len() * 2 + 1);
        let mut markers = 0;
        let mut cursor = 0;
        for m in matches {
            let (Some(gap), Some(surface)) = (text.get(cursor..m.start), text.get(m.start..m.end()))
            else {
                tracing::warn!("Dropping match '{}' at {}: not on a char boundary", m.term, m.start);
                continue;
            };
            if !gap.is_empty() {
                fragment.push(doc.create_text(gap));
            }
            fragment.push(self.create_marker(doc, surface, &m.term)?);
            markers += 1;
            cursor = m.end();
        }
        if markers == 0 {
            return Ok(0);
        }
        if let Some(tail) = text.get(cursor..)
            && !tail.is_empty()
        {
            fragment.push(doc.create_text(tail));
        }

        doc.replace_with(node, &fragment)?;
        // Marking the body would shut every later insertion out of rescans
        if parent != doc.body() {
            doc.set_attribute(parent, &self.config.processed_attribute, "true")?;
        }
        Ok(markers)
    }

    fn create_marker(&self, doc: &mut Document, surface: &str, key: &str) -> Result<NodeId, DomError> {
        let marker = doc.create_element_with(
            &self.config.marker_tag,
            [
                ("class", self.config.marker_class.as_str()),
                (self.config.key_attribute.as_str(), key),
                ("style", self.config.marker_style.as_str()),
            ],
        );
        let text = doc.create_text(surface);
        doc.append_child(marker, text)?;
        Ok(marker)
    }

    /// Dissolve every marker back into plain text; returns markers removed
    pub fn remove_highlights(&self, doc: &mut Document) -> usize {
        let markers = self.markers(doc);
        let mut parents = BTreeSet::new();
        let mut removed = 0;

        for marker in markers {
            let Some(parent) = doc.parent(marker) else {
                continue;
            };
            let text = doc.text_content(marker);
            let plain = doc.create_text(&text);
            match doc.replace_with(marker, &[plain]) {
                Ok(()) => {
                    parents.insert(parent);
                    removed += 1;
                }
                Err(e) => tracing::warn!("Failed to dissolve marker {:?}: {}", marker, e),
            }
        }

        for parent in parents {
            if let Err(e) = doc.normalize(parent) {
                tracing::warn!("Failed to normalize {:?}: {}", parent, e);
            }
        }

        let processed: Vec<NodeId> = doc
            .descendants(doc.body())
            .filter(|&n| self.is_processed(doc, n))
            .collect();
        for node in processed {
            if let Err(e) = doc.remove_attribute(node, &self.config.processed_attribute) {
                tracing::warn!("Failed to clear processed flag on {:?}: {}", node, e);
            }
        }

        removed
    }

    /// Page text with markers shown as `[surface]`
    pub fn snapshot(&self, doc: &Document) -> String {
        let mut out = String::new();
        self.write_snapshot(doc, doc.body(), &mut out);
        out
    }

    fn write_snapshot(&self, doc: &Document, node: NodeId, out: &mut String) {
        if let Some(text) = doc.text(node) {
            out.push_str(text);
            return;
        }
        if self.is_marker(doc, node) {
            out.push('[');
            out.push_str(&doc.text_content(node));
            out.push(']');
            return;
        }
        let block = matches!(doc.tag(node), Some("p" | "div" | "li" | "h1" | "h2" | "h3"));
        for &child in doc.children(node) {
            self.write_snapshot(doc, child, out);
        }
        if block && !out.ends_with('\n') {
            out.push('\n');
        }
    }
}
