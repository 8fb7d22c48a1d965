use lexi_types::NodeId;

use crate::document::{Descendants, Document};
use crate::highlight::Highlighter;
use crate::resolver::MatchResolver;
use crate::term_index::TermIndex;

/// Elements whose text is never highlighted
const SKIPPED_TAGS: [&str; 6] = ["script", "style", "noscript", "textarea", "input", "select"];

/// Lazy depth-first sequence of text nodes that may be highlighted
///
/// Rejected elements prune their whole subtree.
pub struct EligibleTextNodes<'a> {
    doc: &'a Document,
    highlighter: &'a Highlighter,
    walk: Option<Descendants<'a>>,
}

impl<'a> EligibleTextNodes<'a> {
    pub fn new(doc: &'a Document, root: NodeId, highlighter: &'a Highlighter) -> Self {
        // A root inside a marker, a processed region or the extension's own UI yields nothing
        let blocked = doc
            .ancestors(root)
            .any(|a| rejects_subtree(doc, highlighter, a));
        let walk = (!blocked).then(|| doc.descendants(root));
        Self {
            doc,
            highlighter,
            walk,
        }
    }
}

fn rejects_subtree(doc: &Document, highlighter: &Highlighter, element: NodeId) -> bool {
    let Some(tag) = doc.tag(element) else {
        return false;
    };
    SKIPPED_TAGS.contains(&tag)
        || highlighter.is_marker(doc, element)
        || highlighter.is_processed(doc, element)
        || highlighter.is_reserved(doc, element)
}

impl Iterator for EligibleTextNodes<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let walk = self.walk.as_mut()?;
        while let Some(node) = walk.next() {
            if self.doc.is_element(node) {
                if rejects_subtree(self.doc, self.highlighter, node) {
                    walk.skip_children();
                }
                continue;
            }
            let Some(parent) = self.doc.parent(node) else {
                continue;
            };
            if self.doc.is_editable(parent) || self.highlighter.is_settled_gap(self.doc, node) {
                continue;
            }
            return Some(node);
        }
        None
    }
}

/// Outcome of one scan pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    pub visited: usize,
    pub highlighted: usize,
    pub markers: usize,
}

/// Walks eligible text and replaces matches with markers
#[derive(Debug, Clone)]
pub struct PageScanner {
    highlighter: Highlighter,
    min_word_len: usize,
}

impl PageScanner {
    pub fn new(highlighter: Highlighter, min_word_len: usize) -> Self {
        Self {
            highlighter,
            min_word_len,
        }
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    pub fn eligible_text_nodes<'a>(&'a self, doc: &'a Document, root: NodeId) -> EligibleTextNodes<'a> {
        EligibleTextNodes::new(doc, root, &self.highlighter)
    }

    /// One pass over the text currently under `root`
    ///
    /// Eligible nodes are snapshotted before any mutation, so content
    /// inserted by this pass is never revisited.
    pub fn scan_and_highlight(&self, doc: &mut Document, root: NodeId, index: &TermIndex) -> ScanReport {
        let mut report = ScanReport::default();
        if index.is_empty() {
            tracing::debug!("Term index empty, skipping scan");
            return report;
        }

        let resolver = MatchResolver::new(index, self.min_word_len);
        let nodes: Vec<NodeId> = self.eligible_text_nodes(doc, root).collect();

        for node in nodes {
            report.visited += 1;
            let matches = match doc.text(node) {
                Some(text) => resolver.resolve(text),
                None => continue,
            };
            if matches.is_empty() {
                continue;
            }
            match self.highlighter.render(doc, node, &matches) {
                Ok(0) => {}
                Ok(created) => {
                    report.highlighted += 1;
                    report.markers += created;
                }
                Err(e) => tracing::warn!("Failed to highlight {:?}: {}", node, e),
            }
        }

        tracing::debug!(
            "Scan visited {} text nodes, highlighted {}, created {} markers",
            report.visited,
            report.highlighted,
            report.markers
        );
        report
    }

    pub fn remove_highlights(&self, doc: &mut Document) -> usize {
        self.highlighter.remove_highlights(doc)
    }
}

#[cfg(test)]
mod tests {
    use lexi_config::highlight::HighlightConfig;

    use super::*;

    fn scanner() -> PageScanner {
        PageScanner::new(Highlighter::new(HighlightConfig::default()), 3)
    }

    fn add(doc: &mut Document, parent: NodeId, tag: &str, attrs: &[(&str, &str)], text: &str) -> NodeId {
        let attrs: Vec<(String, String)> = attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        doc.append_element(parent, tag, &attrs, text).unwrap()
    }

    fn index_of(terms: &[&str]) -> TermIndex {
        let mut index = TermIndex::new();
        for term in terms {
            index.insert(term);
        }
        index
    }

    #[test]
    fn test_eligibility_rules() {
        let mut doc = Document::new();
        let body = doc.body();
        add(&mut doc, body, "p", &[], "visible");
        add(&mut doc, body, "script", &[], "hidden script");
        add(&mut doc, body, "style", &[], "hidden style");
        add(&mut doc, body, "textarea", &[], "hidden textarea");
        add(&mut doc, body, "select", &[], "hidden select");
        add(&mut doc, body, "div", &[("contenteditable", "true")], "hidden editable");
        add(&mut doc, body, "div", &[("data-leximind-processed", "true")], "hidden processed");
        let host = add(&mut doc, body, "div", &[("id", "leximind-ai-host")], "");
        add(&mut doc, host, "p", &[], "hidden popup");
        let wrapper = add(&mut doc, body, "div", &[("data-leximind-processed", "true")], "");
        add(&mut doc, wrapper, "p", &[], "hidden nested");
        add(&mut doc, body, "span", &[("class", "leximind-clue")], "hidden marker");

        let scanner = scanner();
        let texts: Vec<&str> = scanner
            .eligible_text_nodes(&doc, body)
            .filter_map(|n| doc.text(n))
            .collect();
        assert_eq!(texts, vec!["visible"]);
    }

    #[test]
    fn test_root_inside_reserved_region_yields_nothing() {
        let mut doc = Document::new();
        let body = doc.body();
        let host = add(&mut doc, body, "div", &[("id", "leximind-ai-host")], "");
        let inner = add(&mut doc, host, "p", &[], "popup text");

        let scanner = scanner();
        assert_eq!(scanner.eligible_text_nodes(&doc, inner).count(), 0);
    }

    #[test]
    fn test_empty_index_performs_no_mutation() {
        let mut doc = Document::new();
        let body = doc.body();
        add(&mut doc, body, "p", &[], "machine learning everywhere");
        doc.set_observed(true);

        let report = scanner().scan_and_highlight(&mut doc, body, &TermIndex::new());

        assert_eq!(report, ScanReport::default());
        assert!(doc.take_records().is_empty());
    }

    #[test]
    fn test_scan_highlights_and_rescan_is_stable() {
        let mut doc = Document::new();
        let body = doc.body();
        add(&mut doc, body, "p", &[], "I study machine learning daily.");
        add(&mut doc, body, "p", &[], "Deep learning too.");
        add(&mut doc, body, "p", &[], "Nothing to see.");
        let index = index_of(&["machine learning", "learning"]);
        let scanner = scanner();

        let first = scanner.scan_and_highlight(&mut doc, body, &index);
        assert_eq!(first.visited, 3);
        assert_eq!(first.highlighted, 2);
        assert_eq!(first.markers, 2);

        let second = scanner.scan_and_highlight(&mut doc, body, &index);
        assert_eq!(second.markers, 0);
        assert_eq!(second.visited, 1);
        assert_eq!(
            scanner.highlighter().snapshot(&doc),
            "I study [machine learning] daily.\nDeep [learning] too.\nNothing to see.\n"
        );
    }

    #[test]
    fn test_toggle_off_restores_text() {
        let mut doc = Document::new();
        let body = doc.body();
        add(&mut doc, body, "p", &[], "Running late, I ran and run.");
        let list = add(&mut doc, body, "ul", &[], "");
        add(&mut doc, list, "li", &[], "runs");
        let before = doc.text_content(body);

        let index = index_of(&["run", "running", "ran", "runs"]);
        let scanner = scanner();
        assert_eq!(scanner.scan_and_highlight(&mut doc, body, &index).markers, 4);

        assert_eq!(scanner.remove_highlights(&mut doc), 4);
        assert_eq!(doc.text_content(body), before);
        for p in doc.descendants(body).filter(|&n| doc.tag(n) == Some("p")) {
            assert_eq!(doc.children(p).len(), 1);
        }
    }

    #[test]
    fn test_text_directly_in_body_keeps_body_scannable() {
        let mut doc = Document::new();
        let body = doc.body();
        let text = doc.create_text("serendipity at the top level");
        doc.append_child(body, text).unwrap();
        let index = index_of(&["serendipity"]);
        let scanner = scanner();

        assert_eq!(scanner.scan_and_highlight(&mut doc, body, &index).markers, 1);
        assert!(!scanner.highlighter().is_processed(&doc, body));

        add(&mut doc, body, "p", &[], "More serendipity below.");
        assert_eq!(scanner.scan_and_highlight(&mut doc, body, &index).markers, 1);
        assert_eq!(scanner.highlighter().markers(&doc).len(), 2);
    }

    #[test]
    fn test_rescan_of_body_level_text_is_stable() {
        let mut doc = Document::new();
        let body = doc.body();
        let text = doc.create_text("abc def ghi");
        doc.append_child(body, text).unwrap();
        let index = index_of(&["abc def", "def ghi", "ghi"]);
        let scanner = scanner();

        assert_eq!(scanner.scan_and_highlight(&mut doc, body, &index).markers, 1);
        let first = scanner.highlighter().snapshot(&doc);
        assert_eq!(first, "[abc def] ghi");

        let second = scanner.scan_and_highlight(&mut doc, body, &index);
        assert_eq!(second.visited, 0);
        assert_eq!(second.markers, 0);
        assert_eq!(scanner.highlighter().snapshot(&doc), first);
    }
}
