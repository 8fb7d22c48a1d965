use std::collections::BTreeMap;

use lexi_types::NodeId;

use crate::error::DomError;

/// Element tag plus attributes
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Child-list change reported to an observer
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

/// Arena-backed page tree
///
/// Nodes are never freed; detached nodes simply lose their parent.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    body: NodeId,
    observed: bool,
    records: Vec<MutationRecord>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let body = Node {
            kind: NodeKind::Element(ElementData {
                tag: "body".to_string(),
                attributes: BTreeMap::new(),
            }),
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![body],
            body: NodeId(0),
            observed: false,
            records: Vec::new(),
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.create_element_with(tag, std::iter::empty::<(String, String)>())
    }

    pub fn create_element_with<I, K, V>(&mut self, tag: &str, attributes: I) -> NodeId
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let attributes = attributes
            .into_iter()
            .map(|(k, v)| (k.into().to_ascii_lowercase(), v.into()))
            .collect();
        self.push(NodeKind::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attributes,
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes.get(id.0).ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes.get_mut(id.0).ok_or(DomError::UnknownNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|n| &n.kind)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Element(_)))
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Text(_)))
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element(el) => Some(el.tag.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element(el) => el.attributes.get(name).map(String::as_str),
            NodeKind::Text(_) => None,
        }
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(el) => {
                el.attributes
                    .insert(name.to_ascii_lowercase(), value.to_string());
                Ok(())
            }
            NodeKind::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<(), DomError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(el) => {
                el.attributes.remove(name);
                Ok(())
            }
            NodeKind::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attribute(id, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Data of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Text(text) => Some(text.as_str()),
            NodeKind::Element(_) => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Text(data) => {
                *data = text.to_string();
                Ok(())
            }
            NodeKind::Element(_) => Err(DomError::NotText(id)),
        }
    }

    /// Concatenated text of every descendant text node
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(text) = self.text(node) {
                out.push_str(text);
            }
        }
        out
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Parent, grandparent, ... up to the root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// `root` and everything below it in document order
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        let stack = if self.contains(root) { vec![root] } else { Vec::new() };
        Descendants {
            doc: self,
            stack,
            expand: None,
        }
    }

    /// Whether the node is attached under the body
    pub fn is_connected(&self, id: NodeId) -> bool {
        id == self.body || self.ancestors(id).any(|a| a == self.body)
    }

    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.descendants(self.body)
            .find(|&n| self.attribute(n, "id") == Some(element_id))
    }

    /// `contenteditable` resolved through inheritance
    pub fn is_editable(&self, id: NodeId) -> bool {
        let start = if self.is_element(id) { Some(id) } else { self.parent(id) };
        let mut current = start;
        while let Some(node) = current {
            match self.attribute(node, "contenteditable") {
                Some("") | Some("true") | Some("plaintext-only") => return true,
                Some("false") => return false,
                _ => current = self.parent(node),
            }
        }
        false
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let len = self.node(parent)?.children.len();
        self.insert_at(parent, len, child)
    }

    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        let pos = self.position_in_parent(parent, reference)?;
        self.insert_at(parent, pos, child)
    }

    fn position_in_parent(&self, parent: NodeId, child: NodeId) -> Result<usize, DomError> {
        self.node(parent)?
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(DomError::NotAChild { parent, child })
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.node(child)?;
        match self.node(parent)?.kind {
            NodeKind::Element(_) => {}
            NodeKind::Text(_) => return Err(DomError::NotAnElement(parent)),
        }
        if child == parent || self.ancestors(parent).any(|a| a == child) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    fn insert_at(&mut self, parent: NodeId, pos: usize, child: NodeId) -> Result<(), DomError> {
        self.check_insertable(parent, child)?;
        let mut pos = pos;
        if let Some(old_parent) = self.parent(child) {
            let old_pos = self.position_in_parent(old_parent, child)?;
            self.node_mut(old_parent)?.children.remove(old_pos);
            if old_parent == parent && old_pos < pos {
                pos -= 1;
            }
        }
        self.node_mut(parent)?.children.insert(pos, child);
        self.node_mut(child)?.parent = Some(parent);
        self.record(parent, vec![child], Vec::new());
        Ok(())
    }

    /// Detach a node from its parent
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        let parent = self.parent(id).ok_or(DomError::Detached(id))?;
        let pos = self.position_in_parent(parent, id)?;
        self.node_mut(parent)?.children.remove(pos);
        self.node_mut(id)?.parent = None;
        self.record(parent, Vec::new(), vec![id]);
        Ok(())
    }

    /// Put `fragment` where `id` is and detach `id`, as one mutation
    pub fn replace_with(&mut self, id: NodeId, fragment: &[NodeId]) -> Result<(), DomError> {
        let parent = self.parent(id).ok_or(DomError::Detached(id))?;
        for &node in fragment {
            self.check_insertable(parent, node)?;
            if self.parent(node).is_some() {
                return Err(DomError::HierarchyRequest { parent, child: node });
            }
        }
        let pos = self.position_in_parent(parent, id)?;
        let siblings = &mut self.node_mut(parent)?.children;
        siblings.splice(pos..=pos, fragment.iter().copied());
        for &node in fragment {
            self.node_mut(node)?.parent = Some(parent);
        }
        self.node_mut(id)?.parent = None;
        self.record(parent, fragment.to_vec(), vec![id]);
        Ok(())
    }

    /// Merge adjacent text children and drop empty ones
    pub fn normalize(&mut self, id: NodeId) -> Result<(), DomError> {
        let children = self.node(id)?.children.clone();
        let mut kept: Vec<NodeId> = Vec::with_capacity(children.len());
        for child in children {
            let Some(text) = self.text(child).map(str::to_owned) else {
                kept.push(child);
                continue;
            };
            if text.is_empty() {
                self.node_mut(child)?.parent = None;
                continue;
            }
            match kept.last().copied() {
                Some(prev) if self.is_text(prev) => {
                    if let NodeKind::Text(data) = &mut self.node_mut(prev)?.kind {
                        data.push_str(&text);
                    }
                    self.node_mut(child)?.parent = None;
                }
                _ => kept.push(child),
            }
        }
        self.node_mut(id)?.children = kept;
        Ok(())
    }

    /// Start or stop collecting mutation records
    pub fn set_observed(&mut self, observed: bool) {
        self.observed = observed;
        if !observed {
            self.records.clear();
        }
    }

    pub fn is_observed(&self) -> bool {
        self.observed
    }

    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    fn record(&mut self, target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) {
        if self.observed {
            self.records.push(MutationRecord {
                target,
                added,
                removed,
            });
        }
    }

    /// Convenience for hosts: create `<tag>` holding `text` and append it
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attributes: &[(String, String)],
        text: &str,
    ) -> Result<NodeId, DomError> {
        let el = self.create_element_with(tag, attributes.iter().cloned());
        if !text.is_empty() {
            let t = self.create_text(text);
            self.append_child(el, t)?;
        }
        self.append_child(parent, el)?;
        Ok(el)
    }
}

pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

/// Pre-order walk; `skip_children` prunes the subtree of the last yielded node
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
    expand: Option<NodeId>,
}

impl Descendants<'_> {
    pub fn skip_children(&mut self) {
        self.expand = None;
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if let Some(last) = self.expand.take() {
            self.stack
                .extend(self.doc.children(last).iter().rev().copied());
        }
        let current = self.stack.pop()?;
        self.expand = Some(current);
        Some(current)
    }
}
