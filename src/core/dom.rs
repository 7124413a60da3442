// src/core/dom.rs
//
// Read-only page snapshot. Algorithms in `specs` only see `DomView`; any
// browser-automation adapter can satisfy it. `Document` is the arena tree
// produced by `core::html::parse`.

use super::sanitize::normalize_ws;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

pub trait DomView {
    fn root(&self) -> NodeId;
    fn parent(&self, id: NodeId) -> Option<NodeId>;
    fn children(&self, id: NodeId) -> Vec<NodeId>;
    /// Lowercase tag name; `None` for text nodes.
    fn tag(&self, id: NodeId) -> Option<&str>;
    /// Attribute lookup, case-insensitive on the name.
    fn attr(&self, id: NodeId, name: &str) -> Option<&str>;
    /// Raw text of a text node; `None` for elements.
    fn text(&self, id: NodeId) -> Option<&str>;

    fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id).is_some_and(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Pre-order descendants of `id`, excluding `id` itself.
    fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).into_iter().rev().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).into_iter().rev());
        }
        out
    }

    /// Descendants of `from` satisfying `pred`, in document order.
    fn find_all(&self, from: NodeId, pred: &dyn Fn(NodeId) -> bool) -> Vec<NodeId> {
        self.descendants(from).into_iter().filter(|&n| pred(n)).collect()
    }

    fn find_tag(&self, from: NodeId, tag: &str) -> Vec<NodeId> {
        self.find_all(from, &|n| self.is_tag(n, tag))
    }

    /// Nearest ancestor with the given tag.
    fn ancestor(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            if self.is_tag(p, tag) {
                return Some(p);
            }
            cur = self.parent(p);
        }
        None
    }

    /// Element siblings before `id`, nearest first.
    fn preceding_siblings(&self, id: NodeId) -> Vec<NodeId> {
        let Some(p) = self.parent(id) else { return Vec::new() };
        let kids = self.children(p);
        let pos = kids.iter().position(|&k| k == id).unwrap_or(0);
        kids[..pos].iter().rev().copied().filter(|&k| self.tag(k).is_some()).collect()
    }

    /// Whitespace-normalized text of the whole subtree. Inline markup joins
    /// without a gap; cell and block boundaries become a single space.
    fn text_content(&self, id: NodeId) -> String {
        let mut raw = String::new();
        // (node, leaving)
        let mut stack = vec![(id, false)];
        while let Some((n, leaving)) = stack.pop() {
            if leaving {
                raw.push(' ');
                continue;
            }
            if let Some(t) = self.text(n) {
                raw.push_str(t);
                continue;
            }
            if self.tag(n).is_some_and(is_boundary_tag) {
                stack.push((n, true));
            }
            stack.extend(self.children(n).into_iter().rev().map(|c| (c, false)));
        }
        normalize_ws(&raw)
    }

    fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|c| c.split_ascii_whitespace().any(|k| k.eq_ignore_ascii_case(class)))
    }
}

fn is_boundary_tag(tag: &str) -> bool {
    matches!(
        tag,
        "td" | "th" | "tr" | "table" | "thead" | "tbody" | "tfoot" | "caption"
            | "div" | "p" | "br" | "li" | "ul" | "ol" | "section"
    )
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Root,
    Element { tag: String, attrs: Vec<(String, String)> },
    Text(String),
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Immutable arena snapshot of one rendered page.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    pub(crate) fn new() -> Self {
        Self { nodes: vec![Node { kind: NodeKind::Root, parent: None, children: Vec::new() }] }
    }

    pub(crate) fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { kind, parent: Some(parent), children: Vec::new() });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn parse(html: &str) -> Self {
        super::html::parse(html)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}

impl DomView for Document {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0)?.parent
    }

    fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes.get(id.0).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }
}
