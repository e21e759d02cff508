//! Arena-backed DOM used by the print host.
//!
//! A [`Document`] owns every node it ever created. Nodes are "attached" when
//! their ancestor chain reaches the document node; freshly created or cloned
//! nodes start out detached, the same way `createElement`/`cloneNode` behave in
//! a browser.

use indextree::{Arena, Node, NodeId};
use smallvec::SmallVec;
use thiserror::Error;

mod cloning;
mod printing;
mod query;

pub use cloning::OwnedNode;

/// Attribute storage; most elements carry only a handful.
pub type Attributes = SmallVec<[(String, String); 4]>;
/// Inline style declarations (`element.style.*`).
pub type StyleDeclarations = SmallVec<[(String, String); 2]>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeKind {
    #[default]
    Document,
    Element { tag: String },
    Text { text: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DOMNode {
    pub kind: NodeKind,
    pub attrs: Attributes,
    pub style: StyleDeclarations,
}

impl DOMNode {
    fn element(tag: &str) -> Self {
        Self {
            kind: NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
            },
            ..Self::default()
        }
    }

    fn text(text: &str) -> Self {
        Self {
            kind: NodeKind::Text {
                text: text.to_owned(),
            },
            ..Self::default()
        }
    }
}

/// Errors raised by tree mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("node {0:?} does not belong to this document")]
    UnknownNode(NodeId),
    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("cannot insert {child:?} under {parent:?}: {reason}")]
    HierarchyRequest {
        parent: NodeId,
        child: NodeId,
        reason: String,
    },
}

/// A single document and all nodes created through it.
pub struct Document {
    dom: Arena<DOMNode>,
    root: NodeId,
    stream_open: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with the usual `html > head + body` skeleton.
    pub fn new() -> Self {
        let mut dom = Arena::new();
        let root = dom.new_node(DOMNode::default());
        let mut document = Self {
            dom,
            root,
            stream_open: false,
        };
        document.build_skeleton(None);
        document
    }

    /// Create a document whose head carries a `<title>`.
    pub fn with_title(title: &str) -> Self {
        let mut document = Self::new();
        document.set_title(title);
        document
    }

    fn build_skeleton(&mut self, title: Option<&str>) {
        let html = self.dom.new_node(DOMNode::element("html"));
        let head = self.dom.new_node(DOMNode::element("head"));
        let body = self.dom.new_node(DOMNode::element("body"));
        self.root.append(html, &mut self.dom);
        html.append(head, &mut self.dom);
        html.append(body, &mut self.dom);
        if let Some(text) = title {
            let title_el = self.dom.new_node(DOMNode::element("title"));
            let title_text = self.dom.new_node(DOMNode::text(text));
            title_el.append(title_text, &mut self.dom);
            head.append(title_el, &mut self.dom);
        }
    }

    /// Replace the whole document with `html > (head > title) + body` and
    /// leave the write stream open, like `document.write` on a blank window.
    pub fn write_skeleton(&mut self, title: &str) {
        let existing: Vec<NodeId> = self.root.children(&self.dom).collect();
        for child in existing {
            child.remove_subtree(&mut self.dom);
        }
        self.build_skeleton(Some(title));
        self.stream_open = true;
    }

    /// Close the write stream opened by [`Document::write_skeleton`].
    pub fn close_stream(&mut self) {
        self.stream_open = false;
    }

    pub fn is_stream_open(&self) -> bool {
        self.stream_open
    }

    /// The `#document` node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn document_element(&self) -> Option<NodeId> {
        self.root
            .children(&self.dom)
            .find(|child| self.tag_name(*child) == Some("html"))
    }

    pub fn head(&self) -> Option<NodeId> {
        self.child_element(self.document_element()?, "head")
    }

    pub fn body(&self) -> Option<NodeId> {
        self.child_element(self.document_element()?, "body")
    }

    /// Return the `<head>`, creating it as the first child of `<html>` when missing.
    pub fn ensure_head(&mut self) -> NodeId {
        if let Some(head) = self.head() {
            return head;
        }
        let parent = self.document_element().unwrap_or(self.root);
        let head = self.dom.new_node(DOMNode::element("head"));
        parent.prepend(head, &mut self.dom);
        head
    }

    fn child_element(&self, parent: NodeId, tag: &str) -> Option<NodeId> {
        parent
            .children(&self.dom)
            .find(|child| self.tag_name(*child) == Some(tag))
    }

    /// Text of the first `<title>` in the document, empty when there is none.
    pub fn title(&self) -> String {
        self.query_selector("title")
            .map(|title| self.text_content(title))
            .unwrap_or_default()
    }

    pub fn set_title(&mut self, title: &str) {
        let title_el = if let Some(existing) = self.query_selector("title") {
            existing
        } else {
            let head = self.ensure_head();
            let created = self.dom.new_node(DOMNode::element("title"));
            head.append(created, &mut self.dom);
            created
        };
        let old: Vec<NodeId> = title_el.children(&self.dom).collect();
        for child in old {
            child.remove_subtree(&mut self.dom);
        }
        let text = self.dom.new_node(DOMNode::text(title));
        title_el.append(text, &mut self.dom);
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.dom.new_node(DOMNode::element(tag))
    }

    pub fn create_text_node(&mut self, text: &str) -> NodeId {
        self.dom.new_node(DOMNode::text(text))
    }

    /// Whether `node` was created by this document and not yet dropped.
    pub fn contains(&self, node: NodeId) -> bool {
        self.dom.get(node).is_some() && !node.is_removed(&self.dom)
    }

    fn ensure_known(&self, node: NodeId) -> Result<(), DomError> {
        if self.contains(node) {
            Ok(())
        } else {
            Err(DomError::UnknownNode(node))
        }
    }

    pub fn node(&self, node: NodeId) -> Option<&DOMNode> {
        if !self.contains(node) {
            return None;
        }
        self.dom.get(node).map(Node::get)
    }

    fn node_mut(&mut self, node: NodeId) -> Option<&mut DOMNode> {
        if !self.contains(node) {
            return None;
        }
        self.dom.get_mut(node).map(Node::get_mut)
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.node(node).map(|data| &data.kind)
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.kind(node), Some(NodeKind::Element { .. }))
    }

    /// Lower-cased tag name for elements, `None` for anything else.
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        match self.kind(node)? {
            NodeKind::Element { tag } => Some(tag.as_str()),
            NodeKind::Document | NodeKind::Text { .. } => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        if !self.contains(node) {
            return None;
        }
        self.dom.get(node).and_then(Node::parent)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        if !self.contains(node) {
            return Vec::new();
        }
        node.children(&self.dom).collect()
    }

    /// Whether `node` is reachable from the document node.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.contains(node) && node.ancestors(&self.dom).any(|ancestor| ancestor == self.root)
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    ///
    /// # Errors
    ///
    /// Fails when either node is unknown or the insertion would create a cycle.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.ensure_known(parent)?;
        self.ensure_known(child)?;
        if matches!(self.kind(parent), Some(NodeKind::Text { .. })) {
            return Err(DomError::HierarchyRequest {
                parent,
                child,
                reason: "text nodes cannot have children".to_owned(),
            });
        }
        child.detach(&mut self.dom);
        parent
            .checked_append(child, &mut self.dom)
            .map_err(|err| DomError::HierarchyRequest {
                parent,
                child,
                reason: err.to_string(),
            })
    }

    /// Detach `child` from `parent` and drop its subtree.
    ///
    /// # Errors
    ///
    /// Fails with [`DomError::NotAChild`] when `child` is not currently under `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.ensure_known(child)?;
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        child.remove_subtree(&mut self.dom);
        Ok(())
    }

    /// Unlink `node` from its parent. The node and its subtree stay alive and
    /// can be appended again.
    pub fn detach(&mut self, node: NodeId) {
        if self.contains(node) && node != self.root {
            node.detach(&mut self.dom);
        }
    }

    /// Drop `node` and its descendants wherever they are.
    pub fn remove_subtree(&mut self, node: NodeId) {
        if self.contains(node) && node != self.root {
            node.remove_subtree(&mut self.dom);
        }
    }

    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node)?
            .attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// # Errors
    ///
    /// Fails when `node` is unknown.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let data = self.node_mut(node).ok_or(DomError::UnknownNode(node))?;
        if let Some(slot) = data.attrs.iter_mut().find(|(key, _)| key == name) {
            value.clone_into(&mut slot.1);
        } else {
            data.attrs.push((name.to_owned(), value.to_owned()));
        }
        Ok(())
    }

    /// Tokens of the `class` attribute.
    pub fn class_list(&self, node: NodeId) -> Vec<&str> {
        self.get_attribute(node, "class")
            .map(|classes| classes.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }

    /// Inline style value, empty when unset (matches `element.style.prop`).
    pub fn style_property(&self, node: NodeId, property: &str) -> String {
        self.node(node)
            .and_then(|data| data.style.iter().find(|(key, _)| key == property))
            .map(|(_, value)| value.clone())
            .unwrap_or_default()
    }

    /// Set an inline style value; an empty value clears the declaration.
    ///
    /// # Errors
    ///
    /// Fails when `node` is unknown.
    pub fn set_style_property(
        &mut self,
        node: NodeId,
        property: &str,
        value: &str,
    ) -> Result<(), DomError> {
        let data = self.node_mut(node).ok_or(DomError::UnknownNode(node))?;
        let existing = data.style.iter().position(|(key, _)| key == property);
        match (existing, value.is_empty()) {
            (Some(idx), true) => {
                data.style.remove(idx);
            }
            (Some(idx), false) => {
                if let Some(slot) = data.style.get_mut(idx) {
                    value.clone_into(&mut slot.1);
                }
            }
            (None, true) => {}
            (None, false) => data.style.push((property.to_owned(), value.to_owned())),
        }
        Ok(())
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        if !self.contains(node) {
            return String::new();
        }
        let mut out = String::new();
        for descendant in node.descendants(&self.dom) {
            if let Some(NodeKind::Text { text }) = self.kind(descendant) {
                out.push_str(text);
            }
        }
        out
    }
}
