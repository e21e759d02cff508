//! Minimal selector lookups.
//!
//! Supported selectors: `tag`, `#id`, `.class`. That covers the root lookup
//! and the styling copy; anything fancier belongs in a real selector engine.

use super::{Document, NodeKind};
use indextree::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selector<'sel> {
    Tag(&'sel str),
    Id(&'sel str),
    Class(&'sel str),
}

impl<'sel> Selector<'sel> {
    fn parse(raw: &'sel str) -> Option<Self> {
        let trimmed = raw.trim();
        if let Some(id) = trimmed.strip_prefix('#') {
            return (!id.is_empty()).then_some(Self::Id(id));
        }
        if let Some(class) = trimmed.strip_prefix('.') {
            return (!class.is_empty()).then_some(Self::Class(class));
        }
        (!trimmed.is_empty()).then_some(Self::Tag(trimmed))
    }
}

impl Document {
    fn matches(&self, node: NodeId, selector: Selector<'_>) -> bool {
        match selector {
            Selector::Tag(tag) => self
                .tag_name(node)
                .is_some_and(|name| name.eq_ignore_ascii_case(tag)),
            Selector::Id(id) => self.get_attribute(node, "id") == Some(id),
            Selector::Class(class) => self.class_list(node).contains(&class),
        }
    }

    /// All attached elements matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(parsed) = Selector::parse(selector) else {
            return Vec::new();
        };
        self.root
            .descendants(&self.dom)
            .filter(|node| {
                matches!(self.kind(*node), Some(NodeKind::Element { .. }))
                    && self.matches(*node, parsed)
            })
            .collect()
    }

    /// First attached element matching `selector`.
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        let parsed = Selector::parse(selector)?;
        self.root.descendants(&self.dom).find(|node| {
            matches!(self.kind(*node), Some(NodeKind::Element { .. }))
                && self.matches(*node, parsed)
        })
    }
}
