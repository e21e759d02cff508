//! Deep copies within a document and across documents (`cloneNode`/`importNode`).

use super::{DOMNode, Document};
use indextree::NodeId;

/// A detached, owned copy of a subtree that can be planted into any document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedNode {
    pub data: DOMNode,
    pub children: Vec<OwnedNode>,
}

impl Document {
    /// Copy `node` (and its descendants when `deep`) out of the arena.
    pub fn snapshot_subtree(&self, node: NodeId, deep: bool) -> Option<OwnedNode> {
        let data = self.node(node)?.clone();
        let children = if deep {
            node.children(&self.dom)
                .filter_map(|child| self.snapshot_subtree(child, true))
                .collect()
        } else {
            Vec::new()
        };
        Some(OwnedNode { data, children })
    }

    /// Create detached nodes for `owned` and return the new subtree root.
    pub fn plant(&mut self, owned: OwnedNode) -> NodeId {
        let OwnedNode { data, children } = owned;
        let id = self.dom.new_node(data);
        for child in children {
            let child_id = self.plant(child);
            id.append(child_id, &mut self.dom);
        }
        id
    }

    /// Detached copy of `node` inside this document.
    pub fn clone_node(&mut self, node: NodeId, deep: bool) -> Option<NodeId> {
        let owned = self.snapshot_subtree(node, deep)?;
        Some(self.plant(owned))
    }

    /// Detached copy of a node owned by `source`; `source` is left untouched.
    pub fn import_node(&mut self, source: &Self, node: NodeId, deep: bool) -> Option<NodeId> {
        let owned = source.snapshot_subtree(node, deep)?;
        Some(self.plant(owned))
    }
}
