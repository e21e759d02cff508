//! Print surfaces: the container element that wraps materialized content.

use std::sync::Arc;

use html::{Document, NodeId};
use log::debug;
use serde_json::Value;

use crate::content::{Content, ContentMaterializer};
use crate::error::{MaterializeError, PrintError};

/// Tag of the surface container element.
pub const SURFACE_TAG: &str = "print-surface";

/// Builds surfaces for both destinations.
#[derive(Clone)]
pub struct SurfaceBuilder {
    class_name: String,
    materializer: Arc<dyn ContentMaterializer>,
}

impl SurfaceBuilder {
    pub fn new(class_name: impl Into<String>, materializer: Arc<dyn ContentMaterializer>) -> Self {
        Self {
            class_name: class_name.into(),
            materializer,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Materialize `content` into `doc` and wrap it in a detached surface.
    ///
    /// Elements that are still attached to the live tree are deep-cloned so
    /// the application's DOM is never rearranged; detached elements are
    /// adopted as they are.
    ///
    /// # Errors
    ///
    /// [`PrintError::InvalidContentKind`] when the content cannot be turned
    /// into nodes. Nothing is left behind in `doc` in that case.
    pub fn build(
        &self,
        doc: &mut Document,
        content: &Content,
        context: Option<&Value>,
    ) -> Result<NodeId, PrintError> {
        let nodes = match content {
            Content::Text(text) => vec![doc.create_text_node(text)],
            Content::Element(node) => {
                if !doc.is_element(*node) {
                    return Err(PrintError::invalid(format!("{node:?} is not a live element")));
                }
                if doc.parent(*node).is_some() {
                    let copy = doc
                        .clone_node(*node, true)
                        .ok_or_else(|| PrintError::invalid(format!("{node:?} vanished while cloning")))?;
                    vec![copy]
                } else {
                    vec![*node]
                }
            }
            Content::Template(template) => {
                let roots = self.materializer.instantiate_template(doc, template, context)?;
                self.materializer.flush(doc);
                ensure_rendered(doc, roots, template.name())?
            }
            Content::Component(component) => {
                let root = self.materializer.instantiate_component(doc, component)?;
                self.materializer.flush(doc);
                ensure_rendered(doc, vec![root], component.name())?
            }
        };
        debug!(target: "printer", "surface built from {} node(s)", nodes.len());
        self.wrap_all(doc, &nodes)
    }

    /// Wrap a single node in a fresh surface container.
    ///
    /// # Errors
    ///
    /// Fails when `node` does not belong to `doc`.
    pub fn wrap(&self, doc: &mut Document, node: NodeId) -> Result<NodeId, PrintError> {
        self.wrap_all(doc, &[node])
    }

    fn wrap_all(&self, doc: &mut Document, nodes: &[NodeId]) -> Result<NodeId, PrintError> {
        let container = doc.create_element(SURFACE_TAG);
        doc.set_attribute(container, "class", &self.class_name)?;
        for node in nodes {
            if let Err(err) = doc.append_child(container, *node) {
                doc.remove_subtree(container);
                return Err(err.into());
            }
        }
        Ok(container)
    }
}

/// Whether `node` is a surface container.
pub fn is_surface(doc: &Document, node: NodeId) -> bool {
    doc.tag_name(node) == Some(SURFACE_TAG)
}

fn ensure_rendered(doc: &mut Document, roots: Vec<NodeId>, name: &str) -> Result<Vec<NodeId>, PrintError> {
    if roots.is_empty() {
        return Err(MaterializeError::Empty(name.to_owned()).into());
    }
    if roots.iter().all(|root| doc.contains(*root)) {
        return Ok(roots);
    }
    for root in roots {
        doc.remove_subtree(root);
    }
    Err(PrintError::invalid(format!("`{name}` returned nodes from another document")))
}
