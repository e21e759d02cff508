//! What can be printed and how framework content becomes DOM nodes.

use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use html::{Document, NodeId};
use serde_json::Value;

use crate::error::MaterializeError;

/// Name of a declarative template known to the materializer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TemplateRef(String);

/// Name of a component known to the materializer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentRef(String);

macro_rules! named_ref {
    ($ty:ident) => {
        impl $ty {
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            pub fn name(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
                out.write_str(&self.0)
            }
        }
    };
}

named_ref!(TemplateRef);
named_ref!(ComponentRef);

/// Content descriptor accepted by [`crate::Printer::print_content`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Content {
    /// Plain string, printed as a single text node.
    Text(String),
    /// Element already rendered into the host's current document.
    Element(NodeId),
    /// Declarative template, instantiated with the call's context.
    Template(TemplateRef),
    /// Component, instantiated without context.
    Component(ComponentRef),
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<NodeId> for Content {
    fn from(node: NodeId) -> Self {
        Self::Element(node)
    }
}

impl From<TemplateRef> for Content {
    fn from(template: TemplateRef) -> Self {
        Self::Template(template)
    }
}

impl From<ComponentRef> for Content {
    fn from(component: ComponentRef) -> Self {
        Self::Component(component)
    }
}

/// Framework adapter that turns templates and components into DOM nodes.
///
/// Implementations create detached nodes in the supplied document. `flush`
/// is called right after every instantiation and must leave the returned
/// nodes fully populated.
pub trait ContentMaterializer: Send + Sync {
    /// Instantiate `template` with `context`; returns its root nodes.
    ///
    /// # Errors
    ///
    /// Unknown templates are reported as [`MaterializeError::UnknownTemplate`].
    fn instantiate_template(
        &self,
        doc: &mut Document,
        template: &TemplateRef,
        context: Option<&Value>,
    ) -> Result<Vec<NodeId>, MaterializeError>;

    /// Instantiate `component`; returns its host element.
    ///
    /// # Errors
    ///
    /// Unknown components are reported as [`MaterializeError::UnknownComponent`].
    fn instantiate_component(
        &self,
        doc: &mut Document,
        component: &ComponentRef,
    ) -> Result<NodeId, MaterializeError>;

    /// Synchronous render pass over pending changes.
    fn flush(&self, _doc: &mut Document) {}
}

type TemplateFn = Arc<dyn Fn(&mut Document, Option<&Value>) -> Vec<NodeId> + Send + Sync>;
type ComponentFn = Arc<dyn Fn(&mut Document) -> NodeId + Send + Sync>;

/// Closure-backed [`ContentMaterializer`] keyed by name.
#[derive(Default)]
pub struct ComponentRegistry {
    templates: HashMap<String, TemplateFn>,
    components: HashMap<String, ComponentFn>,
    render_passes: AtomicU64,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_template<F>(&mut self, name: impl Into<String>, render: F) -> &mut Self
    where
        F: Fn(&mut Document, Option<&Value>) -> Vec<NodeId> + Send + Sync + 'static,
    {
        self.templates.insert(name.into(), Arc::new(render));
        self
    }

    pub fn register_component<F>(&mut self, name: impl Into<String>, render: F) -> &mut Self
    where
        F: Fn(&mut Document) -> NodeId + Send + Sync + 'static,
    {
        self.components.insert(name.into(), Arc::new(render));
        self
    }

    /// Number of render passes run so far.
    pub fn render_passes(&self) -> u64 {
        self.render_passes.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut templates: Vec<&String> = self.templates.keys().collect();
        templates.sort();
        let mut components: Vec<&String> = self.components.keys().collect();
        components.sort();
        out.debug_struct("ComponentRegistry")
            .field("templates", &templates)
            .field("components", &components)
            .finish_non_exhaustive()
    }
}

impl ContentMaterializer for ComponentRegistry {
    fn instantiate_template(
        &self,
        doc: &mut Document,
        template: &TemplateRef,
        context: Option<&Value>,
    ) -> Result<Vec<NodeId>, MaterializeError> {
        let render = self
            .templates
            .get(template.name())
            .ok_or_else(|| MaterializeError::UnknownTemplate(template.name().to_owned()))?;
        Ok(render(doc, context))
    }

    fn instantiate_component(
        &self,
        doc: &mut Document,
        component: &ComponentRef,
    ) -> Result<NodeId, MaterializeError> {
        let render = self
            .components
            .get(component.name())
            .ok_or_else(|| MaterializeError::UnknownComponent(component.name().to_owned()))?;
        Ok(render(doc))
    }

    fn flush(&self, _doc: &mut Document) {
        self.render_passes.fetch_add(1, Ordering::Relaxed);
    }
}
