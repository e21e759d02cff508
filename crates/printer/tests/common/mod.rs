#![allow(dead_code, reason = "Each test binary uses a different subset of the fixtures")]

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Result, anyhow};
use html::{Document, NodeId};
use page_handler::{HostEvent, MemoryHost, PrintHost, SharedDocument, WindowId};
use printer::{ComponentRegistry, PrintConfig, Printer, StatusPublisher};
use serde_json::Value;

pub fn init_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub fn config(open_in_new_window: bool) -> PrintConfig {
    PrintConfig::new(open_in_new_window, 200, "print-overlay", "app-root")
}

/// Application page: styling in the head, an `app-root` with some content.
pub fn app_document(root_display: Option<&str>) -> Result<Document> {
    let mut doc = Document::with_title("Orders");
    let head = doc.head().ok_or_else(|| anyhow!("missing head"))?;
    let body = doc.body().ok_or_else(|| anyhow!("missing body"))?;

    let link = doc.create_element("link");
    doc.set_attribute(link, "rel", "stylesheet")?;
    doc.set_attribute(link, "href", "app.css")?;
    doc.append_child(head, link)?;
    let style = doc.create_element("style");
    let css = doc.create_text_node(".print-overlay { position: fixed; }");
    doc.append_child(style, css)?;
    doc.append_child(head, style)?;
    let base = doc.create_element("base");
    doc.set_attribute(base, "href", "https://shop.example/")?;
    doc.append_child(head, base)?;

    let app = doc.create_element("app-root");
    if let Some(display) = root_display {
        doc.set_style_property(app, "display", display)?;
    }
    let order = doc.create_element("div");
    doc.set_attribute(order, "id", "order")?;
    let text = doc.create_text_node("Order 1001");
    doc.append_child(order, text)?;
    doc.append_child(app, order)?;
    doc.append_child(body, app)?;
    Ok(doc)
}

/// Registry with a `greeting` template (reads `name` from the context) and
/// a `badge` component.
pub fn registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry.register_template("greeting", |doc: &mut Document, context: Option<&Value>| {
        let name = context
            .and_then(|ctx| ctx.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("stranger");
        let heading = doc.create_element("h2");
        let text = doc.create_text_node(&format!("Hello, {name}"));
        let note = doc.create_text_node("printed copy");
        if doc.append_child(heading, text).is_err() {
            return Vec::new();
        }
        vec![heading, note]
    });
    registry.register_component("badge", |doc: &mut Document| {
        let badge = doc.create_element("span");
        let text = doc.create_text_node("VIP");
        if doc.set_attribute(badge, "class", "badge").is_err() || doc.append_child(badge, text).is_err() {
            return badge;
        }
        badge
    });
    registry
}

pub struct Harness {
    pub host: MemoryHost,
    pub printer: Printer,
    pub status: StatusPublisher,
}

impl Harness {
    pub fn new(config: &PrintConfig, document: Document) -> Self {
        init_logging();
        let host = MemoryHost::new(document);
        let status = StatusPublisher::new();
        let printer = Printer::new(config, Arc::new(host.clone()), Arc::new(registry()), status.clone());
        Self { host, printer, status }
    }

    pub fn main_document(&self) -> SharedDocument {
        self.host.main_document()
    }

    pub fn document(&self, window: WindowId) -> Result<SharedDocument> {
        self.host
            .document(window)
            .ok_or_else(|| anyhow!("{window} has no document"))
    }

    /// Record the printing status each time a native print call happens.
    pub fn status_at_print_calls(&self) -> Arc<Mutex<Vec<bool>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let status = self.status.clone();
        self.host.set_observer(Arc::new(move |event: &HostEvent| {
            if event.is_print_invocation() {
                sink.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(status.current());
            }
        }));
        seen
    }
}

pub fn with_doc<R>(document: &SharedDocument, read: impl FnOnce(&Document) -> R) -> R {
    let guard = document.lock().unwrap_or_else(PoisonError::into_inner);
    read(&guard)
}

pub fn with_doc_mut<R>(document: &SharedDocument, write: impl FnOnce(&mut Document) -> R) -> R {
    let mut guard = document.lock().unwrap_or_else(PoisonError::into_inner);
    write(&mut guard)
}

pub fn root_display(document: &SharedDocument) -> Result<String> {
    with_doc(document, |doc| {
        doc.query_selector("app-root")
            .map(|root| doc.style_property(root, "display"))
            .ok_or_else(|| anyhow!("app-root missing"))
    })
}

pub fn body_children(document: &SharedDocument) -> Vec<NodeId> {
    with_doc(document, |doc| doc.body().map(|body| doc.children(body)).unwrap_or_default())
}

pub fn seen(values: &Arc<Mutex<Vec<bool>>>) -> Vec<bool> {
    values.lock().unwrap_or_else(PoisonError::into_inner).clone()
}
