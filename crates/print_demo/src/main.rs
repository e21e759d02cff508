//! Drives one print through an in-memory host so the whole lifecycle can be
//! watched in the logs (`RUST_LOG=debug`). Configuration comes from the
//! `PRINTER_*` environment variables.

use std::sync::Arc;

use anyhow::{Error, anyhow};
use html::{Document, NodeId};
use log::{debug, info};
use page_handler::{MemoryHost, PrintHost, SharedDocument};
use printer::{
    CLOSE_RETRY_DELAY, ComponentRegistry, PrintConfig, Printer, StatusPublisher, TemplateRef,
};
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use tokio::time;

pub fn main() -> Result<(), Error> {
    env_logger::init();

    let runtime = Runtime::new()?;
    runtime.block_on(run())
}

fn application_document() -> Result<Document, Error> {
    let mut doc = Document::with_title("Invoice #42");
    let head = doc.head().ok_or_else(|| anyhow!("document without head"))?;
    let body = doc.body().ok_or_else(|| anyhow!("document without body"))?;

    let base = doc.create_element("base");
    doc.set_attribute(base, "href", "https://billing.example/")?;
    doc.append_child(head, base)?;
    let link = doc.create_element("link");
    doc.set_attribute(link, "rel", "stylesheet")?;
    doc.set_attribute(link, "href", "styles/print.css")?;
    doc.append_child(head, link)?;

    let app = doc.create_element("app-root");
    let heading = doc.create_element("h1");
    let title = doc.create_text_node("Billing");
    doc.append_child(heading, title)?;
    doc.append_child(app, heading)?;
    doc.append_child(body, app)?;
    Ok(doc)
}

fn invoice_summary(doc: &mut Document, context: Option<&Value>) -> Vec<NodeId> {
    let total = context
        .and_then(|ctx| ctx.get("total"))
        .and_then(Value::as_str)
        .unwrap_or("0.00");
    let section = doc.create_element("section");
    let line = doc.create_text_node(&format!("Total due: {total}"));
    if doc.append_child(section, line).is_err() {
        return Vec::new();
    }
    vec![section]
}

fn dump(document: Option<SharedDocument>) {
    if let Some(shared) = document {
        if let Ok(doc) = shared.lock() {
            debug!("{doc:?}");
        }
    }
}

async fn run() -> Result<(), Error> {
    let config = PrintConfig::from_env();

    let host = MemoryHost::new(application_document()?);
    let mut registry = ComponentRegistry::new();
    registry.register_template("invoice-summary", invoice_summary);

    let printer = Printer::new(
        &config,
        Arc::new(host.clone()),
        Arc::new(registry),
        StatusPublisher::new(),
    );
    info!("printing with {:?}", printer.config());
    let status = printer.printing_status();

    let ticket = printer.print_content(
        TemplateRef::new("invoice-summary"),
        Some(json!({ "total": "1,250.00" })),
    )?;
    let window = ticket.window();
    let destination = ticket.destination();
    if !ticket.settled().await {
        return Err(anyhow!("print task was aborted"));
    }
    info!("{destination} print dialog open: {}", status.current());
    dump(host.document(window));

    host.fire_after_print(window);
    time::sleep(CLOSE_RETRY_DELAY * 2).await;
    info!("print finished, dialog open: {}", status.current());
    dump(host.document(host.current_window()));

    for event in host.events() {
        debug!("host event: {event:?}");
    }
    Ok(())
}
