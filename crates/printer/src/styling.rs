//! Carry the host page's styling into a freshly written print document.

use html::Document;
use log::debug;

/// Copy `base`, then every `link`, then every `style` element of `source`
/// into the head of `target`.
///
/// `base` goes first so relative URLs of the copied links resolve against it.
/// Nodes are imported, `source` is left untouched. Returns how many elements
/// were copied.
pub fn copy_styling(source: &Document, target: &mut Document) -> usize {
    let head = target.ensure_head();
    let base = source.query_selector("base");
    let links = source.query_selector_all("link");
    let styles = source.query_selector_all("style");

    let mut copied = 0;
    for node in base.into_iter().chain(links).chain(styles) {
        let Some(imported) = target.import_node(source, node, true) else {
            continue;
        };
        if target.append_child(head, imported).is_ok() {
            copied += 1;
        } else {
            target.remove_subtree(imported);
        }
    }
    debug!(target: "printer", "copied {copied} styling element(s) into print document");
    copied
}
