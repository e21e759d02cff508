use core::fmt;

use super::{DOMNode, Document, NodeKind, StyleDeclarations};
use indextree::NodeId;

use serde_json::{Map, Value, json};

// -----------------------
// Module-scope helpers
// -----------------------

fn flush_text(children: &mut Vec<Value>, text_buf: &mut String) {
    if !text_buf.trim().is_empty() {
        children.push(json!({ "type": "text", "text": text_buf.clone() }));
    }
    text_buf.clear();
}

fn push_non_null(children: &mut Vec<Value>, value: Value) {
    if !value.is_null() {
        children.push(value);
    }
}

fn style_text(style: &StyleDeclarations) -> String {
    style
        .iter()
        .map(|(prop, value)| format!("{prop}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn coalesce_children(doc: &Document, id: NodeId) -> Vec<Value> {
    let mut children: Vec<Value> = Vec::new();
    let mut text_buf = String::new();
    for child in id.children(&doc.dom) {
        if let Some(NodeKind::Text { text }) = doc.kind(child) {
            text_buf.push_str(text);
            continue;
        }
        flush_text(&mut children, &mut text_buf);
        push_non_null(&mut children, node_to_json(doc, child));
    }
    flush_text(&mut children, &mut text_buf);
    children
}

fn node_to_json(doc: &Document, id: NodeId) -> Value {
    let Some(DOMNode { kind, attrs, style }) = doc.node(id) else {
        return Value::Null;
    };
    match kind {
        NodeKind::Document => json!({ "type": "document", "children": coalesce_children(doc, id) }),
        NodeKind::Element { tag } => {
            // Sorted by key for determinism
            let mut pairs: Vec<(String, String)> = attrs.iter().cloned().collect();
            pairs.sort_by(|left, right| left.0.cmp(&right.0));
            let mut attrs_obj = Map::new();
            for (key, value) in pairs {
                attrs_obj.insert(key, Value::String(value));
            }
            if !style.is_empty() {
                attrs_obj.insert("style".to_owned(), Value::String(style_text(style)));
            }
            json!({
                "type": "element",
                "tag": tag,
                "attrs": Value::Object(attrs_obj),
                "children": coalesce_children(doc, id),
            })
        }
        NodeKind::Text { text } => {
            if text.trim().is_empty() {
                Value::Null
            } else {
                json!({ "type": "text", "text": text })
            }
        }
    }
}

fn write_indent(out: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_str("  ")?;
    }
    Ok(())
}

fn escape_text(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn write_attrs(out: &mut fmt::Formatter<'_>, node: &DOMNode) -> fmt::Result {
    let mut pairs: Vec<(String, String)> = node.attrs.iter().cloned().collect();
    pairs.sort_by(|left, right| left.0.cmp(&right.0));
    for (key, value) in pairs {
        write!(out, " {}=\"{}\"", key, escape_text(&value))?;
    }
    if !node.style.is_empty() {
        write!(out, " style=\"{}\"", escape_text(&style_text(&node.style)))?;
    }
    Ok(())
}

fn fmt_node(doc: &Document, id: NodeId, out: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    let Some(node) = doc.node(id) else {
        return Ok(());
    };
    match &node.kind {
        NodeKind::Document => {
            write_indent(out, depth)?;
            writeln!(out, "#document")?;
            for child in id.children(&doc.dom) {
                fmt_node(doc, child, out, depth + 1)?;
            }
        }
        NodeKind::Element { tag } => {
            write_indent(out, depth)?;
            write!(out, "<{tag}")?;
            write_attrs(out, node)?;
            writeln!(out, ">")?;
            for child in id.children(&doc.dom) {
                fmt_node(doc, child, out, depth + 1)?;
            }
            write_indent(out, depth)?;
            writeln!(out, "</{tag}>")?;
        }
        NodeKind::Text { text } => {
            // Whitespace-only text is noise in snapshots
            if text.chars().all(char::is_whitespace) {
                return Ok(());
            }
            write_indent(out, depth)?;
            writeln!(out, "\"{}\"", escape_text(text))?;
        }
    }
    Ok(())
}

impl fmt::Debug for Document {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(out, "Document")?;
        fmt_node(self, self.root, out, 0)
    }
}

impl Document {
    /// Build a deterministic JSON representation of the whole document.
    /// Schema:
    /// - Document: { "type":"document", "children":[ ... ] }
    /// - Element: { "type":"element", "tag": "div", "attrs": {..}, "children":[ ... ] }
    /// - Text: { "type":"text", "text":"..." }
    pub fn to_json_value(&self) -> Value {
        node_to_json(self, self.root)
    }

    /// Same schema as [`Document::to_json_value`], rooted at `node`.
    pub fn subtree_to_json(&self, node: NodeId) -> Value {
        node_to_json(self, node)
    }

    /// Pretty JSON string for snapshots and test comparisons.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(&self.to_json_value()).unwrap_or_else(|_| String::from("{}"))
    }
}
