use anyhow::{Result, anyhow};
use html::Document;
use printer::copy_styling;

mod common;

fn head_tags(doc: &Document) -> Result<Vec<String>> {
    let head = doc.head().ok_or_else(|| anyhow!("missing head"))?;
    Ok(doc
        .children(head)
        .into_iter()
        .filter_map(|child| doc.tag_name(child).map(str::to_owned))
        .collect())
}

#[test]
fn base_is_copied_ahead_of_links_and_styles() -> Result<()> {
    common::init_logging();
    let source = common::app_document(None)?;
    let mut target = Document::with_title("Orders");

    let copied = copy_styling(&source, &mut target);
    assert_eq!(copied, 3);
    assert_eq!(head_tags(&target)?, ["title", "base", "link", "style"]);

    let style = target.query_selector("style").ok_or_else(|| anyhow!("no style"))?;
    assert_eq!(target.text_content(style), ".print-overlay { position: fixed; }");
    let base = target.query_selector("base").ok_or_else(|| anyhow!("no base"))?;
    assert_eq!(target.get_attribute(base, "href"), Some("https://shop.example/"));
    Ok(())
}

#[test]
fn source_document_is_left_untouched() -> Result<()> {
    common::init_logging();
    let source = common::app_document(None)?;
    let before = source.to_json_string();
    let mut target = Document::new();
    copy_styling(&source, &mut target);
    assert_eq!(source.to_json_string(), before);
    assert_eq!(head_tags(&source)?, ["title", "link", "style", "base"]);
    Ok(())
}

#[test]
fn documents_without_styling_copy_nothing() -> Result<()> {
    common::init_logging();
    let source = Document::with_title("Plain");
    let mut target = Document::new();
    assert_eq!(copy_styling(&source, &mut target), 0);
    assert!(head_tags(&target)?.is_empty());
    Ok(())
}
