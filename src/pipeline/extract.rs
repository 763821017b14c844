//! Structure extraction: rebuild rendered HTML into ordered, addressable
//! paragraph and table elements.
//!
//! ## Walk
//!
//! The header is the text of the first `<h1>` in the document, falling back
//! to the first `<h2>`, then to [`DEFAULT_HEADER`]. The element children of
//! `<body>` are then visited in order with a running 1-based position:
//!
//! | child | emitted | consumes a position |
//! |-------|---------|---------------------|
//! | `<p>` | paragraph | yes |
//! | `<table>` | table | yes |
//! | the heading chosen as header | no | no |
//! | any other tag | no | yes |
//!
//! Skipped tags keep their slot, so ids are not necessarily contiguous.
//! Extraction never fails: unexpected nesting just yields fewer elements.

use crate::document::{slug, DocumentElement, ElementKind, ExtractedDocument, TableRows, DEFAULT_HEADER};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::rc::Rc;
use tracing::debug;

/// Tag classification used by the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    Heading(u8),
    Paragraph,
    Table,
    Other,
}

impl NodeClass {
    /// Classify an element by its local tag name.
    pub fn of_tag(tag: &str) -> Self {
        match tag {
            "h1" => NodeClass::Heading(1),
            "h2" => NodeClass::Heading(2),
            "h3" => NodeClass::Heading(3),
            "h4" => NodeClass::Heading(4),
            "h5" => NodeClass::Heading(5),
            "h6" => NodeClass::Heading(6),
            "p" => NodeClass::Paragraph,
            "table" => NodeClass::Table,
            _ => NodeClass::Other,
        }
    }
}

/// Parse `html` and extract its header and paragraph/table elements.
pub fn extract(html: &str) -> ExtractedDocument {
    let dom = parse_document(RcDom::default(), Default::default()).one(html);

    let header_node = find_first(&dom.document, "h1").or_else(|| find_first(&dom.document, "h2"));
    let header = header_node
        .as_ref()
        .map(|h| text_content(h).trim().to_string())
        .unwrap_or_else(|| DEFAULT_HEADER.to_string());
    let prefix = slug(&header);

    let mut elements = Vec::new();
    let Some(body) = find_first(&dom.document, "body") else {
        return ExtractedDocument { header, elements };
    };

    let mut position = 0usize;
    let mut skipped = 0usize;
    for child in element_children(&body) {
        if header_node.as_ref().is_some_and(|h| Rc::ptr_eq(h, &child)) {
            continue;
        }
        position += 1;

        match NodeClass::of_tag(tag_name(&child).unwrap_or_default()) {
            NodeClass::Paragraph => {
                let content = text_content(&child);
                elements.push(DocumentElement::new(&prefix, position, ElementKind::Paragraph { content }));
            }
            NodeClass::Table => {
                let rows = table_rows(&child);
                elements.push(DocumentElement::new(&prefix, position, ElementKind::Table { rows }));
            }
            NodeClass::Heading(_) | NodeClass::Other => skipped += 1,
        }
    }

    debug!(
        "Extracted {} elements under header {:?} ({} top-level tags skipped)",
        elements.len(),
        header,
        skipped
    );

    ExtractedDocument { header, elements }
}

/// Local tag name of an element node.
fn tag_name(node: &Handle) -> Option<&str> {
    match node.data {
        NodeData::Element { ref name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// Element children of `node`, in order. Text and comment nodes are not children here.
fn element_children(node: &Handle) -> Vec<Handle> {
    node.children
        .borrow()
        .iter()
        .filter(|c| matches!(c.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

/// First element named `tag` in depth-first document order.
fn find_first(node: &Handle, tag: &str) -> Option<Handle> {
    if tag_name(node) == Some(tag) {
        return Some(Rc::clone(node));
    }
    node.children.borrow().iter().find_map(|c| find_first(c, tag))
}

/// Concatenated text of all descendant text nodes.
pub(crate) fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { ref contents } = node.data {
        out.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        collect_text(child, out);
    }
}

/// Cell text of every row that belongs to `table`.
///
/// Rows of nested tables belong to the nested table and are not collected.
fn table_rows(table: &Handle) -> TableRows {
    let mut rows = Vec::new();
    collect_rows(table, &mut rows);
    rows
}

fn collect_rows(node: &Handle, rows: &mut TableRows) {
    for child in element_children(node) {
        match tag_name(&child) {
            Some("tr") => {
                let cells = element_children(&child)
                    .iter()
                    .filter(|c| matches!(tag_name(c), Some("td" | "th")))
                    .map(text_content)
                    .collect();
                rows.push(cells);
            }
            Some("table") => {}
            _ => collect_rows(&child, rows),
        }
    }
}
