//! Integration tests for HTML → element extraction.
//!
//! Run with:
//!   cargo test --test extract

use docgrid::{extract_html, slug, ElementKind, DEFAULT_HEADER};
use std::collections::HashSet;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn paragraph(content: &str) -> ElementKind {
    ElementKind::Paragraph {
        content: content.to_string(),
    }
}

fn table(rows: &[&[&str]]) -> ElementKind {
    ElementKind::Table {
        rows: rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    }
}

// ── Scenario ─────────────────────────────────────────────────────────────────

#[test]
fn report_scenario() {
    let doc = extract_html(
        "<h1>Report</h1><p>Intro text</p><table><tr><td>A</td><td>B</td></tr></table>",
    );

    assert_eq!(doc.header, "Report");
    assert_eq!(doc.elements.len(), 2);

    assert_eq!(doc.elements[0].id, "report1");
    assert_eq!(doc.elements[0].position, 1);
    assert_eq!(doc.elements[0].kind, paragraph("Intro text"));

    assert_eq!(doc.elements[1].id, "report2");
    assert_eq!(doc.elements[1].position, 2);
    assert_eq!(doc.elements[1].kind, table(&[&["A", "B"]]));
}

#[test]
fn report_scenario_serialises_with_type_tag() {
    let doc = extract_html(
        "<h1>Report</h1><p>Intro text</p><table><tr><td>A</td><td>B</td></tr></table>",
    );
    let json = serde_json::to_value(&doc).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "header": "Report",
            "elements": [
                {"id": "report1", "position": 1, "type": "paragraph", "content": "Intro text"},
                {"id": "report2", "position": 2, "type": "table", "rows": [["A", "B"]]}
            ]
        })
    );
}

// ── Positions ────────────────────────────────────────────────────────────────

#[test]
fn positions_follow_document_order() {
    for n in 1..=6 {
        let mut html = String::from("<h1>Title</h1>");
        for i in 0..n {
            if i % 2 == 0 {
                html.push_str(&format!("<p>p{i}</p>"));
            } else {
                html.push_str(&format!("<table><tr><td>t{i}</td></tr></table>"));
            }
        }

        let doc = extract_html(&html);
        assert_eq!(doc.elements.len(), n, "n = {n}");
        for (i, element) in doc.elements.iter().enumerate() {
            assert_eq!(element.position, i + 1, "n = {n}");
            assert_eq!(element.id, format!("title{}", i + 1));
        }
    }
}

#[test]
fn skipped_tags_keep_their_slot() {
    let doc = extract_html("<h1>T</h1><p>a</p><div>skip</div><ul><li>x</li></ul><p>b</p>");
    let positions: Vec<usize> = doc.elements.iter().map(|e| e.position).collect();
    assert_eq!(positions, vec![1, 4]);
    assert_eq!(doc.elements[1].id, "t4");
}

#[test]
fn text_and_comment_nodes_are_not_counted() {
    let doc = extract_html("<h1>T</h1>\n  <!-- note -->\n<p>a</p>\n stray text \n<p>b</p>");
    let positions: Vec<usize> = doc.elements.iter().map(|e| e.position).collect();
    assert_eq!(positions, vec![1, 2]);
}

// ── Header ───────────────────────────────────────────────────────────────────

#[test]
fn header_falls_back_deterministically() {
    let html = "<p>one</p><table><tr><td>x</td></tr></table>";
    let first = extract_html(html);
    let second = extract_html(html);

    assert_eq!(first.header, DEFAULT_HEADER);
    assert_eq!(first, second);
    assert_eq!(first.elements[0].id, format!("{}1", slug(DEFAULT_HEADER)));
}

#[test]
fn h2_is_used_when_no_h1() {
    let doc = extract_html("<h2>Sub Title</h2><p>x</p>");
    assert_eq!(doc.header, "Sub Title");
    assert_eq!(doc.elements[0].id, "subtitle1");
}

#[test]
fn slug_lowercases_and_strips_whitespace() {
    assert_eq!(slug("Annual  Report\t2024"), "annualreport2024");
    assert_eq!(slug(""), "");
}

#[test]
fn empty_input_yields_no_elements() {
    let doc = extract_html("");
    assert_eq!(doc.header, DEFAULT_HEADER);
    assert!(doc.elements.is_empty());
}

// ── Ids ──────────────────────────────────────────────────────────────────────

#[test]
fn ids_are_pairwise_distinct() {
    let inputs = [
        "<h1>A</h1><p>1</p><p>2</p><p>3</p>",
        "<p>1</p><h2>B</h2><table><tr><td>x</td></tr></table><p>2</p><div></div><p>3</p>",
        "<h1>Same</h1><h1>Same</h1><p>x</p><p>x</p>",
    ];
    for html in inputs {
        let doc = extract_html(html);
        let ids: HashSet<&str> = doc.elements.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), doc.elements.len(), "duplicate id in {html}");
    }
}

// ── Content ──────────────────────────────────────────────────────────────────

#[test]
fn table_rows_keep_order() {
    let doc = extract_html(
        "<h1>T</h1><table><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>",
    );
    assert_eq!(doc.elements[0].kind, table(&[&["a", "b"], &["c", "d"]]));
}

#[test]
fn header_cells_and_explicit_sections_are_rows() {
    let doc = extract_html(
        "<table><thead><tr><th>k</th><th>v</th></tr></thead>\
         <tbody><tr><td>1</td><td>2</td></tr></tbody></table>",
    );
    assert_eq!(doc.elements[0].kind, table(&[&["k", "v"], &["1", "2"]]));
}

#[test]
fn entities_and_inline_markup() {
    let doc = extract_html("<p>a &amp; b</p><p>x <strong>y</strong></p>");
    assert_eq!(doc.elements[0].kind, paragraph("a & b"));
    assert_eq!(doc.elements[1].kind, paragraph("x y"));
}

#[test]
fn empty_paragraph_is_kept() {
    let doc = extract_html("<p></p>");
    assert_eq!(doc.elements.len(), 1);
    assert_eq!(doc.elements[0].kind, paragraph(""));
}
