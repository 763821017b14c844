//! Integration tests for the editable document model and sessions.
//!
//! Run with:
//!   cargo test --test editor

use docgrid::{extract_html, EditableDocument, ElementKind, PreconditionError, Session};

const SAMPLE: &str = "<h1>Budget</h1>\
    <p>Summary</p>\
    <table><tr><td>Item</td><td>Cost</td></tr><tr><td>Rent</td><td>100</td></tr></table>\
    <p>Notes</p>\
    <table><tr><td>x</td></tr></table>";

fn sample() -> EditableDocument {
    EditableDocument::new(extract_html(SAMPLE))
}

#[test]
fn paragraph_edit_touches_only_its_element() {
    for i in [0usize, 2] {
        let mut doc = sample();
        let before = doc.clone();
        doc.set_paragraph_content(i, "X").unwrap();

        for j in 0..doc.len() {
            if j == i {
                assert_eq!(doc.element(j).unwrap().content(), Some("X"));
                assert_eq!(doc.element(j).unwrap().id, before.element(j).unwrap().id);
                assert_eq!(
                    doc.element(j).unwrap().position,
                    before.element(j).unwrap().position
                );
            } else {
                assert_eq!(doc.element(j), before.element(j), "element {j} changed");
            }
        }
    }
}

#[test]
fn cell_edit_touches_only_its_cell() {
    let mut doc = sample();
    let before = doc.clone();
    doc.set_table_cell(1, 1, 1, "Y").unwrap();

    let rows = doc.element(1).unwrap().rows().unwrap();
    let old_rows = before.element(1).unwrap().rows().unwrap();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if (r, c) == (1, 1) {
                assert_eq!(cell, "Y");
            } else {
                assert_eq!(cell, &old_rows[r][c]);
            }
        }
    }
    for j in [0usize, 2, 3] {
        assert_eq!(doc.element(j), before.element(j));
    }
}

#[test]
fn rejected_edits_leave_model_unchanged() {
    let mut doc = sample();
    doc.set_remark(0, "keep").unwrap();
    let before = doc.clone();

    assert!(matches!(
        doc.set_paragraph_content(1, "X"),
        Err(PreconditionError::NotAParagraph { index: 1, .. })
    ));
    assert!(matches!(
        doc.set_table_cell(0, 0, 0, "X"),
        Err(PreconditionError::NotATable { index: 0, .. })
    ));
    assert!(matches!(
        doc.set_table_cell(3, 0, 1, "X"),
        Err(PreconditionError::CellOutOfRange { index: 3, row: 0, cell: 1, cells: 1 })
    ));
    assert!(matches!(
        doc.set_paragraph_content(4, "X"),
        Err(PreconditionError::IndexOutOfRange { index: 4, len: 4 })
    ));

    assert_eq!(doc, before);
}

#[test]
fn remarks_never_alter_elements() {
    let mut doc = sample();
    let elements = doc.elements().to_vec();

    doc.set_remark(3, "note").unwrap();
    doc.set_remark(0, "first").unwrap();

    assert_eq!(doc.elements(), elements.as_slice());
    assert_eq!(doc.remark(3), "note");
    assert_eq!(doc.remark(0), "first");
    assert_eq!(doc.remark(1), "");
    assert_eq!(doc.remark(2), "");
}

#[test]
fn edits_do_not_move_remarks() {
    let mut doc = sample();
    doc.set_remark(1, "costs").unwrap();
    doc.set_table_cell(1, 0, 0, "Line item").unwrap();
    doc.set_paragraph_content(0, "Overview").unwrap();

    let snap = doc.snapshot();
    assert_eq!(snap.remarks, vec!["", "costs", "", ""]);
    assert!(matches!(
        &snap.elements[1].kind,
        ElementKind::Table { rows } if rows[0][0] == "Line item"
    ));
}

#[test]
fn snapshot_round_trips_through_json() {
    let mut doc = sample();
    doc.set_remark(2, "check").unwrap();
    let snap = doc.snapshot();

    let json = serde_json::to_string(&snap).unwrap();
    let back: docgrid::DocumentSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snap);
}

#[test]
fn session_keeps_newest_upload() {
    let mut session = Session::new();
    let slow = session.begin_upload();
    let fast = session.begin_upload();

    assert!(session.complete_upload(fast, extract_html("<h1>New</h1><p>n</p>")));
    session.document_mut().unwrap().set_remark(0, "on new").unwrap();

    assert!(!session.complete_upload(slow, extract_html("<h1>Old</h1><p>o</p>")));
    let doc = session.document().unwrap();
    assert_eq!(doc.header(), "New");
    assert_eq!(doc.remark(0), "on new");
}
