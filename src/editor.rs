//! The editable document model: extracted elements plus per-element remarks.
//!
//! Every mutation is a point update. None of them can add, remove or reorder
//! elements, and none touch `id` or `position`, so an element index stays
//! valid for the life of the model. Remarks are stored under the element's
//! stable id and addressed by index at the API.
//!
//! A rejected mutation returns a [`PreconditionError`] and changes nothing.

use crate::document::{DocumentElement, ElementKind, ExtractedDocument};
use crate::error::PreconditionError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Extracted document plus remarks, owned by one editing session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditableDocument {
    document: ExtractedDocument,
    remarks: HashMap<String, String>,
}

/// Owned copy of the model for rendering or serialisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub header: String,
    pub elements: Vec<DocumentElement>,
    /// One remark per element, in element order; `""` when never set.
    pub remarks: Vec<String>,
}

impl From<ExtractedDocument> for EditableDocument {
    fn from(document: ExtractedDocument) -> Self {
        Self::new(document)
    }
}

impl EditableDocument {
    /// Wrap a fresh extraction. The model starts with no remarks.
    pub fn new(document: ExtractedDocument) -> Self {
        Self {
            document,
            remarks: HashMap::new(),
        }
    }

    pub fn header(&self) -> &str {
        &self.document.header
    }

    pub fn elements(&self) -> &[DocumentElement] {
        &self.document.elements
    }

    pub fn element(&self, index: usize) -> Option<&DocumentElement> {
        self.document.elements.get(index)
    }

    pub fn len(&self) -> usize {
        self.document.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.elements.is_empty()
    }

    /// The underlying extraction.
    pub fn document(&self) -> &ExtractedDocument {
        &self.document
    }

    /// Replace the text of the paragraph at `index`.
    pub fn set_paragraph_content(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), PreconditionError> {
        let len = self.len();
        let element = self
            .document
            .elements
            .get_mut(index)
            .ok_or(PreconditionError::IndexOutOfRange { index, len })?;

        match &mut element.kind {
            ElementKind::Paragraph { content } => {
                *content = text.into();
                Ok(())
            }
            ElementKind::Table { .. } => Err(PreconditionError::NotAParagraph {
                index,
                id: element.id.clone(),
            }),
        }
    }

    /// Replace the text of one existing cell. The grid never grows.
    pub fn set_table_cell(
        &mut self,
        index: usize,
        row: usize,
        cell: usize,
        text: impl Into<String>,
    ) -> Result<(), PreconditionError> {
        let len = self.len();
        let element = self
            .document
            .elements
            .get_mut(index)
            .ok_or(PreconditionError::IndexOutOfRange { index, len })?;

        let rows = match &mut element.kind {
            ElementKind::Table { rows } => rows,
            ElementKind::Paragraph { .. } => {
                return Err(PreconditionError::NotATable {
                    index,
                    id: element.id.clone(),
                })
            }
        };

        let row_count = rows.len();
        let cells = rows.get_mut(row).ok_or(PreconditionError::RowOutOfRange {
            index,
            row,
            rows: row_count,
        })?;
        let cell_count = cells.len();
        let slot = cells.get_mut(cell).ok_or(PreconditionError::CellOutOfRange {
            index,
            row,
            cell,
            cells: cell_count,
        })?;

        *slot = text.into();
        Ok(())
    }

    /// Set the remark of the element at `index`, overwriting any previous one.
    pub fn set_remark(&mut self, index: usize, text: impl Into<String>) -> Result<(), PreconditionError> {
        let element = self.element(index).ok_or(PreconditionError::IndexOutOfRange {
            index,
            len: self.len(),
        })?;
        let id = element.id.clone();
        self.remarks.insert(id, text.into());
        Ok(())
    }

    /// Remark of the element at `index`; `""` when unset or out of range.
    pub fn remark(&self, index: usize) -> &str {
        self.element(index)
            .map(|e| self.remark_by_id(&e.id))
            .unwrap_or("")
    }

    /// Remark stored for the element with this id; `""` when unset.
    pub fn remark_by_id(&self, id: &str) -> &str {
        self.remarks.get(id).map(String::as_str).unwrap_or("")
    }

    /// Owned copy of header, elements and remarks.
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            header: self.document.header.clone(),
            elements: self.document.elements.clone(),
            remarks: self
                .document
                .elements
                .iter()
                .map(|e| self.remark_by_id(&e.id).to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extract::extract;

    fn sample() -> EditableDocument {
        EditableDocument::new(extract(
            "<h1>Report</h1><p>one</p><table><tr><td>a</td><td>b</td></tr><tr><td>c</td></tr></table><p>two</p>",
        ))
    }

    #[test]
    fn set_paragraph_replaces_only_target() {
        let mut doc = sample();
        let before = doc.clone();
        doc.set_paragraph_content(2, "X").unwrap();

        assert_eq!(doc.element(2).unwrap().content(), Some("X"));
        assert_eq!(doc.element(0), before.element(0));
        assert_eq!(doc.element(1), before.element(1));
        assert_eq!(doc.element(2).unwrap().id, "report3");
    }

    #[test]
    fn set_paragraph_on_table_is_rejected() {
        let mut doc = sample();
        let before = doc.clone();
        let err = doc.set_paragraph_content(1, "X").unwrap_err();
        assert_eq!(
            err,
            PreconditionError::NotAParagraph {
                index: 1,
                id: "report2".into()
            }
        );
        assert_eq!(doc, before);
    }

    #[test]
    fn set_table_cell_changes_exactly_one_cell() {
        let mut doc = sample();
        doc.set_table_cell(1, 0, 1, "Y").unwrap();
        assert_eq!(
            doc.element(1).unwrap().rows().unwrap(),
            &vec![
                vec!["a".to_string(), "Y".to_string()],
                vec!["c".to_string()],
            ]
        );
        assert_eq!(doc.element(0).unwrap().content(), Some("one"));
    }

    #[test]
    fn set_table_cell_bounds_are_enforced() {
        let mut doc = sample();
        let before = doc.clone();

        assert_eq!(
            doc.set_table_cell(1, 2, 0, "Z"),
            Err(PreconditionError::RowOutOfRange { index: 1, row: 2, rows: 2 })
        );
        // Row 1 is ragged: only one cell.
        assert_eq!(
            doc.set_table_cell(1, 1, 1, "Z"),
            Err(PreconditionError::CellOutOfRange { index: 1, row: 1, cell: 1, cells: 1 })
        );
        assert!(matches!(
            doc.set_table_cell(0, 0, 0, "Z"),
            Err(PreconditionError::NotATable { index: 0, .. })
        ));
        assert!(matches!(
            doc.set_table_cell(9, 0, 0, "Z"),
            Err(PreconditionError::IndexOutOfRange { index: 9, len: 3 })
        ));
        assert_eq!(doc, before);
    }

    #[test]
    fn remarks_are_independent_of_elements() {
        let mut doc = sample();
        let elements_before = doc.elements().to_vec();

        doc.set_remark(1, "check totals").unwrap();
        assert_eq!(doc.elements(), elements_before.as_slice());
        assert_eq!(doc.remark(1), "check totals");
        assert_eq!(doc.remark(0), "");
        assert_eq!(doc.remark(2), "");
        assert_eq!(doc.remark_by_id("report2"), "check totals");

        doc.set_remark(1, "done").unwrap();
        assert_eq!(doc.remark(1), "done");
    }

    #[test]
    fn remark_out_of_range_is_rejected() {
        let mut doc = sample();
        assert_eq!(
            doc.set_remark(3, "x"),
            Err(PreconditionError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(doc.remark(3), "");
    }

    #[test]
    fn remark_follows_id_not_content() {
        let mut doc = sample();
        doc.set_remark(0, "intro").unwrap();
        doc.set_paragraph_content(0, "rewritten").unwrap();
        assert_eq!(doc.remark(0), "intro");
    }

    #[test]
    fn snapshot_lists_remarks_in_element_order() {
        let mut doc = sample();
        doc.set_remark(2, "last").unwrap();
        let snap = doc.snapshot();
        assert_eq!(snap.header, "Report");
        assert_eq!(snap.elements.len(), 3);
        assert_eq!(snap.remarks, vec!["", "", "last"]);

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["elements"][1]["type"], "table");
        assert_eq!(json["remarks"][2], "last");
    }
}
