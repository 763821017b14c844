//! Extracted document types: the ordered paragraph/table sequence produced by
//! [`crate::pipeline::extract`].

use serde::{Deserialize, Serialize};

/// Header used when the HTML has neither an `<h1>` nor an `<h2>`.
pub const DEFAULT_HEADER: &str = "default-header";

/// Cell grid of a table element, rows in document order.
pub type TableRows = Vec<Vec<String>>;

/// One paragraph or one table, the unit of extraction and editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentElement {
    /// `slug(header)` followed by `position`.
    pub id: String,
    /// 1-based position in document order. Never reassigned.
    pub position: usize,
    #[serde(flatten)]
    pub kind: ElementKind,
}

/// The content variant of a [`DocumentElement`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    /// Plain text of one paragraph, inline markup stripped.
    Paragraph { content: String },
    /// Cell text exactly as found; rows are not padded to a common width.
    Table { rows: TableRows },
}

impl DocumentElement {
    /// Build an element whose id is derived from `header_slug` and `position`.
    pub fn new(header_slug: &str, position: usize, kind: ElementKind) -> Self {
        Self {
            id: format!("{header_slug}{position}"),
            position,
            kind,
        }
    }

    pub fn is_paragraph(&self) -> bool {
        matches!(self.kind, ElementKind::Paragraph { .. })
    }

    pub fn is_table(&self) -> bool {
        matches!(self.kind, ElementKind::Table { .. })
    }

    /// Paragraph text, or `None` for tables.
    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Paragraph { content } => Some(content),
            ElementKind::Table { .. } => None,
        }
    }

    /// Table rows, or `None` for paragraphs.
    pub fn rows(&self) -> Option<&TableRows> {
        match &self.kind {
            ElementKind::Table { rows } => Some(rows),
            ElementKind::Paragraph { .. } => None,
        }
    }

    /// Short variant name used in listings: `"paragraph"` or `"table"`.
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ElementKind::Paragraph { .. } => "paragraph",
            ElementKind::Table { .. } => "table",
        }
    }
}

/// Result of one extraction pass over a rendered HTML document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Text of the first `<h1>` (else first `<h2>`, else [`DEFAULT_HEADER`]).
    pub header: String,
    /// Paragraphs and tables in document order.
    pub elements: Vec<DocumentElement>,
}

impl ExtractedDocument {
    /// Number of paragraph elements.
    pub fn paragraph_count(&self) -> usize {
        self.elements.iter().filter(|e| e.is_paragraph()).count()
    }

    /// Number of table elements.
    pub fn table_count(&self) -> usize {
        self.elements.iter().filter(|e| e.is_table()).count()
    }
}

/// Normalise header text into an id prefix: lower-cased, whitespace removed.
pub fn slug(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_lowercases_and_strips_whitespace() {
        assert_eq!(slug("Report"), "report");
        assert_eq!(slug("  Annual  Report\t2024\n"), "annualreport2024");
        assert_eq!(slug(""), "");
        assert_eq!(slug(DEFAULT_HEADER), "default-header");
    }

    #[test]
    fn element_id_is_slug_plus_position() {
        let el = DocumentElement::new(
            "report",
            3,
            ElementKind::Paragraph {
                content: "x".into(),
            },
        );
        assert_eq!(el.id, "report3");
        assert_eq!(el.position, 3);
        assert!(el.is_paragraph());
        assert_eq!(el.content(), Some("x"));
        assert_eq!(el.rows(), None);
    }

    #[test]
    fn element_serialises_with_type_tag() {
        let el = DocumentElement::new(
            "report",
            2,
            ElementKind::Table {
                rows: vec![vec!["A".into(), "B".into()]],
            },
        );
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(json["id"], "report2");
        assert_eq!(json["type"], "table");
        assert_eq!(json["rows"][0][1], "B");

        let back: DocumentElement = serde_json::from_value(json).unwrap();
        assert_eq!(back, el);
    }

    #[test]
    fn counts_by_variant() {
        let doc = ExtractedDocument {
            header: "h".into(),
            elements: vec![
                DocumentElement::new("h", 1, ElementKind::Paragraph { content: "a".into() }),
                DocumentElement::new("h", 2, ElementKind::Table { rows: vec![] }),
                DocumentElement::new("h", 3, ElementKind::Paragraph { content: "b".into() }),
            ],
        };
        assert_eq!(doc.paragraph_count(), 2);
        assert_eq!(doc.table_count(), 1);
    }
}
