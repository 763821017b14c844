//! Result types returned by the conversion entry points.

use crate::document::ExtractedDocument;
use crate::editor::EditableDocument;
use serde::{Deserialize, Serialize};

/// Everything produced by one successful upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Name of the uploaded file.
    pub source_file_name: String,
    /// Name of the converted file (as reported by the gateway when available).
    pub converted_file_name: String,
    /// Converted file bytes. Not serialised.
    #[serde(skip)]
    pub converted: Vec<u8>,
    /// Rendered HTML.
    pub html: String,
    /// Extracted header and elements.
    pub document: ExtractedDocument,
    pub stats: ConversionStats,
}

impl ConversionOutput {
    /// Hand the extraction to a fresh editing model.
    pub fn into_editable(self) -> EditableDocument {
        EditableDocument::new(self.document)
    }
}

/// Sizes and timings of one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub input_bytes: u64,
    pub converted_bytes: u64,
    pub html_bytes: u64,
    pub paragraph_count: usize,
    pub table_count: usize,
    /// Conversion cost reported by the gateway, if any.
    pub gateway_cost: Option<u64>,
    pub gateway_duration_ms: u64,
    /// Zero when the gateway inlined the file.
    pub fetch_duration_ms: u64,
    pub render_duration_ms: u64,
    pub extract_duration_ms: u64,
    pub total_duration_ms: u64,
}
