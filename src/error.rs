//! Error types for the docgrid library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`DocGridError`]: **Fatal for the current upload.** The PDF could not be
//!   read, the conversion gateway refused it, or the DOCX could not be
//!   rendered. Returned as `Err(DocGridError)` from the `convert*` functions.
//!   The session keeps whatever document it held before the attempt.
//!
//! * [`PreconditionError`]: **Rejected edit.** A mutation addressed the wrong
//!   element variant or a cell outside the grid. Returned by the
//!   [`crate::editor::EditableDocument`] setters; the model is left unchanged.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docgrid pipeline.
#[derive(Debug, Error)]
pub enum DocGridError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{name}'\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: [u8; 4] },

    /// The input contained no bytes at all.
    #[error("Input '{name}' is empty")]
    EmptyInput { name: String },

    /// The input exceeds the configured upload cap.
    #[error("Input '{name}' is {size} bytes, above the {limit}-byte upload limit")]
    InputTooLarge { name: String, size: u64, limit: u64 },

    // ── Gateway errors ────────────────────────────────────────────────────
    /// No API secret was configured for the conversion gateway.
    #[error("Conversion gateway is not configured.\n{hint}")]
    GatewayNotConfigured { hint: String },

    /// The gateway rejected the credentials (HTTP 401/403).
    #[error("Conversion gateway rejected the credentials (HTTP {status}): {detail}")]
    GatewayAuth { status: u16, detail: String },

    /// The gateway answered with a non-success status.
    #[error("Conversion gateway rejected '{file}' (HTTP {status}): {message}")]
    GatewayRejected {
        file: String,
        status: u16,
        message: String,
    },

    /// The gateway call did not complete within the configured timeout.
    #[error("Conversion gateway timed out after {secs}s\nIncrease --upload-timeout.")]
    GatewayTimeout { secs: u64 },

    /// The gateway could not be reached at all.
    #[error("Conversion gateway unreachable at '{url}': {reason}")]
    GatewayUnreachable { url: String, reason: String },

    /// The gateway reported success but returned no usable file.
    #[error("Conversion gateway returned no converted file: {detail}")]
    GatewayEmptyResult { detail: String },

    /// The converted file URL returned by the gateway could not be fetched.
    #[error("Failed to fetch converted file from '{url}': {reason}")]
    ConvertedFileFetchFailed { url: String, reason: String },

    // ── Render errors ─────────────────────────────────────────────────────
    /// The converted DOCX could not be rendered to HTML.
    #[error("Failed to render '{file}' to HTML: {detail}")]
    RenderFailed { file: String, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output DOCX file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocGridError {
    /// True for failures of the remote conversion step.
    pub fn is_gateway(&self) -> bool {
        matches!(
            self,
            DocGridError::GatewayNotConfigured { .. }
                | DocGridError::GatewayAuth { .. }
                | DocGridError::GatewayRejected { .. }
                | DocGridError::GatewayTimeout { .. }
                | DocGridError::GatewayUnreachable { .. }
                | DocGridError::GatewayEmptyResult { .. }
                | DocGridError::ConvertedFileFetchFailed { .. }
        )
    }

    /// True for failures of the DOCX → HTML step.
    pub fn is_render(&self) -> bool {
        matches!(self, DocGridError::RenderFailed { .. })
    }
}

/// A rejected edit on the editable document.
///
/// Returned by the [`crate::editor::EditableDocument`] setters. When one of
/// these is returned nothing in the model has changed.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum PreconditionError {
    /// No element exists at the index.
    #[error("Element index {index} is out of range (document has {len} elements)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The element is a table; paragraph content cannot be set on it.
    #[error("Element {index} ('{id}') is a table, not a paragraph")]
    NotAParagraph { index: usize, id: String },

    /// The element is a paragraph; table cells cannot be set on it.
    #[error("Element {index} ('{id}') is a paragraph, not a table")]
    NotATable { index: usize, id: String },

    /// The row does not exist in the table.
    #[error("Row {row} is out of range for element {index} (table has {rows} rows)")]
    RowOutOfRange { index: usize, row: usize, rows: usize },

    /// The cell does not exist in the row.
    #[error("Cell {cell} is out of range for row {row} of element {index} (row has {cells} cells)")]
    CellOutOfRange {
        index: usize,
        row: usize,
        cell: usize,
        cells: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_rejected_display() {
        let e = DocGridError::GatewayRejected {
            file: "report.pdf".into(),
            status: 400,
            message: "Unsupported file".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("report.pdf"), "got: {msg}");
        assert!(msg.contains("400"), "got: {msg}");
        assert!(e.is_gateway());
        assert!(!e.is_render());
    }

    #[test]
    fn render_failed_is_render() {
        let e = DocGridError::RenderFailed {
            file: "report.docx".into(),
            detail: "zip: invalid archive".into(),
        };
        assert!(e.is_render());
        assert!(!e.is_gateway());
        assert!(e.to_string().contains("invalid archive"));
    }

    #[test]
    fn input_errors_are_neither_gateway_nor_render() {
        let e = DocGridError::EmptyInput {
            name: "blank.pdf".into(),
        };
        assert!(!e.is_gateway());
        assert!(!e.is_render());
    }

    #[test]
    fn precondition_display() {
        let e = PreconditionError::CellOutOfRange {
            index: 2,
            row: 0,
            cell: 5,
            cells: 2,
        };
        let msg = e.to_string();
        assert!(msg.contains("Cell 5"), "got: {msg}");
        assert!(msg.contains("2 cells"), "got: {msg}");
    }

    #[test]
    fn not_a_paragraph_mentions_id() {
        let e = PreconditionError::NotAParagraph {
            index: 1,
            id: "report2".into(),
        };
        assert!(e.to_string().contains("report2"));
    }
}
