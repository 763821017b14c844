//! # docgrid
//!
//! Upload a PDF, convert it to DOCX through a hosted conversion service,
//! render the DOCX to HTML and break it into an ordered grid of editable
//! paragraphs and tables, each with a free-text remark.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    resolve local file or download from URL, check %PDF magic
//!  ├─ 2. Gateway  POST base64 JSON to the hosted converter (PDF → DOCX)
//!  ├─ 3. Fetch    download the converted file when the gateway stored it
//!  ├─ 4. Render   DOCX → HTML via docx-rs (CPU-bound, spawn_blocking)
//!  └─ 5. Extract  HTML → header + positioned paragraph/table elements
//! ```
//!
//! The extraction is then handed to an [`EditableDocument`], which supports
//! point edits (paragraph text, one table cell, per-element remark) and never
//! adds, removes or reorders elements.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docgrid::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Secret read from CONVERTAPI_SECRET when not set explicitly
//!     let config = ConversionConfig::default();
//!     let output = convert("report.pdf", &config).await?;
//!
//!     let mut doc = output.into_editable();
//!     doc.set_remark(0, "check the intro")?;
//!     for (i, element) in doc.elements().iter().enumerate() {
//!         println!("{} {} {}", element.id, element.type_name(), doc.remark(i));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Without the gateway
//!
//! [`extract_html`] and [`extract_from_docx`] run only the local stages, and
//! [`convert_with`] accepts any [`ConversionGateway`] / [`MarkupRenderer`]
//! pair.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docgrid` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docgrid = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod document;
pub mod editor;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{
    convert, convert_from_bytes, convert_sync, convert_to_file, convert_with, extract_from_docx,
    extract_html,
};
pub use document::{slug, DocumentElement, ElementKind, ExtractedDocument, TableRows, DEFAULT_HEADER};
pub use editor::{DocumentSnapshot, EditableDocument};
pub use error::{DocGridError, PreconditionError};
pub use output::{ConversionOutput, ConversionStats};
pub use pipeline::gateway::{ConversionGateway, ConversionRequest, ConvertApiGateway};
pub use pipeline::input::ResolvedInput;
pub use pipeline::render::{DocxHtmlRenderer, MarkupRenderer};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
pub use session::{Session, UploadTicket};
