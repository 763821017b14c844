//! Pipeline stages for upload → convert → extract.
//!
//! Each submodule implements exactly one transformation step, so each is
//! independently testable and the remote collaborators (gateway, renderer)
//! can be swapped behind their traits.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ gateway ──▶ (fetch) ──▶ render ──▶ extract
//! (path/URL) (hosted API)  (stored URL)  (docx-rs)  (html5ever)
//! ```
//!
//! 1. [`input`]: load the path or URL into memory and check the PDF magic
//! 2. [`encode`]: gateway wire format: base64 JSON request, result decoding
//! 3. [`gateway`]: submit to the hosted converter; the only stage that talks
//!    to a third-party service
//! 4. [`render`]: DOCX → HTML on the blocking pool
//! 5. [`extract`]: HTML → ordered paragraph/table elements with stable ids

pub mod encode;
pub mod extract;
pub mod gateway;
pub mod input;
pub mod render;
