//! Markup rendering: turn converted DOCX bytes into an HTML fragment.
//!
//! The output mirrors what browser-side DOCX viewers produce: one block tag
//! per body paragraph (`<h1>`–`<h6>` for heading styles, `<p>` otherwise),
//! `<table><tr><td><p>…</p></td></tr></table>` for tables, `<strong>`/`<em>`
//! for bold and italic runs. Empty paragraphs are dropped.
//!
//! ## Why spawn_blocking?
//!
//! Reading a DOCX means inflating a zip archive and parsing several XML parts.
//! That is CPU-bound work with no await points, so [`render_html`] moves it
//! onto the blocking pool to keep Tokio workers free.

use crate::error::DocGridError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

/// Converts a binary document into HTML text.
///
/// Implementations must be `Send + Sync`; rendering runs on the blocking pool.
pub trait MarkupRenderer: Send + Sync {
    /// Render `bytes` (named `file_name`, for error messages) to HTML.
    fn render(&self, file_name: &str, bytes: &[u8]) -> Result<String, DocGridError>;
}

/// [`MarkupRenderer`] for DOCX files, built on `docx-rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxHtmlRenderer;

impl MarkupRenderer for DocxHtmlRenderer {
    fn render(&self, file_name: &str, bytes: &[u8]) -> Result<String, DocGridError> {
        let docx = docx_rs::read_docx(bytes).map_err(|e| DocGridError::RenderFailed {
            file: file_name.to_string(),
            detail: e.to_string(),
        })?;

        let mut html = String::new();
        let mut paragraphs = 0usize;
        let mut tables = 0usize;

        for child in &docx.document.children {
            match child {
                docx_rs::DocumentChild::Paragraph(para) => {
                    if write_paragraph(para, &mut html) {
                        paragraphs += 1;
                    }
                }
                docx_rs::DocumentChild::Table(table) => {
                    write_table(table, &mut html);
                    tables += 1;
                }
                _ => {}
            }
        }

        debug!(
            "Rendered '{}': {} paragraphs, {} tables, {} bytes of HTML",
            file_name,
            paragraphs,
            tables,
            html.len()
        );
        Ok(html)
    }
}

/// Render on the blocking pool.
///
/// The input bytes move into the blocking task and are handed back next to
/// the HTML, so callers that keep the converted file never copy it.
pub async fn render_html(
    renderer: Arc<dyn MarkupRenderer>,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<(String, Vec<u8>), DocGridError> {
    let name = file_name.to_string();
    tokio::task::spawn_blocking(move || {
        let html = renderer.render(&name, &bytes)?;
        Ok((html, bytes))
    })
    .await
    .map_err(|e| DocGridError::Internal(format!("Render task panicked: {}", e)))?
}

static RE_HEADING_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^heading\s*([1-6])$").unwrap());

/// Block tag for a paragraph style id.
fn block_tag(style: Option<&str>) -> &'static str {
    let Some(style) = style else {
        return "p";
    };
    if style.eq_ignore_ascii_case("title") {
        return "h1";
    }
    match RE_HEADING_STYLE.captures(style).map(|c| c[1].to_string()) {
        Some(level) => match level.as_str() {
            "1" => "h1",
            "2" => "h2",
            "3" => "h3",
            "4" => "h4",
            "5" => "h5",
            _ => "h6",
        },
        None => "p",
    }
}

/// Write one paragraph; returns `false` when it had no content and was dropped.
fn write_paragraph(para: &docx_rs::Paragraph, out: &mut String) -> bool {
    let mut inner = String::new();
    write_paragraph_children(&para.children, &mut inner);
    if inner.is_empty() {
        return false;
    }

    let tag = block_tag(para.property.style.as_ref().map(|s| s.val.as_str()));
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&inner);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
    true
}

fn write_paragraph_children(children: &[docx_rs::ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            docx_rs::ParagraphChild::Run(run) => write_run(run, out),
            docx_rs::ParagraphChild::Hyperlink(link) => write_paragraph_children(&link.children, out),
            docx_rs::ParagraphChild::Insert(insert) => {
                for child in &insert.children {
                    if let docx_rs::InsertChild::Run(run) = child {
                        write_run(run, out);
                    }
                }
            }
            _ => {}
        }
    }
}

fn write_run(run: &docx_rs::Run, out: &mut String) {
    let mut text = String::new();
    for child in &run.children {
        match child {
            docx_rs::RunChild::Text(t) => text.push_str(&html_escape::encode_text(&t.text)),
            docx_rs::RunChild::Tab(_) => text.push('\t'),
            docx_rs::RunChild::Break(_) => text.push_str("<br />"),
            _ => {}
        }
    }
    if text.is_empty() {
        return;
    }

    // `<w:b w:val="false"/>` is present but switched off.
    let bold = run.run_property.bold == Some(docx_rs::Bold::new());
    let italic = run.run_property.italic == Some(docx_rs::Italic::new());
    if bold {
        out.push_str("<strong>");
    }
    if italic {
        out.push_str("<em>");
    }
    out.push_str(&text);
    if italic {
        out.push_str("</em>");
    }
    if bold {
        out.push_str("</strong>");
    }
}

fn write_table(table: &docx_rs::Table, out: &mut String) {
    out.push_str("<table>");
    for table_child in &table.rows {
        let docx_rs::TableChild::TableRow(row) = table_child;
        out.push_str("<tr>");
        for row_child in &row.cells {
            let docx_rs::TableRowChild::TableCell(cell) = row_child;
            out.push_str("<td>");
            for content in &cell.children {
                if let docx_rs::TableCellContent::Paragraph(para) = content {
                    write_paragraph(para, out);
                }
            }
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }
    out.push_str("</table>");
}
