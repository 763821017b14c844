//! Conversion entry points: upload → gateway → render → extract.
//!
//! Every entry point runs the stages strictly in sequence and stops at the
//! first failure. Extraction only ever sees HTML from a successful render, so
//! a failed upload never produces a partial document.

use crate::config::ConversionConfig;
use crate::document::ExtractedDocument;
use crate::error::DocGridError;
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::encode::ConvertedPayload;
use crate::pipeline::gateway::{ConversionGateway, ConversionRequest, ConvertApiGateway};
use crate::pipeline::input::{self, ResolvedInput};
use crate::pipeline::render::{self, DocxHtmlRenderer, MarkupRenderer};
use crate::pipeline::extract;
use crate::progress::Stage;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a PDF file or URL and extract its editable structure.
///
/// This is the primary entry point for the library. It talks to the hosted
/// gateway configured in `config` and renders with [`DocxHtmlRenderer`].
///
/// # Errors
/// - input errors (missing file, not a PDF, too large)
/// - gateway errors ([`DocGridError::is_gateway`])
/// - render errors ([`DocGridError::is_render`])
pub async fn convert(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, DocGridError> {
    let input_str = input_str.as_ref();
    info!("Starting conversion: {}", input_str);
    notify_start(config, input_str);

    let (resolved, _) = run_stage(config, Stage::Input, input::resolve_input(
        input_str,
        config.download_timeout_secs,
    ))
    .await?;

    let gateway = ConvertApiGateway::from_config(config)?;
    convert_with(resolved, &gateway, Arc::new(DocxHtmlRenderer), config).await
}

/// Convert PDF bytes that are already in memory.
pub async fn convert_from_bytes(
    file_name: impl Into<String>,
    bytes: Vec<u8>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, DocGridError> {
    let resolved = ResolvedInput::from_bytes(file_name, bytes);
    notify_start(config, &resolved.file_name);
    let gateway = ConvertApiGateway::from_config(config)?;
    convert_with(resolved, &gateway, Arc::new(DocxHtmlRenderer), config).await
}

/// Run the pipeline on resolved input with explicit collaborators.
///
/// This is what the other entry points delegate to; use it directly to plug
/// in a different gateway or renderer.
pub async fn convert_with(
    resolved: ResolvedInput,
    gateway: &dyn ConversionGateway,
    renderer: Arc<dyn MarkupRenderer>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, DocGridError> {
    let total_start = Instant::now();
    let mut stats = ConversionStats {
        input_bytes: resolved.len(),
        ..Default::default()
    };

    if let Err(e) = input::validate_pdf(&resolved, config.max_input_bytes) {
        notify_error(config, Stage::Input, &e);
        return Err(e);
    }

    // ── Step 1: Submit to the gateway ────────────────────────────────────
    let request = ConversionRequest {
        file_name: &resolved.file_name,
        bytes: &resolved.bytes,
        source_format: &config.source_format,
        target_format: &config.target_format,
    };
    let (result, gateway_ms) = run_stage(config, Stage::Gateway, gateway.submit(request)).await?;
    stats.gateway_duration_ms = gateway_ms;
    stats.gateway_cost = result.cost;
    info!("Gateway conversion finished in {}ms", gateway_ms);

    let converted_file_name = if result.file_name.is_empty() {
        input::converted_file_name(&resolved.file_name, &config.target_format)
    } else {
        result.file_name.clone()
    };

    // ── Step 2: Fetch the converted file if the gateway stored it ────────
    let converted = match result.payload {
        ConvertedPayload::Inline(bytes) => bytes,
        ConvertedPayload::Stored(url) => {
            debug!("Fetching stored result from {}", url);
            let (bytes, fetch_ms) = run_stage(config, Stage::Fetch, gateway.fetch(&url)).await?;
            stats.fetch_duration_ms = fetch_ms;
            bytes
        }
    };
    stats.converted_bytes = converted.len() as u64;

    // ── Step 3: Render to HTML ───────────────────────────────────────────
    let ((html, converted), render_ms) = run_stage(
        config,
        Stage::Render,
        render::render_html(renderer, &converted_file_name, converted),
    )
    .await?;
    stats.render_duration_ms = render_ms;
    stats.html_bytes = html.len() as u64;

    // ── Step 4: Extract ──────────────────────────────────────────────────
    let (document, extract_ms) = run_stage(config, Stage::Extract, async {
        Ok::<_, DocGridError>(extract::extract(&html))
    })
    .await?;
    stats.extract_duration_ms = extract_ms;
    stats.paragraph_count = document.paragraph_count();
    stats.table_count = document.table_count();
    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Conversion complete: '{}' → {} paragraphs, {} tables, {}ms total",
        resolved.file_name, stats.paragraph_count, stats.table_count, stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(document.elements.len());
    }

    Ok(ConversionOutput {
        source_file_name: resolved.file_name,
        converted_file_name,
        converted,
        html,
        document,
        stats,
    })
}

/// Convert and also write the converted file to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, DocGridError> {
    let output = convert(input_str, config).await?;
    write_atomic(output_path.as_ref(), &output.converted).await?;
    Ok(output)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, DocGridError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DocGridError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input_str, config))
}

/// Render an already-converted DOCX and extract it. No gateway involved.
pub async fn extract_from_docx(
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<(String, ExtractedDocument), DocGridError> {
    let (html, _) = render::render_html(Arc::new(DocxHtmlRenderer), file_name, bytes).await?;
    let document = extract::extract(&html);
    Ok((html, document))
}

/// Extract from HTML directly.
pub fn extract_html(html: &str) -> ExtractedDocument {
    extract::extract(html)
}

/// Write `bytes` to `path` via a sibling temp file and a rename.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DocGridError> {
    let write_err = |source| DocGridError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn notify_start(config: &ConversionConfig, name: &str) {
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(name);
    }
}

fn notify_error(config: &ConversionConfig, stage: Stage, error: &DocGridError) {
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_error(stage, &error.to_string());
    }
}

/// Await one stage, reporting start/complete/error to the progress callback.
async fn run_stage<T, F>(
    config: &ConversionConfig,
    stage: Stage,
    fut: F,
) -> Result<(T, u64), DocGridError>
where
    F: Future<Output = Result<T, DocGridError>>,
{
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(stage);
    }
    let start = Instant::now();
    match fut.await {
        Ok(value) => {
            let elapsed_ms = start.elapsed().as_millis() as u64;
            if let Some(ref cb) = config.progress_callback {
                cb.on_stage_complete(stage, elapsed_ms);
            }
            Ok((value, elapsed_ms))
        }
        Err(e) => {
            notify_error(config, stage, &e);
            Err(e)
        }
    }
}
