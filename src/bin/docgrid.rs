//! CLI binary for docgrid.
//!
//! A thin shim over the library crate: maps flags to `ConversionConfig`,
//! runs one upload through a `Session`, applies the requested edits and
//! prints the resulting grid.

use anyhow::{bail, Context, Result};
use clap::Parser;
use docgrid::convert::write_atomic;
use docgrid::{
    convert, extract_from_docx, extract_html, ConversionConfig, ConversionProgressCallback,
    EditableDocument, ElementKind, ExtractedDocument, ProgressCallback, Session, Stage,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner naming the running stage plus one
/// log line per finished stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, file_name: &str) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Uploading {file_name}…"))
        ));
    }

    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_prefix(stage.label().to_string());
        self.bar.set_message(match stage {
            Stage::Input => "reading input",
            Stage::Gateway => "waiting for the conversion service",
            Stage::Fetch => "downloading converted file",
            Stage::Render => "rendering DOCX to HTML",
            Stage::Extract => "extracting elements",
        });
    }

    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        self.bar.println(format!(
            "  {} {:<8}  {}",
            green("✓"),
            stage.label(),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
    }

    fn on_stage_error(&self, stage: Stage, error: &str) {
        // Keep the log line to one terminal row.
        let msg: String = if error.chars().count() > 80 {
            error.chars().take(79).chain(std::iter::once('…')).collect()
        } else {
            error.to_string()
        };
        self.bar.finish_and_clear();
        eprintln!("  {} {:<8}  {}", red("✗"), stage.label(), red(&msg));
    }

    fn on_conversion_complete(&self, element_count: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} elements extracted",
            green("✔"),
            bold(&element_count.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a PDF and print the element grid
  docgrid report.pdf

  # Keep the converted DOCX as well
  docgrid report.pdf -o report.docx

  # Skip the gateway: start from a DOCX or an HTML file
  docgrid --from-docx report.docx
  docgrid --from-html report.html

  # Edit before printing (indexes are 0-based element indexes)
  docgrid report.pdf --set-paragraph 0="New intro" --set-cell 1,0,2=42 \
      --remark 1="check totals" --json

  # Convert from URL
  docgrid https://example.com/report.pdf

ENVIRONMENT VARIABLES:
  CONVERTAPI_SECRET       Secret for the hosted conversion service
  DOCGRID_API_URL         Override the service base URL
  RUST_LOG                Override the log filter (e.g. docgrid=debug)

EDITS:
  Edits are applied in groups: paragraphs, then cells, then remarks, each
  group in the order given. The first rejected edit aborts the run.
"#;

/// Convert PDFs to an editable grid of paragraphs and tables.
#[derive(Parser, Debug)]
#[command(
    name = "docgrid",
    version,
    about = "Convert PDFs to an editable grid of paragraphs and tables",
    long_about = "Upload a PDF (local file or URL) to a hosted PDF→DOCX conversion service, \
render the DOCX to HTML and split it into positioned paragraph and table elements that can be \
edited and annotated with remarks.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local file path or HTTP/HTTPS URL (PDF unless --from-docx/--from-html).
    input: String,

    /// Treat INPUT as a DOCX and skip the conversion service.
    #[arg(long, conflicts_with = "from_html")]
    from_docx: bool,

    /// Treat INPUT as HTML and skip conversion and rendering.
    #[arg(long)]
    from_html: bool,

    /// Also write the converted DOCX to this file.
    #[arg(short, long, env = "DOCGRID_OUTPUT")]
    output: Option<PathBuf>,

    /// Replace a paragraph's text: INDEX=TEXT.
    #[arg(long = "set-paragraph", value_name = "INDEX=TEXT")]
    set_paragraph: Vec<String>,

    /// Replace one table cell: ELEM,ROW,CELL=TEXT.
    #[arg(long = "set-cell", value_name = "ELEM,ROW,CELL=TEXT")]
    set_cell: Vec<String>,

    /// Set an element's remark: INDEX=TEXT.
    #[arg(long = "remark", value_name = "INDEX=TEXT")]
    remark: Vec<String>,

    /// Print the document snapshot as JSON instead of the grid.
    #[arg(long, conflicts_with = "html")]
    json: bool,

    /// Print the rendered HTML instead of the grid.
    #[arg(long)]
    html: bool,

    /// Conversion service secret.
    #[arg(long, env = "CONVERTAPI_SECRET", hide_env_values = true)]
    api_secret: Option<String>,

    /// Conversion service base URL.
    #[arg(long, env = "DOCGRID_API_URL")]
    api_url: Option<String>,

    /// Ask the service to store the result and fetch it by URL.
    #[arg(long, env = "DOCGRID_STORE_FILE")]
    store_file: bool,

    /// Conversion request timeout in seconds.
    #[arg(long, env = "DOCGRID_UPLOAD_TIMEOUT", default_value_t = 120)]
    upload_timeout: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "DOCGRID_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Disable the progress spinner.
    #[arg(long, env = "DOCGRID_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCGRID_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCGRID_QUIET")]
    quiet: bool,
}

/// One parsed edit flag.
#[derive(Debug, Clone, PartialEq)]
enum Edit {
    Paragraph { index: usize, text: String },
    Cell { index: usize, row: usize, cell: usize, text: String },
    Remark { index: usize, text: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner replaces INFO logs unless --verbose asks for everything.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.from_html;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let edits = parse_edits(&cli)?;

    // ── Upload ───────────────────────────────────────────────────────────
    let mut session = Session::new();
    let ticket = session.begin_upload();

    let (html, document) = match load(&cli, show_progress).await {
        Ok(loaded) => loaded,
        Err(e) => {
            session.fail_upload(ticket, &format!("{e:#}"));
            return Err(e);
        }
    };

    if !session.complete_upload(ticket, document) {
        bail!("Upload was superseded");
    }
    let doc = session
        .document_mut()
        .context("No document installed after upload")?;

    // ── Edits ────────────────────────────────────────────────────────────
    for edit in &edits {
        apply_edit(doc, edit)?;
    }

    // ── Output ───────────────────────────────────────────────────────────
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if cli.json {
        let json = serde_json::to_string_pretty(&doc.snapshot())
            .context("Failed to serialise snapshot")?;
        writeln!(handle, "{json}").context("Failed to write to stdout")?;
    } else if cli.html {
        handle
            .write_all(html.as_bytes())
            .context("Failed to write to stdout")?;
        if !html.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    } else {
        handle
            .write_all(render_grid(doc).as_bytes())
            .context("Failed to write to stdout")?;
    }

    Ok(())
}

/// Produce the rendered HTML and the extraction for the selected input mode.
async fn load(cli: &Cli, show_progress: bool) -> Result<(String, ExtractedDocument)> {
    if cli.from_html {
        if cli.output.is_some() {
            bail!("--output needs a DOCX; HTML input has none");
        }
        let html = tokio::fs::read_to_string(&cli.input)
            .await
            .with_context(|| format!("Failed to read {}", cli.input))?;
        let document = extract_html(&html);
        return Ok((html, document));
    }

    if cli.from_docx {
        let bytes = tokio::fs::read(&cli.input)
            .await
            .with_context(|| format!("Failed to read {}", cli.input))?;
        if let Some(ref path) = cli.output {
            write_atomic(path, &bytes).await?;
        }
        let name = file_name_of(&cli.input);
        let (html, document) = extract_from_docx(&name, bytes)
            .await
            .context("Rendering failed")?;
        return Ok((html, document));
    }

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(cli, progress_cb)?;

    let output = convert(&cli.input, &config)
        .await
        .context("Conversion failed")?;

    if let Some(ref path) = cli.output {
        write_atomic(path, &output.converted).await?;
        if !cli.quiet {
            eprintln!(
                "{}  {} bytes  →  {}",
                green("✔"),
                output.stats.converted_bytes,
                bold(&path.display().to_string()),
            );
        }
    }
    if !cli.quiet && !show_progress {
        eprintln!(
            "Extracted {} paragraphs and {} tables in {}ms",
            output.stats.paragraph_count, output.stats.table_count, output.stats.total_duration_ms
        );
    }

    Ok((output.html, output.document))
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .store_file(cli.store_file)
        .upload_timeout_secs(cli.upload_timeout)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref secret) = cli.api_secret {
        builder = builder.api_secret(secret.clone());
    }
    if let Some(ref url) = cli.api_url {
        builder = builder.api_base_url(url.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn file_name_of(input: &str) -> String {
    std::path::Path::new(input)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.to_string())
}

// ── Edits ────────────────────────────────────────────────────────────────

fn parse_edits(cli: &Cli) -> Result<Vec<Edit>> {
    let mut edits = Vec::new();
    for raw in &cli.set_paragraph {
        let (index, text) = parse_indexed(raw)?;
        edits.push(Edit::Paragraph { index, text });
    }
    for raw in &cli.set_cell {
        edits.push(parse_cell(raw)?);
    }
    for raw in &cli.remark {
        let (index, text) = parse_indexed(raw)?;
        edits.push(Edit::Remark { index, text });
    }
    Ok(edits)
}

/// Parse `INDEX=TEXT`.
fn parse_indexed(raw: &str) -> Result<(usize, String)> {
    let (index, text) = raw
        .split_once('=')
        .with_context(|| format!("Expected INDEX=TEXT, got '{raw}'"))?;
    let index = index
        .trim()
        .parse()
        .with_context(|| format!("Invalid element index in '{raw}'"))?;
    Ok((index, text.to_string()))
}

/// Parse `ELEM,ROW,CELL=TEXT`.
fn parse_cell(raw: &str) -> Result<Edit> {
    let (coords, text) = raw
        .split_once('=')
        .with_context(|| format!("Expected ELEM,ROW,CELL=TEXT, got '{raw}'"))?;
    let parts = coords
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<usize>()
                .with_context(|| format!("Invalid coordinate '{}' in '{raw}'", p.trim()))
        })
        .collect::<Result<Vec<_>>>()?;

    match parts.as_slice() {
        [index, row, cell] => Ok(Edit::Cell {
            index: *index,
            row: *row,
            cell: *cell,
            text: text.to_string(),
        }),
        _ => bail!("Expected three coordinates ELEM,ROW,CELL in '{raw}'"),
    }
}

fn apply_edit(doc: &mut EditableDocument, edit: &Edit) -> Result<()> {
    match edit {
        Edit::Paragraph { index, text } => doc
            .set_paragraph_content(*index, text.as_str())
            .with_context(|| format!("--set-paragraph {index}")),
        Edit::Cell { index, row, cell, text } => doc
            .set_table_cell(*index, *row, *cell, text.as_str())
            .with_context(|| format!("--set-cell {index},{row},{cell}")),
        Edit::Remark { index, text } => doc
            .set_remark(*index, text.as_str())
            .with_context(|| format!("--remark {index}")),
    }
}

// ── Grid rendering ───────────────────────────────────────────────────────

fn render_grid(doc: &EditableDocument) -> String {
    let mut out = format!("{}\n", bold(doc.header()));
    if doc.is_empty() {
        out.push_str(&dim("(no elements)"));
        out.push('\n');
        return out;
    }

    for (index, element) in doc.elements().iter().enumerate() {
        let content = match &element.kind {
            ElementKind::Paragraph { content } => content.clone(),
            ElementKind::Table { rows } => rows
                .iter()
                .map(|r| r.join(" | "))
                .collect::<Vec<_>>()
                .join("; "),
        };
        let remark = doc.remark(index);
        out.push_str(&format!(
            "{:>3}  {:<16} {:<9} {}",
            element.position,
            element.id,
            element.type_name(),
            content
        ));
        if !remark.is_empty() {
            out.push_str(&format!("  {}", cyan(&format!("# {remark}"))));
        }
        out.push('\n');
    }
    out
}
