//! Input resolution: load a user-supplied path or URL into memory.
//!
//! The gateway takes the file as a base64 payload, so unlike a path-based
//! pipeline there is nothing to gain from keeping the source on disk. URLs
//! are downloaded straight into a buffer. [`validate_pdf`] checks the `%PDF`
//! magic bytes so a mislabelled file fails here instead of costing a gateway
//! call.

use crate::error::DocGridError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use tracing::{debug, info};

/// Where the input bytes came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Local(PathBuf),
    Url(String),
    Memory,
}

/// Source bytes plus the file name used for the gateway upload.
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub source: InputSource,
}

impl ResolvedInput {
    /// Wrap bytes that are already in memory.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            source: InputSource::Memory,
        }
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to in-memory bytes.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, DocGridError> {
    if input.trim().is_empty() {
        return Err(DocGridError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(input).await
    }
}

async fn read_local(path_str: &str) -> Result<ResolvedInput, DocGridError> {
    let path = PathBuf::from(path_str);

    let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => DocGridError::PermissionDenied { path: path.clone() },
        _ => DocGridError::FileNotFound { path: path.clone() },
    })?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    debug!("Read local input {} ({} bytes)", path.display(), bytes.len());
    Ok(ResolvedInput {
        file_name,
        bytes,
        source: InputSource::Local(path),
    })
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, DocGridError> {
    info!("Downloading input from: {}", url);
    let bytes = fetch_bytes(url, timeout_secs).await.map_err(|e| match e {
        FetchError::Timeout => DocGridError::DownloadTimeout {
            url: url.to_string(),
            secs: timeout_secs,
        },
        FetchError::Failed(reason) => DocGridError::DownloadFailed {
            url: url.to_string(),
            reason,
        },
    })?;

    Ok(ResolvedInput {
        file_name: filename_from_url(url).unwrap_or_else(|| "downloaded.pdf".to_string()),
        bytes,
        source: InputSource::Url(url.to_string()),
    })
}

/// Failure of a plain GET, before it is mapped to a stage-specific error.
#[derive(Debug)]
pub(crate) enum FetchError {
    Timeout,
    Failed(String),
}

/// GET `url` into memory, treating any non-2xx status as a failure.
pub(crate) async fn fetch_bytes(url: &str, timeout_secs: u64) -> Result<Vec<u8>, FetchError> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| FetchError::Failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(FetchError::Failed(format!("HTTP {}", response.status())));
    }

    let bytes = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Failed(e.to_string())
        }
    })?;
    debug!("Fetched {} bytes from {}", bytes.len(), url);
    Ok(bytes.to_vec())
}

/// Last path segment of a URL when it looks like a file name.
pub fn filename_from_url(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    if !last.is_empty() && last.contains('.') {
        Some(last.to_string())
    } else {
        None
    }
}

/// Reject empty, oversized, or non-PDF input before it reaches the gateway.
pub fn validate_pdf(input: &ResolvedInput, max_bytes: u64) -> Result<(), DocGridError> {
    check_size(input, max_bytes)?;
    if input.bytes.len() < 4 || &input.bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        let n = input.bytes.len().min(4);
        magic[..n].copy_from_slice(&input.bytes[..n]);
        return Err(DocGridError::NotAPdf {
            name: input.file_name.clone(),
            magic,
        });
    }
    Ok(())
}

/// Reject empty or oversized input.
pub fn check_size(input: &ResolvedInput, max_bytes: u64) -> Result<(), DocGridError> {
    if input.is_empty() {
        return Err(DocGridError::EmptyInput {
            name: input.file_name.clone(),
        });
    }
    if input.len() > max_bytes {
        return Err(DocGridError::InputTooLarge {
            name: input.file_name.clone(),
            size: input.len(),
            limit: max_bytes,
        });
    }
    Ok(())
}

static RE_EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.[A-Za-z0-9]{1,5}$").unwrap());

/// Name of the converted file: the source name with its extension swapped.
///
/// `report.pdf` → `report.docx`; a name without an extension gains one.
pub fn converted_file_name(source_name: &str, target_format: &str) -> String {
    let stem = RE_EXTENSION.replace(source_name, "");
    let stem = if stem.is_empty() { "converted" } else { &*stem };
    format!("{stem}.{target_format}")
}
