//! Configuration types for the upload → convert → extract pipeline.
//!
//! All pipeline behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Only the gateway and input stages have
//! knobs; rendering and extraction are deterministic.

use crate::error::DocGridError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Default root of the hosted conversion API.
pub const DEFAULT_API_BASE_URL: &str = "https://v2.convertapi.com";

/// Environment variable consulted when no secret is configured explicitly.
pub const API_SECRET_ENV: &str = "CONVERTAPI_SECRET";

/// Configuration for one conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use docgrid::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .api_secret("secret_123")
///     .upload_timeout_secs(60)
///     .build()
///     .unwrap();
/// assert_eq!(config.target_format, "docx");
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Root URL of the conversion gateway. Default: [`DEFAULT_API_BASE_URL`].
    pub api_base_url: String,

    /// Bearer secret for the gateway. If None, read from `CONVERTAPI_SECRET`.
    pub api_secret: Option<String>,

    /// Format of the uploaded file. Default: `pdf`.
    pub source_format: String,

    /// Format requested from the gateway. Default: `docx`.
    pub target_format: String,

    /// Ask the gateway to store the result and hand back a download URL
    /// instead of inlining the bytes. Default: false.
    ///
    /// With `true` the pipeline makes a second request to fetch the file.
    pub store_file: bool,

    /// Timeout for the gateway conversion call, in seconds. Default: 120.
    ///
    /// Hosted conversion of a large scanned PDF routinely takes tens of
    /// seconds; the timeout covers upload, conversion and response.
    pub upload_timeout_secs: u64,

    /// Timeout for URL inputs and converted-file downloads, in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Largest input accepted for upload, in bytes. Default: 50 MiB.
    pub max_input_bytes: u64,

    /// Optional stage progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_secret: None,
            source_format: "pdf".to_string(),
            target_format: "docx".to_string(),
            store_file: false,
            upload_timeout_secs: 120,
            download_timeout_secs: 120,
            max_input_bytes: 50 * 1024 * 1024,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .field("source_format", &self.source_format)
            .field("target_format", &self.target_format)
            .field("store_file", &self.store_file)
            .field("upload_timeout_secs", &self.upload_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("max_input_bytes", &self.max_input_bytes)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The configured secret, falling back to `CONVERTAPI_SECRET`.
    ///
    /// Empty strings count as unset.
    pub fn resolve_secret(&self) -> Option<String> {
        let non_blank = |s: &String| !s.trim().is_empty();
        self.api_secret
            .clone()
            .filter(non_blank)
            .or_else(|| std::env::var(API_SECRET_ENV).ok().filter(non_blank))
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.api_secret = Some(secret.into());
        self
    }

    pub fn source_format(mut self, format: impl Into<String>) -> Self {
        self.config.source_format = format.into().to_lowercase();
        self
    }

    pub fn target_format(mut self, format: impl Into<String>) -> Self {
        self.config.target_format = format.into().to_lowercase();
        self
    }

    pub fn store_file(mut self, v: bool) -> Self {
        self.config.store_file = v;
        self
    }

    pub fn upload_timeout_secs(mut self, secs: u64) -> Self {
        self.config.upload_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn max_input_bytes(mut self, bytes: u64) -> Self {
        self.config.max_input_bytes = bytes;
        self
    }

    /// Attach a progress callback to receive stage events.
    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, DocGridError> {
        let c = &self.config;
        if !(c.api_base_url.starts_with("http://") || c.api_base_url.starts_with("https://")) {
            return Err(DocGridError::InvalidConfig(format!(
                "API base URL must be http(s), got '{}'",
                c.api_base_url
            )));
        }
        if c.source_format.trim().is_empty() || c.target_format.trim().is_empty() {
            return Err(DocGridError::InvalidConfig(
                "Source and target formats must not be empty".into(),
            ));
        }
        if c.upload_timeout_secs == 0 || c.download_timeout_secs == 0 {
            return Err(DocGridError::InvalidConfig("Timeouts must be ≥ 1s".into()));
        }
        if c.max_input_bytes == 0 {
            return Err(DocGridError::InvalidConfig(
                "Upload size limit must be ≥ 1 byte".into(),
            ));
        }
        Ok(self.config)
    }
}
