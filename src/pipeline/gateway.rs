//! Conversion gateway: hand the source file to a hosted conversion service.
//!
//! [`ConversionGateway`] is the seam between the pipeline and the remote
//! service. [`ConvertApiGateway`] implements it over HTTP; tests and embedders
//! can supply their own implementation through
//! [`crate::convert::convert_with`].
//!
//! The gateway call is the slowest stage by far and is never retried: a
//! failed conversion is reported to the caller, who may upload again.

use crate::config::ConversionConfig;
use crate::error::DocGridError;
use crate::pipeline::encode::{self, ConversionResult};
use crate::pipeline::input::{fetch_bytes, FetchError};
use futures::future::BoxFuture;
use std::time::Duration;
use tracing::{debug, info};

/// One file to convert.
#[derive(Debug, Clone, Copy)]
pub struct ConversionRequest<'a> {
    pub file_name: &'a str,
    pub bytes: &'a [u8],
    pub source_format: &'a str,
    pub target_format: &'a str,
}

/// A remote service that converts a document between formats.
pub trait ConversionGateway: Send + Sync {
    /// Submit a file for conversion.
    fn submit<'a>(
        &'a self,
        request: ConversionRequest<'a>,
    ) -> BoxFuture<'a, Result<ConversionResult, DocGridError>>;

    /// Download a converted file the gateway stored instead of inlining.
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, DocGridError>>;
}

/// [`ConversionGateway`] backed by the ConvertAPI REST service.
pub struct ConvertApiGateway {
    client: reqwest::Client,
    base_url: String,
    secret: String,
    store_file: bool,
    upload_timeout_secs: u64,
    download_timeout_secs: u64,
}

impl std::fmt::Debug for ConvertApiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConvertApiGateway")
            .field("base_url", &self.base_url)
            .field("store_file", &self.store_file)
            .finish_non_exhaustive()
    }
}

impl ConvertApiGateway {
    /// Build a gateway from the config, resolving the secret from the
    /// environment when the config has none.
    pub fn from_config(config: &ConversionConfig) -> Result<Self, DocGridError> {
        let secret = config
            .resolve_secret()
            .ok_or_else(|| DocGridError::GatewayNotConfigured {
                hint: format!(
                    "Set {} or pass --api-secret with your ConvertAPI secret.",
                    crate::config::API_SECRET_ENV
                ),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upload_timeout_secs))
            .build()
            .map_err(|e| DocGridError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            secret,
            store_file: config.store_file,
            upload_timeout_secs: config.upload_timeout_secs,
            download_timeout_secs: config.download_timeout_secs,
        })
    }

    /// Endpoint for a source → target conversion.
    pub fn endpoint(&self, source_format: &str, target_format: &str) -> String {
        convert_endpoint(&self.base_url, source_format, target_format)
    }

    async fn submit_inner(
        &self,
        request: ConversionRequest<'_>,
    ) -> Result<ConversionResult, DocGridError> {
        let url = self.endpoint(request.source_format, request.target_format);
        let body = encode::build_request(request.file_name, request.bytes, self.store_file);
        info!(
            "Submitting '{}' ({} bytes) for {} → {} conversion",
            request.file_name,
            request.bytes.len(),
            request.source_format,
            request.target_format
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        if !status.is_success() {
            let message = encode::error_message(&String::from_utf8_lossy(&bytes));
            return Err(status_error(request.file_name, status.as_u16(), message));
        }

        let result = encode::parse_response(&bytes)?;
        debug!(
            "Gateway returned '{}' (cost: {:?}, stored: {})",
            result.file_name,
            result.cost,
            matches!(result.payload, encode::ConvertedPayload::Stored(_))
        );
        Ok(result)
    }

    fn transport_error(&self, url: &str, e: reqwest::Error) -> DocGridError {
        if e.is_timeout() {
            DocGridError::GatewayTimeout {
                secs: self.upload_timeout_secs,
            }
        } else {
            DocGridError::GatewayUnreachable {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

impl ConversionGateway for ConvertApiGateway {
    fn submit<'a>(
        &'a self,
        request: ConversionRequest<'a>,
    ) -> BoxFuture<'a, Result<ConversionResult, DocGridError>> {
        Box::pin(self.submit_inner(request))
    }

    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, DocGridError>> {
        Box::pin(async move {
            fetch_bytes(url, self.download_timeout_secs)
                .await
                .map_err(|e| DocGridError::ConvertedFileFetchFailed {
                    url: url.to_string(),
                    reason: match e {
                        FetchError::Timeout => {
                            format!("timed out after {}s", self.download_timeout_secs)
                        }
                        FetchError::Failed(reason) => reason,
                    },
                })
        })
    }
}

/// `{base}/convert/{source}/to/{target}`
pub fn convert_endpoint(base_url: &str, source_format: &str, target_format: &str) -> String {
    format!(
        "{}/convert/{}/to/{}",
        base_url.trim_end_matches('/'),
        source_format,
        target_format
    )
}

/// Map a non-success HTTP status to the matching gateway error.
pub fn status_error(file_name: &str, status: u16, message: String) -> DocGridError {
    match status {
        401 | 403 => DocGridError::GatewayAuth {
            status,
            detail: message,
        },
        _ => DocGridError::GatewayRejected {
            file: file_name.to_string(),
            status,
            message,
        },
    }
}
