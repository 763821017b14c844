//! Gateway wire format: request body construction and response decoding.
//!
//! The hosted API takes files as base64 inside a JSON parameter list and
//! answers with a list of result files, each either inlined (`FileData`) or
//! stored server-side (`Url`). Everything here is pure so the wire format is
//! testable without a network.

use crate::error::DocGridError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConvertRequest {
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_value: Option<FileValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileValue {
    pub name: String,
    pub data: String,
}

/// Successful response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConvertResponse {
    #[serde(default)]
    pub conversion_cost: Option<u64>,
    #[serde(default)]
    pub files: Vec<ResponseFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseFile {
    pub file_name: String,
    #[serde(default)]
    pub file_ext: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub file_data: Option<String>,
}

/// Error response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorResponse {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

/// Where the converted file can be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertedPayload {
    /// The gateway inlined the file.
    Inline(Vec<u8>),
    /// The gateway stored the file; it must be fetched from this URL.
    Stored(String),
}

/// The first result file of a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub file_name: String,
    pub payload: ConvertedPayload,
    pub cost: Option<u64>,
}

/// Build the JSON body for uploading `bytes` as `file_name`.
pub fn build_request(file_name: &str, bytes: &[u8], store_file: bool) -> ConvertRequest {
    ConvertRequest {
        parameters: vec![
            Parameter {
                name: "File".to_string(),
                file_value: Some(FileValue {
                    name: file_name.to_string(),
                    data: STANDARD.encode(bytes),
                }),
                value: None,
            },
            Parameter {
                name: "StoreFile".to_string(),
                file_value: None,
                value: Some(serde_json::Value::Bool(store_file)),
            },
        ],
    }
}

/// Decode a success body into the first usable result file.
pub fn parse_response(body: &[u8]) -> Result<ConversionResult, DocGridError> {
    let response: ConvertResponse =
        serde_json::from_slice(body).map_err(|e| DocGridError::GatewayEmptyResult {
            detail: format!("unreadable response body: {e}"),
        })?;

    let cost = response.conversion_cost;
    let file = response
        .files
        .into_iter()
        .next()
        .ok_or_else(|| DocGridError::GatewayEmptyResult {
            detail: "response listed no files".to_string(),
        })?;

    let payload = match (file.file_data, file.url) {
        (Some(data), _) => {
            let bytes = STANDARD
                .decode(data.trim())
                .map_err(|e| DocGridError::GatewayEmptyResult {
                    detail: format!("'{}' has invalid base64 data: {e}", file.file_name),
                })?;
            ConvertedPayload::Inline(bytes)
        }
        (None, Some(url)) => ConvertedPayload::Stored(url),
        (None, None) => {
            return Err(DocGridError::GatewayEmptyResult {
                detail: format!("'{}' has neither data nor a URL", file.file_name),
            })
        }
    };

    Ok(ConversionResult {
        file_name: file.file_name,
        payload,
        cost,
    })
}

/// Human-readable message from an error body, falling back to the raw text.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            message: Some(message),
            code,
        }) => match code {
            Some(code) => format!("{message} (code {code})"),
            None => message,
        },
        _ => {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no response body".to_string()
            } else if trimmed.len() > 200 {
                let cut = (0..=200).rev().find(|&i| trimmed.is_char_boundary(i)).unwrap_or(0);
                format!("{}\u{2026}", &trimmed[..cut])
            } else {
                trimmed.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(build_request("a.pdf", b"%PDF", true)).unwrap();
        let params = body["Parameters"].as_array().unwrap();
        assert_eq!(params[0]["Name"], "File");
        assert_eq!(params[0]["FileValue"]["Name"], "a.pdf");
        assert_eq!(params[0]["FileValue"]["Data"], "JVBERg==");
        assert!(params[0].get("Value").is_none());
        assert_eq!(params[1]["Name"], "StoreFile");
        assert_eq!(params[1]["Value"], true);
        assert!(params[1].get("FileValue").is_none());
    }

    #[test]
    fn parse_inline_file() {
        let body = br#"{"ConversionCost":1,"Files":[{"FileName":"a.docx","FileExt":"docx","FileSize":4,"FileData":"UEsDBA=="}]}"#;
        let result = parse_response(body).unwrap();
        assert_eq!(result.file_name, "a.docx");
        assert_eq!(result.cost, Some(1));
        assert_eq!(result.payload, ConvertedPayload::Inline(b"PK\x03\x04".to_vec()));
    }

    #[test]
    fn parse_stored_file() {
        let body = br#"{"Files":[{"FileName":"a.docx","Url":"https://v2.convertapi.com/d/abc/a.docx"}]}"#;
        let result = parse_response(body).unwrap();
        assert_eq!(
            result.payload,
            ConvertedPayload::Stored("https://v2.convertapi.com/d/abc/a.docx".into())
        );
    }

    #[test]
    fn parse_rejects_empty_and_garbage() {
        assert!(matches!(
            parse_response(br#"{"Files":[]}"#),
            Err(DocGridError::GatewayEmptyResult { .. })
        ));
        assert!(matches!(
            parse_response(br#"{"Files":[{"FileName":"a.docx"}]}"#),
            Err(DocGridError::GatewayEmptyResult { .. })
        ));
        assert!(matches!(
            parse_response(b"<html>bad gateway</html>"),
            Err(DocGridError::GatewayEmptyResult { .. })
        ));
        assert!(matches!(
            parse_response(br#"{"Files":[{"FileName":"a.docx","FileData":"***"}]}"#),
            Err(DocGridError::GatewayEmptyResult { .. })
        ));
    }

    #[test]
    fn error_message_prefers_json_message() {
        assert_eq!(
            error_message(r#"{"Code":4000,"Message":"Parameter validation error."}"#),
            "Parameter validation error. (code 4000)"
        );
        assert_eq!(error_message(r#"{"Message":"Nope"}"#), "Nope");
        assert_eq!(error_message("  plain text  "), "plain text");
        assert_eq!(error_message(""), "no response body");
        assert!(error_message(&"x".repeat(500)).ends_with('\u{2026}'));
    }
}
