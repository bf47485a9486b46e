//! Response encoder.
//!
//! Maps every [`ReturnValue`] to a body, a content type and extra headers.
//! The mapping is total and depends only on the value.

use std::collections::BTreeMap;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use serde_json::Value;

use super::sniff::sniff_mime;
use super::value::{integral, DisplayNumber, ReturnValue};

/// Strings starting with this are served as SVG
pub const SVG_PREAMBLE: &str = r#"<svg xmlns:svg="http://www.w3.org/2000/svg""#;

pub const TEXT_PLAIN: &str = "text/plain";
pub const SVG: &str = "image/svg+xml";
pub const JSON: &str = "application/json";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Encoded body with its content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedResponse {
    pub body: Vec<u8>,
    pub content_type: String,
    /// Length of a binary body; set only for binary values
    pub content_length: Option<usize>,
}

impl EncodedResponse {
    /// Replace the declared content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Header map as reported in batch results
    pub fn headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), self.content_type.clone());
        if let Some(len) = self.content_length {
            headers.insert("Content-Length".to_string(), len.to_string());
        }
        headers
    }
}

/// Encode a return value
pub fn encode(value: &ReturnValue) -> EncodedResponse {
    match value {
        ReturnValue::String(s) if s.starts_with(SVG_PREAMBLE) => text(s.clone(), SVG),
        ReturnValue::String(s) => text(s.clone(), TEXT_PLAIN),
        ReturnValue::Number(n) => text(DisplayNumber(n).to_string(), TEXT_PLAIN),
        ReturnValue::Sequence(items) => text(Value::from(items.clone()).to_string(), JSON),
        ReturnValue::Binary(bytes) => EncodedResponse {
            body: bytes.clone(),
            content_type: sniff_mime(bytes).unwrap_or(OCTET_STREAM).to_string(),
            content_length: Some(bytes.len()),
        },
        ReturnValue::Other(other) => EncodedResponse {
            body: other.to_string().into_bytes(),
            content_type: OCTET_STREAM.to_string(),
            content_length: None,
        },
    }
}

fn text(body: String, content_type: &str) -> EncodedResponse {
    EncodedResponse {
        body: body.into_bytes(),
        content_type: content_type.to_string(),
        content_length: None,
    }
}

impl IntoResponse for EncodedResponse {
    fn into_response(self) -> Response {
        let content_type = HeaderValue::from_str(&self.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(OCTET_STREAM));

        let mut response = (StatusCode::OK, self.body).into_response();
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, content_type);
        if let Some(len) = self.content_length {
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
        }
        response
    }
}

/// One completed task in all-results batch mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub out: Value,

    #[serde(rename = "type")]
    pub kind: String,

    pub headers: BTreeMap<String, String>,

    /// Whether the engine served a memoized receipt
    pub replayed: bool,
}

impl RunResult {
    /// Encode one receipt output.
    ///
    /// Sequences are reported as their JSON text and binary values as
    /// standard base64.
    pub fn new(value: &ReturnValue, replayed: bool) -> Self {
        let encoded = encode(value);
        let out = match value {
            ReturnValue::String(s) => Value::String(s.clone()),
            ReturnValue::Number(n) => Value::Number(integral(n)),
            ReturnValue::Sequence(_) => {
                Value::String(String::from_utf8_lossy(&encoded.body).into_owned())
            }
            ReturnValue::Binary(bytes) => Value::String(STANDARD.encode(bytes)),
            ReturnValue::Other(other) => other.clone(),
        };

        Self {
            out,
            kind: value.kind().to_string(),
            headers: encoded.headers(),
            replayed,
        }
    }
}
