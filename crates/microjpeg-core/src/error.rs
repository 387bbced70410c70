//! Error types module
//!
//! `ApiError` is the normalized form of every non-2xx response returned by the
//! MicroJPEG API. It is built from the raw status and body so that plain-text or
//! HTML error pages are represented just as faithfully as structured ones.

use serde::{Deserialize, Deserializer};

/// Error code used when the service did not provide one.
pub const UNKNOWN_ERROR_CODE: &str = "unknown_error";

/// Message used when the service returned a structured body without one.
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

/// A non-2xx response from the API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{error_code}: {error_message} (Status: {status_code})")]
pub struct ApiError {
    pub status_code: u16,
    pub error_code: String,
    pub error_message: String,
}

/// Structured error body: `{"error": "...", "message": "..."}`.
///
/// Numeric and boolean fields are read as their JSON text.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default, deserialize_with = "scalar_as_string")]
    error: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    message: Option<String>,
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        serde_json::Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected a string, number or boolean, found {}",
            other
        ))),
    }
}

impl ApiError {
    pub fn new(
        status_code: u16,
        error_code: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            status_code,
            error_code: error_code.into(),
            error_message: error_message.into(),
        }
    }

    /// Normalize a failed response body into an `ApiError`.
    ///
    /// The body is first decoded as `{error, message}`. Missing fields fall back
    /// to `unknown_error` / `An error occurred`; an empty body or JSON `null`
    /// decodes to no fields at all. A body that is not JSON of that shape is kept
    /// verbatim as the message under `unknown_error`.
    pub fn from_response(status_code: u16, body: &[u8]) -> Self {
        match decode_error_body(body) {
            Some(parsed) => {
                let (error, message) = parsed
                    .map(|b| (b.error, b.message))
                    .unwrap_or((None, None));
                Self::new(
                    status_code,
                    error.unwrap_or_else(|| UNKNOWN_ERROR_CODE.to_string()),
                    message.unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
                )
            }
            None => Self::new(
                status_code,
                UNKNOWN_ERROR_CODE,
                String::from_utf8_lossy(body).into_owned(),
            ),
        }
    }

    /// Monthly quota exhausted or rate limited.
    pub fn is_limit_reached(&self) -> bool {
        self.status_code == 429 || self.error_code == "limit_reached"
    }

    /// Missing or invalid API key.
    pub fn is_unauthorized(&self) -> bool {
        self.status_code == 401 || self.error_code == "unauthorized"
    }

    pub fn is_file_too_large(&self) -> bool {
        self.status_code == 413 || self.error_code == "file_too_large"
    }

    /// The operation is not available on the account's tier.
    pub fn is_feature_restricted(&self) -> bool {
        self.status_code == 403 && self.error_code == "feature_restricted"
    }
}

/// Decode step of error normalization.
///
/// `None` means the body is not a structured error; `Some(None)` means the body
/// was empty or `null`.
fn decode_error_body(body: &[u8]) -> Option<Option<ErrorBody>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Some(None);
    }
    serde_json::from_slice::<Option<ErrorBody>>(body).ok()
}

/// Invalid or incomplete client configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing API key. Set MICROJPEG_API_KEY or API_KEY")]
    MissingApiKey,

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}
