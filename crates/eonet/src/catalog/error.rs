//! Error types for EONET API operations.

use thiserror::Error;

/// Errors that can occur when talking to the EONET API.
#[derive(Debug, Error)]
pub enum EonetError {
    /// The base URL or an endpoint could not be turned into a URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A query value could not be rendered as a string.
    #[error("Invalid query parameter {name}: {value}")]
    InvalidParameter { name: String, value: String },

    /// Response body was not decodable into the expected shape.
    #[error("Invalid JSON from {0}")]
    InvalidJson(String),

    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(String),

    /// API returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Errors produced while validating a single raw record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The record is not a JSON object.
    #[error("record is not an object")]
    NotAnObject,

    /// A required field is absent or null.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A field is present but has the wrong type or format.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ParseError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Get a short error message suitable for display.
pub fn short_error_message(err: &EonetError) -> String {
    match err {
        EonetError::InvalidUrl(url) => format!("Invalid URL: {}", url),
        EonetError::InvalidParameter { name, .. } => format!("Invalid parameter: {}", name),
        EonetError::InvalidJson(_) => "JSON parse error".to_string(),
        EonetError::Http(_) => "Network error".to_string(),
        EonetError::Api { status, message } => {
            if message.len() > 50 {
                let truncated: String = message.chars().take(47).collect();
                format!("HTTP {}: {}...", status, truncated)
            } else {
                format!("HTTP {}: {}", status, message)
            }
        }
        EonetError::Config(msg) => format!("Config: {}", msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EonetError::InvalidParameter {
            name: "days".to_string(),
            value: "[1,2]".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid query parameter days: [1,2]");

        let err = EonetError::InvalidJson("/categories".to_string());
        assert!(err.to_string().contains("/categories"));
    }

    #[test]
    fn test_short_error_message() {
        let err = EonetError::Http("connection reset by peer".to_string());
        assert_eq!(short_error_message(&err), "Network error");

        let err = EonetError::Api {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(short_error_message(&err), "HTTP 503: unavailable");
    }

    #[test]
    fn test_short_error_message_truncates_long_api_messages() {
        let err = EonetError::Api {
            status: 500,
            message: "é".repeat(80),
        };
        let msg = short_error_message(&err);
        assert!(msg.starts_with("HTTP 500: "));
        assert!(msg.ends_with("..."));
        assert_eq!(msg.chars().count(), "HTTP 500: ".len() + 47 + 3);
    }

    #[test]
    fn test_parse_error_display() {
        assert_eq!(
            ParseError::MissingField("id").to_string(),
            "missing required field `id`"
        );
        assert_eq!(
            ParseError::invalid("date", "not RFC 3339").to_string(),
            "invalid field `date`: not RFC 3339"
        );
    }
}
