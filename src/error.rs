use thiserror::Error;

/// Error taxonomy for counterpoint
#[derive(Error, Debug)]
pub enum CounterpointError {
    #[error("Validation error on {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request to completion provider failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Completion provider returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Unrecognized completion payload: {reason}")]
    Malformed {
        reason: String,
        /// Raw provider payload, kept for diagnostics
        raw: serde_json::Value,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CounterpointError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CounterpointError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_constructor_fills_both_fields() {
        let err = CounterpointError::validation("topic", "topic cannot be empty");
        match err {
            CounterpointError::Validation { field, reason } => {
                assert_eq!(field, "topic");
                assert_eq!(reason, "topic cannot be empty");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn display_includes_provider_status_and_body() {
        let err = CounterpointError::Api {
            status: 500,
            body: r#"{"error":"rate limited"}"#.to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("rate limited"));
    }

    #[test]
    fn serde_errors_convert_via_from() {
        let parse_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: CounterpointError = parse_err.into();
        assert!(matches!(err, CounterpointError::Serialization(_)));
    }
}
