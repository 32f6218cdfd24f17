//! Error types for the library layer.

use std::fmt;

/// Errors produced by the library layer.
///
/// Upstream API errors are classified on the way in: anything worth retrying
/// (transport failures, throttling, server errors) becomes
/// `UpstreamUnavailable`, while rejected or unparseable responses become
/// `UpstreamFormat` carrying the provider's message.
#[derive(Debug)]
pub enum KeywordScoutError {
    /// Required credential fields were not supplied by any layer.
    CredentialsMissing(Vec<&'static str>),
    /// The upstream response did not have the expected shape.
    UpstreamFormat(String),
    /// The upstream could not be reached or kept failing.
    UpstreamUnavailable(String),
    /// A configuration file could not be read or parsed.
    Config(String),
    /// Writing the tabular export failed.
    Export(String),
    /// User-provided input failed validation.
    InvalidInput(String),
    /// JSON serialization or deserialization failed.
    Serialization(serde_json::Error),
}

impl fmt::Display for KeywordScoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CredentialsMissing(fields) => {
                write!(f, "Missing credentials: {}", fields.join(", "))
            }
            Self::UpstreamFormat(msg) => write!(f, "Unexpected upstream response: {}", msg),
            Self::UpstreamUnavailable(msg) => write!(f, "Upstream unavailable: {}", msg),
            Self::Config(msg) => write!(f, "Config error: {}", msg),
            Self::Export(msg) => write!(f, "Export error: {}", msg),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for KeywordScoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<searchad_api::Error> for KeywordScoutError {
    fn from(e: searchad_api::Error) -> Self {
        use searchad_api::Error as ApiError;

        if e.is_transient() {
            return Self::UpstreamUnavailable(e.to_string());
        }
        match e {
            ApiError::HttpStatus { status, body } => Self::UpstreamFormat(format!(
                "HTTP {}: {}",
                status,
                provider_message(&body).unwrap_or(body)
            )),
            ApiError::InvalidResponse(msg) => Self::UpstreamFormat(msg),
            ApiError::InvalidUrl(msg) => Self::Config(msg),
            ApiError::Signature(msg) => Self::InvalidInput(msg),
            ApiError::RequestFailed => Self::UpstreamUnavailable(e.to_string()),
        }
    }
}

impl From<crate::scrape::ScrapeError> for KeywordScoutError {
    fn from(e: crate::scrape::ScrapeError) -> Self {
        Self::UpstreamUnavailable(format!("result page fetch failed: {}", e))
    }
}

impl From<serde_json::Error> for KeywordScoutError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}

/// Pulls the `message` field out of a JSON error body, if there is one.
pub(crate) fn provider_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(|m| m.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_api_errors_are_unavailable() {
        let err: KeywordScoutError = searchad_api::Error::RequestFailed.into();
        assert!(matches!(err, KeywordScoutError::UpstreamUnavailable(_)));

        let err: KeywordScoutError = searchad_api::Error::HttpStatus {
            status: 502,
            body: "Bad Gateway".into(),
        }
        .into();
        assert!(matches!(err, KeywordScoutError::UpstreamUnavailable(_)));
    }

    #[test]
    fn rejected_call_carries_provider_message() {
        let err: KeywordScoutError = searchad_api::Error::HttpStatus {
            status: 403,
            body: r#"{"title":"Forbidden","message":"Invalid customer id"}"#.into(),
        }
        .into();
        match err {
            KeywordScoutError::UpstreamFormat(msg) => {
                assert_eq!(msg, "HTTP 403: Invalid customer id");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn non_json_error_body_is_kept() {
        let err: KeywordScoutError = searchad_api::Error::HttpStatus {
            status: 400,
            body: "bad request".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Unexpected upstream response: HTTP 400: bad request");
    }

    #[test]
    fn invalid_url_is_config_error() {
        let err: KeywordScoutError =
            searchad_api::Error::InvalidUrl("not a url/keywordstool".into()).into();
        assert!(matches!(err, KeywordScoutError::Config(_)));
    }

    #[test]
    fn credentials_missing_lists_fields() {
        let err = KeywordScoutError::CredentialsMissing(vec!["ad.api_key", "ad.customer_id"]);
        assert_eq!(err.to_string(), "Missing credentials: ad.api_key, ad.customer_id");
    }
}
