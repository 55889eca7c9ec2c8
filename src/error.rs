//! Error types shared by the search page.

use thiserror::Error;

use crate::config::FETCH_ERROR_FALLBACK;

/// Failure talking to the worker search backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Search request failed with status {status}")]
    Status { status: u16 },
    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

impl ApiError {
    /// Text shown to the user above the results.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(detail) if detail.trim().is_empty() => {
                FETCH_ERROR_FALLBACK.to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            ApiError::Status {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Failure reading or writing the persisted search history.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("browser storage is unavailable")]
    Unavailable,
    #[error("storage access failed: {0}")]
    Storage(String),
    #[error("stored history is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A history label that cannot be turned back into filters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryKeyError {
    #[error("malformed filter pair `{0}`")]
    MalformedPair(String),
    #[error("invalid filter field `{0}`")]
    InvalidField(String),
    #[error("bad escape sequence in `{0}`")]
    BadEscape(String),
}

/// Numeric filter input rejected before it reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("{field} must be a valid number")]
    NotANumber { field: String },
    #[error("{field} must be a whole number")]
    NotAWholeNumber { field: String },
    #[error("{field} must be at least {min}")]
    BelowMinimum { field: String, min: String },
    #[error("{field} cannot exceed {max}")]
    AboveMaximum { field: String, max: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_mention_the_code() {
        let err = ApiError::Status { status: 503 };
        assert_eq!(
            err.user_message(),
            "Search request failed with status 503"
        );
    }

    #[test]
    fn empty_network_message_falls_back() {
        let err = ApiError::Network(String::new());
        assert_eq!(err.user_message(), "An error occurred while fetching workers");
        assert_eq!(
            ApiError::Decode("missing field `id`".into()).user_message(),
            "Unexpected response from server: missing field `id`"
        );
    }

    #[test]
    fn filter_errors_read_like_form_hints() {
        let err = FilterError::AboveMaximum {
            field: "Minimum rating".into(),
            max: "5".into(),
        };
        assert_eq!(err.to_string(), "Minimum rating cannot exceed 5");
    }
}
