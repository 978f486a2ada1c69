// error.rs

use reqwest::StatusCode;
use thiserror::Error;

/// Shape problems found while turning a response into a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Malformed {
    /// The response body was empty or only whitespace.
    Empty,
    /// An HTML response without any table rows.
    NoTable,
    /// A header name that appears more than once.
    DuplicateColumn(String),
    /// A data row (1-based) whose cell count differs from the header.
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl std::fmt::Display for Malformed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Malformed::Empty => write!(f, "empty response"),
            Malformed::NoTable => write!(f, "no table found in HTML response"),
            Malformed::DuplicateColumn(name) => write!(f, "duplicate column '{}'", name),
            Malformed::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {} has {} fields, header has {}",
                row, found, expected
            ),
        }
    }
}

/// Coarse classification of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    ServerErrorPage,
    DataError,
    Malformed,
    InvalidRequest,
    Config,
    Output,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server returned {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },

    #[error("Response is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Server rendered an error page")]
    ServerErrorPage,

    #[error("Error status on data (line {line}), probably caused by a wrong tagname")]
    BadData { line: usize },

    #[error("Malformed response: {0}")]
    Malformed(Malformed),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Network(_) | Self::HttpStatus { .. } | Self::Utf8(_) => FailureKind::Transport,
            Self::ServerErrorPage => FailureKind::ServerErrorPage,
            Self::BadData { .. } => FailureKind::DataError,
            Self::Malformed(_) => FailureKind::Malformed,
            Self::InvalidUrl(_) | Self::InvalidRequest(_) => FailureKind::InvalidRequest,
            Self::Config(_) => FailureKind::Config,
            Self::Io(_) | Self::Json(_) | Self::Csv(_) => FailureKind::Output,
        }
    }

    /// Returns true if the request never produced a usable response body.
    pub fn is_transport(&self) -> bool {
        self.kind() == FailureKind::Transport
    }

    /// HTTP status of the failed response, when the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::Network(e) => e.status(),
            _ => None,
        }
    }

    pub(crate) fn malformed(kind: Malformed) -> Self {
        Self::Malformed(kind)
    }
}

/// Result type alias for historian calls
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_is_transport() {
        let err = Error::HttpStatus {
            status: StatusCode::NOT_FOUND,
            body: "not here".to_string(),
        };
        assert!(err.is_transport());
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.to_string(), "Server returned 404 Not Found: not here");
    }

    #[test]
    fn test_soft_failures_are_distinguishable() {
        assert_eq!(Error::ServerErrorPage.kind(), FailureKind::ServerErrorPage);
        assert_eq!(Error::BadData { line: 3 }.kind(), FailureKind::DataError);
        assert_eq!(
            Error::malformed(Malformed::Empty).kind(),
            FailureKind::Malformed
        );
        assert!(Error::BadData { line: 3 }.status().is_none());
    }

    #[test]
    fn test_ragged_row_message() {
        let err = Error::malformed(Malformed::RaggedRow {
            row: 4,
            expected: 3,
            found: 2,
        });
        assert_eq!(
            err.to_string(),
            "Malformed response: row 4 has 2 fields, header has 3"
        );
    }
}
