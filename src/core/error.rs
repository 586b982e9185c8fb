//! Error types for douyin-dl
//!
//! Transport and file-system failures surface here. Browser rendering problems
//! are not errors: they are reported as [`RenderOutcome`](crate::core::render::RenderOutcome)
//! values and absorbed by the extraction pipeline.

use std::fmt;

/// Main error type for douyin-dl operations
#[derive(Debug)]
pub enum Error {
    /// Connection failure or timeout while talking to a remote host
    NetworkError(String),

    /// Non-success HTTP status or other HTTP-level failure
    HttpError(String),

    /// File I/O error
    IoError(std::io::Error),

    /// Invalid parameters or share text
    InvalidInput(String),

    /// The extraction pipeline could not produce a media URL
    ExtractionFailed(String),

    /// The media stream was interrupted or unusable
    DownloadFailed(String),
}

impl Error {
    /// Whether this error came from the HTTP transport (fatal for extraction)
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::NetworkError(_) | Error::HttpError(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NetworkError(msg) => {
                write!(f, "Network error: {}", msg)
            }
            Error::HttpError(msg) => {
                write!(f, "HTTP error: {}", msg)
            }
            Error::IoError(err) => {
                write!(f, "I/O error: {}", err)
            }
            Error::InvalidInput(msg) => {
                write!(f, "Invalid input: {}", msg)
            }
            Error::ExtractionFailed(msg) => {
                write!(f, "Extraction failed: {}", msg)
            }
            Error::DownloadFailed(msg) => {
                write!(f, "Download failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Error::NetworkError(err.to_string())
        } else {
            Error::HttpError(err.to_string())
        }
    }
}

/// Convenience result type for douyin-dl operations
pub type Result<T> = std::result::Result<T, Error>;
