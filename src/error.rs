// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>
// Co-author: Cursor-AI.

use std::io;

use thiserror::Error;

/// Everything that can stop a report run or degrade part of it.
///
/// `Configuration`, `Argument`, `Parse` and `Io` are fatal. `Validation` drops a
/// single entry; `Network`, `Retryable` and `Resolution` degrade a single ticket.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("{0}")]
    Argument(String),
    #[error("malformed activity feed: {0}")]
    Parse(String),
    #[error("entry '{entry_id}' rejected: {reason}")]
    Validation { entry_id: String, reason: String },
    #[error("request failed: {0}")]
    Network(String),
    #[error("request timed out: {0}")]
    Retryable(String),
    #[error("cannot resolve fields for {ticket}: {reason}")]
    Resolution { ticket: String, reason: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// True for failures that may succeed if the same request is sent again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Retryable(_))
    }

    /// True when stdout was closed under us (e.g. piped into `head`).
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let url = e
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "(unknown url)".to_string());
        if e.is_timeout() {
            Error::Retryable(url)
        } else if let Some(status) = e.status() {
            Error::Network(format!("{} returned {}", url, status))
        } else {
            Error::Network(format!("{}: {}", url, e))
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
