use std::path::PathBuf;

use reqwest::StatusCode;
use strum::Display;
use thiserror::Error;

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Everything that can go wrong while turning a chat command into images.
///
/// None of these are fatal for the host: every variant ends up as a text reply.
#[derive(Debug, Error)]
pub enum DrawError {
    #[error("no image description given")]
    EmptyPrompt,

    #[error("failed to load config from {}: {message}", path.display())]
    ConfigLoad { path: PathBuf, message: String },

    #[error("API request failed (status code: {status}): {body}")]
    HttpStatus { status: StatusCode, body: String },

    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned an unexpected format, no image data found")]
    UnexpectedFormat,

    #[error("API returned a body that is not JSON (unexpected format): {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("failed to save image: {0}")]
    ImagePersist(String),
}

#[derive(Debug, Clone, Copy, Display, PartialEq, Eq)]
pub enum ErrorKind {
    EmptyPrompt,
    ConfigLoad,
    Network,
    UnexpectedResponseShape,
    ImagePersist,
}

impl DrawError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DrawError::EmptyPrompt => ErrorKind::EmptyPrompt,
            DrawError::ConfigLoad { .. } => ErrorKind::ConfigLoad,
            DrawError::HttpStatus { .. } | DrawError::Transport(_) => ErrorKind::Network,
            DrawError::UnexpectedFormat | DrawError::MalformedBody(_) => {
                ErrorKind::UnexpectedResponseShape
            }
            DrawError::ImagePersist(_) => ErrorKind::ImagePersist,
        }
    }

    pub(crate) fn config_load(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Keeps only the start of the body, backends like to answer with whole HTML pages.
    pub(crate) fn http_status(status: StatusCode, body: &str) -> Self {
        let full = body.trim();
        let mut body: String = full.chars().take(MAX_ERROR_BODY_CHARS).collect();
        if body.len() < full.len() {
            body.push_str("...");
        }
        Self::HttpStatus { status, body }
    }

    pub(crate) fn persist(path: &std::path::Path, message: impl std::fmt::Display) -> Self {
        Self::ImagePersist(format!("{}: {message}", path.display()))
    }
}
