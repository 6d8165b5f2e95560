// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types for Garmin Connect operations.

/// Error type shared by the session, the uploader and activity parsing.
#[derive(Debug, thiserror::Error)]
pub enum GarminError {
    #[error("Garmin Connect transport error: {0}")]
    Transport(String),

    #[error("Unexpected Garmin Connect response: {0}")]
    Parse(String),

    #[error("Invalid file extension: {0:?} (expected .tcx, .fit or .gpx)")]
    InvalidExtension(String),

    #[error("Rename rejected: requested {expected:?}, service returned {actual:?}")]
    RenameMismatch { expected: String, actual: String },

    #[error("Malformed activity data: {0}")]
    MalformedActivityData(String),

    #[error("Sign in rejected for user {0:?}")]
    SignInRejected(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GarminError {
    /// True for failures that come from talking to the service rather than
    /// from local input. These are the errors sign-in and upload absorb.
    pub fn is_remote(&self) -> bool {
        matches!(self, GarminError::Transport(_) | GarminError::Parse(_))
    }
}

impl From<reqwest::Error> for GarminError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GarminError::Parse(err.to_string())
        } else {
            GarminError::Transport(err.to_string())
        }
    }
}

/// Result type alias for Garmin operations
pub type Result<T> = std::result::Result<T, GarminError>;
