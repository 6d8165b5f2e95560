// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Upload file kinds and upload results.

use crate::error::{GarminError, Result};
use std::path::Path;

/// Activity file formats accepted by the upload service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Tcx,
    Fit,
    Gpx,
}

impl FileKind {
    /// Detect the kind from a path's extension, ignoring case.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "tcx" => Ok(FileKind::Tcx),
            "fit" => Ok(FileKind::Fit),
            "gpx" => Ok(FileKind::Gpx),
            _ => Err(GarminError::InvalidExtension(path.display().to_string())),
        }
    }

    /// Path segment appended to the upload endpoint.
    pub fn upload_segment(self) -> &'static str {
        match self {
            FileKind::Tcx => ".tcx",
            FileKind::Fit => ".fit",
            FileKind::Gpx => ".gpx",
        }
    }

    /// FIT is a binary format; TCX and GPX are XML text.
    pub fn is_binary(self) -> bool {
        matches!(self, FileKind::Fit)
    }

    pub fn mime_type(self) -> &'static str {
        if self.is_binary() {
            "application/octet-stream"
        } else {
            "application/xml"
        }
    }
}

/// Classified result of one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// New activity created
    Success { activity_id: u64 },
    /// The service already had this activity
    Duplicate { activity_id: u64 },
    /// Anything else, including transport and parse failures
    Failure { reason: String },
}

impl UploadOutcome {
    /// Activity id for success and duplicate outcomes.
    pub fn activity_id(&self) -> Option<u64> {
        match self {
            UploadOutcome::Success { activity_id } | UploadOutcome::Duplicate { activity_id } => {
                Some(*activity_id)
            }
            UploadOutcome::Failure { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, UploadOutcome::Failure { .. })
    }

    /// Short status label for logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            UploadOutcome::Success { .. } => "SUCCESS",
            UploadOutcome::Duplicate { .. } => "EXISTS",
            UploadOutcome::Failure { .. } => "FAIL",
        }
    }
}
