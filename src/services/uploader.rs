// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity upload, rename and listing on top of a [`Session`].

use crate::error::{GarminError, Result};
use crate::models::{Activity, FileKind, UploadOutcome};
use crate::services::garmin::{ACTIVITY_PATH, RENAME_PATH, SEARCH_PATH, UPLOAD_PATH};
use crate::services::Session;
use reqwest::blocking::multipart;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Activities requested per search page.
pub const SEARCH_PAGE_SIZE: u32 = 50;

/// Performs activity operations through a session's HTTP channel.
pub struct ActivityUploader<'a> {
    session: &'a Session,
}

impl<'a> ActivityUploader<'a> {
    pub fn new(session: &'a Session) -> Self {
        if !session.is_authenticated() {
            tracing::debug!("Activity uploader created for a session that is not signed in");
        }
        Self { session }
    }

    /// Upload one activity file and classify the result.
    ///
    /// Only local problems are errors: an unsupported extension or an
    /// unreadable file. Anything that goes wrong on the wire is reported as
    /// [`UploadOutcome::Failure`].
    pub fn upload_file(&self, path: impl AsRef<Path>) -> Result<UploadOutcome> {
        let path = path.as_ref();
        let kind = FileKind::from_path(path)?;

        // Sent byte for byte; XML files may declare a non-UTF-8 encoding.
        let content = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        tracing::info!(path = %path.display(), bytes = content.len(), "Uploading activity file");

        let outcome = match self.send_upload(kind, file_name, content) {
            Ok(result) => result.classify(self.session.config().duplicate_code),
            Err(e) => UploadOutcome::Failure {
                reason: e.to_string(),
            },
        };

        match &outcome {
            UploadOutcome::Success { activity_id } => {
                tracing::info!(activity_id, path = %path.display(), "Upload succeeded")
            }
            UploadOutcome::Duplicate { activity_id } => {
                tracing::info!(activity_id, path = %path.display(), "Activity already exists")
            }
            UploadOutcome::Failure { reason } => {
                tracing::warn!(reason = %reason, path = %path.display(), "Upload failed")
            }
        }

        Ok(outcome)
    }

    fn send_upload(
        &self,
        kind: FileKind,
        file_name: String,
        content: Vec<u8>,
    ) -> Result<DetailedImportResult> {
        let part = multipart::Part::bytes(content)
            .file_name(file_name)
            .mime_str(kind.mime_type())?;
        let form = multipart::Form::new()
            .text("responseContentType", "text/html")
            .part("data", part);

        let path = format!("{}{}", UPLOAD_PATH, kind.upload_segment());
        let response: UploadResponse = self.session.client().post_multipart_json(&path, form)?;
        Ok(response.detailed_import_result)
    }

    /// Upload a TCX file and return the new activity id.
    ///
    /// Duplicates and failures are errors here.
    pub fn upload_tcx(&self, path: impl AsRef<Path>) -> Result<u64> {
        let path = path.as_ref();
        if FileKind::from_path(path)? != FileKind::Tcx {
            return Err(GarminError::InvalidExtension(path.display().to_string()));
        }

        match self.upload_file(path)? {
            UploadOutcome::Success { activity_id } => Ok(activity_id),
            UploadOutcome::Duplicate { activity_id } => Err(GarminError::UploadFailed(format!(
                "activity already exists as {}",
                activity_id
            ))),
            UploadOutcome::Failure { reason } => Err(GarminError::UploadFailed(reason)),
        }
    }

    /// Rename an activity and confirm the service kept the new name.
    pub fn rename_activity(&self, activity_id: u64, new_name: &str) -> Result<()> {
        let path = format!("{}{}", RENAME_PATH, activity_id);
        let response: RenameResponse = self
            .session
            .client()
            .post_form_json(&path, &[("value", new_name)])?;

        if response.display.value != new_name {
            return Err(GarminError::RenameMismatch {
                expected: new_name.to_string(),
                actual: response.display.value,
            });
        }

        tracing::info!(activity_id, name = %new_name, "Activity renamed");
        Ok(())
    }

    /// Fetch one activity by id.
    pub fn get_activity(&self, activity_id: u64) -> Result<Activity> {
        let path = format!("{}{}", ACTIVITY_PATH, activity_id);
        let response: ActivityEnvelope = self.session.client().get_json(&path, &[])?;
        Activity::from_json(&response.activity)
    }

    /// Page through the activity search until an empty page comes back.
    pub fn list_activities(&self) -> Result<Vec<Activity>> {
        let config = self.session.config();
        let mut activities = Vec::new();

        for page in 0..config.max_pages {
            let start = u64::from(page) * u64::from(SEARCH_PAGE_SIZE);
            let response: SearchResponse = self.session.client().get_json(
                SEARCH_PATH,
                &[
                    ("limit", SEARCH_PAGE_SIZE.to_string()),
                    ("start", start.to_string()),
                ],
            )?;

            let batch = response.results.activities;
            tracing::debug!(page, start, count = batch.len(), "Fetched activity page");
            if batch.is_empty() {
                return Ok(activities);
            }

            for envelope in &batch {
                activities.push(Activity::from_json(&envelope.activity)?);
            }
        }

        tracing::warn!(
            max_pages = config.max_pages,
            count = activities.len(),
            "Stopped listing activities at the page limit"
        );
        Ok(activities)
    }

    /// Public web page for an activity.
    pub fn activity_url(&self, activity_id: u64) -> String {
        activity_url(self.session.client().base_url(), activity_id)
    }
}

/// Public web page for an activity on the given host.
pub fn activity_url(base_url: &str, activity_id: u64) -> String {
    format!("{}/activity/{}", base_url.trim_end_matches('/'), activity_id)
}

// ─── Wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    detailed_import_result: DetailedImportResult,
}

#[derive(Debug, Deserialize)]
struct DetailedImportResult {
    #[serde(default)]
    successes: Vec<ImportEntry>,
    #[serde(default)]
    failures: Vec<ImportEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportEntry {
    internal_id: Option<u64>,
    #[serde(default)]
    messages: Option<Vec<ImportMessage>>,
}

#[derive(Debug, Deserialize)]
struct ImportMessage {
    code: Option<i64>,
    #[serde(default)]
    content: Option<String>,
}

impl DetailedImportResult {
    fn classify(&self, duplicate_code: i64) -> UploadOutcome {
        if let Some(activity_id) = self.successes.first().and_then(|s| s.internal_id) {
            return UploadOutcome::Success { activity_id };
        }

        let Some(failure) = self.failures.first() else {
            return UploadOutcome::Failure {
                reason: "service reported neither success nor failure".to_string(),
            };
        };

        let message = failure.messages.as_deref().and_then(|m| m.first());
        let code = message.and_then(|m| m.code);
        match (failure.internal_id, code) {
            (Some(activity_id), Some(code)) if code == duplicate_code => {
                UploadOutcome::Duplicate { activity_id }
            }
            _ => UploadOutcome::Failure {
                reason: match (code, message.and_then(|m| m.content.as_deref())) {
                    (Some(code), Some(content)) => format!("code {}: {}", code, content),
                    (Some(code), None) => format!("code {}", code),
                    _ => "unrecognized failure".to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct RenameResponse {
    display: RenameDisplay,
}

#[derive(Debug, Deserialize)]
struct RenameDisplay {
    value: String,
}

#[derive(Debug, Deserialize)]
struct ActivityEnvelope {
    activity: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: SearchResults,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default)]
    activities: Vec<ActivityEnvelope>,
}
