// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Garmin Uploader: send TCX, FIT and GPX activity files to Garmin Connect.
//!
//! This crate signs in to Garmin Connect with the web login form, uploads
//! activity files, renames the resulting activities and lists the account's
//! activity history.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

pub use config::Config;
pub use error::{GarminError, Result};
pub use models::{Activity, Coordinates, FileKind, Identity, UploadOutcome};
pub use services::{ActivityUploader, Session};
