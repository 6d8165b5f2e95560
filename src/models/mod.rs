// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod upload;
pub mod user;

pub use activity::{Activity, Coordinates};
pub use upload::{FileKind, UploadOutcome};
pub use user::Identity;
