// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - Garmin Connect client layer.

pub mod garmin;
pub mod session;
pub mod uploader;

pub use garmin::GarminClient;
pub use session::Session;
pub use uploader::{activity_url, ActivityUploader};
