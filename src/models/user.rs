// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Signed-in account identity.

/// Account details returned by a successful sign in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Garmin Connect numeric user ID (always positive)
    pub user_id: u64,
    /// Garmin Connect user name
    pub user_name: String,
}
