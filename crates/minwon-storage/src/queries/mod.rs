// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per record store.

pub mod complaints;
pub mod paused;
pub mod turns;

/// Converts a caller-supplied row limit to SQLite's integer type.
pub(crate) fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
