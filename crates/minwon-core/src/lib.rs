// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Minwon chat relay.
//!
//! This crate provides the adapter traits, error type, and domain types
//! shared by every other crate in the workspace. Storage, completion, and
//! callback delivery are all reached through the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MinwonError;
pub use types::{
    AdapterType, ComplaintLogEntry, ComplaintStatus, ConversationTurn, HealthStatus,
    InboundMessage, OutboundReply, PausedSender, ProviderMessage, ProviderRequest,
    ProviderResponse, TokenUsage, UserState,
};

pub use traits::{DeliveryAdapter, PluginAdapter, ProviderAdapter, StorageAdapter};

/// Current UTC time as an RFC 3339 string, the timestamp format used in
/// every persisted record.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
