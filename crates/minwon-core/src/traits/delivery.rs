// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery adapter trait for pushing deferred replies back to the platform.

use async_trait::async_trait;

use crate::error::MinwonError;
use crate::traits::adapter::PluginAdapter;
use crate::types::OutboundReply;

/// Adapter that delivers a reply to a one-time callback address.
///
/// Delivery is attempted once; retries are not part of the contract.
#[async_trait]
pub trait DeliveryAdapter: PluginAdapter {
    /// Formats `reply` for the platform and posts it to `callback_url`.
    async fn deliver(&self, callback_url: &str, reply: &OutboundReply) -> Result<(), MinwonError>;
}
