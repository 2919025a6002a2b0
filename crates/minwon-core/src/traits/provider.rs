// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for text-completion services.

use async_trait::async_trait;

use crate::error::MinwonError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderRequest, ProviderResponse};

/// Adapter for an external text-completion service.
///
/// Implementations return an error for any failure; deciding what the end
/// user sees instead is left to the caller.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a completion request and returns the full response.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MinwonError>;
}
