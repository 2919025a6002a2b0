// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod delivery;
pub mod provider;
pub mod storage;

pub use adapter::PluginAdapter;
pub use delivery::DeliveryAdapter;
pub use provider::ProviderAdapter;
pub use storage::StorageAdapter;
