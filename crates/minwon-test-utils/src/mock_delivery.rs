// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock callback delivery for deterministic testing.
//!
//! `MockDelivery` implements `DeliveryAdapter` and captures every successful
//! delivery for assertion in tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use minwon_core::MinwonError;
use minwon_core::traits::adapter::PluginAdapter;
use minwon_core::traits::delivery::DeliveryAdapter;
use minwon_core::types::{AdapterType, HealthStatus, OutboundReply};

/// A mock delivery target.
///
/// - **deliveries**: `(callback_url, reply)` pairs accepted by `deliver()`
/// - **attempts**: every call, including failed ones
pub struct MockDelivery {
    fail: bool,
    attempts: AtomicUsize,
    delivered: Mutex<Vec<(String, OutboundReply)>>,
}

impl MockDelivery {
    /// A delivery target that accepts everything.
    pub fn new() -> Self {
        Self {
            fail: false,
            attempts: AtomicUsize::new(0),
            delivered: Mutex::new(Vec::new()),
        }
    }

    /// A delivery target that rejects everything.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Accepted deliveries, in order.
    pub fn deliveries(&self) -> Vec<(String, OutboundReply)> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Default for MockDelivery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockDelivery {
    fn name(&self) -> &str {
        "mock-delivery"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Delivery
    }

    async fn health_check(&self) -> Result<HealthStatus, MinwonError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MinwonError> {
        Ok(())
    }
}

#[async_trait]
impl DeliveryAdapter for MockDelivery {
    async fn deliver(&self, callback_url: &str, reply: &OutboundReply) -> Result<(), MinwonError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MinwonError::Delivery {
                message: format!("mock delivery to {callback_url} rejected"),
                source: None,
            });
        }
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((callback_url.to_string(), reply.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply() -> OutboundReply {
        OutboundReply {
            text: "hi".into(),
            is_urgent: false,
        }
    }

    #[tokio::test]
    async fn captures_deliveries() {
        let delivery = MockDelivery::new();
        delivery.deliver("http://cb/1", &reply()).await.unwrap();
        assert_eq!(delivery.deliveries(), vec![("http://cb/1".to_string(), reply())]);
        assert_eq!(delivery.attempts(), 1);
    }

    #[tokio::test]
    async fn failing_counts_attempts_only() {
        let delivery = MockDelivery::failing();
        assert!(delivery.deliver("http://cb/1", &reply()).await.is_err());
        assert!(delivery.deliveries().is_empty());
        assert_eq!(delivery.attempts(), 1);
    }
}
