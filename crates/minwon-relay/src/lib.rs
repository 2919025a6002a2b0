// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message relay for the Minwon chat relay.
//!
//! [`Relay`] decides what each inbound message gets:
//! - an input prompt for an empty utterance
//! - silence for a sender under human takeover
//! - a deferred-callback job when the platform granted a callback address
//! - otherwise a synchronously generated reply
//!
//! Processed exchanges are appended to the history and the complaint log,
//! and urgent ones are escalated to the owner.

pub mod context;
pub mod dispatch;
pub mod generate;
pub mod notify;
pub mod relay;
pub mod shutdown;
pub mod urgency;

pub use context::{ContextSettings, load_system_prompt};
pub use dispatch::{CallbackDispatcher, JobHandle, JobRecord, JobStatus};
pub use generate::{GeneratedReply, ReplyGenerator};
pub use notify::{UrgentAlert, UrgentNotifier};
pub use relay::{Relay, RelayOutcome};
pub use urgency::UrgencyClassifier;
