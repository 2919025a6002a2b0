// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! KakaoTalk channel integration for the Minwon chat relay.
//!
//! Covers the Kakao i Open Builder skill protocol: parsing inbound skill
//! requests, building skill responses, and delivering deferred replies to
//! callback addresses.

pub mod callback;
pub mod response;
pub mod types;

pub use callback::KakaoCallbackClient;
pub use response::ResponseBuilder;
pub use types::{SkillRequest, SkillResponse};
