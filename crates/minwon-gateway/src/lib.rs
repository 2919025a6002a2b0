// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface of the Minwon chat relay.
//!
//! Kakao skill webhooks feed the relay; the admin API reads the complaint
//! log and history and toggles human takeover per sender.

pub mod admin;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{GatewayState, router, serve};
