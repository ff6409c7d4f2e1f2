// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration of the DPORT target: the per-rule parameter shared between the rule compiler,
//! which produces it, and the packet rewriter, which consumes it.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]

pub mod errors;
pub mod rule;

pub use errors::{ConfigError, ConfigResult}; // re-export
pub use rule::RuleConfig; // re-export

/// Name binding the rule compiler and the packet rewriter in the host framework.
pub const TARGET_NAME: &str = "DPORT";
/// Revision of the target, to be bumped on any change of [`RuleConfig`] layout or semantics.
pub const TARGET_REVISION: u8 = 0;
/// The (only) option of the target.
pub const TO_PORT_OPTION: &str = "--to-port";
