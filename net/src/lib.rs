// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![forbid(unsafe_code)] // Header access must stay strictly safe
#![deny(missing_docs, clippy::all, clippy::pedantic)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! A library describing the packet buffers a filtering target works on, and the few fixed
//! header layouts needed to find and rewrite transport ports.
//!
//! Nothing in this crate parses a packet into owned headers: a target only needs to know where
//! the network header starts, which transport protocol follows it, and where the destination
//! port lives inside the transport header.

pub mod buffer;
pub mod checksum;
pub mod ip;
pub mod ipv4;
pub mod order;
pub mod transport;

#[cfg(any(test, feature = "test_buffer"))]
pub mod test_utils;
