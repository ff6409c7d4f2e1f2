// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![deny(
    unsafe_code,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]

//! The DPORT target: rewrites the destination port of TCP, UDP and UDP-Lite packets.
//!
//! [`PacketRewriter`] is the per-packet engine. It works on offsets into a
//! [`net::buffer::PacketBufferMut`] and only writes through the slice returned by
//! [`net::buffer::MakeWritable::make_writable`], so no reference to the packet data can outlive
//! a relocation of that data.
//!
//! [`DportTarget`] plugs the engine into a [`pipeline::TargetRegistry`], decoding the rule
//! configuration blob for every packet.
//!
//! The transport checksum is *not* updated: a rewritten TCP or UDP packet carries a checksum
//! which no longer verifies unless something downstream fixes it up.

mod engine;
mod target;
mod trace;

pub use engine::PacketRewriter;
pub use target::{DportTarget, register, unregister};
pub use trace::{CountingTrace, LogTrace, NoTrace, RewriteCounters, RewriteEvent, Trace};
