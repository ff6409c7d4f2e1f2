// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![allow(rustdoc::private_doc_tests)]
#![deny(
    unsafe_code,
    missing_docs,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]

//! # Filtering Framework Building Blocks
//!
//! This crate models the part of a packet filtering framework which a *target* extension plugs
//! into: the verdicts a target may return, the [`Target`] trait itself, a [`TargetRegistry`]
//! which binds rule configurations to target implementations, and a [`RuleTable`] which
//! evaluates packets against an ordered list of rules.
//!
//! ## Targets
//!
//! A target is anything that implements the [`Target`] trait. It is described by a
//! [`TargetDesc`] (name, revision, family and the size of its configuration blob) and receives
//! its configuration as an opaque, padded blob of octets. You can look at the
//! [`sample_targets`] module for some examples of simple targets.
//!
//! ## Rule table
//!
//! ```rust
//! use dport_pipeline::{Match, RuleTable, TargetRegistry, Verdict};
//! use dport_pipeline::sample_targets::DropAll;
//! use net::buffer::TestBuffer;
//! use net::ip::NextHeader;
//!
//! let mut registry = TargetRegistry::<TestBuffer>::new();
//! registry.register(DropAll).unwrap();
//!
//! let mut table = RuleTable::new();
//! table
//!     .append(&registry, Match::Protocol(NextHeader::ICMP), &DropAll::DESC, &[])
//!     .unwrap();
//!
//! let mut packet = TestBuffer::from_raw_data(&[]);
//! assert_eq!(table.evaluate(&mut packet), Verdict::Continue);
//! ```
//!
//! Rules are evaluated in order. A [`Verdict::Drop`] is terminal; a [`Verdict::Continue`] lets
//! the packet proceed to the next rule, and a packet reaching the end of the table continues
//! through the rest of the pipeline.

mod registry;
/// Sample targets
pub mod sample_targets;
mod table;
mod target;
mod verdict;

use tracectl::trace_target;
trace_target!("pipeline", tracectl::LevelFilter::INFO, &["pipeline"]);

pub use registry::{RegistryError, TargetRegistry};
pub use table::{Match, RuleId, RuleTable, TableError};
pub use target::{CheckError, Family, Target, TargetDesc, xt_align};
pub use verdict::Verdict;
