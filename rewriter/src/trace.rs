// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Observation of the rewrite path.
//!
//! The engine reports what it did with each packet to a [`Trace`] sink. Sinks run inside the
//! packet path: they must not block.

use net::ip::NextHeader;
use net::transport::PortTransport;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracectl::{LevelFilter, custom_target, ttrace};

/// Tracing target of the per-packet events emitted by [`LogTrace`]
pub(crate) const DATAPATH: &str = "dport::datapath";
custom_target!(DATAPATH, LevelFilter::OFF, &["dport", "datapath"]);

/// What happened to one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteEvent {
    /// The rule is inert; the packet was not looked at
    Inert,
    /// No IPv4 header could be read at the network offset
    Unreadable,
    /// The packet does not carry a destination port we rewrite
    NotApplicable(NextHeader),
    /// The packet is a non-first fragment and carries no transport header
    Fragment,
    /// The packet could not be made writable and was dropped
    NotWritable {
        /// number of octets requested
        requested: u16,
    },
    /// The protocol read from the writable region differs from the one first read
    ProtocolChanged,
    /// The destination port was rewritten
    Rewritten {
        /// transport protocol of the packet
        transport: PortTransport,
        /// destination port before the rewrite
        from: u16,
        /// destination port after the rewrite
        to: u16,
    },
}

/// Sink for [`RewriteEvent`]s.
pub trait Trace: Send + Sync {
    /// Record one event.
    fn event(&self, event: RewriteEvent);
}

impl<T: Trace + ?Sized> Trace for Arc<T> {
    fn event(&self, event: RewriteEvent) {
        (**self).event(event);
    }
}

/// A [`Trace`] sink which discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl Trace for NoTrace {
    #[inline]
    fn event(&self, _event: RewriteEvent) {}
}

/// Snapshot of a [`CountingTrace`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteCounters {
    /// packets seen by an inert rule
    pub inert: u64,
    /// packets let through untouched because the rule does not apply to them
    pub passed: u64,
    /// packets dropped because they could not be made writable
    pub dropped: u64,
    /// packets whose destination port was rewritten
    pub rewritten: u64,
}

/// A [`Trace`] sink which counts outcomes with relaxed atomics
#[derive(Debug, Default)]
pub struct CountingTrace {
    inert: AtomicU64,
    passed: AtomicU64,
    dropped: AtomicU64,
    rewritten: AtomicU64,
}

impl CountingTrace {
    /// Create a [`CountingTrace`] with all counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the counters.
    #[must_use]
    pub fn snapshot(&self) -> RewriteCounters {
        RewriteCounters {
            inert: self.inert.load(Ordering::Relaxed),
            passed: self.passed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            rewritten: self.rewritten.load(Ordering::Relaxed),
        }
    }
}

impl Trace for CountingTrace {
    fn event(&self, event: RewriteEvent) {
        let counter = match event {
            RewriteEvent::Inert => &self.inert,
            RewriteEvent::Unreadable
            | RewriteEvent::NotApplicable(_)
            | RewriteEvent::Fragment
            | RewriteEvent::ProtocolChanged => &self.passed,
            RewriteEvent::NotWritable { .. } => &self.dropped,
            RewriteEvent::Rewritten { .. } => &self.rewritten,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// A [`Trace`] sink which emits a `tracing` event per packet, on the `dport::datapath` target.
///
/// This is a debugging aid. The target is off by default and can be enabled at runtime with
/// the `datapath` tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTrace;

impl Trace for LogTrace {
    fn event(&self, event: RewriteEvent) {
        match event {
            RewriteEvent::Inert => ttrace!(DATAPATH, "inert rule, packet untouched"),
            RewriteEvent::Unreadable => ttrace!(DATAPATH, "no ipv4 header, packet untouched"),
            RewriteEvent::NotApplicable(proto) => {
                ttrace!(DATAPATH, "protocol {proto} has no port to rewrite");
            }
            RewriteEvent::Fragment => ttrace!(DATAPATH, "non-first fragment, packet untouched"),
            RewriteEvent::NotWritable { requested } => {
                ttrace!(DATAPATH, "unable to write {requested} octets, dropping packet");
            }
            RewriteEvent::ProtocolChanged => {
                ttrace!(DATAPATH, "protocol changed while making packet writable");
            }
            RewriteEvent::Rewritten {
                transport,
                from,
                to,
            } => ttrace!(DATAPATH, "rewrote {transport} destination port {from} -> {to}"),
        }
    }
}
