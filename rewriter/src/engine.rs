// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Per-packet destination port rewriting

use crate::trace::{NoTrace, RewriteEvent, Trace};
use config::RuleConfig;
use net::buffer::PacketBufferMut;
use net::ipv4::Ipv4Summary;
use net::order::{NetworkOrder, WireOrder};
use net::transport::PortTransport;
use pipeline::Verdict;
use std::marker::PhantomData;

/// Where the destination port of a packet lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PortLocation {
    transport: PortTransport,
    /// offset of the transport header from the start of the packet data
    transport_offset: u16,
}

impl PortLocation {
    /// Length of the packet head which must be writable to rewrite the port.
    fn writable_len(self) -> Option<u16> {
        self.transport_offset
            .checked_add(self.transport.header_len())
    }

    fn destination_port(self) -> core::ops::Range<usize> {
        let start = usize::from(self.transport_offset) + PortTransport::DESTINATION_PORT_OFFSET;
        start..start + 2
    }
}

fn locate(data: &[u8], network_offset: u16) -> Result<PortLocation, RewriteEvent> {
    let summary = data
        .get(usize::from(network_offset)..)
        .and_then(|header| Ipv4Summary::read(header).ok())
        .ok_or(RewriteEvent::Unreadable)?;
    let transport = PortTransport::from_next_header(summary.protocol())
        .ok_or(RewriteEvent::NotApplicable(summary.protocol()))?;
    if !summary.is_first_fragment() {
        return Err(RewriteEvent::Fragment);
    }
    let transport_offset = network_offset
        .checked_add(summary.header_len())
        .ok_or(RewriteEvent::Unreadable)?;
    Ok(PortLocation {
        transport,
        transport_offset,
    })
}

/// The destination port rewriting engine.
///
/// `O` is the byte order the port is written in ([`NetworkOrder`] on any real packet) and `T`
/// the sink which observes every decision ([`NoTrace`] unless one is injected).
///
/// The engine holds no per-packet state: one instance may process packets on any number of
/// threads at once.
pub struct PacketRewriter<O: WireOrder = NetworkOrder, T: Trace = NoTrace> {
    trace: T,
    _order: PhantomData<fn() -> O>,
}

impl PacketRewriter {
    /// Create a [`PacketRewriter`] writing in network byte order, without tracing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            trace: NoTrace,
            _order: PhantomData,
        }
    }
}

impl<O: WireOrder, T: Trace + Default> Default for PacketRewriter<O, T> {
    fn default() -> Self {
        Self::with_trace(T::default())
    }
}

impl<O: WireOrder, T: Trace> PacketRewriter<O, T> {
    /// Create a [`PacketRewriter`] reporting to `trace`.
    #[must_use]
    pub const fn with_trace(trace: T) -> Self {
        Self {
            trace,
            _order: PhantomData,
        }
    }

    /// The trace sink of this rewriter.
    #[must_use]
    pub const fn trace(&self) -> &T {
        &self.trace
    }

    /// Apply `config` to `packet`.
    ///
    /// Returns [`Verdict::Drop`] only if the head of the packet cannot be made writable, in
    /// which case the packet is left unaltered. Every other outcome, including packets the rule
    /// does not apply to, is [`Verdict::Continue`].
    pub fn rewrite<Buf: PacketBufferMut>(&self, config: &RuleConfig, packet: &mut Buf) -> Verdict {
        let Some(to_port) = config.to_port() else {
            self.trace.event(RewriteEvent::Inert);
            return Verdict::Continue;
        };

        let network_offset = packet.network_offset();
        let location = match locate(packet.as_ref(), network_offset) {
            Ok(location) => location,
            Err(event) => {
                self.trace.event(event);
                return Verdict::Continue;
            }
        };

        let Some(requested) = location.writable_len() else {
            self.trace.event(RewriteEvent::NotWritable {
                requested: u16::MAX,
            });
            return Verdict::Drop;
        };
        // the data may move: only offsets survive this point
        let Ok(data) = packet.make_writable(requested) else {
            self.trace.event(RewriteEvent::NotWritable { requested });
            return Verdict::Drop;
        };

        if locate(data, network_offset) != Ok(location) {
            self.trace.event(RewriteEvent::ProtocolChanged);
            return Verdict::Continue;
        }
        let Some(field) = data.get_mut(location.destination_port()) else {
            self.trace.event(RewriteEvent::ProtocolChanged);
            return Verdict::Continue;
        };
        let from = O::decode_u16([field[0], field[1]]);
        field.copy_from_slice(&O::encode_u16(to_port.get()));

        self.trace.event(RewriteEvent::Rewritten {
            transport: location.transport,
            from,
            to: to_port.get(),
        });
        Verdict::Continue
    }
}
