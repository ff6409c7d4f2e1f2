// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Transport checksum inspection.
//!
//! Rewriting a port does not maintain the transport checksum. These helpers only *observe*
//! whether a packet's checksum still verifies; they never modify the packet.

use crate::ip::NextHeader;
use crate::transport::PortTransport;
use core::fmt::{Display, Formatter};
use etherparse::err::{LenError, ValueTooBigError};
use etherparse::{Ipv4Header, TcpHeader, UdpHeader};

/// Outcome of verifying the transport checksum of a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumStatus {
    /// The stored checksum matches the one computed over the packet
    Valid,
    /// The stored checksum does not match the one computed over the packet
    Mismatch {
        /// checksum found in the transport header
        stored: u16,
        /// checksum computed over pseudo-header, header and payload
        computed: u16,
    },
    /// UDP over IPv4 with a zero checksum: the sender did not compute one
    NotComputed,
    /// The transport protocol is not one whose checksum we verify
    Unsupported(NextHeader),
}

impl Display for ChecksumStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            ChecksumStatus::Valid => write!(f, "valid"),
            ChecksumStatus::Mismatch { stored, computed } => {
                write!(f, "mismatch (stored {stored:#06x}, computed {computed:#06x})")
            }
            ChecksumStatus::NotComputed => write!(f, "not computed"),
            ChecksumStatus::Unsupported(proto) => write!(f, "not verified for {proto}"),
        }
    }
}

/// Errors which may occur when inspecting a transport checksum
#[derive(Debug, thiserror::Error)]
pub enum ChecksumInspectError {
    /// The IPv4 header could not be read
    #[error(transparent)]
    Ipv4(#[from] etherparse::err::ipv4::HeaderSliceError),
    /// The TCP header could not be read
    #[error(transparent)]
    Tcp(#[from] etherparse::err::tcp::HeaderSliceError),
    /// The UDP header could not be read
    #[error(transparent)]
    Udp(#[from] LenError),
    /// The packet is shorter than its length fields claim
    #[error("truncated packet: expected {expected} payload bytes, got {actual}")]
    Truncated {
        /// payload length claimed by the headers
        expected: usize,
        /// payload length present in the buffer
        actual: usize,
    },
    /// The payload is too large for a checksum to be computed
    #[error(transparent)]
    TooBig(#[from] ValueTooBigError<usize>),
}

fn compare(stored: u16, computed: u16) -> ChecksumStatus {
    if stored == computed {
        ChecksumStatus::Valid
    } else {
        ChecksumStatus::Mismatch { stored, computed }
    }
}

fn take(buf: &[u8], len: usize) -> Result<&[u8], ChecksumInspectError> {
    buf.get(..len).ok_or(ChecksumInspectError::Truncated {
        expected: len,
        actual: buf.len(),
    })
}

/// Verify the TCP or UDP checksum of the IPv4 packet starting at the first octet of `packet`.
///
/// # Errors
///
/// Returns a [`ChecksumInspectError`] if the headers cannot be read or the packet is shorter
/// than its length fields claim.
pub fn ipv4_transport_checksum(packet: &[u8]) -> Result<ChecksumStatus, ChecksumInspectError> {
    let (ip, rest) = Ipv4Header::from_slice(packet)?;
    let payload_len = usize::from(ip.total_len).saturating_sub(ip.header_len());
    let payload = take(rest, payload_len)?;
    match NextHeader::new(ip.protocol.0) {
        NextHeader::TCP => {
            let (tcp, tcp_payload) = TcpHeader::from_slice(payload)?;
            let computed = tcp.calc_checksum_ipv4(&ip, tcp_payload)?;
            Ok(compare(tcp.checksum, computed))
        }
        NextHeader::UDP => {
            let (udp, rest) = UdpHeader::from_slice(payload)?;
            if udp.checksum == 0 {
                return Ok(ChecksumStatus::NotComputed);
            }
            let udp_payload_len =
                usize::from(udp.length).saturating_sub(PortTransport::UDP_HEADER_LEN as usize);
            let udp_payload = take(rest, udp_payload_len)?;
            let computed = udp.calc_checksum_ipv4(&ip, udp_payload)?;
            Ok(compare(udp.checksum, computed))
        }
        other => Ok(ChecksumStatus::Unsupported(other)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::checksum::{ChecksumStatus, ipv4_transport_checksum};
    use crate::ip::NextHeader;
    use crate::test_utils::{Ipv4PacketBuilder, L4};

    #[test]
    fn freshly_built_packets_verify() {
        for l4 in [L4::Tcp, L4::Udp] {
            let data = Ipv4PacketBuilder::new(l4).payload(b"hello").build();
            assert_eq!(
                ipv4_transport_checksum(&data).unwrap(),
                ChecksumStatus::Valid
            );
        }
    }

    #[test]
    fn corrupted_port_is_detected() {
        let mut data = Ipv4PacketBuilder::new(L4::Tcp).payload(b"hello").build();
        data[22] ^= 0x01; // destination port, low bits of high octet
        assert!(matches!(
            ipv4_transport_checksum(&data).unwrap(),
            ChecksumStatus::Mismatch { .. }
        ));
    }

    #[test]
    fn zero_udp_checksum_is_not_computed() {
        let data = Ipv4PacketBuilder::new(L4::Udp).without_checksum().build();
        assert_eq!(
            ipv4_transport_checksum(&data).unwrap(),
            ChecksumStatus::NotComputed
        );
    }

    #[test]
    fn other_protocols_are_unsupported() {
        let data = Ipv4PacketBuilder::new(L4::Icmp).build();
        assert_eq!(
            ipv4_transport_checksum(&data).unwrap(),
            ChecksumStatus::Unsupported(NextHeader::ICMP)
        );
    }

    #[test]
    fn truncated_packet_is_an_error() {
        let data = Ipv4PacketBuilder::new(L4::Tcp).payload(b"hello").build();
        assert!(ipv4_transport_checksum(&data[..data.len() - 1]).is_err());
    }
}
