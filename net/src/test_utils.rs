// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Builders for IPv4 test packets.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

pub use crate::buffer::TestBuffer;
use crate::ip::NextHeader;
use etherparse::{IpNumber, Ipv4Header, Ipv4Options, TcpHeader, UdpHeader};

/// Transport layer of a test packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum L4 {
    /// TCP segment
    Tcp,
    /// UDP datagram
    Udp,
    /// UDP-Lite datagram
    UdpLite,
    /// ICMP echo request
    Icmp,
    /// Opaque payload with an arbitrary protocol number
    Other(u8),
}

impl L4 {
    fn next_header(self) -> NextHeader {
        match self {
            L4::Tcp => NextHeader::TCP,
            L4::Udp => NextHeader::UDP,
            L4::UdpLite => NextHeader::UDP_LITE,
            L4::Icmp => NextHeader::ICMP,
            L4::Other(proto) => NextHeader::new(proto),
        }
    }
}

/// Builder of IPv4 packets (starting at the IPv4 header) with valid checksums.
#[derive(Debug, Clone)]
#[must_use]
pub struct Ipv4PacketBuilder {
    l4: L4,
    source: [u8; 4],
    destination: [u8; 4],
    sport: u16,
    dport: u16,
    options: Vec<u8>,
    payload: Vec<u8>,
    udp_checksum: bool,
}

impl Ipv4PacketBuilder {
    /// Start building a packet for the given transport.
    ///
    /// Defaults: 10.0.0.1:40000 -> 10.0.0.2:80, no options, no payload.
    pub fn new(l4: L4) -> Self {
        Self {
            l4,
            source: [10, 0, 0, 1],
            destination: [10, 0, 0, 2],
            sport: 40000,
            dport: 80,
            options: vec![],
            payload: vec![],
            udp_checksum: true,
        }
    }

    /// Set the transport ports.
    pub fn ports(mut self, sport: u16, dport: u16) -> Self {
        self.sport = sport;
        self.dport = dport;
        self
    }

    /// Set the IPv4 options (length must be a multiple of 4, at most 40).
    pub fn options(mut self, options: &[u8]) -> Self {
        self.options = options.to_vec();
        self
    }

    /// Set the transport payload.
    pub fn payload(mut self, payload: &[u8]) -> Self {
        self.payload = payload.to_vec();
        self
    }

    /// Leave the UDP checksum at zero ("not computed").
    pub fn without_checksum(mut self) -> Self {
        self.udp_checksum = false;
        self
    }

    /// Serialize the packet.
    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let mut ip = Ipv4Header::new(
            0,
            64,
            IpNumber::from(self.l4.next_header()),
            self.source,
            self.destination,
        )
        .unwrap();
        ip.options = Ipv4Options::try_from(self.options.as_slice()).unwrap();

        let mut l4 = Vec::new();
        match self.l4 {
            L4::Tcp => {
                let mut tcp = TcpHeader::new(self.sport, self.dport, 0x0102_0304, 4096);
                tcp.ack = true;
                tcp.acknowledgment_number = 0x0a0b_0c0d;
                ip.set_payload_len(tcp.header_len() + self.payload.len())
                    .unwrap();
                tcp.checksum = tcp.calc_checksum_ipv4(&ip, &self.payload).unwrap();
                tcp.write(&mut l4).unwrap();
            }
            L4::Udp | L4::UdpLite => {
                ip.set_payload_len(8 + self.payload.len()).unwrap();
                let udp = if self.udp_checksum {
                    UdpHeader::with_ipv4_checksum(self.sport, self.dport, &ip, &self.payload)
                        .unwrap()
                } else {
                    UdpHeader {
                        source_port: self.sport,
                        destination_port: self.dport,
                        length: u16::try_from(8 + self.payload.len()).unwrap(),
                        checksum: 0,
                    }
                };
                udp.write(&mut l4).unwrap();
            }
            L4::Icmp => {
                // echo request, id 1, seq 1, checksum left to zero
                ip.set_payload_len(8 + self.payload.len()).unwrap();
                l4.extend_from_slice(&[8, 0, 0, 0, 0, 1, 0, 1]);
            }
            L4::Other(_) => {
                ip.set_payload_len(self.payload.len()).unwrap();
            }
        }
        l4.extend_from_slice(&self.payload);
        ip.header_checksum = ip.calc_header_checksum();

        let mut packet = Vec::with_capacity(ip.header_len() + l4.len());
        ip.write(&mut packet).unwrap();
        packet.extend_from_slice(&l4);
        packet
    }

    /// Serialize the packet into a [`TestBuffer`].
    pub fn build_buffer(&self) -> TestBuffer {
        TestBuffer::from_raw_data(&self.build())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{Ipv4PacketBuilder, L4};

    #[test]
    fn built_packets_have_expected_lengths() {
        assert_eq!(Ipv4PacketBuilder::new(L4::Tcp).build().len(), 40);
        assert_eq!(Ipv4PacketBuilder::new(L4::Udp).build().len(), 28);
        assert_eq!(Ipv4PacketBuilder::new(L4::UdpLite).build().len(), 28);
        let data = Ipv4PacketBuilder::new(L4::Udp)
            .options(&[1, 1, 1, 0])
            .payload(b"abc")
            .build();
        assert_eq!(data.len(), 24 + 8 + 3);
        assert_eq!(data[9], 17);
    }

    #[test]
    fn ports_land_at_fixed_offsets() {
        let data = Ipv4PacketBuilder::new(L4::UdpLite)
            .ports(0x1122, 0x3344)
            .build();
        assert_eq!(data[9], 136);
        assert_eq!(&data[20..24], &[0x11, 0x22, 0x33, 0x44]);
    }
}
