// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Transport protocols which carry a destination port, and where to find it.

use crate::ip::NextHeader;
use core::fmt::{Display, Formatter};

/// A transport protocol whose header starts with a source and a destination port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortTransport {
    /// TCP
    Tcp,
    /// UDP
    Udp,
    /// UDP-Lite (same header layout as UDP)
    UdpLite,
}

impl PortTransport {
    /// Offset of the destination port within the transport header (all protocols).
    pub const DESTINATION_PORT_OFFSET: usize = 2;

    /// Length of a TCP header without options
    pub const TCP_HEADER_LEN: u16 = 20;
    /// Length of a UDP (or UDP-Lite) header
    pub const UDP_HEADER_LEN: u16 = 8;

    /// Map an IP protocol number to a [`PortTransport`], if it is one.
    #[must_use]
    pub const fn from_next_header(next_header: NextHeader) -> Option<PortTransport> {
        match next_header {
            NextHeader::TCP => Some(PortTransport::Tcp),
            NextHeader::UDP => Some(PortTransport::Udp),
            NextHeader::UDP_LITE => Some(PortTransport::UdpLite),
            _ => None,
        }
    }

    /// The IP protocol number of this transport.
    #[must_use]
    pub const fn next_header(self) -> NextHeader {
        match self {
            PortTransport::Tcp => NextHeader::TCP,
            PortTransport::Udp => NextHeader::UDP,
            PortTransport::UdpLite => NextHeader::UDP_LITE,
        }
    }

    /// The fixed length of the header which must be accessible to reach the ports.
    #[must_use]
    pub const fn header_len(self) -> u16 {
        match self {
            PortTransport::Tcp => Self::TCP_HEADER_LEN,
            PortTransport::Udp | PortTransport::UdpLite => Self::UDP_HEADER_LEN,
        }
    }
}

impl Display for PortTransport {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.next_header())
    }
}
