// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Helper methods and types which are common between IPv4 and IPv6

use core::fmt::{Display, Formatter};
use etherparse::IpNumber;

/// Thin wrapper around [`IpNumber`]
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NextHeader {
    inner: IpNumber,
}

impl From<NextHeader> for IpNumber {
    fn from(value: NextHeader) -> Self {
        value.inner
    }
}

impl From<u8> for NextHeader {
    fn from(value: u8) -> Self {
        NextHeader::new(value)
    }
}

impl NextHeader {
    /// Transmission Control Protocol
    pub const TCP: NextHeader = NextHeader::new(6);
    /// User Datagram Protocol
    pub const UDP: NextHeader = NextHeader::new(17);
    /// Lightweight User Datagram Protocol
    pub const UDP_LITE: NextHeader = NextHeader::new(136);
    /// Internet Control Message Protocol
    pub const ICMP: NextHeader = NextHeader::new(1);

    /// Generate a new [`NextHeader`]
    #[must_use]
    pub const fn new(inner: u8) -> Self {
        Self {
            inner: IpNumber(inner),
        }
    }

    /// Return the [`NextHeader`] represented as a `u8`
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        self.inner.0
    }
}

impl Display for NextHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match *self {
            NextHeader::TCP => write!(f, "tcp"),
            NextHeader::UDP => write!(f, "udp"),
            NextHeader::UDP_LITE => write!(f, "udplite"),
            NextHeader::ICMP => write!(f, "icmp"),
            other => write!(f, "{}", other.as_u8()),
        }
    }
}

#[cfg(any(test, feature = "bolero"))]
mod contract {
    use crate::ip::NextHeader;
    use bolero::{Driver, TypeGenerator};

    impl TypeGenerator for NextHeader {
        fn generate<D: Driver>(driver: &mut D) -> Option<Self> {
            Some(NextHeader::new(driver.produce()?))
        }
    }
}
