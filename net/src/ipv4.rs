// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The few IPv4 header fields a transport target needs.
//!
//! The header is read in place through [`Ipv4HeaderSlice`]: nothing is copied, and only the
//! version, header length, protocol and fragment offset are looked at.

use crate::ip::NextHeader;
use etherparse::Ipv4HeaderSlice;

/// The fields of an IPv4 header which locate and identify the transport header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Summary {
    header_len: u16,
    protocol: NextHeader,
    first_fragment: bool,
}

/// Errors which may occur when reading an IPv4 header
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Ipv4SummaryError {
    /// The buffer does not start with a complete and plausible IPv4 header
    #[error("invalid ipv4 header: {0}")]
    Invalid(#[from] etherparse::err::ipv4::HeaderSliceError),
}

impl Ipv4Summary {
    /// Length of an IPv4 header without options
    pub const MIN_LEN: u16 = 20;

    /// Read the header starting at the first octet of `buf`.
    ///
    /// # Errors
    ///
    /// Returns an [`Ipv4SummaryError`] if `buf` does not start with a plausible IPv4 header,
    /// including its options.
    pub fn read(buf: &[u8]) -> Result<Ipv4Summary, Ipv4SummaryError> {
        let header = Ipv4HeaderSlice::from_slice(buf)?;
        Ok(Ipv4Summary {
            header_len: u16::from(header.ihl()) * 4,
            protocol: NextHeader::new(header.protocol().0),
            first_fragment: header.fragments_offset().value() == 0,
        })
    }

    /// Length of the header, options included.
    #[must_use]
    pub const fn header_len(&self) -> u16 {
        self.header_len
    }

    /// The protocol carried right after this header.
    #[must_use]
    pub const fn protocol(&self) -> NextHeader {
        self.protocol
    }

    /// Whether the packet is unfragmented or the first fragment, i.e. whether it carries the
    /// transport header at all.
    #[must_use]
    pub const fn is_first_fragment(&self) -> bool {
        self.first_fragment
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::ip::NextHeader;
    use crate::ipv4::{Ipv4Summary, Ipv4SummaryError};
    use crate::test_utils::{Ipv4PacketBuilder, L4};
    use etherparse::err::LenError;
    use etherparse::err::ipv4::{HeaderError, HeaderSliceError};

    #[test]
    fn reads_plain_header() {
        let data = Ipv4PacketBuilder::new(L4::Udp).build();
        let summary = Ipv4Summary::read(&data).unwrap();
        assert_eq!(summary.header_len(), Ipv4Summary::MIN_LEN);
        assert_eq!(summary.protocol(), NextHeader::UDP);
        assert!(summary.is_first_fragment());
    }

    #[test]
    fn reads_header_with_options() {
        let data = Ipv4PacketBuilder::new(L4::Tcp)
            .options(&[1, 1, 1, 1, 1, 1, 1, 0])
            .build();
        let summary = Ipv4Summary::read(&data).unwrap();
        assert_eq!(summary.header_len(), 28);
        assert_eq!(summary.protocol(), NextHeader::TCP);
    }

    #[test]
    fn rejects_other_versions() {
        let mut data = Ipv4PacketBuilder::new(L4::Tcp).build();
        data[0] = 0x65;
        assert!(matches!(
            Ipv4Summary::read(&data),
            Err(Ipv4SummaryError::Invalid(HeaderSliceError::Content(
                HeaderError::UnexpectedVersion { version_number: 6 }
            )))
        ));
    }

    #[test]
    fn rejects_short_ihl() {
        let mut data = Ipv4PacketBuilder::new(L4::Tcp).build();
        data[0] = 0x44;
        assert!(matches!(
            Ipv4Summary::read(&data),
            Err(Ipv4SummaryError::Invalid(HeaderSliceError::Content(
                HeaderError::HeaderLengthSmallerThanHeader { ihl: 4 }
            )))
        ));
    }

    #[test]
    fn rejects_truncated_options() {
        let mut data = vec![0u8; 20];
        data[0] = 0x46; // claims 24 octets of header
        assert!(matches!(
            Ipv4Summary::read(&data),
            Err(Ipv4SummaryError::Invalid(HeaderSliceError::Len(LenError {
                required_len: 24,
                len: 20,
                ..
            })))
        ));
    }

    #[test]
    fn flags_later_fragments() {
        let mut data = Ipv4PacketBuilder::new(L4::Udp).build();
        data[6] = 0x00;
        data[7] = 0xb9; // fragment offset 185
        assert!(!Ipv4Summary::read(&data).unwrap().is_first_fragment());
        data[6] = 0x20; // more fragments, offset 0
        data[7] = 0x00;
        assert!(Ipv4Summary::read(&data).unwrap().is_first_fragment());
    }

    #[test]
    fn empty_buffer_is_too_short() {
        assert!(matches!(
            Ipv4Summary::read(&[]),
            Err(Ipv4SummaryError::Invalid(HeaderSliceError::Len(_)))
        ));
    }
}
