// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Byte order used to write multi-octet header fields.

/// A byte ordering for 16 bit header fields.
///
/// Header fields are always written in [`NetworkOrder`]; [`HostOrder`] exists to describe
/// memory which is shared with the host framework as plain native integers (e.g. rule
/// configuration blobs).
pub trait WireOrder {
    /// Encode `value` in this byte order.
    fn encode_u16(value: u16) -> [u8; 2];
    /// Decode `bytes` stored in this byte order.
    fn decode_u16(bytes: [u8; 2]) -> u16;
}

/// Network byte order (big endian)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkOrder;

/// Native byte order of the evaluating host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostOrder;

impl WireOrder for NetworkOrder {
    fn encode_u16(value: u16) -> [u8; 2] {
        value.to_be_bytes()
    }
    fn decode_u16(bytes: [u8; 2]) -> u16 {
        u16::from_be_bytes(bytes)
    }
}

impl WireOrder for HostOrder {
    fn encode_u16(value: u16) -> [u8; 2] {
        value.to_ne_bytes()
    }
    fn decode_u16(bytes: [u8; 2]) -> u16 {
        u16::from_ne_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use crate::order::{HostOrder, NetworkOrder, WireOrder};

    #[test]
    fn network_order_is_big_endian() {
        assert_eq!(NetworkOrder::encode_u16(8080), [0x1f, 0x90]);
        assert_eq!(NetworkOrder::decode_u16([0x1f, 0x90]), 8080);
    }

    #[test]
    fn host_order_is_native() {
        assert_eq!(HostOrder::encode_u16(0x0102), 0x0102u16.to_ne_bytes());
        assert_eq!(HostOrder::decode_u16(0x0102u16.to_ne_bytes()), 0x0102);
    }
}
