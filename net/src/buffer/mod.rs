// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! [`PacketBuffer`] and related traits

#[cfg(any(doc, test, feature = "test_buffer"))]
pub mod test_buffer;

use core::fmt::Debug;
use std::error::Error;

#[allow(unused_imports)] // re-export
#[cfg(any(doc, test, feature = "test_buffer"))]
pub use test_buffer::*;

/// Super trait representing the abstract operations which may be performed on a packet buffer.
pub trait PacketBuffer: AsRef<[u8]> + NetworkOffset + Debug + 'static {}
impl<T> PacketBuffer for T where T: AsRef<[u8]> + NetworkOffset + Debug + 'static {}

/// Super trait representing the abstract operations which may be performed on a mutable packet
/// buffer.
///
/// Note that this trait deliberately does not require `AsMut<[u8]>`: the only way to write into
/// a packet is through [`MakeWritable::make_writable`], which is where the framework gets the
/// chance to unshare or linearize the packet data.
pub trait PacketBufferMut: PacketBuffer + MakeWritable + Send {}
impl<T> PacketBufferMut for T where T: PacketBuffer + MakeWritable + Send {}

/// Trait representing the ability to locate the network header in a packet buffer.
pub trait NetworkOffset {
    /// Offset (in octets, from the start of the packet data) of the network header.
    ///
    /// The offset is maintained by the framework and survives a relocation of the packet data
    /// by [`MakeWritable::make_writable`].
    fn network_offset(&self) -> u16;
}

/// Trait representing the ability to get exclusive, contiguous and writable access to the head
/// of a packet buffer.
pub trait MakeWritable {
    /// Error which may occur when attempting to make the buffer writable.
    type Error: Debug + Error;

    /// Make the first `len` octets of the packet data private to the caller and contiguous in
    /// memory.
    ///
    /// This is the only operation which may relocate the backing storage of the packet.
    /// On success, the returned slice covers exactly the first `len` octets of the (possibly
    /// relocated) packet data.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the request cannot be satisfied, e.g. because the packet is
    /// shorter than `len` or because private storage could not be obtained.
    /// The packet data is left unaltered in that case.
    fn make_writable(&mut self, len: u16) -> Result<&mut [u8], Self::Error>;
}

/// Error indicating that a packet buffer could not be made writable for the requested length.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unable to make {requested} octets of packet buffer writable")]
pub struct NotWritable {
    /// The number of octets which were requested
    pub requested: u16,
}

impl NotWritable {
    /// Create a new [`NotWritable`] error for a request of `requested` octets.
    #[must_use]
    pub const fn new(requested: u16) -> Self {
        Self { requested }
    }
}
