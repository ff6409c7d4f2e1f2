// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Toy implementation of [`PacketBuffer`] which is useful for testing.

#[cfg(any(test, feature = "bolero"))]
pub use contract::*;

use crate::buffer::{MakeWritable, NetworkOffset, NotWritable};
use tracing::trace;

// only included for doc ref
#[cfg(doc)]
use crate::buffer::PacketBuffer;

/// Toy data structure which implements [`PacketBuffer`]
///
/// The core function of this structure is to facilitate testing by "faking" the properties of a
/// framework-owned packet buffer which matter to a filtering target:
///
/// - the data may be *shared* with another reference to the same packet, in which case
///   [`MakeWritable::make_writable`] has to copy it to private storage (a relocation);
/// - the framework may *refuse* to make the data writable (e.g. memory pressure).
#[derive(Debug)]
pub struct TestBuffer {
    buffer: Vec<u8>,
    headroom: u16,
    tailroom: u16,
    network_offset: u16,
    shared: bool,
    refuse_writable: bool,
    relocations: u32,
}

impl Drop for TestBuffer {
    fn drop(&mut self) {
        trace!("Dropping TestBuffer");
    }
}

impl TestBuffer {
    /// The maximum capacity of a `TestBuffer`.
    pub const CAPACITY: u16 = 2048;
    /// The reserved headroom of a `TestBuffer`.
    pub const HEADROOM: u16 = 96;
    /// The reserved tailroom of a `TestBuffer`.
    pub const TAILROOM: u16 = 96;

    /// Create a new `TestBuffer` from a given slice of octets.
    ///
    /// The network header is assumed to start at the first octet of `data`.
    #[must_use]
    pub fn from_raw_data(data: &[u8]) -> TestBuffer {
        let mut buffer = Vec::with_capacity(TestBuffer::CAPACITY as usize);
        buffer.extend_from_slice(&[0; TestBuffer::HEADROOM as usize]);
        buffer.extend_from_slice(data);
        buffer.extend_from_slice(&[0; TestBuffer::TAILROOM as usize]);
        TestBuffer {
            buffer,
            headroom: TestBuffer::HEADROOM,
            tailroom: TestBuffer::TAILROOM,
            network_offset: 0,
            shared: false,
            refuse_writable: false,
            relocations: 0,
        }
    }

    /// Set the offset of the network header (e.g. to leave room for a link layer header).
    #[must_use]
    pub fn with_network_offset(mut self, offset: u16) -> TestBuffer {
        self.network_offset = offset;
        self
    }

    /// Mark the packet data as shared with another reference, so that the next call to
    /// [`MakeWritable::make_writable`] relocates it.
    #[must_use]
    pub fn shared(mut self) -> TestBuffer {
        self.shared = true;
        self
    }

    /// Make every subsequent [`MakeWritable::make_writable`] request fail.
    #[must_use]
    pub fn refusing_writable(mut self) -> TestBuffer {
        self.refuse_writable = true;
        self
    }

    /// Number of times the packet data has been moved to private storage.
    #[must_use]
    pub fn relocations(&self) -> u32 {
        self.relocations
    }

    /// Whether the packet data is still shared with another reference.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.shared
    }

    fn data_range(&self) -> core::ops::Range<usize> {
        let start = self.headroom as usize;
        let end = self.buffer.len() - self.tailroom as usize;
        start..end
    }
}

impl AsRef<[u8]> for TestBuffer {
    fn as_ref(&self) -> &[u8] {
        let range = self.data_range();
        &self.buffer.as_slice()[range]
    }
}

impl NetworkOffset for TestBuffer {
    fn network_offset(&self) -> u16 {
        self.network_offset
    }
}

impl MakeWritable for TestBuffer {
    type Error = NotWritable;

    fn make_writable(&mut self, len: u16) -> Result<&mut [u8], NotWritable> {
        if self.refuse_writable {
            trace!("TestBuffer refuses to become writable ({len} octets requested)");
            return Err(NotWritable::new(len));
        }
        if len as usize > self.as_ref().len() {
            trace!(
                "TestBuffer too short to become writable: {len} > {available}",
                available = self.as_ref().len()
            );
            return Err(NotWritable::new(len));
        }
        if self.shared {
            // unshare: move the data to fresh private storage
            let mut private = Vec::with_capacity(self.buffer.capacity());
            private.extend_from_slice(&self.buffer);
            self.buffer = private;
            self.shared = false;
            self.relocations += 1;
            trace!("TestBuffer relocated ({} relocations)", self.relocations);
        }
        let start = self.headroom as usize;
        Ok(&mut self.buffer.as_mut_slice()[start..start + len as usize])
    }
}

#[cfg(any(test, feature = "bolero"))]
mod contract {
    use crate::buffer::TestBuffer;
    use bolero::generator::bolero_generator::bounded::BoundedValue;
    use bolero::{Driver, TypeGenerator, ValueGenerator};
    use std::ops::Bound;

    /// The maximum length of a [`TestBuffer`] produced by the [`TypeGenerator`] implementation.
    pub const MAX_GENERATED_LEN: u16 = 128;

    /// [`ValueGenerator`] which produces [`TestBuffer`]s of a specified length.
    #[repr(transparent)]
    pub struct GenerateTestBufferOfLength(u16);

    impl GenerateTestBufferOfLength {
        /// Create a new `GenerateTestBufferOfLength` to generate test buffers of length `len`.
        ///
        /// If `len` is greater than [`TestBuffer::CAPACITY`], it will be set to
        /// [`TestBuffer::CAPACITY`].
        #[must_use]
        pub fn new(len: u16) -> Self {
            Self(len.min(TestBuffer::CAPACITY))
        }
    }

    impl ValueGenerator for GenerateTestBufferOfLength {
        type Output = TestBuffer;

        fn generate<D: Driver>(&self, driver: &mut D) -> Option<Self::Output> {
            let mut data = Vec::<u8>::with_capacity(self.0 as usize);
            for _ in 0..self.0 {
                data.push(driver.produce()?);
            }
            Some(TestBuffer::from_raw_data(&data))
        }
    }

    impl TypeGenerator for TestBuffer {
        fn generate<D: Driver>(driver: &mut D) -> Option<Self> {
            let len = u16::gen_bounded(
                driver,
                Bound::Included(&0),
                Bound::Included(&MAX_GENERATED_LEN),
            )?;
            GenerateTestBufferOfLength::new(len).generate(driver)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::buffer::{MakeWritable, NetworkOffset, TestBuffer};

    #[test]
    fn raw_data_is_visible() {
        let buffer = TestBuffer::from_raw_data(&[1, 2, 3, 4]);
        assert_eq!(buffer.as_ref(), &[1, 2, 3, 4]);
        assert_eq!(buffer.network_offset(), 0);
        assert_eq!(buffer.with_network_offset(2).network_offset(), 2);
    }

    #[test]
    fn shared_buffer_relocates_once() {
        let mut buffer = TestBuffer::from_raw_data(&[1, 2, 3, 4]).shared();
        assert!(buffer.is_shared());
        buffer.make_writable(2).unwrap()[1] = 0xff;
        assert_eq!(buffer.relocations(), 1);
        assert!(!buffer.is_shared());
        buffer.make_writable(4).unwrap();
        assert_eq!(buffer.relocations(), 1);
        assert_eq!(buffer.as_ref(), &[1, 0xff, 3, 4]);
    }

    #[test]
    fn writable_region_has_requested_len() {
        let mut buffer = TestBuffer::from_raw_data(&[0; 10]);
        assert_eq!(buffer.make_writable(7).unwrap().len(), 7);
        assert_eq!(buffer.make_writable(10).unwrap().len(), 10);
    }

    #[test]
    fn too_long_request_fails() {
        let mut buffer = TestBuffer::from_raw_data(&[0; 10]).shared();
        let err = buffer.make_writable(11).unwrap_err();
        assert_eq!(err.requested, 11);
        // a failed request must not unshare the data
        assert!(buffer.is_shared());
        assert_eq!(buffer.relocations(), 0);
    }

    #[test]
    fn refusing_buffer_fails() {
        let mut buffer = TestBuffer::from_raw_data(&[0; 10]).refusing_writable();
        assert!(buffer.make_writable(1).is_err());
        assert_eq!(buffer.as_ref(), &[0; 10]);
    }
}
