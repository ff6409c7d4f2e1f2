// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use crate::Verdict;
use net::buffer::PacketBufferMut;
use std::fmt::{Display, Formatter};

/// Alignment of the configuration blobs stored by the framework
pub const XT_ALIGNMENT: usize = 8;

/// Round `size` up to the alignment at which the framework stores configuration blobs.
#[must_use]
pub const fn xt_align(size: usize) -> usize {
    size.div_ceil(XT_ALIGNMENT) * XT_ALIGNMENT
}

/// The protocol family a target registers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Any family
    Unspec,
    /// IPv4
    Ipv4,
    /// IPv6
    Ipv6,
}

impl Display for Family {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Family::Unspec => write!(f, "unspec"),
            Family::Ipv4 => write!(f, "ipv4"),
            Family::Ipv6 => write!(f, "ipv6"),
        }
    }
}

/// What binds the rule compiler of a target to its packet processing side.
///
/// Both sides publish a descriptor; name, revision and family must agree exactly and so must
/// the aligned size of the configuration blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetDesc {
    /// Name of the target, as used in rules
    pub name: &'static str,
    /// Revision of the configuration layout
    pub revision: u8,
    /// Protocol family
    pub family: Family,
    /// Unpadded size of the configuration blob
    pub size: usize,
}

impl TargetDesc {
    /// Size of the configuration blob as stored by the framework.
    #[must_use]
    pub const fn aligned_size(&self) -> usize {
        xt_align(self.size)
    }
}

impl Display for TargetDesc {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} rev {} ({}, {} octets)",
            self.name,
            self.revision,
            self.family,
            self.aligned_size()
        )
    }
}

/// A rule entry was refused by its target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{target}: invalid rule entry: {reason}")]
pub struct CheckError {
    target: &'static str,
    reason: String,
}

impl CheckError {
    /// Create a [`CheckError`] for `target`.
    #[must_use]
    pub fn new(target: &'static str, reason: impl Display) -> Self {
        Self {
            target,
            reason: reason.to_string(),
        }
    }

    /// The target which refused the entry.
    #[must_use]
    pub fn target(&self) -> &'static str {
        self.target
    }
}

/// The trait a filtering target implements.
///
/// A target is shared by every rule which references it and may be evaluated concurrently on
/// many packets, hence the `&self` receivers and the `Send + Sync` bound.
pub trait Target<Buf: PacketBufferMut>: Send + Sync {
    /// Describe the target.
    fn desc(&self) -> TargetDesc;

    /// Validate the configuration blob of a rule before it is installed.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckError`] if the rule must not be installed.
    fn check_entry(&self, _info: &[u8]) -> Result<(), CheckError> {
        Ok(())
    }

    /// Process one packet, given the configuration blob of the rule which matched it.
    fn target(&self, packet: &mut Buf, info: &[u8]) -> Verdict;
}

#[cfg(test)]
mod tests {
    use crate::target::xt_align;

    #[test]
    fn alignment() {
        assert_eq!(xt_align(0), 0);
        assert_eq!(xt_align(1), 8);
        assert_eq!(xt_align(2), 8);
        assert_eq!(xt_align(8), 8);
        assert_eq!(xt_align(9), 16);
    }
}
