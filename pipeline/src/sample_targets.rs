// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use crate::{CheckError, Family, Target, TargetDesc, Verdict};
use net::buffer::PacketBufferMut;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Target which drops every packet
pub struct DropAll;

impl DropAll {
    /// Descriptor of [`DropAll`]
    pub const DESC: TargetDesc = TargetDesc {
        name: "DROP",
        revision: 0,
        family: Family::Unspec,
        size: 0,
    };
}

impl<Buf: PacketBufferMut> Target<Buf> for DropAll {
    fn desc(&self) -> TargetDesc {
        Self::DESC
    }
    fn target(&self, _packet: &mut Buf, _info: &[u8]) -> Verdict {
        trace!("Dropping packet");
        Verdict::Drop
    }
}

/// Target which lets every packet continue, unmodified
pub struct Passthrough;

impl Passthrough {
    /// Descriptor of [`Passthrough`]
    pub const DESC: TargetDesc = TargetDesc {
        name: "CONTINUE",
        revision: 0,
        family: Family::Unspec,
        size: 0,
    };
}

impl<Buf: PacketBufferMut> Target<Buf> for Passthrough {
    fn desc(&self) -> TargetDesc {
        Self::DESC
    }
    fn target(&self, _packet: &mut Buf, _info: &[u8]) -> Verdict {
        Verdict::Continue
    }
}

/// Target which adds the increment found in its configuration (a native `u32`) to a counter
/// shared by all the rules using it, and lets packets continue.
#[derive(Debug, Default)]
pub struct CountHits {
    hits: AtomicU64,
}

impl CountHits {
    /// Descriptor of [`CountHits`]
    pub const DESC: TargetDesc = TargetDesc {
        name: "COUNT",
        revision: 0,
        family: Family::Ipv4,
        size: size_of::<u32>(),
    };

    /// Build the configuration of a rule using this target.
    #[must_use]
    pub fn config(increment: u32) -> [u8; 4] {
        increment.to_ne_bytes()
    }

    fn increment(info: &[u8]) -> Option<u32> {
        info.first_chunk::<4>().map(|bytes| u32::from_ne_bytes(*bytes))
    }

    /// Current value of the counter.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }
}

impl<Buf: PacketBufferMut> Target<Buf> for CountHits {
    fn desc(&self) -> TargetDesc {
        Self::DESC
    }
    fn check_entry(&self, info: &[u8]) -> Result<(), CheckError> {
        match Self::increment(info) {
            None => Err(CheckError::new(Self::DESC.name, "missing increment")),
            Some(0) => Err(CheckError::new(Self::DESC.name, "increment must not be zero")),
            Some(_) => Ok(()),
        }
    }
    fn target(&self, _packet: &mut Buf, info: &[u8]) -> Verdict {
        if let Some(increment) = Self::increment(info) {
            self.hits.fetch_add(u64::from(increment), Ordering::Relaxed);
        }
        Verdict::Continue
    }
}
