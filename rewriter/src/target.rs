// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The DPORT target as seen by the filtering framework

use crate::engine::PacketRewriter;
use crate::trace::{NoTrace, Trace};
use config::{RuleConfig, TARGET_NAME, TARGET_REVISION};
use net::buffer::PacketBufferMut;
use net::order::{NetworkOrder, WireOrder};
use pipeline::{CheckError, Family, RegistryError, Target, TargetDesc, TargetRegistry, Verdict};
use tracectl::trace_target;
use tracing::{debug, warn};

trace_target!("dport", tracectl::LevelFilter::INFO, &["dport"]);

/// [`Target`] which runs a [`PacketRewriter`] with the configuration of the matching rule.
pub struct DportTarget<O: WireOrder = NetworkOrder, T: Trace = NoTrace> {
    rewriter: PacketRewriter<O, T>,
}

impl DportTarget {
    /// Descriptor of the packet processing side of the target
    pub const DESC: TargetDesc = TargetDesc {
        name: TARGET_NAME,
        revision: TARGET_REVISION,
        family: Family::Ipv4,
        size: RuleConfig::SIZE,
    };

    /// Create a [`DportTarget`] writing ports in network byte order, without tracing.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_rewriter(PacketRewriter::new())
    }
}

impl<O: WireOrder, T: Trace + Default> Default for DportTarget<O, T> {
    fn default() -> Self {
        Self::with_rewriter(PacketRewriter::default())
    }
}

impl<O: WireOrder, T: Trace> DportTarget<O, T> {
    /// Create a [`DportTarget`] around a given engine.
    #[must_use]
    pub const fn with_rewriter(rewriter: PacketRewriter<O, T>) -> Self {
        Self { rewriter }
    }

    /// The engine of this target.
    #[must_use]
    pub const fn rewriter(&self) -> &PacketRewriter<O, T> {
        &self.rewriter
    }
}

impl<Buf: PacketBufferMut, O: WireOrder, T: Trace> Target<Buf> for DportTarget<O, T> {
    fn desc(&self) -> TargetDesc {
        DportTarget::DESC
    }

    // the target may be referenced from any table and any hook
    fn check_entry(&self, info: &[u8]) -> Result<(), CheckError> {
        let config =
            RuleConfig::from_abi_bytes(info).map_err(|e| CheckError::new(TARGET_NAME, e))?;
        debug!("Accepting rule entry: {config}");
        Ok(())
    }

    fn target(&self, packet: &mut Buf, info: &[u8]) -> Verdict {
        // entries are checked on installation, so the blob always decodes
        let config = RuleConfig::from_abi_bytes(info).unwrap_or_default();
        self.rewriter.rewrite(&config, packet)
    }
}

/// Register the default [`DportTarget`] in `registry`.
///
/// # Errors
///
/// Fails if the target is already registered.
pub fn register<Buf: PacketBufferMut>(
    registry: &mut TargetRegistry<Buf>,
) -> Result<TargetDesc, RegistryError> {
    registry.register(DportTarget::new())
}

/// Remove the [`DportTarget`] from `registry`.
///
/// # Errors
///
/// Fails if the target is not registered or if rules still use it.
pub fn unregister<Buf: PacketBufferMut>(
    registry: &mut TargetRegistry<Buf>,
) -> Result<(), RegistryError> {
    registry.unregister(&DportTarget::DESC).inspect_err(|e| {
        warn!("Failed to unregister {TARGET_NAME}: {e}");
    })
}
