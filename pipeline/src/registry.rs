// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use crate::{Family, Target, TargetDesc};
use net::buffer::PacketBufferMut;
use ordermap::OrderMap;
use std::sync::Arc;
use tracing::{debug, info};

type TargetKey = (&'static str, u8, Family);

fn key(desc: &TargetDesc) -> TargetKey {
    (desc.name, desc.revision, desc.family)
}

/// Errors which may occur when registering or resolving targets
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A target with the same name, revision and family is already registered
    #[error("Duplicate target: {0}")]
    DuplicateTarget(String),
    /// No target matches the name, revision and family
    #[error("No such target: {name} rev {revision} ({family})")]
    NoSuchTarget {
        /// requested name
        name: String,
        /// requested revision
        revision: u8,
        /// requested family
        family: Family,
    },
    /// The rule compiler and the target disagree on the size of the configuration
    #[error("Version skew for target {name}: rule carries {expected} octets, target expects {actual}")]
    VersionSkew {
        /// name of the target
        name: String,
        /// aligned size announced by the rule compiler
        expected: usize,
        /// aligned size announced by the target
        actual: usize,
    },
    /// The target cannot be unregistered while rules reference it
    #[error("Target {0} is in use")]
    InUse(String),
}

impl RegistryError {
    fn no_such_target(desc: &TargetDesc) -> Self {
        RegistryError::NoSuchTarget {
            name: desc.name.to_string(),
            revision: desc.revision,
            family: desc.family,
        }
    }
}

/// The set of targets known to the framework, keyed by name, revision and family.
///
/// Registration and removal take `&mut self`, so they are serialized by whoever owns the
/// registry; lookups only need `&self`.
pub struct TargetRegistry<Buf: PacketBufferMut> {
    targets: OrderMap<TargetKey, Arc<dyn Target<Buf>>>,
}

impl<Buf: PacketBufferMut> Default for TargetRegistry<Buf> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Buf: PacketBufferMut> TargetRegistry<Buf> {
    /// Create an empty [`TargetRegistry`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            targets: OrderMap::new(),
        }
    }

    /// Register a target.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::DuplicateTarget`] if the same name, revision and family are
    /// already registered.
    pub fn register<T: Target<Buf> + 'static>(
        &mut self,
        target: T,
    ) -> Result<TargetDesc, RegistryError> {
        self.register_shared(Arc::new(target))
    }

    /// Register a target which the caller keeps a reference to.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::DuplicateTarget`] if the same name, revision and family are
    /// already registered.
    pub fn register_shared(
        &mut self,
        target: Arc<dyn Target<Buf>>,
    ) -> Result<TargetDesc, RegistryError> {
        let desc = target.desc();
        if self.targets.contains_key(&key(&desc)) {
            return Err(RegistryError::DuplicateTarget(desc.to_string()));
        }
        self.targets.insert(key(&desc), target);
        info!("Registered target {desc}");
        Ok(desc)
    }

    /// Remove a target from the registry.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::NoSuchTarget`] if the target is not registered, or with
    /// [`RegistryError::InUse`] if a rule (or anyone else) still holds a reference to it.
    pub fn unregister(&mut self, desc: &TargetDesc) -> Result<(), RegistryError> {
        let Some(target) = self.targets.get(&key(desc)) else {
            return Err(RegistryError::no_such_target(desc));
        };
        if Arc::strong_count(target) > 1 {
            return Err(RegistryError::InUse(desc.to_string()));
        }
        self.targets.remove(&key(desc));
        info!("Unregistered target {desc}");
        Ok(())
    }

    /// Resolve the target a rule compiler refers to.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::NoSuchTarget`] if no target matches the name, revision and
    /// family of `desc`, or with [`RegistryError::VersionSkew`] if the aligned sizes differ.
    pub fn lookup(&self, desc: &TargetDesc) -> Result<Arc<dyn Target<Buf>>, RegistryError> {
        let target = self
            .targets
            .get(&key(desc))
            .ok_or_else(|| RegistryError::no_such_target(desc))?;
        let actual = target.desc().aligned_size();
        if actual != desc.aligned_size() {
            debug!("Refusing {desc}: target expects {actual} octets");
            return Err(RegistryError::VersionSkew {
                name: desc.name.to_string(),
                expected: desc.aligned_size(),
                actual,
            });
        }
        Ok(target.clone())
    }

    /// Number of registered targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no target is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::sample_targets::{CountHits, DropAll};
    use crate::{Family, RegistryError, TargetDesc, TargetRegistry};
    use net::buffer::TestBuffer;

    #[test]
    fn register_and_lookup() {
        let mut registry = TargetRegistry::<TestBuffer>::new();
        let desc = registry.register(DropAll).unwrap();
        assert_eq!(desc, DropAll::DESC);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup(&DropAll::DESC).unwrap().desc(), DropAll::DESC);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = TargetRegistry::<TestBuffer>::new();
        registry.register(DropAll).unwrap();
        assert!(matches!(
            registry.register(DropAll),
            Err(RegistryError::DuplicateTarget(_))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn lookup_checks_name_revision_and_family() {
        let mut registry = TargetRegistry::<TestBuffer>::new();
        registry.register(DropAll).unwrap();
        for desc in [
            TargetDesc {
                name: "ACCEPT",
                ..DropAll::DESC
            },
            TargetDesc {
                revision: 1,
                ..DropAll::DESC
            },
            TargetDesc {
                family: Family::Ipv6,
                ..DropAll::DESC
            },
        ] {
            assert!(matches!(
                registry.lookup(&desc),
                Err(RegistryError::NoSuchTarget { .. })
            ));
        }
    }

    #[test]
    fn size_skew_is_rejected() {
        let mut registry = TargetRegistry::<TestBuffer>::new();
        registry.register(CountHits::default()).unwrap();
        // same aligned size is fine
        let padded = TargetDesc {
            size: 8,
            ..CountHits::DESC
        };
        assert!(registry.lookup(&padded).is_ok());
        let skewed = TargetDesc {
            size: 9,
            ..CountHits::DESC
        };
        assert_eq!(
            registry.lookup(&skewed).err(),
            Some(RegistryError::VersionSkew {
                name: "COUNT".to_string(),
                expected: 16,
                actual: 8
            })
        );
    }

    #[test]
    fn unregister() {
        let mut registry = TargetRegistry::<TestBuffer>::new();
        registry.register(DropAll).unwrap();

        let held = registry.lookup(&DropAll::DESC).unwrap();
        assert!(matches!(
            registry.unregister(&DropAll::DESC),
            Err(RegistryError::InUse(_))
        ));
        drop(held);

        registry.unregister(&DropAll::DESC).unwrap();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.unregister(&DropAll::DESC),
            Err(RegistryError::NoSuchTarget { .. })
        ));
    }
}
