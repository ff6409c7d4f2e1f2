// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The binary per-rule configuration of the DPORT target.

use crate::errors::ConfigError;
use static_assertions::{assert_eq_align, assert_eq_size};
use std::fmt::Display;
use std::num::NonZero;

/// Per-rule configuration: the port that matching packets get as destination port.
///
/// A zero port means "unset": such a rule is inert and lets every packet through untouched.
/// The layout is shared verbatim with the host framework, which stores it as an opaque blob
/// (see [`RuleConfig::to_abi_bytes`]).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RuleConfig {
    to_port: u16,
}

// producer and consumer must agree on this layout
assert_eq_size!(RuleConfig, u16);
assert_eq_align!(RuleConfig, u16);

impl RuleConfig {
    /// Size of the unpadded configuration blob
    pub const SIZE: usize = size_of::<RuleConfig>();

    /// An inert configuration
    pub const UNSET: RuleConfig = RuleConfig { to_port: 0 };

    /// Build a configuration rewriting destination ports to `to_port`.
    #[must_use]
    pub const fn new(to_port: NonZero<u16>) -> RuleConfig {
        RuleConfig {
            to_port: to_port.get(),
        }
    }

    /// The target port, or `None` if the configuration is inert.
    #[must_use]
    pub const fn to_port(&self) -> Option<NonZero<u16>> {
        NonZero::new(self.to_port)
    }

    /// Tells if this configuration leaves every packet untouched.
    #[must_use]
    pub const fn is_inert(&self) -> bool {
        self.to_port == 0
    }

    /// Encode as the blob stored by the host framework (host byte order).
    #[must_use]
    pub const fn to_abi_bytes(&self) -> [u8; RuleConfig::SIZE] {
        self.to_port.to_ne_bytes()
    }

    /// Decode the blob stored by the host framework. Padding past [`RuleConfig::SIZE`] is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Fails with [`ConfigError::BadTargetSize`] if the blob is shorter than
    /// [`RuleConfig::SIZE`].
    pub fn from_abi_bytes(blob: &[u8]) -> Result<RuleConfig, ConfigError> {
        let bytes = blob
            .get(..RuleConfig::SIZE)
            .and_then(|b| <[u8; RuleConfig::SIZE]>::try_from(b).ok())
            .ok_or(ConfigError::BadTargetSize {
                expected: RuleConfig::SIZE,
                actual: blob.len(),
            })?;
        Ok(RuleConfig {
            to_port: u16::from_ne_bytes(bytes),
        })
    }
}

impl From<NonZero<u16>> for RuleConfig {
    fn from(to_port: NonZero<u16>) -> Self {
        RuleConfig::new(to_port)
    }
}

impl Display for RuleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_port() {
            Some(port) => write!(f, "to-port {port}"),
            None => write!(f, "to-port unset"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::errors::ConfigError;
    use crate::rule::RuleConfig;
    use std::num::NonZero;

    #[test]
    fn default_is_inert() {
        assert!(RuleConfig::default().is_inert());
        assert_eq!(RuleConfig::default(), RuleConfig::UNSET);
        assert_eq!(RuleConfig::UNSET.to_port(), None);
    }

    #[test]
    fn blob_is_host_order_u16() {
        let config = RuleConfig::new(NonZero::new(8080).unwrap());
        assert_eq!(config.to_abi_bytes(), 8080u16.to_ne_bytes());
        assert_eq!(RuleConfig::SIZE, 2);
    }

    #[test]
    fn padded_blob_decodes() {
        let mut blob = [0xaa_u8; 8];
        blob[..2].copy_from_slice(&443u16.to_ne_bytes());
        let config = RuleConfig::from_abi_bytes(&blob).unwrap();
        assert_eq!(config.to_port().map(NonZero::get), Some(443));
    }

    #[test]
    fn zero_blob_is_inert() {
        assert!(RuleConfig::from_abi_bytes(&[0; 8]).unwrap().is_inert());
    }

    #[test]
    fn short_blob_is_rejected() {
        assert_eq!(
            RuleConfig::from_abi_bytes(&[1]),
            Err(ConfigError::BadTargetSize {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn any_blob_decodes_to_its_port() {
        bolero::check!()
            .with_type()
            .cloned()
            .for_each(|port: u16| {
                let config = RuleConfig::from_abi_bytes(&port.to_ne_bytes()).unwrap();
                assert_eq!(config.is_inert(), port == 0);
                assert_eq!(config.to_port().map_or(0, NonZero::get), port);
            });
    }

    #[test]
    fn display() {
        let config = RuleConfig::new(NonZero::new(22).unwrap());
        assert_eq!(config.to_string(), "to-port 22");
        assert_eq!(RuleConfig::UNSET.to_string(), "to-port unset");
    }
}
