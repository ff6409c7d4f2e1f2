// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use crate::{CheckError, RegistryError, Target, TargetDesc, TargetRegistry, Verdict};
use net::buffer::{PacketBuffer, PacketBufferMut};
use net::ip::NextHeader;
use net::ipv4::Ipv4Summary;
use ordermap::OrderMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Identifier of a rule in a [`RuleTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(u64);

impl Display for RuleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Condition a packet must meet for a rule's target to be invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    /// Every packet
    Any,
    /// IPv4 packets carrying the given protocol
    Protocol(NextHeader),
}

impl Match {
    /// Whether `packet` meets this condition.
    #[must_use]
    pub fn matches<Buf: PacketBuffer>(&self, packet: &Buf) -> bool {
        match self {
            Match::Any => true,
            Match::Protocol(proto) => packet
                .as_ref()
                .get(usize::from(packet.network_offset())..)
                .and_then(|header| Ipv4Summary::read(header).ok())
                .is_some_and(|summary| summary.protocol() == *proto),
        }
    }
}

impl Display for Match {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Match::Any => write!(f, "any"),
            Match::Protocol(proto) => write!(f, "-p {proto}"),
        }
    }
}

/// Errors which may occur when modifying a [`RuleTable`]
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The target could not be resolved
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// The target refused the rule
    #[error(transparent)]
    Check(#[from] CheckError),
    /// No rule with this id
    #[error("No such rule: {0}")]
    NoSuchRule(RuleId),
    /// The configuration does not fit in the size the target registered
    #[error("Configuration of {target} is {actual} octets, it may not exceed {max}")]
    InfoTooLarge {
        /// name of the target
        target: &'static str,
        /// size of the configuration given
        actual: usize,
        /// aligned size of the target configuration
        max: usize,
    },
}

struct Rule<Buf: PacketBufferMut> {
    matcher: Match,
    target: Arc<dyn Target<Buf>>,
    info: Vec<u8>,
}

/// An ordered list of rules, each pairing a [`Match`] with a target and its configuration.
///
/// Modifications take `&mut self`; evaluation takes `&self` and may run concurrently on as
/// many packets as there are threads.
pub struct RuleTable<Buf: PacketBufferMut> {
    rules: OrderMap<RuleId, Rule<Buf>>,
    next_id: u64,
}

impl<Buf: PacketBufferMut> Default for RuleTable<Buf> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Buf: PacketBufferMut> RuleTable<Buf> {
    /// Create an empty [`RuleTable`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: OrderMap::new(),
            next_id: 0,
        }
    }

    /// Append a rule at the end of the table.
    ///
    /// The target is resolved from `desc` in `registry` and `config` is stored padded to the
    /// aligned size of the target configuration.
    ///
    /// # Errors
    ///
    /// Fails if the target cannot be resolved, if `config` is larger than the target
    /// configuration, or if the target refuses the entry. The table is unchanged in that case.
    pub fn append(
        &mut self,
        registry: &TargetRegistry<Buf>,
        matcher: Match,
        desc: &TargetDesc,
        config: &[u8],
    ) -> Result<RuleId, TableError> {
        let target = registry.lookup(desc)?;
        let max = desc.aligned_size();
        if config.len() > max {
            return Err(TableError::InfoTooLarge {
                target: desc.name,
                actual: config.len(),
                max,
            });
        }
        let mut info = config.to_vec();
        info.resize(max, 0);
        if let Err(e) = target.check_entry(&info) {
            warn!("Refusing rule: {e}");
            return Err(e.into());
        }

        let id = RuleId(self.next_id);
        self.next_id += 1;
        self.rules.insert(
            id,
            Rule {
                matcher,
                target,
                info,
            },
        );
        info!("Installed rule {id}: {matcher} -j {}", desc.name);
        Ok(id)
    }

    /// Remove a rule.
    ///
    /// # Errors
    ///
    /// Fails with [`TableError::NoSuchRule`] if there is no rule `id`.
    pub fn delete(&mut self, id: RuleId) -> Result<(), TableError> {
        if self.rules.remove(&id).is_none() {
            return Err(TableError::NoSuchRule(id));
        }
        info!("Deleted rule {id}");
        Ok(())
    }

    /// Remove all the rules.
    pub fn flush(&mut self) {
        debug!("Flushing {} rules", self.rules.len());
        self.rules.clear();
    }

    /// Number of rules in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rules of the table, in evaluation order.
    pub fn rules(&self) -> impl Iterator<Item = (RuleId, Match, TargetDesc)> + '_ {
        self.rules
            .iter()
            .map(|(id, rule)| (*id, rule.matcher, rule.target.desc()))
    }

    /// Evaluate one packet against the table.
    ///
    /// Rules whose condition the packet meets invoke their target in order. A [`Verdict::Drop`]
    /// stops the evaluation; the packet continues if it reaches the end of the table.
    pub fn evaluate(&self, packet: &mut Buf) -> Verdict {
        for rule in self.rules.values() {
            if !rule.matcher.matches(packet) {
                continue;
            }
            if rule.target.target(packet, &rule.info) == Verdict::Drop {
                return Verdict::Drop;
            }
        }
        Verdict::Continue
    }

    /// Evaluate a batch of packets, yielding those which were not dropped.
    pub fn process<'a, Input: Iterator<Item = Buf> + 'a>(
        &'a self,
        input: Input,
    ) -> impl Iterator<Item = Buf> + 'a {
        input.filter_map(move |mut packet| {
            self.evaluate(&mut packet).is_continue().then_some(packet)
        })
    }
}
