// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Display implementations

use crate::control::{TargetCfg, TargetCfgDb};
use crate::targets::TargetKind;
use std::fmt::{Display, Formatter};

macro_rules! TARGET_FMT {
    () => {
        "{:>16} │ {:<40} │ {:>8} │ {}"
    };
}

impl Display for TargetCfg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            TargetKind::Module => self.name,
            TargetKind::Custom => "custom",
        };
        write!(
            f,
            TARGET_FMT!(),
            kind,
            self.target,
            self.level,
            self.tags.join(",")
        )
    }
}

impl Display for TargetCfgDb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n ──────── Tracing targets ────────")?;
        writeln!(f, TARGET_FMT!(), "NAME", "TARGET", "LEVEL", "TAGS")?;
        for target in self.targets.values() {
            writeln!(f, "{target}")?;
        }
        write!(f, TARGET_FMT!(), "(default)", "--", self.level, "--")
    }
}

/// Targets grouped under each of the tags which select them
pub(crate) struct TargetCfgDbByTag<'a>(pub(crate) &'a TargetCfgDb);

impl Display for TargetCfgDbByTag<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n ──────── Tracing targets by tag ────────")?;
        let db = self.0;
        for tag in db.tags.values() {
            writeln!(f, " {}:", tag.tag)?;
            for target in db
                .targets
                .values()
                .filter(|target| tag.targets.contains(target.target))
            {
                writeln!(f, "      {:<48} : {}", target.target, target.level)?;
            }
        }
        Ok(())
    }
}
