// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use std::fmt::{Display, Formatter};

/// The decision a target returns to the framework for one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Continue processing the packet through the rest of the pipeline
    Continue,
    /// Discard the packet. This is terminal.
    Drop,
}

impl Verdict {
    /// Whether the packet survives this verdict.
    #[must_use]
    pub const fn is_continue(self) -> bool {
        matches!(self, Verdict::Continue)
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Continue => write!(f, "CONTINUE"),
            Verdict::Drop => write!(f, "DROP"),
        }
    }
}
