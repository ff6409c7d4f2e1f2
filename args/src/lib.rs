// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![deny(clippy::all, clippy::pedantic)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Rule compiler of the DPORT target: turns the `--to-port` option into a [`config::RuleConfig`],
//! renders configurations back to rule text, and reloads saved rule text.

mod cli;
mod compiler;

pub use cli::DportArgs;
pub use clap::Parser;
pub use compiler::{
    RuleCompiler, USERSPACE_DESC, finalize_rule, help, parse_option, parse_rule_text, print,
    render, save,
};
