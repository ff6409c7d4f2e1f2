// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

pub use args::Parser;
use args::{DportArgs, parse_rule_text};
use config::{ConfigError, RuleConfig};

#[derive(Parser, Debug)]
#[command(name = "dport")]
#[command(version = "0.1")]
#[command(about = "Compile a DPORT rule and try it on packets", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct CmdArgs {
    #[command(flatten)]
    dport: DportArgs,

    #[arg(
        long,
        value_name = "rule text",
        conflicts_with = "to_port",
        help = "Saved rule text to reload instead of --to-port, e.g. \"to-port 8080\""
    )]
    rule: Option<String>,

    #[arg(
        long,
        value_name = "hex",
        help = "IPv4 packet to run through the rule, as hex octets (separators ' ', ':' and '-' are ignored)"
    )]
    packet: Vec<String>,

    #[arg(
        long,
        value_name = "octets",
        default_value_t = 0,
        help = "Offset of the IPv4 header in the packets given with --packet"
    )]
    network_offset: u16,

    #[arg(long, default_value_t = false, help = "Show the options of the target and exit")]
    target_help: bool,

    #[arg(
        long,
        default_value_t = false,
        help = "Show the available tracing tags and exit"
    )]
    show_tracing_tags: bool,

    #[arg(
        long,
        default_value_t = false,
        help = "Show configurable tracing targets and exit"
    )]
    show_tracing_targets: bool,

    #[arg(long, help = "generate tracing configuration as a string and exit")]
    tracing_config_generate: bool,

    #[arg(
        long,
        value_name = "tracing configuration",
        help = "Tracing config string as comma-separated sequence of tag=level, with level one in [off,error,warn,info,debug,trace].
Passing default=level sets the default log-level.
Passing all=level allows setting the log-level of all targets to level.
E.g. default=error,all=info,datapath=trace will set the default target to error, and all the registered targets to info, but trace every packet decision"
    )]
    tracing: Option<String>,
}

impl CmdArgs {
    /// The rule configuration, from `--rule` if given, from `--to-port` otherwise.
    pub fn rule_config(&self) -> Result<RuleConfig, ConfigError> {
        match &self.rule {
            Some(text) => parse_rule_text(text),
            None => self.dport.compile(),
        }
    }
    pub fn packets(&self) -> &[String] {
        &self.packet
    }
    pub fn network_offset(&self) -> u16 {
        self.network_offset
    }
    pub fn target_help(&self) -> bool {
        self.target_help
    }
    pub fn show_tracing_tags(&self) -> bool {
        self.show_tracing_tags
    }
    pub fn show_tracing_targets(&self) -> bool {
        self.show_tracing_targets
    }
    pub fn tracing_config_generate(&self) -> bool {
        self.tracing_config_generate
    }
    pub fn tracing(&self) -> Option<&String> {
        self.tracing.as_ref()
    }
}
