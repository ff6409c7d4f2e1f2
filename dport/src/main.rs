// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![deny(clippy::all, clippy::pedantic)]
#![deny(rustdoc::all)]
#![allow(rustdoc::missing_crate_level_docs)]

mod cli;
mod packet_hex;

use crate::cli::{CmdArgs, Parser};
use args::{USERSPACE_DESC, help, print, save};
use config::RuleConfig;
use net::buffer::TestBuffer;
use net::checksum::ipv4_transport_checksum;
use net::order::NetworkOrder;
use pipeline::{Match, RuleTable, TargetRegistry};
use rewriter::{DportTarget, LogTrace, PacketRewriter};
use tracectl::{LevelFilter, get_trace_ctl, trace_target};
use tracing::{debug, info, warn};

trace_target!("dport-cli", LevelFilter::WARN, &[]);

fn init_logging() {
    let tctl = get_trace_ctl();
    tctl.set_default_level(LevelFilter::WARN);
    // rule installation logs at INFO
    tctl.set_tag_level("pipeline", LevelFilter::WARN);
}

/// Run every packet through a table holding a single DPORT rule, as the framework would.
fn evaluate(config: &RuleConfig, args: &CmdArgs) -> color_eyre::Result<()> {
    let mut registry = TargetRegistry::<TestBuffer>::new();
    // decisions are only logged once the datapath tag is enabled
    let target = DportTarget::with_rewriter(PacketRewriter::<NetworkOrder, LogTrace>::default());
    registry.register(target)?;

    let mut table = RuleTable::new();
    let rule = table.append(
        &registry,
        Match::Any,
        &USERSPACE_DESC,
        &config.to_abi_bytes(),
    )?;
    debug!("Rule {rule} installed");

    let offset = args.network_offset();
    for text in args.packets() {
        let data = packet_hex::decode(text)?;
        let mut packet = TestBuffer::from_raw_data(&data).with_network_offset(offset);
        let verdict = table.evaluate(&mut packet);
        println!("verdict: {verdict}");
        if !verdict.is_continue() {
            continue;
        }
        println!("packet: {}", packet_hex::encode(packet.as_ref()));
        let ip = packet.as_ref().get(usize::from(offset)..).unwrap_or_default();
        match ipv4_transport_checksum(ip) {
            Ok(status) => println!("checksum: {status}"),
            Err(e) => warn!("Unable to inspect checksum: {e}"),
        }
    }

    table.flush();
    rewriter::unregister(&mut registry)?;
    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    /* parse cmd line args */
    let args = CmdArgs::parse();

    /* initialize logging */
    init_logging();
    if let Some(tracing) = args.tracing() {
        get_trace_ctl().setup_from_string(tracing)?;
    }
    if args.show_tracing_tags() {
        println!("{}", get_trace_ctl().targets_by_tag_string());
        return Ok(());
    }
    if args.show_tracing_targets() {
        println!("{}", get_trace_ctl().targets_string());
        return Ok(());
    }
    if args.tracing_config_generate() {
        println!("{}", get_trace_ctl().as_config_string());
        return Ok(());
    }
    if args.target_help() {
        print!("{}", help());
        return Ok(());
    }

    let config = args.rule_config()?;
    info!("Compiled rule: {config}");
    println!("rule:{}", print(&config));
    println!("save:{}", save(&config));

    if !args.packets().is_empty() {
        evaluate(&config, &args)?;
    }
    Ok(())
}
