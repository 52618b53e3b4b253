// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Count the passes needed to drain the input of a multistage
//! interconnection network.
//!
//! See `lib.rs` for details.

use std::path::PathBuf;

use clap::Parser;
use minsim_network::buffer::MessageBuffer;
use minsim_network::network::Network;
use minsim_network::simulation::run_simulation;
use minsim_network::types::SimError;
use minsim_track::builder::{TrackerConfig, TrackersConfig, setup_trackers};
use minsim_track::entity::toplevel;
use minsim_track::{Tracker, error, info};
use sim_min::config::SimConfig;
use sim_min::traffic::fill_input_buffer;

/// Command-line arguments.
#[derive(Parser)]
#[command(about = "Multistage interconnection network evaluation application")]
struct Cli {
    /// Enable logging to the console.
    #[arg(long, default_value = "false")]
    stdout: bool,

    /// Level of log message to display.
    #[arg(long, default_value = "Info")]
    stdout_level: log::Level,

    /// Set a regular expression for which entites should have logging level set
    /// to `--stdout-level`. Others will have level set to `Error`.
    #[arg(long, default_value = "")]
    stdout_filter_regex: String,

    /// Write log messages to this file.
    #[arg(long)]
    log_file: Option<String>,

    /// Level of log message to write to the log file.
    #[arg(long, default_value = "Debug")]
    log_file_level: log::Level,

    /// TOML file of simulation settings. Values given on the command line
    /// or through `MINSIM_` environment variables take precedence.
    #[arg(long)]
    config_file: Option<PathBuf>,

    #[command(flatten)]
    sim: SimConfig,
}

fn setup_all_trackers(args: &Cli) -> Result<Tracker, SimError> {
    let config = TrackersConfig {
        stdout: TrackerConfig {
            enable: args.stdout,
            level: args.stdout_level,
            filter_regex: &args.stdout_filter_regex,
            file: None,
        },
        log_file: TrackerConfig {
            enable: args.log_file.is_some(),
            level: args.log_file_level,
            filter_regex: "",
            file: args.log_file.as_deref(),
        },
    };
    setup_trackers(&config).map_err(|e| SimError::InvalidConfig(e.to_string()))
}

fn main() -> Result<(), SimError> {
    let args = Cli::parse();
    let tracker = setup_all_trackers(&args)?;
    let config = SimConfig::load(args.config_file.as_deref(), &args.sim)?;

    let top = toplevel(&tracker, "top");
    info!(top ;
        "{} wires with {} messages each. Using traffic pattern {}. Random seed {}",
        config.num_wires(),
        config.messages_per_wire(),
        config.traffic_pattern(),
        config.seed(),
    );

    for topology in config.topology().topologies() {
        for policy in config.policy().policies() {
            let network = Network::new(
                &top,
                &format!("{topology}_{policy}"),
                config.num_wires(),
                topology,
            )?;
            let mut input = fill_input_buffer(
                &top,
                config.num_wires(),
                config.messages_per_wire(),
                config.traffic_pattern(),
                config.seed(),
            )?;
            let mut output = MessageBuffer::new(config.num_wires(), config.output_capacity())?;

            match run_simulation(network, &mut input, &mut output, policy) {
                Ok(passes) => {
                    println!("Passes required for {topology} network with {policy} priority: {passes}");
                }
                Err(e) => {
                    error!(top ; "{} network with {} priority failed: {}", topology, policy, e);
                    tracker.shutdown();
                    return Err(e);
                }
            }
        }
    }

    tracker.shutdown();
    Ok(())
}
