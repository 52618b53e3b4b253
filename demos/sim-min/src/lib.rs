// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Compare topologies and priority policies of a multistage interconnection
//! network.
//!
//! Every input wire is filled with the same number of messages, whose
//! destinations are chosen by a [traffic pattern](traffic::TrafficPattern).
//! The same traffic is then run through each selected
//! [topology](minsim_network::topology::Topology) with each selected
//! [priority policy](minsim_network::routing::PriorityPolicy) and the number
//! of passes needed to deliver all messages is reported.
//!
//! # Configuration
//!
//! Settings are taken, from lowest to highest precedence, from:
//!  - built-in defaults
//!  - a TOML file given with `--config-file`
//!  - `MINSIM_` environment variables (e.g. `MINSIM_NUM_WIRES=64`)
//!  - command-line arguments
//!
//! A configuration file uses the same names as the command-line arguments
//! with underscores, for example:
//! ```toml
//! num_wires = 64
//! messages_per_wire = 32
//! topology = "butterfly"
//! policy = "all"
//! traffic_pattern = "bit-reversal"
//! seed = 7
//! ```

pub mod config;
pub mod traffic;
