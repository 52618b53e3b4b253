// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

#![doc(test(attr(warn(unused))))]

//! `MINSIM` - Multistage Interconnection Network SIMulator
//!
//! This library models a network of `W` input wires and `W` output wires
//! connected through `log2(W)` stages of 2x2 switches. Messages waiting on
//! the input wires are routed through the network in _passes_: each pass
//! every input wire gets a chance to claim the switches on the path to the
//! destination of its next message, and all messages whose path could be
//! claimed are then delivered.
//!
//! The number of passes needed to deliver a set of messages depends on the
//! [topology](crate::topology::Topology) of the network and on the
//! [priority policy](crate::routing::PriorityPolicy) used to decide which
//! wire wins when two routes need the same switch in different positions.
//!
//! # Simple Application
//!
//! ```rust
//! use minsim_network::buffer::MessageBuffer;
//! use minsim_network::message::Message;
//! use minsim_network::network::Network;
//! use minsim_network::routing::PriorityPolicy;
//! use minsim_network::simulation::run_simulation;
//! use minsim_network::topology::Topology;
//! use minsim_track::entity::toplevel;
//! use minsim_track::tracker::dev_null_tracker;
//!
//! let top = toplevel(&dev_null_tracker(), "top");
//! let network = Network::new(&top, "network", 8, Topology::Butterfly).unwrap();
//! let mut input = MessageBuffer::new(8, 4).unwrap();
//! let mut output = MessageBuffer::new(8, 32).unwrap();
//! for wire in 0..8 {
//!     input.push(wire, Message::new(wire, 0, wire)).unwrap();
//! }
//!
//! // Every message is for output wire 0, so only one can be sent per pass
//! let passes = run_simulation(network, &mut input, &mut output, PriorityPolicy::RoundRobin).unwrap();
//! assert_eq!(passes, 8);
//! assert_eq!(output.len(0), 8);
//! ```

pub mod bits;
pub mod buffer;
pub mod message;
pub mod network;
pub mod routing;
pub mod simulation;
pub mod test_helpers;
pub mod topology;
pub mod transmit;
pub mod types;
