// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Drive a network until all input messages have been delivered.
//!
//! Each pass resets the network, routes the next message of every input
//! wire in the order chosen by the priority policy and then transmits all
//! messages that were routed. Passes are repeated until the input buffer is
//! empty.
//!
//! # Example
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
//! let network = Network::new(&top, "network", 4, Topology::Baseline).unwrap();
//! let mut input = MessageBuffer::new(4, 2).unwrap();
//! let mut output = MessageBuffer::new(4, 8).unwrap();
//! input.push(0, Message::new(0, 3, "hello")).unwrap();
//! input.push(1, Message::new(1, 0, "world")).unwrap();
//!
//! let passes = run_simulation(network, &mut input, &mut output, PriorityPolicy::Static).unwrap();
//! assert_eq!(passes, 1);
//! assert_eq!(output.len(3), 1);
//! assert_eq!(output.len(0), 1);
//! ```

use std::rc::Rc;

use minsim_track::entity::{Entity, GetEntity};
use minsim_track::{debug, info, value};

use crate::buffer::MessageBuffer;
use crate::message::Routable;
use crate::network::Network;
use crate::routing::{Prioritise, PriorityPolicy, route_pass};
use crate::sim_error;
use crate::transmit::transmit_pass;
use crate::types::{SimError, SimResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimulationState {
    /// No messages were pending at the end of the last pass
    #[default]
    Idle,

    /// Passes are being run to empty the input buffer
    Draining,
}

/// What happened during one pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassReport {
    /// Index of the pass, counted from zero
    pub pass: usize,

    /// Number of messages delivered to the output buffer
    pub transmitted: usize,

    /// Input wires whose message could not be routed
    pub blocked: Vec<usize>,
}

pub struct Simulation {
    network: Network,
    policy: Box<dyn Prioritise>,
    state: SimulationState,
    num_passes: usize,
}

impl Simulation {
    #[must_use]
    pub fn new(network: Network, policy: Box<dyn Prioritise>) -> Self {
        Self {
            network,
            policy,
            state: SimulationState::Idle,
            num_passes: 0,
        }
    }

    #[must_use]
    pub fn with_policy(network: Network, policy: PriorityPolicy) -> Self {
        Self::new(network, policy.build())
    }

    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    #[must_use]
    pub fn into_network(self) -> Network {
        self.network
    }

    #[must_use]
    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Number of passes run since the simulation was created.
    #[must_use]
    pub fn num_passes(&self) -> usize {
        self.num_passes
    }

    fn check_buffers<T>(&self, input: &MessageBuffer<T>, output: &MessageBuffer<T>) -> SimResult {
        let num_wires = self.network.num_wires();
        for (name, buffer_wires) in [("input", input.num_wires()), ("output", output.num_wires())] {
            if buffer_wires != num_wires {
                return sim_error!(format!(
                    "The {name} buffer has {buffer_wires} wires but the network has {num_wires}"
                ));
            }
        }
        Ok(())
    }

    /// Run a single pass.
    ///
    /// Nothing is done if the input buffer is already empty. A pass that
    /// delivers nothing while messages are pending is reported as
    /// [`NoProgress`](SimError::NoProgress). A pass that fails in routing or
    /// transmission moves no message and is not counted.
    pub fn step<T>(
        &mut self,
        input: &mut MessageBuffer<T>,
        output: &mut MessageBuffer<T>,
    ) -> Result<PassReport, SimError>
    where
        T: Routable,
    {
        self.check_buffers(input, output)?;
        if input.is_empty() {
            self.state = SimulationState::Idle;
            return Ok(PassReport {
                pass: self.num_passes,
                transmitted: 0,
                blocked: Vec::new(),
            });
        }

        self.network.reset();
        self.state = SimulationState::Draining;
        route_pass(&mut self.network, input, self.policy.as_mut())?;
        let transmitted = transmit_pass(&self.network, input, output)?;

        let pass = self.num_passes;
        self.num_passes += 1;
        let blocked = self.network.blocked_wires();
        debug!(self.network.entity() ; "pass {}: {} transmitted, {} blocked", pass, transmitted, blocked.len());

        if transmitted == 0 {
            return Err(SimError::NoProgress { pass });
        }
        if input.is_empty() {
            self.state = SimulationState::Idle;
        }
        Ok(PassReport {
            pass,
            transmitted,
            blocked,
        })
    }

    /// Run passes until the input buffer is empty.
    ///
    /// Returns the number of passes this call needed.
    pub fn run<T>(
        &mut self,
        input: &mut MessageBuffer<T>,
        output: &mut MessageBuffer<T>,
    ) -> Result<usize, SimError>
    where
        T: Routable,
    {
        self.check_buffers(input, output)?;
        let first_pass = self.num_passes;
        while !input.is_empty() {
            self.step(input, output)?;
        }
        self.state = SimulationState::Idle;

        let num_passes = self.num_passes - first_pass;
        let entity: &Rc<Entity> = self.network.entity();
        info!(entity ; "drained after {} passes", num_passes);
        value!(entity ; num_passes);
        Ok(num_passes)
    }
}

/// Deliver every message of `input` to `output` through `network` using the
/// given priority `policy`. Returns the number of passes required.
pub fn run_simulation<T>(
    network: Network,
    input: &mut MessageBuffer<T>,
    output: &mut MessageBuffer<T>,
    policy: PriorityPolicy,
) -> Result<usize, SimError>
where
    T: Routable,
{
    Simulation::with_policy(network, policy).run(input, output)
}
