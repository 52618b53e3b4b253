// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Self-routing of messages through the network.
//!
//! The route of a message is computed stage by stage from the bits of its
//! destination wire, most significant bit first. At each stage the message
//! has to leave its switch on the lower output if the destination bit for
//! that stage is set and on the upper output otherwise, which defines the
//! position the switch must be in.
//!
//! A route only claims its switches once every switch on the path is known
//! to be free or already in the required position. Otherwise the input wire
//! is marked as blocked and no switch is touched.

use std::fmt;

use minsim_track::entity::GetEntity;
use minsim_track::trace;
use serde::{Deserialize, Serialize};

use crate::bits::bit_is_set;
use crate::buffer::MessageBuffer;
use crate::message::Routable;
use crate::network::{Network, SwitchPosition};
use crate::types::SimError;

/// The result of trying to route one input wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteOutcome {
    /// No message was waiting on the wire
    Idle,

    /// All switches on the path are now set for the message
    Routed,

    /// The path conflicts with a route set earlier in the pass
    Blocked,
}

/// Route the message pending on `input_wire`, if any.
///
/// Switch settings are only committed if the whole path is free of
/// conflicts. A wire that is already blocked in this pass stays blocked. The
/// message must have been created for `input_wire`. A message that cannot
/// reach its destination through switches set for it is an invariant
/// violation of the topology.
pub fn route_one_wire<T>(
    network: &mut Network,
    input_wire: usize,
    pending: Option<&T>,
) -> Result<RouteOutcome, SimError>
where
    T: Routable,
{
    let Some(message) = pending else {
        return Ok(RouteOutcome::Idle);
    };

    let num_wires = network.num_wires();
    let num_stages = network.num_stages();
    let destination = message.destination();
    for wire in [input_wire, destination] {
        if wire >= num_wires {
            return Err(SimError::InvalidWire { wire, num_wires });
        }
    }
    let source = message.source();
    if source != input_wire {
        return Err(SimError::WrongInputWire {
            wire: input_wire,
            source,
        });
    }
    if network.is_blocked(input_wire) {
        return Ok(RouteOutcome::Blocked);
    }

    let mut route = Vec::with_capacity(num_stages);
    let mut wire = input_wire;
    let mut conflict = None;
    for (i, stage) in network.stages().iter().enumerate() {
        wire = stage.permute(wire);
        let switch = wire / 2;
        let to_bottom = bit_is_set(destination, num_stages - i - 1);
        let required = SwitchPosition::required(wire, to_bottom);
        if !stage
            .switch(switch)
            .is_some_and(|position| position.accepts(required))
        {
            conflict = Some((i, switch));
            break;
        }
        route.push((switch, required));
        wire = required.apply(wire).unwrap_or(wire);
    }

    if let Some((stage, switch)) = conflict {
        trace!(network.entity() ; "wire {} blocked at stage {} switch {}", input_wire, stage, switch);
        network.set_blocked(input_wire);
        return Ok(RouteOutcome::Blocked);
    }

    if wire != destination {
        return Err(SimError::Misrouted {
            input_wire,
            expected: destination,
            actual: wire,
        });
    }

    for (i, (switch, position)) in route.into_iter().enumerate() {
        network.stage_mut(i).set_switch(switch, position);
    }
    trace!(network.entity() ; "wire {} routed to {}", input_wire, destination);
    Ok(RouteOutcome::Routed)
}

/// A policy deciding which input wire gets to claim switches first in a
/// pass. Wires are routed in ascending order (modulo the number of wires)
/// starting from the wire returned by [`first_wire`](Prioritise::first_wire).
pub trait Prioritise {
    /// The wire to route first in the next pass. Called once per pass.
    fn first_wire(&mut self, num_wires: usize) -> usize;
}

/// Always route wire 0 first so lower wires win every conflict.
///
/// Higher wires can be starved for as long as lower wires have traffic.
#[derive(Default)]
pub struct StaticPriority;

impl Prioritise for StaticPriority {
    fn first_wire(&mut self, _num_wires: usize) -> usize {
        0
    }
}

/// Rotate the first wire by one every pass.
///
/// Every wire is routed first, and therefore cannot be blocked, at least
/// once in any `W` consecutive passes.
#[derive(Default)]
pub struct RoundRobin {
    offset: usize,
}

impl RoundRobin {
    #[must_use]
    pub fn new() -> Self {
        Self { offset: 0 }
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Prioritise for RoundRobin {
    fn first_wire(&mut self, num_wires: usize) -> usize {
        let first = self.offset % num_wires;
        self.offset = (first + 1) % num_wires;
        first
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Default, Debug, Serialize, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriorityPolicy {
    /// Lower input wires always win conflicts
    #[default]
    Static,

    /// The highest priority rotates across the input wires every pass
    RoundRobin,
}

impl PriorityPolicy {
    /// All the supported policies.
    pub const ALL: [PriorityPolicy; 2] = [PriorityPolicy::Static, PriorityPolicy::RoundRobin];

    #[must_use]
    pub fn build(&self) -> Box<dyn Prioritise> {
        match self {
            PriorityPolicy::Static => Box::new(StaticPriority),
            PriorityPolicy::RoundRobin => Box::new(RoundRobin::new()),
        }
    }
}

impl fmt::Display for PriorityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PriorityPolicy::Static => write!(f, "static"),
            PriorityPolicy::RoundRobin => write!(f, "round-robin"),
        }
    }
}

/// Route the next message of every input wire in the order chosen by
/// `policy`.
///
/// The network is expected to have been reset. Returns the number of wires
/// that were routed.
pub fn route_pass<T>(
    network: &mut Network,
    input: &MessageBuffer<T>,
    policy: &mut dyn Prioritise,
) -> Result<usize, SimError>
where
    T: Routable,
{
    let num_wires = network.num_wires();
    let first_wire = policy.first_wire(num_wires);
    let mut num_routed = 0;
    for i in 0..num_wires {
        let input_wire = (first_wire + i) % num_wires;
        if route_one_wire(network, input_wire, input.last(input_wire))? == RouteOutcome::Routed {
            num_routed += 1;
        }
    }
    Ok(num_routed)
}
