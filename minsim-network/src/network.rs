// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The state of a multistage interconnection network.
//!
//! A network of `W` input/output wires is built of `S = log2(W)` stages, each
//! holding `W / 2` switches with two inputs and two outputs:
//!
//! ```txt
//!           stage 0              stage 1
//!        +-----------+        +-----------+
//! w0 --> |           | -\ /-> |           | --> w0
//!        | switch 0  |   X    | switch 0  |
//! w1 --> |           | -/ \-> |           | --> w1
//!        +-----------+   |    +-----------+
//!        +-----------+   |    +-----------+
//! w2 --> |           | -/ \-> |           | --> w2
//!        | switch 1  |   X    | switch 1  |
//! w3 --> |           | -\ /-> |           | --> w3
//!        +-----------+        +-----------+
//! ```
//!
//! The wiring in front of each stage is defined by the
//! [topology](crate::topology::Topology). Switches are set while routing a
//! pass and remain set until the network is [reset](Network::reset).

use std::fmt;
use std::rc::Rc;

use minsim_track::entity::{Entity, GetEntity};
use minsim_track::{debug, trace};

use crate::bits::invert_lowest_bit;
use crate::sim_error;
use crate::topology::Topology;
use crate::types::SimError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SwitchPosition {
    /// No message has claimed the switch in the current pass
    #[default]
    Unset,

    /// Upper input to upper output, lower input to lower output
    Straight,

    /// Upper input to lower output, lower input to upper output
    Crossover,
}

impl SwitchPosition {
    /// The position a switch needs for a message arriving on `wire` to leave
    /// on the lower output (`to_bottom`) or the upper output.
    #[must_use]
    pub fn required(wire: usize, to_bottom: bool) -> Self {
        let from_bottom = wire % 2 == 1;
        if from_bottom == to_bottom {
            SwitchPosition::Straight
        } else {
            SwitchPosition::Crossover
        }
    }

    /// The wire leaving a switch in this position when entered on `wire`.
    ///
    /// Returns `None` if the switch is not set.
    #[must_use]
    pub fn apply(&self, wire: usize) -> Option<usize> {
        match self {
            SwitchPosition::Unset => None,
            SwitchPosition::Straight => Some(wire),
            SwitchPosition::Crossover => Some(invert_lowest_bit(wire)),
        }
    }

    /// Whether a switch in this position can carry a route requiring
    /// `required` without being changed.
    #[must_use]
    pub fn accepts(&self, required: SwitchPosition) -> bool {
        *self == SwitchPosition::Unset || *self == required
    }
}

impl fmt::Display for SwitchPosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SwitchPosition::Unset => write!(f, "-"),
            SwitchPosition::Straight => write!(f, "="),
            SwitchPosition::Crossover => write!(f, "x"),
        }
    }
}

/// One stage of the network: its wire permutation followed by its switches.
#[derive(Clone, Debug)]
pub struct Stage {
    permutation: Vec<usize>,
    switches: Vec<SwitchPosition>,
}

impl Stage {
    fn new(permutation: Vec<usize>) -> Self {
        let num_switches = permutation.len() / 2;
        Self {
            permutation,
            switches: vec![SwitchPosition::Unset; num_switches],
        }
    }

    #[must_use]
    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }

    #[must_use]
    pub fn switches(&self) -> &[SwitchPosition] {
        &self.switches
    }

    /// The wire entering the switches of this stage for the incoming `wire`.
    pub(crate) fn permute(&self, wire: usize) -> usize {
        self.permutation[wire]
    }

    /// The position of `switch`, or `None` if the stage has no such switch.
    #[must_use]
    pub fn switch(&self, switch: usize) -> Option<SwitchPosition> {
        self.switches.get(switch).copied()
    }

    pub(crate) fn set_switch(&mut self, switch: usize, position: SwitchPosition) {
        self.switches[switch] = position;
    }

    fn reset(&mut self) {
        self.switches.fill(SwitchPosition::Unset);
    }
}

pub struct Network {
    entity: Rc<Entity>,
    topology: Option<Topology>,
    stages: Vec<Stage>,

    /// Set for an input wire whose route conflicted in the current pass
    route_is_blocked: Vec<bool>,
}

fn num_stages_for(num_wires: usize) -> Result<usize, SimError> {
    if num_wires < 2 || !num_wires.is_power_of_two() {
        return sim_error!(format!(
            "The number of wires ({num_wires}) must be a power of two of at least 2"
        ));
    }
    Ok(num_wires.trailing_zeros() as usize)
}

impl Network {
    /// Build a network of `num_wires` wires with the gluing functions of
    /// `topology`. All switches start unset and no route is blocked.
    pub fn new(
        parent: &Rc<Entity>,
        name: &str,
        num_wires: usize,
        topology: Topology,
    ) -> Result<Self, SimError> {
        let num_stages = num_stages_for(num_wires)?;
        let network = Self::build(parent, name, Some(topology), topology.permutations(num_stages));
        debug!(network.entity ; "{} network of {} wires, {} stages", topology, num_wires, num_stages);
        Ok(network)
    }

    /// Build a network from user supplied stage permutations.
    ///
    /// There must be `log2(num_wires)` permutations, each a bijection over
    /// the wires.
    pub fn from_permutations(
        parent: &Rc<Entity>,
        name: &str,
        permutations: Vec<Vec<usize>>,
    ) -> Result<Self, SimError> {
        let num_wires = permutations.first().map_or(0, Vec::len);
        let num_stages = num_stages_for(num_wires)?;
        if permutations.len() != num_stages {
            return sim_error!(format!(
                "A network of {num_wires} wires needs {num_stages} stages, {} given",
                permutations.len()
            ));
        }
        for (stage, permutation) in permutations.iter().enumerate() {
            if permutation.len() != num_wires {
                return sim_error!(format!(
                    "The permutation of stage {stage} has {} wires, expected {num_wires}",
                    permutation.len()
                ));
            }
            let mut seen = vec![false; num_wires];
            for &target in permutation {
                if target >= num_wires || seen[target] {
                    return sim_error!(format!(
                        "The permutation of stage {stage} is not a bijection over {num_wires} wires"
                    ));
                }
                seen[target] = true;
            }
        }
        Ok(Self::build(parent, name, None, permutations))
    }

    fn build(
        parent: &Rc<Entity>,
        name: &str,
        topology: Option<Topology>,
        permutations: Vec<Vec<usize>>,
    ) -> Self {
        let num_wires = permutations[0].len();
        Self {
            entity: Rc::new(Entity::new(parent, name)),
            topology,
            stages: permutations.into_iter().map(Stage::new).collect(),
            route_is_blocked: vec![false; num_wires],
        }
    }

    #[must_use]
    pub fn num_wires(&self) -> usize {
        self.route_is_blocked.len()
    }

    #[must_use]
    pub fn num_stages(&self) -> usize {
        self.stages.len()
    }

    /// The topology the network was built with (`None` for user supplied
    /// permutations).
    #[must_use]
    pub fn topology(&self) -> Option<Topology> {
        self.topology
    }

    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    #[must_use]
    pub fn stage(&self, stage: usize) -> Option<&Stage> {
        self.stages.get(stage)
    }

    /// The position of `switch` in `stage`, or `None` if either is out of
    /// range.
    #[must_use]
    pub fn switch(&self, stage: usize, switch: usize) -> Option<SwitchPosition> {
        self.stage(stage).and_then(|stage| stage.switch(switch))
    }

    pub(crate) fn stage_mut(&mut self, stage: usize) -> &mut Stage {
        &mut self.stages[stage]
    }

    /// Clear all switches and blocked flags ready for a new pass.
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
        self.route_is_blocked.fill(false);
        trace!(self.entity ; "reset");
    }

    /// Whether the route of `input_wire` conflicted in the current pass.
    /// Wires outside of the network are never blocked.
    #[must_use]
    pub fn is_blocked(&self, input_wire: usize) -> bool {
        self.route_is_blocked
            .get(input_wire)
            .copied()
            .unwrap_or(false)
    }

    pub(crate) fn set_blocked(&mut self, input_wire: usize) {
        debug_assert!(
            !self.route_is_blocked[input_wire],
            "wire {input_wire} blocked twice in one pass"
        );
        self.route_is_blocked[input_wire] = true;
    }

    /// The input wires whose route is blocked in the current pass.
    #[must_use]
    pub fn blocked_wires(&self) -> Vec<usize> {
        self.route_is_blocked
            .iter()
            .enumerate()
            .filter_map(|(wire, blocked)| blocked.then_some(wire))
            .collect()
    }

    /// Returns true if no switch is set and no route is blocked.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        !self.route_is_blocked.iter().any(|blocked| *blocked)
            && self.stages.iter().all(|stage| {
                stage
                    .switches
                    .iter()
                    .all(|position| *position == SwitchPosition::Unset)
            })
    }
}

impl GetEntity for Network {
    fn entity(&self) -> &Rc<Entity> {
        &self.entity
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.entity)
    }
}

/// One line per stage showing the switch positions, for debugging.
impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, stage) in self.stages.iter().enumerate() {
            write!(f, "stage {i}: ")?;
            for position in &stage.switches {
                write!(f, "{position}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
