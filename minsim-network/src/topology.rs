// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Gluing functions of the supported network topologies.
//!
//! Each stage of a network starts with a permutation of the wires which
//! decides which switch of the stage a wire is connected to. Switch `k` of a
//! stage is connected to the permuted wires `2k` and `2k + 1`.
//!
//! No permutation is performed before the first stage of either topology.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bits::{circular_right_shift_preserving_high_bits, invert_bit};

#[derive(clap::ValueEnum, Clone, Copy, Default, Debug, Serialize, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    /// Stage `s` rotates the lowest `S - s + 1` bits of each wire right by one
    #[default]
    Baseline,

    /// Stage `s` crosses switch `k` with the switch differing in bit
    /// `S - s - 1`
    Butterfly,
}

impl Topology {
    /// All the supported topologies.
    pub const ALL: [Topology; 2] = [Topology::Baseline, Topology::Butterfly];

    /// Build the permutation of every stage of a network with `num_stages`
    /// stages and `2^num_stages` wires.
    #[must_use]
    pub fn permutations(&self, num_stages: usize) -> Vec<Vec<usize>> {
        let num_wires = 1 << num_stages;
        let mut permutations = Vec::with_capacity(num_stages);
        permutations.push((0..num_wires).collect());
        for stage in 1..num_stages {
            let permutation = match self {
                Topology::Baseline => baseline_stage(num_wires, num_stages, stage),
                Topology::Butterfly => butterfly_stage(num_wires, num_stages, stage),
            };
            permutations.push(permutation);
        }
        permutations
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Topology::Baseline => write!(f, "baseline"),
            Topology::Butterfly => write!(f, "butterfly"),
        }
    }
}

fn baseline_stage(num_wires: usize, num_stages: usize, stage: usize) -> Vec<usize> {
    let num_bits_to_rotate = num_stages - stage + 1;
    (0..num_wires)
        .map(|wire| circular_right_shift_preserving_high_bits(wire, num_bits_to_rotate))
        .collect()
}

fn butterfly_stage(num_wires: usize, num_stages: usize, stage: usize) -> Vec<usize> {
    let mut permutation = vec![0; num_wires];
    for switch in 0..num_wires / 2 {
        let cross_switch = invert_bit(switch, num_stages - stage - 1);

        // The upper wire of a switch never moves down and the lower wire never
        // moves up, so each pair of crossing switches shares its four targets.
        if cross_switch > switch {
            permutation[2 * switch] = 2 * switch;
            permutation[2 * switch + 1] = 2 * cross_switch;
        } else {
            permutation[2 * switch] = 2 * cross_switch + 1;
            permutation[2 * switch + 1] = 2 * switch + 1;
        }
    }
    permutation
}
