// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Generation of the messages waiting on the input wires.

use std::fmt;
use std::rc::Rc;

use minsim_network::buffer::MessageBuffer;
use minsim_network::message::Message;
use minsim_network::types::SimError;
use minsim_track::debug;
use minsim_track::entity::Entity;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

#[derive(clap::ValueEnum, Clone, Copy, Default, Debug, Serialize, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrafficPattern {
    /// Every message is sent to a random destination
    #[default]
    Random,

    /// All messages are sent to output wire 0
    AllToOne,

    /// Each input wire sends to its own destination, chosen by a random
    /// permutation of the wires
    Permutation,

    /// Each input wire sends to the wire with the reversed index bits
    BitReversal,
}

impl fmt::Display for TrafficPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The payload of a message: a sequence number unique across all inputs.
pub type Payload = usize;

/// Reverse the lowest `num_bits` bits of `value`.
#[must_use]
pub fn reverse_bits(value: usize, num_bits: u32) -> usize {
    if num_bits == 0 {
        return 0;
    }
    value.reverse_bits() >> (usize::BITS - num_bits)
}

/// Create an input buffer with `messages_per_wire` messages on each of the
/// `num_wires` wires.
pub fn fill_input_buffer(
    parent: &Rc<Entity>,
    num_wires: usize,
    messages_per_wire: usize,
    traffic_pattern: TrafficPattern,
    seed: u64,
) -> Result<MessageBuffer<Message<Payload>>, SimError> {
    let mut input = MessageBuffer::new(num_wires, messages_per_wire)?;

    let mut permutation: Vec<usize> = (0..num_wires).collect();
    permutation.shuffle(&mut Xoshiro256PlusPlus::seed_from_u64(seed));
    let num_bits = num_wires.trailing_zeros();

    for wire in 0..num_wires {
        // Create a local RNG which is different per input wire
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed ^ (wire as u64));
        for i in 0..messages_per_wire {
            let dest = match traffic_pattern {
                TrafficPattern::Random => rng.gen_range(0..num_wires),
                TrafficPattern::AllToOne => 0,
                TrafficPattern::Permutation => permutation[wire],
                TrafficPattern::BitReversal => reverse_bits(wire, num_bits),
            };
            input.push(wire, Message::new(wire, dest, wire * messages_per_wire + i))?;
        }
    }

    debug!(parent ; "{} {} messages for {} wires", input.total_len(), traffic_pattern, num_wires);
    Ok(input)
}
