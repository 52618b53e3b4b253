// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Moving routed messages through the network.
//!
//! Transmission follows the switches committed by
//! [routing](crate::routing). Every switch on the path of a routed message
//! must be set, and the path must end at the destination of the message.

use minsim_track::entity::GetEntity;
use minsim_track::trace;

use crate::buffer::MessageBuffer;
use crate::message::Routable;
use crate::network::Network;
use crate::types::SimError;

/// Follow the switch settings from `input_wire` to the output wire.
fn trace_path(network: &Network, input_wire: usize) -> Result<usize, SimError> {
    let mut wire = input_wire;
    for (i, stage) in network.stages().iter().enumerate() {
        wire = stage.permute(wire);
        let switch = wire / 2;
        wire = stage
            .switch(switch)
            .and_then(|position| position.apply(wire))
            .ok_or(SimError::SwitchNotSet {
                input_wire,
                stage: i,
                switch,
            })?;
    }
    Ok(wire)
}

/// Transmit the next message of every unblocked input wire, in ascending
/// wire order.
///
/// Every path is traced and the output stacks are checked for space before
/// any message is removed from the input. An error therefore leaves both
/// buffers untouched. Returns the number of messages transmitted.
pub fn transmit_pass<T>(
    network: &Network,
    input: &mut MessageBuffer<T>,
    output: &mut MessageBuffer<T>,
) -> Result<usize, SimError>
where
    T: Routable,
{
    let num_outputs = output.num_wires();
    let mut arriving = vec![0; num_outputs];
    let mut deliveries = Vec::new();
    for input_wire in 0..network.num_wires() {
        if network.is_blocked(input_wire) {
            continue;
        }
        let Some(message) = input.last(input_wire) else {
            continue;
        };

        let destination = message.destination();
        let output_wire = trace_path(network, input_wire)?;
        if output_wire != destination {
            return Err(SimError::Misrouted {
                input_wire,
                expected: destination,
                actual: output_wire,
            });
        }
        let Some(count) = arriving.get_mut(output_wire) else {
            return Err(SimError::InvalidWire {
                wire: output_wire,
                num_wires: num_outputs,
            });
        };
        *count += 1;
        if output.len(output_wire) + *count > output.capacity() {
            return Err(SimError::BufferFull {
                wire: output_wire,
                capacity: output.capacity(),
            });
        }
        deliveries.push((input_wire, output_wire));
    }

    let mut num_transmitted = 0;
    for (input_wire, output_wire) in deliveries {
        if let Some(message) = input.pop_last(input_wire) {
            output.push(output_wire, message)?;
            trace!(network.entity() ; "delivered {} -> {}", input_wire, output_wire);
            num_transmitted += 1;
        }
    }
    Ok(num_transmitted)
}
