// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use minsim_network::buffer::MessageBuffer;
use minsim_network::message::Message;
use minsim_network::network::{Network, SwitchPosition};
use minsim_network::routing::{RouteOutcome, route_one_wire};
use minsim_network::test_helpers::start_test;
use minsim_network::topology::Topology;
use minsim_network::transmit::transmit_pass;
use minsim_network::types::SimError;

#[test]
fn invalid_wire_counts() {
    let top = start_test(file!());
    for num_wires in [0, 1, 3, 6, 12, 100] {
        for topology in Topology::ALL {
            let result = Network::new(&top, "network", num_wires, topology);
            assert!(
                matches!(result, Err(SimError::InvalidConfig(_))),
                "{num_wires} wires accepted"
            );
        }
    }
}

#[test]
fn network_shape() {
    let top = start_test(file!());
    let network = Network::new(&top, "network", 16, Topology::Butterfly).unwrap();
    assert_eq!(network.num_wires(), 16);
    assert_eq!(network.num_stages(), 4);
    assert_eq!(network.topology(), Some(Topology::Butterfly));
    for stage in network.stages() {
        assert_eq!(stage.switches().len(), 8);
        assert!(
            stage
                .switches()
                .iter()
                .all(|position| *position == SwitchPosition::Unset)
        );
    }
    assert!(network.is_clear());
}

#[test]
fn two_wire_network() {
    let top = start_test(file!());
    let network = Network::new(&top, "network", 2, Topology::Baseline).unwrap();
    assert_eq!(network.num_stages(), 1);
    assert_eq!(network.stage(0).unwrap().permutation(), &[0, 1]);
}

#[test]
fn four_wire_baseline() {
    let top = start_test(file!());
    let network = Network::new(&top, "network", 4, Topology::Baseline).unwrap();
    assert_eq!(network.stage(0).unwrap().permutation(), &[0, 1, 2, 3]);
    assert_eq!(network.stage(1).unwrap().permutation(), &[0, 2, 1, 3]);
}

#[test]
fn getters_out_of_range() {
    let top = start_test(file!());
    let network = Network::new(&top, "network", 4, Topology::Butterfly).unwrap();
    assert!(network.stage(2).is_none());
    assert_eq!(network.switch(1, 2), None);
    assert_eq!(network.switch(2, 0), None);
    assert_eq!(network.switch(1, 1), Some(SwitchPosition::Unset));
    assert!(!network.is_blocked(4));
}

#[test]
fn eight_wire_topologies_differ() {
    let top = start_test(file!());
    let baseline = Network::new(&top, "baseline", 8, Topology::Baseline).unwrap();
    let butterfly = Network::new(&top, "butterfly", 8, Topology::Butterfly).unwrap();
    assert_ne!(
        baseline.stage(1).unwrap().permutation(),
        butterfly.stage(1).unwrap().permutation()
    );
    assert_eq!(
        baseline.stage(2).unwrap().permutation(),
        butterfly.stage(2).unwrap().permutation()
    );
}

/// Every input wire must be able to reach every output wire of an otherwise
/// empty network.
#[test]
fn every_pair_is_routable() {
    let top = start_test(file!());
    for topology in Topology::ALL {
        for num_wires in [2, 4, 8, 16, 32] {
            let mut network = Network::new(&top, "network", num_wires, topology).unwrap();
            for input_wire in 0..num_wires {
                for dest in 0..num_wires {
                    network.reset();
                    let mut input = MessageBuffer::new(num_wires, 1).unwrap();
                    let mut output = MessageBuffer::new(num_wires, 1).unwrap();
                    input
                        .push(input_wire, Message::new(input_wire, dest, ()))
                        .unwrap();

                    let outcome =
                        route_one_wire(&mut network, input_wire, input.last(input_wire)).unwrap();
                    assert_eq!(
                        outcome,
                        RouteOutcome::Routed,
                        "{topology} {num_wires}: {input_wire} -> {dest}"
                    );
                    assert_eq!(transmit_pass(&network, &mut input, &mut output), Ok(1));
                    assert_eq!(output.len(dest), 1);
                }
            }
        }
    }
}

#[test]
fn custom_permutations_are_validated() {
    let top = start_test(file!());

    // Not a bijection
    let result = Network::from_permutations(&top, "net", vec![vec![0, 1, 2, 3], vec![0, 0, 1, 2]]);
    assert!(matches!(result, Err(SimError::InvalidConfig(_))));

    // Wrong number of stages
    let result = Network::from_permutations(&top, "net", vec![vec![0, 1, 2, 3]]);
    assert!(matches!(result, Err(SimError::InvalidConfig(_))));

    // Mismatched lengths
    let result = Network::from_permutations(&top, "net", vec![vec![0, 1, 2, 3], vec![1, 0]]);
    assert!(matches!(result, Err(SimError::InvalidConfig(_))));

    let network =
        Network::from_permutations(&top, "net", vec![vec![3, 2, 1, 0], vec![0, 2, 1, 3]]).unwrap();
    assert_eq!(network.topology(), None);
    assert_eq!(network.num_stages(), 2);
}
