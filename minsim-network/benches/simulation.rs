// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

/// Benchmark complete simulation runs.
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use minsim_network::buffer::MessageBuffer;
use minsim_network::message::Message;
use minsim_network::network::Network;
use minsim_network::routing::PriorityPolicy;
use minsim_network::simulation::run_simulation;
use minsim_network::topology::Topology;
use minsim_track::entity::toplevel;
use minsim_track::tracker::dev_null_tracker;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

const NUM_WIRES: usize = 256;
const MESSAGES_PER_WIRE: usize = 64;

type Buffers = (Network, MessageBuffer<Message<usize>>, MessageBuffer<Message<usize>>);

fn setup_random_traffic(topology: Topology) -> Buffers {
    // Avoid the tracker system writing to stdout or files
    let top = toplevel(&dev_null_tracker(), "top");
    let network = Network::new(&top, "network", NUM_WIRES, topology).unwrap();

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(0x5eed);
    let mut input = MessageBuffer::new(NUM_WIRES, MESSAGES_PER_WIRE).unwrap();
    for wire in 0..NUM_WIRES {
        for i in 0..MESSAGES_PER_WIRE {
            let dest = rng.gen_range(0..NUM_WIRES);
            input.push(wire, Message::new(wire, dest, i)).unwrap();
        }
    }
    let output = MessageBuffer::new(NUM_WIRES, NUM_WIRES * MESSAGES_PER_WIRE).unwrap();
    (network, input, output)
}

fn run(args: Buffers, policy: PriorityPolicy) {
    let (network, mut input, mut output) = args;
    run_simulation(network, &mut input, &mut output, policy).unwrap();
    assert_eq!(output.total_len(), NUM_WIRES * MESSAGES_PER_WIRE);
}

fn bench_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation");

    for topology in Topology::ALL {
        for policy in PriorityPolicy::ALL {
            group.bench_function(format!("{topology}_{policy}"), |b| {
                b.iter_batched(
                    || setup_random_traffic(topology),
                    |args| run(args, policy),
                    BatchSize::SmallInput,
                );
            });
        }
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_simulation
}
criterion_main!(benches);
