// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Messages carried across the network.

use std::fmt;

/// The `Routable` trait provides the wires an object travels between.
pub trait Routable {
    /// Input wire the object enters the network on.
    fn source(&self) -> usize;

    /// Output wire the object has to leave the network on.
    fn destination(&self) -> usize;
}

/// A message with an opaque payload.
///
/// Messages are immutable once created.
#[derive(Clone, Debug, PartialEq)]
pub struct Message<D> {
    input_wire: usize,
    output_wire: usize,
    data: D,
}

impl<D> Message<D> {
    #[must_use]
    pub fn new(input_wire: usize, output_wire: usize, data: D) -> Self {
        Self {
            input_wire,
            output_wire,
            data,
        }
    }

    #[must_use]
    pub fn input_wire(&self) -> usize {
        self.input_wire
    }

    #[must_use]
    pub fn output_wire(&self) -> usize {
        self.output_wire
    }

    #[must_use]
    pub fn data(&self) -> &D {
        &self.data
    }
}

impl<D> Routable for Message<D> {
    fn source(&self) -> usize {
        self.input_wire
    }

    fn destination(&self) -> usize {
        self.output_wire
    }
}

impl<D> fmt::Display for Message<D>
where
    D: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}->{} ({:?})",
            self.input_wire, self.output_wire, self.data
        )
    }
}
