// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Per-wire bounded stacks of messages.
//!
//! One buffer holds the messages waiting to enter the network and another
//! collects the messages delivered to each output wire. Each wire is a LIFO
//! stack: the most recently pushed message is the next one to be popped.

use crate::sim_error;
use crate::types::{SimError, SimResult};

pub struct MessageBuffer<T> {
    stacks: Vec<Vec<T>>,
    capacity: usize,
}

impl<T> MessageBuffer<T> {
    /// Create an empty buffer with `num_wires` stacks each holding at most
    /// `capacity` messages.
    pub fn new(num_wires: usize, capacity: usize) -> Result<Self, SimError> {
        if num_wires == 0 {
            return sim_error!("A message buffer needs at least one wire");
        }
        if capacity == 0 {
            return sim_error!("A message buffer needs a capacity of at least one message");
        }
        Ok(Self {
            stacks: (0..num_wires).map(|_| Vec::new()).collect(),
            capacity,
        })
    }

    #[must_use]
    pub fn num_wires(&self) -> usize {
        self.stacks.len()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn stack(&self, wire: usize) -> Result<&Vec<T>, SimError> {
        self.stacks.get(wire).ok_or(SimError::InvalidWire {
            wire,
            num_wires: self.stacks.len(),
        })
    }

    /// Push a message on top of the stack for `wire`.
    ///
    /// Fails rather than overwriting when the stack is already full.
    pub fn push(&mut self, wire: usize, message: T) -> SimResult {
        let num_wires = self.stacks.len();
        let capacity = self.capacity;
        let stack = self
            .stacks
            .get_mut(wire)
            .ok_or(SimError::InvalidWire { wire, num_wires })?;
        if stack.len() >= capacity {
            return Err(SimError::BufferFull { wire, capacity });
        }
        stack.push(message);
        Ok(())
    }

    /// Remove and return the most recently pushed message of `wire`.
    pub fn pop_last(&mut self, wire: usize) -> Option<T> {
        self.stacks.get_mut(wire).and_then(Vec::pop)
    }

    /// The message that [`pop_last`](Self::pop_last) would return next.
    #[must_use]
    pub fn last(&self, wire: usize) -> Option<&T> {
        self.stacks.get(wire).and_then(|stack| stack.last())
    }

    /// Returns true if no wire holds any message.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stacks.iter().all(Vec::is_empty)
    }

    #[must_use]
    pub fn is_wire_empty(&self, wire: usize) -> bool {
        self.len(wire) == 0
    }

    #[must_use]
    pub fn is_full(&self, wire: usize) -> bool {
        self.len(wire) >= self.capacity
    }

    /// Number of messages held for `wire` (zero for unknown wires).
    #[must_use]
    pub fn len(&self, wire: usize) -> usize {
        self.stack(wire).map_or(0, Vec::len)
    }

    /// Number of messages held across all wires.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.stacks.iter().map(Vec::len).sum()
    }

    /// The messages of `wire` from the oldest to the most recent.
    #[must_use]
    pub fn messages(&self, wire: usize) -> &[T] {
        self.stacks.get(wire).map(Vec::as_slice).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_in_first_out() {
        let mut buffer = MessageBuffer::new(2, 4).unwrap();
        buffer.push(1, 'a').unwrap();
        buffer.push(1, 'b').unwrap();
        buffer.push(1, 'c').unwrap();

        assert_eq!(buffer.last(1), Some(&'c'));
        assert_eq!(buffer.pop_last(1), Some('c'));
        assert_eq!(buffer.pop_last(1), Some('b'));
        assert_eq!(buffer.messages(1), &['a']);
        assert_eq!(buffer.pop_last(0), None);
    }

    #[test]
    fn capacity_is_enforced() {
        let mut buffer = MessageBuffer::new(1, 2).unwrap();
        buffer.push(0, 1).unwrap();
        buffer.push(0, 2).unwrap();
        assert!(buffer.is_full(0));
        assert_eq!(
            buffer.push(0, 3),
            Err(SimError::BufferFull {
                wire: 0,
                capacity: 2
            })
        );
        // Nothing was overwritten
        assert_eq!(buffer.messages(0), &[1, 2]);
    }

    #[test]
    fn unknown_wire() {
        let mut buffer = MessageBuffer::new(2, 2).unwrap();
        assert_eq!(
            buffer.push(2, ()),
            Err(SimError::InvalidWire {
                wire: 2,
                num_wires: 2
            })
        );
        assert_eq!(buffer.len(7), 0);
        assert_eq!(buffer.pop_last(7), None);
    }

    #[test]
    fn emptiness() {
        let mut buffer = MessageBuffer::new(3, 1).unwrap();
        assert!(buffer.is_empty());
        buffer.push(2, 0u8).unwrap();
        assert!(!buffer.is_empty());
        assert!(buffer.is_wire_empty(0));
        assert!(!buffer.is_wire_empty(2));
        assert_eq!(buffer.total_len(), 1);
        buffer.pop_last(2);
        assert!(buffer.is_empty());
    }

    #[test]
    fn invalid_sizes() {
        assert!(MessageBuffer::<u8>::new(0, 1).is_err());
        assert!(MessageBuffer::<u8>::new(1, 0).is_err());
    }
}
