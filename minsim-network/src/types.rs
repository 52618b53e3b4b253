// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Shared types.

use std::error::Error;
use std::fmt;

#[macro_export]
/// Build a configuration [SimError] from a message that supports `to_string`
macro_rules! sim_error {
    ($msg:expr) => {
        Err($crate::types::SimError::InvalidConfig($msg.to_string()))
    };
}

/// The `SimError` is what should be returned in the case of an error
///
/// A blocked route is never an error. It is recorded in the network and
/// retried on a later pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimError {
    /// The network or buffers were configured with invalid values.
    InvalidConfig(String),

    /// A wire index outside of the network was used.
    InvalidWire { wire: usize, num_wires: usize },

    /// A message waiting on `wire` was created for input wire `source`.
    WrongInputWire { wire: usize, source: usize },

    /// A message was pushed to a wire whose stack is already full.
    BufferFull { wire: usize, capacity: usize },

    /// A transmitted message reached a switch that routing never set.
    SwitchNotSet {
        input_wire: usize,
        stage: usize,
        switch: usize,
    },

    /// A message left the last stage on the wrong wire.
    Misrouted {
        input_wire: usize,
        expected: usize,
        actual: usize,
    },

    /// A pass with messages pending moved none of them.
    NoProgress { pass: usize },
}

impl SimError {
    /// Returns true for errors that indicate a broken topology or routing
    /// invariant rather than a problem with the caller's input.
    #[must_use]
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            SimError::SwitchNotSet { .. } | SimError::Misrouted { .. } | SimError::NoProgress { .. }
        )
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimError::InvalidConfig(msg) => write!(f, "Error: {msg}"),
            SimError::InvalidWire { wire, num_wires } => {
                write!(f, "Error: wire {wire} out of range for {num_wires} wires")
            }
            SimError::WrongInputWire { wire, source } => {
                write!(f, "Error: message from input wire {source} waiting on wire {wire}")
            }
            SimError::BufferFull { wire, capacity } => {
                write!(f, "Error: buffer for wire {wire} full ({capacity} messages)")
            }
            SimError::SwitchNotSet {
                input_wire,
                stage,
                switch,
            } => write!(
                f,
                "Error: switch {switch} of stage {stage} not set for input wire {input_wire}"
            ),
            SimError::Misrouted {
                input_wire,
                expected,
                actual,
            } => write!(
                f,
                "Error: message from input wire {input_wire} arrived at {actual}, expected {expected}"
            ),
            SimError::NoProgress { pass } => {
                write!(f, "Error: no message transmitted in pass {pass}")
            }
        }
    }
}

impl Error for SimError {}

/// The SimResult is the return type for most simulation functions
pub type SimResult = Result<(), SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_violations() {
        assert!(SimError::NoProgress { pass: 3 }.is_invariant_violation());
        assert!(
            SimError::Misrouted {
                input_wire: 0,
                expected: 1,
                actual: 2
            }
            .is_invariant_violation()
        );
        assert!(!SimError::BufferFull { wire: 0, capacity: 1 }.is_invariant_violation());
        assert!(!SimError::WrongInputWire { wire: 2, source: 5 }.is_invariant_violation());
        assert!(!SimError::InvalidConfig("bad".to_string()).is_invariant_violation());
    }

    #[test]
    fn messages_carry_context() {
        let error = SimError::SwitchNotSet {
            input_wire: 5,
            stage: 2,
            switch: 1,
        };
        assert_eq!(
            error.to_string(),
            "Error: switch 1 of stage 2 not set for input wire 5"
        );
        assert_eq!(
            SimError::WrongInputWire { wire: 2, source: 5 }.to_string(),
            "Error: message from input wire 5 waiting on wire 2"
        );
    }
}
