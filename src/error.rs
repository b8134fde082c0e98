// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

use crate::SimState;

/// Errors detected while flattening a module tree into a design. All of them
/// abort elaboration; no partially elaborated design is ever returned.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ElabError {
    #[error("Width mismatch when connecting {lhs} ({lhs_width} bits) and {rhs} ({rhs_width} bits)")]
    WidthMismatch {
        lhs: String,
        lhs_width: usize,
        rhs: String,
        rhs_width: usize,
    },

    #[error("{signal} is multiply driven: by {first} and by {second}")]
    MultipleDrivers {
        signal: String,
        first: String,
        second: String,
    },

    #[error("{signal} ({io}) is undriven")]
    UndrivenSignal { signal: String, io: &'static str },

    #[error(
        "Combinational cycle through blocks [{}] and signals [{}]",
        .blocks.join(", "),
        .signals.join(", ")
    )]
    CombinationalCycle {
        blocks: Vec<String>,
        signals: Vec<String>,
    },

    #[error("Cannot connect {lhs} and {rhs} in module {module}: {reason}")]
    PortDirection {
        module: String,
        lhs: String,
        rhs: String,
        reason: &'static str,
    },

    #[error("Bundles {lhs} and {rhs} have mismatched fields: {field} is only in {only_in}")]
    BundleMismatch {
        lhs: String,
        rhs: String,
        field: String,
        only_in: String,
    },

    #[error("{signal} is not visible from module {module}")]
    ConnectionScope { module: String, signal: String },

    #[error("Module {module} has already been elaborated")]
    AlreadyElaborated { module: String },
}

/// Errors raised while driving a simulation. Any of them leaves the simulator
/// halted.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SimError {
    #[error(transparent)]
    Elab(#[from] ElabError),

    #[error(
        "Combinational logic did not converge in cycle {cycle} after {passes} passes: [{}]",
        .unsettled.join(", ")
    )]
    NonConvergence {
        cycle: u64,
        passes: usize,
        unsettled: Vec<String>,
    },

    #[error("Block {block} {access} {signal}, which it did not declare")]
    UndeclaredAccess {
        block: String,
        signal: String,
        access: &'static str,
    },

    #[error("Cannot {operation} while the simulator is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SimState,
    },

    #[error("No signal named {0}")]
    UnknownSignal(String),

    #[error("{0} is not a top-level input")]
    NotAnInput(String),
}
