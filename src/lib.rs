// SPDX-License-Identifier: Apache-2.0

//! Cycle-based modeling and simulation of synchronous hardware.
//!
//! A design is built as a tree of [`Module`]s with typed, fixed-width
//! signals, bundles of signals, connections and update blocks. Elaboration
//! flattens the tree into a [`Design`]; a [`Simulator`] then evaluates it
//! one clock cycle at a time.

mod bits;
pub use bits::Bits;

mod block;
pub use block::BlockKind;

mod bundle;
pub use bundle::{Bundle, BundleType};

mod config;
pub use config::SimConfig;

mod design;
pub use design::{BlockInfo, ConnectionEdge, Design, Endpoint, SignalInfo, Step};

mod elab;

mod error;
pub use error::{ElabError, SimError};

mod frame;
pub use frame::Frame;

mod introspect;
pub use introspect::{LineTrace, ModuleView, TraceView};

mod io;
pub use io::IO;

mod module;
pub use module::{BlockBuilder, CLK, Module, ModuleCore, RESET};

mod schedule;

mod signal;
pub use signal::{Signal, SignalId};

mod signal_slice;
pub use signal_slice::{ConvertibleToSignalSlice, SignalSlice};

mod sim;
pub use sim::{SimState, Simulator};
