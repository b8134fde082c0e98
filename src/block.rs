// SPDX-License-Identifier: Apache-2.0

use crate::{Frame, Signal, SignalSlice};

/// When an update block runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Re-evaluated until the design settles, before every clock edge.
    Combinational,
    /// Evaluated once per clock edge; writes land in `next` and become
    /// visible only after the edge commits.
    Sequential,
}

pub(crate) type BlockBody = Box<dyn FnMut(&mut Frame<'_>)>;

/// An update block as registered on its module.
pub(crate) struct UpdateBlock {
    pub(crate) name: String,
    pub(crate) kind: BlockKind,
    pub(crate) reads: Vec<Signal>,
    pub(crate) writes: Vec<SignalSlice>,
    /// Taken by elaboration; `None` afterwards.
    pub(crate) body: Option<BlockBody>,
}
