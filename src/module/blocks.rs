// SPDX-License-Identifier: Apache-2.0

use crate::block::UpdateBlock;
use crate::{BlockKind, ConvertibleToSignalSlice, Frame, Module, Signal, SignalSlice};

/// Collects the declared reads and writes of an update block. The block is
/// registered on its module when [`body`](BlockBuilder::body) is called.
#[must_use = "an update block is only registered once its body is supplied"]
pub struct BlockBuilder {
    module: Module,
    name: String,
    kind: BlockKind,
    reads: Vec<Signal>,
    writes: Vec<SignalSlice>,
}

impl Module {
    /// Starts a combinational update block.
    pub fn comb(&self, name: impl AsRef<str>) -> BlockBuilder {
        self.block(name, BlockKind::Combinational)
    }

    /// Starts a sequential update block, evaluated once per clock edge.
    pub fn seq(&self, name: impl AsRef<str>) -> BlockBuilder {
        self.block(name, BlockKind::Sequential)
    }

    fn block(&self, name: impl AsRef<str>, kind: BlockKind) -> BlockBuilder {
        self.assert_not_frozen();
        {
            let core = self.core.borrow();
            if core.blocks.iter().any(|block| block.name == name.as_ref()) {
                panic!(
                    "Block {}.{} already exists.",
                    core.debug_path(),
                    name.as_ref()
                );
            }
        }
        BlockBuilder {
            module: self.clone(),
            name: name.as_ref().to_string(),
            kind,
            reads: Vec::new(),
            writes: Vec::new(),
        }
    }

    /// Returns the names of the update blocks registered on this module, in
    /// registration order.
    pub fn get_blocks(&self) -> Vec<(String, BlockKind)> {
        self.core
            .borrow()
            .blocks
            .iter()
            .map(|block| (block.name.clone(), block.kind))
            .collect()
    }
}

impl BlockBuilder {
    /// Declares a signal the block reads.
    pub fn read(mut self, signal: &Signal) -> BlockBuilder {
        if !self.reads.contains(signal) {
            self.reads.push(signal.clone());
        }
        self
    }

    pub fn reads<'a>(self, signals: impl IntoIterator<Item = &'a Signal>) -> BlockBuilder {
        signals.into_iter().fold(self, |builder, signal| builder.read(signal))
    }

    /// Declares a signal or slice the block writes. The block becomes the
    /// driver of exactly these bits.
    pub fn write<T: ConvertibleToSignalSlice>(mut self, target: &T) -> BlockBuilder {
        let slice = target.to_signal_slice();
        if self.writes.iter().any(|existing| {
            existing.signal == slice.signal
                && existing.lsb <= slice.msb
                && slice.lsb <= existing.msb
        }) {
            panic!(
                "Block {}.{} declares overlapping writes to {}.",
                self.module.debug_string(),
                self.name,
                slice.debug_string()
            );
        }
        self.writes.push(slice);
        self
    }

    pub fn writes<'a>(self, signals: impl IntoIterator<Item = &'a Signal>) -> BlockBuilder {
        signals.into_iter().fold(self, |builder, signal| builder.write(signal))
    }

    /// Supplies the block body and registers the block on its module.
    pub fn body(self, body: impl FnMut(&mut Frame<'_>) + 'static) {
        let module = self.module;
        module.assert_not_frozen();
        module.core.borrow_mut().blocks.push(UpdateBlock {
            name: self.name,
            kind: self.kind,
            reads: self.reads,
            writes: self.writes,
            body: Some(Box::new(body)),
        });
    }
}
