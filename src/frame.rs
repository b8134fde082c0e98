// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;

use fixedbitset::FixedBitSet;

use crate::design::{BlockInfo, Endpoint, SignalInfo, endpoint_name, locate};
use crate::{Bits, BlockKind, ConvertibleToSignalSlice, Design, SignalSlice, SimError};

/// Signal values of a running simulation.
pub(crate) struct Store {
    pub(crate) current: Vec<Bits>,
    pub(crate) next: Vec<Option<Bits>>,
    /// Signals with a value waiting in `next`.
    pub(crate) pending: FixedBitSet,
    /// Set whenever a combinational write changes a value.
    pub(crate) changed: bool,
}

impl Store {
    pub(crate) fn new(signals: &[SignalInfo]) -> Self {
        Store {
            current: signals.iter().map(|info| Bits::zero(info.width())).collect(),
            next: vec![None; signals.len()],
            pending: FixedBitSet::with_capacity(signals.len()),
            changed: false,
        }
    }

    /// Writes into `current`, recording whether anything changed.
    pub(crate) fn write_current(&mut self, endpoint: &Endpoint, value: &Bits) {
        let slot = &mut self.current[endpoint.signal.0];
        if slot.slice(endpoint.msb, endpoint.lsb) != *value {
            slot.set_slice(endpoint.msb, endpoint.lsb, value);
            self.changed = true;
        }
    }

    /// Writes into `next`, starting from the current value for bits that no
    /// sequential block has written yet this edge.
    pub(crate) fn write_next(&mut self, endpoint: &Endpoint, value: &Bits) {
        let index = endpoint.signal.0;
        let current = &self.current[index];
        self.next[index]
            .get_or_insert_with(|| current.clone())
            .set_slice(endpoint.msb, endpoint.lsb, value);
        self.pending.insert(index);
    }

    /// Moves every pending `next` value into `current`.
    pub(crate) fn commit(&mut self) {
        for index in self.pending.ones() {
            if let Some(value) = self.next[index].take() {
                self.current[index] = value;
            }
        }
        self.pending.clear();
    }

    pub(crate) fn take_changed(&mut self) -> bool {
        std::mem::replace(&mut self.changed, false)
    }
}

/// The context an update block body runs in. Reads and writes are checked
/// against the signals the block declared; an undeclared access is reported
/// once the body returns, reads yield zero and writes are dropped.
pub struct Frame<'a> {
    design: &'a Design,
    block: &'a BlockInfo,
    store: &'a mut Store,
    error: RefCell<Option<SimError>>,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(design: &'a Design, index: usize, store: &'a mut Store) -> Self {
        Frame {
            design,
            block: &design.blocks[index],
            store,
            error: RefCell::new(None),
        }
    }

    pub(crate) fn finish(self) -> Result<(), SimError> {
        match self.error.into_inner() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Finds the endpoint of `slice` in the running design. A handle from
    /// another module tree is recorded as an undeclared access.
    fn resolve(&self, slice: &SignalSlice, access: &'static str) -> Option<Endpoint> {
        let endpoint = locate(&self.design.cores, &self.design.signals, slice);
        if endpoint.is_none() {
            self.record(slice.debug_string(), access);
        }
        endpoint
    }

    fn record(&self, signal: String, access: &'static str) {
        let mut error = self.error.borrow_mut();
        if error.is_none() {
            *error = Some(SimError::UndeclaredAccess {
                block: self.block.path.clone(),
                signal,
                access,
            });
        }
    }

    fn name(&self, endpoint: &Endpoint) -> String {
        let info = &self.design.signals[endpoint.signal.0];
        endpoint_name(info, endpoint.msb, endpoint.lsb)
    }

    /// Returns the current value of a signal or slice.
    pub fn get<T: ConvertibleToSignalSlice>(&self, target: &T) -> Bits {
        let slice = target.to_signal_slice();
        let Some(endpoint) = self.resolve(&slice, "reads") else {
            return Bits::zero(slice.width());
        };
        if !self.block.readable.contains(endpoint.signal.0) {
            self.record(self.name(&endpoint), "reads");
            return Bits::zero(endpoint.width());
        }
        self.store.current[endpoint.signal.0].slice(endpoint.msb, endpoint.lsb)
    }

    pub fn get_bool<T: ConvertibleToSignalSlice>(&self, target: &T) -> bool {
        self.get(target).to_bool()
    }

    pub fn get_u64<T: ConvertibleToSignalSlice>(&self, target: &T) -> u64 {
        self.get(target).to_u64()
    }

    /// Assigns a signal or slice, keeping the low-order bits of `value` if it
    /// is wider than the target. Combinational blocks update the current
    /// value; sequential blocks update the value committed at the clock edge.
    pub fn set<T: ConvertibleToSignalSlice>(&mut self, target: &T, value: impl Into<Bits>) {
        let Some(endpoint) = self.resolve(&target.to_signal_slice(), "writes") else {
            return;
        };
        if !self.block.writes.iter().any(|declared| declared.covers(&endpoint)) {
            self.record(self.name(&endpoint), "writes");
            return;
        }
        let value = value.into().resize(endpoint.width());
        match self.block.kind {
            BlockKind::Combinational => self.store.write_current(&endpoint, &value),
            BlockKind::Sequential => self.store.write_next(&endpoint, &value),
        }
    }

    /// Name of the running block.
    pub fn block_name(&self) -> &str {
        &self.block.name
    }
}
