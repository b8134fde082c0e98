// SPDX-License-Identifier: Apache-2.0

use crate::module::Tieoff;
use crate::{Bits, ConvertibleToSignalSlice, IO, Signal, SignalSlice};

impl Signal {
    /// Ties off this signal to a constant value.
    pub fn tieoff(&self, value: impl Into<Bits>) {
        self.to_signal_slice().tieoff(value);
    }
}

impl SignalSlice {
    /// Ties off this slice to a constant value, keeping the low-order bits
    /// of `value` if it is wider than the slice. The constant is recorded on
    /// the module in which the slice is driven: the parent for a submodule's
    /// input, otherwise the signal's own module.
    pub fn tieoff(&self, value: impl Into<Bits>) {
        let owner = self.signal.get_module();
        let scope = match (self.signal.io(), owner.get_parent()) {
            (IO::Input(_), Some(parent)) => parent,
            _ => owner,
        };
        scope.assert_not_frozen();
        scope.core.borrow_mut().tieoffs.push(Tieoff {
            slice: self.clone(),
            value: value.into().resize(self.width()),
        });
    }
}
