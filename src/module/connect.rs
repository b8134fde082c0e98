// SPDX-License-Identifier: Apache-2.0

use crate::module::Connection;
use crate::{Bundle, ConvertibleToSignalSlice, Module};

impl Module {
    /// Declares a connection between two signals or slices visible from this
    /// module: its own signals and the ports of its direct submodules. Which
    /// side drives is resolved from the directions at elaboration; when both
    /// orientations are legal, `a` drives `b`.
    pub fn connect<A: ConvertibleToSignalSlice, B: ConvertibleToSignalSlice>(&self, a: &A, b: &B) {
        self.assert_not_frozen();
        let lhs = a.to_signal_slice();
        let rhs = b.to_signal_slice();
        self.core
            .borrow_mut()
            .connections
            .push(Connection::Slices { lhs, rhs });
    }

    /// Declares a connection for every pair of fields with the same name in
    /// two bundles, in the field order of `a`. Mismatched field sets are
    /// reported at elaboration.
    pub fn connect_bundles(&self, a: &Bundle, b: &Bundle) {
        self.assert_not_frozen();
        self.core.borrow_mut().connections.push(Connection::Bundles {
            lhs: a.clone(),
            rhs: b.clone(),
        });
    }

    /// Declares one connection per `(a, b)` pair, in order.
    pub fn connect_all<A, B>(&self, pairs: &[(A, B)])
    where
        A: ConvertibleToSignalSlice,
        B: ConvertibleToSignalSlice,
    {
        for (a, b) in pairs {
            self.connect(a, b);
        }
    }
}
