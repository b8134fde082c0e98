// SPDX-License-Identifier: Apache-2.0

use crate::{Bits, Bundle, SignalSlice};

/// A connection as declared by user code, before bundle expansion and
/// direction resolution.
#[derive(Clone, Debug)]
pub(crate) enum Connection {
    Slices { lhs: SignalSlice, rhs: SignalSlice },
    Bundles { lhs: Bundle, rhs: Bundle },
}

#[derive(Clone, Debug)]
pub(crate) struct Tieoff {
    pub(crate) slice: SignalSlice,
    pub(crate) value: Bits,
}
