// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::rc::{Rc, Weak};

use crate::{ConvertibleToSignalSlice, IO, Module, ModuleCore, SignalSlice};

mod tieoff;

/// Index of a signal in an elaborated design.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(pub(crate) usize);

impl SignalId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Represents a signal (port or wire) on a module.
#[derive(Clone, Debug)]
pub struct Signal {
    pub(crate) module: Weak<RefCell<ModuleCore>>,
    pub(crate) name: String,
}

impl PartialEq for Signal {
    fn eq(&self, other: &Self) -> bool {
        match (self.module.upgrade(), other.module.upgrade()) {
            (Some(a_rc), Some(b_rc)) => Rc::ptr_eq(&a_rc, &b_rc) && (self.name == other.name),
            _ => false,
        }
    }
}

impl Eq for Signal {}

impl Hash for Signal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Hash pointer identity and name
        if let Some(rc) = self.module.upgrade() {
            Rc::as_ptr(&rc).hash(state);
        } else {
            (0usize).hash(state);
        }
        self.name.hash(state);
    }
}

impl Signal {
    /// Returns the name this signal has in its module.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the IO enum associated with this signal.
    pub fn io(&self) -> IO {
        let core = self.get_module_core();
        let core = core.borrow();
        core.signals[self.name.as_str()]
    }

    pub fn width(&self) -> usize {
        self.io().width()
    }

    /// Returns the module that owns this signal.
    pub fn get_module(&self) -> Module {
        Module::from_weak(&self.module)
    }

    /// Returns a slice of this signal from `msb` down to `lsb`, inclusive;
    /// panics if the range is out of bounds.
    pub fn slice(&self, msb: usize, lsb: usize) -> SignalSlice {
        let slice = SignalSlice {
            signal: self.clone(),
            msb,
            lsb,
        };
        slice.check_validity();
        slice
    }

    /// Returns the half-open bit range `[lo, hi)` of this signal.
    pub fn range(&self, bits: Range<usize>) -> SignalSlice {
        if bits.start >= bits.end {
            panic!(
                "Range {:?} of {} is empty.",
                bits,
                self.debug_string()
            );
        }
        self.slice(bits.end - 1, bits.start)
    }

    /// Returns a single-bit slice of this signal.
    pub fn bit(&self, bit: usize) -> SignalSlice {
        self.slice(bit, bit)
    }

    pub(crate) fn get_module_core(&self) -> Rc<RefCell<ModuleCore>> {
        self.module
            .upgrade()
            .expect("Module referenced by a signal handle has been dropped")
    }

    pub(crate) fn debug_string(&self) -> String {
        format!("{}.{}", self.get_module_core().borrow().debug_path(), self.name)
    }
}

impl ConvertibleToSignalSlice for Signal {
    fn to_signal_slice(&self) -> SignalSlice {
        SignalSlice {
            signal: self.clone(),
            msb: self.width() - 1,
            lsb: 0,
        }
    }
}
