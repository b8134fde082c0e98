// SPDX-License-Identifier: Apache-2.0

use indexmap::map::Entry;
use std::rc::Rc;

use crate::module::{CLK, RESET};
use crate::{IO, Module, Signal, SignalSlice};

impl Module {
    /// Adds a signal to the module with the given name. The direction and
    /// width are specified via the `io` parameter.
    pub fn add_signal(&self, name: impl AsRef<str>, io: IO) -> Signal {
        self.assert_not_frozen();
        assert!(
            io.width() > 0,
            "Signal {}.{} must be at least one bit wide.",
            self.debug_string(),
            name.as_ref()
        );

        let mut core = self.core.borrow_mut();
        match core.signals.entry(name.as_ref().to_string()) {
            Entry::Occupied(_) => {
                panic!(
                    "Signal {}.{} already exists.",
                    core.debug_path(),
                    name.as_ref()
                )
            }
            Entry::Vacant(entry) => {
                entry.insert(io);
                Signal {
                    name: name.as_ref().to_string(),
                    module: Rc::downgrade(&self.core),
                }
            }
        }
    }

    pub fn add_input(&self, name: impl AsRef<str>, width: usize) -> Signal {
        self.add_signal(name, IO::Input(width))
    }

    pub fn add_output(&self, name: impl AsRef<str>, width: usize) -> Signal {
        self.add_signal(name, IO::Output(width))
    }

    pub fn add_wire(&self, name: impl AsRef<str>, width: usize) -> Signal {
        self.add_signal(name, IO::Internal(width))
    }

    /// Returns `true` if this module has a signal with the given name.
    pub fn has_signal(&self, name: impl AsRef<str>) -> bool {
        self.core.borrow().signals.contains_key(name.as_ref())
    }

    /// Returns the signal on this module with the given name; panics if a
    /// signal with that name does not exist. Bundle fields are addressed as
    /// `bundle.field`.
    pub fn get_signal(&self, name: impl AsRef<str>) -> Signal {
        let core = self.core.borrow();
        if core.signals.contains_key(name.as_ref()) {
            Signal {
                name: name.as_ref().to_string(),
                module: Rc::downgrade(&self.core),
            }
        } else {
            panic!(
                "Signal {}.{} does not exist",
                core.debug_path(),
                name.as_ref()
            )
        }
    }

    /// Returns a slice of the signal with the given name, from `msb` down to
    /// `lsb`, inclusive.
    pub fn get_signal_slice(&self, name: impl AsRef<str>, msb: usize, lsb: usize) -> SignalSlice {
        self.get_signal(name).slice(msb, lsb)
    }

    /// Returns all signals on this module whose names start with `prefix`,
    /// in declaration order. If `prefix` is `None`, returns all signals.
    pub fn get_signals(&self, prefix: Option<&str>) -> Vec<Signal> {
        let core = self.core.borrow();
        core.signals
            .keys()
            .filter(|name| prefix.is_none_or(|pfx| name.starts_with(pfx)))
            .map(|name| Signal {
                name: name.clone(),
                module: Rc::downgrade(&self.core),
            })
            .collect()
    }

    /// Returns the implicit clock input; panics on a clockless module.
    pub fn clk(&self) -> Signal {
        self.implicit(CLK)
    }

    /// Returns the implicit reset input; panics on a clockless module.
    pub fn reset(&self) -> Signal {
        self.implicit(RESET)
    }

    fn implicit(&self, name: &str) -> Signal {
        if !self.is_clocked() {
            panic!(
                "Module {} is clockless and has no {} input.",
                self.debug_string(),
                name
            );
        }
        self.get_signal(name)
    }
}
