// SPDX-License-Identifier: Apache-2.0

use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::IO;

mod core;
pub use core::ModuleCore;

mod dtypes;
pub(crate) use dtypes::{Connection, Tieoff};

mod blocks;
pub use blocks::BlockBuilder;
mod bundles;
mod connect;
mod elaborate;
mod signals;
mod submodules;
mod trace;

/// Name of the implicit clock input carried by every clocked module.
pub const CLK: &str = "clk";
/// Name of the implicit synchronous reset input carried by every clocked
/// module.
pub const RESET: &str = "reset";

/// Represents one module in a hierarchy. Modules own their signals, bundles,
/// submodules and update blocks; `Module` is a cheap handle to that state.
#[derive(Clone)]
pub struct Module {
    pub(crate) core: Rc<RefCell<ModuleCore>>,
}

impl Module {
    /// Creates a new module with the given type name. The module carries the
    /// implicit 1-bit inputs `clk` and `reset`, which elaboration wires up
    /// from the parent.
    pub fn new(type_name: impl AsRef<str>) -> Module {
        let module = Module::clockless(type_name);
        {
            let mut core = module.core.borrow_mut();
            core.clocked = true;
            core.signals.insert(CLK.to_string(), IO::Input(1));
            core.signals.insert(RESET.to_string(), IO::Input(1));
        }
        module
    }

    /// Creates a new module without the implicit `clk` and `reset` inputs.
    pub fn clockless(type_name: impl AsRef<str>) -> Module {
        Module {
            core: Rc::new(RefCell::new(ModuleCore {
                type_name: type_name.as_ref().to_string(),
                inst_name: None,
                parent: Weak::new(),
                clocked: false,
                signals: IndexMap::new(),
                bundles: IndexMap::new(),
                submodules: IndexMap::new(),
                connections: Vec::new(),
                tieoffs: Vec::new(),
                blocks: Vec::new(),
                line_trace: None,
                signal_base: None,
            })),
        }
    }

    /// Removes the implicit `clk` and `reset` inputs from this module.
    pub fn set_clockless(&self) {
        self.assert_not_frozen();
        let mut core = self.core.borrow_mut();
        core.clocked = false;
        core.signals.shift_remove(CLK);
        core.signals.shift_remove(RESET);
    }

    /// Returns `true` if this module carries implicit `clk` and `reset`.
    pub fn is_clocked(&self) -> bool {
        self.core.borrow().clocked
    }

    /// Returns the type name of this module, e.g. `PortBundleQueue`.
    pub fn get_name(&self) -> String {
        self.core.borrow().type_name.clone()
    }

    /// Returns the name this module was instantiated under, if it has a
    /// parent.
    pub fn get_inst_name(&self) -> Option<String> {
        self.core.borrow().inst_name.clone()
    }

    /// Returns the parent of this module, if it has been instantiated.
    pub fn get_parent(&self) -> Option<Module> {
        self.core
            .borrow()
            .parent
            .upgrade()
            .map(|core| Module { core })
    }

    /// Returns `true` once this module has been elaborated. Frozen modules
    /// reject further structural changes.
    pub fn is_frozen(&self) -> bool {
        self.core.borrow().frozen()
    }

    pub(crate) fn debug_string(&self) -> String {
        self.core.borrow().debug_path()
    }

    pub(crate) fn assert_not_frozen(&self) {
        let core = self.core.borrow();
        if core.frozen() {
            panic!(
                "Module {} has been elaborated and can no longer be modified.",
                core.debug_path()
            );
        }
    }

    pub(crate) fn from_weak(core: &Weak<RefCell<ModuleCore>>) -> Module {
        Module {
            core: core
                .upgrade()
                .expect("Module referenced by a signal handle has been dropped"),
        }
    }
}

impl PartialEq for Module {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }
}

impl Eq for Module {}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Module({})", self.debug_string())
    }
}
