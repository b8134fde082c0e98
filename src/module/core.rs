// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::block::UpdateBlock;
use crate::introspect::LineTrace;
use crate::module::dtypes::{Connection, Tieoff};
use crate::IO;

/// Data structure representing one module in the tree.
///
/// Contains the module's name, signals, bundles, submodules, connections and
/// update blocks. Not intended to be used directly; use `Module` instead,
/// which contains a smart pointer to this struct.
pub struct ModuleCore {
    pub(crate) type_name: String,
    /// Name under which the parent instantiated this module; `None` for a
    /// module that has not been adopted.
    pub(crate) inst_name: Option<String>,
    pub(crate) parent: Weak<RefCell<ModuleCore>>,
    pub(crate) clocked: bool,
    pub(crate) signals: IndexMap<String, IO>,
    /// Bundle name -> field name -> (signal name, msb, lsb)
    pub(crate) bundles: IndexMap<String, IndexMap<String, (String, usize, usize)>>,
    pub(crate) submodules: IndexMap<String, Rc<RefCell<ModuleCore>>>,
    pub(crate) connections: Vec<Connection>,
    pub(crate) tieoffs: Vec<Tieoff>,
    pub(crate) blocks: Vec<UpdateBlock>,
    pub(crate) line_trace: Option<Rc<LineTrace>>,
    /// Id of this module's first signal in the elaborated design. Set once
    /// by elaboration, after which the module is frozen.
    pub(crate) signal_base: Option<usize>,
}

impl ModuleCore {
    pub(crate) fn frozen(&self) -> bool {
        self.signal_base.is_some()
    }

    /// Dotted name of this module for diagnostics, rooted at the type name of
    /// the outermost ancestor, e.g. `TwoQueues.q1`.
    pub(crate) fn debug_path(&self) -> String {
        match (self.parent.upgrade(), &self.inst_name) {
            (Some(parent), Some(inst_name)) => {
                format!("{}.{}", parent.borrow().debug_path(), inst_name)
            }
            _ => self.type_name.clone(),
        }
    }
}
