// SPDX-License-Identifier: Apache-2.0

use std::rc::Rc;

use crate::Module;

impl Module {
    /// Adopts `child` as a submodule under the given instance name and
    /// returns it. If `name` is `None`, the instance is named
    /// `<type_name>_i`.
    ///
    /// A module has exactly one parent: adopting a module that already has
    /// one, adopting an ancestor of `self`, or adopting an elaborated module
    /// panics.
    pub fn instantiate(&self, child: &Module, name: Option<&str>) -> Module {
        let name_default;
        let name = if let Some(name) = name {
            name
        } else {
            name_default = format!("{}_i", child.get_name());
            name_default.as_str()
        };

        self.assert_not_frozen();
        child.assert_not_frozen();

        if let Some(parent) = child.get_parent() {
            panic!(
                "Module {} is already instantiated in {}.",
                child.debug_string(),
                parent.debug_string()
            );
        }

        let mut ancestor = Some(self.clone());
        while let Some(module) = ancestor {
            if module == *child {
                panic!(
                    "Cannot instantiate {} inside itself.",
                    child.debug_string()
                );
            }
            ancestor = module.get_parent();
        }

        {
            let mut inner = self.core.borrow_mut();
            if inner.submodules.contains_key(name) {
                panic!("Submodule {}.{} already exists", inner.debug_path(), name);
            }
            inner
                .submodules
                .insert(name.to_string(), child.core.clone());
        }

        {
            let mut child_core = child.core.borrow_mut();
            child_core.inst_name = Some(name.to_string());
            child_core.parent = Rc::downgrade(&self.core);
        }

        child.clone()
    }

    /// Returns the submodule with the given instance name; panics if it does
    /// not exist.
    pub fn get_submodule(&self, name: impl AsRef<str>) -> Module {
        let inner = self.core.borrow();
        match inner.submodules.get(name.as_ref()) {
            Some(core) => Module { core: core.clone() },
            None => panic!(
                "Submodule {}.{} does not exist",
                inner.debug_path(),
                name.as_ref()
            ),
        }
    }

    pub fn has_submodule(&self, name: impl AsRef<str>) -> bool {
        self.core.borrow().submodules.contains_key(name.as_ref())
    }

    /// Returns the direct submodules of this module in instantiation order.
    pub fn get_submodules(&self) -> Vec<Module> {
        self.core
            .borrow()
            .submodules
            .values()
            .map(|core| Module { core: core.clone() })
            .collect()
    }
}
