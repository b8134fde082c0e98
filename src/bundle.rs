// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::{IO, Module, ModuleCore, SignalSlice};

/// Describes the fields of a bundle and their directions, in declaration
/// order. A bundle type and its [`flip`](BundleType::flip) are mirror images
/// of each other, so that one side's outputs line up with the other side's
/// inputs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BundleType {
    fields: Vec<(String, IO)>,
}

impl BundleType {
    pub fn new() -> BundleType {
        BundleType::default()
    }

    /// Appends a field; panics if the field name is already in use.
    pub fn field(mut self, name: impl AsRef<str>, io: IO) -> BundleType {
        if self.fields.iter().any(|(existing, _)| existing == name.as_ref()) {
            panic!("Bundle field {} is declared twice.", name.as_ref());
        }
        self.fields.push((name.as_ref().to_string(), io));
        self
    }

    pub fn input(self, name: impl AsRef<str>, width: usize) -> BundleType {
        self.field(name, IO::Input(width))
    }

    pub fn output(self, name: impl AsRef<str>, width: usize) -> BundleType {
        self.field(name, IO::Output(width))
    }

    /// Returns the mirror of this type: every input becomes an output and
    /// vice versa, field order unchanged.
    pub fn flip(&self) -> BundleType {
        BundleType {
            fields: self
                .fields
                .iter()
                .map(|(name, io)| (name.clone(), io.flip()))
                .collect(),
        }
    }

    pub fn fields(&self) -> &[(String, IO)] {
        &self.fields
    }

    pub fn width(&self) -> usize {
        self.fields.iter().map(|(_, io)| io.width()).sum()
    }
}

/// Represents a bundle on a module: a named group of signal slices that is
/// connected as a unit, field by field.
#[derive(Clone)]
pub struct Bundle {
    pub(crate) name: String,
    pub(crate) module: Weak<RefCell<ModuleCore>>,
}

impl Bundle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_module(&self) -> Module {
        Module::from_weak(&self.module)
    }

    pub(crate) fn get_module_core(&self) -> Rc<RefCell<ModuleCore>> {
        self.module
            .upgrade()
            .expect("Module referenced by a bundle handle has been dropped")
    }

    pub(crate) fn get_signal_slices(&self) -> IndexMap<String, SignalSlice> {
        let module = self.get_module();
        let core = module.core.borrow();
        let mapping = core.bundles.get(&self.name).unwrap_or_else(|| {
            panic!(
                "Bundle {}.{} does not exist",
                core.debug_path(),
                self.name
            )
        });
        mapping
            .iter()
            .map(|(field, (signal_name, msb, lsb))| {
                (
                    field.clone(),
                    SignalSlice {
                        signal: module.get_signal(signal_name),
                        msb: *msb,
                        lsb: *lsb,
                    },
                )
            })
            .collect()
    }

    /// Returns the slice behind the given field; panics if the bundle has no
    /// such field.
    pub fn get(&self, field: impl AsRef<str>) -> SignalSlice {
        self.get_signal_slices()
            .swap_remove(field.as_ref())
            .unwrap_or_else(|| {
                panic!(
                    "Bundle {} has no field {}",
                    self.debug_string(),
                    field.as_ref()
                )
            })
    }

    /// Returns the field names in declaration order.
    pub fn fields(&self) -> Vec<String> {
        self.get_signal_slices().into_keys().collect()
    }

    /// Returns an iterator over the fields and their slices.
    pub fn iter(&self) -> indexmap::map::IntoIter<String, SignalSlice> {
        self.get_signal_slices().into_iter()
    }

    /// Returns the slices behind the fields, in field order.
    pub fn signals(&self) -> Vec<SignalSlice> {
        self.get_signal_slices().into_values().collect()
    }

    pub fn width(&self) -> usize {
        self.get_signal_slices()
            .values()
            .map(|slice| slice.width())
            .sum()
    }

    pub(crate) fn debug_string(&self) -> String {
        format!(
            "{}.{}",
            self.get_module_core().borrow().debug_path(),
            self.name
        )
    }
}

impl std::fmt::Debug for Bundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Bundle {}:", self.debug_string())?;
        let core = self.get_module_core();
        let core = core.borrow();
        if let Some(mapping) = core.bundles.get(&self.name) {
            for (field, (signal_name, msb, lsb)) in mapping {
                writeln!(f, "{field}: (signal: {signal_name}, msb: {msb}, lsb: {lsb})")?;
            }
        }
        Ok(())
    }
}
