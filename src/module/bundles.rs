// SPDX-License-Identifier: Apache-2.0

use indexmap::IndexMap;
use regex::Regex;
use std::rc::Rc;

use crate::{Bundle, BundleType, Module};

impl Module {
    /// Declares a bundle of new signals following `bundle_type`. Each field
    /// becomes a signal named `<name>.<field>`. To declare the mirror side
    /// of a bundle, pass `bundle_type.flip()`.
    pub fn add_bundle(&self, name: impl AsRef<str>, bundle_type: &BundleType) -> Bundle {
        let mut mapping = IndexMap::new();
        for (field, io) in bundle_type.fields() {
            let signal_name = format!("{}.{}", name.as_ref(), field);
            self.add_signal(&signal_name, *io);
            mapping.insert(field.clone(), (signal_name, io.width() - 1, 0));
        }
        self.def_bundle(name, mapping)
    }

    /// Defines a bundle over existing signals. `mapping` is a map from field
    /// names to tuples of `(signal_name, msb, lsb)`. For example, if `mapping`
    /// is `{"data": ("a_data", 3, 0), "valid": ("a_valid", 0, 0)}`, this
    /// defines a bundle with two fields, where `data` is provided by the slice
    /// `a_data[3:0]` and `valid` by `a_valid[0:0]`.
    pub fn def_bundle(
        &self,
        name: impl AsRef<str>,
        mapping: IndexMap<String, (String, usize, usize)>,
    ) -> Bundle {
        self.assert_not_frozen();

        for (signal_name, msb, lsb) in mapping.values() {
            // panics on an unknown signal or an out-of-range slice
            self.get_signal(signal_name).slice(*msb, *lsb);
        }

        let mut core = self.core.borrow_mut();
        if core.bundles.contains_key(name.as_ref()) {
            panic!(
                "Bundle {} already exists in module {}",
                name.as_ref(),
                core.debug_path()
            );
        }
        core.bundles.insert(name.as_ref().to_string(), mapping);
        Bundle {
            name: name.as_ref().to_string(),
            module: Rc::downgrade(&self.core),
        }
    }

    /// Defines a bundle with the given name, where the field names are
    /// derived from the signal names by stripping a common prefix. For
    /// example, if the module has signals `a_data`, `a_valid`, `b_data`, and
    /// `b_valid`, calling `def_bundle_from_prefix("a", "a_")` defines a
    /// bundle with fields `data` and `valid`.
    pub fn def_bundle_from_prefix(&self, name: impl AsRef<str>, prefix: impl AsRef<str>) -> Bundle {
        let mut mapping = IndexMap::new();
        {
            let core = self.core.borrow();
            for (signal_name, io) in &core.signals {
                if let Some(field) = signal_name.strip_prefix(prefix.as_ref()) {
                    mapping.insert(
                        field.to_string(),
                        (signal_name.clone(), io.width() - 1, 0),
                    );
                }
            }
        }

        assert!(
            !mapping.is_empty(),
            "Empty bundle definition for {}.{}",
            self.debug_string(),
            name.as_ref()
        );

        self.def_bundle(name, mapping)
    }

    /// Defines a bundle from every signal whose name matches `search`; the
    /// field name is the signal name with `search` replaced by `replace`
    /// (capture groups such as `$1` are allowed).
    pub fn def_bundle_from_regex(
        &self,
        name: impl AsRef<str>,
        search: impl AsRef<str>,
        replace: impl AsRef<str>,
    ) -> Bundle {
        let regex = Regex::new(search.as_ref())
            .unwrap_or_else(|err| panic!("Invalid regex {}: {}", search.as_ref(), err));

        let mut mapping = IndexMap::new();
        {
            let core = self.core.borrow();
            for (signal_name, io) in &core.signals {
                if regex.is_match(signal_name) {
                    let field = regex.replace(signal_name, replace.as_ref()).to_string();
                    mapping.insert(field, (signal_name.clone(), io.width() - 1, 0));
                }
            }
        }

        assert!(
            !mapping.is_empty(),
            "Empty bundle definition for {}.{}",
            self.debug_string(),
            name.as_ref()
        );

        self.def_bundle(name, mapping)
    }

    pub fn has_bundle(&self, name: impl AsRef<str>) -> bool {
        self.core.borrow().bundles.contains_key(name.as_ref())
    }

    /// Returns the bundle with the given name; panics if it does not exist.
    pub fn get_bundle(&self, name: impl AsRef<str>) -> Bundle {
        let core = self.core.borrow();
        if core.bundles.contains_key(name.as_ref()) {
            Bundle {
                name: name.as_ref().to_string(),
                module: Rc::downgrade(&self.core),
            }
        } else {
            panic!(
                "Bundle {}.{} does not exist",
                core.debug_path(),
                name.as_ref()
            )
        }
    }

    /// Returns all bundles on this module in declaration order.
    pub fn get_bundles(&self) -> Vec<Bundle> {
        self.core
            .borrow()
            .bundles
            .keys()
            .map(|name| Bundle {
                name: name.clone(),
                module: Rc::downgrade(&self.core),
            })
            .collect()
    }
}
