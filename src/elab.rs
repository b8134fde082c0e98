// SPDX-License-Identifier: Apache-2.0

//! Flattens a module tree into a [`Design`].
//!
//! Modules are numbered in post-order, children before their parent, which
//! also fixes the id of every signal. Each module then resolves its own
//! declarations in a fixed order: clock and reset wiring of its submodules,
//! declared connections (bundles expanded field by field), constants, and
//! update blocks. Every driver claims the bits it drives, so a second driver
//! of any bit is reported against the first.

use std::cell::RefCell;
use std::rc::Rc;

use fixedbitset::FixedBitSet;
use indexmap::IndexMap;
use itertools::Itertools;

use crate::block::{BlockBody, UpdateBlock};
use crate::design::{BlockInfo, ModuleInfo, endpoint_name, join_path, locate};
use crate::module::{CLK, Connection, RESET};
use crate::{
    Bits, BlockKind, Bundle, ConnectionEdge, ConvertibleToSignalSlice, Design, ElabError, Endpoint,
    IO, Module, ModuleCore, SignalId, SignalInfo, SignalSlice, SimConfig,
};

mod connect;
mod drivers;

use connect::{Role, Scope, check_block_write, orient};
use drivers::DrivenBits;

pub(crate) fn elaborate(
    top: &Module,
    config: &SimConfig,
) -> Result<(Design, Vec<Option<BlockBody>>), ElabError> {
    if top.is_frozen() {
        return Err(ElabError::AlreadyElaborated {
            module: top.debug_string(),
        });
    }
    if let Some(parent) = top.get_parent() {
        panic!(
            "Module {} is instantiated in {} and cannot be elaborated on its own.",
            top.debug_string(),
            parent.debug_string()
        );
    }

    let mut elab = Elaborator::default();
    elab.number(&top.core, String::new());
    elab.drivers = elab
        .signals
        .iter()
        .map(|info| DrivenBits::new(info.width()))
        .collect();

    let top_index = elab.modules.len() - 1;
    for id in elab.modules[top_index].signals.clone() {
        if let IO::Input(width) = elab.signals[id].io {
            elab.claim(
                &Endpoint {
                    signal: SignalId(id),
                    msb: width - 1,
                    lsb: 0,
                },
                "top-level input".to_string(),
            )?;
        }
    }

    for index in 0..elab.modules.len() {
        elab.resolve_module(index)?;
    }

    let warnings = elab.check_driven(config)?;
    let schedule = crate::schedule::schedule(&elab.signals, &elab.edges, &elab.blocks)?;
    let sequential = elab
        .blocks
        .iter()
        .positions(|block| block.kind == BlockKind::Sequential)
        .collect();

    log::debug!(
        "Elaborated {}: {} modules, {} signals, {} connections, {} blocks, {} schedule steps",
        top.get_name(),
        elab.modules.len(),
        elab.signals.len(),
        elab.edges.len(),
        elab.blocks.len(),
        schedule.len()
    );

    let design = Design {
        cores: elab.cores,
        modules: elab.modules,
        signals: elab.signals,
        by_path: elab.by_path,
        edges: elab.edges,
        constants: elab.constants,
        blocks: elab.blocks,
        schedule,
        sequential,
        warnings,
    };
    Ok((design, elab.bodies))
}

#[derive(Default)]
struct Elaborator {
    cores: Vec<Rc<RefCell<ModuleCore>>>,
    modules: Vec<ModuleInfo>,
    signals: Vec<SignalInfo>,
    by_path: IndexMap<String, SignalId>,
    drivers: Vec<DrivenBits>,
    edges: Vec<ConnectionEdge>,
    constants: Vec<(Endpoint, Bits)>,
    blocks: Vec<BlockInfo>,
    bodies: Vec<Option<BlockBody>>,
}

impl Elaborator {
    /// Assigns module indices and signal ids in post-order and freezes every
    /// module. Returns the index of `core`.
    fn number(&mut self, core: &Rc<RefCell<ModuleCore>>, path: String) -> usize {
        let submodules: Vec<(String, Rc<RefCell<ModuleCore>>)> = core
            .borrow()
            .submodules
            .iter()
            .map(|(name, child)| (name.clone(), child.clone()))
            .collect();
        let children: Vec<usize> = submodules
            .iter()
            .map(|(name, child)| self.number(child, join_path(&path, name)))
            .collect();

        let index = self.modules.len();
        let base = self.signals.len();
        let mut inner = core.borrow_mut();
        inner.signal_base = Some(base);
        for (offset, (name, io)) in inner.signals.iter().enumerate() {
            let signal_path = join_path(&path, name);
            self.by_path.insert(signal_path.clone(), SignalId(base + offset));
            self.signals.push(SignalInfo {
                path: signal_path,
                name: name.clone(),
                io: *io,
                module: index,
            });
        }
        for child in &children {
            self.modules[*child].parent = Some(index);
        }
        self.modules.push(ModuleInfo {
            path,
            type_name: inner.type_name.clone(),
            inst_name: inner.inst_name.clone(),
            parent: None,
            children,
            signals: base..self.signals.len(),
            edges: 0..0,
            line_trace: inner.line_trace.clone(),
        });
        self.cores.push(core.clone());
        index
    }

    fn module_name(&self, index: usize) -> String {
        let module = &self.modules[index];
        if module.path.is_empty() {
            module.type_name.clone()
        } else {
            module.path.clone()
        }
    }

    fn name(&self, endpoint: &Endpoint) -> String {
        endpoint_name(&self.signals[endpoint.signal.0], endpoint.msb, endpoint.lsb)
    }

    /// Finds the id of a signal handle, provided it belongs to this design.
    fn locate(&self, slice: &SignalSlice) -> Option<Endpoint> {
        locate(&self.cores, &self.signals, slice)
    }

    /// Resolves a slice named in module `index`, which may only refer to its
    /// own signals and the ports of its direct submodules.
    fn visible(&self, index: usize, slice: &SignalSlice) -> Result<(Endpoint, Scope), ElabError> {
        let out_of_scope = |signal: String| ElabError::ConnectionScope {
            module: self.module_name(index),
            signal,
        };
        let endpoint = self
            .locate(slice)
            .ok_or_else(|| out_of_scope(slice.debug_string()))?;
        let info = &self.signals[endpoint.signal.0];
        if info.module == index {
            Ok((endpoint, Scope::Own))
        } else if self.modules[info.module].parent == Some(index) && info.io.is_port() {
            Ok((endpoint, Scope::Child))
        } else {
            Err(out_of_scope(self.name(&endpoint)))
        }
    }

    fn claim(&mut self, endpoint: &Endpoint, driver: String) -> Result<(), ElabError> {
        let second = driver.clone();
        self.drivers[endpoint.signal.0]
            .driven(endpoint.msb, endpoint.lsb, driver)
            .map_err(|first| ElabError::MultipleDrivers {
                signal: self.name(endpoint),
                first,
                second,
            })
    }

    fn resolve_module(&mut self, index: usize) -> Result<(), ElabError> {
        let core = self.cores[index].clone();
        let edges_start = self.edges.len();

        if core.borrow().clocked {
            for child in self.modules[index].children.clone() {
                if !self.cores[child].borrow().clocked {
                    continue;
                }
                for name in [CLK, RESET] {
                    let driver = self.port(index, name);
                    let load = self.port(child, name);
                    self.add_edge(driver, load)?;
                }
            }
        }

        let connections = core.borrow().connections.clone();
        for connection in &connections {
            match connection {
                Connection::Slices { lhs, rhs } => self.connect(index, lhs, rhs)?,
                Connection::Bundles { lhs, rhs } => self.connect_bundles(index, lhs, rhs)?,
            }
        }
        self.modules[index].edges = edges_start..self.edges.len();

        let tieoffs = core.borrow().tieoffs.clone();
        for tieoff in tieoffs {
            let (endpoint, scope) = self.visible(index, &tieoff.slice)?;
            let io = self.signals[endpoint.signal.0].io;
            if !matches!(orient(Role::Drive, Role::of(io, scope)), Ok(true)) {
                return Err(ElabError::PortDirection {
                    module: self.module_name(index),
                    lhs: format!("constant {}", tieoff.value),
                    rhs: self.name(&endpoint),
                    reason: "the target cannot be driven from this module",
                });
            }
            self.claim(&endpoint, format!("constant {:?}", tieoff.value))?;
            self.constants.push((endpoint, tieoff.value));
        }

        // blocks are taken out while resolving, since resolving a signal
        // handle borrows its module
        let mut blocks = std::mem::take(&mut core.borrow_mut().blocks);
        let result = self.resolve_blocks(index, &mut blocks);
        core.borrow_mut().blocks = blocks;
        result
    }

    fn resolve_blocks(
        &mut self,
        index: usize,
        blocks: &mut [UpdateBlock],
    ) -> Result<(), ElabError> {
        for block in blocks.iter_mut() {
            let path = join_path(&self.modules[index].path, &block.name);
            let mut readable = FixedBitSet::with_capacity(self.signals.len());

            let mut reads = Vec::with_capacity(block.reads.len());
            for signal in &block.reads {
                let (endpoint, _) = self.visible(index, &signal.to_signal_slice())?;
                readable.insert(endpoint.signal.0);
                reads.push(endpoint.signal);
            }

            let mut writes = Vec::with_capacity(block.writes.len());
            for slice in &block.writes {
                let (endpoint, scope) = self.visible(index, slice)?;
                check_block_write(self.signals[endpoint.signal.0].io, scope).map_err(|reason| {
                    ElabError::PortDirection {
                        module: self.module_name(index),
                        lhs: format!("block {path}"),
                        rhs: self.name(&endpoint),
                        reason,
                    }
                })?;
                self.claim(&endpoint, format!("block {path}"))?;
                readable.insert(endpoint.signal.0);
                writes.push(endpoint);
            }

            self.blocks.push(BlockInfo {
                name: block.name.clone(),
                path,
                kind: block.kind,
                module: index,
                reads,
                writes,
                readable,
            });
            self.bodies.push(block.body.take());
        }

        Ok(())
    }

    fn port(&self, module: usize, name: &str) -> Endpoint {
        let range = self.modules[module].signals.clone();
        let id = self.signals[range]
            .iter()
            .position(|info| info.name == name)
            .map(|offset| self.modules[module].signals.start + offset)
            .unwrap_or_else(|| panic!("Module {} has no {} input", self.module_name(module), name));
        Endpoint {
            signal: SignalId(id),
            msb: 0,
            lsb: 0,
        }
    }

    fn add_edge(&mut self, driver: Endpoint, load: Endpoint) -> Result<(), ElabError> {
        self.claim(&load, format!("connection from {}", self.name(&driver)))?;
        self.edges.push(ConnectionEdge { driver, load });
        Ok(())
    }

    fn connect(
        &mut self,
        index: usize,
        lhs: &SignalSlice,
        rhs: &SignalSlice,
    ) -> Result<(), ElabError> {
        let (a, a_scope) = self.visible(index, lhs)?;
        let (b, b_scope) = self.visible(index, rhs)?;

        if a.width() != b.width() {
            return Err(ElabError::WidthMismatch {
                lhs: self.name(&a),
                lhs_width: a.width(),
                rhs: self.name(&b),
                rhs_width: b.width(),
            });
        }

        let a_role = Role::of(self.signals[a.signal.0].io, a_scope);
        let b_role = Role::of(self.signals[b.signal.0].io, b_scope);
        match orient(a_role, b_role) {
            Ok(true) => self.add_edge(a, b),
            Ok(false) => self.add_edge(b, a),
            Err(reason) => Err(ElabError::PortDirection {
                module: self.module_name(index),
                lhs: self.name(&a),
                rhs: self.name(&b),
                reason,
            }),
        }
    }

    fn bundle_name(&self, bundle: &Bundle) -> String {
        let core = bundle.get_module_core();
        match self.cores.iter().position(|other| Rc::ptr_eq(other, &core)) {
            Some(index) => join_path(&self.modules[index].path, &bundle.name),
            None => bundle.debug_string(),
        }
    }

    fn connect_bundles(
        &mut self,
        index: usize,
        lhs: &Bundle,
        rhs: &Bundle,
    ) -> Result<(), ElabError> {
        let lhs_fields = lhs.get_signal_slices();
        let rhs_fields = rhs.get_signal_slices();

        let mismatch = |field: &str, only_in: &Bundle| ElabError::BundleMismatch {
            lhs: self.bundle_name(lhs),
            rhs: self.bundle_name(rhs),
            field: field.to_string(),
            only_in: self.bundle_name(only_in),
        };
        if let Some(field) = lhs_fields.keys().find(|field| !rhs_fields.contains_key(*field)) {
            return Err(mismatch(field, lhs));
        }
        if let Some(field) = rhs_fields.keys().find(|field| !lhs_fields.contains_key(*field)) {
            return Err(mismatch(field, rhs));
        }

        for (field, lhs_slice) in &lhs_fields {
            self.connect(index, lhs_slice, &rhs_fields[field])?;
        }
        Ok(())
    }

    /// Reports every signal with undriven bits, other than top-level inputs,
    /// which the harness drives.
    fn check_driven(&self, config: &SimConfig) -> Result<Vec<ElabError>, ElabError> {
        let mut warnings = Vec::new();
        for (info, driven) in self.signals.iter().zip(&self.drivers) {
            if driven.all_driven() {
                continue;
            }
            if let Some(bits) = driven.example_undriven_bits() {
                let warning = ElabError::UndrivenSignal {
                    signal: format!("{}{}", info.path, bits),
                    io: info.io.variant_name(),
                };
                if config.strict {
                    return Err(warning);
                }
                log::warn!("{warning}");
                warnings.push(warning);
            }
        }
        Ok(warnings)
    }
}
