// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use fixedbitset::FixedBitSet;
use indexmap::IndexMap;

use crate::introspect::LineTrace;
use crate::{Bits, BlockKind, ElabError, IO, ModuleCore, ModuleView, SignalId, SignalSlice};

/// A signal in the elaborated design.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalInfo {
    pub(crate) path: String,
    pub(crate) name: String,
    pub(crate) io: IO,
    pub(crate) module: usize,
}

impl SignalInfo {
    /// Dotted path from the top module, e.g. `q1.enq.msg`. Signals of the
    /// top module have no prefix.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Name within the owning module, e.g. `enq.msg`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn io(&self) -> IO {
        self.io
    }

    pub fn width(&self) -> usize {
        self.io.width()
    }
}

/// The bits of one signal taking part in a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub signal: SignalId,
    pub msb: usize,
    pub lsb: usize,
}

impl Endpoint {
    pub fn width(&self) -> usize {
        self.msb - self.lsb + 1
    }

    pub(crate) fn covers(&self, other: &Endpoint) -> bool {
        self.signal == other.signal && self.lsb <= other.lsb && other.msb <= self.msb
    }
}

/// A resolved point-to-point connection: `driver` is copied into `load`
/// whenever combinational logic is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionEdge {
    pub driver: Endpoint,
    pub load: Endpoint,
}

#[derive(Debug, Clone)]
pub struct BlockInfo {
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) kind: BlockKind,
    pub(crate) module: usize,
    pub(crate) reads: Vec<SignalId>,
    pub(crate) writes: Vec<Endpoint>,
    /// Signals the body may read: declared reads plus written signals.
    pub(crate) readable: FixedBitSet,
}

impl BlockInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted path of the block, e.g. `q1.comb`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn reads(&self) -> &[SignalId] {
        &self.reads
    }

    pub fn writes(&self) -> &[Endpoint] {
        &self.writes
    }
}

/// One step of the combinational schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Copy a connection's driver bits into its load.
    Edge(usize),
    /// Run a combinational block.
    Block(usize),
}

pub(crate) struct ModuleInfo {
    pub(crate) path: String,
    pub(crate) type_name: String,
    pub(crate) inst_name: Option<String>,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) signals: Range<usize>,
    pub(crate) edges: Range<usize>,
    pub(crate) line_trace: Option<Rc<LineTrace>>,
}

/// The flattened result of elaborating a module tree. Modules are stored in
/// post-order, so every module's signals and connections occupy contiguous
/// ranges and the top module comes last.
pub struct Design {
    /// Module cores in the same order as `modules`.
    pub(crate) cores: Vec<Rc<RefCell<ModuleCore>>>,
    pub(crate) modules: Vec<ModuleInfo>,
    pub(crate) signals: Vec<SignalInfo>,
    pub(crate) by_path: IndexMap<String, SignalId>,
    pub(crate) edges: Vec<ConnectionEdge>,
    pub(crate) constants: Vec<(Endpoint, Bits)>,
    pub(crate) blocks: Vec<BlockInfo>,
    pub(crate) schedule: Vec<Step>,
    pub(crate) sequential: Vec<usize>,
    pub(crate) warnings: Vec<ElabError>,
}

impl std::fmt::Debug for Design {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Design")
            .field("signals", &self.signals)
            .field("edges", &self.edges)
            .field("blocks", &self.blocks)
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}

impl Design {
    pub(crate) fn top_index(&self) -> usize {
        self.modules.len() - 1
    }

    /// Returns a view of the top module.
    pub fn top(&self) -> ModuleView<'_> {
        ModuleView::new(self, self.top_index())
    }

    /// Returns a view of the module at the given dotted instance path; the
    /// top module's path is the empty string.
    pub fn module(&self, path: impl AsRef<str>) -> Option<ModuleView<'_>> {
        self.modules
            .iter()
            .position(|module| module.path == path.as_ref())
            .map(|index| ModuleView::new(self, index))
    }

    /// Looks up a signal by its dotted path.
    pub fn signal(&self, path: impl AsRef<str>) -> Option<SignalId> {
        self.by_path.get(path.as_ref()).copied()
    }

    pub fn signal_info(&self, id: SignalId) -> &SignalInfo {
        &self.signals[id.0]
    }

    /// All signals, in id order.
    pub fn signals(&self) -> &[SignalInfo] {
        &self.signals
    }

    /// All connections, grouped by the module that declared them.
    pub fn edges(&self) -> &[ConnectionEdge] {
        &self.edges
    }

    pub fn blocks(&self) -> &[BlockInfo] {
        &self.blocks
    }

    /// The combinational evaluation order.
    pub fn schedule(&self) -> &[Step] {
        &self.schedule
    }

    /// Sequential blocks in the order they run at each clock edge.
    pub fn sequential_blocks(&self) -> impl Iterator<Item = &BlockInfo> {
        self.sequential.iter().map(|index| &self.blocks[*index])
    }

    /// Problems that did not abort elaboration, such as undriven signals
    /// outside strict mode.
    pub fn warnings(&self) -> &[ElabError] {
        &self.warnings
    }

    /// Renders an endpoint as `path`, or `path[msb:lsb]` when it covers only
    /// part of the signal (`path[i]` for a single bit).
    pub fn endpoint_name(&self, endpoint: &Endpoint) -> String {
        endpoint_name(&self.signals[endpoint.signal.0], endpoint.msb, endpoint.lsb)
    }

    pub fn step_name(&self, step: &Step) -> String {
        match step {
            Step::Edge(index) => {
                let edge = &self.edges[*index];
                format!(
                    "{} -> {}",
                    self.endpoint_name(&edge.driver),
                    self.endpoint_name(&edge.load)
                )
            }
            Step::Block(index) => self.blocks[*index].path.clone(),
        }
    }
}

/// Finds the endpoint of `slice` among `signals`. Returns `None` if the
/// slice's module is gone, was never elaborated, or is not one of `cores`.
pub(crate) fn locate(
    cores: &[Rc<RefCell<ModuleCore>>],
    signals: &[SignalInfo],
    slice: &SignalSlice,
) -> Option<Endpoint> {
    let core = slice.signal.module.upgrade()?;
    let inner = core.borrow();
    let base = inner.signal_base?;
    let offset = inner.signals.get_index_of(slice.signal.name.as_str())?;
    let info = signals.get(base + offset)?;
    if !Rc::ptr_eq(cores.get(info.module)?, &core) {
        return None;
    }
    Some(Endpoint {
        signal: SignalId(base + offset),
        msb: slice.msb,
        lsb: slice.lsb,
    })
}

pub(crate) fn endpoint_name(signal: &SignalInfo, msb: usize, lsb: usize) -> String {
    if lsb == 0 && msb + 1 == signal.width() {
        signal.path.clone()
    } else if msb == lsb {
        format!("{}[{}]", signal.path, msb)
    } else {
        format!("{}[{}:{}]", signal.path, msb, lsb)
    }
}

/// Joins a module path and a name within that module.
pub(crate) fn join_path(module_path: &str, name: &str) -> String {
    if module_path.is_empty() {
        name.to_string()
    } else {
        format!("{module_path}.{name}")
    }
}
