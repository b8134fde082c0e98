// SPDX-License-Identifier: Apache-2.0

use crate::design::join_path;
use crate::{Bits, ConnectionEdge, Design, IO, SignalInfo};

/// Renders one line of a module's state; see [`crate::Module::set_line_trace`].
pub type LineTrace = dyn Fn(&TraceView<'_>) -> String;

/// Read-only view of one module of an elaborated design.
#[derive(Clone, Copy)]
pub struct ModuleView<'a> {
    design: &'a Design,
    index: usize,
}

impl<'a> ModuleView<'a> {
    pub(crate) fn new(design: &'a Design, index: usize) -> Self {
        ModuleView { design, index }
    }

    /// Dotted instance path; empty for the top module.
    pub fn path(&self) -> &'a str {
        &self.design.modules[self.index].path
    }

    pub fn type_name(&self) -> &'a str {
        &self.design.modules[self.index].type_name
    }

    pub fn inst_name(&self) -> Option<&'a str> {
        self.design.modules[self.index].inst_name.as_deref()
    }

    pub fn parent(&self) -> Option<ModuleView<'a>> {
        self.design.modules[self.index]
            .parent
            .map(|index| ModuleView::new(self.design, index))
    }

    /// All signals of this module in declaration order.
    pub fn signals(&self) -> &'a [SignalInfo] {
        &self.design.signals[self.design.modules[self.index].signals.clone()]
    }

    fn filter(&self, keep: impl Fn(&IO) -> bool) -> Vec<&'a SignalInfo> {
        self.signals().iter().filter(|info| keep(&info.io)).collect()
    }

    /// Input ports, with bundle fields flattened to `bundle.field`.
    pub fn inputs(&self) -> Vec<&'a SignalInfo> {
        self.filter(|io| matches!(io, IO::Input(_)))
    }

    pub fn outputs(&self) -> Vec<&'a SignalInfo> {
        self.filter(|io| matches!(io, IO::Output(_)))
    }

    pub fn wires(&self) -> Vec<&'a SignalInfo> {
        self.filter(|io| matches!(io, IO::Internal(_)))
    }

    /// Direct submodules in instantiation order.
    pub fn submodules(&self) -> Vec<ModuleView<'a>> {
        self.design.modules[self.index]
            .children
            .iter()
            .map(|index| ModuleView::new(self.design, *index))
            .collect()
    }

    /// Connections declared in this module, including the implicit clock and
    /// reset wiring of its submodules, in resolution order.
    pub fn connections(&self) -> &'a [ConnectionEdge] {
        &self.design.edges[self.design.modules[self.index].edges.clone()]
    }

    /// Connections as `(driver, load)` names relative to this module.
    pub fn connection_names(&self) -> Vec<(String, String)> {
        let prefix = self.path();
        let relative = |name: String| -> String {
            if prefix.is_empty() {
                name
            } else {
                name.strip_prefix(prefix)
                    .and_then(|rest| rest.strip_prefix('.'))
                    .map(str::to_string)
                    .unwrap_or(name)
            }
        };
        self.connections()
            .iter()
            .map(|edge| {
                (
                    relative(self.design.endpoint_name(&edge.driver)),
                    relative(self.design.endpoint_name(&edge.load)),
                )
            })
            .collect()
    }

    /// Names of the update blocks registered on this module.
    pub fn blocks(&self) -> Vec<&'a str> {
        self.design
            .blocks
            .iter()
            .filter(|block| block.module == self.index)
            .map(|block| block.name.as_str())
            .collect()
    }
}

impl std::fmt::Debug for ModuleView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ModuleView({}: {})", self.path(), self.type_name())
    }
}

/// Current signal values of one module, as seen by its line trace.
pub struct TraceView<'a> {
    design: &'a Design,
    values: &'a [Bits],
    module: usize,
}

impl<'a> TraceView<'a> {
    pub(crate) fn new(design: &'a Design, values: &'a [Bits], module: usize) -> Self {
        TraceView {
            design,
            values,
            module,
        }
    }

    /// Returns the current value of a signal of this module, or of a
    /// submodule's signal addressed as `inst.name`; panics if there is no
    /// such signal.
    pub fn get(&self, name: impl AsRef<str>) -> &'a Bits {
        let module_path = &self.design.modules[self.module].path;
        let path = join_path(module_path, name.as_ref());
        match self.design.signal(&path) {
            Some(id) => &self.values[id.0],
            None => panic!(
                "Line trace of {:?} reads unknown signal {}",
                module_path,
                name.as_ref()
            ),
        }
    }

    /// Renders the line trace of a submodule, or an empty string if it has
    /// none.
    pub fn submodule(&self, inst_name: impl AsRef<str>) -> String {
        let module_path = &self.design.modules[self.module].path;
        let path = join_path(module_path, inst_name.as_ref());
        match self.design.modules.iter().position(|module| module.path == path) {
            Some(index) => render(self.design, self.values, index),
            None => panic!(
                "Line trace of {:?} names unknown submodule {}",
                module_path,
                inst_name.as_ref()
            ),
        }
    }
}

pub(crate) fn render(design: &Design, values: &[Bits], module: usize) -> String {
    match &design.modules[module].line_trace {
        Some(trace) => trace(&TraceView::new(design, values, module)),
        None => String::new(),
    }
}
