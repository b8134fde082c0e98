// SPDX-License-Identifier: Apache-2.0

use crate::{Design, ElabError, Module, SimConfig};

impl Module {
    /// Elaborates this module tree for structural inspection, with default
    /// options. Update block bodies are discarded; use a
    /// [`Simulator`](crate::Simulator) to run the design. The tree is frozen
    /// afterwards, whether or not elaboration succeeds.
    pub fn elaborate(&self) -> Result<Design, ElabError> {
        self.elaborate_with(&SimConfig::default())
    }

    pub fn elaborate_with(&self, config: &SimConfig) -> Result<Design, ElabError> {
        crate::elab::elaborate(self, config).map(|(design, _)| design)
    }
}
