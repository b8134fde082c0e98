// SPDX-License-Identifier: Apache-2.0

/// Options for elaboration and simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Treat undriven signals as elaboration errors rather than warnings.
    pub strict: bool,
    /// Upper bound on combinational passes per cycle. `None` picks a bound
    /// from the size of the schedule.
    pub max_delta_passes: Option<usize>,
    /// Log the top module's line trace at debug level after every cycle.
    pub trace: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            strict: false,
            max_delta_passes: None,
            trace: false,
        }
    }
}

impl SimConfig {
    pub(crate) fn delta_pass_limit(&self, schedule_len: usize) -> usize {
        self.max_delta_passes
            .unwrap_or(2 * schedule_len + 8)
            .max(1)
    }
}
