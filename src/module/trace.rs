// SPDX-License-Identifier: Apache-2.0

use std::rc::Rc;

use crate::{Module, TraceView};

impl Module {
    /// Sets the single-line rendering of this module's state, e.g.
    /// `"{enq.msg} {enq.val} {enq.rdy} () {deq.msg} {deq.val} {deq.rdy}"`.
    /// The closure reads signals by their name in this module.
    pub fn set_line_trace(&self, trace: impl Fn(&TraceView<'_>) -> String + 'static) {
        self.assert_not_frozen();
        self.core.borrow_mut().line_trace = Some(Rc::new(trace));
    }
}
