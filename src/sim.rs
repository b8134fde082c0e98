// SPDX-License-Identifier: Apache-2.0

use crate::block::BlockBody;
use crate::frame::{Frame, Store};
use crate::introspect::render;
use crate::module::RESET;
use crate::{Bits, Design, Endpoint, IO, Module, SignalId, SimConfig, SimError, Step};

/// Lifecycle of a [`Simulator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SimState {
    Constructed,
    Elaborated,
    Reset,
    Running,
    /// Entered on any error or on [`Simulator::halt`]; the simulation can no
    /// longer be driven, but its last values can still be read.
    Halted,
}

/// Elaborated design plus everything needed to evaluate it.
struct Engine {
    design: Design,
    bodies: Vec<Option<BlockBody>>,
    store: Store,
    snapshot: Vec<Bits>,
    pending_inputs: Vec<(SignalId, Bits)>,
    pass_limit: usize,
}

impl Engine {
    fn new(design: Design, bodies: Vec<Option<BlockBody>>, config: &SimConfig) -> Self {
        let mut store = Store::new(&design.signals);
        for (endpoint, value) in &design.constants {
            store.current[endpoint.signal.0].set_slice(endpoint.msb, endpoint.lsb, value);
        }
        let snapshot = store.current.clone();
        let pass_limit = config.delta_pass_limit(design.schedule.len());
        Engine {
            design,
            bodies,
            store,
            snapshot,
            pending_inputs: Vec::new(),
            pass_limit,
        }
    }

    fn apply_inputs(&mut self) {
        for (id, value) in std::mem::take(&mut self.pending_inputs) {
            self.store.current[id.0] = value;
        }
    }

    fn run_edge(&mut self, index: usize) {
        let edge = self.design.edges[index];
        let value =
            self.store.current[edge.driver.signal.0].slice(edge.driver.msb, edge.driver.lsb);
        self.store.write_current(&edge.load, &value);
    }

    fn run_block(&mut self, index: usize) -> Result<(), SimError> {
        let Engine {
            design,
            bodies,
            store,
            ..
        } = self;
        if let Some(body) = bodies[index].as_mut() {
            let mut frame = Frame::new(design, index, store);
            body(&mut frame);
            frame.finish()?;
        }
        Ok(())
    }

    /// Repeats the combinational schedule until a pass changes nothing.
    fn settle(&mut self, cycle: u64) -> Result<usize, SimError> {
        let mut unsettled = Vec::new();
        for pass in 1..=self.pass_limit {
            unsettled.clear();
            for position in 0..self.design.schedule.len() {
                let step = self.design.schedule[position];
                match step {
                    Step::Edge(index) => self.run_edge(index),
                    Step::Block(index) => self.run_block(index)?,
                }
                if self.store.take_changed() {
                    unsettled.push(step);
                }
            }
            log::trace!("Cycle {cycle} pass {pass}: {} steps changed", unsettled.len());
            if unsettled.is_empty() {
                return Ok(pass);
            }
        }
        Err(SimError::NonConvergence {
            cycle,
            passes: self.pass_limit,
            unsettled: unsettled
                .iter()
                .map(|step| self.design.step_name(step))
                .collect(),
        })
    }

    /// Runs every sequential block once and commits their writes together.
    fn clock_edge(&mut self) -> Result<(), SimError> {
        for position in 0..self.design.sequential.len() {
            self.run_block(self.design.sequential[position])?;
        }
        self.store.commit();
        Ok(())
    }

    fn cycle(&mut self, cycle: u64) -> Result<(), SimError> {
        self.apply_inputs();
        self.settle(cycle)?;
        self.snapshot.clone_from(&self.store.current);
        self.clock_edge()
    }

    fn lookup(&self, path: &str) -> Result<SignalId, SimError> {
        self.design
            .signal(path)
            .ok_or_else(|| SimError::UnknownSignal(path.to_string()))
    }

    /// The top module's `reset` input, if it has one.
    fn reset_input(&self) -> Option<SignalId> {
        self.design
            .signal(RESET)
            .filter(|id| matches!(self.design.signal_info(*id).io, IO::Input(1)))
    }
}

/// Drives a cycle-based simulation of one module tree.
///
/// Typical use: [`elaborate`](Simulator::elaborate), [`reset`](Simulator::reset),
/// then for every cycle [`set`](Simulator::set) the inputs,
/// [`eval_combinational`](Simulator::eval_combinational), check outputs with
/// [`get`](Simulator::get), and [`tick`](Simulator::tick).
pub struct Simulator {
    top: Module,
    config: SimConfig,
    state: SimState,
    engine: Option<Engine>,
    cycle: u64,
}

impl Simulator {
    pub fn new(top: &Module, config: SimConfig) -> Simulator {
        Simulator {
            top: top.clone(),
            config,
            state: SimState::Constructed,
            engine: None,
            cycle: 0,
        }
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Number of clock edges so far, including the reset cycle.
    pub fn cycle_count(&self) -> u64 {
        self.cycle
    }

    /// The elaborated design, once [`elaborate`](Simulator::elaborate) has
    /// succeeded.
    pub fn design(&self) -> Option<&Design> {
        self.engine.as_ref().map(|engine| &engine.design)
    }

    /// Stops the simulation; every later driving call fails. Values can still
    /// be read.
    pub fn halt(&mut self) {
        self.state = SimState::Halted;
    }

    /// Fails, and halts, unless the simulator is in one of `allowed`.
    fn expect_state(
        &mut self,
        operation: &'static str,
        allowed: &[SimState],
    ) -> Result<(), SimError> {
        if allowed.contains(&self.state) {
            return Ok(());
        }
        let result = Err(SimError::InvalidState {
            operation,
            state: self.state,
        });
        self.guard(result)
    }

    fn engine(&self, operation: &'static str) -> Result<&Engine, SimError> {
        self.engine.as_ref().ok_or(SimError::InvalidState {
            operation,
            state: self.state,
        })
    }

    fn engine_mut(&mut self, operation: &'static str) -> Result<&mut Engine, SimError> {
        let state = self.state;
        self.engine
            .as_mut()
            .ok_or(SimError::InvalidState { operation, state })
    }

    /// Moves to `Halted` if `result` is an error.
    fn guard<T>(&mut self, result: Result<T, SimError>) -> Result<T, SimError> {
        if let Err(err) = &result {
            log::debug!("Simulation of {} halted: {}", self.top.get_name(), err);
            self.state = SimState::Halted;
        }
        result
    }

    /// Elaborates and schedules the module tree. Undriven signals are logged
    /// as warnings, or fail elaboration in strict mode.
    pub fn elaborate(&mut self) -> Result<(), SimError> {
        self.expect_state("elaborate", &[SimState::Constructed])?;
        let result = crate::elab::elaborate(&self.top, &self.config);
        let (design, bodies) = self.guard(result.map_err(SimError::from))?;
        self.engine = Some(Engine::new(design, bodies, &self.config));
        self.state = SimState::Elaborated;
        Ok(())
    }

    /// Drives `reset` high for one full cycle, then low.
    pub fn reset(&mut self) -> Result<(), SimError> {
        self.expect_state(
            "reset",
            &[SimState::Elaborated, SimState::Reset, SimState::Running],
        )?;
        let result = self.run_reset();
        self.guard(result)?;
        self.state = SimState::Reset;
        Ok(())
    }

    fn run_reset(&mut self) -> Result<(), SimError> {
        self.cycle += 1;
        let cycle = self.cycle;
        let engine = self.engine_mut("reset")?;
        let reset = engine.reset_input();
        if let Some(id) = reset {
            engine.store.current[id.0] = Bits::from_bool(true);
        }
        engine.cycle(cycle)?;
        if let Some(id) = reset {
            engine.store.current[id.0] = Bits::from_bool(false);
        }
        self.trace();
        Ok(())
    }

    /// Runs one cycle: apply inputs, settle combinational logic, snapshot,
    /// then the clock edge.
    pub fn tick(&mut self) -> Result<(), SimError> {
        self.expect_state("tick", &[SimState::Reset, SimState::Running])?;
        self.cycle += 1;
        let cycle = self.cycle;
        let result = self.engine_mut("tick").and_then(|engine| engine.cycle(cycle));
        self.guard(result)?;
        self.state = SimState::Running;
        self.trace();
        Ok(())
    }

    /// Applies pending inputs and settles combinational logic without a
    /// clock edge, so that outputs can be checked against the inputs of the
    /// cycle about to run.
    pub fn eval_combinational(&mut self) -> Result<(), SimError> {
        self.expect_state(
            "evaluate",
            &[SimState::Elaborated, SimState::Reset, SimState::Running],
        )?;
        let cycle = self.cycle + 1;
        let result = self.engine_mut("evaluate").and_then(|engine| {
            engine.apply_inputs();
            engine.settle(cycle).map(|_| ())
        });
        self.guard(result)
    }

    /// Queues a value for a top-level input; it takes effect at the start of
    /// the next cycle or evaluation. The value is truncated or zero-extended
    /// to the width of the input.
    pub fn set(&mut self, path: impl AsRef<str>, value: impl Into<Bits>) -> Result<(), SimError> {
        self.expect_state(
            "set inputs",
            &[SimState::Elaborated, SimState::Reset, SimState::Running],
        )?;
        let value = value.into();
        let result = self.engine_mut("set inputs").and_then(|engine| {
            let id = engine.lookup(path.as_ref())?;
            let info = engine.design.signal_info(id);
            if info.module != engine.design.top_index() || !matches!(info.io, IO::Input(_)) {
                return Err(SimError::NotAnInput(path.as_ref().to_string()));
            }
            let value = value.resize(info.width());
            engine.pending_inputs.push((id, value));
            Ok(())
        });
        self.guard(result)
    }

    /// Returns the current value of any signal, by dotted path.
    pub fn get(&self, path: impl AsRef<str>) -> Result<Bits, SimError> {
        let engine = self.engine("get")?;
        let id = engine.lookup(path.as_ref())?;
        Ok(engine.store.current[id.0].clone())
    }

    /// Returns the value a signal had once combinational logic settled in
    /// the most recent cycle, before the clock edge.
    pub fn snapshot(&self, path: impl AsRef<str>) -> Result<Bits, SimError> {
        let engine = self.engine("read snapshot")?;
        let id = engine.lookup(path.as_ref())?;
        Ok(engine.snapshot[id.0].clone())
    }

    /// Returns the value of a slice of a signal.
    pub fn get_endpoint(&self, endpoint: &Endpoint) -> Result<Bits, SimError> {
        let engine = self.engine("get")?;
        Ok(engine.store.current[endpoint.signal.0].slice(endpoint.msb, endpoint.lsb))
    }

    /// Renders the top module's line trace from current values.
    pub fn line_trace(&self) -> Result<String, SimError> {
        let engine = self.engine("line trace")?;
        let design = &engine.design;
        Ok(render(design, &engine.store.current, design.top_index()))
    }

    /// Renders the line trace of the module at `path`.
    pub fn module_line_trace(&self, path: impl AsRef<str>) -> Result<String, SimError> {
        let engine = self.engine("line trace")?;
        let design = &engine.design;
        let index = design
            .modules
            .iter()
            .position(|module| module.path == path.as_ref())
            .ok_or_else(|| SimError::UnknownSignal(path.as_ref().to_string()))?;
        Ok(render(design, &engine.store.current, index))
    }

    fn trace(&self) {
        if self.config.trace {
            if let Ok(line) = self.line_trace() {
                log::debug!("{:>4}: {}", self.cycle, line);
            }
        }
    }
}
