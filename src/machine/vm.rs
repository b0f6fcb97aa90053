//! Core interpreter.
//!
//! A [`Machine`] pairs an immutable [`Program`] with a [`MachineConfig`] and
//! runs it against input tapes. Every run builds its own
//! [`ExecutionState`], so one machine can serve any number of runs, from any
//! number of threads.

mod cost;
mod registers;
mod state;

#[cfg(test)]
mod property_tests;

pub use cost::{CostModel, CostProfile, CostReport, analyze, bit_length, weight};
pub use registers::{DEFAULT_CAPACITY, DEFAULT_LIMIT, RegisterStore};
pub use state::{ExecutionState, RunState, Step};

use crate::machine::errors::Fault;
use crate::machine::program::Program;
use crate::{debug, warn};

/// Recorded steps of one run, in execution order.
pub type Trace = Vec<Step>;

/// Execution settings shared by every run of a [`Machine`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MachineConfig {
    /// Maximum number of steps before the run fails with
    /// [`Fault::StepLimitExceeded`]. `None` runs until halt or fault.
    pub step_limit: Option<u64>,
    /// Initial register file capacity.
    pub register_capacity: usize,
    /// Number of addressable registers; writes at or past it fail with
    /// [`Fault::RegisterLimit`].
    pub register_limit: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            step_limit: None,
            register_capacity: DEFAULT_CAPACITY,
            register_limit: DEFAULT_LIMIT,
        }
    }
}

impl MachineConfig {
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    pub fn with_register_capacity(mut self, capacity: usize) -> Self {
        self.register_capacity = capacity;
        self
    }

    pub fn with_register_limit(mut self, limit: usize) -> Self {
        self.register_limit = limit;
        self
    }
}

/// Result of a complete run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The machine reached `HALT`.
    Success { output: Vec<i64>, trace: Trace },
    /// The machine stopped on a fault. `position` is the program counter at
    /// the time of the fault; `trace` holds every step completed before it.
    Failure {
        fault: Fault,
        position: usize,
        trace: Trace,
    },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn trace(&self) -> &[Step] {
        match self {
            Outcome::Success { trace, .. } | Outcome::Failure { trace, .. } => trace,
        }
    }

    /// Output tape of a successful run.
    pub fn output(&self) -> Option<&[i64]> {
        match self {
            Outcome::Success { output, .. } => Some(output),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn fault(&self) -> Option<&Fault> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Failure { fault, .. } => Some(fault),
        }
    }

    /// Uniform and logarithmic cost of the recorded trace.
    pub fn cost(&self) -> CostReport {
        analyze(self.trace())
    }

    /// Converts into the output tape or the fault, dropping the trace.
    pub fn into_result(self) -> Result<Vec<i64>, Fault> {
        match self {
            Outcome::Success { output, .. } => Ok(output),
            Outcome::Failure { fault, .. } => Err(fault),
        }
    }
}

/// RAM interpreter bound to one program.
#[derive(Clone, Debug)]
pub struct Machine {
    program: Program,
    config: MachineConfig,
}

impl Machine {
    /// Creates a machine with the default configuration.
    pub fn new(program: Program) -> Self {
        Self::with_config(program, MachineConfig::default())
    }

    pub fn with_config(program: Program, config: MachineConfig) -> Self {
        Self { program, config }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Creates the initial state for a run over `input`.
    pub fn start(&self, input: impl IntoIterator<Item = i64>) -> ExecutionState {
        let registers = RegisterStore::with_capacity(self.config.register_capacity)
            .with_limit(self.config.register_limit);
        ExecutionState::new(input, registers)
    }

    /// Runs the program on `input` until it halts or faults.
    ///
    /// Never panics on a fault; the outcome carries the cause and the
    /// trace recorded up to it. A program that loops forever without a
    /// step limit never returns.
    pub fn run(&self, input: impl IntoIterator<Item = i64>) -> Outcome {
        let mut state = self.start(input);
        let mut trace = Trace::new();

        while state.is_running() {
            if let Some(limit) = self.config.step_limit.filter(|&limit| state.steps() >= limit) {
                state.fault(Fault::StepLimitExceeded { limit });
                break;
            }

            // A failed step leaves the state faulted.
            if let Ok(step) = state.step(&self.program) {
                debug!(
                    "step {:>4} @ {:>3}: {:<16} {}",
                    trace.len() + 1,
                    step.position,
                    step.instruction.to_string(),
                    step.registers
                );
                trace.push(step);
            }
        }

        match state.run_state().clone() {
            RunState::Faulted(fault) => {
                let position = state.pc();
                warn!("run faulted at position {}: {}", position, fault);
                Outcome::Failure {
                    fault,
                    position,
                    trace,
                }
            }
            _ => {
                debug!("run halted after {} steps", trace.len());
                Outcome::Success {
                    output: state.into_output(),
                    trace,
                }
            }
        }
    }
}

/// Runs `program` once on `input` with the default configuration.
pub fn run(program: &Program, input: impl IntoIterator<Item = i64>) -> Outcome {
    Machine::new(program.clone()).run(input)
}
