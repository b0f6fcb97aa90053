use super::registers::RegisterStore;
use crate::machine::errors::Fault;
use crate::machine::isa::Instruction;
use crate::machine::operand::{Operand, Target};
use crate::machine::program::Program;
use std::collections::VecDeque;

/// Lifecycle of a run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RunState {
    Running,
    Halted,
    Faulted(Fault),
}

/// How the program counter moves once an instruction has executed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum Flow {
    /// Fall through to the next position.
    Next,
    /// Continue at the given position.
    Goto(usize),
    /// Stop the machine.
    Halt,
}

/// One executed instruction and the registers right after it ran.
///
/// The snapshot holds registers `0..=max_written` only.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Step {
    /// 1-based position the instruction was fetched from.
    pub position: usize,
    pub instruction: Instruction,
    /// Snapshot of the register file after execution.
    pub registers: RegisterStore,
}

/// Mutable state of a single run.
///
/// Owns the program counter, the register file and both tapes. A fresh
/// state is created for every run and threaded through [`step`](Self::step)
/// until it leaves [`RunState::Running`].
#[derive(Clone, Debug)]
pub struct ExecutionState {
    /// 1-based program counter.
    pc: usize,
    registers: RegisterStore,
    input: VecDeque<i64>,
    /// Number of input values consumed so far.
    consumed: usize,
    output: Vec<i64>,
    run_state: RunState,
    /// Number of successfully executed steps.
    steps: u64,
}

impl ExecutionState {
    /// Creates the initial state: `pc = 1`, the given (zeroed) registers, running.
    pub fn new(input: impl IntoIterator<Item = i64>, registers: RegisterStore) -> Self {
        Self {
            pc: 1,
            registers,
            input: input.into_iter().collect(),
            consumed: 0,
            output: Vec::new(),
            run_state: RunState::Running,
            steps: 0,
        }
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn registers(&self) -> &RegisterStore {
        &self.registers
    }

    /// Input values not yet read.
    pub fn remaining_input(&self) -> &VecDeque<i64> {
        &self.input
    }

    pub fn output(&self) -> &[i64] {
        &self.output
    }

    pub fn run_state(&self) -> &RunState {
        &self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    /// Number of instructions executed without faulting.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Moves the run into the faulted state.
    pub(super) fn fault(&mut self, fault: Fault) {
        self.run_state = RunState::Faulted(fault);
    }

    /// Consumes the state, returning the output tape.
    pub(super) fn into_output(self) -> Vec<i64> {
        self.output
    }

    /// Fetches and executes the instruction at the program counter.
    ///
    /// On success the program counter has moved on (or the machine has
    /// halted) and the executed step is returned. On failure the run moves
    /// to [`RunState::Faulted`]; registers, tapes and the program counter
    /// are left as they were, so the counter still names the faulting
    /// instruction.
    ///
    /// Returns [`Fault::NotRunning`] without touching the state once the
    /// run has halted or faulted.
    pub fn step(&mut self, program: &Program) -> Result<Step, Fault> {
        if !self.is_running() {
            return Err(Fault::NotRunning);
        }
        self.advance(program).map_err(|fault| {
            self.run_state = RunState::Faulted(fault.clone());
            fault
        })
    }

    fn advance(&mut self, program: &Program) -> Result<Step, Fault> {
        let position = self.pc;
        let instruction = program.fetch(position)?;

        match self.execute(instruction)? {
            Flow::Next => self.pc += 1,
            Flow::Goto(target) => self.pc = target,
            Flow::Halt => self.run_state = RunState::Halted,
        }
        self.steps += 1;

        Ok(Step {
            position,
            instruction,
            registers: self.registers.snapshot(),
        })
    }

    /// Executes a single instruction.
    ///
    /// Only control instructions produce anything other than [`Flow::Next`].
    fn execute(&mut self, instruction: Instruction) -> Result<Flow, Fault> {
        match instruction {
            Instruction::Load(operand) => self.op_load(operand),
            Instruction::Store(target) => self.op_store(target),
            Instruction::Add(operand) => self.op_arith(operand, RegisterStore::add),
            Instruction::Sub(operand) => self.op_arith(operand, RegisterStore::sub),
            Instruction::Mult(operand) => self.op_arith(operand, RegisterStore::mult),
            Instruction::Div(operand) => self.op_arith(operand, RegisterStore::div),
            Instruction::Jump(target) => Ok(Flow::Goto(target)),
            Instruction::Jzero(target) => Ok(self.branch_if(self.registers.accumulator() == 0, target)),
            Instruction::Jgtz(target) => Ok(self.branch_if(self.registers.accumulator() > 0, target)),
            Instruction::Read(target) => self.op_read(target),
            Instruction::Write(operand) => self.op_write(operand),
            Instruction::Halt => Ok(Flow::Halt),
        }
    }

    fn op_load(&mut self, operand: Operand) -> Result<Flow, Fault> {
        let value = operand.resolve(&self.registers)?;
        self.registers.load(value);
        Ok(Flow::Next)
    }

    fn op_store(&mut self, target: Target) -> Result<Flow, Fault> {
        let acc = self.registers.accumulator();
        self.registers.set(target.address(), acc)?;
        Ok(Flow::Next)
    }

    fn op_arith(
        &mut self,
        operand: Operand,
        op: fn(&mut RegisterStore, i64) -> Result<(), Fault>,
    ) -> Result<Flow, Fault> {
        let value = operand.resolve(&self.registers)?;
        op(&mut self.registers, value)?;
        Ok(Flow::Next)
    }

    /// Conditional jumps land on `target` when taken and on the following
    /// position otherwise.
    fn branch_if(&self, taken: bool, target: usize) -> Flow {
        if taken {
            Flow::Goto(target)
        } else {
            Flow::Goto(self.pc + 1)
        }
    }

    fn op_read(&mut self, target: Target) -> Result<Flow, Fault> {
        let value = *self.input.front().ok_or(Fault::InputExhausted {
            consumed: self.consumed,
        })?;
        self.registers.set(target.address(), value)?;
        self.input.pop_front();
        self.consumed += 1;
        Ok(Flow::Next)
    }

    fn op_write(&mut self, operand: Operand) -> Result<Flow, Fault> {
        let value = operand.resolve(&self.registers)?;
        self.output.push(value);
        Ok(Flow::Next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(input: &[i64]) -> ExecutionState {
        ExecutionState::new(input.iter().copied(), RegisterStore::new())
    }

    /// Every instruction kind, with the accumulator chosen so that
    /// conditional jumps are taken.
    fn every_instruction() -> Vec<Instruction> {
        vec![
            Instruction::Load(Operand::Literal(0)),
            Instruction::Store(Target::Literal(1)),
            Instruction::Add(Operand::Literal(1)),
            Instruction::Sub(Operand::Literal(1)),
            Instruction::Mult(Operand::Literal(2)),
            Instruction::Div(Operand::Literal(1)),
            Instruction::Jump(5),
            Instruction::Jzero(5),
            Instruction::Jgtz(5),
            Instruction::Read(Target::Direct(2)),
            Instruction::Write(Operand::Direct(0)),
            Instruction::Halt,
        ]
    }

    #[test]
    fn initial_state() {
        let s = state(&[1, 2]);
        assert_eq!(s.pc(), 1);
        assert!(s.is_running());
        assert_eq!(s.steps(), 0);
        assert_eq!(s.remaining_input(), &VecDeque::from(vec![1, 2]));
        assert!(s.output().is_empty());
    }

    #[test]
    fn flow_agrees_with_category() {
        for instruction in every_instruction() {
            let mut s = state(&[9]);
            if instruction == Instruction::Jgtz(5) {
                s.registers.load(1);
            }
            let flow = s.execute(instruction).unwrap();
            assert_eq!(
                flow != Flow::Next,
                instruction.manages_pc(),
                "{instruction} produced {flow:?}"
            );
        }
    }

    #[test]
    fn conditional_jump_not_taken_advances() {
        let program = Program::build(|p| {
            p.load(Operand::Literal(3));
            p.jzero(1);
            p.halt();
        });
        let mut s = state(&[]);
        s.step(&program).unwrap();
        s.step(&program).unwrap();
        assert_eq!(s.pc(), 3);
    }

    #[test]
    fn conditional_jump_taken_lands_on_target() {
        let program = Program::build(|p| {
            p.load(Operand::Literal(-3));
            p.jgtz(1);
            p.jzero(1);
            p.halt();
        });
        let mut s = state(&[]);
        s.step(&program).unwrap();
        s.step(&program).unwrap();
        assert_eq!(s.pc(), 3);

        s.registers.load(0);
        s.step(&program).unwrap();
        assert_eq!(s.pc(), 1);
    }

    #[test]
    fn halt_keeps_pc() {
        let program = Program::build(|p| {
            p.halt();
        });
        let mut s = state(&[]);
        let step = s.step(&program).unwrap();
        assert_eq!(step.position, 1);
        assert_eq!(s.pc(), 1);
        assert_eq!(s.run_state(), &RunState::Halted);
    }

    #[test]
    fn failed_step_changes_nothing() {
        let program = Program::build(|p| {
            p.load(Operand::Literal(5));
            p.div(Operand::Direct(3));
        });
        let mut s = state(&[]);
        s.step(&program).unwrap();
        let before = s.clone();
        assert_eq!(s.step(&program), Err(Fault::DivisionByZero));
        assert_eq!(s.pc(), before.pc());
        assert_eq!(s.registers(), before.registers());
        assert_eq!(s.steps(), 1);
        assert_eq!(s.run_state(), &RunState::Faulted(Fault::DivisionByZero));
    }

    #[test]
    fn step_after_halt_is_refused() {
        let program = Program::build(|p| {
            p.halt();
        });
        let mut s = state(&[]);
        s.step(&program).unwrap();
        assert_eq!(s.step(&program), Err(Fault::NotRunning));
        assert_eq!(s.run_state(), &RunState::Halted);
        assert_eq!(s.steps(), 1);
    }

    #[test]
    fn step_after_fault_is_refused() {
        let program = Program::build(|p| {
            p.load(Operand::Literal(5));
            p.div(Operand::Direct(5));
            p.halt();
        });
        let mut s = state(&[]);
        s.step(&program).unwrap();
        assert_eq!(s.step(&program), Err(Fault::DivisionByZero));
        assert_eq!(s.step(&program), Err(Fault::NotRunning));
        assert_eq!(s.run_state(), &RunState::Faulted(Fault::DivisionByZero));
        assert_eq!(s.pc(), 2);
        assert_eq!(s.steps(), 1);
    }

    #[test]
    fn store_past_register_limit_faults() {
        let program = Program::build(|p| {
            p.load(Operand::Literal(1));
            p.store(Target::Literal(1 << 50));
        });
        let mut s = state(&[]);
        s.step(&program).unwrap();
        assert_eq!(
            s.step(&program),
            Err(Fault::RegisterLimit {
                index: 1 << 50,
                limit: crate::machine::vm::DEFAULT_LIMIT
            })
        );
        assert_eq!(s.registers().max_written(), 0);
    }

    #[test]
    fn read_past_register_limit_keeps_input() {
        let program = Program::build(|p| {
            p.read(Target::Direct(usize::MAX));
        });
        let mut s = state(&[7]);
        assert!(matches!(
            s.step(&program),
            Err(Fault::RegisterLimit { index: usize::MAX, .. })
        ));
        assert_eq!(s.remaining_input(), &VecDeque::from(vec![7]));
    }

    #[test]
    fn read_consumes_front_to_back() {
        let program = Program::build(|p| {
            p.read(Target::Literal(1));
            p.read(Target::Direct(2));
            p.read(Target::Literal(3));
        });
        let mut s = state(&[7, 8]);
        s.step(&program).unwrap();
        s.step(&program).unwrap();
        assert_eq!(s.registers().get(1), 7);
        assert_eq!(s.registers().get(2), 8);
        assert!(s.remaining_input().is_empty());
        assert_eq!(
            s.step(&program),
            Err(Fault::InputExhausted { consumed: 2 })
        );
    }

    #[test]
    fn store_writes_to_target_address() {
        let program = Program::build(|p| {
            p.load(Operand::Literal(11));
            p.store(Target::Literal(40));
            p.store(Target::Direct(3));
        });
        let mut s = state(&[]);
        for _ in 0..3 {
            s.step(&program).unwrap();
        }
        assert_eq!(s.registers().get(40), 11);
        assert_eq!(s.registers().get(3), 11);
        assert_eq!(s.registers().max_written(), 40);
    }

    #[test]
    fn snapshot_is_taken_after_execution() {
        let program = Program::build(|p| {
            p.load(Operand::Literal(4));
        });
        let mut s = state(&[]);
        let step = s.step(&program).unwrap();
        assert_eq!(step.registers.accumulator(), 4);
    }

    #[test]
    fn snapshot_is_trimmed_to_used_registers() {
        let program = Program::build(|p| {
            p.load(Operand::Literal(2));
            p.store(Target::Literal(20));
        });
        let mut s = state(&[]);
        s.step(&program).unwrap();
        let step = s.step(&program).unwrap();
        assert_eq!(s.registers().capacity(), 32);
        assert_eq!(step.registers.capacity(), 21);
        assert_eq!(&step.registers, s.registers());
    }
}
