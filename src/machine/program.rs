//! Immutable RAM programs and the builder that assembles them.
//!
//! A [`Program`] is an ordered, 1-indexed list of [`Instruction`]s. It is
//! only ever produced by a [`ProgramBuilder`] (or collected from an
//! iterator) and never changes afterwards, so one program can back many
//! concurrent runs.

use crate::machine::errors::Fault;
use crate::machine::isa::Instruction;
use crate::machine::operand::{Operand, Target};
use std::fmt::{self, Display};

/// Ordered, immutable instruction list addressed by 1-based position.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Program {
    instructions: Box<[Instruction]>,
}

impl Program {
    /// Returns an empty builder.
    pub fn builder() -> ProgramBuilder {
        ProgramBuilder::new()
    }

    /// Builds a program by running `init` against a fresh builder.
    ///
    /// ```
    /// use ram_machine::machine::operand::{Operand, Target};
    /// use ram_machine::machine::program::Program;
    ///
    /// let program = Program::build(|p| {
    ///     p.read(Target::Literal(1));
    ///     p.write(Operand::Direct(1));
    ///     p.halt();
    /// });
    /// assert_eq!(program.len(), 3);
    /// ```
    pub fn build(init: impl FnOnce(&mut ProgramBuilder)) -> Self {
        let mut builder = ProgramBuilder::new();
        init(&mut builder);
        builder.build()
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Returns the instruction at 1-based `position`.
    pub fn get(&self, position: usize) -> Option<&Instruction> {
        position
            .checked_sub(1)
            .and_then(|index| self.instructions.get(index))
    }

    /// Fetches the instruction at `position` for execution.
    ///
    /// Returns [`Fault::InvalidProgramCounter`] if `position` is outside `[1, len]`.
    pub fn fetch(&self, position: usize) -> Result<Instruction, Fault> {
        self.get(position)
            .copied()
            .ok_or(Fault::InvalidProgramCounter {
                position,
                len: self.len(),
            })
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Iterates over `(position, instruction)` pairs, positions starting at 1.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Instruction)> {
        self.instructions
            .iter()
            .enumerate()
            .map(|(index, instruction)| (index + 1, instruction))
    }
}

impl FromIterator<Instruction> for Program {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        Self {
            instructions: iter.into_iter().collect(),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, instruction) in self.iter() {
            writeln!(f, "{position:>4}: {instruction}")?;
        }
        Ok(())
    }
}

/// Appends instructions in order and produces a [`Program`].
///
/// Each method accepts only the operand type its instruction allows:
/// `store` and `read` take a [`Target`], jumps take a 1-based position,
/// everything else takes any [`Operand`].
#[derive(Clone, Debug, Default)]
pub struct ProgramBuilder {
    instructions: Vec<Instruction>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position the next appended instruction will occupy.
    pub fn next_position(&self) -> usize {
        self.instructions.len() + 1
    }

    /// Appends an arbitrary instruction.
    pub fn push(&mut self, instruction: Instruction) -> &mut Self {
        self.instructions.push(instruction);
        self
    }

    pub fn load(&mut self, operand: Operand) -> &mut Self {
        self.push(Instruction::Load(operand))
    }

    pub fn store(&mut self, target: Target) -> &mut Self {
        self.push(Instruction::Store(target))
    }

    pub fn add(&mut self, operand: Operand) -> &mut Self {
        self.push(Instruction::Add(operand))
    }

    pub fn sub(&mut self, operand: Operand) -> &mut Self {
        self.push(Instruction::Sub(operand))
    }

    pub fn mult(&mut self, operand: Operand) -> &mut Self {
        self.push(Instruction::Mult(operand))
    }

    pub fn div(&mut self, operand: Operand) -> &mut Self {
        self.push(Instruction::Div(operand))
    }

    pub fn read(&mut self, target: Target) -> &mut Self {
        self.push(Instruction::Read(target))
    }

    pub fn write(&mut self, operand: Operand) -> &mut Self {
        self.push(Instruction::Write(operand))
    }

    pub fn jump(&mut self, position: usize) -> &mut Self {
        self.push(Instruction::Jump(position))
    }

    pub fn jzero(&mut self, position: usize) -> &mut Self {
        self.push(Instruction::Jzero(position))
    }

    pub fn jgtz(&mut self, position: usize) -> &mut Self {
        self.push(Instruction::Jgtz(position))
    }

    pub fn halt(&mut self) -> &mut Self {
        self.push(Instruction::Halt)
    }

    /// Drains the builder into a program, leaving it empty for reuse.
    pub fn build(&mut self) -> Program {
        Program {
            instructions: std::mem::take(&mut self.instructions).into_boxed_slice(),
        }
    }
}
