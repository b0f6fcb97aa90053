//! Random Access Machine (RAM) interpreter.
//!
//! Runs programs written against the classic accumulator machine used in
//! complexity theory, records a trace of every executed step and measures
//! the run under the uniform and logarithmic cost models.
//!
//! # Architecture
//!
//! - **Registers**: unbounded, zero-initialized `i64` registers; `R0` is the
//!   accumulator and the implicit operand of arithmetic and jumps
//! - **Operands**: literal (`=v`), direct (`R(a)`) and indirect (`R(R(a))`)
//! - **Program counter**: 1-based; jumps name positions directly
//! - **Tapes**: a read-once input tape and an append-only output tape
//! - **Costs**: computed from the trace after the run, never during it
//!
//! # Modules
//!
//! - [`errors`]: Runtime faults
//! - [`isa`]: Instruction set definition and categories
//! - [`operand`]: Addressing modes and operand resolution
//! - [`program`]: Immutable programs and the program builder
//! - [`programs`]: Ready-made sample programs
//! - [`vm`]: Interpreter, execution state and cost analysis

pub mod errors;
pub mod isa;
#[cfg(test)]
mod isa_static_check;
pub mod operand;
pub mod program;
pub mod programs;
pub mod vm;
