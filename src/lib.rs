//! Random Access Machine interpreter.
//!
//! Provides the RAM instruction set, a program builder, a deterministic
//! interpreter with execution traces, and uniform and logarithmic cost
//! analysis.

pub mod machine;
pub mod utils;
