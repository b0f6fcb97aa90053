//! Instruction operands and their addressing modes.
//!
//! [`Operand`] covers the value-producing modes. [`Target`] is the narrower
//! type accepted by `STORE` and `READ`, which cannot address indirectly.

use crate::machine::errors::Fault;
use crate::machine::vm::RegisterStore;
use std::fmt::{self, Display};

/// Value-producing operand.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Operand {
    /// `=v`: the value itself.
    Literal(i64),
    /// `R(a)`: the contents of register `a`.
    Direct(usize),
    /// `R(R(a))`: the contents of the register whose index is held in register `a`.
    Indirect(usize),
}

impl Operand {
    /// Literal operand for a 1-based program position.
    pub fn position(position: usize) -> Self {
        Operand::Literal(i64::try_from(position).unwrap_or(i64::MAX))
    }

    /// Resolves the operand against `registers` without modifying them.
    ///
    /// Returns [`Fault::NegativeAddress`] if an indirect operand goes
    /// through a register holding a negative value.
    pub fn resolve(&self, registers: &RegisterStore) -> Result<i64, Fault> {
        match *self {
            Operand::Literal(v) => Ok(v),
            Operand::Direct(addr) => Ok(registers.get(addr)),
            Operand::Indirect(addr) => {
                let address = registers.get(addr);
                let target =
                    usize::try_from(address).map_err(|_| Fault::NegativeAddress { address })?;
                Ok(registers.get(target))
            }
        }
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(v) => write!(f, "={v}"),
            Operand::Direct(addr) => write!(f, "R({addr})"),
            Operand::Indirect(addr) => write!(f, "R(R({addr}))"),
        }
    }
}

/// Destination of `STORE` and `READ`.
///
/// Both modes name the written register by their own value; they differ
/// only in how the logarithmic cost model charges them.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Target {
    /// `=a`: register `a`, charged as a literal.
    Literal(usize),
    /// `R(a)`: register `a`, charged as a direct access.
    Direct(usize),
}

impl Target {
    /// Index of the register written through this target.
    pub const fn address(&self) -> usize {
        match *self {
            Target::Literal(addr) | Target::Direct(addr) => addr,
        }
    }
}

impl From<Target> for Operand {
    fn from(target: Target) -> Self {
        match target {
            Target::Literal(addr) => Operand::position(addr),
            Target::Direct(addr) => Operand::Direct(addr),
        }
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&Operand::from(*self), f)
    }
}
