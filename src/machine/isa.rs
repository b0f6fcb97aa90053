//! Instruction Set Architecture (ISA) definitions.
//!
//! The [`for_each_instruction!`](crate::for_each_instruction) macro holds the
//! canonical list of operand-carrying instructions and invokes a callback
//! macro for code generation, so the ISA fingerprint test and the
//! [`Instruction`] enum are generated from the same table.
//!
//! Each entry reads `Name(Payload) = "MNEMONIC", Category`, where the
//! payload is the operand type the instruction accepts:
//! - `Operand`: literal, direct or indirect value
//! - `Target`: literal or direct destination register
//! - `usize`: 1-based jump target
//!
//! `HALT` carries no operand and is appended by the generator.

use crate::machine::operand::{Operand, Target};
use std::fmt::{self, Display};

/// Invokes a callback macro with the complete instruction definition list.
#[macro_export]
macro_rules! for_each_instruction {
    ($callback:ident) => {
        $callback! {
            // =========================
            // Arithmetic
            // =========================
            /// LOAD a ; R0 = a
            Load(Operand) = "LOAD", Arithmetic,
            /// STORE t ; R[t] = R0
            Store(Target) = "STORE", Arithmetic,
            /// ADD a ; R0 = R0 + a
            Add(Operand) = "ADD", Arithmetic,
            /// SUB a ; R0 = R0 - a
            Sub(Operand) = "SUB", Arithmetic,
            /// MULT a ; R0 = R0 * a
            Mult(Operand) = "MULT", Arithmetic,
            /// DIV a ; R0 = R0 / a (fault on division by zero)
            Div(Operand) = "DIV", Arithmetic,
            // =========================
            // Control
            // =========================
            /// JUMP p ; PC = p
            Jump(usize) = "JUMP", Control,
            /// JZERO p ; if R0 == 0 then PC = p else PC = PC + 1
            Jzero(usize) = "JZERO", Control,
            /// JGTZ p ; if R0 > 0 then PC = p else PC = PC + 1
            Jgtz(usize) = "JGTZ", Control,
            // =========================
            // Input / Output
            // =========================
            /// READ t ; R[t] = next input value (fault when exhausted)
            Read(Target) = "READ", Io,
            /// WRITE a ; append a to the output
            Write(Operand) = "WRITE", Io,
        }
    };
}

macro_rules! define_instructions {
    // ---------- operand views ----------
    (@operand Operand, $v:ident) => { $v };
    (@operand Target, $v:ident) => { Operand::from($v) };
    (@operand usize, $v:ident) => { Operand::position($v) };

    (
        $(
            $(#[$doc:meta])*
            $name:ident($kind:ident) = $mnemonic:literal, $category:ident
        ),* $(,)?
    ) => {
        /// A single RAM instruction.
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum Instruction {
            $(
                $(#[$doc])*
                $name($kind),
            )*
            /// HALT ; stop the machine
            Halt,
        }

        impl Instruction {
            /// Returns the mnemonic for this instruction.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( Instruction::$name(_) => $mnemonic, )*
                    Instruction::Halt => "HALT",
                }
            }

            /// Returns the category this instruction belongs to.
            pub const fn category(&self) -> Category {
                match self {
                    $( Instruction::$name(_) => Category::$category, )*
                    Instruction::Halt => Category::Control,
                }
            }

            /// Returns the operand as a value-producing [`Operand`], or `None` for `HALT`.
            ///
            /// Targets keep their addressing mode; jump targets become literals.
            pub fn operand(&self) -> Option<Operand> {
                match *self {
                    $( Instruction::$name(operand) => Some(define_instructions!(@operand $kind, operand)), )*
                    Instruction::Halt => None,
                }
            }
        }
    };
}

for_each_instruction!(define_instructions);

/// Number of instruction categories.
pub const CATEGORY_COUNT: usize = 3;

/// Instruction categories.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Category {
    /// Accumulator and register manipulation.
    Arithmetic = 0,
    /// Jumps and `HALT`; these set the program counter themselves.
    Control = 1,
    /// Input and output tapes.
    Io = 2,
}

impl Category {
    /// All categories in discriminant order.
    pub const ALL: [Category; CATEGORY_COUNT] =
        [Category::Arithmetic, Category::Control, Category::Io];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Arithmetic => "Arithmetic",
            Category::Control => "Control",
            Category::Io => "I/O",
        }
    }

    /// Whether instructions of this category move the program counter
    /// themselves instead of falling through to the next position.
    pub const fn manages_pc(&self) -> bool {
        matches!(self, Category::Control)
    }
}

impl Instruction {
    /// Shorthand for `self.category().manages_pc()`.
    pub const fn manages_pc(&self) -> bool {
        self.category().manages_pc()
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand() {
            Some(operand) => write!(f, "{} {}", self.mnemonic(), operand),
            None => f.write_str(self.mnemonic()),
        }
    }
}
