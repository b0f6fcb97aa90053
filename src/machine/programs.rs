//! Sample programs.
//!
//! Small, well-known RAM programs used by the demo binary and the tests.

use crate::machine::operand::{Operand, Target};
use crate::machine::program::Program;

/// Names accepted by [`by_name`].
pub const NAMES: [&str; 3] = ["abs", "sum", "select"];

/// Reads one value and writes its absolute value.
///
/// ```text
///    1: READ =1
///    2: LOAD R(1)
///    3: JGTZ =6
///    4: LOAD =0
///    5: SUB R(1)
///    6: WRITE R(0)
///    7: HALT
/// ```
pub fn absolute_value() -> Program {
    Program::build(|p| {
        p.read(Target::Literal(1));
        p.load(Operand::Direct(1));
        p.jgtz(6);
        p.load(Operand::Literal(0));
        p.sub(Operand::Direct(1));
        p.write(Operand::Direct(0));
        p.halt();
    })
}

/// Reads values until a zero and writes their sum.
///
/// The running total lives in `R(2)`.
pub fn sum_until_zero() -> Program {
    Program::build(|p| {
        let top = p.next_position();
        p.read(Target::Literal(1));
        p.load(Operand::Direct(1));
        p.jzero(7);
        p.add(Operand::Direct(2));
        p.store(Target::Literal(2));
        p.jump(top);
        p.write(Operand::Direct(2));
        p.halt();
    })
}

/// Reads three values into `R(2)..R(4)`, then an index `k`, and writes
/// the `k`-th of them (1-based) through an indirect operand.
pub fn select() -> Program {
    Program::build(|p| {
        p.read(Target::Literal(2));
        p.read(Target::Literal(3));
        p.read(Target::Literal(4));
        p.read(Target::Literal(1));
        p.load(Operand::Direct(1));
        p.add(Operand::Literal(1));
        p.store(Target::Literal(1));
        p.write(Operand::Indirect(1));
        p.halt();
    })
}

/// Looks up a sample program by name.
pub fn by_name(name: &str) -> Option<Program> {
    match name {
        "abs" => Some(absolute_value()),
        "sum" => Some(sum_until_zero()),
        "select" => Some(select()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::isa::Instruction;

    #[test]
    fn every_name_resolves() {
        for name in NAMES {
            assert!(by_name(name).is_some(), "{name}");
        }
        assert!(by_name("reverse").is_none());
    }

    #[test]
    fn samples_end_with_halt() {
        for name in NAMES {
            let program = by_name(name).unwrap();
            assert_eq!(program.get(program.len()), Some(&Instruction::Halt), "{name}");
        }
    }

    #[test]
    fn absolute_value_listing() {
        assert_eq!(
            absolute_value().to_string(),
            "   1: READ =1\n   2: LOAD R(1)\n   3: JGTZ =6\n   4: LOAD =0\n   5: SUB R(1)\n   6: WRITE R(0)\n   7: HALT\n"
        );
    }

    #[test]
    fn jumps_stay_inside_the_program() {
        for name in NAMES {
            let program = by_name(name).unwrap();
            for (_, instruction) in program.iter() {
                if let Instruction::Jump(t) | Instruction::Jzero(t) | Instruction::Jgtz(t) =
                    *instruction
                {
                    assert!((1..=program.len()).contains(&t), "{name}: {instruction}");
                }
            }
        }
    }
}
