//! Property-based tests for the interpreter.
//!
//! Uses proptest to check invariants across randomly generated inputs.

use super::*;
use crate::machine::operand::{Operand, Target};
use crate::machine::programs;
use proptest::prelude::*;
use std::collections::HashMap;

/// Builds a program that reads `n` values into consecutive registers.
fn read_n(n: usize) -> Program {
    Program::build(|p| {
        for i in 1..=n {
            p.read(Target::Literal(i));
        }
        p.halt();
    })
}

// ========================================================================
// Register store
// ========================================================================

proptest! {
    /// The register store behaves like a map defaulting to zero.
    #[test]
    fn prop_registers_match_sparse_model(
        writes in prop::collection::vec((0usize..2_000, any::<i64>()), 0..40),
        probes in prop::collection::vec(0usize..4_000, 0..40),
    ) {
        let mut regs = RegisterStore::new();
        let mut model = HashMap::new();
        for &(idx, value) in &writes {
            regs.set(idx, value).unwrap();
            model.insert(idx, value);
        }
        for idx in probes.iter().copied().chain(writes.iter().map(|&(idx, _)| idx)) {
            prop_assert_eq!(regs.get(idx), model.get(&idx).copied().unwrap_or(0));
        }
        let highest = writes.iter().map(|&(idx, _)| idx).max().unwrap_or(0);
        prop_assert_eq!(regs.max_written(), highest);
        prop_assert!(regs.capacity() > highest);
    }

    /// Capacity only ever grows by doubling from the initial size.
    #[test]
    fn prop_capacity_is_power_of_two_multiple(idx in 0usize..100_000) {
        let mut regs = RegisterStore::new();
        regs.set(idx, 1).unwrap();
        let ratio = regs.capacity() / DEFAULT_CAPACITY;
        prop_assert_eq!(regs.capacity() % DEFAULT_CAPACITY, 0);
        prop_assert!(ratio.is_power_of_two());
        prop_assert!(regs.capacity() / 2 <= idx.max(DEFAULT_CAPACITY / 2));
    }
}

// ========================================================================
// Arithmetic
// ========================================================================

proptest! {
    /// DIV truncates toward zero for every representable quotient.
    #[test]
    fn prop_division_truncates(a in any::<i64>(), b in any::<i64>()) {
        prop_assume!(b != 0);
        prop_assume!(!(a == i64::MIN && b == -1));
        let program = Program::build(|p| {
            p.load(Operand::Literal(a));
            p.div(Operand::Literal(b));
            p.write(Operand::Direct(0));
            p.halt();
        });
        prop_assert_eq!(run(&program, []).into_result(), Ok(vec![a / b]));
    }

    /// Overflowing addition faults instead of wrapping.
    #[test]
    fn prop_addition_never_wraps(a in any::<i64>(), b in any::<i64>()) {
        let program = Program::build(|p| {
            p.load(Operand::Literal(a));
            p.add(Operand::Literal(b));
            p.write(Operand::Direct(0));
            p.halt();
        });
        let expected = a
            .checked_add(b)
            .map(|sum| vec![sum])
            .ok_or(Fault::ArithmeticOverflow { instruction: "ADD" });
        prop_assert_eq!(run(&program, []).into_result(), expected);
    }
}

// ========================================================================
// Execution
// ========================================================================

proptest! {
    /// Running the same program on the same input twice gives identical outcomes.
    #[test]
    fn prop_reruns_are_identical(
        values in prop::collection::vec(-1_000i64..1_000, 0..30),
    ) {
        let input: Vec<i64> = values.into_iter().filter(|&v| v != 0).chain([0]).collect();
        let machine = Machine::new(programs::sum_until_zero());
        let first = machine.run(input.iter().copied());
        let second = machine.run(input.iter().copied());
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.output(), Some(&[input.iter().sum::<i64>()][..]));
    }

    /// Reading one value more than provided faults on that read.
    #[test]
    fn prop_read_exhaustion(values in prop::collection::vec(any::<i64>(), 0..20)) {
        let n = values.len();
        let outcome = Machine::new(read_n(n + 1)).run(values);
        match outcome {
            Outcome::Failure { fault, position, trace } => {
                prop_assert_eq!(fault, Fault::InputExhausted { consumed: n });
                prop_assert_eq!(position, n + 1);
                prop_assert_eq!(trace.len(), n);
            }
            other => prop_assert!(false, "expected exhaustion, got {:?}", other),
        }
    }

    /// The absolute value program agrees with `i64::abs`.
    #[test]
    fn prop_absolute_value(v in -1_000_000_000i64..1_000_000_000) {
        let outcome = run(&programs::absolute_value(), [v]);
        prop_assert_eq!(outcome.output(), Some(&[v.abs()][..]));
        let cost = outcome.cost();
        prop_assert_eq!(cost.uniform, if v > 0 { 4 } else { 6 });
    }

    /// Every operand costs at least one bit, so the logarithmic total never
    /// falls below the uniform total.
    #[test]
    fn prop_logarithmic_dominates_uniform(
        values in prop::collection::vec(-1_000i64..1_000, 0..30),
    ) {
        let input: Vec<i64> = values.into_iter().filter(|&v| v != 0).chain([0]).collect();
        let cost = run(&programs::sum_until_zero(), input).cost();
        prop_assert!(cost.logarithmic >= cost.uniform);
        prop_assert_eq!(cost.profile.total(), cost.logarithmic);
    }
}

// ========================================================================
// Cost helpers
// ========================================================================

proptest! {
    /// `bit_length(n)` is the smallest `l` with `n < 2^l`.
    #[test]
    fn prop_bit_length_bounds(n in 1u64..) {
        let l = bit_length(n);
        prop_assert!(l >= 1 && l <= 64);
        prop_assert!(n >> (l - 1) == 1);
    }
}
