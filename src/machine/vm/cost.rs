//! Cost estimation over execution traces.
//!
//! Two models are computed in a single walk over the trace:
//! - **Uniform**: one unit per executed instruction that carries an operand.
//! - **Logarithmic**: each such instruction is charged the bit length of
//!   every address and value its operand touches, read from the register
//!   snapshot recorded with the step.
//!
//! `HALT` has no operand and costs nothing in either model.

use super::registers::RegisterStore;
use super::state::Step;
use crate::machine::isa::{CATEGORY_COUNT, Category, Instruction};
use crate::machine::operand::Operand;

/// Cost models supported by the analyzer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CostModel {
    Uniform,
    Logarithmic,
}

/// Number of binary digits needed to write `n`.
///
/// `floor(log2(n)) + 1` for `n >= 1`; zero is written with one digit.
pub const fn bit_length(n: u64) -> u64 {
    if n == 0 {
        1
    } else {
        (u64::BITS - n.leading_zeros()) as u64
    }
}

/// Cost of executing `instruction` under `model`, given the registers
/// recorded for that step.
pub fn weight(instruction: &Instruction, registers: &RegisterStore, model: CostModel) -> u64 {
    let Some(operand) = instruction.operand() else {
        return 0;
    };
    match model {
        CostModel::Uniform => 1,
        CostModel::Logarithmic => operand_weight(operand, registers),
    }
}

fn operand_weight(operand: Operand, registers: &RegisterStore) -> u64 {
    match operand {
        Operand::Literal(v) => bit_length(v.unsigned_abs()),
        Operand::Direct(addr) => {
            bit_length(addr as u64) + bit_length(registers.get(addr).unsigned_abs())
        }
        Operand::Indirect(addr) => {
            let inner = registers.get(addr);
            // A negative inner address only shows up in snapshots taken after
            // the accumulator was overwritten; such a register reads as 0.
            let value = usize::try_from(inner).map_or(0, |idx| registers.get(idx));
            bit_length(addr as u64)
                + bit_length(inner.unsigned_abs())
                + bit_length(value.unsigned_abs())
        }
    }
}

/// Logarithmic cost broken down by instruction category.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CostProfile {
    counts: [u64; CATEGORY_COUNT],
}

impl CostProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds cost to the specified category.
    #[inline(always)]
    pub fn add(&mut self, category: Category, amount: u64) {
        let slot = &mut self.counts[category as usize];
        *slot = slot.saturating_add(amount);
    }

    pub fn get(&self, category: Category) -> u64 {
        self.counts[category as usize]
    }

    /// Returns the total cost across all categories.
    pub fn total(&self) -> u64 {
        self.counts
            .iter()
            .fold(0u64, |acc, &v| acc.saturating_add(v))
    }

    /// Returns an iterator over all categories and their costs.
    pub fn iter(&self) -> impl Iterator<Item = (Category, u64)> {
        Category::ALL.into_iter().zip(self.counts)
    }
}

/// Both cost totals for one run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CostReport {
    /// Uniform-cost total.
    pub uniform: u64,
    /// Logarithmic-cost total.
    pub logarithmic: u64,
    /// Logarithmic cost per category; sums to `logarithmic`.
    pub profile: CostProfile,
}

impl CostReport {
    /// Total under the given model.
    pub fn total(&self, model: CostModel) -> u64 {
        match model {
            CostModel::Uniform => self.uniform,
            CostModel::Logarithmic => self.logarithmic,
        }
    }
}

/// Walks `trace` once and accumulates both cost models.
pub fn analyze(trace: &[Step]) -> CostReport {
    let mut report = CostReport::default();
    for step in trace {
        let uniform = weight(&step.instruction, &step.registers, CostModel::Uniform);
        let logarithmic = weight(&step.instruction, &step.registers, CostModel::Logarithmic);
        report.uniform = report.uniform.saturating_add(uniform);
        report.logarithmic = report.logarithmic.saturating_add(logarithmic);
        report
            .profile
            .add(step.instruction.category(), logarithmic);
    }
    report
}
