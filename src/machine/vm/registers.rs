use crate::machine::errors::Fault;
use std::fmt::{self, Display};

/// Capacity of a freshly created [`RegisterStore`].
pub const DEFAULT_CAPACITY: usize = 16;

/// Default number of addressable registers (indices `0..DEFAULT_LIMIT`).
pub const DEFAULT_LIMIT: usize = 1 << 24;

/// Factor by which the backing buffer grows.
const GROWTH_FACTOR: usize = 2;

/// Register file of the machine.
///
/// Behaves as an infinite map from non-negative index to `i64` where unset
/// registers read as 0. Register 0 is the accumulator. The backing buffer
/// starts at a small capacity and doubles whenever a write lands past its
/// end; every slot below the capacity always holds a defined value.
///
/// Writes at or past the register limit, or writes whose growth cannot be
/// allocated, fail with [`Fault::RegisterLimit`].
#[derive(Clone, Debug)]
pub struct RegisterStore {
    regs: Vec<i64>,
    /// Highest index ever assigned.
    max_written: usize,
    /// Number of addressable registers.
    limit: usize,
}

impl RegisterStore {
    /// Creates a register file with [`DEFAULT_CAPACITY`] slots.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a register file with room for `capacity` registers before
    /// the first growth. A capacity of 0 is raised to 1 so the accumulator
    /// always has a slot.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            regs: vec![0; capacity.max(1)],
            max_written: 0,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Sets the number of addressable registers. A limit of 0 is raised to 1.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Number of addressable registers.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Copy of registers `0..=max_written`, without the unused tail of the
    /// buffer.
    pub fn snapshot(&self) -> Self {
        Self {
            regs: self.used().to_vec(),
            max_written: self.max_written,
            limit: self.limit,
        }
    }

    /// Number of registers currently backed by storage.
    pub fn capacity(&self) -> usize {
        self.regs.len()
    }

    /// Highest register index ever written.
    pub fn max_written(&self) -> usize {
        self.max_written
    }

    /// Returns register `idx`, or 0 if it was never written.
    ///
    /// Reads past the capacity do not allocate.
    pub fn get(&self, idx: usize) -> i64 {
        self.regs.get(idx).copied().unwrap_or(0)
    }

    /// Stores `value` into register `idx`, growing the buffer as needed.
    ///
    /// Returns [`Fault::RegisterLimit`] if `idx` is not addressable; the
    /// store is left unchanged.
    pub fn set(&mut self, idx: usize, value: i64) -> Result<(), Fault> {
        self.reserve(idx)?;
        self.regs[idx] = value;
        self.max_written = self.max_written.max(idx);
        Ok(())
    }

    /// Registers `0..=max_written`.
    pub fn used(&self) -> &[i64] {
        &self.regs[..=self.max_written]
    }

    /// Current accumulator value.
    pub fn accumulator(&self) -> i64 {
        self.regs[0]
    }

    /// Sets the accumulator.
    pub fn load(&mut self, value: i64) {
        self.regs[0] = value;
    }

    pub fn add(&mut self, rhs: i64) -> Result<(), Fault> {
        self.apply(rhs, "ADD", i64::checked_add)
    }

    pub fn sub(&mut self, rhs: i64) -> Result<(), Fault> {
        self.apply(rhs, "SUB", i64::checked_sub)
    }

    pub fn mult(&mut self, rhs: i64) -> Result<(), Fault> {
        self.apply(rhs, "MULT", i64::checked_mul)
    }

    /// Divides the accumulator by `rhs`, truncating toward zero.
    ///
    /// Returns [`Fault::DivisionByZero`] if `rhs` is 0.
    pub fn div(&mut self, rhs: i64) -> Result<(), Fault> {
        if rhs == 0 {
            return Err(Fault::DivisionByZero);
        }
        self.apply(rhs, "DIV", i64::checked_div)
    }

    fn apply(
        &mut self,
        rhs: i64,
        instruction: &'static str,
        op: fn(i64, i64) -> Option<i64>,
    ) -> Result<(), Fault> {
        let acc = &mut self.regs[0];
        *acc = op(*acc, rhs).ok_or(Fault::ArithmeticOverflow { instruction })?;
        Ok(())
    }

    /// Doubles the capacity until `idx` fits, never past the limit.
    fn reserve(&mut self, idx: usize) -> Result<(), Fault> {
        let limit_fault = Fault::RegisterLimit {
            index: idx,
            limit: self.limit,
        };
        if idx >= self.limit {
            return Err(limit_fault);
        }
        let needed = idx + 1;
        let mut capacity = self.regs.len();
        if capacity >= needed {
            return Ok(());
        }
        while capacity < needed {
            capacity = capacity.saturating_mul(GROWTH_FACTOR);
        }
        let capacity = capacity.min(self.limit);
        self.regs
            .try_reserve_exact(capacity - self.regs.len())
            .map_err(|_| limit_fault)?;
        self.regs.resize(capacity, 0);
        Ok(())
    }
}

impl Default for RegisterStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Two stores are equal when they hold the same registers, regardless of
/// how far each buffer has grown.
impl PartialEq for RegisterStore {
    fn eq(&self, other: &Self) -> bool {
        let len = self.capacity().max(other.capacity());
        self.max_written == other.max_written && (0..len).all(|i| self.get(i) == other.get(i))
    }
}

impl Eq for RegisterStore {}

impl Display for RegisterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.used().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}
