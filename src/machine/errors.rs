use ram_derive::Error;

/// Reasons a run stops before reaching `HALT`.
///
/// Every fault is terminal for the run that raised it. The interpreter
/// captures it in [`Outcome::Failure`](super::vm::Outcome::Failure) together
/// with the trace recorded so far. [`Fault::NotRunning`] is only returned
/// when stepping a finished run by hand and never ends a run.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Fault {
    /// `DIV` resolved a zero divisor.
    #[error("division by zero")]
    DivisionByZero,
    /// `READ` executed with an empty input tape.
    #[error("input exhausted after {consumed} values")]
    InputExhausted { consumed: usize },
    /// The program counter points outside `[1, len]`.
    #[error("invalid program counter {position} (program has {len} instructions)")]
    InvalidProgramCounter { position: usize, len: usize },
    /// The configured step budget ran out while the machine was still running.
    #[error("step limit of {limit} reached")]
    StepLimitExceeded { limit: u64 },
    /// Accumulator arithmetic left the `i64` range.
    #[error("arithmetic overflow in {instruction}")]
    ArithmeticOverflow { instruction: &'static str },
    /// Indirect addressing went through a register holding a negative value.
    #[error("negative register address {address}")]
    NegativeAddress { address: i64 },
    /// A write went to a register index the store cannot hold.
    #[error("register {index} is past the limit of {limit} registers")]
    RegisterLimit { index: usize, limit: usize },
    /// A step was requested after the run had already halted or faulted.
    #[error("machine is not running")]
    NotRunning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(Fault::DivisionByZero.to_string(), "division by zero");
        assert_eq!(
            Fault::InputExhausted { consumed: 3 }.to_string(),
            "input exhausted after 3 values"
        );
        assert_eq!(
            Fault::InvalidProgramCounter {
                position: 0,
                len: 7
            }
            .to_string(),
            "invalid program counter 0 (program has 7 instructions)"
        );
        assert_eq!(
            Fault::StepLimitExceeded { limit: 10 }.to_string(),
            "step limit of 10 reached"
        );
        assert_eq!(
            Fault::ArithmeticOverflow { instruction: "MULT" }.to_string(),
            "arithmetic overflow in MULT"
        );
        assert_eq!(
            Fault::NegativeAddress { address: -4 }.to_string(),
            "negative register address -4"
        );
        assert_eq!(
            Fault::RegisterLimit {
                index: 300,
                limit: 256
            }
            .to_string(),
            "register 300 is past the limit of 256 registers"
        );
        assert_eq!(Fault::NotRunning.to_string(), "machine is not running");
    }

    #[test]
    fn implements_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(Fault::DivisionByZero);
        assert!(err.source().is_none());
    }
}
