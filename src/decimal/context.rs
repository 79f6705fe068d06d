//! `MathContext`: the precision/rounding-mode pair that configures every
//! `BigDecimal` division and `round` call.

/// How a discarded fractional digit should be folded into the kept value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundingMode {
    Up,
    Down,
    Ceiling,
    Floor,
    HalfUp,
    HalfDown,
    HalfEven,
    /// Fail instead of discarding a non-zero digit.
    Unnecessary,
}

/// `precision == 0` means exact: no digit limit, rounding never triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MathContext {
    pub precision: u32,
    pub rounding_mode: RoundingMode,
}

impl MathContext {
    pub const fn new(precision: u32, rounding_mode: RoundingMode) -> Self {
        MathContext { precision, rounding_mode }
    }

    /// Unlimited precision, rounding mode irrelevant since it never fires.
    pub const UNLIMITED: MathContext = MathContext::new(0, RoundingMode::HalfUp);
}
