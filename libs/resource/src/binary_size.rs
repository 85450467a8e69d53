//! Human readable byte quantities.

use rust_decimal::Decimal;

const UNITS: [&str; 6] = ["bytes", "KiB", "MiB", "GiB", "TiB", "PiB"];

/// A byte count that formats with binary (1024-based) units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BinarySize(Decimal);

impl BinarySize {
    pub fn new(bytes: Decimal) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Display for BinarySize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let base = Decimal::from(1024);
        let mut value = self.0;
        let mut unit = 0;
        while value >= base && unit < UNITS.len() - 1 {
            value /= base;
            unit += 1;
        }
        if unit == 0 {
            write!(f, "{} {}", value.normalize(), UNITS[0])
        } else {
            write!(f, "{} {}", value.round_dp(2).normalize(), UNITS[unit])
        }
    }
}
