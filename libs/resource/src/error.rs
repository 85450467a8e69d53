//! Error types for resource arithmetic.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by resource slot construction and arithmetic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// A quantity supplied to a constructor was negative.
    #[error("negative quantity for slot '{slot}': {value}")]
    NegativeQuantity { slot: String, value: Decimal },

    /// A subtraction would leave a dimension below zero.
    #[error("subtraction leaves slot '{slot}' negative: {minuend} - {subtrahend}")]
    Negative {
        slot: String,
        minuend: Decimal,
        subtrahend: Decimal,
    },

    /// A slot name is empty.
    #[error("slot name cannot be empty")]
    EmptySlotName,
}
