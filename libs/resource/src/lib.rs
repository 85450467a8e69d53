//! # sokovan-resource
//!
//! Multi-dimensional resource quantities for agent placement.
//!
//! A [`ResourceSlot`] maps a slot name (`cpu`, `mem`, `cuda.shares`, ...) to a
//! non-negative decimal quantity. Slots that are not listed are zero.
//!
//! # Invariants
//!
//! - Quantities are never negative. Constructors reject negative input and
//!   [`ResourceSlot::checked_sub`] reports an error instead of clamping.
//! - Comparison is dimension-wise: a request fits when every requested
//!   dimension is at most the available quantity.
//! - Slot ordering for ranking is deterministic (priority list, then name).

mod binary_size;
mod error;
mod priority;
mod slot;

pub use binary_size::BinarySize;
pub use error::ResourceError;
pub use priority::{order_slots_by_priority, slot_device_type};
pub use slot::{ResourceSlot, SlotShortage};

/// Re-export of the decimal type used for quantities.
pub use rust_decimal::Decimal;
