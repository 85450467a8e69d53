//! The resource slot vector.

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::binary_size::BinarySize;
use crate::error::ResourceError;

/// Slot name whose quantities are byte counts.
const MEMORY_SLOT: &str = "mem";

/// A named-dimension, non-negative quantity vector.
///
/// Missing dimensions are treated as zero everywhere, including equality:
/// `{cpu: 1}` equals `{cpu: 1, cuda.shares: 0}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Decimal>",
    into = "BTreeMap<String, Decimal>"
)]
pub struct ResourceSlot(BTreeMap<String, Decimal>);

impl ResourceSlot {
    /// Creates an empty (all-zero) slot vector.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builds a slot vector from `(name, quantity)` pairs.
    ///
    /// Repeated names are summed.
    pub fn try_from_pairs<I, K>(pairs: I) -> Result<Self, ResourceError>
    where
        I: IntoIterator<Item = (K, Decimal)>,
        K: Into<String>,
    {
        let mut slot = Self::new();
        for (name, value) in pairs {
            let name = name.into();
            validate(&name, value)?;
            *slot.0.entry(name).or_insert(Decimal::ZERO) += value;
        }
        Ok(slot)
    }

    /// Sets the quantity of one dimension, returning the previous value.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: Decimal,
    ) -> Result<Option<Decimal>, ResourceError> {
        let name = name.into();
        validate(&name, value)?;
        Ok(self.0.insert(name, value))
    }

    /// Quantity of a dimension, zero when absent.
    pub fn get(&self, name: &str) -> Decimal {
        self.0.get(name).copied().unwrap_or(Decimal::ZERO)
    }

    /// Returns true if the dimension is listed, even with a zero quantity.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Listed dimension names in alphabetical order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    /// Listed `(name, quantity)` pairs in alphabetical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of listed dimensions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no dimension is listed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if every dimension is zero.
    pub fn is_zero(&self) -> bool {
        self.0.values().all(Decimal::is_zero)
    }

    /// Dimension-wise subtraction.
    ///
    /// Fails instead of clamping when any dimension would go below zero.
    pub fn checked_sub(&self, other: &ResourceSlot) -> Result<ResourceSlot, ResourceError> {
        let mut out = BTreeMap::new();
        for name in self.0.keys().chain(other.0.keys()) {
            if out.contains_key(name) {
                continue;
            }
            let minuend = self.get(name);
            let subtrahend = other.get(name);
            let value = minuend - subtrahend;
            if value.is_sign_negative() && !value.is_zero() {
                return Err(ResourceError::Negative {
                    slot: name.clone(),
                    minuend,
                    subtrahend,
                });
            }
            out.insert(name.clone(), value);
        }
        Ok(Self(out))
    }

    /// Returns true if every requested dimension is within `available`.
    pub fn fits_within(&self, available: &ResourceSlot) -> bool {
        self.0
            .iter()
            .all(|(name, requested)| *requested <= available.get(name))
    }

    /// Dimensions of `self` that exceed `available`.
    pub fn shortages_against(&self, available: &ResourceSlot) -> Vec<SlotShortage> {
        self.0
            .iter()
            .filter_map(|(name, requested)| {
                let have = available.get(name);
                (*requested > have).then(|| SlotShortage {
                    slot: name.clone(),
                    requested: *requested,
                    available: have,
                })
            })
            .collect()
    }
}

fn validate(name: &str, value: Decimal) -> Result<(), ResourceError> {
    if name.is_empty() {
        return Err(ResourceError::EmptySlotName);
    }
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ResourceError::NegativeQuantity {
            slot: name.to_string(),
            value,
        });
    }
    Ok(())
}

impl PartialEq for ResourceSlot {
    fn eq(&self, other: &Self) -> bool {
        self.0
            .keys()
            .chain(other.0.keys())
            .all(|name| self.get(name) == other.get(name))
    }
}

impl Eq for ResourceSlot {}

impl Add for ResourceSlot {
    type Output = ResourceSlot;

    fn add(mut self, rhs: ResourceSlot) -> ResourceSlot {
        self += &rhs;
        self
    }
}

impl Add<&ResourceSlot> for &ResourceSlot {
    type Output = ResourceSlot;

    fn add(self, rhs: &ResourceSlot) -> ResourceSlot {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl AddAssign<&ResourceSlot> for ResourceSlot {
    fn add_assign(&mut self, rhs: &ResourceSlot) {
        for (name, value) in &rhs.0 {
            *self.0.entry(name.clone()).or_insert(Decimal::ZERO) += *value;
        }
    }
}

impl<'a> std::iter::Sum<&'a ResourceSlot> for ResourceSlot {
    fn sum<I: Iterator<Item = &'a ResourceSlot>>(iter: I) -> Self {
        iter.fold(ResourceSlot::new(), |mut acc, slot| {
            acc += slot;
            acc
        })
    }
}

impl TryFrom<BTreeMap<String, Decimal>> for ResourceSlot {
    type Error = ResourceError;

    fn try_from(map: BTreeMap<String, Decimal>) -> Result<Self, Self::Error> {
        Self::try_from_pairs(map)
    }
}

impl From<ResourceSlot> for BTreeMap<String, Decimal> {
    fn from(slot: ResourceSlot) -> Self {
        slot.0
    }
}

impl std::fmt::Display for ResourceSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", name, value.normalize())?;
        }
        f.write_str("}")
    }
}

/// One dimension where a request exceeds what an agent has left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotShortage {
    pub slot: String,
    pub requested: Decimal,
    pub available: Decimal,
}

impl std::fmt::Display for SlotShortage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.slot == MEMORY_SLOT {
            write!(
                f,
                "{} (requested: {}, available: {})",
                self.slot,
                BinarySize::new(self.requested),
                BinarySize::new(self.available)
            )
        } else {
            write!(
                f,
                "{} (requested: {}, available: {})",
                self.slot,
                self.requested.normalize(),
                self.available.normalize()
            )
        }
    }
}
