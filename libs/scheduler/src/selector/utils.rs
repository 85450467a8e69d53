//! Ranking helpers shared by the resource-based strategies.

use serde::{Deserialize, Serialize};
use sokovan_resource::{order_slots_by_priority, Decimal, ResourceSlot};

use crate::agent::{AgentInfo, AgentStateTracker};

/// Counts the dimensions an agent offers that the request leaves unused.
///
/// A dimension counts when the agent's total capacity is positive and the
/// request for it is zero.
pub fn count_unutilized_capabilities(agent: &AgentInfo, requested: &ResourceSlot) -> usize {
    agent
        .available_slots
        .iter()
        .filter(|(name, capacity)| *capacity > Decimal::ZERO && requested.get(name).is_zero())
        .count()
}

/// Per-dimension quantity compared when ranking agents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingKey {
    /// Absolute free quantity.
    #[default]
    FreeCapacity,
    /// Free quantity divided by total capacity.
    #[serde(alias = "utilization_ratio")]
    FreeRatio,
}

impl RankingKey {
    /// Ranking value of one dimension for a tracked agent.
    pub fn value(&self, tracker: &AgentStateTracker<'_>, slot: &str) -> Decimal {
        let free = tracker.free_slots().get(slot);
        match self {
            RankingKey::FreeCapacity => free,
            RankingKey::FreeRatio => {
                let total = tracker.original_agent().available_slots.get(slot);
                if total.is_zero() {
                    Decimal::ZERO
                } else {
                    free / total
                }
            }
        }
    }

    /// Ranking vector over `dims`, in order.
    pub fn vector(&self, tracker: &AgentStateTracker<'_>, dims: &[String]) -> Vec<Decimal> {
        dims.iter().map(|d| self.value(tracker, d)).collect()
    }
}

impl std::fmt::Display for RankingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankingKey::FreeCapacity => write!(f, "free_capacity"),
            RankingKey::FreeRatio => write!(f, "free_ratio"),
        }
    }
}

impl std::str::FromStr for RankingKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free_capacity" | "free" => Ok(RankingKey::FreeCapacity),
            "free_ratio" | "utilization_ratio" | "ratio" => Ok(RankingKey::FreeRatio),
            other => Err(format!("unknown ranking key: {other}")),
        }
    }
}

/// Requested dimensions in priority order.
pub(crate) fn ranking_dimensions(requested: &ResourceSlot, priority: &[String]) -> Vec<String> {
    order_slots_by_priority(requested.names(), priority)
}
