//! Agent selection strategies.
//!
//! Every strategy implements [`AgentSelector`]. The provided
//! [`AgentSelector::select`] narrows the candidates to the feasible set
//! (matching architecture, enough free capacity, under the container cap) and
//! only then hands them to the strategy's ranking. Ranking never sees an
//! infeasible agent.

mod concentrated;
mod dispersed;
mod error;
mod filter;
mod legacy;
mod round_robin;
mod utils;

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use sokovan_id::{AgentId, KernelId, SessionId};
use sokovan_resource::ResourceSlot;

use crate::agent::AgentStateTracker;
use crate::types::{ClusterMode, SessionType};

pub use concentrated::ConcentratedAgentSelector;
pub use dispersed::DispersedAgentSelector;
pub use error::{AgentSelectionError, CandidateRejection};
pub use filter::{check_candidate, filter_feasible};
pub use legacy::LegacyAgentSelector;
pub use round_robin::RoundRobinAgentSelector;
pub use utils::{count_unutilized_capabilities, RankingKey};

/// Session fields relevant to ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMetadata {
    pub session_id: SessionId,
    pub session_type: SessionType,
    pub scaling_group: String,
    pub cluster_mode: ClusterMode,
}

/// Request of a single kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelResourceSpec {
    pub requested_slots: ResourceSlot,
    pub required_architecture: String,
}

/// The quantity placed by one selection call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRequirements {
    /// Every kernel of a single-node session, or one kernel of a multi-node one.
    pub kernel_ids: Vec<KernelId>,
    pub requested_slots: ResourceSlot,
    pub required_architecture: String,
}

/// Everything a strategy may consult about the session.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSelectionCriteria {
    pub session_metadata: SessionMetadata,
    /// In workload kernel order.
    pub kernel_requirements: Vec<(KernelId, KernelResourceSpec)>,
    pub kernel_counts_at_endpoint: HashMap<AgentId, u32>,
}

impl AgentSelectionCriteria {
    /// Splits the session into placement units.
    ///
    /// A single-node session yields one unit summing every kernel; a
    /// multi-node session yields one unit per kernel, in order. A single-node
    /// session whose kernels disagree on architecture cannot be placed.
    pub fn resource_requirements(&self) -> Result<Vec<ResourceRequirements>, AgentSelectionError> {
        if self.kernel_requirements.is_empty() {
            return Ok(Vec::new());
        }

        match self.session_metadata.cluster_mode {
            ClusterMode::SingleNode => {
                let architectures: BTreeSet<&str> = self
                    .kernel_requirements
                    .iter()
                    .map(|(_, spec)| spec.required_architecture.as_str())
                    .collect();
                if architectures.len() > 1 {
                    return Err(AgentSelectionError::ArchitectureMismatch {
                        architectures: architectures.into_iter().collect::<Vec<_>>().join(", "),
                    });
                }

                let requested_slots = self
                    .kernel_requirements
                    .iter()
                    .map(|(_, spec)| &spec.requested_slots)
                    .sum();
                let required_architecture = self.kernel_requirements[0]
                    .1
                    .required_architecture
                    .clone();

                Ok(vec![ResourceRequirements {
                    kernel_ids: self.kernel_requirements.iter().map(|(id, _)| *id).collect(),
                    requested_slots,
                    required_architecture,
                }])
            }
            ClusterMode::MultiNode => Ok(self
                .kernel_requirements
                .iter()
                .map(|(id, spec)| ResourceRequirements {
                    kernel_ids: vec![*id],
                    requested_slots: spec.requested_slots.clone(),
                    required_architecture: spec.required_architecture.clone(),
                })
                .collect()),
        }
    }

    /// Replicas of the session's endpoint already on `agent_id`.
    pub fn endpoint_replicas_on(&self, agent_id: &AgentId) -> u32 {
        self.kernel_counts_at_endpoint
            .get(agent_id)
            .copied()
            .unwrap_or(0)
    }
}

/// Per-pass selection knobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSelectionConfig {
    /// Agents already running this many containers are skipped.
    pub max_container_count: Option<u32>,
    /// Spread inference replicas before packing them.
    #[serde(default)]
    pub enforce_spreading_endpoint_replica: bool,
}

/// A pluggable agent ranking strategy.
pub trait AgentSelector: Send {
    /// Short strategy name, e.g. `concentrated`.
    fn name(&self) -> &'static str;

    /// Message recorded when selection succeeds.
    fn success_message(&self) -> &'static str;

    /// Picks one agent from a non-empty feasible set.
    ///
    /// Returns `None` only if `feasible` is empty.
    fn select_by_strategy<'a>(
        &mut self,
        feasible: &[&'a AgentStateTracker<'a>],
        requirement: &ResourceRequirements,
        criteria: &AgentSelectionCriteria,
        config: &AgentSelectionConfig,
    ) -> Option<&'a AgentStateTracker<'a>>;

    /// Picks the best feasible candidate for `requirement`.
    fn select<'a>(
        &mut self,
        candidates: &'a [AgentStateTracker<'a>],
        requirement: &ResourceRequirements,
        criteria: &AgentSelectionCriteria,
        config: &AgentSelectionConfig,
    ) -> Result<&'a AgentStateTracker<'a>, AgentSelectionError> {
        let feasible = filter_feasible(
            candidates,
            requirement,
            &criteria.session_metadata.scaling_group,
            config,
        )?;

        self.select_by_strategy(&feasible, requirement, criteria, config)
            .ok_or_else(|| AgentSelectionError::NoAvailableAgent {
                details: "strategy returned no candidate".to_string(),
            })
    }
}

/// Named strategy, as stored in scaling-group options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionStrategy {
    #[default]
    Concentrated,
    Dispersed,
    Legacy,
    RoundRobin,
}

impl SelectionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionStrategy::Concentrated => "concentrated",
            SelectionStrategy::Dispersed => "dispersed",
            SelectionStrategy::Legacy => "legacy",
            SelectionStrategy::RoundRobin => "roundrobin",
        }
    }

    /// Instantiates the strategy.
    pub fn build(
        &self,
        resource_priority: Vec<String>,
        ranking_key: RankingKey,
    ) -> Box<dyn AgentSelector> {
        match self {
            SelectionStrategy::Concentrated => Box::new(
                ConcentratedAgentSelector::new(resource_priority).with_ranking_key(ranking_key),
            ),
            SelectionStrategy::Dispersed => Box::new(
                DispersedAgentSelector::new(resource_priority).with_ranking_key(ranking_key),
            ),
            SelectionStrategy::Legacy => Box::new(
                LegacyAgentSelector::new(resource_priority).with_ranking_key(ranking_key),
            ),
            SelectionStrategy::RoundRobin => Box::new(RoundRobinAgentSelector::new()),
        }
    }
}

impl std::fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SelectionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "concentrated" => Ok(SelectionStrategy::Concentrated),
            "dispersed" => Ok(SelectionStrategy::Dispersed),
            "legacy" => Ok(SelectionStrategy::Legacy),
            "roundrobin" | "round_robin" | "round-robin" => Ok(SelectionStrategy::RoundRobin),
            other => Err(format!("unknown agent selection strategy: {other}")),
        }
    }
}
