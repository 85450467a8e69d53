//! Workload and decision types exchanged with the scheduling loop.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sokovan_id::{AccessKey, AgentId, KernelId, SessionId};
use sokovan_resource::ResourceSlot;
use uuid::Uuid;

use crate::selector::{AgentSelectionCriteria, KernelResourceSpec, SessionMetadata};

/// How the kernels of a session may be spread over agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClusterMode {
    /// All kernels share one agent.
    SingleNode,
    /// Kernels may land on different agents.
    MultiNode,
}

impl std::fmt::Display for ClusterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterMode::SingleNode => write!(f, "single-node"),
            ClusterMode::MultiNode => write!(f, "multi-node"),
        }
    }
}

/// Kind of session being scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Interactive,
    Batch,
    Inference,
    System,
}

impl SessionType {
    /// Returns true for model-serving sessions.
    pub fn is_inference(&self) -> bool {
        matches!(self, SessionType::Inference)
    }
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionType::Interactive => write!(f, "interactive"),
            SessionType::Batch => write!(f, "batch"),
            SessionType::Inference => write!(f, "inference"),
            SessionType::System => write!(f, "system"),
        }
    }
}

/// One container to be placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelWorkload {
    pub kernel_id: KernelId,
    pub image: String,
    /// CPU/ISA tag the chosen agent must match, e.g. `x86_64`.
    pub architecture: String,
    pub requested_slots: ResourceSlot,
}

/// A pending session, the unit of placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionWorkload {
    pub session_id: SessionId,
    pub access_key: AccessKey,
    pub requested_slots: ResourceSlot,
    pub user_uuid: Uuid,
    pub group_id: Uuid,
    pub domain_name: String,
    pub scaling_group: String,
    pub priority: i32,
    pub session_type: SessionType,
    pub cluster_mode: ClusterMode,
    pub starts_at: Option<DateTime<Utc>>,
    pub is_private: bool,
    pub kernels: Vec<KernelWorkload>,
    /// Pins every kernel to this agent, bypassing ranking.
    pub designated_agent: Option<AgentId>,
    /// Kernels of the same inference endpoint already running on each agent.
    #[serde(default)]
    pub kernel_counts_at_endpoint: HashMap<AgentId, u32>,
}

impl SessionWorkload {
    /// Builds the selection criteria for this workload.
    pub fn to_selection_criteria(&self) -> AgentSelectionCriteria {
        AgentSelectionCriteria {
            session_metadata: SessionMetadata {
                session_id: self.session_id,
                session_type: self.session_type,
                scaling_group: self.scaling_group.clone(),
                cluster_mode: self.cluster_mode,
            },
            kernel_requirements: self
                .kernels
                .iter()
                .map(|k| {
                    (
                        k.kernel_id,
                        KernelResourceSpec {
                            requested_slots: k.requested_slots.clone(),
                            required_architecture: k.architecture.clone(),
                        },
                    )
                })
                .collect(),
            kernel_counts_at_endpoint: self.kernel_counts_at_endpoint.clone(),
        }
    }

    /// IDs of every kernel, in workload order.
    pub fn kernel_ids(&self) -> Vec<KernelId> {
        self.kernels.iter().map(|k| k.kernel_id).collect()
    }
}

/// Placement of a single kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelAllocation {
    pub kernel_id: KernelId,
    pub agent_id: AgentId,
    pub agent_addr: String,
    pub scaling_group: String,
    /// The kernel's own request, not the aggregate of its placement unit.
    pub allocated_slots: ResourceSlot,
}

/// Everything committed to one agent during a pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAllocation {
    pub agent_id: AgentId,
    pub agent_addr: String,
    pub scaling_group: String,
    /// One entry per placement unit committed to this agent.
    pub allocated_slots: Vec<ResourceSlot>,
}

impl AgentAllocation {
    /// Sum of every batch committed to this agent.
    pub fn total(&self) -> ResourceSlot {
        self.allocated_slots.iter().sum()
    }
}

/// Result of placing one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingDecision {
    pub session_id: SessionId,
    pub access_key: AccessKey,
    pub session_type: SessionType,
    pub cluster_mode: ClusterMode,
    pub scaling_group: String,
    /// In workload kernel order.
    pub kernel_allocations: Vec<KernelAllocation>,
    /// In order of first use.
    pub agent_allocations: Vec<AgentAllocation>,
}

impl SchedulingDecision {
    /// Agent assigned to a kernel.
    pub fn agent_for(&self, kernel_id: &KernelId) -> Option<&AgentId> {
        self.kernel_allocations
            .iter()
            .find(|k| &k.kernel_id == kernel_id)
            .map(|k| &k.agent_id)
    }

    /// Allocation batches committed to an agent.
    pub fn allocations_for(&self, agent_id: &AgentId) -> Option<&[ResourceSlot]> {
        self.agent_allocations
            .iter()
            .find(|a| &a.agent_id == agent_id)
            .map(|a| a.allocated_slots.as_slice())
    }

    /// Kernel to agent mapping.
    pub fn kernel_assignments(&self) -> HashMap<KernelId, AgentId> {
        self.kernel_allocations
            .iter()
            .map(|k| (k.kernel_id, k.agent_id.clone()))
            .collect()
    }

    /// Total resources committed across all agents.
    pub fn total_allocated(&self) -> ResourceSlot {
        self.agent_allocations
            .iter()
            .map(AgentAllocation::total)
            .fold(ResourceSlot::new(), |acc, slot| acc + slot)
    }
}

/// Incrementally assembles a [`SchedulingDecision`].
#[derive(Debug)]
pub(crate) struct DecisionBuilder {
    decision: SchedulingDecision,
}

impl DecisionBuilder {
    pub(crate) fn new(workload: &SessionWorkload, scaling_group: &str) -> Self {
        Self {
            decision: SchedulingDecision {
                session_id: workload.session_id,
                access_key: workload.access_key.clone(),
                session_type: workload.session_type,
                cluster_mode: workload.cluster_mode,
                scaling_group: scaling_group.to_string(),
                kernel_allocations: Vec::with_capacity(workload.kernels.len()),
                agent_allocations: Vec::new(),
            },
        }
    }

    /// Records one committed placement unit.
    pub(crate) fn record<'k>(
        &mut self,
        agent: &crate::AgentInfo,
        batch: &ResourceSlot,
        kernels: impl IntoIterator<Item = (KernelId, &'k ResourceSlot)>,
    ) {
        for (kernel_id, slots) in kernels {
            self.decision.kernel_allocations.push(KernelAllocation {
                kernel_id,
                agent_id: agent.agent_id.clone(),
                agent_addr: agent.agent_addr.clone(),
                scaling_group: agent.scaling_group.clone(),
                allocated_slots: slots.clone(),
            });
        }

        match self
            .decision
            .agent_allocations
            .iter_mut()
            .find(|a| a.agent_id == agent.agent_id)
        {
            Some(existing) => existing.allocated_slots.push(batch.clone()),
            None => self.decision.agent_allocations.push(AgentAllocation {
                agent_id: agent.agent_id.clone(),
                agent_addr: agent.agent_addr.clone(),
                scaling_group: agent.scaling_group.clone(),
                allocated_slots: vec![batch.clone()],
            }),
        }
    }

    pub(crate) fn finish(self) -> SchedulingDecision {
        self.decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_common::*;

    #[test]
    fn test_cluster_mode_serialization() {
        assert_eq!(
            serde_json::to_string(&ClusterMode::SingleNode).unwrap(),
            "\"SINGLE_NODE\""
        );
        assert_eq!(
            serde_json::to_string(&ClusterMode::MultiNode).unwrap(),
            "\"MULTI_NODE\""
        );
    }

    #[test]
    fn test_session_type_serialization() {
        assert_eq!(
            serde_json::to_string(&SessionType::Inference).unwrap(),
            "\"inference\""
        );
        assert!(SessionType::Inference.is_inference());
        assert!(!SessionType::Batch.is_inference());
    }

    #[test]
    fn test_selection_criteria_preserves_kernel_order() {
        let kernels = vec![make_kernel(1, 1024), make_kernel(2, 2048)];
        let ids: Vec<_> = kernels.iter().map(|k| k.kernel_id).collect();
        let workload = make_session(ClusterMode::MultiNode, kernels);

        let criteria = workload.to_selection_criteria();
        let criteria_ids: Vec<_> = criteria.kernel_requirements.iter().map(|(id, _)| *id).collect();
        assert_eq!(criteria_ids, ids);
        assert_eq!(criteria.session_metadata.session_id, workload.session_id);
    }

    #[test]
    fn test_decision_builder_groups_batches_by_agent() {
        let workload = make_session(ClusterMode::MultiNode, vec![make_kernel(1, 1024)]);
        let agent = make_agent("agent-1", 8, 0);
        let other = make_agent("agent-2", 8, 0);
        let batch = slots(&[("cpu", "1")]);
        let large = slots(&[("cpu", "2"), ("mem", "512")]);

        let mut builder = DecisionBuilder::new(&workload, "default");
        builder.record(&agent, &batch, [(KernelId::new(), &batch)]);
        builder.record(&agent, &batch, [(KernelId::new(), &batch)]);
        builder.record(&other, &large, [(KernelId::new(), &large)]);
        let decision = builder.finish();

        assert_eq!(decision.kernel_allocations.len(), 3);
        assert_eq!(decision.agent_allocations.len(), 2);
        assert_eq!(decision.agent_allocations[0].allocated_slots.len(), 2);
        assert_eq!(decision.agent_allocations[0].total(), slots(&[("cpu", "2")]));
        assert_eq!(decision.agent_allocations[1].total(), large);
        assert_eq!(
            decision.total_allocated(),
            slots(&[("cpu", "4"), ("mem", "512")])
        );
        assert_eq!(
            decision.allocations_for(&AgentId::new("agent-1")).map(<[_]>::len),
            Some(2)
        );
    }

    #[test]
    fn test_workload_json_roundtrip() {
        let mut workload = make_session(ClusterMode::SingleNode, vec![make_kernel(1, 1024)]);
        workload.kernel_counts_at_endpoint.insert(AgentId::new("agent-1"), 2);
        let json = serde_json::to_string(&workload).unwrap();
        let parsed: SessionWorkload = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, workload);
    }
}
