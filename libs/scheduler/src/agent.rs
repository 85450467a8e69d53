//! Candidate agent model.

use serde::{Deserialize, Serialize};
use sokovan_id::AgentId;
use sokovan_resource::ResourceSlot;

use crate::error::InvariantViolation;

/// Snapshot of one candidate agent.
///
/// `occupied_slots` and `container_count` are the live capacity ledger for a
/// scheduling pass: the scheduler updates them after every committed
/// placement unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub agent_id: AgentId,
    pub agent_addr: String,
    pub architecture: String,
    /// Total capacity the agent reports.
    pub available_slots: ResourceSlot,
    pub occupied_slots: ResourceSlot,
    pub scaling_group: String,
    pub container_count: u32,
}

impl AgentInfo {
    /// Capacity left on this agent.
    pub fn free_slots(&self) -> Result<ResourceSlot, InvariantViolation> {
        self.available_slots
            .checked_sub(&self.occupied_slots)
            .map_err(|source| InvariantViolation::NegativeCapacity {
                agent_id: self.agent_id.clone(),
                source,
            })
    }

    /// Commits a placement unit to the ledger.
    ///
    /// Fails without touching the ledger if the result would exceed the
    /// agent's capacity.
    pub fn commit(
        &mut self,
        slots: &ResourceSlot,
        containers: u32,
    ) -> Result<(), InvariantViolation> {
        let occupied = &self.occupied_slots + slots;
        self.available_slots
            .checked_sub(&occupied)
            .map_err(|source| InvariantViolation::Overcommit {
                agent_id: self.agent_id.clone(),
                source,
            })?;

        self.occupied_slots = occupied;
        self.container_count += containers;
        Ok(())
    }
}

/// Selection-scoped view of one agent.
///
/// Trackers are rebuilt for every selection call, so the free capacity they
/// carry always reflects the placements committed so far in the pass.
#[derive(Debug, Clone)]
pub struct AgentStateTracker<'a> {
    original_agent: &'a AgentInfo,
    free_slots: ResourceSlot,
}

impl<'a> AgentStateTracker<'a> {
    pub fn new(agent: &'a AgentInfo) -> Result<Self, InvariantViolation> {
        Ok(Self {
            free_slots: agent.free_slots()?,
            original_agent: agent,
        })
    }

    /// Builds trackers for every agent in the list.
    pub fn track_all(agents: &'a [AgentInfo]) -> Result<Vec<Self>, InvariantViolation> {
        agents.iter().map(Self::new).collect()
    }

    pub fn original_agent(&self) -> &'a AgentInfo {
        self.original_agent
    }

    pub fn agent_id(&self) -> &'a AgentId {
        &self.original_agent.agent_id
    }

    pub fn free_slots(&self) -> &ResourceSlot {
        &self.free_slots
    }

    pub fn container_count(&self) -> u32 {
        self.original_agent.container_count
    }
}
