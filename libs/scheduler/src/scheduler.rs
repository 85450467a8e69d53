//! Allocation of one session workload onto a list of agents.
//!
//! The scheduler walks the workload's placement units in order. For each unit
//! it builds fresh trackers over the agent list, asks the selector (or the
//! designated agent) for a feasible agent, and commits the unit to that agent
//! before the next unit is evaluated.
//!
//! Nothing is rolled back when a later unit fails. Callers pass a disposable
//! copy of the agent list per attempt.

use std::collections::HashMap;

use sokovan_id::{AgentId, KernelId};
use sokovan_resource::ResourceSlot;
use tracing::{debug, instrument, warn};

use crate::agent::{AgentInfo, AgentStateTracker};
use crate::error::{format_kernel_ids, AllocationError, InvariantViolation, SchedulerResult};
use crate::selector::{
    check_candidate, AgentSelectionConfig, AgentSelectionCriteria, AgentSelectionError,
    AgentSelector, RankingKey, ResourceRequirements, SelectionStrategy,
};
use crate::types::{DecisionBuilder, SchedulingDecision, SessionWorkload};

/// Places session workloads using one selection strategy.
pub struct Scheduler {
    selector: Box<dyn AgentSelector>,
}

impl Scheduler {
    pub fn new(selector: Box<dyn AgentSelector>) -> Self {
        Self { selector }
    }

    /// Builds a scheduler for a named strategy with the default ranking key.
    pub fn from_strategy(strategy: SelectionStrategy, resource_priority: Vec<String>) -> Self {
        Self::new(strategy.build(resource_priority, RankingKey::default()))
    }

    pub fn selector_name(&self) -> &'static str {
        self.selector.name()
    }

    /// Allocates every kernel of `workload` onto `agents`.
    ///
    /// Returns `Ok(None)` when the workload has no kernels or when any
    /// placement unit cannot be placed; the failing kernels are logged before
    /// the failure is absorbed. Agents committed before a failure keep their
    /// updated occupancy. Only invariant violations are returned as errors.
    #[instrument(
        skip_all,
        fields(session_id = %workload.session_id, scaling_group = %scaling_group)
    )]
    pub fn allocate_workload(
        &mut self,
        workload: &SessionWorkload,
        agents: &mut [AgentInfo],
        config: &AgentSelectionConfig,
        scaling_group: &str,
    ) -> SchedulerResult<Option<SchedulingDecision>> {
        match self.try_allocate_workload(workload, agents, config, scaling_group) {
            Ok(decision) => {
                debug!(
                    kernel_count = decision.kernel_allocations.len(),
                    agent_count = decision.agent_allocations.len(),
                    "Workload allocated"
                );
                Ok(Some(decision))
            }
            Err(AllocationError::NothingToPlace) => {
                debug!("Workload has no kernels, nothing to place");
                Ok(None)
            }
            Err(AllocationError::Selection { kernel_ids, source }) => {
                warn!(
                    kernel_ids = %format_kernel_ids(&kernel_ids),
                    strategy = self.selector.name(),
                    error = %source,
                    "Agent selection failed, workload not placed"
                );
                Ok(None)
            }
            Err(AllocationError::Invariant(violation)) => Err(violation.into()),
        }
    }

    /// Like [`Scheduler::allocate_workload`], but reports why a workload was
    /// not placed.
    pub fn try_allocate_workload(
        &mut self,
        workload: &SessionWorkload,
        agents: &mut [AgentInfo],
        config: &AgentSelectionConfig,
        scaling_group: &str,
    ) -> Result<SchedulingDecision, AllocationError> {
        if workload.kernels.is_empty() {
            return Err(AllocationError::NothingToPlace);
        }

        let criteria = workload.to_selection_criteria();
        let requirements =
            criteria
                .resource_requirements()
                .map_err(|source| AllocationError::Selection {
                    kernel_ids: workload.kernel_ids(),
                    source,
                })?;

        let kernel_slots: HashMap<KernelId, &ResourceSlot> = workload
            .kernels
            .iter()
            .map(|k| (k.kernel_id, &k.requested_slots))
            .collect();
        let mut builder = DecisionBuilder::new(workload, scaling_group);

        for requirement in &requirements {
            let agent_id = self.choose_agent(
                agents,
                requirement,
                &criteria,
                workload.designated_agent.as_ref(),
                config,
            )?;

            let agent = agents
                .iter_mut()
                .find(|a| a.agent_id == agent_id)
                .ok_or(InvariantViolation::UnknownAgent { agent_id })?;
            agent.commit(
                &requirement.requested_slots,
                requirement.kernel_ids.len() as u32,
            )?;

            builder.record(
                agent,
                &requirement.requested_slots,
                requirement
                    .kernel_ids
                    .iter()
                    .filter_map(|id| kernel_slots.get(id).map(|slots| (*id, *slots))),
            );

            debug!(
                agent_id = %agent.agent_id,
                kernels = %format_kernel_ids(&requirement.kernel_ids),
                requested = %requirement.requested_slots,
                "{}",
                self.selector.success_message()
            );
        }

        Ok(builder.finish())
    }

    /// Picks the agent for one placement unit against the current ledger.
    fn choose_agent(
        &mut self,
        agents: &[AgentInfo],
        requirement: &ResourceRequirements,
        criteria: &AgentSelectionCriteria,
        designated: Option<&AgentId>,
        config: &AgentSelectionConfig,
    ) -> Result<AgentId, AllocationError> {
        let trackers = AgentStateTracker::track_all(agents)?;

        let selected = match designated {
            Some(agent_id) => select_designated(
                &trackers,
                agent_id,
                requirement,
                &criteria.session_metadata.scaling_group,
                config,
            ),
            None => self.selector.select(&trackers, requirement, criteria, config),
        };

        selected
            .map(|tracker| tracker.agent_id().clone())
            .map_err(|source| AllocationError::Selection {
                kernel_ids: requirement.kernel_ids.clone(),
                source,
            })
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("selector", &self.selector.name())
            .finish()
    }
}

/// Validates the designated agent instead of ranking.
fn select_designated<'a>(
    trackers: &'a [AgentStateTracker<'a>],
    agent_id: &AgentId,
    requirement: &ResourceRequirements,
    scaling_group: &str,
    config: &AgentSelectionConfig,
) -> Result<&'a AgentStateTracker<'a>, AgentSelectionError> {
    if trackers.is_empty() {
        return Err(AgentSelectionError::NoAgents {
            scaling_group: scaling_group.to_string(),
        });
    }

    let tracker = trackers
        .iter()
        .find(|t| t.agent_id() == agent_id)
        .ok_or_else(|| AgentSelectionError::DesignatedAgentNotFound {
            agent_id: agent_id.clone(),
        })?;

    check_candidate(tracker, requirement, config).map_err(|reason| {
        AgentSelectionError::DesignatedAgentIncompatible {
            agent_id: agent_id.clone(),
            reason,
        }
    })?;

    Ok(tracker)
}
