//! Error types for allocation.
//!
//! Two families exist. Selection failures ([`AgentSelectionError`]) are
//! business outcomes: the session simply cannot be placed in this pass.
//! Invariant violations are programming errors and are always propagated.

use sokovan_id::{AgentId, KernelId};
use sokovan_resource::ResourceError;
use thiserror::Error;

use crate::selector::AgentSelectionError;

/// Result type for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Errors that escape [`crate::Scheduler::allocate_workload`].
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// Internal consistency failures of the capacity ledger.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("agent {agent_id} has negative free capacity: {source}")]
    NegativeCapacity {
        agent_id: AgentId,
        #[source]
        source: ResourceError,
    },

    #[error("agent {agent_id} would be over-committed: {source}")]
    Overcommit {
        agent_id: AgentId,
        #[source]
        source: ResourceError,
    },

    #[error("selected agent {agent_id} is not in the candidate list")]
    UnknownAgent { agent_id: AgentId },
}

/// Detailed outcome of [`crate::Scheduler::try_allocate_workload`].
#[derive(Debug, Error)]
pub enum AllocationError {
    /// The workload has no kernels.
    #[error("workload has no kernels to place")]
    NothingToPlace,

    /// No agent could take the placement unit holding `kernel_ids`.
    #[error("agent selection failed for kernels {}: {source}", format_kernel_ids(.kernel_ids))]
    Selection {
        kernel_ids: Vec<KernelId>,
        #[source]
        source: AgentSelectionError,
    },

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

impl AllocationError {
    /// Returns true if this is a recoverable selection failure.
    pub fn is_selection_failure(&self) -> bool {
        matches!(self, AllocationError::Selection { .. })
    }
}

pub(crate) fn format_kernel_ids(ids: &[KernelId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
