//! # sokovan-scheduler
//!
//! Decides which agent runs which kernel of a pending session.
//!
//! The crate is an in-process library driven by a scheduling loop that lives
//! elsewhere. Given a snapshot of candidate agents and one session workload it:
//!
//! 1. Splits the workload into placement units (one aggregated unit for a
//!    single-node session, one unit per kernel for a multi-node session).
//! 2. Asks an [`AgentSelector`] strategy for the best feasible agent per unit.
//! 3. Commits each choice to the agent's occupancy before evaluating the next
//!    unit, so later units observe earlier ones.
//! 4. Assembles a [`SchedulingDecision`] with per-kernel and per-agent views.
//!
//! # Invariants
//!
//! - Every placed unit fits the chosen agent's free capacity as it was before
//!   that unit was committed.
//! - The scheduler never rolls back. Callers hand it a disposable copy of the
//!   agent list per attempt; see [`Provisioner`] for the batch form of this.
//! - Negative free capacity or a chosen agent missing from the list is an
//!   [`InvariantViolation`], never a selection failure.

pub mod agent;
pub mod config;
pub mod error;
pub mod provisioner;
pub mod scheduler;
pub mod selector;
pub mod types;

#[cfg(test)]
pub(crate) mod tests_common;

pub use agent::{AgentInfo, AgentStateTracker};
pub use config::{SchedulerSettings, SchedulingConfig};
pub use error::{AllocationError, InvariantViolation, SchedulerError, SchedulerResult};
pub use provisioner::{ProvisionOutcome, Provisioner, SchedulingFailure, Sequencer};
pub use scheduler::Scheduler;
pub use selector::{
    AgentSelectionConfig, AgentSelectionCriteria, AgentSelectionError, AgentSelector,
    CandidateRejection, ConcentratedAgentSelector, DispersedAgentSelector, KernelResourceSpec,
    LegacyAgentSelector, RankingKey, ResourceRequirements, RoundRobinAgentSelector,
    SelectionStrategy, SessionMetadata,
};
pub use types::{
    AgentAllocation, ClusterMode, KernelAllocation, KernelWorkload, SchedulingDecision,
    SessionType, SessionWorkload,
};
