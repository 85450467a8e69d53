//! Batch scheduling of every pending session in a scaling group.
//!
//! The provisioner owns the pass-level agent ledger. Each workload is tried
//! against a fresh clone of the ledger; the clone replaces the ledger only if
//! the workload was fully placed, so failed attempts leave no trace.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sokovan_id::{KernelId, SessionId};
use tracing::{debug, info, instrument, warn};

use crate::agent::AgentInfo;
use crate::error::{AllocationError, SchedulerResult};
use crate::scheduler::Scheduler;
use crate::selector::AgentSelectionConfig;
use crate::types::{SchedulingDecision, SessionWorkload};

/// Order in which pending sessions are tried.
///
/// Higher `priority` always goes first. There is no dominant-resource-fairness
/// ordering: it needs per-access-key occupancy, which a pass does not carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sequencer {
    /// Earlier `starts_at` first, then input order.
    #[default]
    Fifo,
    /// Later `starts_at` first, then reverse input order.
    Lifo,
}

impl Sequencer {
    /// Sorts workloads into scheduling order.
    ///
    /// Workloads without `starts_at` come after those with one at the same
    /// priority.
    pub fn sequence(&self, mut workloads: Vec<SessionWorkload>) -> Vec<SessionWorkload> {
        match self {
            Sequencer::Fifo => workloads.sort_by(|a, b| {
                b.priority
                    .cmp(&a.priority)
                    .then_with(|| compare_start(a.starts_at, b.starts_at, false))
            }),
            Sequencer::Lifo => {
                workloads.reverse();
                workloads.sort_by(|a, b| {
                    b.priority
                        .cmp(&a.priority)
                        .then_with(|| compare_start(a.starts_at, b.starts_at, true))
                });
            }
        }
        workloads
    }
}

fn compare_start(
    a: Option<DateTime<Utc>>,
    b: Option<DateTime<Utc>>,
    latest_first: bool,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if latest_first => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl std::fmt::Display for Sequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sequencer::Fifo => write!(f, "fifo"),
            Sequencer::Lifo => write!(f, "lifo"),
        }
    }
}

impl std::str::FromStr for Sequencer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fifo" => Ok(Sequencer::Fifo),
            "lifo" => Ok(Sequencer::Lifo),
            other => Err(format!("unknown sequencer: {other}")),
        }
    }
}

/// A session that could not be placed in this pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingFailure {
    pub session_id: SessionId,
    /// Kernels of the placement unit that failed.
    pub kernel_ids: Vec<KernelId>,
    pub message: String,
}

/// Result of one provisioning pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvisionOutcome {
    /// In scheduling order.
    pub allocations: Vec<SchedulingDecision>,
    pub failures: Vec<SchedulingFailure>,
    /// The ledger after every successful allocation was committed.
    pub agents: Vec<AgentInfo>,
}

impl ProvisionOutcome {
    pub fn scheduled_count(&self) -> usize {
        self.allocations.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }
}

/// Schedules the pending sessions of one scaling group.
#[derive(Debug)]
pub struct Provisioner {
    scheduler: Scheduler,
    sequencer: Sequencer,
}

impl Provisioner {
    pub fn new(scheduler: Scheduler, sequencer: Sequencer) -> Self {
        Self {
            scheduler,
            sequencer,
        }
    }

    pub fn sequencer(&self) -> Sequencer {
        self.sequencer
    }

    /// Runs one pass over `workloads`.
    ///
    /// Selection failures are collected in the outcome. Invariant violations
    /// abort the pass.
    #[instrument(skip_all, fields(scaling_group = %scaling_group, sequencer = %self.sequencer))]
    pub fn schedule_scaling_group(
        &mut self,
        workloads: Vec<SessionWorkload>,
        agents: Vec<AgentInfo>,
        config: &AgentSelectionConfig,
        scaling_group: &str,
    ) -> SchedulerResult<ProvisionOutcome> {
        let workloads = self.sequencer.sequence(workloads);
        debug!(workload_count = workloads.len(), "Sequenced workloads");

        let mut outcome = ProvisionOutcome {
            agents,
            ..Default::default()
        };
        let mut skipped = 0usize;

        for workload in &workloads {
            if workload.scaling_group != scaling_group {
                warn!(
                    session_id = %workload.session_id,
                    workload_scaling_group = %workload.scaling_group,
                    "Workload belongs to another scaling group"
                );
                outcome.failures.push(SchedulingFailure {
                    session_id: workload.session_id,
                    kernel_ids: workload.kernel_ids(),
                    message: format!(
                        "session targets scaling group '{}', not '{}'",
                        workload.scaling_group, scaling_group
                    ),
                });
                continue;
            }

            let mut attempt = outcome.agents.clone();
            match self
                .scheduler
                .try_allocate_workload(workload, &mut attempt, config, scaling_group)
            {
                Ok(decision) => {
                    outcome.agents = attempt;
                    outcome.allocations.push(decision);
                }
                Err(AllocationError::NothingToPlace) => {
                    debug!(session_id = %workload.session_id, "Skipping workload without kernels");
                    skipped += 1;
                }
                Err(AllocationError::Selection { kernel_ids, source }) => {
                    warn!(
                        session_id = %workload.session_id,
                        error = %source,
                        "Failed to schedule session"
                    );
                    outcome.failures.push(SchedulingFailure {
                        session_id: workload.session_id,
                        kernel_ids,
                        message: source.to_string(),
                    });
                }
                Err(AllocationError::Invariant(violation)) => return Err(violation.into()),
            }
        }

        info!(
            sessions_scheduled = outcome.scheduled_count(),
            sessions_failed = outcome.failed_count(),
            sessions_skipped = skipped,
            "Provisioning pass complete"
        );

        Ok(outcome)
    }
}
