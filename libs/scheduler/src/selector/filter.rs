//! Feasibility checks shared by every strategy.

use std::collections::BTreeSet;

use super::{AgentSelectionConfig, AgentSelectionError, CandidateRejection, ResourceRequirements};
use crate::agent::AgentStateTracker;

/// Checks one candidate against a requirement.
///
/// Architecture is checked first, then free capacity, then the container cap.
pub fn check_candidate(
    tracker: &AgentStateTracker<'_>,
    requirement: &ResourceRequirements,
    config: &AgentSelectionConfig,
) -> Result<(), CandidateRejection> {
    let agent = tracker.original_agent();
    if agent.architecture != requirement.required_architecture {
        return Err(CandidateRejection::ArchitectureMismatch {
            required: requirement.required_architecture.clone(),
            actual: agent.architecture.clone(),
        });
    }

    let shortages = requirement
        .requested_slots
        .shortages_against(tracker.free_slots());
    if !shortages.is_empty() {
        return Err(CandidateRejection::InsufficientResources { shortages });
    }

    if let Some(max) = config.max_container_count {
        let current = tracker.container_count();
        if current >= max {
            return Err(CandidateRejection::ContainerLimitExceeded { current, max });
        }
    }

    Ok(())
}

/// Narrows `candidates` to the agents that can take `requirement`.
///
/// The result keeps candidate order and is never empty.
pub fn filter_feasible<'a>(
    candidates: &'a [AgentStateTracker<'a>],
    requirement: &ResourceRequirements,
    scaling_group: &str,
    config: &AgentSelectionConfig,
) -> Result<Vec<&'a AgentStateTracker<'a>>, AgentSelectionError> {
    if candidates.is_empty() {
        return Err(AgentSelectionError::NoAgents {
            scaling_group: scaling_group.to_string(),
        });
    }

    let arch_compatible: Vec<_> = candidates
        .iter()
        .filter(|t| t.original_agent().architecture == requirement.required_architecture)
        .collect();
    if arch_compatible.is_empty() {
        let available: BTreeSet<&str> = candidates
            .iter()
            .map(|t| t.original_agent().architecture.as_str())
            .collect();
        return Err(AgentSelectionError::NoCompatibleAgent {
            required: requirement.required_architecture.clone(),
            available: available.into_iter().collect::<Vec<_>>().join(", "),
        });
    }

    let mut feasible = Vec::with_capacity(arch_compatible.len());
    // Distinct reasons in first-seen order, with counts.
    let mut reasons: Vec<(String, usize)> = Vec::new();
    for tracker in arch_compatible {
        match check_candidate(tracker, requirement, config) {
            Ok(()) => feasible.push(tracker),
            Err(rejection) => {
                let reason = rejection.to_string();
                match reasons.iter_mut().find(|(r, _)| *r == reason) {
                    Some((_, count)) => *count += 1,
                    None => reasons.push((reason, 1)),
                }
            }
        }
    }

    if feasible.is_empty() {
        let details = reasons
            .iter()
            .map(|(reason, count)| format!("{count}x {reason}"))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(AgentSelectionError::NoAvailableAgent { details });
    }

    Ok(feasible)
}
