use sokovan_id::AgentId;
use sokovan_resource::SlotShortage;
use thiserror::Error;

/// No agent can take a placement unit.
///
/// Always recoverable: the session stays pending and is retried in a later pass.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgentSelectionError {
    #[error("no agents available in scaling group '{scaling_group}'")]
    NoAgents { scaling_group: String },

    #[error(
        "no agents with required architecture '{required}'; \
         available architectures: {available}"
    )]
    NoCompatibleAgent { required: String, available: String },

    #[error("no available agents; details: {details}")]
    NoAvailableAgent { details: String },

    #[error("designated agent '{agent_id}' not found among candidates")]
    DesignatedAgentNotFound { agent_id: AgentId },

    #[error("designated agent '{agent_id}' is not compatible; details: {reason}")]
    DesignatedAgentIncompatible {
        agent_id: AgentId,
        reason: CandidateRejection,
    },

    #[error("single-node session has kernels with different architectures: {architectures}")]
    ArchitectureMismatch { architectures: String },
}

/// Why one candidate was left out of the feasible set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CandidateRejection {
    #[error("architecture mismatch (required: {required}, agent: {actual})")]
    ArchitectureMismatch { required: String, actual: String },

    #[error("insufficient resources: {}", format_shortages(.shortages))]
    InsufficientResources { shortages: Vec<SlotShortage> },

    #[error("container limit exceeded (current: {current}, max: {max})")]
    ContainerLimitExceeded { current: u32, max: u32 },
}

fn format_shortages(shortages: &[SlotShortage]) -> String {
    shortages
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
