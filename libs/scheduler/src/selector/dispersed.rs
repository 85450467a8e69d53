use std::cmp::Reverse;

use super::utils::{count_unutilized_capabilities, ranking_dimensions, RankingKey};
use super::{AgentSelectionConfig, AgentSelectionCriteria, AgentSelector, ResourceRequirements};
use crate::agent::AgentStateTracker;

/// Spreads load by choosing the agent with the most remaining capacity.
#[derive(Debug, Clone)]
pub struct DispersedAgentSelector {
    resource_priority: Vec<String>,
    ranking_key: RankingKey,
}

impl DispersedAgentSelector {
    pub fn new(resource_priority: Vec<String>) -> Self {
        Self {
            resource_priority,
            ranking_key: RankingKey::default(),
        }
    }

    pub fn with_ranking_key(mut self, ranking_key: RankingKey) -> Self {
        self.ranking_key = ranking_key;
        self
    }
}

impl AgentSelector for DispersedAgentSelector {
    fn name(&self) -> &'static str {
        "dispersed"
    }

    fn success_message(&self) -> &'static str {
        "Selected agent using dispersed strategy"
    }

    fn select_by_strategy<'a>(
        &mut self,
        feasible: &[&'a AgentStateTracker<'a>],
        requirement: &ResourceRequirements,
        _criteria: &AgentSelectionCriteria,
        _config: &AgentSelectionConfig,
    ) -> Option<&'a AgentStateTracker<'a>> {
        let dims = ranking_dimensions(&requirement.requested_slots, &self.resource_priority);

        feasible.iter().copied().min_by_key(|tracker| {
            (
                Reverse(self.ranking_key.vector(tracker, &dims)),
                count_unutilized_capabilities(
                    tracker.original_agent(),
                    &requirement.requested_slots,
                ),
                tracker.agent_id(),
            )
        })
    }
}
