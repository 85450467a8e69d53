use std::cmp::Reverse;

use super::utils::{count_unutilized_capabilities, ranking_dimensions, RankingKey};
use super::{AgentSelectionConfig, AgentSelectionCriteria, AgentSelector, ResourceRequirements};
use crate::agent::AgentStateTracker;

/// The pre-redesign placement heuristic, kept for scaling groups configured
/// with `legacy`.
///
/// Orders candidates like [`super::DispersedAgentSelector`]: most remaining
/// capacity over the requested dimensions in priority order, then fewest
/// unutilized capabilities, then agent id.
#[derive(Debug, Clone)]
pub struct LegacyAgentSelector {
    resource_priority: Vec<String>,
    ranking_key: RankingKey,
}

impl LegacyAgentSelector {
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

impl AgentSelector for LegacyAgentSelector {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn success_message(&self) -> &'static str {
        "Selected agent using legacy strategy"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_common::*;
    use crate::types::SessionType;

    fn pick(agents: &[crate::AgentInfo], requirement: &ResourceRequirements) -> String {
        let trackers = AgentStateTracker::track_all(agents).unwrap();
        let mut selector = LegacyAgentSelector::new(default_priority());
        selector
            .select(
                &trackers,
                requirement,
                &make_criteria(SessionType::Batch),
                &default_config(),
            )
            .unwrap()
            .agent_id()
            .to_string()
    }

    #[test]
    fn test_prefers_least_loaded_agent() {
        let agents = vec![
            make_agent("agent-1", 16, 14),
            make_agent("agent-2", 16, 8),
            make_agent("agent-3", 16, 2),
        ];
        assert_eq!(pick(&agents, &make_requirement(&[("cpu", "1"), ("mem", "1024")])), "agent-3");
    }

    #[test]
    fn test_general_agent_is_kept_free_of_cpu_work_on_gpu_agents() {
        // agent-1 has an accelerator but only 2 cpu free; agent-2 has 8.
        let mut gpu = make_agent("agent-1", 8, 6);
        gpu.available_slots = slots(&[("cpu", "8"), ("mem", "8192"), ("cuda.shares", "4")]);
        let agents = vec![gpu, make_agent("agent-2", 8, 0)];

        assert_eq!(
            pick(&agents, &make_requirement(&[("cpu", "1"), ("mem", "1024")])),
            "agent-2"
        );
    }

    #[test]
    fn test_same_order_as_dispersed() {
        let mut gpu = make_agent("agent-1", 8, 6);
        gpu.available_slots = slots(&[("cpu", "8"), ("mem", "8192"), ("cuda.shares", "4")]);
        let agents = vec![
            gpu,
            make_agent("agent-2", 8, 0),
            make_agent("agent-3", 8, 0),
            make_agent("agent-4", 16, 12),
        ];
        let requirement = make_requirement(&[("cpu", "1"), ("mem", "1024")]);
        let trackers = AgentStateTracker::track_all(&agents).unwrap();
        let criteria = make_criteria(SessionType::Batch);

        let mut dispersed = crate::selector::DispersedAgentSelector::new(default_priority());
        let expected = dispersed
            .select(&trackers, &requirement, &criteria, &default_config())
            .unwrap()
            .agent_id()
            .to_string();
        assert_eq!(pick(&agents, &requirement), expected);
        assert_eq!(expected, "agent-2");
    }

    #[test]
    fn test_ties_prefer_fewer_unutilized() {
        let mut gpu = make_agent("agent-1", 8, 0);
        gpu.available_slots = slots(&[("cpu", "8"), ("mem", "8192"), ("tpu", "1")]);
        let agents = vec![gpu, make_agent("agent-2", 8, 0)];

        assert_eq!(pick(&agents, &make_requirement(&[("cpu", "1")])), "agent-2");
    }
}
