use tracing::trace;

use super::utils::{count_unutilized_capabilities, ranking_dimensions, RankingKey};
use super::{AgentSelectionConfig, AgentSelectionCriteria, AgentSelector, ResourceRequirements};
use crate::agent::AgentStateTracker;

/// Packs load onto the busiest agent that still fits.
///
/// The agent with the smallest remaining capacity, compared dimension by
/// dimension in priority order, wins. For inference sessions with replica
/// spreading enabled, the agent serving the fewest replicas of the endpoint
/// wins first and packing only breaks ties.
#[derive(Debug, Clone)]
pub struct ConcentratedAgentSelector {
    resource_priority: Vec<String>,
    ranking_key: RankingKey,
}

impl ConcentratedAgentSelector {
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

impl AgentSelector for ConcentratedAgentSelector {
    fn name(&self) -> &'static str {
        "concentrated"
    }

    fn success_message(&self) -> &'static str {
        "Selected agent using concentrated strategy"
    }

    fn select_by_strategy<'a>(
        &mut self,
        feasible: &[&'a AgentStateTracker<'a>],
        requirement: &ResourceRequirements,
        criteria: &AgentSelectionCriteria,
        config: &AgentSelectionConfig,
    ) -> Option<&'a AgentStateTracker<'a>> {
        let dims = ranking_dimensions(&requirement.requested_slots, &self.resource_priority);
        let spread = config.enforce_spreading_endpoint_replica
            && criteria.session_metadata.session_type.is_inference();

        let chosen = feasible.iter().copied().min_by_key(|tracker| {
            let replicas = if spread {
                criteria.endpoint_replicas_on(tracker.agent_id())
            } else {
                0
            };
            (
                replicas,
                self.ranking_key.vector(tracker, &dims),
                count_unutilized_capabilities(
                    tracker.original_agent(),
                    &requirement.requested_slots,
                ),
                tracker.agent_id(),
            )
        });

        if let Some(tracker) = chosen {
            trace!(agent_id = %tracker.agent_id(), spread, "concentrated pick");
        }
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_common::*;
    use crate::types::SessionType;
    use rstest::rstest;

    fn pick(
        agents: &[crate::AgentInfo],
        requirement: &ResourceRequirements,
        criteria: &AgentSelectionCriteria,
        config: &AgentSelectionConfig,
    ) -> String {
        let trackers = AgentStateTracker::track_all(agents).unwrap();
        let mut selector = ConcentratedAgentSelector::new(default_priority());
        selector
            .select(&trackers, requirement, criteria, config)
            .unwrap()
            .agent_id()
            .to_string()
    }

    #[test]
    fn test_prefers_busiest_agent() {
        let agents = vec![
            make_agent("agent-1", 16, 14),
            make_agent("agent-2", 16, 8),
            make_agent("agent-3", 16, 2),
        ];
        let chosen = pick(
            &agents,
            &make_requirement(&[("cpu", "1"), ("mem", "1024")]),
            &make_criteria(SessionType::Interactive),
            &default_config(),
        );
        assert_eq!(chosen, "agent-1");
    }

    #[test]
    fn test_skips_agent_that_does_not_fit() {
        let agents = vec![make_agent("agent-1", 16, 15), make_agent("agent-2", 16, 8)];
        let chosen = pick(
            &agents,
            &make_requirement(&[("cpu", "2")]),
            &make_criteria(SessionType::Interactive),
            &default_config(),
        );
        assert_eq!(chosen, "agent-2");
    }

    #[rstest]
    #[case(true, SessionType::Inference, "agent-3")]
    #[case(false, SessionType::Inference, "agent-1")]
    #[case(true, SessionType::Batch, "agent-1")]
    fn test_endpoint_spreading(
        #[case] enforce: bool,
        #[case] session_type: SessionType,
        #[case] expected: &str,
    ) {
        let agents = vec![
            make_agent("agent-1", 16, 4),
            make_agent("agent-2", 16, 4),
            make_agent("agent-3", 16, 4),
        ];
        let mut criteria = make_criteria(session_type);
        criteria.kernel_counts_at_endpoint =
            endpoint_counts(&[("agent-1", 10), ("agent-2", 5), ("agent-3", 2)]);
        let config = AgentSelectionConfig {
            enforce_spreading_endpoint_replica: enforce,
            ..Default::default()
        };

        let chosen = pick(&agents, &make_requirement(&[("cpu", "1")]), &criteria, &config);
        assert_eq!(chosen, expected);
    }

    #[test]
    fn test_spreading_treats_missing_count_as_zero() {
        let agents = vec![make_agent("agent-1", 16, 14), make_agent("agent-2", 16, 0)];
        let mut criteria = make_criteria(SessionType::Inference);
        criteria.kernel_counts_at_endpoint = endpoint_counts(&[("agent-1", 1)]);
        let config = AgentSelectionConfig {
            enforce_spreading_endpoint_replica: true,
            ..Default::default()
        };

        let chosen = pick(&agents, &make_requirement(&[("cpu", "1")]), &criteria, &config);
        assert_eq!(chosen, "agent-2");
    }

    #[test]
    fn test_unutilized_capabilities_break_ties() {
        let mut gpu = make_agent("agent-1", 8, 0);
        gpu.available_slots = slots(&[("cpu", "8"), ("mem", "8192"), ("cuda.shares", "4")]);
        let agents = vec![gpu, make_agent("agent-2", 8, 0)];

        let chosen = pick(
            &agents,
            &make_requirement(&[("cpu", "1"), ("mem", "1024")]),
            &make_criteria(SessionType::Interactive),
            &default_config(),
        );
        assert_eq!(chosen, "agent-2");
    }

    #[test]
    fn test_ratio_ranking_key() {
        // agent-1 has more free cpu in absolute terms but a lower free ratio.
        let agents = vec![make_agent("agent-1", 64, 48), make_agent("agent-2", 8, 2)];
        let trackers = AgentStateTracker::track_all(&agents).unwrap();
        let requirement = make_requirement(&[("cpu", "1")]);
        let criteria = make_criteria(SessionType::Interactive);

        let mut by_free = ConcentratedAgentSelector::new(default_priority());
        let mut by_ratio = ConcentratedAgentSelector::new(default_priority())
            .with_ranking_key(RankingKey::FreeRatio);
        let config = default_config();

        let free_pick = by_free
            .select(&trackers, &requirement, &criteria, &config)
            .unwrap();
        let ratio_pick = by_ratio
            .select(&trackers, &requirement, &criteria, &config)
            .unwrap();
        assert_eq!(free_pick.agent_id().as_str(), "agent-2");
        assert_eq!(ratio_pick.agent_id().as_str(), "agent-1");
    }
}
