use super::{AgentSelectionConfig, AgentSelectionCriteria, AgentSelector, ResourceRequirements};
use crate::agent::AgentStateTracker;

/// Rotates through the feasible agents.
///
/// The cursor belongs to the selector instance, so two schedulers never
/// share a rotation. Feasible agents are ordered by id before indexing so the
/// rotation does not depend on candidate order.
#[derive(Debug, Clone, Default)]
pub struct RoundRobinAgentSelector {
    next_index: usize,
}

impl RoundRobinAgentSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the rotation at `next_index`.
    pub fn with_start(next_index: usize) -> Self {
        Self { next_index }
    }

    /// Index the next selection will use, before wrapping.
    pub fn next_index(&self) -> usize {
        self.next_index
    }
}

impl AgentSelector for RoundRobinAgentSelector {
    fn name(&self) -> &'static str {
        "roundrobin"
    }

    fn success_message(&self) -> &'static str {
        "Selected agent using round-robin strategy"
    }

    fn select_by_strategy<'a>(
        &mut self,
        feasible: &[&'a AgentStateTracker<'a>],
        _requirement: &ResourceRequirements,
        _criteria: &AgentSelectionCriteria,
        _config: &AgentSelectionConfig,
    ) -> Option<&'a AgentStateTracker<'a>> {
        if feasible.is_empty() {
            return None;
        }

        let mut ordered = feasible.to_vec();
        ordered.sort_by_key(|t| t.agent_id());

        let index = self.next_index % ordered.len();
        self.next_index = index + 1;
        Some(ordered[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_common::*;
    use crate::types::SessionType;

    fn select_id(selector: &mut RoundRobinAgentSelector, agents: &[crate::AgentInfo]) -> String {
        let trackers = AgentStateTracker::track_all(agents).unwrap();
        selector
            .select(
                &trackers,
                &make_requirement(&[("cpu", "1")]),
                &make_criteria(SessionType::Interactive),
                &default_config(),
            )
            .unwrap()
            .agent_id()
            .to_string()
    }

    #[test]
    fn test_round_robin_cycles() {
        let agents = vec![
            make_agent("agent-3", 8, 0),
            make_agent("agent-1", 8, 0),
            make_agent("agent-2", 8, 0),
        ];
        let mut selector = RoundRobinAgentSelector::new();

        let picks: Vec<_> = (0..4).map(|_| select_id(&mut selector, &agents)).collect();
        assert_eq!(picks, vec!["agent-1", "agent-2", "agent-3", "agent-1"]);
        assert_eq!(selector.next_index(), 1);
    }

    #[test]
    fn test_round_robin_skips_infeasible() {
        let agents = vec![
            make_agent("agent-1", 8, 0),
            make_agent("agent-2", 8, 8),
            make_agent("agent-3", 8, 0),
        ];
        let mut selector = RoundRobinAgentSelector::with_start(1);

        assert_eq!(select_id(&mut selector, &agents), "agent-3");
        assert_eq!(select_id(&mut selector, &agents), "agent-1");
    }

    #[test]
    fn test_round_robin_wraps_large_cursor() {
        let agents = vec![make_agent("agent-1", 8, 0), make_agent("agent-2", 8, 0)];
        let mut selector = RoundRobinAgentSelector::with_start(7);

        assert_eq!(select_id(&mut selector, &agents), "agent-2");
        assert_eq!(selector.next_index(), 2);
    }

    #[test]
    fn test_independent_cursors() {
        let agents = vec![make_agent("agent-1", 8, 0), make_agent("agent-2", 8, 0)];
        let mut first = RoundRobinAgentSelector::new();
        let mut second = RoundRobinAgentSelector::new();

        assert_eq!(select_id(&mut first, &agents), "agent-1");
        assert_eq!(select_id(&mut first, &agents), "agent-2");
        assert_eq!(select_id(&mut second, &agents), "agent-1");
    }
}
