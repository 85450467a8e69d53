//! Scaling-group passes through [`Provisioner`] and settings.

use sokovan_scheduler::{
    AgentInfo, Provisioner, Scheduler, SchedulerSettings, SelectionStrategy, Sequencer,
};
use sokovan_testing::{init_tracing, kernel, slots, AgentBuilder, SessionBuilder};

fn agent(id: &str, cpu: u32) -> AgentInfo {
    AgentBuilder::new(id).cpu(cpu).mem(16384).build()
}

#[test]
fn pass_commits_each_success_before_the_next_session() {
    init_tracing();
    let settings = SchedulerSettings {
        strategy: SelectionStrategy::Concentrated,
        ..Default::default()
    };
    let mut provisioner = settings.build_provisioner();

    let sessions = vec![
        SessionBuilder::single_node().kernel(kernel(3, 1024)).build(),
        SessionBuilder::single_node().kernel(kernel(3, 1024)).build(),
        SessionBuilder::single_node().kernel(kernel(3, 1024)).build(),
    ];
    let outcome = provisioner
        .schedule_scaling_group(
            sessions,
            vec![agent("agent-1", 4), agent("agent-2", 4)],
            &settings.selection_config(),
            "default",
        )
        .unwrap();

    assert_eq!(outcome.scheduled_count(), 2);
    assert_eq!(outcome.failed_count(), 1);
    let placed: Vec<_> = outcome
        .allocations
        .iter()
        .map(|d| d.agent_allocations[0].agent_id.as_str())
        .collect();
    assert_eq!(placed, vec!["agent-1", "agent-2"]);
    assert!(outcome
        .agents
        .iter()
        .all(|a| a.occupied_slots == slots(&[("cpu", "3"), ("mem", "1024")])));
}

#[test]
fn higher_priority_sessions_are_placed_first() {
    let mut provisioner = Provisioner::new(
        Scheduler::from_strategy(SelectionStrategy::Dispersed, vec!["cpu".into(), "mem".into()]),
        Sequencer::Fifo,
    );
    let low = SessionBuilder::single_node().priority(0).kernel(kernel(4, 1024)).build();
    let high = SessionBuilder::single_node().priority(10).kernel(kernel(4, 1024)).build();
    let high_id = high.session_id;
    let low_id = low.session_id;

    let outcome = provisioner
        .schedule_scaling_group(
            vec![low, high],
            vec![agent("agent-1", 4)],
            &Default::default(),
            "default",
        )
        .unwrap();

    assert_eq!(outcome.allocations[0].session_id, high_id);
    assert_eq!(outcome.failures[0].session_id, low_id);
    assert!(outcome.failures[0].message.contains("no available agents"));
}

#[test]
fn container_cap_from_settings_applies_to_the_pass() {
    let settings = SchedulerSettings {
        strategy: SelectionStrategy::RoundRobin,
        max_container_count_per_agent: Some(1),
        ..Default::default()
    };
    let mut provisioner = settings.build_provisioner();
    let sessions: Vec<_> = (0..3)
        .map(|_| SessionBuilder::single_node().kernel(kernel(1, 128)).build())
        .collect();

    let outcome = provisioner
        .schedule_scaling_group(
            sessions,
            vec![agent("agent-1", 8), agent("agent-2", 8)],
            &settings.selection_config(),
            "default",
        )
        .unwrap();

    assert_eq!(outcome.scheduled_count(), 2);
    assert!(outcome.failures[0].message.contains("container limit exceeded"));
    assert!(outcome.agents.iter().all(|a| a.container_count == 1));
}
