//! Shared helpers for unit tests.

use std::collections::HashMap;

use sokovan_id::{AccessKey, AgentId, KernelId, SessionId};
use sokovan_resource::ResourceSlot;
use uuid::Uuid;

pub use sokovan_testing::slots;

use crate::agent::AgentInfo;
use crate::selector::{AgentSelectionConfig, AgentSelectionCriteria, ResourceRequirements};
use crate::types::{ClusterMode, KernelWorkload, SessionType, SessionWorkload};

pub fn default_priority() -> Vec<String> {
    ["cuda", "rocm", "tpu", "cpu", "mem"]
        .into_iter()
        .map(String::from)
        .collect()
}

pub fn default_config() -> AgentSelectionConfig {
    AgentSelectionConfig::default()
}

/// x86_64 agent in `default` with `available_cpu` cores and 8192 bytes of memory.
pub fn make_agent(id: &str, available_cpu: u32, occupied_cpu: u32) -> AgentInfo {
    let (available_cpu, occupied_cpu) = (available_cpu.to_string(), occupied_cpu.to_string());
    AgentInfo {
        agent_id: AgentId::new(id),
        agent_addr: format!("tcp://{id}:6001"),
        architecture: "x86_64".to_string(),
        available_slots: slots(&[("cpu", available_cpu.as_str()), ("mem", "8192")]),
        occupied_slots: slots(&[("cpu", occupied_cpu.as_str())]),
        scaling_group: "default".to_string(),
        container_count: 0,
    }
}

pub fn make_kernel(cpu: u32, mem: u32) -> KernelWorkload {
    let (cpu, mem) = (cpu.to_string(), mem.to_string());
    KernelWorkload {
        kernel_id: KernelId::new(),
        image: "python:3.11".to_string(),
        architecture: "x86_64".to_string(),
        requested_slots: slots(&[("cpu", cpu.as_str()), ("mem", mem.as_str())]),
    }
}

pub fn make_session(cluster_mode: ClusterMode, kernels: Vec<KernelWorkload>) -> SessionWorkload {
    let requested_slots: ResourceSlot = kernels.iter().map(|k| &k.requested_slots).sum();
    SessionWorkload {
        session_id: SessionId::new(),
        access_key: AccessKey::new("AKTEST"),
        requested_slots,
        user_uuid: Uuid::new_v4(),
        group_id: Uuid::new_v4(),
        domain_name: "default".to_string(),
        scaling_group: "default".to_string(),
        priority: 0,
        session_type: SessionType::Interactive,
        cluster_mode,
        starts_at: None,
        is_private: false,
        kernels,
        designated_agent: None,
        kernel_counts_at_endpoint: HashMap::new(),
    }
}

pub fn make_requirement(pairs: &[(&str, &str)]) -> ResourceRequirements {
    ResourceRequirements {
        kernel_ids: vec![KernelId::new()],
        requested_slots: slots(pairs),
        required_architecture: "x86_64".to_string(),
    }
}

pub fn make_criteria(session_type: SessionType) -> AgentSelectionCriteria {
    let mut workload = make_session(ClusterMode::SingleNode, vec![make_kernel(1, 1024)]);
    workload.session_type = session_type;
    workload.to_selection_criteria()
}

pub fn endpoint_counts(pairs: &[(&str, u32)]) -> HashMap<AgentId, u32> {
    pairs
        .iter()
        .map(|(id, count)| (AgentId::new(*id), *count))
        .collect()
}
