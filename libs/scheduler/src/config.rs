//! Scheduler configuration.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::provisioner::{Provisioner, Sequencer};
use crate::scheduler::Scheduler;
use crate::selector::{AgentSelectionConfig, RankingKey, SelectionStrategy};

/// Slot priority used when none is configured.
pub const DEFAULT_RESOURCE_PRIORITY: [&str; 5] = ["cuda", "rocm", "tpu", "cpu", "mem"];

/// Per-tick limits fetched alongside the agent snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    pub max_container_count_per_agent: Option<u32>,
    #[serde(default)]
    pub enforce_spreading_endpoint_replica: bool,
}

impl From<SchedulingConfig> for AgentSelectionConfig {
    fn from(config: SchedulingConfig) -> Self {
        Self {
            max_container_count: config.max_container_count_per_agent,
            enforce_spreading_endpoint_replica: config.enforce_spreading_endpoint_replica,
        }
    }
}

/// Static settings of a scheduler instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    pub strategy: SelectionStrategy,
    pub resource_priority: Vec<String>,
    pub ranking_key: RankingKey,
    pub max_container_count_per_agent: Option<u32>,
    pub enforce_spreading_endpoint_replica: bool,
    pub sequencer: Sequencer,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            strategy: SelectionStrategy::default(),
            resource_priority: DEFAULT_RESOURCE_PRIORITY.iter().map(|s| s.to_string()).collect(),
            ranking_key: RankingKey::default(),
            max_container_count_per_agent: None,
            enforce_spreading_endpoint_replica: false,
            sequencer: Sequencer::default(),
        }
    }
}

impl SchedulerSettings {
    /// Reads `SOKOVAN_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let strategy = match lookup("SOKOVAN_AGENT_SELECTION_STRATEGY") {
            Some(v) => v.parse().map_err(|e: String| anyhow!(e))?,
            None => defaults.strategy,
        };

        let resource_priority = lookup("SOKOVAN_RESOURCE_PRIORITY")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty())
            .unwrap_or(defaults.resource_priority);

        let ranking_key = match lookup("SOKOVAN_RANKING_KEY") {
            Some(v) => v.parse().map_err(|e: String| anyhow!(e))?,
            None => defaults.ranking_key,
        };

        let max_container_count_per_agent =
            match lookup("SOKOVAN_MAX_CONTAINER_COUNT_PER_AGENT") {
                Some(v) if !v.trim().is_empty() => Some(v.trim().parse::<u32>().context(
                    "SOKOVAN_MAX_CONTAINER_COUNT_PER_AGENT must be a non-negative integer",
                )?),
                _ => None,
            };

        let enforce_spreading_endpoint_replica =
            lookup("SOKOVAN_ENFORCE_SPREADING_ENDPOINT_REPLICA")
                .map(|v| v == "1" || v.to_lowercase() == "true")
                .unwrap_or(false);

        let sequencer = match lookup("SOKOVAN_SEQUENCER") {
            Some(v) => v.parse().map_err(|e: String| anyhow!(e))?,
            None => defaults.sequencer,
        };

        Ok(Self {
            strategy,
            resource_priority,
            ranking_key,
            max_container_count_per_agent,
            enforce_spreading_endpoint_replica,
            sequencer,
        })
    }

    pub fn scheduling_config(&self) -> SchedulingConfig {
        SchedulingConfig {
            max_container_count_per_agent: self.max_container_count_per_agent,
            enforce_spreading_endpoint_replica: self.enforce_spreading_endpoint_replica,
        }
    }

    pub fn selection_config(&self) -> AgentSelectionConfig {
        self.scheduling_config().into()
    }

    pub fn build_scheduler(&self) -> Scheduler {
        Scheduler::new(
            self.strategy
                .build(self.resource_priority.clone(), self.ranking_key),
        )
    }

    pub fn build_provisioner(&self) -> Provisioner {
        Provisioner::new(self.build_scheduler(), self.sequencer)
    }
}
