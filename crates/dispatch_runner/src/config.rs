//! Static configuration loading (§6): one YAML file, loaded once at startup.
//!
//! One struct per config table (`fleet`, `request`, `sim`, `dispatch`) to
//! match §6's nested key layout, plus a fluent `with_*` builder surface so
//! tests and examples can construct a `SimConfig` without a file on disk.

use dispatch_core::epoch::DispatchStrategy;
use dispatch_core::model::DeadlineConstraints;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FleetConfig {
    pub size: usize,
    pub capacity: usize,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            size: 100,
            capacity: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RequestConfig {
    /// Fraction of the demand trace consumed; stride = `1 / density`.
    pub density: f64,
    pub max_wait_s: u64,
    pub max_detour: f64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            density: 1.0,
            max_wait_s: 300,
            max_detour: 1.3,
        }
    }
}

impl RequestConfig {
    pub fn constraints(&self) -> DeadlineConstraints {
        DeadlineConstraints {
            max_wait_ms: self.max_wait_s * 1_000,
            max_detour: self.max_detour,
        }
    }

    /// `stride = round(1 / density)`, at least 1 (§6's `request.density`).
    pub fn stride(&self) -> u64 {
        if self.density <= 0.0 {
            u64::MAX
        } else {
            (1.0 / self.density).round().max(1.0) as u64
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimTimingConfig {
    /// Wall-clock `HH:MM:SS` anchor for the trace.
    pub start_time: String,
    pub cycle_s: u64,
    pub warmup_min: u64,
    pub main_min: u64,
    pub winddown_min: u64,
}

impl Default for SimTimingConfig {
    fn default() -> Self {
        Self {
            start_time: "00:00:00".to_string(),
            cycle_s: 30,
            warmup_min: 0,
            main_min: 60,
            winddown_min: 0,
        }
    }
}

impl SimTimingConfig {
    pub fn delta_ms(&self) -> u64 {
        self.cycle_s * 1_000
    }

    pub fn total_epochs(&self) -> u64 {
        let total_min = self.warmup_min + self.main_min + self.winddown_min;
        (total_min * 60_000) / self.delta_ms().max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DispatcherKind {
    Gi,
    Sba,
    Osp,
}

impl From<DispatcherKind> for DispatchStrategy {
    fn from(kind: DispatcherKind) -> Self {
        match kind {
            DispatcherKind::Gi => DispatchStrategy::GreedyInsertion,
            DispatcherKind::Sba => DispatchStrategy::SingleRequestBatch,
            DispatcherKind::Osp => DispatchStrategy::OptimalSchedulePool,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RebalancerKind {
    None,
    Nr,
    Rvs,
    Npo,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DispatchConfig {
    pub dispatcher: DispatcherKind,
    pub rebalancer: RebalancerKind,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            dispatcher: DispatcherKind::Osp,
            rebalancer: RebalancerKind::None,
        }
    }
}

/// The top-level §6 config table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimConfig {
    pub fleet: FleetConfig,
    pub request: RequestConfig,
    pub sim: SimTimingConfig,
    pub dispatch: DispatchConfig,
}

impl SimConfig {
    pub fn with_fleet(mut self, fleet: FleetConfig) -> Self {
        self.fleet = fleet;
        self
    }

    pub fn with_request(mut self, request: RequestConfig) -> Self {
        self.request = request;
        self
    }

    pub fn with_sim(mut self, sim: SimTimingConfig) -> Self {
        self.sim = sim;
        self
    }

    pub fn with_dispatch(mut self, dispatch: DispatchConfig) -> Self {
        self.dispatch = dispatch;
        self
    }
}

/// Load a `SimConfig` from a YAML file. Fatal at startup on any failure
/// (§7: "Configuration missing/invalid ... Fatal at startup").
pub fn load(path: &std::path::Path) -> Result<SimConfig, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|error| format!("failed to read config file {}: {error}", path.display()))?;
    serde_yaml::from_str(&contents)
        .map_err(|error| format!("failed to parse config file {}: {error}", path.display()))
}
