use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::telemetry::health::Thresholds;
use crate::telemetry::rates::MetricKind;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub thresholds: ThresholdsConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Sampling period in seconds; clamped to 1-10 at use sites.
    pub refresh_interval_secs: u64,
    pub smoothing_window: usize,
    pub history_capacity: usize,
    /// How deep the scanner descends when summing a candidate's size.
    pub scan_depth: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            refresh_interval_secs: 2,
            smoothing_window: 3,
            history_capacity: 120,
            scan_depth: 4,
        }
    }
}

impl GeneralConfig {
    pub fn sampling_period(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.clamp(1, 10))
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    pub cpu: Thresholds,
    pub memory: Thresholds,
    pub disk: Thresholds,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        ThresholdsConfig {
            cpu: Thresholds {
                elevated_at: 70.0,
                critical_at: 90.0,
            },
            memory: Thresholds {
                elevated_at: 75.0,
                critical_at: 90.0,
            },
            disk: Thresholds {
                elevated_at: 85.0,
                critical_at: 95.0,
            },
        }
    }
}

impl ThresholdsConfig {
    /// Thresholds for the metrics that get health-classified; rate metrics
    /// like network throughput have no meaningful absolute threshold.
    pub fn for_metric(&self, kind: MetricKind) -> Option<Thresholds> {
        match kind {
            MetricKind::Cpu => Some(self.cpu),
            MetricKind::Memory => Some(self.memory),
            MetricKind::DiskUsage => Some(self.disk),
            _ => None,
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("macsweep").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}
