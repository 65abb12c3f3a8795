use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::rates::MetricKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum HealthLevel {
    Nominal,
    Elevated,
    Critical,
}

impl HealthLevel {
    pub fn label(self) -> &'static str {
        match self {
            HealthLevel::Nominal => "nominal",
            HealthLevel::Elevated => "elevated",
            HealthLevel::Critical => "critical",
        }
    }
}

/// Per-metric threshold pair, injected from configuration.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Thresholds {
    pub elevated_at: f64,
    pub critical_at: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            elevated_at: 70.0,
            critical_at: 90.0,
        }
    }
}

/// Margin, in metric units, a value must clear below a boundary before the
/// level downgrades. Prevents flapping right at a threshold.
pub const HYSTERESIS_MARGIN: f64 = 2.0;

fn raw_level(value: f64, t: Thresholds) -> HealthLevel {
    if value >= t.critical_at {
        HealthLevel::Critical
    } else if value >= t.elevated_at {
        HealthLevel::Elevated
    } else {
        HealthLevel::Nominal
    }
}

/// The only retained state is the last level per metric, kept for
/// hysteresis; classification itself is a pure mapping.
pub struct HealthClassifier {
    last: HashMap<MetricKind, HealthLevel>,
    margin: f64,
}

impl Default for HealthClassifier {
    fn default() -> Self {
        Self::new(HYSTERESIS_MARGIN)
    }
}

impl HealthClassifier {
    pub fn new(margin: f64) -> Self {
        Self {
            last: HashMap::new(),
            margin,
        }
    }

    pub fn classify(&mut self, kind: MetricKind, value: f64, thresholds: Thresholds) -> HealthLevel {
        let raw = raw_level(value, thresholds);
        let level = match self.last.get(&kind) {
            Some(&prev) if raw < prev => {
                let boundary = match prev {
                    HealthLevel::Critical => thresholds.critical_at,
                    HealthLevel::Elevated => thresholds.elevated_at,
                    HealthLevel::Nominal => f64::NEG_INFINITY,
                };
                if value > boundary - self.margin {
                    prev
                } else {
                    raw
                }
            }
            _ => raw,
        };
        self.last.insert(kind, level);
        level
    }
}
