use std::collections::{HashMap, VecDeque};

use super::rates::MetricKind;

const DEFAULT_CAPACITY: usize = 120;

/// Bounded ring of recent values for one metric; oldest evicted on overflow.
#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    values: VecDeque<f64>,
    capacity: usize,
}

impl SeriesBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn values(&self) -> &VecDeque<f64> {
        &self.values
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }
}

/// Chart history for the UI. This is the only retention the telemetry side
/// has; snapshots themselves are discarded once their rates are derived.
#[derive(Debug)]
pub struct MetricHistory {
    series: HashMap<MetricKind, SeriesBuffer>,
    capacity: usize,
}

impl MetricHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            series: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, kind: MetricKind, value: f64) {
        self.series
            .entry(kind)
            .or_insert_with(|| SeriesBuffer::new(self.capacity))
            .push(value);
    }

    pub fn series(&self, kind: MetricKind) -> Option<&SeriesBuffer> {
        self.series.get(&kind)
    }
}

impl Default for MetricHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
