use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::warn;

use super::collector::Collector;
use super::health::{HealthClassifier, HealthLevel};
use super::rates::{MetricKind, Rate, RateEstimator};
use crate::config::{Config, ThresholdsConfig};
use crate::error::EngineError;

/// One delivered sampling tick: smoothed rates plus the classified level for
/// each thresholded metric. `stale` marks a tick whose counter read failed;
/// the values are the previous ones held over, to be rendered as a stale
/// reading rather than an error.
#[derive(Clone, Debug)]
pub struct Reading {
    pub rates: Vec<Rate>,
    pub levels: Vec<(MetricKind, HealthLevel)>,
    pub stale: bool,
}

/// Periodic sampling loop, delivering readings over a channel.
///
/// Counter reads run on the blocking pool and are awaited before the next
/// tick can fire, so at most one read is ever in flight. Ticks that come due
/// while a read is still running are skipped outright, never queued.
pub struct Sampler {
    rx: mpsc::UnboundedReceiver<Reading>,
    _task: tokio::task::JoinHandle<()>,
}

impl Sampler {
    pub fn spawn(config: &Config) -> Self {
        let period = config.general.sampling_period();
        let window = config.general.smoothing_window;
        let thresholds = config.thresholds.clone();
        let (tx, rx) = mpsc::unbounded_channel::<Reading>();

        let task = tokio::spawn(async move {
            let mut collector: Option<Collector> = None;
            let mut estimator = RateEstimator::new(window);
            let mut classifier = HealthClassifier::default();
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;

                let mut c = match collector.take() {
                    Some(c) => c,
                    None => Collector::new(),
                };
                let reading = match tokio::task::spawn_blocking(move || {
                    let snap = c.snapshot();
                    (c, snap)
                })
                .await
                {
                    Ok((c, snap)) => {
                        collector = Some(c);
                        let rates = estimator.update(snap);
                        build_reading(rates, false, &thresholds, &mut classifier)
                    }
                    Err(err) => {
                        // One tick's read failed; hold the previous values
                        // and retry on the next tick.
                        let held = EngineError::TransientSample(err.to_string());
                        warn!(error = %held, "sampling tick failed, holding previous reading");
                        build_reading(estimator.last_rates(), true, &thresholds, &mut classifier)
                    }
                };

                if tx.send(reading).is_err() {
                    break;
                }
            }
        });

        Self { rx, _task: task }
    }

    pub async fn next(&mut self) -> Option<Reading> {
        self.rx.recv().await
    }
}

fn build_reading(
    rates: Vec<Rate>,
    stale: bool,
    thresholds: &ThresholdsConfig,
    classifier: &mut HealthClassifier,
) -> Reading {
    let levels = rates
        .iter()
        .filter_map(|r| {
            thresholds
                .for_metric(r.kind)
                .map(|t| (r.kind, classifier.classify(r.kind, r.value, t)))
        })
        .collect();
    Reading {
        rates,
        levels,
        stale,
    }
}
