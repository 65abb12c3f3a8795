use proptest::prelude::*;
use macsweep::telemetry::health::{HealthClassifier, HealthLevel, Thresholds};
use macsweep::telemetry::rates::{MetricKind, counter_rate, cpu_percent};
use macsweep::telemetry::snapshot::CoreTicks;

proptest! {
    #[test]
    fn counter_rate_is_never_negative(
        prev in 0u64..u64::MAX / 2,
        curr in 0u64..u64::MAX / 2,
        elapsed in 0.1f64..3600.0,
    ) {
        let rate = counter_rate(prev, curr, elapsed);
        prop_assert!(rate >= 0.0, "negative rate: {}", rate);
        prop_assert!(rate.is_finite(), "non-finite rate: {}", rate);
    }

    #[test]
    fn counter_reset_always_reads_zero(
        prev in 1u64..u64::MAX / 2,
        drop in 1u64..1_000_000u64,
        elapsed in 0.1f64..3600.0,
    ) {
        let curr = prev.saturating_sub(drop);
        prop_assert_eq!(counter_rate(prev, curr, elapsed), 0.0);
    }

    #[test]
    fn counter_rate_matches_delta_over_elapsed(
        prev in 0u64..1_000_000_000u64,
        delta in 0u64..1_000_000_000u64,
        elapsed in 0.1f64..3600.0,
    ) {
        let rate = counter_rate(prev, prev + delta, elapsed);
        let expected = delta as f64 / elapsed;
        prop_assert!((rate - expected).abs() < 1e-6 * expected.max(1.0));
    }

    #[test]
    fn cpu_percent_stays_in_range(
        cores in prop::collection::vec((0u64..1_000_000, 0u64..1_000_000), 1..64),
        busy_deltas in prop::collection::vec(0u64..10_000, 1..64),
        idle_deltas in prop::collection::vec(0u64..10_000, 1..64),
    ) {
        let prev: Vec<CoreTicks> = cores
            .iter()
            .map(|&(busy, idle)| CoreTicks { busy, total: busy + idle })
            .collect();
        let curr: Vec<CoreTicks> = prev
            .iter()
            .zip(busy_deltas.iter().cycle())
            .zip(idle_deltas.iter().cycle())
            .map(|((core, &busy_d), &idle_d)| CoreTicks {
                busy: core.busy + busy_d,
                total: core.total + busy_d + idle_d,
            })
            .collect();

        if let Some(pct) = cpu_percent(&prev, &curr) {
            prop_assert!((0.0..=100.0).contains(&pct), "out of range: {}", pct);
        }
    }

    #[test]
    fn cpu_counter_reset_reads_zero_percent(
        busy in 1_000u64..1_000_000,
        idle in 1_000u64..1_000_000,
    ) {
        let prev = [CoreTicks { busy, total: busy + idle }];
        // Counters restarted from near zero, as after an interface or host
        // counter reset.
        let curr = [CoreTicks { busy: 10, total: 40 }];
        prop_assert_eq!(cpu_percent(&prev, &curr), Some(0.0));
    }

    #[test]
    fn cpu_all_busy_reads_full(
        busy in 1u64..1_000_000,
        start in 0u64..1_000_000,
    ) {
        let prev = [CoreTicks { busy: start, total: start }];
        let curr = [CoreTicks { busy: start + busy, total: start + busy }];
        prop_assert_eq!(cpu_percent(&prev, &curr), Some(100.0));
    }

    #[test]
    fn classifier_is_monotonic_for_rising_values(
        mut values in prop::collection::vec(0.0f64..120.0, 1..50),
        elevated in 20.0f64..60.0,
        margin in 0.0f64..5.0,
    ) {
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let thresholds = Thresholds {
            elevated_at: elevated,
            critical_at: elevated + 30.0,
        };
        let mut classifier = HealthClassifier::new(margin);
        let mut prev = HealthLevel::Nominal;
        for value in values {
            let level = classifier.classify(MetricKind::Cpu, value, thresholds);
            prop_assert!(level >= prev, "level dropped while value rose to {}", value);
            prev = level;
        }
    }

    #[test]
    fn classifier_never_downgrades_within_the_margin(
        margin in 0.5f64..5.0,
        dip in 0.0f64..1.0,
    ) {
        let thresholds = Thresholds { elevated_at: 70.0, critical_at: 90.0 };
        let mut classifier = HealthClassifier::new(margin);
        classifier.classify(MetricKind::Memory, 95.0, thresholds);
        // A dip to just inside the margin below the boundary must hold.
        let value = thresholds.critical_at - margin * dip;
        let level = classifier.classify(MetricKind::Memory, value, thresholds);
        prop_assert_eq!(level, HealthLevel::Critical);
    }
}
