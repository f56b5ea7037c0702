//! Multi-phase traffic scenarios driven through real detectors.
//!
//! Traffic is generated with a seeded `StdRng`: each step advances time by a
//! uniform draw from `1..=delta`, so `delta = 8` is base load and `delta = 2`
//! is roughly a 3x burst.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sg_core::{Detector, DetectorConfig, Phase, Timestamp, VecSink};
use sg_core::ObservationSink;

const CAPACITY: usize = 256;
const BASE_EVENTS: usize = CAPACITY * 1024;

#[derive(Debug, Default)]
struct PhaseReport {
    spikes: usize,
    max_ratio: f64,
    first_spike: Option<usize>,
    min_admit_probability: f64,
}

struct Scenario {
    detector: Detector,
    rng: StdRng,
    time: Timestamp,
}

impl Scenario {
    fn new(seed: u64) -> Self {
        Self {
            detector: Detector::new(CAPACITY, 2.0, 0.00001).expect("default detector"),
            rng: StdRng::seed_from_u64(seed),
            time: 0,
        }
    }

    fn run(&mut self, events: usize, delta: u64) -> PhaseReport {
        let mut report = PhaseReport {
            min_admit_probability: 1.0,
            ..PhaseReport::default()
        };
        for i in 0..events {
            self.time += self.rng.random_range(1..=delta);
            let obs = self.detector.process(self.time).expect("monotonic stream");
            assert!(obs.ratio.is_finite());
            assert!(obs.admit_probability > 0.0 && obs.admit_probability <= 1.0);
            if obs.is_spike {
                report.spikes += 1;
                report.first_spike.get_or_insert(i);
            }
            report.max_ratio = report.max_ratio.max(obs.ratio);
            report.min_admit_probability = report.min_admit_probability.min(obs.admit_probability);
        }
        report
    }

    fn run_constant(&mut self, events: usize, gap: u64) -> PhaseReport {
        let mut report = PhaseReport::default();
        for i in 0..events {
            self.time += gap;
            let obs = self.detector.process(self.time).expect("monotonic stream");
            if obs.is_spike {
                report.spikes += 1;
                report.first_spike.get_or_insert(i);
            }
            report.max_ratio = report.max_ratio.max(obs.ratio);
        }
        report
    }

    fn pause(&mut self, span: Timestamp) {
        self.time += span;
    }
}

#[test]
fn full_scenario_phases() {
    let mut s = Scenario::new(1);

    let base = s.run(BASE_EVENTS, 8);
    assert_eq!(base.spikes, 0, "base load spiked: {:?}", base);
    assert_eq!(s.detector.phase(), Phase::Nominal);

    let burst = s.run(1024, 2);
    assert!(burst.spikes > 0, "burst did not spike: {:?}", burst);
    assert!(burst.max_ratio > 2.0);
    assert!(burst.min_admit_probability < 0.5);
    assert_eq!(s.detector.phase(), Phase::Recovering);

    // settle back into base load before asserting again
    s.run(CAPACITY, 8);
    let resumed = s.run(BASE_EVENTS, 8);
    assert_eq!(resumed.spikes, 0, "resumed base load spiked: {:?}", resumed);

    s.pause(1024);
    let after_silence = s.run(BASE_EVENTS, 8);
    assert_eq!(after_silence.spikes, 0, "post-silence spiked: {:?}", after_silence);

    let moderate = s.run(BASE_EVENTS, 4);
    assert_eq!(moderate.spikes, 0, "moderate burst spiked: {:?}", moderate);

    let base_again = s.run(BASE_EVENTS, 8);
    assert_eq!(base_again.spikes, 0);

    let second_burst = s.run(1024, 2);
    assert!(second_burst.spikes > 0);

    let tail = s.run(BASE_EVENTS, 8);
    assert_eq!(tail.spikes, 0);

    let stats = s.detector.stats();
    assert_eq!(stats.spikes as usize, burst.spikes + second_burst.spikes);
    assert_eq!(stats.rejected, 0);
}

#[test]
fn admit_probability_recovers_during_base_load() {
    let mut s = Scenario::new(11);
    s.run(CAPACITY * 64, 8);
    let burst = s.run(1024, 2);
    assert!(burst.spikes > 0);

    let spike_time = s.detector.stats().last_spike.expect("spike recorded");
    let dip = s.detector.admit_probability_at(spike_time);
    assert!(dip < 0.5);

    // 1e-5 decay: a million time units brings the curve close to 1
    s.run(CAPACITY * 1024, 8);
    let later = s.detector.admit_probability_at(s.time);
    assert!(later > dip);
    assert!(later > 0.99, "probability only recovered to {}", later);
    assert_eq!(s.detector.phase(), Phase::Recovering);
}

#[test]
fn steady_load_never_spikes_across_seeds() {
    for seed in [2, 3, 5, 8, 13] {
        let mut s = Scenario::new(seed);
        let report = s.run(CAPACITY * 128, 8);
        assert_eq!(report.spikes, 0, "seed {} spiked: {:?}", seed, report);
        assert!(report.max_ratio < 2.0);
    }
}

#[test]
fn constant_burst_spikes_within_capacity() {
    for seed in [4, 9, 21] {
        let mut s = Scenario::new(seed);
        s.run(CAPACITY * 64, 8);
        let burst = s.run_constant(CAPACITY, 1);
        let first = burst
            .first_spike
            .unwrap_or_else(|| panic!("seed {}: no spike in {} events", seed, CAPACITY));
        assert!(first < CAPACITY);
    }
}

#[test]
fn constant_rate_from_origin_holds_unit_ratio() {
    let mut det = Detector::new(CAPACITY, 2.0, 0.00001).unwrap();
    let mut sink = VecSink::new();
    for i in 1..=(4 * CAPACITY as u64) {
        let obs = det.process(i * 5).unwrap();
        sink.accept(&obs).unwrap();
    }
    for (t, ratio) in sink.ratio_series() {
        assert!((ratio - 1.0).abs() < 1e-12, "t={} ratio={}", t, ratio);
    }
    assert!(sink.probability_series().iter().all(|&(_, p)| p == 1.0));
    assert!((det.filtered_rate() - 0.2).abs() < 1e-12);
}

#[test]
fn offset_start_warm_up_settles() {
    // First event far from the origin: the warm-up ratio is degenerate
    // but the error shrinks window by window afterwards.
    let mut det = Detector::new(CAPACITY, 2.0, 0.00001).unwrap();
    let deviations: Vec<f64> = (0..16 * CAPACITY as u64)
        .map(|i| (det.process(1_000 + 4 * i).unwrap().ratio - 1.0).abs())
        .collect();

    let window_max = |w: usize| {
        deviations[w * CAPACITY..(w + 1) * CAPACITY]
            .iter()
            .cloned()
            .fold(0.0_f64, f64::max)
    };

    let settled: Vec<f64> = (4..16).map(window_max).collect();
    for pair in settled.windows(2) {
        assert!(pair[1] <= pair[0], "deviation grew: {:?}", settled);
    }
    assert!(settled[settled.len() - 1] < 1e-4);
}

#[test]
fn origin_removes_offset_warm_up() {
    let config = DetectorConfig::default().with_origin(996);
    let mut det = Detector::from_config(&config).unwrap();
    for i in 0..(2 * CAPACITY as u64) {
        let obs = det.process(1_000 + 4 * i).unwrap();
        assert!((obs.ratio - 1.0).abs() < 1e-12);
        assert!(!obs.is_spike);
    }
}
