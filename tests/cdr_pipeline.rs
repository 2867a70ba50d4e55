//! End-to-end clock recovery scenarios against the public API.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use cdr_core::prelude::*;

/// Alternating data bits at one toggle per `samples_per_ui` samples.
fn alternating_digital(timescale: i64, samples_per_ui: usize, total: usize) -> InputWaveform {
    let samples: Vec<bool> = (0..total).map(|i| (i / samples_per_ui) % 2 == 0).collect();
    InputWaveform::UniformDigital(UniformWaveform::new(timescale, 0, samples))
}

/// Sine with a quarter-sample phase offset and optional additive noise.
fn noisy_sine(timescale: i64, period_samples: f64, total: usize, sigma: f64) -> InputWaveform {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let noise = Normal::new(0.0, sigma).unwrap();
    let samples: Vec<f64> = (0..total)
        .map(|i| {
            (2.0 * std::f64::consts::PI * (i as f64 - 0.25) / period_samples).sin()
                + noise.sample(&mut rng)
        })
        .collect();
    InputWaveform::UniformAnalog(UniformWaveform::new(timescale, 0, samples))
}

#[test]
fn recovers_clock_from_periodic_digital_data() {
    // 1 Gbps data, 10 GS/s capture: unit interval of 1e6 fs
    let input = alternating_digital(100_000, 10, 8_000);
    let mut cdr = CdrFilter::new(CdrParams::new().with_symbol_rate(1.0e9));
    let clock = cdr.refresh(Some(&input), None).unwrap();

    let ui = 1_000_000i64;
    assert!(clock.len() > 700);
    for pair in clock.offsets.windows(2) {
        let spacing = pair[1] - pair[0];
        assert!(
            (spacing - ui).abs() < ui / 100,
            "recovered spacing {} fs",
            spacing
        );
    }

    let stats = cdr.last_stats().unwrap();
    assert!(!stats.aborted);
    assert!(stats.mean_phase_error < ui / 100);
}

#[test]
fn recovers_clock_from_sparse_digital_data() {
    // Same signal as above, sparsely encoded: one run per bit
    let ui_units = 10i64; // in 100_000 fs units
    let nbits = 800usize;
    let offsets: Vec<i64> = (0..nbits as i64).map(|i| i * ui_units).collect();
    let durations = vec![ui_units; nbits];
    let samples: Vec<bool> = (0..nbits).map(|i| i % 2 == 0).collect();
    let input = InputWaveform::SparseDigital(SparseWaveform::new(
        100_000, 0, offsets, durations, samples,
    ));

    let mut cdr = CdrFilter::new(CdrParams::new().with_symbol_rate(1.0e9));
    let clock = cdr.refresh(Some(&input), None).unwrap();

    let ui = 1_000_000i64;
    assert!(!clock.is_empty());
    for pair in clock.offsets.windows(2) {
        assert!(((pair[1] - pair[0]) - ui).abs() < ui / 100);
    }
}

#[test]
fn analog_sine_crossings_match_analytic_zeros() {
    let timescale = 100_000i64;
    let input = noisy_sine(timescale, 16.0, 1_024, 0.01);
    let edges = cdr_core::edge_detector::find_crossings(&input, 0.0);

    // Zeros at i = 0.25 + 8k, for k = 0..=127 within the record
    assert_eq!(edges.len(), 128);
    for (k, &t) in edges.iter().enumerate() {
        let analytic = ((0.25 + 8.0 * k as f64) * timescale as f64) as i64;
        assert!(
            (t - analytic).abs() <= timescale,
            "edge {} at {} fs vs analytic {} fs",
            k,
            t,
            analytic
        );
    }
}

#[test]
fn recovers_clock_from_noisy_analog_input() {
    // Crossings every 8 samples of 100 ps: UI = 800_000 fs, which is the
    // default 1.25 Gbps symbol rate
    let input = noisy_sine(100_000, 16.0, 8_192, 0.02);
    let mut cdr = CdrFilter::new(CdrParams::default());
    let clock = cdr.refresh(Some(&input), None).unwrap();

    let ui = 800_000i64;
    assert!(clock.len() > 700);
    for pair in clock.offsets.windows(2) {
        let spacing = pair[1] - pair[0];
        assert!(
            (spacing - ui).abs() < ui / 50,
            "recovered spacing {} fs",
            spacing
        );
    }
}

#[test]
fn noisy_input_refresh_is_deterministic() {
    let input = noisy_sine(100_000, 16.0, 4_096, 0.05);
    let params = CdrParams::default();
    let mut a = CdrFilter::new(params);
    let mut b = CdrFilter::new(params);
    assert_eq!(
        a.refresh(Some(&input), None).unwrap(),
        b.refresh(Some(&input), None).unwrap()
    );
}

#[test]
fn fully_squelched_record_emits_nothing() {
    let input = alternating_digital(100_000, 10, 4_000);
    let gate = GateWaveform::Uniform(UniformWaveform::new(100_000, 0, vec![false; 4_000]));
    let mut cdr = CdrFilter::new(CdrParams::new().with_symbol_rate(1.0e9));
    let clock = cdr.refresh(Some(&input), Some(&gate)).unwrap();
    assert!(clock.is_empty());
}

#[test]
fn gated_record_recovers_after_gate_opens() {
    let input = alternating_digital(100_000, 10, 8_000);
    // Gate closed for the first half of the record
    let mut gate_samples = vec![false; 4_000];
    gate_samples.extend(vec![true; 4_000]);
    let gate = GateWaveform::Uniform(UniformWaveform::new(100_000, 0, gate_samples));

    let mut cdr = CdrFilter::new(CdrParams::new().with_symbol_rate(1.0e9));
    let clock = cdr.refresh(Some(&input), Some(&gate)).unwrap();

    let ui = 1_000_000i64;
    let gate_open_at = 4_000i64 * 100_000;
    assert!(!clock.is_empty());
    assert!(clock.offsets[0] >= gate_open_at);
    for pair in clock.offsets.windows(2).skip(5) {
        assert!(((pair[1] - pair[0]) - ui).abs() < ui / 20);
    }
}

#[test]
fn too_few_edges_yield_no_output() {
    let mut cdr = CdrFilter::new(CdrParams::default());

    // Analog flatline with noise well below the threshold
    let mut rng = StdRng::seed_from_u64(7);
    let noise = Normal::new(0.0, 0.01).unwrap();
    let samples: Vec<f64> = (0..2_000).map(|_| noise.sample(&mut rng) - 1.0).collect();
    let flat = InputWaveform::UniformAnalog(UniformWaveform::new(100_000, 0, samples));

    assert_eq!(
        cdr.refresh(Some(&flat), None),
        Err(CdrError::NoUsableSignal { found: 0 })
    );
}

#[test]
fn above_nyquist_symbol_rate_yields_no_output() {
    // 10 GHz recovery on a 1 GS/s record
    let input = alternating_digital(1_000_000, 4, 2_000);
    let mut cdr = CdrFilter::new(CdrParams::new().with_symbol_rate(10.0e9));
    let result = cdr.refresh(Some(&input), None);
    assert!(matches!(result, Err(CdrError::NyquistViolation { .. })));
}
