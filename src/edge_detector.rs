//! Edge detection
//!
//! Scans a sampled waveform and produces the ordered sequence of
//! timestamps at which the signal crosses a threshold (analog) or toggles
//! (digital). Both rising and falling crossings are reported; callers
//! that care about direction consume the sequence in pairs.
//!
//! For analog data the crossing time is refined by linear interpolation
//! between the two samples straddling the threshold, giving sub-sample
//! accuracy. For digital data the crossing time is the start offset of
//! the sample where the value changes.
//!
//! ## Example
//!
//! ```rust
//! use cdr_core::edge_detector::find_crossings;
//! use cdr_core::waveform::{InputWaveform, UniformWaveform};
//!
//! let wave = InputWaveform::UniformDigital(UniformWaveform::new(
//!     1_000, // 1 ps per sample
//!     0,
//!     vec![false, false, true, true, false],
//! ));
//! let edges = find_crossings(&wave, 0.0);
//! assert_eq!(edges, vec![2_000, 4_000]);
//! ```

use crate::waveform::{InputWaveform, SparseWaveform, UniformWaveform};

/// Find all threshold crossings of a waveform, in absolute fs.
///
/// The `threshold` applies to the analog encodings only; digital inputs
/// toggle on value changes. The returned sequence is non-decreasing and
/// never contains consecutive duplicates.
pub fn find_crossings(input: &InputWaveform, threshold: f64) -> Vec<i64> {
    match input {
        InputWaveform::UniformAnalog(w) => crossings_uniform_analog(w, threshold),
        InputWaveform::SparseAnalog(w) => crossings_sparse_analog(w, threshold),
        InputWaveform::UniformDigital(w) => crossings_uniform_digital(w),
        InputWaveform::SparseDigital(w) => crossings_sparse_digital(w),
    }
}

#[inline]
fn push_dedup(edges: &mut Vec<i64>, t: i64) {
    if edges.last() != Some(&t) {
        edges.push(t);
    }
}

fn crossings_uniform_analog(w: &UniformWaveform<f64>, threshold: f64) -> Vec<i64> {
    let mut edges = Vec::new();
    if w.len() < 2 {
        return edges;
    }
    let mut above = w.samples[0] > threshold;
    for i in 1..w.len() {
        let cur = w.samples[i];
        let now_above = cur > threshold;
        if now_above != above {
            let prev = w.samples[i - 1];
            let frac = (threshold - prev) / (cur - prev);
            let t = w.offset_of(i - 1) + (frac * w.timescale as f64).round() as i64;
            push_dedup(&mut edges, t);
        }
        above = now_above;
    }
    edges
}

fn crossings_sparse_analog(w: &SparseWaveform<f64>, threshold: f64) -> Vec<i64> {
    let mut edges = Vec::new();
    if w.len() < 2 {
        return edges;
    }
    let mut above = w.samples[0] > threshold;
    for i in 1..w.len() {
        let cur = w.samples[i];
        let now_above = cur > threshold;
        if now_above != above {
            let prev = w.samples[i - 1];
            let frac = (threshold - prev) / (cur - prev);
            let t0 = w.offset_of(i - 1);
            let t1 = w.offset_of(i);
            let t = t0 + (frac * (t1 - t0) as f64).round() as i64;
            push_dedup(&mut edges, t);
        }
        above = now_above;
    }
    edges
}

fn crossings_uniform_digital(w: &UniformWaveform<bool>) -> Vec<i64> {
    let mut edges = Vec::new();
    for i in 1..w.len() {
        if w.samples[i] != w.samples[i - 1] {
            push_dedup(&mut edges, w.offset_of(i));
        }
    }
    edges
}

fn crossings_sparse_digital(w: &SparseWaveform<bool>) -> Vec<i64> {
    let mut edges = Vec::new();
    for i in 1..w.len() {
        if w.samples[i] != w.samples[i - 1] {
            push_dedup(&mut edges, w.offset_of(i));
        }
    }
    edges
}
