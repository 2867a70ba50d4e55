//! Waveform containers
//!
//! Sampled signals come in four encodings: dense (one sample every
//! `timescale` femtoseconds) or sparse (per-sample offset and duration),
//! with either analog voltage or digital boolean sample values. The
//! encoding is resolved once per invocation via [`InputWaveform`], so the
//! per-sample hot paths stay monomorphic.
//!
//! ## Time semantics
//!
//! All absolute times are in femtoseconds. Sample `i` of a dense waveform
//! starts at `i * timescale + trigger_phase` and lasts `timescale`; sample
//! `i` of a sparse waveform starts at `offsets[i] * timescale +
//! trigger_phase` and lasts `durations[i] * timescale`.
//!
//! The recovered clock is emitted as a `SparseWaveform<bool>` with a
//! single-femtosecond timescale and zero trigger phase, so its offsets are
//! directly absolute timestamps.

use serde::{Deserialize, Serialize};

/// Femtoseconds per second.
pub const FS_PER_SECOND: i64 = 1_000_000_000_000_000;

/// A densely sampled waveform with a fixed sample interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformWaveform<T> {
    /// Sample interval in fs.
    pub timescale: i64,
    /// Time of sample 0 in fs, relative to the capture origin.
    pub trigger_phase: i64,
    /// Sample values.
    pub samples: Vec<T>,
}

impl<T> UniformWaveform<T> {
    /// Create a dense waveform.
    pub fn new(timescale: i64, trigger_phase: i64, samples: Vec<T>) -> Self {
        Self {
            timescale,
            trigger_phase,
            samples,
        }
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the waveform has no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Absolute start time of sample `i` in fs.
    #[inline]
    pub fn offset_of(&self, i: usize) -> i64 {
        i as i64 * self.timescale + self.trigger_phase
    }

    /// Duration of any sample in fs (fixed for dense data).
    #[inline]
    pub fn duration_of(&self, _i: usize) -> i64 {
        self.timescale
    }
}

/// A sparsely sampled waveform with per-sample offsets and durations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseWaveform<T> {
    /// Time unit for offsets and durations, in fs.
    pub timescale: i64,
    /// Time of offset 0 in fs, relative to the capture origin.
    pub trigger_phase: i64,
    /// Per-sample start times, in `timescale` units. Strictly increasing.
    pub offsets: Vec<i64>,
    /// Per-sample durations, in `timescale` units. Non-negative.
    pub durations: Vec<i64>,
    /// Sample values.
    pub samples: Vec<T>,
}

impl<T> SparseWaveform<T> {
    /// Create a sparse waveform from parallel offset/duration/sample runs.
    pub fn new(
        timescale: i64,
        trigger_phase: i64,
        offsets: Vec<i64>,
        durations: Vec<i64>,
        samples: Vec<T>,
    ) -> Self {
        Self {
            timescale,
            trigger_phase,
            offsets,
            durations,
            samples,
        }
    }

    /// Create an empty sparse waveform with the given time base.
    pub fn empty(timescale: i64, trigger_phase: i64) -> Self {
        Self {
            timescale,
            trigger_phase,
            offsets: Vec::new(),
            durations: Vec::new(),
            samples: Vec::new(),
        }
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the waveform has no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Absolute start time of sample `i` in fs.
    #[inline]
    pub fn offset_of(&self, i: usize) -> i64 {
        self.offsets[i] * self.timescale + self.trigger_phase
    }

    /// Duration of sample `i` in fs.
    #[inline]
    pub fn duration_of(&self, i: usize) -> i64 {
        self.durations[i] * self.timescale
    }
}

impl SparseWaveform<bool> {
    /// Empty capture for a recovered clock: offsets are absolute single
    /// femtoseconds, no trigger phase.
    pub fn clock_capture() -> Self {
        Self::empty(1, 0)
    }
}

/// An input signal in one of the four supported encodings.
///
/// The variant is matched once at the start of a refresh; everything
/// downstream works on plain edge timestamps.
#[derive(Debug, Clone, PartialEq)]
pub enum InputWaveform {
    /// Dense analog samples (volts).
    UniformAnalog(UniformWaveform<f64>),
    /// Sparse analog samples (volts).
    SparseAnalog(SparseWaveform<f64>),
    /// Dense digital samples.
    UniformDigital(UniformWaveform<bool>),
    /// Sparse digital samples.
    SparseDigital(SparseWaveform<bool>),
}

impl InputWaveform {
    /// Sample interval (dense) or offset unit (sparse) in fs.
    pub fn timescale(&self) -> i64 {
        match self {
            InputWaveform::UniformAnalog(w) => w.timescale,
            InputWaveform::SparseAnalog(w) => w.timescale,
            InputWaveform::UniformDigital(w) => w.timescale,
            InputWaveform::SparseDigital(w) => w.timescale,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        match self {
            InputWaveform::UniformAnalog(w) => w.len(),
            InputWaveform::SparseAnalog(w) => w.len(),
            InputWaveform::UniformDigital(w) => w.len(),
            InputWaveform::SparseDigital(w) => w.len(),
        }
    }

    /// Check if the waveform has no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Absolute start time of the last sample, in fs.
    ///
    /// Returns the trigger phase for an empty waveform.
    pub fn end_time(&self) -> i64 {
        let len = self.len();
        if len == 0 {
            return match self {
                InputWaveform::UniformAnalog(w) => w.trigger_phase,
                InputWaveform::SparseAnalog(w) => w.trigger_phase,
                InputWaveform::UniformDigital(w) => w.trigger_phase,
                InputWaveform::SparseDigital(w) => w.trigger_phase,
            };
        }
        match self {
            InputWaveform::UniformAnalog(w) => w.offset_of(len - 1),
            InputWaveform::SparseAnalog(w) => w.offset_of(len - 1),
            InputWaveform::UniformDigital(w) => w.offset_of(len - 1),
            InputWaveform::SparseDigital(w) => w.offset_of(len - 1),
        }
    }
}

/// A digital gate/squelch signal in either encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum GateWaveform {
    /// Dense digital gate.
    Uniform(UniformWaveform<bool>),
    /// Sparse digital gate.
    Sparse(SparseWaveform<bool>),
}

impl GateWaveform {
    /// Number of gate regions.
    pub fn len(&self) -> usize {
        match self {
            GateWaveform::Uniform(w) => w.len(),
            GateWaveform::Sparse(w) => w.len(),
        }
    }

    /// Check if the gate has no regions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gate value for region `i` (`true` = pass, `false` = squelch).
    #[inline]
    pub fn value(&self, i: usize) -> bool {
        match self {
            GateWaveform::Uniform(w) => w.samples[i],
            GateWaveform::Sparse(w) => w.samples[i],
        }
    }

    /// Absolute start time of region `i` in fs.
    #[inline]
    pub fn region_start(&self, i: usize) -> i64 {
        match self {
            GateWaveform::Uniform(w) => w.offset_of(i),
            GateWaveform::Sparse(w) => w.offset_of(i),
        }
    }

    /// Duration of region `i` in fs.
    #[inline]
    pub fn region_duration(&self, i: usize) -> i64 {
        match self {
            GateWaveform::Uniform(w) => w.duration_of(i),
            GateWaveform::Sparse(w) => w.duration_of(i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_offsets() {
        let w = UniformWaveform::new(100_000, 250, vec![0.0_f64; 10]);
        assert_eq!(w.offset_of(0), 250);
        assert_eq!(w.offset_of(3), 300_250);
        assert_eq!(w.duration_of(7), 100_000);
    }

    #[test]
    fn test_sparse_offsets() {
        let w = SparseWaveform::new(
            10,
            5,
            vec![0, 4, 9],
            vec![4, 5, 1],
            vec![false, true, false],
        );
        assert_eq!(w.offset_of(0), 5);
        assert_eq!(w.offset_of(1), 45);
        assert_eq!(w.offset_of(2), 95);
        assert_eq!(w.duration_of(1), 50);
    }

    #[test]
    fn test_end_time() {
        let w = InputWaveform::UniformDigital(UniformWaveform::new(
            1_000,
            0,
            vec![false, true, false, true],
        ));
        assert_eq!(w.end_time(), 3_000);

        let empty = InputWaveform::UniformAnalog(UniformWaveform::new(1_000, 42, vec![]));
        assert_eq!(empty.end_time(), 42);
    }

    #[test]
    fn test_clock_capture_timebase() {
        let cap = SparseWaveform::<bool>::clock_capture();
        assert_eq!(cap.timescale, 1);
        assert_eq!(cap.trigger_phase, 0);
        assert!(cap.is_empty());
    }

    #[test]
    fn test_gate_regions() {
        let gate = GateWaveform::Uniform(UniformWaveform::new(500, 0, vec![false, false, true]));
        assert_eq!(gate.len(), 3);
        assert_eq!(gate.region_start(2), 1_000);
        assert_eq!(gate.region_duration(0), 500);
        assert!(gate.value(2));
        assert!(!gate.value(0));
    }

    #[test]
    fn test_serde_roundtrip() {
        let w = SparseWaveform::new(1, 0, vec![10, 20], vec![10, 10], vec![true, false]);
        let json = serde_json::to_string(&w).unwrap();
        let back: SparseWaveform<bool> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, w);
    }
}
