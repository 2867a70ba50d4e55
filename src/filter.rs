//! Clock recovery filter
//!
//! The top-level pipeline stage: takes a data waveform (and an optional
//! gate), extracts threshold crossings, runs the recovery loop, and emits
//! the recovered clock as a sparse square wave. One call to
//! [`CdrFilter::refresh`] processes one complete input record; all
//! intermediate buffers are freshly allocated per call, so independent
//! records may be processed concurrently on separate filters.
//!
//! ## Example
//!
//! ```rust
//! use cdr_core::prelude::*;
//!
//! // 1 Gbps alternating data sampled at 10 GS/s (100_000 fs per sample)
//! let samples: Vec<bool> = (0..4000).map(|i| (i / 10) % 2 == 0).collect();
//! let input = InputWaveform::UniformDigital(UniformWaveform::new(100_000, 0, samples));
//!
//! let mut filter = CdrFilter::new(CdrParams::new().with_symbol_rate(1.0e9));
//! let clock = filter.refresh(Some(&input), None).unwrap();
//!
//! assert!(!clock.is_empty());
//! // Recovered clock periods hover around 1 ns
//! let spacing = clock.offsets[1] - clock.offsets[0];
//! assert!((spacing - 1_000_000i64).abs() < 10_000);
//! ```

use tracing::warn;

use crate::edge_detector::find_crossings;
use crate::error::{CdrError, CdrResult};
use crate::params::CdrParams;
use crate::recovery_loop::{run_gated, run_ungated, LockStats, PllTrace};
use crate::square_wave::{fill_durations, fill_squarewave};
use crate::waveform::{GateWaveform, InputWaveform, SparseWaveform};

/// Clock-data-recovery filter.
///
/// Holds the user parameters and the statistics of the most recent run.
#[derive(Debug, Clone, Default)]
pub struct CdrFilter {
    params: CdrParams,
    stats: Option<LockStats>,
}

impl CdrFilter {
    /// Create a filter with the given parameters.
    pub fn new(params: CdrParams) -> Self {
        Self {
            params,
            stats: None,
        }
    }

    /// Current parameters.
    pub fn params(&self) -> &CdrParams {
        &self.params
    }

    /// Replace the parameters for subsequent refreshes.
    pub fn set_params(&mut self, params: CdrParams) {
        self.params = params;
    }

    /// Lock statistics from the most recent successful refresh.
    pub fn last_stats(&self) -> Option<&LockStats> {
        self.stats.as_ref()
    }

    /// Recover the clock from one input record.
    ///
    /// Returns the recovered clock as a sparse boolean square wave with a
    /// single-femtosecond timescale. A loop that degrades late in the
    /// record still yields its valid prefix; only inputs that never
    /// produce a lock report an error.
    pub fn refresh(
        &mut self,
        data: Option<&InputWaveform>,
        gate: Option<&GateWaveform>,
    ) -> CdrResult<SparseWaveform<bool>> {
        self.refresh_inner(data, gate, None)
    }

    /// [`refresh`](Self::refresh) variant that also records the loop's
    /// per-correction diagnostic trace.
    pub fn refresh_traced(
        &mut self,
        data: Option<&InputWaveform>,
        gate: Option<&GateWaveform>,
    ) -> CdrResult<(SparseWaveform<bool>, PllTrace)> {
        let mut trace = PllTrace::new();
        let cap = self.refresh_inner(data, gate, Some(&mut trace))?;
        Ok((cap, trace))
    }

    fn refresh_inner(
        &mut self,
        data: Option<&InputWaveform>,
        gate: Option<&GateWaveform>,
        trace: Option<&mut PllTrace>,
    ) -> CdrResult<SparseWaveform<bool>> {
        self.stats = None;
        let din = data.ok_or(CdrError::MissingInput)?;

        let edges = find_crossings(din, self.params.threshold);
        if edges.len() < 2 {
            return Err(CdrError::NoUsableSignal { found: edges.len() });
        }

        let initial_period = self.params.initial_period();

        // Frequencies above Nyquist of the input cannot be recovered
        let fnyquist = 2 * din.timescale();
        if initial_period < fnyquist {
            return Err(CdrError::NyquistViolation {
                period: initial_period,
                floor: fnyquist,
            });
        }

        let tend = din.end_time();

        let (offsets, stats) = match gate {
            Some(g) => run_gated(&edges, tend, initial_period, fnyquist, g, trace),
            None => run_ungated(&edges, tend, initial_period, fnyquist, trace),
        };
        if stats.aborted {
            warn!(
                produced = offsets.len(),
                "clock recovery stopped early, keeping partial output"
            );
        }

        let mut cap = SparseWaveform::clock_capture();
        cap.offsets = offsets;
        fill_squarewave(&mut cap);
        fill_durations(&mut cap);

        self.stats = Some(stats);
        Ok(cap)
    }
}
