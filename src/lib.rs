//! # Clock-Data Recovery Core
//!
//! This crate recovers an embedded clock from a sampled waveform: a
//! software PLL (phase-locked loop) built around an NCO
//! (numerically-controlled oscillator) walks the signal's threshold
//! crossings and reconstructs the bit-boundary clock, even when the
//! source signal is noisy, bursty, or only intermittently valid.
//!
//! ## Signal Flow
//!
//! ```text
//! input waveform ─> edge_detector ─> edge timestamps ─> recovery_loop ─> recovered edges ─> square_wave ─> clock waveform
//!                                                            ^
//!                                      gate waveform ─> gate_tracker
//! ```
//!
//! - [`edge_detector`] turns dense or sparse, analog or digital samples
//!   into an ordered crossing-timestamp sequence (sub-sample accurate for
//!   analog inputs).
//! - [`gate_tracker`] follows an optional squelch signal and re-acquires
//!   the loop's period estimate whenever the gate re-opens.
//! - [`recovery_loop`] is the PLL itself: proportional frequency and
//!   phase correction plus a bang-bang phase nudge, guarded against
//!   locking at or above the Nyquist rate of the input.
//! - [`square_wave`] renders the recovered edge sequence as a sparse
//!   boolean square wave, with an AVX2 fast path that is bit-identical to
//!   the scalar one.
//!
//! All timestamps are in femtoseconds. One [`filter::CdrFilter::refresh`]
//! call processes one complete input record and returns one recovered
//! clock waveform; there is no hidden state between invocations beyond
//! the configured parameters.
//!
//! ## Example
//!
//! ```rust
//! use cdr_core::prelude::*;
//!
//! // 1 Gbps alternating data sampled at 10 GS/s
//! let samples: Vec<bool> = (0..4000).map(|i| (i / 10) % 2 == 0).collect();
//! let data = InputWaveform::UniformDigital(UniformWaveform::new(100_000, 0, samples));
//!
//! let mut cdr = CdrFilter::new(CdrParams::new().with_symbol_rate(1.0e9));
//! let clock = cdr.refresh(Some(&data), None).unwrap();
//! assert!(!clock.is_empty());
//! ```

pub mod edge_detector;
pub mod error;
pub mod filter;
pub mod gate_tracker;
pub mod params;
pub mod recovery_loop;
pub mod square_wave;
pub mod waveform;

pub use error::{CdrError, CdrResult};
pub use filter::CdrFilter;
pub use params::CdrParams;
pub use recovery_loop::{LockStats, PllState, PllTrace};
pub use waveform::{
    GateWaveform, InputWaveform, SparseWaveform, UniformWaveform, FS_PER_SECOND,
};

/// Commonly used types, re-exported for convenience.
pub mod prelude {
    pub use crate::error::{CdrError, CdrResult};
    pub use crate::filter::CdrFilter;
    pub use crate::params::CdrParams;
    pub use crate::recovery_loop::LockStats;
    pub use crate::waveform::{
        GateWaveform, InputWaveform, SparseWaveform, UniformWaveform, FS_PER_SECOND,
    };
}
