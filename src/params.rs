//! Clock recovery parameters
//!
//! Two user-facing scalars control the loop: the nominal symbol rate the
//! NCO starts from, and the voltage threshold used to slice analog
//! inputs. Both have conventional serdes so they can live in a saved
//! instrument/session configuration.

use serde::{Deserialize, Serialize};

use crate::waveform::FS_PER_SECOND;

/// User-configurable clock recovery parameters.
///
/// ## Example
///
/// ```rust
/// use cdr_core::params::CdrParams;
///
/// let params = CdrParams::default()
///     .with_symbol_rate(1.0e9)
///     .with_threshold(0.2);
/// assert_eq!(params.initial_period(), 1_000_000); // 1 ns in fs
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdrParams {
    /// Nominal symbol rate in Hz.
    pub symbol_rate: f64,
    /// Slicing threshold for analog inputs, in volts.
    pub threshold: f64,
}

impl Default for CdrParams {
    fn default() -> Self {
        Self {
            symbol_rate: 1_250_000_000.0,
            threshold: 0.0,
        }
    }
}

impl CdrParams {
    /// Create parameters with the defaults (1.25 Gbps, 0 V threshold).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the nominal symbol rate in Hz.
    pub fn with_symbol_rate(mut self, hz: f64) -> Self {
        self.symbol_rate = hz;
        self
    }

    /// Set the analog slicing threshold in volts.
    pub fn with_threshold(mut self, volts: f64) -> Self {
        self.threshold = volts;
        self
    }

    /// Nominal NCO period for the first cycle, in fs.
    pub fn initial_period(&self) -> i64 {
        (FS_PER_SECOND as f64 / self.symbol_rate).round() as i64
    }
}
