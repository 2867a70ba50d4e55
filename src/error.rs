//! Clock recovery error types

use thiserror::Error;

/// Result type for clock recovery operations
pub type CdrResult<T> = Result<T, CdrError>;

/// Errors that can occur during clock recovery
///
/// All of these are non-fatal to a larger processing pipeline: a failed
/// refresh simply produces no output waveform for this channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CdrError {
    /// No data waveform was supplied
    #[error("no input waveform")]
    MissingInput,

    /// Too few threshold crossings to recover a clock from
    #[error("no usable signal: found {found} edge(s), need at least 2")]
    NoUsableSignal { found: usize },

    /// Requested symbol rate is at or above the Nyquist rate of the input
    #[error("symbol rate violates Nyquist: period {period} fs is below the floor of {floor} fs")]
    NyquistViolation { period: i64, floor: i64 },
}

impl CdrError {
    /// Check if this error indicates a configuration problem (as opposed
    /// to a property of the captured signal).
    pub fn is_config_error(&self) -> bool {
        matches!(self, CdrError::NyquistViolation { .. })
    }
}
